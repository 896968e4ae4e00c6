//! # Common Types
//!
//! This module contains the common types used throughout the crate for
//! describing a contribution query and the metrics collected for it.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifies *who* is being counted and *where*.
///
/// `login` is the account name understood by the hosting search API.
/// `aliases` is the set of author display names accepted when scanning
/// local history; an empty set falls back to the login itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionQuery {
    /// Owner (user or organisation) of the repository
    pub owner: String,
    /// Repository name
    pub repository: String,
    /// Account name used by the remote search filters
    pub login: String,
    /// Author display names matched against local commits
    pub aliases: Vec<String>,
}

impl ContributionQuery {
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        login: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
            login: login.into(),
            aliases: Vec::new(),
        }
    }

    /// Replace the accepted local author names.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// The author names a local commit may carry to be attributed to this query.
    pub fn author_names(&self) -> Vec<String> {
        if self.aliases.is_empty() {
            vec![self.login.clone()]
        } else {
            self.aliases.clone()
        }
    }

    /// `owner/repository`
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repository)
    }
}

/// Which remote search a metric comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Commits,
    PullRequests,
    Issues,
}

impl MetricKind {
    /// Search endpoint path below the API base.
    pub fn endpoint(self) -> &'static str {
        match self {
            MetricKind::Commits => "/search/commits",
            MetricKind::PullRequests | MetricKind::Issues => "/search/issues",
        }
    }

    /// Qualifier narrowing the issue search to one item type.
    pub fn type_qualifier(self) -> Option<&'static str> {
        match self {
            MetricKind::Commits => None,
            MetricKind::PullRequests => Some("type:pr"),
            MetricKind::Issues => Some("type:issue"),
        }
    }

    /// `Accept` header value; commit search needs the preview media type.
    pub fn accept_header(self) -> &'static str {
        match self {
            MetricKind::Commits => "application/vnd.github.cloak-preview",
            MetricKind::PullRequests | MetricKind::Issues => "application/vnd.github+json",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Commits => "commits",
            MetricKind::PullRequests => "pull requests",
            MetricKind::Issues => "issues",
        };
        f.write_str(name)
    }
}

/// One counted metric.
///
/// Built only through [`MetricResult::success`] and [`MetricResult::failure`],
/// so a failed metric always carries `value == 0` together with the cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricResult {
    value: u64,
    succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<String>,
}

impl MetricResult {
    pub fn success(value: u64) -> Self {
        Self {
            value,
            succeeded: true,
            error_detail: None,
        }
    }

    pub fn failure(cause: impl fmt::Display) -> Self {
        Self {
            value: 0,
            succeeded: false,
            error_detail: Some(cause.to_string()),
        }
    }

    /// The count, or `None` when the metric could not be collected.
    pub fn value(&self) -> Option<u64> {
        self.succeeded.then_some(self.value)
    }

    /// The count as reported: zero for a failed metric.
    pub fn reported_value(&self) -> u64 {
        self.value
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }
}

/// A commit as produced by history traversal. Only `author_name` is inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub author_name: String,
    pub hash: git2::Oid,
}

/// A local directory known to hold a complete working copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryHandle {
    path: PathBuf,
}

impl RepositoryHandle {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Wrap a working copy that was provisioned elsewhere.
    pub fn existing(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let metadata = std::fs::metadata(&path)?;
        if !metadata.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a directory", path.display()),
            ));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The result of a contribution run: four independently collected metrics.
///
/// Remote and local commit counts are kept apart; they measure the same
/// thing through different sources and are not reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionSummary {
    pub remote_commit_count: MetricResult,
    pub pull_request_count: MetricResult,
    pub issue_count: MetricResult,
    pub local_commit_count: MetricResult,
}

impl ContributionSummary {
    /// Metric names paired with their results, in report order.
    pub fn metrics(&self) -> [(&'static str, &MetricResult); 4] {
        [
            ("remote commits", &self.remote_commit_count),
            ("pull requests", &self.pull_request_count),
            ("issues", &self.issue_count),
            ("local commits", &self.local_commit_count),
        ]
    }

    pub fn failed_metrics(&self) -> Vec<&'static str> {
        self.metrics()
            .into_iter()
            .filter(|(_, metric)| !metric.succeeded())
            .map(|(name, _)| name)
            .collect()
    }

    /// True when no source produced data at all.
    pub fn all_failed(&self) -> bool {
        self.metrics().iter().all(|(_, metric)| !metric.succeeded())
    }

    /// Both commit counts are available and disagree.
    pub fn commit_counts_diverge(&self) -> bool {
        match (self.remote_commit_count.value(), self.local_commit_count.value()) {
            (Some(remote), Some(local)) => remote != local,
            _ => false,
        }
    }
}
