use std::path::PathBuf;
use tracing::{info, info_span, Instrument};

use crate::analysis::git::{count_commits_by_author, ScanOptions};
use crate::analysis::provision::ensure_local;
use crate::analysis::remote::SearchClient;
use crate::error::ContribError;
use crate::types::{ContributionQuery, ContributionSummary};

/// Combines the remote search metrics with a local history scan.
#[derive(Debug, Clone)]
pub struct Aggregator {
    search: SearchClient,
    scan_options: ScanOptions,
}

impl Aggregator {
    pub fn new(search: SearchClient) -> Self {
        Self {
            search,
            scan_options: ScanOptions::default(),
        }
    }

    pub fn with_scan_options(mut self, scan_options: ScanOptions) -> Self {
        self.scan_options = scan_options;
        self
    }

    /// Collect all four metrics for `query`.
    ///
    /// The working copy is provisioned first; if that fails the run ends
    /// before any search is issued. After that, individual metric failures
    /// are reported inside the summary and never fail the run.
    pub async fn run(
        &self,
        query: &ContributionQuery,
        remote_url: &str,
        dest: PathBuf,
    ) -> Result<ContributionSummary, ContribError> {
        let span = info_span!(
            "run",
            owner = %query.owner,
            repo = %query.repository,
            login = %query.login
        );

        async move {
            let handle = ensure_local(remote_url.to_string(), dest).await?;

            let local = count_commits_by_author(handle, query.author_names(), self.scan_options);
            let ((remote_commits, pull_requests, issues), local) =
                tokio::join!(self.search.query_all(query), local);

            let summary = ContributionSummary {
                remote_commit_count: remote_commits,
                pull_request_count: pull_requests,
                issue_count: issues,
                local_commit_count: local?,
            };

            info!(failed = ?summary.failed_metrics(), "contribution summary assembled");
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}
