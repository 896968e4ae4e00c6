use git2::{Error, Repository};
use tokio::task::spawn_blocking;
use tracing::{debug, warn};

use crate::error::ContribError;
use crate::types::{CommitRecord, MetricResult, RepositoryHandle};

/// How history is walked from HEAD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Follow only the first parent of merge commits
    pub first_parent_only: bool,
}

/// Count commits reachable from HEAD whose author name is one of `author_names`.
///
/// Opening the repository or resolving HEAD is fatal. A fault while walking
/// turns into a failed metric instead of a partial count.
pub async fn count_commits_by_author(
    handle: RepositoryHandle,
    author_names: Vec<String>,
    options: ScanOptions,
) -> Result<MetricResult, ContribError> {
    // git2 operations are blocking
    spawn_blocking(move || count_commits_by_author_blocking(&handle, &author_names, options)).await?
}

/// Blocking form of [`count_commits_by_author`].
pub fn count_commits_by_author_blocking(
    handle: &RepositoryHandle,
    author_names: &[String],
    options: ScanOptions,
) -> Result<MetricResult, ContribError> {
    let open_err = |source: Error| ContribError::OpenFailed {
        path: handle.path().to_path_buf(),
        source,
    };

    let repo = Repository::open(handle.path()).map_err(open_err)?;
    // Fails on an unborn HEAD as well, e.g. a freshly initialised repository.
    repo.head().map_err(open_err)?;

    let result = match walk_history(&repo, options) {
        Ok(records) => count_matching(records, author_names),
        Err(e) => MetricResult::failure(e),
    };

    if result.succeeded() {
        debug!(path = %handle.path().display(), count = result.reported_value(), "local history scanned");
    } else {
        warn!(path = %handle.path().display(), error = ?result.error_detail(), "local history scan interrupted");
    }
    Ok(result)
}

/// Walk commits from HEAD backward, yielding each commit's author.
pub fn walk_history(
    repo: &Repository,
    options: ScanOptions,
) -> Result<impl Iterator<Item = Result<CommitRecord, Error>> + '_, Error> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push_head()?;
    if options.first_parent_only {
        revwalk.simplify_first_parent()?;
    }

    Ok(revwalk.map(move |oid| {
        let oid = oid?;
        let commit = repo.find_commit(oid)?;
        let author = commit.author();
        Ok(CommitRecord {
            author_name: String::from_utf8_lossy(author.name_bytes()).into_owned(),
            hash: oid,
        })
    }))
}

/// Count records whose author exactly matches any of `author_names`.
///
/// Comparison is case-sensitive with no normalisation. The first error ends
/// the count and is reported as a failed metric.
pub fn count_matching<I, E>(records: I, author_names: &[String]) -> MetricResult
where
    I: IntoIterator<Item = Result<CommitRecord, E>>,
    E: std::fmt::Display,
{
    let mut count = 0u64;
    for record in records {
        match record {
            Ok(record) => {
                if author_names.iter().any(|name| *name == record.author_name) {
                    count += 1;
                }
            }
            Err(e) => return MetricResult::failure(format!("history traversal failed: {e}")),
        }
    }
    MetricResult::success(count)
}
