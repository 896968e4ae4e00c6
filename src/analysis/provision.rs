use git2::build::RepoBuilder;
use git2::{FetchOptions, RemoteCallbacks};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use crate::error::ContribError;
use crate::types::RepositoryHandle;

const STAGING_PREFIX: &str = ".contribstats-clone-";

/// `https://{host}/{owner}/{repo}.git`
pub fn clone_url(host: &str, owner: &str, repo: &str) -> String {
    format!("https://{}/{}/{}.git", host.trim_end_matches('/'), owner, repo)
}

/// Scratch directory for working copies: the user cache dir, or the temp dir.
pub fn default_scratch_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("contribstats")
}

/// Deterministic working-copy location for `owner/repo` under `scratch_root`.
pub fn default_clone_path(scratch_root: &Path, owner: &str, repo: &str) -> PathBuf {
    scratch_root.join(owner).join(repo)
}

/// Ensure a working copy of `remote_url` exists at `dest`, cloning it if absent.
pub async fn ensure_local(remote_url: String, dest: PathBuf) -> Result<RepositoryHandle, ContribError> {
    spawn_blocking(move || ensure_local_blocking(&remote_url, &dest)).await?
}

/// Blocking form of [`ensure_local`].
///
/// An existing directory is reused as is. Anything else at `dest`, or a
/// metadata error other than "not found", is a fatal access fault.
pub fn ensure_local_blocking(remote_url: &str, dest: &Path) -> Result<RepositoryHandle, ContribError> {
    match fs::metadata(dest) {
        Ok(metadata) if metadata.is_dir() => {
            info!(path = %dest.display(), "repository already cloned, reusing");
            Ok(RepositoryHandle::new(dest.to_path_buf()))
        }
        Ok(_) => Err(ContribError::RepositoryAccess {
            path: dest.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path exists and is not a directory"),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            clone_atomically(remote_url, dest)?;
            Ok(RepositoryHandle::new(dest.to_path_buf()))
        }
        Err(e) => Err(ContribError::RepositoryAccess {
            path: dest.to_path_buf(),
            source: e,
        }),
    }
}

/// Clone into a staging directory beside `dest`, then rename into place.
/// A clone that fails part way leaves nothing at `dest`.
fn clone_atomically(remote_url: &str, dest: &Path) -> Result<(), ContribError> {
    let access_err = |source: io::Error| ContribError::RepositoryAccess {
        path: dest.to_path_buf(),
        source,
    };

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(access_err)?;
    sweep_stale_staging(&parent);

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&parent)
        .map_err(access_err)?;

    info!(url = remote_url, path = %dest.display(), "cloning repository");

    let mut callbacks = RemoteCallbacks::new();
    callbacks.transfer_progress(|progress| {
        debug!(
            received = progress.received_objects(),
            total = progress.total_objects(),
            "clone progress"
        );
        true
    });
    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);

    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);
    let repo = builder
        .clone(remote_url, staging.path())
        .map_err(|source| ContribError::CloneFailed {
            url: remote_url.to_string(),
            dest: dest.to_path_buf(),
            source,
        })?;
    drop(repo);

    // The staging guard only cleans up when the rename did not happen.
    fs::rename(staging.path(), dest).map_err(access_err)?;
    Ok(())
}

/// Remove staging directories left by clones that were killed part way.
/// Runs only when a clone is about to start, so a reused copy never pays for it.
fn sweep_stale_staging(parent: &Path) {
    let Ok(entries) = fs::read_dir(parent) else {
        return;
    };

    for entry in entries.flatten() {
        let is_staging = entry.file_name().to_string_lossy().starts_with(STAGING_PREFIX);
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !(is_staging && is_dir) {
            continue;
        }

        let path = entry.path();
        match fs::remove_dir_all(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale clone staging directory"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove stale clone staging directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::{Repository, Signature};
    use tempfile::TempDir;

    fn source_repo() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::init(temp_dir.path()).unwrap();
        let signature = Signature::now("alice", "alice@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])
            .unwrap();
        temp_dir
    }

    #[test]
    fn test_clone_url_and_paths() {
        assert_eq!(clone_url("github.com", "pnpm", "pnpm"), "https://github.com/pnpm/pnpm.git");
        assert_eq!(clone_url("github.com/", "a", "b"), "https://github.com/a/b.git");
        assert_eq!(
            default_clone_path(Path::new("/scratch"), "pnpm", "pnpm"),
            PathBuf::from("/scratch/pnpm/pnpm")
        );
        assert!(default_scratch_root().ends_with("contribstats"));
    }

    #[test]
    fn test_clones_when_absent() {
        let source = source_repo();
        let scratch = TempDir::new().unwrap();
        let dest = default_clone_path(scratch.path(), "owner", "repo");

        let handle = ensure_local_blocking(source.path().to_str().unwrap(), &dest).unwrap();
        assert_eq!(handle.path(), dest.as_path());
        assert!(Repository::open(&dest).is_ok());

        // No staging directories left behind.
        let leftovers: Vec<_> = fs::read_dir(dest.parent().unwrap())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(STAGING_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_second_call_reuses_without_cloning() {
        let source = source_repo();
        let scratch = TempDir::new().unwrap();
        let dest = default_clone_path(scratch.path(), "owner", "repo");
        let url = source.path().to_str().unwrap().to_string();

        let first = ensure_local_blocking(&url, &dest).unwrap();
        // With the source gone, a second clone would fail.
        drop(source);
        let second = ensure_local_blocking(&url, &dest).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_clone_leaves_no_destination() {
        let scratch = TempDir::new().unwrap();
        let dest = default_clone_path(scratch.path(), "owner", "missing");
        let missing = scratch.path().join("no-such-repo");

        let err = ensure_local_blocking(missing.to_str().unwrap(), &dest).unwrap_err();
        assert!(matches!(err, ContribError::CloneFailed { .. }));
        assert!(!dest.exists());
        let leftovers = fs::read_dir(dest.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_file_at_destination_is_access_fault() {
        let scratch = TempDir::new().unwrap();
        let dest = scratch.path().join("repo");
        fs::write(&dest, "not a repo").unwrap();

        let err = ensure_local_blocking("https://example.invalid/a/b.git", &dest).unwrap_err();
        assert!(matches!(err, ContribError::RepositoryAccess { .. }));
    }

    #[test]
    fn test_destination_below_a_file_is_access_fault() {
        let scratch = TempDir::new().unwrap();
        let file = scratch.path().join("f");
        fs::write(&file, "plain file").unwrap();

        // metadata() fails with ENOTDIR here, not NotFound, so no clone is attempted.
        let err = ensure_local_blocking("https://example.invalid/a/b.git", &file.join("sub")).unwrap_err();
        match err {
            ContribError::RepositoryAccess { path, source } => {
                assert_eq!(path, file.join("sub"));
                assert_ne!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected RepositoryAccess, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_parent_is_access_fault() {
        use std::os::unix::fs::PermissionsExt;

        let scratch = TempDir::new().unwrap();
        let locked = scratch.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let missing_source = scratch.path().join("no-such-repo");
        let result = ensure_local_blocking(missing_source.to_str().unwrap(), &locked.join("repo"));
        // Restore so TempDir can clean up.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        // Permission bits do not apply to root; there the path is simply missing and the clone fails.
        match result {
            Err(ContribError::RepositoryAccess { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            Err(ContribError::CloneFailed { .. }) => {}
            other => panic!("expected an access or clone fault, got {other:?}"),
        }
    }

    #[test]
    fn test_clone_sweeps_stale_staging_directories() {
        let source = source_repo();
        let scratch = TempDir::new().unwrap();
        let dest = default_clone_path(scratch.path(), "owner", "repo");
        let parent = dest.parent().unwrap();

        // Left behind by a clone that was killed part way.
        let stale = parent.join(format!("{STAGING_PREFIX}abc123"));
        fs::create_dir_all(stale.join(".git")).unwrap();
        fs::write(stale.join(".git").join("HEAD"), "ref: refs/heads/main\n").unwrap();
        let sibling = parent.join("other-repo");
        fs::create_dir_all(&sibling).unwrap();

        ensure_local_blocking(source.path().to_str().unwrap(), &dest).unwrap();

        assert!(!stale.exists());
        assert!(sibling.exists());
        assert!(Repository::open(&dest).is_ok());
    }

    #[tokio::test]
    async fn test_async_ensure_local() {
        let source = source_repo();
        let scratch = TempDir::new().unwrap();
        let dest = scratch.path().join("copy");

        let handle = ensure_local(source.path().to_str().unwrap().to_string(), dest.clone())
            .await
            .unwrap();
        assert_eq!(handle.path(), dest.as_path());
    }
}
