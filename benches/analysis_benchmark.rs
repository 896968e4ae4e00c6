/// Benchmark module for the local history scanner.
/// Measures author counting over a repository with a merged side branch.
use contribstats::analysis::git::{count_commits_by_author_blocking, walk_history};
use contribstats::analysis::{count_commits_by_author, ScanOptions};
use contribstats::RepositoryHandle;
use criterion::{criterion_group, criterion_main, Criterion};
use git2::{Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Set up a large test repository for benchmarking
/// Creates a repository with alternating authors and a merged `develop` branch
///
/// # Returns
/// * `(TempDir, Repository)` - Temporary directory and initialized repository
fn setup_large_test_repo() -> (TempDir, Repository) {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path()).unwrap();

    // Create initial commit
    let signature = Signature::now("Test User", "test@example.com").unwrap();
    let tree_id = {
        let mut index = repo.index().unwrap();
        index.write_tree().unwrap()
    };

    {
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            "Initial commit",
            &tree,
            &[],
        )
        .unwrap();
    }

    // Create multiple files and commits to simulate a large repository
    for i in 0..500 {
        let file_name = format!("file_{}.txt", i);
        let content = format!("Content for file {}\n", i);
        fs::write(temp_dir.path().join(&file_name), content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(&file_name)).unwrap();
        index.write().unwrap();

        let tree_id = index.write_tree().unwrap();
        let parent = repo.head().unwrap().peel_to_commit().unwrap();

        // Alternate between different authors
        let author = if i % 2 == 0 {
            Signature::now("Test User", "test@example.com").unwrap()
        } else {
            Signature::now("Another User", "another@example.com").unwrap()
        };

        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(
            Some("HEAD"),
            &author,
            &author,
            &format!("Add {}", file_name),
            &tree,
            &[&parent],
        )
        .unwrap();
    }

    // Side branch merged back into HEAD
    {
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        let develop = repo.branch("develop", &head, false).unwrap();
        let develop_ref = develop.get().name().unwrap().to_string();
        let tree = head.tree().unwrap();

        for i in 0..50 {
            let parent = repo.find_reference(&develop_ref).unwrap().peel_to_commit().unwrap();
            repo.commit(
                Some(&develop_ref),
                &signature,
                &signature,
                &format!("Develop change {}", i),
                &tree,
                &[&parent],
            )
            .unwrap();
        }

        let side = repo.find_reference(&develop_ref).unwrap().peel_to_commit().unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "Merge develop", &tree, &[&head, &side])
            .unwrap();
    }

    (temp_dir, repo)
}

/// Benchmark history scanning
///
/// # Arguments
/// * `c` - Criterion benchmark configuration
fn bench_scanning(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_scan");
    let rt = Runtime::new().unwrap();
    let (temp_dir, repo) = setup_large_test_repo();
    let handle = RepositoryHandle::existing(temp_dir.path()).unwrap();
    let authors = vec!["Test User".to_string()];

    group.bench_function("walk_history", |b| {
        b.iter(|| walk_history(&repo, ScanOptions::default()).unwrap().count());
    });

    group.bench_function("count_by_author", |b| {
        b.iter(|| count_commits_by_author_blocking(&handle, &authors, ScanOptions::default()).unwrap());
    });

    group.bench_function("count_by_author_first_parent", |b| {
        let options = ScanOptions {
            first_parent_only: true,
        };
        b.iter(|| count_commits_by_author_blocking(&handle, &authors, options).unwrap());
    });

    group.bench_function("count_by_author_async", |b| {
        b.iter(|| {
            rt.block_on(async {
                count_commits_by_author(handle.clone(), authors.clone(), ScanOptions::default())
                    .await
                    .unwrap()
            })
        });
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_scanning
);
criterion_main!(benches);
