pub mod aggregate;
pub mod git;
pub mod provision;
pub mod remote;


pub use aggregate::Aggregator;
pub use git::{count_commits_by_author, ScanOptions};
pub use provision::{clone_url, default_clone_path, ensure_local};
pub use remote::SearchClient;
