//! # Contribution Statistics Library
//!
//! `contribstats` summarises what one author contributed to one repository.
//! Counts come from two independent sources: the hosting service's search API
//! (commits, pull requests, issues) and a local clone of the repository's
//! history (commits). A failure in one source never hides the results of the
//! others; only failing to provision the local clone ends a run.
//!
//! ## Example
//!
//! ```no_run
//! use contribstats::analysis::{clone_url, default_clone_path, Aggregator, SearchClient};
//! use contribstats::app::Settings;
//! use contribstats::ContributionQuery;
//!
//! # async fn example() -> Result<(), contribstats::ContribError> {
//! let settings = Settings::default();
//! let query = ContributionQuery::new("pnpm", "pnpm", "zkochan").with_aliases(["Zoltan Kochan"]);
//!
//! let aggregator = Aggregator::new(SearchClient::from_settings(&settings)?);
//! let summary = aggregator
//!     .run(
//!         &query,
//!         &clone_url(&settings.clone_host, &query.owner, &query.repository),
//!         default_clone_path(&settings.scratch_root, &query.owner, &query.repository),
//!     )
//!     .await?;
//!
//! if let Some(prs) = summary.pull_request_count.value() {
//!     println!("pull requests: {prs}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod app;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use error::{ContribError, MetricError};
pub use types::{
    CommitRecord, ContributionQuery, ContributionSummary, MetricKind, MetricResult, RepositoryHandle,
};
