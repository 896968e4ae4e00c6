//! Contribution statistics tool
//!
//! Prints how many commits, pull requests and issues one author has in a repository.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use contribstats::analysis::{clone_url, default_clone_path, Aggregator, ScanOptions, SearchClient};
use contribstats::app::{render_text, Report, Settings};
use contribstats::ContributionQuery;

#[derive(Debug, Parser)]
#[command(name = "contribstats", version, about)]
struct Cli {
    /// Repository owner
    owner: String,
    /// Repository name
    repo: String,
    /// Account name to search for
    login: String,
    /// Author name to match in local history (repeatable; defaults to the login)
    #[arg(long = "alias", value_name = "NAME")]
    aliases: Vec<String>,
    /// Where the working copy lives
    #[arg(long)]
    dest: Option<PathBuf>,
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Search API base URL
    #[arg(long)]
    api_base: Option<String>,
    /// Host to clone from
    #[arg(long)]
    clone_host: Option<String>,
    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
    /// Only follow first parents when walking local history
    #[arg(long)]
    first_parent: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_json_file(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(api_base) = &self.api_base {
            settings.api_base = api_base.clone();
        }
        if let Some(host) = &self.clone_host {
            settings.clone_host = host.clone();
        }
        if let Some(secs) = self.timeout {
            settings.request_timeout_secs = secs;
        }
        settings.validate()?;
        Ok(settings)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose || cfg!(feature = "dev") { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = cli.settings()?;
    let query = ContributionQuery::new(&cli.owner, &cli.repo, &cli.login).with_aliases(cli.aliases.clone());
    let remote_url = clone_url(&settings.clone_host, &query.owner, &query.repository);
    let dest = cli
        .dest
        .clone()
        .unwrap_or_else(|| default_clone_path(&settings.scratch_root, &query.owner, &query.repository));

    let aggregator = Aggregator::new(SearchClient::from_settings(&settings)?).with_scan_options(ScanOptions {
        first_parent_only: cli.first_parent,
    });
    let summary = aggregator
        .run(&query, &remote_url, dest)
        .await
        .with_context(|| format!("contribution run for {} failed", query.slug()))?;

    let report = Report::new(query, summary);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", render_text(&report));
    }
    Ok(())
}
