use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;

use crate::types::{ContributionQuery, ContributionSummary, MetricResult};

/// A summary together with what was asked and when.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub query: ContributionQuery,
    pub summary: ContributionSummary,
    pub generated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(query: ContributionQuery, summary: ContributionSummary) -> Self {
        Self {
            query,
            summary,
            generated_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn describe(metric: &MetricResult) -> String {
    match (metric.value(), metric.error_detail()) {
        (Some(value), _) => value.to_string(),
        (None, Some(cause)) => format!("unavailable ({cause})"),
        (None, None) => "unavailable".to_string(),
    }
}

/// Plain-text rendering of a report, one metric per line.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(
        out,
        "Contributions of {} in {}",
        report.query.login,
        report.query.slug()
    );
    for (name, metric) in summary.metrics() {
        let _ = writeln!(out, "  {:<15} {}", format!("{name}:"), describe(metric));
    }

    if summary.all_failed() {
        let _ = writeln!(out, "No data available.");
    } else if summary.commit_counts_diverge() {
        let _ = writeln!(
            out,
            "Note: remote and local commit counts differ; author matching may not cover every alias."
        );
    }
    out
}
