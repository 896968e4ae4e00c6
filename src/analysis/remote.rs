use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::app::config::Settings;
use crate::error::{ContribError, MetricError};
use crate::types::{ContributionQuery, MetricKind, MetricResult};

/// Only `total_count` is read from a search response.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
}

/// Client for the hosting service's search endpoints.
///
/// Every call issues exactly one GET. There is no retry, pagination or
/// rate-limit handling; failures come back as a failed [`MetricResult`].
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    api_base: String,
    user_agent: String,
}

impl SearchClient {
    /// Create a client against `api_base` with a per-request timeout.
    pub fn new(api_base: &str, user_agent: &str, timeout: Duration) -> Result<Self, ContribError> {
        if user_agent.trim().is_empty() {
            return Err(ContribError::Client("User-Agent must not be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContribError::Client(e.to_string()))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ContribError> {
        Self::new(&settings.api_base, &settings.user_agent, settings.request_timeout())
    }

    /// Search expression for `kind`, terms joined with `+`.
    pub fn search_expression(kind: MetricKind, query: &ContributionQuery) -> String {
        let mut terms = vec![format!("repo:{}", query.slug())];
        if let Some(qualifier) = kind.type_qualifier() {
            terms.push(qualifier.to_string());
        }
        terms.push(format!("author:{}", query.login));
        terms.join("+")
    }

    pub fn search_url(&self, kind: MetricKind, query: &ContributionQuery) -> String {
        format!(
            "{}{}?q={}",
            self.api_base,
            kind.endpoint(),
            Self::search_expression(kind, query)
        )
    }

    /// Count matches for one metric. Never fails; errors are folded into the result.
    pub async fn query(&self, kind: MetricKind, query: &ContributionQuery) -> MetricResult {
        match self.fetch_total(kind, query).await {
            Ok(total) => {
                debug!(%kind, total, repo = %query.slug(), "search succeeded");
                MetricResult::success(total)
            }
            Err(e) => {
                warn!(%kind, repo = %query.slug(), error = %e, "search failed");
                MetricResult::failure(e)
            }
        }
    }

    /// Run the commit, pull request and issue searches concurrently.
    pub async fn query_all(&self, query: &ContributionQuery) -> (MetricResult, MetricResult, MetricResult) {
        tokio::join!(
            self.query(MetricKind::Commits, query),
            self.query(MetricKind::PullRequests, query),
            self.query(MetricKind::Issues, query),
        )
    }

    async fn fetch_total(&self, kind: MetricKind, query: &ContributionQuery) -> Result<u64, MetricError> {
        let response = self
            .client
            .get(self.search_url(kind, query))
            .header(header::ACCEPT, kind.accept_header())
            .header(header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(MetricError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| MetricError::Decode(e.to_string()))?;
        Ok(parsed.total_count)
    }
}
