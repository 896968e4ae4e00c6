use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analysis::provision::default_scratch_root;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_CLONE_HOST: &str = "github.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, passed explicitly into the clients that need them.
///
/// Every field has a default, so a settings file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the search API
    pub api_base: String,
    /// Host the working copy is cloned from
    pub clone_host: String,
    /// Sent with every search request; must not be empty
    pub user_agent: String,
    /// Per-request timeout for the search API
    pub request_timeout_secs: u64,
    /// Directory holding the working copies
    pub scratch_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            clone_host: DEFAULT_CLONE_HOST.to_string(),
            user_agent: format!("contribstats/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            scratch_root: default_scratch_root(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject values that would make every request or the clone fail.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request timeout must be at least one second");
        }
        let host = self.clone_host.trim();
        if host.is_empty() {
            anyhow::bail!("clone host must not be empty");
        }
        if host.contains("://") {
            anyhow::bail!("clone host `{host}` must be a bare host name without a scheme");
        }
        if self.user_agent.trim().is_empty() {
            anyhow::bail!("user agent must not be empty");
        }
        Ok(())
    }
}
