//! Client settings: base URL, headers and transport timeout.
//!
//! # Design
//! `ClientConfig::default()` targets the public API. `from_env` layers
//! `GITHUB_API_*` variables on top and fails with `ConfigError` on a value it
//! cannot use. The base URL is normalized once, here, to end with `/`, so
//! request building only ever appends path segments.
//!
//! The one `expect` parses the `DEFAULT_BASE_URL` constant, never runtime
//! input; `defaults_target_public_api` covers it.

use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";
pub const GITHUB_V3_ACCEPT: &str = "application/vnd.github.v3+json";

/// Settings shared by every request an `ApiClient` sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Always ends with `/`; endpoint segments are appended after it.
    pub base_url: Url,
    pub user_agent: String,
    pub accept: String,
    /// Applied by the transport; `None` leaves the transport's own default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            user_agent: concat!("ghsearch-core/", env!("CARGO_PKG_VERSION")).to_string(),
            accept: GITHUB_V3_ACCEPT.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `GITHUB_API_URL`, `GITHUB_API_USER_AGENT` and
    /// `GITHUB_API_TIMEOUT_SECS` when they are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("GITHUB_API_URL") {
            config = config.with_base_url(&raw)?;
        }
        if let Ok(user_agent) = env::var("GITHUB_API_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Ok(raw) = env::var("GITHUB_API_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "GITHUB_API_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        var: "GITHUB_API_URL",
        value: raw.to_string(),
    };
    let mut url = Url::parse(raw).map_err(|_| invalid())?;
    if url.cannot_be_a_base() {
        return Err(invalid());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
