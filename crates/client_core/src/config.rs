use std::{path::Path, time::Duration};

use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CONFIG_FILE: &str = "dataviz";
const ENV_PREFIX: &str = "DATAVIZ";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub request_timeout_secs: u64,
    pub notification_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            request_timeout_secs: 120,
            notification_secs: 5,
        }
    }
}

impl Settings {
    /// Defaults, then `dataviz.toml` (or `config_path`) if present, then
    /// `DATAVIZ__*` environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ClientError> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("server_url", defaults.server_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("notification_secs", defaults.notification_secs as i64)?;

        builder = match config_path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.base_url()?;
        Ok(settings)
    }

    pub fn with_server_url(mut self, server_url: Option<String>) -> Self {
        if let Some(url) = server_url {
            let url = url.trim();
            if !url.is_empty() {
                self.server_url = url.to_string();
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs.max(1))
    }

    pub fn base_url(&self) -> Result<Url, ClientError> {
        normalize_server_url(&self.server_url)
    }
}

/// Parses the server url and guarantees a trailing slash so endpoint paths
/// join below it instead of replacing its last segment.
pub fn normalize_server_url(raw: &str) -> Result<Url, ClientError> {
    let raw = raw.trim();
    let invalid = |reason: String| ClientError::InvalidServerUrl {
        url: raw.to_string(),
        reason,
    };

    let mut url = Url::parse(raw).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
