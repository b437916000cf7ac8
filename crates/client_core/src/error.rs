use std::path::PathBuf;

use shared::error::ShapeError;
use thiserror::Error;

/// Message shown when the backend fails without a usable `detail`.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{detail}")]
    Server { status: u16, detail: String },
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unreadable response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Shape(#[from] ShapeError),
    #[error("failed to read '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ClientError {
    pub fn server(status: u16, detail: Option<String>) -> Self {
        Self::Server {
            status,
            detail: detail.unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string()),
        }
    }

    /// Text suitable for the transient error notification.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_SERVER_ERROR.to_string()
        } else {
            message
        }
    }
}
