use std::{path::Path, time::Duration};

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    error::ErrorDetail,
    protocol::{
        AnalyzeResponse, GenerateRequest, GenerateResult, HealthResponse, ANALYZE_PATH,
        GENERATE_PATH, HEALTH_PATH,
    },
};
use tracing::{info, warn};
use url::Url;

pub mod bridge;
pub mod chart;
pub mod config;
pub mod error;
pub mod wizard;

pub use bridge::{BackendCommand, UiError, UiErrorCategory, UiErrorContext, UiEvent};
pub use config::Settings;
pub use error::ClientError;
pub use wizard::{Step, WizardController, WizardState};

const CSV_MIME: &str = "text/csv";

/// A CSV file read fully into memory, ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CsvUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("data.csv")
            .to_string();
        Ok(Self { file_name, bytes })
    }

    /// File contents as text; invalid UTF-8 sequences become U+FFFD.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// The two wizard endpoints plus the health probe.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        problem: &str,
        upload: &CsvUpload,
    ) -> Result<AnalyzeResponse, ClientError>;
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, ClientError>;
    async fn health(&self) -> Result<HealthResponse, ClientError>;
}

pub struct DatavizClient {
    http: Client,
    base_url: Url,
}

impl DatavizClient {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = config::normalize_server_url(server_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ClientError> {
        Self::new(&settings.server_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidServerUrl {
                url: self.base_url.to_string(),
                reason: err.to_string(),
            })
    }
}

#[async_trait]
impl AnalysisBackend for DatavizClient {
    async fn analyze(
        &self,
        problem: &str,
        upload: &CsvUpload,
    ) -> Result<AnalyzeResponse, ClientError> {
        let file = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(CSV_MIME)?;
        let form = Form::new().text("problem", problem.to_string()).part("file", file);

        info!(
            file = %upload.file_name,
            bytes = upload.bytes.len(),
            "client: posting analysis request"
        );
        let response = self
            .http
            .post(self.endpoint(ANALYZE_PATH)?)
            .multipart(form)
            .send()
            .await?;
        let body: AnalyzeResponse = decode_json(response).await?;
        body.validate()?;
        info!(proposals = body.proposals.len(), "client: analysis received");
        Ok(body)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResult, ClientError> {
        info!(
            chart_type = %request.proposal.chart_type,
            csv_bytes = request.csv_data.len(),
            "client: posting generation request"
        );
        let response = self
            .http
            .post(self.endpoint(GENERATE_PATH)?)
            .json(request)
            .send()
            .await?;
        let body: GenerateResult = decode_json(response).await?;
        body.validate()?;
        info!(
            traces = body.plotly_json.traces().len(),
            code_len = body.code.len(),
            "client: visualization received"
        );
        Ok(body)
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(self.endpoint(HEALTH_PATH)?).send().await?;
        decode_json(response).await
    }
}

/// Decodes a 2xx body as `T`; any other status becomes
/// [`ClientError::Server`] carrying the body's `detail` when present.
async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;
    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorDetail>(&body)
            .ok()
            .and_then(|detail| detail.message());
        warn!(status = status.as_u16(), ?detail, "client: backend rejected request");
        return Err(ClientError::server(status.as_u16(), detail));
    }
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
