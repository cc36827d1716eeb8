//! HTTP client for the remote document question-answering service.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// How a remote call went wrong. Both kinds are recovered locally; neither
/// is fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service responded with a non-success status and a reason.
    #[error("{detail}")]
    Rejected { detail: String },
    /// No interpretable response was obtained (connectivity loss, malformed
    /// body).
    #[error("{0}")]
    Transport(String),
}

/// Successful `/chat/` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<String>,
}

/// The seam between the orchestrator and the transport. `ApiClient` is the
/// real implementation; tests substitute a scripted fake.
#[async_trait]
pub trait QaService: Send + Sync {
    async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ServiceError>;

    async fn ask(&self, query: &str) -> Result<ChatAnswer, ServiceError>;

    async fn reset(&self) -> Result<(), ServiceError>;
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn from_env() -> Result<Self> {
        let base_url = dotenv::var("DOCCHAT_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = dotenv::var("DOCCHAT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Uniform outcome classification for all three endpoints.
    ///
    /// A body that fails to parse as JSON is a transport failure regardless
    /// of status — there is no interpretable response to recover a reason
    /// from. A non-success status with a JSON body is an application-level
    /// rejection carrying the body's `detail`.
    async fn classify(
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<serde_json::Value, ServiceError> {
        let response = sent.map_err(|e| ServiceError::Transport(e.to_string()))?;
        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            let detail = body["detail"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string();
            Err(ServiceError::Rejected { detail })
        }
    }
}

#[async_trait]
impl QaService for ApiClient {
    async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ServiceError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let sent = self
            .client
            .post(self.endpoint("upload-document/"))
            .multipart(form)
            .send()
            .await;

        // Success body carries only a human-readable message; nothing in it
        // is needed client-side.
        Self::classify(sent).await.map(|_| ())
    }

    async fn ask(&self, query: &str) -> Result<ChatAnswer, ServiceError> {
        let body = serde_json::json!({ "query": query });
        let sent = self
            .client
            .post(self.endpoint("chat/"))
            .json(&body)
            .send()
            .await;

        let value = Self::classify(sent).await?;
        serde_json::from_value(value).map_err(|e| ServiceError::Transport(e.to_string()))
    }

    async fn reset(&self) -> Result<(), ServiceError> {
        let sent = self
            .client
            .post(self.endpoint("reset-chatbot/"))
            .json(&serde_json::json!({}))
            .send()
            .await;

        Self::classify(sent).await.map(|_| ())
    }
}
