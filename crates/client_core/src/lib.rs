//! Client core for the scanner GUI: feed snapshot extraction and the remote
//! batch command seam. The batch itself is owned by the backend; this crate
//! only observes snapshots and issues the three batch commands.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use shared::{
    error::ApiError,
    protocol::{
        ScanBarcodeRequest, SERVICE_CLEAR_BATCH, SERVICE_PROCESS_BATCH, SERVICE_SCAN_BARCODE,
    },
};
use thiserror::Error;
use tracing::{debug, warn};

pub mod feed;

pub use feed::{batch_from_push, snapshot_from_push, FeedHandle, FeedSnapshot};

#[derive(Debug, Error)]
pub enum CommandError {
    /// The backend rejected the call with a structured failure; the message
    /// is surfaced to the operator verbatim.
    #[error("{message}")]
    Rejected { message: String },
    /// The call never produced a backend response.
    #[error("transport failure: {reason}")]
    Transport { reason: String },
}

impl CommandError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Human-readable message for the error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message } => message.clone(),
            Self::Transport { reason } => reason.clone(),
        }
    }
}

/// Remote commands the batch backend exposes, plus the state fetch used for
/// follow-up refreshes. Implemented over HTTP in production and by scripted
/// fakes in tests.
#[async_trait]
pub trait BatchCommands: Send + Sync {
    async fn scan_barcode(&self, request: ScanBarcodeRequest) -> Result<(), CommandError>;
    async fn process_batch(&self) -> Result<(), CommandError>;
    async fn clear_batch(&self) -> Result<(), CommandError>;
    async fn fetch_state(&self) -> Result<Value, CommandError>;
}

/// HTTP implementation of [`BatchCommands`] against the batch backend's
/// service endpoints.
pub struct HttpBatchService {
    http: HttpClient,
    base_url: String,
}

impl HttpBatchService {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: HttpClient::new(),
            base_url,
        }
    }

    fn service_url(&self, service: &str) -> String {
        format!("{}/api/services/{service}", self.base_url)
    }

    async fn call_service(&self, service: &str, body: Value) -> Result<(), CommandError> {
        let response = self
            .http
            .post(self.service_url(service))
            .json(&body)
            .send()
            .await
            .map_err(|err| CommandError::transport(format!("failed to reach backend: {err}")))?;

        let status = response.status();
        if status.is_success() {
            debug!(service, "service call accepted");
            return Ok(());
        }

        let message = match response.json::<ApiError>().await {
            Ok(api_error) => api_error.message,
            Err(_) => format!("backend returned {status}"),
        };
        warn!(service, status = %status, message = %message, "service call rejected");
        Err(CommandError::Rejected { message })
    }
}

#[async_trait]
impl BatchCommands for HttpBatchService {
    async fn scan_barcode(&self, request: ScanBarcodeRequest) -> Result<(), CommandError> {
        let body = serde_json::to_value(&request)
            .map_err(|err| CommandError::transport(format!("invalid scan request: {err}")))?;
        self.call_service(SERVICE_SCAN_BARCODE, body).await
    }

    async fn process_batch(&self) -> Result<(), CommandError> {
        self.call_service(SERVICE_PROCESS_BATCH, Value::Object(Default::default()))
            .await
    }

    async fn clear_batch(&self) -> Result<(), CommandError> {
        self.call_service(SERVICE_CLEAR_BATCH, Value::Object(Default::default()))
            .await
    }

    async fn fetch_state(&self) -> Result<Value, CommandError> {
        let response = self
            .http
            .get(format!("{}/api/state", self.base_url))
            .send()
            .await
            .map_err(|err| CommandError::transport(format!("failed to reach backend: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiError>().await {
                Ok(api_error) => api_error.message,
                Err(_) => format!("backend returned {status}"),
            };
            return Err(CommandError::Rejected { message });
        }

        response
            .json::<Value>()
            .await
            .map_err(|err| CommandError::transport(format!("invalid state payload: {err}")))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
