//! Error handling for the backend module

use crate::model::PayloadError;
use crate::model::wire::error_message;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never completed: connection refused, DNS, transport timeout.
    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// A 2xx body that is not the expected JSON.
    #[error("Decoding error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A 2xx body that parsed but violates the payload invariants.
    #[error("Invalid payload: {0}")]
    Payload(#[from] PayloadError),

    /// The backend answered with a non-success status.
    #[error("HTTP error with status {status}: {}", message.as_deref().unwrap_or("<no error message>"))]
    Http { status: u16, message: Option<String> },
}

impl BackendError {
    /// Builds an `Http` error, keeping the body's `error` field when it is JSON.
    pub async fn from_response(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| error_message(&body));

        BackendError::Http { status, message }
    }
}
