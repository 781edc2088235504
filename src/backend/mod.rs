use crate::backend::error::BackendError;
use crate::model::{QueryParams, ResponsePayload};
use crate::profile::BackendProfile;

pub(crate) mod client;
pub use client::BackendClient;
pub mod error;

#[cfg(test)]
use mockall::{automock, predicate::*};

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    fn base_url(&self) -> &str;

    fn profile(&self) -> BackendProfile;

    /// Fetches price history, indicators and forecast for the query.
    async fn fetch_data(&self, params: &QueryParams) -> Result<ResponsePayload, BackendError>;

    /// Fetches the spreadsheet export for the query as raw bytes.
    async fn download_spreadsheet(&self, params: &QueryParams) -> Result<Vec<u8>, BackendError>;
}
