//! Analysis Backend Client
//!
//! A client for the analysis backend, fetching market data and spreadsheet exports.

use crate::backend::Backend;
use crate::backend::error::BackendError;
use crate::consts::cli_consts::network;
use crate::model::wire::{self, WireResponse};
use crate::model::{QueryParams, ResponsePayload};
use crate::profile::BackendProfile;
use log::debug;
use reqwest::{Client, ClientBuilder, Response};
use serde_json::Value;

// Build timestamp in milliseconds since epoch
const BUILD_TIMESTAMP: &str = env!("BUILD_TIMESTAMP", "Build timestamp not available");

// User-Agent string with client version
const USER_AGENT: &str = concat!("market-dashboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    profile: BackendProfile,
}

impl BackendClient {
    pub fn new(base_url: &str, profile: BackendProfile) -> Result<Self, BackendError> {
        let client = ClientBuilder::new()
            .connect_timeout(network::connect_timeout())
            .timeout(network::request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            profile,
        })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn handle_response_status(response: Response) -> Result<Response, BackendError> {
        if !response.status().is_success() {
            return Err(BackendError::from_response(response).await);
        }
        Ok(response)
    }

    async fn post_json(&self, endpoint: &str, body: &Value) -> Result<Response, BackendError> {
        let url = self.build_url(endpoint);
        debug!("post_json | url: {}", url);

        let response = self
            .client
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .header("X-Build-Timestamp", BUILD_TIMESTAMP)
            .json(body)
            .send()
            .await?;

        Self::handle_response_status(response).await
    }
}

#[async_trait::async_trait]
impl Backend for BackendClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn profile(&self) -> BackendProfile {
        self.profile
    }

    async fn fetch_data(&self, params: &QueryParams) -> Result<ResponsePayload, BackendError> {
        let body = wire::request_body(params, self.profile.data_symbol_field());
        let response = self.post_json(self.profile.data_path(), &body).await?;

        // Read the whole body first so a malformed 2xx is a decode error, not a transport one.
        let bytes = response.bytes().await?;
        let wire: WireResponse = serde_json::from_slice(&bytes)?;
        let payload = ResponsePayload::try_from(wire)?;

        debug!(
            "fetch_data | {} historical points, {} forecast points",
            payload.series.len(),
            payload.forecast.len()
        );
        Ok(payload)
    }

    async fn download_spreadsheet(&self, params: &QueryParams) -> Result<Vec<u8>, BackendError> {
        let body = wire::request_body(params, self.profile.download_symbol_field());
        let response = self.post_json(self.profile.download_path(), &body).await?;
        let bytes = response.bytes().await?;
        debug!("download_spreadsheet | {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode, routing::post};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    fn params() -> QueryParams {
        QueryParams {
            symbol: "AAPL".to_string(),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            horizon: 30,
            indicators: BTreeSet::new(),
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn fetch_data_posts_query_and_parses_payload() {
        let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let app = Router::new().route(
            "/data",
            post(move |Json(body): Json<Value>| {
                let recorder = recorder.clone();
                async move {
                    recorder.lock().unwrap().push(body);
                    Json(json!({
                        "meta": {"symbol": "AAPL", "horizon": 1},
                        "data": [{"Date": "2023-01-02", "Open": 1.0, "High": 2.0, "Low": 0.5,
                                  "Close": 1.5, "Volume": 100, "Pred": 1.4}],
                        "future": [{"Date": "2023-01-03", "Pred": 1.6}]
                    }))
                }
            }),
        );
        let base = serve(app).await;

        let client = BackendClient::new(&base, BackendProfile::Standard).unwrap();
        let payload = client.fetch_data(&params()).await.unwrap();

        assert_eq!(payload.series.len(), 1);
        assert_eq!(payload.forecast.len(), 1);
        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["symbol"], "AAPL");
        assert_eq!(requests[0]["start"], "2023-01-01");
        assert_eq!(requests[0]["end"], "2023-06-01");
        assert_eq!(requests[0]["horizon"], 30);
    }

    #[tokio::test]
    async fn legacy_profile_uses_its_route_and_field() {
        let app = Router::new().route(
            "/get_data",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "meta": {"ticker": body["ticker"], "horizon": 1},
                    "data": []
                }))
            }),
        );
        let base = serve(app).await;

        let client = BackendClient::new(&base, BackendProfile::Legacy).unwrap();
        let payload = client.fetch_data(&params()).await.unwrap();
        assert_eq!(payload.meta.symbol, "AAPL");
    }

    #[tokio::test]
    async fn error_status_keeps_backend_message() {
        let app = Router::new().route(
            "/data",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "ticker not found"})),
                )
            }),
        );
        let base = serve(app).await;

        let client = BackendClient::new(&base, BackendProfile::Standard).unwrap();
        match client.fetch_data(&params()).await {
            Err(BackendError::Http { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message.as_deref(), Some("ticker not found"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn error_status_with_html_body_has_no_message() {
        let app = Router::new().route(
            "/data",
            post(|| async { (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") }),
        );
        let base = serve(app).await;

        let client = BackendClient::new(&base, BackendProfile::Standard).unwrap();
        let err = client.fetch_data(&params()).await.unwrap_err();
        assert!(matches!(
            err,
            BackendError::Http {
                status: 502,
                message: None
            }
        ));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let app = Router::new().route("/data", post(|| async { "not json" }));
        let base = serve(app).await;

        let client = BackendClient::new(&base, BackendProfile::Standard).unwrap();
        let err = client.fetch_data(&params()).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn download_returns_raw_bytes_and_sends_ticker_field() {
        let app = Router::new().route(
            "/download",
            post(|Json(body): Json<Value>| async move {
                if body["ticker"] == "AAPL" {
                    (StatusCode::OK, vec![0x50u8, 0x4b, 0x03, 0x04])
                } else {
                    (StatusCode::BAD_REQUEST, Vec::new())
                }
            }),
        );
        let base = serve(app).await;

        let client = BackendClient::new(&base, BackendProfile::Standard).unwrap();
        let bytes = client.download_spreadsheet(&params()).await.unwrap();
        assert_eq!(bytes, vec![0x50, 0x4b, 0x03, 0x04]);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = format!("http://{}", addr);
        let client = BackendClient::new(&base, BackendProfile::Standard).unwrap();
        let err = client.fetch_data(&params()).await.unwrap_err();
        assert!(matches!(err, BackendError::Reqwest(_)));
    }
}
