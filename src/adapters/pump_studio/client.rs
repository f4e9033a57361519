//! Pump Studio API Client
//!
//! HTTP client for the Pump Studio REST API: market discovery, DataPoint
//! snapshots, analysis submission and the paper trading desk.
//!
//! Every request carries a bearer token. GETs are retried on 429, 5xx and
//! transport errors. POSTs are sent once: a retried submission could count
//! twice against the quota.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::types::{
    ApiEnvelope, DataPoint, MarketToken, PaperPortfolioDto, PaperTradePayload, PaperTradeResult,
    SubmissionPayload, SubmitResult,
};
use crate::domain::{AnalysisResult, CatalogItem, MarketTab, Snapshot, SubmissionAck};
use crate::ports::{
    CatalogError, CatalogPort, PaperDeskError, PaperDeskPort, PaperFill, PaperOrder, PaperPortfolio,
};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.pump.studio";

const MARKET_PATH: &str = "/api/v1/market";
const DATAPOINT_PATH: &str = "/api/v1/datapoint";
const SUBMIT_PATH: &str = "/api/v1/analysis/submit";
const PAPER_TRADE_PATH: &str = "/api/v1/paper/trade";
const PAPER_PORTFOLIO_PATH: &str = "/api/v1/paper/portfolio";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{method} {path} returned non-JSON ({status}): {snippet}")]
    NonJson {
        method: &'static str,
        path: String,
        status: u16,
        snippet: String,
    },

    #[error("{method} {path}: {message}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
        message: String,
    },

    #[error("{method} {path}: failed to decode response: {reason}")]
    Decode {
        method: &'static str,
        path: String,
        reason: String,
    },

    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct PumpStudioConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Bearer token
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
    /// Attempts for idempotent requests
    pub max_retries: u32,
}

impl Default for PumpStudioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

/// Pump Studio API client
#[derive(Debug, Clone)]
pub struct PumpStudioClient {
    config: PumpStudioConfig,
    http: Client,
}

impl PumpStudioClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_config(PumpStudioConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    pub fn with_config(mut config: PumpStudioConfig) -> Result<Self, ApiError> {
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("intern/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// List up to `limit` tokens of a market tab
    pub async fn market(&self, tab: MarketTab, limit: usize) -> Result<Vec<MarketToken>, ApiError> {
        let query = [
            ("tab", tab.as_str().to_string()),
            ("limit", limit.to_string()),
            ("format", "json".to_string()),
        ];
        let envelope: ApiEnvelope<Vec<MarketToken>> = self.get(MARKET_PATH, &query).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// Fetch the DataPoint for one token
    pub async fn data_point(&self, mint: &str) -> Result<DataPoint, ApiError> {
        let query = [("mint", mint.to_string())];
        let envelope: ApiEnvelope<DataPoint> = self.get(DATAPOINT_PATH, &query).await?;
        envelope.data.ok_or_else(|| ApiError::Decode {
            method: "GET",
            path: DATAPOINT_PATH.to_string(),
            reason: format!("no DataPoint returned for {}", mint),
        })
    }

    pub async fn submit_analysis(&self, payload: &SubmissionPayload) -> Result<SubmitResult, ApiError> {
        self.post(SUBMIT_PATH, payload).await
    }

    pub async fn paper_trade(&self, payload: &PaperTradePayload) -> Result<PaperTradeResult, ApiError> {
        self.post(PAPER_TRADE_PATH, payload).await
    }

    pub async fn paper_portfolio(&self) -> Result<PaperPortfolioDto, ApiError> {
        let envelope: ApiEnvelope<PaperPortfolioDto> = self.get(PAPER_PORTFOLIO_PATH, &[]).await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ApiError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .execute_with_retry(|| async {
                self.http
                    .get(&url)
                    .query(query)
                    .bearer_auth(&self.config.api_key)
                    .send()
                    .await
                    .map_err(ApiError::from)
            })
            .await?;

        Self::handle_response("GET", path, response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        Self::handle_response("POST", path, response).await
    }

    /// Execute request with retry logic and rate limit handling
    async fn execute_with_retry<F, Fut>(&self, request_fn: F) -> Result<Response, ApiError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<Response, ApiError>>,
    {
        let attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            let is_last = attempt + 1 == attempts;
            match request_fn().await {
                Ok(response) => {
                    let status = response.status();

                    // Handle rate limiting (429) with exponential backoff
                    if status == StatusCode::TOO_MANY_REQUESTS && !is_last {
                        let backoff = Duration::from_secs(2u64.pow(attempt + 1));
                        tracing::warn!(
                            "Rate limited (429), backing off for {:?} (attempt {}/{})",
                            backoff,
                            attempt + 1,
                            attempts
                        );
                        last_error = Some(ApiError::RateLimited);
                        tokio::time::sleep(backoff).await;
                        continue;
                    }

                    // Retry on server errors (5xx)
                    if status.is_server_error() && !is_last {
                        tracing::warn!("Server error {}, retrying (attempt {}/{})", status, attempt + 1, attempts);
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(e) => {
                    tracing::debug!("Request failed: {} (attempt {}/{})", e, attempt + 1, attempts);
                    last_error = Some(e);
                    if !is_last {
                        tokio::time::sleep(Duration::from_millis(500 * (attempt as u64 + 1))).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(ApiError::RateLimited))
    }

    async fn handle_response<T: DeserializeOwned>(
        method: &'static str,
        path: &str,
        response: Response,
    ) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let text = response.text().await?;
        decode_body(method, path, status, &text)
    }
}

/// Decode a response body: non-JSON and non-2xx bodies become errors that
/// carry the server's `error` field when it sent one.
pub fn decode_body<T: DeserializeOwned>(
    method: &'static str,
    path: &str,
    status: u16,
    text: &str,
) -> Result<T, ApiError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|_| ApiError::NonJson {
        method,
        path: path.to_string(),
        status,
        snippet: text.chars().take(200).collect(),
    })?;

    if !(200..300).contains(&status) {
        let message = value
            .get("error")
            .and_then(|e| e.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));
        return Err(ApiError::Status {
            method,
            path: path.to_string(),
            status,
            message,
        });
    }

    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        method,
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl CatalogPort for PumpStudioClient {
    async fn discover(&self, tab: MarketTab, limit: usize) -> Result<Vec<CatalogItem>, CatalogError> {
        let tokens = self.market(tab, limit).await.map_err(|e| CatalogError::Discovery {
            tab,
            reason: e.to_string(),
        })?;

        Ok(tokens
            .into_iter()
            .filter(|t| !t.mint.is_empty())
            .take(limit)
            .map(|t| t.into_item(tab))
            .collect())
    }

    async fn fetch_snapshot(&self, mint: &str) -> Result<Snapshot, CatalogError> {
        let data_point = self.data_point(mint).await.map_err(|e| CatalogError::Fetch {
            mint: mint.to_string(),
            reason: e.to_string(),
        })?;
        Ok(data_point.into_snapshot(mint))
    }

    async fn submit(
        &self,
        item: &CatalogItem,
        snapshot: &Snapshot,
        analysis: &AnalysisResult,
    ) -> Result<SubmissionAck, CatalogError> {
        let payload = SubmissionPayload::new(item, snapshot, analysis);
        let result = self
            .submit_analysis(&payload)
            .await
            .map_err(|e| CatalogError::Submission {
                mint: item.mint.clone(),
                reason: e.to_string(),
            })?;
        Ok(result.into())
    }
}

#[async_trait]
impl PaperDeskPort for PumpStudioClient {
    async fn place_order(&self, order: &PaperOrder) -> Result<PaperFill, PaperDeskError> {
        let payload = PaperTradePayload::from(order);
        let result = self
            .paper_trade(&payload)
            .await
            .map_err(|e| PaperDeskError::RequestFailed(e.to_string()))?;

        if !result.ok {
            return Err(PaperDeskError::Rejected(
                result.error.unwrap_or_else(|| "paper trade not accepted".to_string()),
            ));
        }
        Ok(result.into())
    }

    async fn portfolio(&self) -> Result<PaperPortfolio, PaperDeskError> {
        self.paper_portfolio()
            .await
            .map(PaperPortfolio::from)
            .map_err(|e| PaperDeskError::RequestFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = PumpStudioConfig::default();
        assert_eq!(config.base_url, "https://api.pump.studio");
        assert_eq!(config.max_retries, 3);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = PumpStudioClient::with_config(PumpStudioConfig {
            base_url: "http://localhost:8080/".to_string(),
            api_key: "key".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_decode_non_json() {
        let err = decode_body::<SubmitResult>("POST", SUBMIT_PATH, 502, "<html>Bad gateway</html>")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "POST /api/v1/analysis/submit returned non-JSON (502): <html>Bad gateway</html>"
        );
    }

    #[test]
    fn test_decode_error_status_uses_server_message() {
        let err = decode_body::<SubmitResult>("POST", SUBMIT_PATH, 401, r#"{"ok":false,"error":"invalid api key"}"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "POST /api/v1/analysis/submit: invalid api key");

        let err = decode_body::<SubmitResult>("GET", MARKET_PATH, 500, "{}").unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, ref message, .. } if message == "HTTP 500"));
    }

    #[test]
    fn test_decode_unaccepted_submission_is_ok() {
        let result = decode_body::<SubmitResult>("POST", SUBMIT_PATH, 200, r#"{"ok":false,"error":"cooldown"}"#)
            .unwrap();
        let ack: SubmissionAck = result.into();
        assert!(!ack.accepted);
        assert_eq!(ack.error.as_deref(), Some("cooldown"));
    }

    #[test]
    fn test_decode_missing_data() {
        let envelope = decode_body::<ApiEnvelope<DataPoint>>("GET", DATAPOINT_PATH, 200, r#"{"ok":true}"#)
            .unwrap();
        assert!(envelope.data.is_none());
    }
}
