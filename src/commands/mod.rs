//! Server Command Wrappers
//!
//! Client bindings to the portfolio server's HTTP API, organized by domain.

mod project;
mod sibling;

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sibling_order::StoreError;
use thiserror::Error;

pub use sibling::SiblingCommands;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    Invalid(String),

    /// The server rejected a write that would duplicate a sibling order
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<ClientError> for StoreError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::NotFound(msg) => StoreError::NotFound(msg),
            ClientError::Invalid(msg) => StoreError::Invalid(msg),
            ClientError::Conflict(msg) => StoreError::Conflict(msg),
            other => StoreError::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// `PORTFOLIO_API_URL`, falling back to the local default
    pub fn from_env() -> Self {
        match std::env::var("PORTFOLIO_API_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the portfolio server
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self.http.get(self.url("/api/health")).send().await?;
        Ok(response.status().is_success())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), ClientError> {
        check(request.send().await?).await?;
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Invalid(message),
        StatusCode::CONFLICT => ClientError::Conflict(message),
        _ => ClientError::Status {
            status: status.as_u16(),
            message,
        },
    })
}
