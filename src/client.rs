//! HTTP client for a running gateway.
//!
//! Used by `check --url` to send extracted snippets to a shared gateway
//! instead of running the linter locally.
//!
//! # Retry Behavior
//!
//! The client retries transient errors:
//! - Connection failures and timeouts
//! - Server errors (5xx), which includes a linter timeout (504)
//!
//! Retry delays use exponential backoff with configurable parameters.
//!
//! # Example
//!
//! ```
//! use sql_lint_gateway::{client::GatewayClient, config::RetryConfig};
//!
//! let client = GatewayClient::with_retry_config("http://localhost:8000", RetryConfig::default());
//! ```

use std::time::Duration;

use serde::Deserialize;
use tokio::time::sleep;

use crate::{
    config::RetryConfig,
    error::{
        AppError, AppErrorKind, AppResult, error_message, gateway_api_error,
        gateway_rejected_error, http_error
    },
    lint::{LintRequest, LintResponse}
};

/// Gateway client with retry support.
pub struct GatewayClient {
    base_url:     String,
    client:       reqwest::Client,
    retry_config: RetryConfig
}

/// Error body returned by the gateway.
#[derive(Deserialize)]
struct ErrorBody {
    message: String
}

impl GatewayClient {
    /// Create new client with default retry configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_retry_config(base_url, RetryConfig::default())
    }

    /// Create new client with custom retry configuration
    pub fn with_retry_config(base_url: impl Into<String>, retry_config: RetryConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into(),
            client,
            retry_config
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request to `POST /lint`, retrying transient failures
    pub async fn lint(&self, request: &LintRequest) -> AppResult<LintResponse> {
        let mut last_error = None;
        let mut delay = self.retry_config.initial_delay_ms;
        for attempt in 0..=self.retry_config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = self.retry_config.max_retries + 1,
                    delay_ms = delay,
                    "retrying gateway request"
                );
                sleep(Duration::from_millis(delay)).await;
                delay = ((delay as f64 * self.retry_config.backoff_factor) as u64)
                    .min(self.retry_config.max_delay_ms);
            }
            match self.send(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if is_retryable_error(&e) {
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| gateway_api_error("All retry attempts failed")))
    }

    async fn send(&self, request: &LintRequest) -> AppResult<LintResponse> {
        let url = format!("{}/lint", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            if !status.is_server_error() {
                return Err(gateway_rejected_error(status.as_u16(), &message));
            }
            return Err(gateway_api_error(format!(
                "Lint service error {}: {}",
                status.as_u16(),
                message
            )));
        }
        response.json().await.map_err(http_error)
    }
}

fn is_retryable_error(error: &AppError) -> bool {
    // Rejections carry the gateway's own message, which may mention timeouts.
    if error.kind == AppErrorKind::BadRequest {
        return false;
    }
    let msg = error_message(error).to_lowercase();
    msg.contains("timeout")
        || msg.contains("connection")
        || msg.contains("error 500")
        || msg.contains("error 502")
        || msg.contains("error 503")
        || msg.contains("error 504")
}
