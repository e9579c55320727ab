//! # taskherd alert sink - Webhook
//!
//! Posts failure summaries to a chat-style incoming webhook as
//! `{"text": "<summary>"}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use taskherd_protocols::{AlertError, AlertSink};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Webhook configuration.
#[derive(Debug, Clone)]
pub struct WebhookAlertConfig {
    /// Incoming webhook URL.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Additional headers, e.g. `Authorization`.
    pub headers: HashMap<String, String>,
}

impl WebhookAlertConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            headers: HashMap::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = timeout.as_secs().max(1);
        self
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }
}

/// Body sent for every alert.
#[derive(Debug, Serialize)]
pub struct AlertPayload<'a> {
    pub text: &'a str,
}

/// Alert sink backed by an HTTP webhook.
pub struct WebhookAlertSink {
    config: WebhookAlertConfig,
    client: Client,
}

impl WebhookAlertSink {
    pub fn new(config: WebhookAlertConfig) -> Result<Self, AlertError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AlertError::Delivery(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn alert(&self, summary: &str) -> Result<(), AlertError> {
        let mut request = self
            .client
            .post(&self.config.url)
            .json(&AlertPayload { text: summary });
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AlertError::Timeout(Duration::from_secs(self.config.timeout_seconds))
            } else {
                AlertError::Delivery(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::Delivery(format!("HTTP {}: {}", status, body)));
        }

        debug!("Alert delivered to {}", self.config.url);
        Ok(())
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
