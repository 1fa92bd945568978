//! HTTP delivery of composed messages to the Slack webhook.
//!
//! Exactly one POST per [`DeliveryClient::send`]. The client never retries;
//! a rate-limited response is reported with the wait the endpoint asked for
//! and the caller decides what to do with it.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use tracing::{debug, error, warn};

use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::error::{ConfigError, DeliveryError, Result};
use crate::message::Message;

/// Settings for the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound on a whole request, connect through body.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: concat!("fluxslack/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Posts messages to a single webhook endpoint.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl DeliveryClient {
    /// Build a client for `webhook_url`.
    pub fn new(webhook_url: &str, config: ClientConfig) -> std::result::Result<Self, ConfigError> {
        let endpoint = parse_endpoint(webhook_url)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self::with_client(client, endpoint))
    }

    /// Wrap an already configured HTTP client.
    pub fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn send(&self, message: &Message) -> Result<()> {
        let host = self.endpoint.host_str().unwrap_or_default();
        let body = serde_json::to_vec(message)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %host, timeout = e.is_timeout(), connect = e.is_connect(), "Failed to post webhook: {}", e);
                DeliveryError::from(e)
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint = %host, status = status.as_u16(), "Message delivered");
            return Ok(());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let value = response
                .headers()
                .get(RETRY_AFTER)
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

            return Err(match parse_retry_after(value.as_deref()) {
                Some(retry_after) => {
                    warn!(
                        endpoint = %host,
                        retry_after_secs = retry_after.as_secs(),
                        "Webhook rate limited"
                    );
                    DeliveryError::RateLimited { retry_after }
                }
                None => {
                    warn!(endpoint = %host, retry_after = ?value, "Webhook rate limited without a usable Retry-After");
                    DeliveryError::RetryAfterUnusable { value }
                }
            });
        }

        // Slack sends HTML along with 5xx; keep it raw for diagnostics.
        let status = status.as_u16();
        match response.text().await {
            Ok(body) => {
                error!(endpoint = %host, status, body = %body, "Slack returned HTTP {}", status);
                Err(DeliveryError::DeliveryFailed { status, body })
            }
            Err(source) => {
                error!(endpoint = %host, status, "Slack returned HTTP {}; body unreadable: {}", status, source);
                Err(DeliveryError::ResponseBody { status, source })
            }
        }
    }
}

fn parse_endpoint(webhook_url: &str) -> std::result::Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidUrl {
        url: webhook_url.to_string(),
        reason,
    };

    let url = Url::parse(webhook_url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme {}", other))),
    }
}

/// Delay-seconds form of `Retry-After`. HTTP-date values are not accepted.
fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value?.trim().parse::<u64>().ok().map(Duration::from_secs)
}
