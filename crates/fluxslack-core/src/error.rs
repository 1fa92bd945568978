//! Error taxonomy for fluxslack.

use std::time::Duration;

/// A workload identifier that is not `<namespace>:<kind>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid resource id {input:?}: expected <namespace>:<kind>/<name>")]
pub struct ParseResourceIdError {
    pub input: String,
}

/// Errors produced while decoding an event from its wire form.
#[derive(Debug, thiserror::Error)]
pub enum EventDecodeError {
    #[error("event kind {kind} requires metadata")]
    MissingMetadata { kind: String },

    #[error("invalid metadata for event kind {kind}: {source}")]
    InvalidMetadata {
        kind: String,
        source: serde_json::Error,
    },
}

/// Errors produced by the resource URI template.
///
/// Everything except [`TemplateError::UnknownField`] is raised while compiling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("unterminated action at byte {offset}")]
    Unterminated { offset: usize },

    #[error("empty action at byte {offset}")]
    EmptyAction { offset: usize },

    #[error("unsupported action {action:?} at byte {offset}: expected a .Field reference")]
    UnsupportedAction { action: String, offset: usize },

    #[error("can't evaluate field {field}")]
    UnknownField { field: String },
}

/// Errors raised while building a notifier from its configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("error parsing workload URI template: {0}")]
    Template(#[from] TemplateError),

    #[error("invalid webhook URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Outcome of a failed delivery, classified so callers can branch per kind.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The endpoint asked us to back off for `retry_after`.
    #[error("API call quota exceeded: retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// The endpoint rate limited us without a usable `Retry-After` header.
    #[error(
        "API call quota exceeded: unusable Retry-After header ({})",
        .value.as_deref().unwrap_or("absent")
    )]
    RetryAfterUnusable { value: Option<String> },

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {status}")]
    DeliveryFailed { status: u16, body: String },

    /// The endpoint answered with a non-success status and its body could
    /// not be read.
    #[error("endpoint returned HTTP {status}; reading the response body failed: {source}")]
    ResponseBody {
        status: u16,
        #[source]
        source: reqwest::Error,
    },

    /// No response was obtained: serialization, connection, DNS or timeout
    /// failure.
    #[error("transport error: {source}")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DeliveryError {
    /// HTTP status returned by the endpoint, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            DeliveryError::RateLimited { .. } | DeliveryError::RetryAfterUnusable { .. } => {
                Some(429)
            }
            DeliveryError::DeliveryFailed { status, .. }
            | DeliveryError::ResponseBody { status, .. } => Some(*status),
            DeliveryError::Transport { .. } => None,
        }
    }

    /// Wait requested by the endpoint before the next attempt.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            DeliveryError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            DeliveryError::RateLimited { .. } | DeliveryError::RetryAfterUnusable { .. }
        )
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, DeliveryError::Transport { .. })
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport {
            source: Box::new(err),
        }
    }
}

impl From<serde_json::Error> for DeliveryError {
    fn from(err: serde_json::Error) -> Self {
        DeliveryError::Transport {
            source: Box::new(err),
        }
    }
}

/// Result type for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;
