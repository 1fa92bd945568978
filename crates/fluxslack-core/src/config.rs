//! Notifier configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::uri::DEFAULT_WORKLOAD_URI_TEMPLATE;

/// Default bound on a single webhook call.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Everything needed to compose and deliver notifications.
///
/// Read once when the notifier is built; never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Slack incoming-webhook URL.
    pub webhook_url: String,

    /// Cluster name shown in sync notifications.
    pub cluster_name: String,

    /// Root URL of the config repository (e.g. `https://github.com/org/config`).
    pub vcs_root_url: String,

    /// Channel override; empty keeps the webhook's channel.
    #[serde(default)]
    pub channel: String,

    /// Display name override; empty keeps the webhook's name.
    #[serde(default)]
    pub username: String,

    /// Text appended to every header.
    #[serde(default)]
    pub message_postfix: String,

    #[serde(default = "default_workload_uri_template")]
    pub workload_uri_template: String,

    /// Repository prefixes removed from image names before display.
    #[serde(default)]
    pub omitted_repository_urls: Vec<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_workload_uri_template() -> String {
    DEFAULT_WORKLOAD_URI_TEMPLATE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl NotifierConfig {
    /// Config with the three required settings and defaults for the rest.
    pub fn new(webhook_url: &str, cluster_name: &str, vcs_root_url: &str) -> Self {
        NotifierConfig {
            webhook_url: webhook_url.to_string(),
            cluster_name: cluster_name.to_string(),
            vcs_root_url: vcs_root_url.to_string(),
            channel: String::new(),
            username: String::new(),
            message_postfix: String::new(),
            workload_uri_template: default_workload_uri_template(),
            omitted_repository_urls: Vec::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_channel(mut self, channel: &str) -> Self {
        self.channel = channel.to_string();
        self
    }

    pub fn with_username(mut self, username: &str) -> Self {
        self.username = username.to_string();
        self
    }

    pub fn with_message_postfix(mut self, postfix: &str) -> Self {
        self.message_postfix = postfix.to_string();
        self
    }

    pub fn with_workload_uri_template(mut self, template: &str) -> Self {
        self.workload_uri_template = template.to_string();
        self
    }

    pub fn with_omitted_repository_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.omitted_repository_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
