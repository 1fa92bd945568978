//! The compose-and-send seam used by the webhook receiver.

use async_trait::async_trait;

use crate::compose::Composer;
use crate::config::NotifierConfig;
use crate::delivery::{ClientConfig, DeliveryClient};
use crate::domain::Event;
use crate::error::{ConfigError, Result};
use crate::message::Message;

/// Something that can turn an event into a message and deliver it.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Compose a message for the event. Never fails.
    fn compose(&self, event: &Event) -> Message;

    /// Deliver a message with a single attempt.
    async fn send(&self, message: &Message) -> Result<()>;
}

/// Slack incoming-webhook notifier.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    composer: Composer,
    client: DeliveryClient,
}

impl SlackNotifier {
    /// Build from configuration. Fails on a malformed workload URI template
    /// or webhook URL.
    pub fn new(config: &NotifierConfig) -> std::result::Result<Self, ConfigError> {
        let composer = Composer::new(config)?;
        let client = DeliveryClient::new(
            &config.webhook_url,
            ClientConfig {
                timeout: config.request_timeout(),
                ..ClientConfig::default()
            },
        )?;

        Ok(Self::from_parts(composer, client))
    }

    pub fn from_parts(composer: Composer, client: DeliveryClient) -> Self {
        Self { composer, client }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn client(&self) -> &DeliveryClient {
        &self.client
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn compose(&self, event: &Event) -> Message {
        self.composer.compose(event)
    }

    async fn send(&self, message: &Message) -> Result<()> {
        self.client.send(message).await
    }
}
