//! fluxslack core library
//!
//! Composes Slack notifications from Flux events and delivers them to an
//! incoming webhook.
//!
//! - [`compose`]: event → [`Message`], a pure and total function
//! - [`uri`]: workload and commit links
//! - [`delivery`]: one POST per message, with typed failures
//! - [`notifier`]: the [`Notifier`] seam the webhook receiver depends on

pub mod compose;
pub mod config;
pub mod delivery;
pub mod domain;
pub mod error;
pub mod message;
pub mod notifier;
pub mod telemetry;
pub mod uri;

pub use compose::{Composer, AFFECTED_WORKLOADS_HEADING, COMMITS_HEADING, NO_IMAGE_PLACEHOLDER};
pub use config::{NotifierConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use delivery::{ClientConfig, DeliveryClient};
pub use domain::{
    short_revision, Commit, CommitMetadata, ContainerUpdate, Event, EventPayload, ReleaseMetadata,
    ReleaseResult, ResourceId, SyncMetadata, WorkloadResult, WorkloadStatus,
};
pub use error::{
    ConfigError, DeliveryError, EventDecodeError, ParseResourceIdError, Result, TemplateError,
};
pub use message::{Block, Message, TextObject};
pub use notifier::{Notifier, SlackNotifier};
pub use telemetry::init_tracing;
pub use uri::{render_commit_uri, UriTemplate, DEFAULT_WORKLOAD_URI_TEMPLATE};
