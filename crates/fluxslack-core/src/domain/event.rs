//! Flux events as received from the Flux daemon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::domain::release::ReleaseMetadata;
use crate::domain::resource::ResourceId;
use crate::error::EventDecodeError;

/// Number of revision characters shown in notifications.
pub const SHORT_REVISION_LEN: usize = 7;

/// First [`SHORT_REVISION_LEN`] characters of a revision, or all of it when
/// shorter.
pub fn short_revision(revision: &str) -> &str {
    match revision.char_indices().nth(SHORT_REVISION_LEN) {
        Some((end, _)) => &revision[..end],
        None => revision,
    }
}

/// A single commit included in a sync.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Commit {
    pub revision: String,
    #[serde(default)]
    pub message: String,
}

/// Metadata carried by `sync` events.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SyncMetadata {
    /// Commits applied by the sync, newest first as Flux reports them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub commits: Vec<Commit>,
}

/// Metadata carried by `commit` events.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CommitMetadata {
    #[serde(default)]
    pub revision: String,
}

/// Kind-specific part of an [`Event`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Flux automatically updated images.
    AutoRelease(ReleaseMetadata),
    /// Flux synced commits from the config repository to the cluster.
    Sync(SyncMetadata),
    /// A release requested by an operator.
    Release(ReleaseMetadata),
    /// Flux pushed a commit to the config repository.
    Commit(CommitMetadata),
    /// Any other event kind, kept verbatim.
    Other { kind: String },
}

impl EventPayload {
    /// The Flux `type` string for this payload.
    pub fn kind(&self) -> &str {
        match self {
            EventPayload::AutoRelease(_) => "autorelease",
            EventPayload::Sync(_) => "sync",
            EventPayload::Release(_) => "release",
            EventPayload::Commit(_) => "commit",
            EventPayload::Other { kind } => kind,
        }
    }
}

/// A Flux event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireEvent")]
pub struct Event {
    pub id: i64,

    /// Workloads affected by the event, in the order Flux reported them.
    pub resource_ids: Vec<ResourceId>,

    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub log_level: String,

    /// Free-form description that overrides the generated one.
    pub message: Option<String>,

    pub payload: EventPayload,
}

impl Event {
    /// Create an event with no timestamps, log level or message.
    pub fn new(resource_ids: Vec<ResourceId>, payload: EventPayload) -> Self {
        Self {
            id: 0,
            resource_ids,
            started_at: None,
            ended_at: None,
            log_level: String::new(),
            message: None,
            payload,
        }
    }

    pub fn kind(&self) -> &str {
        self.payload.kind()
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(message) = self.message.as_deref().filter(|m| !m.is_empty()) {
            return f.write_str(message);
        }

        let services = self.joined_resource_ids();
        let services_or = |fallback: &str| {
            if services.is_empty() {
                fallback.to_string()
            } else {
                services.clone()
            }
        };

        match &self.payload {
            EventPayload::Release(metadata) => write!(
                f,
                "Released: {} to {}",
                joined_images(metadata),
                services_or("<no changes>")
            ),
            EventPayload::AutoRelease(metadata) => {
                write!(f, "Automated release of {}", joined_images(metadata))
            }
            EventPayload::Commit(metadata) => write!(
                f,
                "Commit: {}, {}",
                short_revision(&metadata.revision),
                services_or("<no changes>")
            ),
            EventPayload::Sync(metadata) => {
                let revisions = match metadata.commits.as_slice() {
                    [] => "<no revision>".to_string(),
                    [first] | [first, _] => short_revision(&first.revision).to_string(),
                    [first, .., last] => format!(
                        "{}..{}",
                        short_revision(&last.revision),
                        short_revision(&first.revision)
                    ),
                };
                write!(
                    f,
                    "Sync: {}, {}",
                    revisions,
                    services_or("no workloads changed")
                )
            }
            EventPayload::Other { kind } => {
                let services = services_or("<no changes>");
                match kind.as_str() {
                    "automate" => write!(f, "Automated: {}", services),
                    "deautomate" => write!(f, "Deautomated: {}", services),
                    "lock" => write!(f, "Locked: {}", services),
                    "unlock" => write!(f, "Unlocked: {}", services),
                    "update_policy" => write!(f, "Updated policies: {}", services),
                    other => write!(f, "Unknown event: {}", other),
                }
            }
        }
    }
}

impl Event {
    fn joined_resource_ids(&self) -> String {
        self.resource_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn joined_images(metadata: &ReleaseMetadata) -> String {
    let images = metadata.result.changed_images();
    if images.is_empty() {
        "no image changes".to_string()
    } else {
        images.join(", ")
    }
}

// ── wire format ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    #[serde(default)]
    id: i64,

    #[serde(rename = "serviceIDs", default, deserialize_with = "null_as_default")]
    service_ids: Vec<ResourceId>,

    #[serde(rename = "type")]
    kind: String,

    #[serde(default)]
    started_at: Option<DateTime<Utc>>,

    #[serde(default)]
    ended_at: Option<DateTime<Utc>>,

    #[serde(default)]
    log_level: String,

    #[serde(default)]
    message: Option<String>,

    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

impl TryFrom<WireEvent> for Event {
    type Error = EventDecodeError;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        let payload = match wire.kind.as_str() {
            "autorelease" => EventPayload::AutoRelease(metadata(&wire)?),
            "sync" => EventPayload::Sync(metadata(&wire)?),
            "release" => EventPayload::Release(metadata(&wire)?),
            "commit" => EventPayload::Commit(metadata(&wire)?),
            _ => EventPayload::Other {
                kind: wire.kind.clone(),
            },
        };

        Ok(Event {
            id: wire.id,
            resource_ids: wire.service_ids,
            started_at: wire.started_at,
            ended_at: wire.ended_at,
            log_level: wire.log_level,
            message: wire.message,
            payload,
        })
    }
}

fn metadata<T: serde::de::DeserializeOwned>(wire: &WireEvent) -> Result<T, EventDecodeError> {
    let value = match &wire.metadata {
        Some(value) if !value.is_null() => value.clone(),
        _ => {
            return Err(EventDecodeError::MissingMetadata {
                kind: wire.kind.clone(),
            })
        }
    };

    serde_json::from_value(value).map_err(|source| EventDecodeError::InvalidMetadata {
        kind: wire.kind.clone(),
        source,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
