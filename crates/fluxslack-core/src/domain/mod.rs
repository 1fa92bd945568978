//! Domain models for Flux events.
//!
//! - `Event`: a Flux event and its kind-specific payload
//! - `ResourceId`: the workload identifier used across events
//! - `ReleaseResult`: per-workload outcome of an (auto)release

pub mod event;
pub mod release;
pub mod resource;

pub use event::{
    short_revision, Commit, CommitMetadata, Event, EventPayload, SyncMetadata, SHORT_REVISION_LEN,
};
pub use release::{ContainerUpdate, ReleaseMetadata, ReleaseResult, WorkloadResult, WorkloadStatus};
pub use resource::ResourceId;
