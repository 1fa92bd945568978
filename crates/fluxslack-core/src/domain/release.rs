//! Release results reported by Flux for (auto)release events.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Outcome of updating a single workload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadStatus {
    Success,
    Failed,
    Skipped,
    Ignored,
    #[serde(other)]
    Unknown,
}

/// An image change applied to one container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerUpdate {
    #[serde(rename = "Container")]
    pub container: String,
    #[serde(rename = "Current")]
    pub current: String,
    #[serde(rename = "Target")]
    pub target: String,
}

/// Per-workload release outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkloadResult {
    #[serde(rename = "Status")]
    pub status: WorkloadStatus,

    #[serde(rename = "Error", default, skip_serializing_if = "String::is_empty")]
    pub error: String,

    #[serde(rename = "PerContainer", default, skip_serializing_if = "Vec::is_empty")]
    pub per_container: Vec<ContainerUpdate>,
}

/// Release outcome keyed by workload identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ReleaseResult(pub BTreeMap<String, WorkloadResult>);

impl ReleaseResult {
    /// Target images of every successfully updated container, de-duplicated
    /// and sorted.
    pub fn changed_images(&self) -> Vec<String> {
        let images: BTreeSet<&str> = self
            .0
            .values()
            .filter(|workload| workload.status == WorkloadStatus::Success)
            .flat_map(|workload| workload.per_container.iter())
            .map(|update| update.target.as_str())
            .collect();

        images.into_iter().map(str::to_string).collect()
    }
}

/// Metadata shared by `release` and `autorelease` events.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReleaseMetadata {
    /// Revision holding the release commit.
    #[serde(rename = "Revision", alias = "revision", default)]
    pub revision: String,

    #[serde(rename = "Result", alias = "result", default)]
    pub result: ReleaseResult,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}
