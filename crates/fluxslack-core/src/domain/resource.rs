//! Workload identifiers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseResourceIdError;

/// Kind given to identifiers in the legacy `<namespace>/<service>` form.
pub const LEGACY_KIND: &str = "service";

/// Identifies a deployable unit in the cluster.
///
/// On the wire (and in its default string form) an identifier is
/// `<namespace>:<kind>/<name>`, e.g. `default:deployment/helloworld`. The
/// legacy `<namespace>/<service>` form is also accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId {
    pub namespace: String,
    pub kind: String,
    pub name: String,
}

impl ResourceId {
    /// Create a new resource identifier.
    pub fn new(
        namespace: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Look up a component by its template field name.
    pub fn field(&self, field: &str) -> Option<&str> {
        match field {
            "Namespace" => Some(&self.namespace),
            "Kind" => Some(&self.kind),
            "Name" => Some(&self.name),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}/{}", self.namespace, self.kind, self.name)
    }
}

impl FromStr for ResourceId {
    type Err = ParseResourceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseResourceIdError {
            input: s.to_string(),
        };

        let (namespace, kind, name) = match s.split_once(':') {
            Some((namespace, rest)) => {
                let (kind, name) = rest.split_once('/').ok_or_else(invalid)?;
                (namespace, kind.to_lowercase(), name)
            }
            // Legacy `<namespace>/<service>` form.
            None => {
                let (namespace, name) = s.split_once('/').ok_or_else(invalid)?;
                (namespace, LEGACY_KIND.to_string(), name)
            }
        };
        if namespace.is_empty() || kind.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self::new(namespace, kind, name))
    }
}

impl TryFrom<String> for ResourceId {
    type Error = ParseResourceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.to_string()
    }
}
