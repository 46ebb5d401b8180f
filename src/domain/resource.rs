//! Kit account resources and their local cache entries

use super::ids::ResourceId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kinds of Kit account resources kept in the local cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Forms,
    Tags,
    Sequences,
    CustomFields,
}

impl ResourceKind {
    /// All kinds, in refresh order
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Forms,
        ResourceKind::Tags,
        ResourceKind::Sequences,
        ResourceKind::CustomFields,
    ];

    /// API path segment and cache key
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Forms => "forms",
            ResourceKind::Tags => "tags",
            ResourceKind::Sequences => "sequences",
            ResourceKind::CustomFields => "custom_fields",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown resource kind '{s}'"))
    }
}

/// A named Kit resource (form, tag, sequence or custom field)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,

    /// Custom fields are addressed by key rather than id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// A resource list as last fetched from Kit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResources {
    pub kind: ResourceKind,
    pub resources: Vec<Resource>,
    pub fetched_at: DateTime<Utc>,
}

impl CachedResources {
    /// Creates a cache entry stamped with the current time
    pub fn new(kind: ResourceKind, resources: Vec<Resource>) -> Self {
        Self {
            kind,
            resources,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the entry is older than `ttl_seconds` at `now`
    pub fn is_stale(&self, ttl_seconds: u64, now: DateTime<Utc>) -> bool {
        let ttl = Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));
        now.signed_duration_since(self.fetched_at) >= ttl
    }

    /// Looks a resource up by id
    pub fn find(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }
}
