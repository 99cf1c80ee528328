use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::{bool_field, str_field, time_field};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Published,
    Unpublished,
    #[default]
    Unknown,
}

impl PublishStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "published" => Self::Published,
            "unpublished" => Self::Unpublished,
            _ => Self::Unknown,
        }
    }
}

/// One published version of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Version {
    pub id: String,
    pub version: String,
    pub created_at: Option<DateTime<Utc>>,
    pub publish_status: PublishStatus,
    pub deprecated: bool,
}

impl Version {
    /// Accepts a full version object or a bare version name.
    pub fn from_value(value: &Value) -> Option<Self> {
        if let Some(name) = value.as_str() {
            return Some(Self {
                id: String::new(),
                version: name.to_string(),
                created_at: None,
                publish_status: PublishStatus::Unknown,
                deprecated: false,
            });
        }
        let obj = value.as_object()?;
        Some(Self {
            id: str_field(obj, &["id"]).unwrap_or_default(),
            version: str_field(obj, &["version", "name"]).unwrap_or_default(),
            created_at: time_field(obj, &["created_at", "createdAt"]),
            publish_status: str_field(obj, &["publish_status", "publishStatus"])
                .map(|s| PublishStatus::from_str(&s))
                .unwrap_or_default(),
            deprecated: bool_field(obj, &["deprecated"]),
        })
    }
}

/// Version with the greatest `created_at`.
///
/// Version names are never compared. Among equal timestamps the earliest in
/// backend order wins, and versions without a timestamp lose to any that have
/// one.
pub fn latest_version(versions: &[Version]) -> Option<&Version> {
    versions.iter().fold(None, |best: Option<&Version>, v| match best {
        Some(b) if v.created_at <= b.created_at => Some(b),
        _ => Some(v),
    })
}

/// A service package as returned by catalog search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub versions: Vec<Version>,
    pub description: Option<String>,
    pub has_documentation: bool,
}

impl CatalogEntry {
    /// Search hits may be wrapped as `{ "source": { ... } }`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let inner = value.get("source").unwrap_or(value);
        let obj = inner.as_object()?;
        let id = str_field(obj, &["id"]).unwrap_or_default();
        let name = str_field(obj, &["display_name", "name"]).unwrap_or_else(|| id.clone());
        let versions = obj
            .get("versions")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(Version::from_value).collect())
            .unwrap_or_default();
        Some(Self {
            id,
            name,
            versions,
            description: str_field(obj, &["description"]),
            has_documentation: bool_field(obj, &["has_documentation", "hasDocumentation"]),
        })
    }

    pub fn latest_version(&self) -> Option<&Version> {
        latest_version(&self.versions)
    }
}
