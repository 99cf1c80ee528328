use serde::Serialize;
use serde_json::Value;

use crate::models::catalog_entry::{latest_version, Version};
use crate::util::{bool_field, str_field};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServicePackage {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub versions: Vec<Version>,
}

impl ServicePackage {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = str_field(obj, &["id"])?;
        Some(Self {
            name: str_field(obj, &["display_name", "name"]).unwrap_or_else(|| id.clone()),
            id,
            description: str_field(obj, &["description"]),
            versions: obj
                .get("versions")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(Version::from_value).collect())
                .unwrap_or_default(),
        })
    }

    /// Version matching an id or a version name; the most recent one when
    /// nothing is requested.
    pub fn find_version(&self, wanted: Option<&str>) -> Option<&Version> {
        match wanted {
            Some(w) => self.versions.iter().find(|v| v.id == w || v.version == w),
            None => latest_version(&self.versions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationConfig {
    pub id: String,
    pub enabled: bool,
    pub auto_approve: bool,
    pub auth_config_name: Option<String>,
}

impl RegistrationConfig {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            id: str_field(obj, &["id"]).unwrap_or_default(),
            enabled: str_field(obj, &["status"]).map(|s| s == "enabled").unwrap_or(false),
            auto_approve: bool_field(obj, &["auto_approve", "autoApprove"]),
            auth_config_name: obj
                .get("auth_config")
                .and_then(|a| a.as_object())
                .and_then(|a| str_field(a, &["name"])),
        })
    }
}
