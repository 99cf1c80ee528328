use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::util::{nested_id, str_field, time_field};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    /// Any status string this client does not know about.
    Other(String),
}

impl RegistrationStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Other(s) => s,
        }
    }
}

/// Link between one application and one service version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    pub id: String,
    pub application_id: String,
    pub service_version_id: String,
    pub status: RegistrationStatus,
    pub created_at: Option<DateTime<Utc>>,
    /// Service name when the backend embeds the service package.
    pub service_name: Option<String>,
    pub version_name: Option<String>,
}

impl Registration {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let service_version = obj.get("service_version").and_then(|v| v.as_object());
        let service_name = service_version
            .and_then(|sv| sv.get("service_package"))
            .and_then(|sp| sp.as_object())
            .and_then(|sp| str_field(sp, &["display_name", "name"]));
        Some(Self {
            id: str_field(obj, &["id"]).unwrap_or_default(),
            application_id: str_field(obj, &["application_id", "applicationId"])
                .or_else(|| nested_id(obj, "application"))
                .unwrap_or_default(),
            service_version_id: str_field(obj, &["service_version_id", "serviceVersionId"])
                .or_else(|| nested_id(obj, "service_version"))
                .unwrap_or_default(),
            status: str_field(obj, &["status"])
                .map(|s| RegistrationStatus::from_str(&s))
                .unwrap_or(RegistrationStatus::Pending),
            created_at: time_field(obj, &["created_at", "createdAt"]),
            service_name,
            version_name: service_version.and_then(|sv| str_field(sv, &["version"])),
        })
    }

    /// Every status except `rejected` occupies the version for its application.
    pub fn blocks_duplicate(&self) -> bool {
        self.status != RegistrationStatus::Rejected
    }
}
