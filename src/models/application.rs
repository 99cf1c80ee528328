use serde::Serialize;
use serde_json::{json, Value};

use crate::models::portal_context::PortalContext;
use crate::models::registration::Registration;
use crate::util::{bool_field, cleanup_empty_fields, str_field};

/// A client application owned by the signed-in developer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub is_dcr: bool,
    pub registrations: Vec<Registration>,
}

impl Application {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = str_field(obj, &["id"])?;
        let registrations = obj
            .get("registrations")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(Registration::from_value).collect())
            .unwrap_or_default();
        Some(Self {
            name: str_field(obj, &["name"]).unwrap_or_else(|| id.clone()),
            id,
            description: str_field(obj, &["description"]),
            reference_id: str_field(obj, &["reference_id", "referenceId"]),
            redirect_uri: str_field(obj, &["redirect_uri", "redirectUri"]),
            is_dcr: bool_field(obj, &["is_dcr", "isDcr"]),
            registrations,
        })
    }

    /// True when a non-rejected registration already links this application
    /// to `service_version_id`.
    pub fn is_registered_for(&self, service_version_id: &str) -> bool {
        self.registrations
            .iter()
            .any(|r| r.service_version_id == service_version_id && r.blocks_duplicate())
    }

    /// An application created under a different registration mode than the
    /// portal currently uses can no longer access services.
    pub fn is_compatible_with(&self, ctx: &PortalContext) -> bool {
        self.is_dcr == ctx.is_dcr
    }

    pub fn can_refresh_secret(&self, ctx: &PortalContext) -> bool {
        ctx.is_dcr && self.is_dcr
    }
}

/// Fields a developer fills in to create or update an application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub name: String,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub redirect_uri: Option<String>,
}

impl ApplicationDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The submit button stays disabled until a name is present.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn from_application(app: &Application) -> Self {
        Self {
            name: app.name.clone(),
            description: app.description.clone(),
            reference_id: app.reference_id.clone(),
            redirect_uri: app.redirect_uri.clone(),
        }
    }

    pub fn to_body(&self) -> Value {
        cleanup_empty_fields(json!({
            "name": self.name.trim(),
            "description": self.description,
            "reference_id": self.reference_id,
            "redirect_uri": self.redirect_uri,
        }))
    }
}
