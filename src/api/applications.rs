use serde_json::Value;

use crate::error::PortalError;
use crate::models::{Application, ApplicationDraft, DcrCredentials, Secret};
use crate::util::{data_array, str_field};
use super::client::PortalClient;

/// Result of creating an application. DCR portals also return client
/// credentials, readable only in this response.
#[derive(Debug, Clone)]
pub struct CreatedApplication {
    pub id: String,
    pub credentials: Option<DcrCredentials>,
}

/// Load every application of the signed-in developer.
pub async fn load_applications(client: &PortalClient) -> Result<Vec<Application>, PortalError> {
    let payload = client.call("GET", "/applications", None, None).await?;
    let apps: Vec<Application> = data_array(&payload)
        .iter()
        .filter_map(Application::from_value)
        .collect();
    tracing::debug!(count = apps.len(), "loaded applications");
    Ok(apps)
}

pub async fn get_application(client: &PortalClient, application_id: &str) -> Result<Application, PortalError> {
    let endpoint = format!("/applications/{}", application_id);
    let payload = client.call("GET", &endpoint, None, None).await?;
    Application::from_value(&payload)
        .ok_or_else(|| PortalError::Decode(format!("application {} has no id", application_id)))
}

pub async fn create_application(client: &PortalClient, draft: &ApplicationDraft) -> Result<CreatedApplication, PortalError> {
    let payload = client.call("POST", "/applications", Some(draft.to_body()), None).await?;
    let obj = payload
        .as_object()
        .ok_or_else(|| PortalError::Decode("create application returned no object".into()))?;
    let id = str_field(obj, &["id"])
        .ok_or_else(|| PortalError::Decode("create application returned no id".into()))?;
    let credentials = obj
        .get("credentials")
        .cloned()
        .and_then(|c| serde_json::from_value::<DcrCredentials>(c).ok());
    tracing::info!(%id, dcr = credentials.is_some(), "application created");
    Ok(CreatedApplication { id, credentials })
}

pub async fn update_application(client: &PortalClient, application_id: &str, draft: &ApplicationDraft) -> Result<(), PortalError> {
    let endpoint = format!("/applications/{}", application_id);
    client.call("PATCH", &endpoint, Some(draft.to_body()), None).await?;
    Ok(())
}

pub async fn delete_application(client: &PortalClient, application_id: &str) -> Result<(), PortalError> {
    let endpoint = format!("/applications/{}", application_id);
    client.call("DELETE", &endpoint, None, None).await?;
    tracing::info!(%application_id, "application deleted");
    Ok(())
}

/// Ask the identity provider for a new client secret (DCR only).
pub async fn refresh_client_secret(client: &PortalClient, application_id: &str) -> Result<Secret, PortalError> {
    let endpoint = format!("/applications/{}/refresh_token", application_id);
    let payload = client.call("POST", &endpoint, None, None).await?;
    payload
        .get("client_secret")
        .and_then(Value::as_str)
        .map(Secret::new)
        .ok_or_else(|| PortalError::Decode("refresh_token response has no client_secret".into()))
}
