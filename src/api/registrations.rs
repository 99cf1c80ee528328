use serde_json::json;

use crate::error::PortalError;
use crate::models::Registration;
use crate::util::data_array;
use super::client::PortalClient;

pub async fn load_registrations(client: &PortalClient, application_id: &str) -> Result<Vec<Registration>, PortalError> {
    let endpoint = format!("/applications/{}/registrations", application_id);
    let payload = client.call("GET", &endpoint, None, None).await?;
    Ok(data_array(&payload)
        .iter()
        .filter_map(Registration::from_value)
        .collect())
}

/// Request access for an application to a service version. The returned
/// status is already `approved` when the version auto-approves.
pub async fn request_registration(client: &PortalClient, application_id: &str, service_version_id: &str) -> Result<Registration, PortalError> {
    let endpoint = format!("/applications/{}/registrations", application_id);
    let body = json!({ "service_version_id": service_version_id });
    let payload = client.call("POST", &endpoint, Some(body), None).await?;
    let mut reg = Registration::from_value(&payload)
        .ok_or_else(|| PortalError::Decode("registration response is not an object".into()))?;
    if reg.application_id.is_empty() {
        reg.application_id = application_id.to_string();
    }
    if reg.service_version_id.is_empty() {
        reg.service_version_id = service_version_id.to_string();
    }
    tracing::info!(%application_id, %service_version_id, status = reg.status.as_str(), "registration requested");
    Ok(reg)
}
