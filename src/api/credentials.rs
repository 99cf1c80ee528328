use serde_json::json;

use crate::error::PortalError;
use crate::models::{Credential, IssuedCredential};
use crate::util::data_array;
use super::client::PortalClient;

/// List credential metadata. Keys in the payload are discarded.
pub async fn load_credentials(client: &PortalClient, application_id: &str) -> Result<Vec<Credential>, PortalError> {
    let endpoint = format!("/applications/{}/credentials", application_id);
    let payload = client.call("GET", &endpoint, None, None).await?;
    let mut out = vec![];
    for item in data_array(&payload) {
        match serde_json::from_value::<Credential>(item) {
            Ok(c) => out.push(c),
            Err(e) => tracing::warn!(%application_id, error = %e, "skipping malformed credential"),
        }
    }
    Ok(out)
}

pub async fn create_credential(client: &PortalClient, application_id: &str, display_name: &str) -> Result<IssuedCredential, PortalError> {
    let endpoint = format!("/applications/{}/credentials", application_id);
    let body = json!({ "display_name": display_name });
    let payload = client.call("POST", &endpoint, Some(body), None).await?;
    serde_json::from_value(payload).map_err(|e| PortalError::Decode(format!("credential response: {}", e)))
}

pub async fn rename_credential(client: &PortalClient, application_id: &str, credential_id: &str, display_name: &str) -> Result<(), PortalError> {
    let endpoint = format!("/applications/{}/credentials/{}", application_id, credential_id);
    let body = json!({ "display_name": display_name });
    client.call("PATCH", &endpoint, Some(body), None).await?;
    Ok(())
}

pub async fn revoke_credential(client: &PortalClient, application_id: &str, credential_id: &str) -> Result<(), PortalError> {
    let endpoint = format!("/applications/{}/credentials/{}", application_id, credential_id);
    client.call("DELETE", &endpoint, None, None).await?;
    Ok(())
}
