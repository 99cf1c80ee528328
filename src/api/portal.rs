use crate::error::PortalError;
use crate::models::{PortalContext, RegistrationConfig, ServicePackage};
use super::client::PortalClient;

pub async fn load_portal_context(client: &PortalClient) -> Result<PortalContext, PortalError> {
    let payload = client.call("GET", "/portal/portal_context", None, None).await?;
    serde_json::from_value(payload).map_err(|e| PortalError::Decode(format!("portal context: {}", e)))
}

pub async fn get_service_package(client: &PortalClient, service_package_id: &str) -> Result<ServicePackage, PortalError> {
    let endpoint = format!("/service_packages/{}", service_package_id);
    let payload = client.call("GET", &endpoint, None, None).await?;
    ServicePackage::from_value(&payload)
        .ok_or_else(|| PortalError::Decode(format!("service package {} has no id", service_package_id)))
}

/// Registration settings of a service version; a 404 means registration was
/// never configured and is reported as disabled.
pub async fn get_registration_config(client: &PortalClient, service_version_id: &str) -> Result<RegistrationConfig, PortalError> {
    let endpoint = format!("/application_registrations/service_versions/{}", service_version_id);
    match client.call("GET", &endpoint, None, None).await {
        Ok(payload) => RegistrationConfig::from_value(&payload)
            .ok_or_else(|| PortalError::Decode("registration config is not an object".into())),
        Err(PortalError::Application { status: 404, .. }) => Ok(RegistrationConfig {
            id: String::new(),
            enabled: false,
            auto_approve: false,
            auth_config_name: None,
        }),
        Err(e) => Err(e),
    }
}
