use crate::api::{load_portal_context, PortalClient};
use crate::catalog::CatalogViewModel;
use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::models::PortalContext;

/// Everything a command needs: the configured client and the portal's
/// feature flags.
#[derive(Clone, Debug)]
pub struct PortalSession {
    pub config: PortalConfig,
    pub client: PortalClient,
    pub context: PortalContext,
}

impl PortalSession {
    /// Build the client and fetch the portal context. A portal that does not
    /// answer the context request is treated as a plain key-auth portal.
    pub async fn start(config: PortalConfig) -> Result<Self, PortalError> {
        let client = PortalClient::from_config(&config)?;
        let context = match load_portal_context(&client).await {
            Ok(ctx) => ctx,
            Err(e) if e.is_network() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "portal context unavailable, assuming key-auth portal");
                PortalContext::default()
            }
        };
        tracing::debug!(base_url = %client.base_url(), is_dcr = context.is_dcr, is_public = context.is_public, "session started");
        Ok(Self { config, client, context })
    }

    pub fn catalog(&self) -> CatalogViewModel {
        CatalogViewModel::new(self.config.page_size, self.config.page_size)
    }
}
