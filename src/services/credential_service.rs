use crate::api::{
    load_credentials, create_credential, rename_credential, revoke_credential,
    refresh_client_secret, PortalClient,
};
use crate::error::{PortalError, WorkflowError};
use crate::models::{Application, Credential, DcrCredentials, OneTimeSecret, PortalContext};
use crate::notice::{Notice, Notices};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialView {
    Listed,
    /// A freshly issued secret is on screen. Dismissing it drops the value.
    ShowOnce(OneTimeSecret),
}

/// Credentials of one application, plus the show-once secret flow.
#[derive(Debug)]
pub struct CredentialManager {
    application_id: String,
    credentials: Vec<Credential>,
    view: CredentialView,
    notices: Notices,
}

impl CredentialManager {
    pub fn new(application_id: impl Into<String>, credentials: Vec<Credential>) -> Self {
        Self {
            application_id: application_id.into(),
            credentials,
            view: CredentialView::Listed,
            notices: Notices::new(),
        }
    }

    pub async fn load(client: &PortalClient, application_id: &str) -> Result<Self, PortalError> {
        let credentials = load_credentials(client, application_id).await?;
        Ok(Self::new(application_id, credentials))
    }

    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn view(&self) -> &CredentialView {
        &self.view
    }

    pub fn pending_secret(&self) -> Option<&OneTimeSecret> {
        match &self.view {
            CredentialView::ShowOnce(secret) => Some(secret),
            CredentialView::Listed => None,
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    /// Put a secret on screen. Only one may be pending at a time.
    pub fn show_once(&mut self, secret: OneTimeSecret) -> Result<&OneTimeSecret, WorkflowError> {
        if self.pending_secret().is_some() {
            return Err(WorkflowError::InvalidState("a secret is waiting to be dismissed"));
        }
        tracing::debug!(application_id = %self.application_id, label = %secret.label(), "showing one-time secret");
        self.view = CredentialView::ShowOnce(secret);
        match &self.view {
            CredentialView::ShowOnce(secret) => Ok(secret),
            CredentialView::Listed => Err(WorkflowError::InvalidState("listed")),
        }
    }

    /// Client credentials returned when a DCR application was created.
    pub fn show_created_application_credentials(&mut self, credentials: DcrCredentials) -> Result<&OneTimeSecret, WorkflowError> {
        self.show_once(OneTimeSecret::ClientCredentials(credentials))
    }

    /// Drop the secret and return to the list without re-fetching.
    pub fn forget_secret(&mut self) -> Result<(), WorkflowError> {
        match self.view {
            CredentialView::ShowOnce(_) => {
                self.view = CredentialView::Listed;
                Ok(())
            }
            CredentialView::Listed => Err(WorkflowError::InvalidState("listed")),
        }
    }

    pub async fn reload(&mut self, client: &PortalClient) -> Result<(), PortalError> {
        match load_credentials(client, &self.application_id).await {
            Ok(list) => {
                self.credentials = list;
                Ok(())
            }
            Err(e) => {
                self.notices.error("Failed to load credentials", &e);
                Err(e)
            }
        }
    }

    pub async fn generate(&mut self, client: &PortalClient, display_name: &str) -> Result<&OneTimeSecret, WorkflowError> {
        if self.pending_secret().is_some() {
            return Err(WorkflowError::InvalidState("a secret is waiting to be dismissed"));
        }
        let issued = match create_credential(client, &self.application_id, display_name).await {
            Ok(c) => c,
            Err(e) => {
                self.notices.error("Failed to create credential", &e);
                return Err(e.into());
            }
        };
        tracing::info!(application_id = %self.application_id, credential_id = %issued.id, "credential created");
        self.notices.success("Credential successfully created");
        self.show_once(OneTimeSecret::Credential(issued))
    }

    /// Ask the identity provider for a new client secret. Only DCR
    /// applications on a DCR portal have one.
    pub async fn refresh_secret(
        &mut self,
        client: &PortalClient,
        ctx: &PortalContext,
        application: &Application,
    ) -> Result<&OneTimeSecret, WorkflowError> {
        if !application.can_refresh_secret(ctx) {
            return Err(WorkflowError::DcrUnavailable);
        }
        if self.pending_secret().is_some() {
            return Err(WorkflowError::InvalidState("a secret is waiting to be dismissed"));
        }
        let secret = match refresh_client_secret(client, &application.id).await {
            Ok(s) => s,
            Err(e) => {
                self.notices.error("Failed to refresh secret", &e);
                return Err(e.into());
            }
        };
        self.notices.success("Successfully refreshed secret");
        self.show_once(OneTimeSecret::RefreshedSecret(secret))
    }

    /// Close the secret view and re-fetch the list. The secret is gone even
    /// when the re-fetch fails.
    pub async fn dismiss(&mut self, client: &PortalClient) -> Result<&[Credential], WorkflowError> {
        self.forget_secret()?;
        self.reload(client).await?;
        Ok(&self.credentials)
    }

    pub async fn rename(&mut self, client: &PortalClient, credential_id: &str, display_name: &str) -> Result<(), WorkflowError> {
        self.expect_known(credential_id)?;
        if let Err(e) = rename_credential(client, &self.application_id, credential_id, display_name).await {
            self.notices.error("Failed to rename credential", &e);
            return Err(e.into());
        }
        self.notices.success("Credential successfully renamed");
        self.reload(client).await?;
        Ok(())
    }

    pub async fn revoke(&mut self, client: &PortalClient, credential_id: &str) -> Result<(), WorkflowError> {
        self.expect_known(credential_id)?;
        if let Err(e) = revoke_credential(client, &self.application_id, credential_id).await {
            self.notices.error("Failed to revoke credential", &e);
            return Err(e.into());
        }
        tracing::info!(application_id = %self.application_id, %credential_id, "credential revoked");
        self.notices.success("Credential successfully revoked");
        self.reload(client).await?;
        Ok(())
    }

    fn expect_known(&self, credential_id: &str) -> Result<(), WorkflowError> {
        if self.credentials.iter().any(|c| c.id == credential_id) {
            Ok(())
        } else {
            Err(WorkflowError::NotFound {
                kind: "credential",
                id: credential_id.to_string(),
            })
        }
    }
}
