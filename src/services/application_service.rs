use crate::api::{
    load_applications, get_application, create_application, update_application,
    delete_application, CreatedApplication, PortalClient,
};
use crate::error::{PortalError, WorkflowError};
use crate::models::{Application, ApplicationDraft, PortalContext};
use crate::notice::{Notice, Notices};
use crate::util::generate_reference_id;

/// The developer's applications as last fetched from the portal.
///
/// Every mutation is followed by a re-fetch; a failed re-fetch keeps the
/// previous list and raises a notice.
#[derive(Debug, Default)]
pub struct ApplicationList {
    applications: Vec<Application>,
    notices: Notices,
}

impl ApplicationList {
    pub fn new(applications: Vec<Application>) -> Self {
        Self {
            applications,
            notices: Notices::new(),
        }
    }

    pub async fn load(client: &PortalClient) -> Result<Self, PortalError> {
        Ok(Self::new(load_applications(client).await?))
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn find(&self, application_id: &str) -> Option<&Application> {
        self.applications.iter().find(|a| a.id == application_id)
    }

    /// Applications created under a different registration mode than the
    /// portal now uses.
    pub fn incompatible<'a>(&'a self, ctx: &'a PortalContext) -> impl Iterator<Item = &'a Application> + 'a {
        self.applications.iter().filter(move |a| !a.is_compatible_with(ctx))
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub async fn refresh(&mut self, client: &PortalClient) -> Result<(), PortalError> {
        match load_applications(client).await {
            Ok(apps) => {
                self.applications = apps;
                Ok(())
            }
            Err(e) => {
                self.notices.error("Failed to load applications", &e);
                Err(e)
            }
        }
    }

    /// Create an application. With `generate_reference` and no reference id
    /// in the draft, one is generated.
    pub async fn create(
        &mut self,
        client: &PortalClient,
        draft: &ApplicationDraft,
        generate_reference: bool,
    ) -> Result<CreatedApplication, WorkflowError> {
        if !draft.is_complete() {
            return Err(WorkflowError::IncompleteDraft);
        }
        let mut draft = draft.clone();
        if generate_reference && draft.reference_id.as_deref().map_or(true, |r| r.trim().is_empty()) {
            draft.reference_id = Some(generate_reference_id());
        }
        let created = match create_application(client, &draft).await {
            Ok(c) => c,
            Err(e) => {
                self.notices.error("Failed to create application", &e);
                return Err(e.into());
            }
        };
        self.notices.success("Application successfully created");
        // The new application is still returned when the list is stale.
        let _ = self.refresh(client).await;
        Ok(created)
    }

    /// Update an application, then re-fetch that record into the list.
    pub async fn update(
        &mut self,
        client: &PortalClient,
        application_id: &str,
        draft: &ApplicationDraft,
    ) -> Result<&Application, WorkflowError> {
        if !draft.is_complete() {
            return Err(WorkflowError::IncompleteDraft);
        }
        let idx = self.index_of(application_id)?;
        if let Err(e) = update_application(client, application_id, draft).await {
            self.notices.error("Failed to update application", &e);
            return Err(e.into());
        }
        self.notices.success("Application successfully updated");
        match get_application(client, application_id).await {
            Ok(app) => self.applications[idx] = app,
            Err(e) => {
                self.notices.error("Failed to reload application", &e);
                return Err(e.into());
            }
        }
        Ok(&self.applications[idx])
    }

    /// Delete an application. It leaves the list as soon as the portal
    /// confirms; the re-fetch afterwards only refreshes the rest.
    pub async fn delete(&mut self, client: &PortalClient, application_id: &str) -> Result<(), WorkflowError> {
        self.index_of(application_id)?;
        if let Err(e) = delete_application(client, application_id).await {
            self.notices.error("Failed to delete application", &e);
            return Err(e.into());
        }
        self.applications.retain(|a| a.id != application_id);
        self.notices.success("Application successfully deleted");
        let _ = self.refresh(client).await;
        Ok(())
    }

    fn index_of(&self, application_id: &str) -> Result<usize, WorkflowError> {
        self.applications
            .iter()
            .position(|a| a.id == application_id)
            .ok_or_else(|| WorkflowError::NotFound {
                kind: "application",
                id: application_id.to_string(),
            })
    }
}
