use crate::api::{get_registration_config, load_applications, request_registration, PortalClient};
use crate::error::{PortalError, WorkflowError};
use crate::models::{Application, Registration, RegistrationStatus};
use crate::notice::{Notice, Notices};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    SelectingApplication,
    Submitting { application_id: String },
    /// Waiting for manual approval; nothing more happens in this flow
    Pending(Registration),
    /// Auto-approved; the user moves on to the application
    Approved(Registration),
}

impl RegistrationState {
    fn name(&self) -> &'static str {
        match self {
            RegistrationState::SelectingApplication => "selecting an application",
            RegistrationState::Submitting { .. } => "submitting",
            RegistrationState::Pending(_) => "pending",
            RegistrationState::Approved(_) => "approved",
        }
    }
}

/// Parameters of the registration request about to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub application_id: String,
    pub service_version_id: String,
}

/// Registering one of the developer's applications for a service version.
#[derive(Debug)]
pub struct RegistrationWorkflow {
    service_version_id: String,
    state: RegistrationState,
    candidates: Vec<Application>,
    registered: Vec<Application>,
    selected: Option<String>,
    notices: Notices,
}

impl RegistrationWorkflow {
    /// Start in `SelectingApplication` with every application not already
    /// registered for `service_version_id` as a candidate.
    pub fn new(service_version_id: impl Into<String>, applications: Vec<Application>) -> Self {
        let mut wf = Self {
            service_version_id: service_version_id.into(),
            state: RegistrationState::SelectingApplication,
            candidates: vec![],
            registered: vec![],
            selected: None,
            notices: Notices::new(),
        };
        wf.set_applications(applications, None);
        wf
    }

    /// Check that the version accepts registrations, then load applications.
    pub async fn open(client: &PortalClient, service_version_id: &str) -> Result<Self, WorkflowError> {
        let config = get_registration_config(client, service_version_id).await?;
        if !config.enabled {
            return Err(WorkflowError::RegistrationDisabled(service_version_id.to_string()));
        }
        let applications = load_applications(client).await?;
        Ok(Self::new(service_version_id, applications))
    }

    fn set_applications(&mut self, applications: Vec<Application>, preselect: Option<&str>) {
        let (registered, candidates): (Vec<_>, Vec<_>) = applications
            .into_iter()
            .partition(|app| app.is_registered_for(&self.service_version_id));
        self.registered = registered;
        self.candidates = candidates;
        self.selected = preselect
            .filter(|id| self.candidates.iter().any(|a| a.id == *id))
            .map(str::to_string)
            .or_else(|| self.candidates.first().map(|a| a.id.clone()));
        tracing::debug!(
            version = %self.service_version_id,
            candidates = self.candidates.len(),
            registered = self.registered.len(),
            "registration candidates"
        );
    }

    pub fn service_version_id(&self) -> &str {
        &self.service_version_id
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    pub fn candidates(&self) -> &[Application] {
        &self.candidates
    }

    /// Applications skipped because they already hold a registration.
    pub fn registered_applications(&self) -> &[Application] {
        &self.registered
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// With no candidates left, creating an application is the only way on.
    pub fn only_create_available(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn select(&mut self, application_id: &str) -> Result<(), WorkflowError> {
        self.expect_selecting()?;
        if !self.candidates.iter().any(|a| a.id == application_id) {
            return Err(WorkflowError::NotSelectable(application_id.to_string()));
        }
        self.selected = Some(application_id.to_string());
        Ok(())
    }

    /// Back to selection after "create new application", with the fresh
    /// application list and the new application selected.
    pub fn application_created(&mut self, applications: Vec<Application>, new_application_id: &str) -> Result<(), WorkflowError> {
        self.expect_selecting()?;
        self.set_applications(applications, Some(new_application_id));
        Ok(())
    }

    pub fn begin_submit(&mut self) -> Result<RegistrationRequest, WorkflowError> {
        self.expect_selecting()?;
        let application_id = self.selected.clone().ok_or(WorkflowError::NothingSelected)?;
        self.state = RegistrationState::Submitting {
            application_id: application_id.clone(),
        };
        Ok(RegistrationRequest {
            application_id,
            service_version_id: self.service_version_id.clone(),
        })
    }

    /// Apply the backend's answer. Failures, including an immediate
    /// rejection, go back to selection with the candidates untouched.
    pub fn finish(&mut self, result: Result<Registration, PortalError>) -> Result<&RegistrationState, WorkflowError> {
        let application_id = match &self.state {
            RegistrationState::Submitting { application_id } => application_id.clone(),
            other => return Err(WorkflowError::InvalidState(other.name())),
        };
        match result {
            Ok(reg) => match reg.status {
                RegistrationStatus::Approved => {
                    tracing::info!(%application_id, "registration auto-approved");
                    self.notices.success("Registration approved");
                    self.state = RegistrationState::Approved(reg);
                }
                RegistrationStatus::Rejected => {
                    tracing::warn!(%application_id, "registration rejected on submit");
                    let err = PortalError::Application {
                        status: 200,
                        message: "registration was rejected".into(),
                    };
                    self.notices.error("Registration failed", &err);
                    self.state = RegistrationState::SelectingApplication;
                    return Err(err.into());
                }
                _ => {
                    self.notices.info("Registration under review. You will be notified upon approval.");
                    self.state = RegistrationState::Pending(reg);
                }
            },
            Err(e) => {
                tracing::warn!(%application_id, error = %e, "registration request failed");
                self.notices.error("Registration failed", &e);
                self.state = RegistrationState::SelectingApplication;
                return Err(e.into());
            }
        }
        Ok(&self.state)
    }

    pub async fn submit(&mut self, client: &PortalClient) -> Result<&RegistrationState, WorkflowError> {
        let req = self.begin_submit()?;
        let result = request_registration(client, &req.application_id, &req.service_version_id).await;
        self.finish(result)
    }

    /// Application to open after an auto-approved registration.
    pub fn redirect_target(&self) -> Option<&str> {
        match &self.state {
            RegistrationState::Approved(reg) => Some(reg.application_id.as_str()),
            _ => None,
        }
    }

    fn expect_selecting(&self) -> Result<(), WorkflowError> {
        match self.state {
            RegistrationState::SelectingApplication => Ok(()),
            ref other => Err(WorkflowError::InvalidState(other.name())),
        }
    }
}
