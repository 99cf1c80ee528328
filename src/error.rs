/// Error types for portal API calls and workflows
use thiserror::Error;

/// Errors returned by the portal API client.
///
/// Callers treat every variant the same way: the attempted transition is
/// abandoned, previous state is kept and a notice is raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PortalError {
    /// No response arrived (connection refused, DNS, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The portal answered with a non-2xx status
    #[error("Portal API error (HTTP {status}): {message}")]
    Application {
        /// HTTP status code
        status: u16,
        /// `message`/`detail` from the body, or the raw body
        message: String,
    },

    /// A 2xx response whose body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl PortalError {
    pub fn is_network(&self) -> bool {
        matches!(self, PortalError::Network(_))
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(e: reqwest::Error) -> Self {
        PortalError::Network(e.to_string())
    }
}

/// Misuse of a workflow state machine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("No application selected")]
    NothingSelected,

    #[error("Application {0} cannot be registered for this version")]
    NotSelectable(String),

    #[error("Operation not allowed while {0}")]
    InvalidState(&'static str),

    #[error("Registration is not enabled for service version {0}")]
    RegistrationDisabled(String),

    #[error("Secret refresh requires a DCR portal and a DCR application")]
    DcrUnavailable,

    #[error("Application name is required")]
    IncompleteDraft,

    #[error("Unknown {kind} {id}")]
    NotFound { kind: &'static str, id: String },

    #[error(transparent)]
    Portal(#[from] PortalError),
}
