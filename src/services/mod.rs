pub mod application_service;
pub mod credential_service;
pub mod registration_service;
pub mod session;

// Re-export commonly used types
pub use application_service::ApplicationList;
pub use credential_service::{CredentialManager, CredentialView};
pub use registration_service::{RegistrationRequest, RegistrationState, RegistrationWorkflow};
pub use session::PortalSession;
