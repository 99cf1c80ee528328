// Portal API modules
pub mod client;
pub mod catalog;
pub mod applications;
pub mod credentials;
pub mod registrations;
pub mod portal;

// Re-export commonly used functions
pub use client::{is_silent, set_silent, PortalClient};
pub use catalog::search_service_catalog;
pub use applications::{
    load_applications, get_application, create_application, update_application,
    delete_application, refresh_client_secret, CreatedApplication,
};
pub use credentials::{load_credentials, create_credential, rename_credential, revoke_credential};
pub use registrations::{load_registrations, request_registration};
pub use portal::{load_portal_context, get_service_package, get_registration_config};
