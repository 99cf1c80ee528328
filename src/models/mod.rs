pub mod application;
pub mod catalog_entry;
pub mod credential;
pub mod portal_context;
pub mod registration;
pub mod search;
pub mod service_package;

pub use application::{Application, ApplicationDraft};
pub use catalog_entry::{latest_version, CatalogEntry, PublishStatus, Version};
pub use credential::{Credential, DcrCredentials, IssuedCredential, OneTimeSecret, Secret};
pub use portal_context::PortalContext;
pub use registration::{Registration, RegistrationStatus};
pub use search::{ResultPage, SearchQuery};
pub use service_package::{RegistrationConfig, ServicePackage};
