use serde::{Deserialize, Serialize};

/// Portal-wide feature flags fetched when a session starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalContext {
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_dcr: bool,
}
