use serde::{Deserialize, Serialize};
use std::fmt;

/// A secret value that must be shown to the user exactly once.
///
/// `Debug` never prints the value, so secrets do not leak into logs.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Credential metadata as listed for an application. Carries no key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

/// Response to a credential creation: the only time the key is readable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssuedCredential {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(alias = "credential")]
    pub key: Secret,
}

impl IssuedCredential {
    pub fn metadata(&self) -> Credential {
        Credential {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Client credentials issued by the identity provider on DCR portals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DcrCredentials {
    pub client_id: String,
    pub client_secret: Secret,
}

/// Something the user has to copy before it disappears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneTimeSecret {
    Credential(IssuedCredential),
    ClientCredentials(DcrCredentials),
    RefreshedSecret(Secret),
}

impl OneTimeSecret {
    pub fn label(&self) -> String {
        match self {
            OneTimeSecret::Credential(c) => format!("Credential for {}", c.display_name),
            OneTimeSecret::ClientCredentials(_) => "Application credentials".to_string(),
            OneTimeSecret::RefreshedSecret(_) => "Application secret".to_string(),
        }
    }

    /// `(field, value)` pairs to show, secret values included.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            OneTimeSecret::Credential(c) => vec![("Credential", c.key.expose())],
            OneTimeSecret::ClientCredentials(c) => vec![
                ("Client ID", c.client_id.as_str()),
                ("Client secret", c.client_secret.expose()),
            ],
            OneTimeSecret::RefreshedSecret(s) => vec![("Client secret", s.expose())],
        }
    }
}
