use std::env;
use std::path::Path;
use std::time::Duration;

// Default configuration constants
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/portal_api";
pub const DEFAULT_TOKEN: &str = "";
pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub fn load_env_file(env_file: Option<&str>) {
    if let Some(path) = env_file {
        dotenvy::from_path(Path::new(path)).ok();
    } else {
        dotenvy::dotenv().ok();
    }
}

pub fn get_api_base_url() -> String {
    sanitize_base_url(&env::var("PORTAL_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()))
}

pub fn get_token() -> String {
    env::var("PORTAL_TOKEN")
        .map(|t| t.trim().to_string())
        .unwrap_or_else(|_| DEFAULT_TOKEN.to_string())
}

/// Page size shared by the card and table views.
pub fn get_page_size() -> u64 {
    env::var("CATALOG_PAGE_SIZE")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_PAGE_SIZE)
}

pub fn get_timeout() -> Duration {
    let secs = env::var("PORTAL_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

pub fn sanitize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        DEFAULT_API_BASE_URL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Settings needed to talk to a portal, read once at startup.
#[derive(Clone, Debug)]
pub struct PortalConfig {
    pub api_base_url: String,
    pub token: String,
    pub page_size: u64,
    pub timeout: Duration,
}

impl PortalConfig {
    pub fn from_env(env_file: Option<&str>) -> Self {
        load_env_file(env_file);
        Self {
            api_base_url: get_api_base_url(),
            token: get_token(),
            page_size: get_page_size(),
            timeout: get_timeout(),
        }
    }
}
