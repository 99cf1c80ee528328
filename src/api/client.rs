use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use yansi::Paint;

use crate::config::PortalConfig;
use crate::error::PortalError;
use crate::util::build_query_string;

static SILENT: AtomicBool = AtomicBool::new(false);

pub fn set_silent(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

pub fn is_silent() -> bool {
    SILENT.load(Ordering::Relaxed)
}

fn log_output(msg: String) {
    if !SILENT.load(Ordering::Relaxed) {
        println!("{}", msg);
    }
}

/// HTTP client bound to one portal API.
#[derive(Clone, Debug)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl PortalClient {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, PortalError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("devportal/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::Network(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: crate::config::sanitize_base_url(base_url),
            token: token.to_string(),
        })
    }

    pub fn from_config(config: &PortalConfig) -> Result<Self, PortalError> {
        Self::new(&config.api_base_url, &config.token, config.timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Core request function for every portal endpoint.
    /// Non-2xx statuses become `PortalError::Application`, transport failures
    /// `PortalError::Network`. An empty 2xx body yields `Value::Null`.
    pub async fn call(
        &self,
        method: &str,
        endpoint: &str,
        body: Option<Value>,
        params: Option<Vec<(String, String)>>,
    ) -> Result<Value, PortalError> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.log_request(method, &url, body.as_ref(), params.as_deref());

        let mut req = match method {
            "POST" => self.http.post(&url),
            "PUT" => self.http.put(&url),
            "PATCH" => self.http.patch(&url),
            "DELETE" => self.http.delete(&url),
            _ => self.http.get(&url),
        };
        if !self.token.is_empty() {
            req = req.bearer_auth(&self.token);
        }
        if let Some(ref p) = params {
            req = req.query(p);
        }
        if let Some(ref b) = body {
            req = req.json(b);
        }

        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(%method, %url, error = %e, "portal request failed");
                log_output(format!("Response:\n{}", Paint::new(format!("Request failed: {}", e)).red()));
                return Err(PortalError::from(e));
            }
        };
        let status = resp.status();
        let text = resp.text().await.map_err(PortalError::from)?;
        tracing::debug!(%method, %url, status = status.as_u16(), bytes = text.len(), "portal response");

        if !status.is_success() {
            log_output(format!("Response:\n{}", Paint::new(format!("HTTP {}: {}", status, text)).red()));
            return Err(PortalError::Application {
                status: status.as_u16(),
                message: error_message(&text, status),
            });
        }

        // Grayed out so requests stand out
        log_output(format!("Response:\n{}", Paint::new(&text).rgb(100, 100, 100)));

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| PortalError::Decode(format!("invalid JSON from {}: {}", endpoint, e)))
    }

    fn log_request(&self, method: &str, url: &str, body: Option<&Value>, params: Option<&[(String, String)]>) {
        let mut url_for_log = url.to_string();
        if let Some(p) = params {
            if !p.is_empty() {
                url_for_log = format!("{}?{}", url_for_log, build_query_string(p));
            }
        }

        let mut parts = Vec::new();
        parts.push(Paint::new("curl").fg(yansi::Color::Green).bold().to_string());
        parts.push(format!("-X {}", Paint::new(method).fg(yansi::Color::Yellow).bold()));
        parts.push(format!("'{}'", Paint::new(&url_for_log).fg(yansi::Color::Cyan)));

        if !self.token.is_empty() {
            parts.push(format!(
                "{} {}",
                Paint::new("-H").fg(yansi::Color::Magenta),
                Paint::new("'Authorization: Bearer ***'").fg(yansi::Color::Magenta)
            ));
        }
        if let Some(d) = body {
            let json_str = serde_json::to_string_pretty(d).unwrap_or_default();
            let escaped_json = json_str.replace('\'', "'\\''");
            parts.push(format!(
                "{} {}",
                Paint::new("-H").fg(yansi::Color::Magenta),
                Paint::new("'Content-Type: application/json'").fg(yansi::Color::Magenta)
            ));
            parts.push(format!(
                "{} {}",
                Paint::new("-d").fg(yansi::Color::Blue),
                Paint::new(format!("'{}'", escaped_json)).fg(yansi::Color::White)
            ));
        }
        log_output(format!("Request:\n{}", parts.join(" ")));
    }
}

/// Prefers `message`, then `detail`, from a JSON error body.
fn error_message(text: &str, status: reqwest::StatusCode) -> String {
    let from_json = serde_json::from_str::<Value>(text).ok().and_then(|v| {
        v.get("message")
            .or_else(|| v.get("detail"))
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
    });
    match from_json {
        Some(m) => m,
        None if !text.trim().is_empty() => text.trim().to_string(),
        None => status.canonical_reason().unwrap_or("request failed").to_string(),
    }
}
