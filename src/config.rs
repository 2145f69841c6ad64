use crate::error::{DatasheetError, Result};
use std::time::Duration;

pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];
pub const MODEL_VAR: &str = "DATASHEET_QA_MODEL";
pub const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
pub const TIMEOUT_VAR: &str = "DATASHEET_QA_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Process-wide settings, read once at startup.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset. The API key is mandatory; everything
    /// else falls back to a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|key| read(key))
            .ok_or_else(|| DatasheetError::MissingCredential {
                variables: API_KEY_VARS.iter().map(|v| v.to_string()).collect(),
            })?;

        let model = read(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = read(BASE_URL_VAR)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout = match read(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(TIMEOUT_VAR, &raw)?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            request_timeout,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

// The key must never end up in logs, so Debug is written by hand.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

pub fn parse_timeout(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw.trim().parse().map_err(|e| DatasheetError::Config {
        key: key.to_string(),
        reason: format!("'{}' is not a whole number of seconds ({})", raw, e),
    })?;
    if secs == 0 {
        return Err(DatasheetError::Config {
            key: key.to_string(),
            reason: "timeout must be at least one second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}
