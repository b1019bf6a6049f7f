use anyhow::{anyhow, Context, Result};
use tracing::warn;

use crate::schema::scoring::VerdictPolicy;

/// Application configuration loaded from environment variables.
/// Only the speech key is required at startup. The job-search and completion
/// keys are optional and fail lazily on first use.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub rapidapi_key: Option<String>,
    pub elevenlabs_api_key: String,
    pub verdict_policy: VerdictPolicy,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            gemini_api_key: optional("GEMINI_API_KEY"),
            rapidapi_key: optional("RAPIDAPI_KEY"),
            elevenlabs_api_key: optional("ELEVENLABS_API_KEY").with_context(|| {
                "Required environment variable 'ELEVENLABS_API_KEY' is not set".to_string()
            })?,
            verdict_policy: match optional("VERDICT_POLICY") {
                Some(v) => v.parse().map_err(|e: String| anyhow!(e))?,
                None => VerdictPolicy::default(),
            },
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Logs the optional keys that are absent. Called once logging is up.
    pub fn warn_on_missing_keys(&self) {
        if self.gemini_api_key.is_none() {
            warn!("GEMINI_API_KEY not set; AI endpoints will fail until it is configured");
        }
        if self.rapidapi_key.is_none() {
            warn!("RAPIDAPI_KEY not set; /jobs will fail until it is configured");
        }
    }
}
