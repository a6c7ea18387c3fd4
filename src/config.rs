use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use crate::constants;
use crate::knowledge::KnowledgeFacts;

/// Startup configuration. Every field can come from a flag or from the
/// environment (including a `.env` file loaded by `main`).
#[derive(Args, Debug, Clone)]
pub struct Config {
    #[arg(long, env = "HOST", default_value = constants::DEFAULT_HOST, help = "Address to bind the HTTP server to.")]
    pub host: String,
    #[arg(long, env = "PORT", default_value_t = constants::DEFAULT_PORT, help = "Port for the HTTP server.")]
    pub port: u16,

    #[arg(long, env = "REPLICATE_API_TOKEN", hide_env_values = true, help = "Replicate API token.")]
    pub api_token: Option<String>,
    #[arg(long, env = "REPLICATE_MODEL_VERSION", help = "Replicate model version id.")]
    pub model_version: Option<String>,
    #[arg(long, env = "REPLICATE_MODEL", help = "Model slug, used when no version id is set.")]
    pub model: Option<String>,

    #[arg(long, env = "REPLICATE_API_BASE", default_value = constants::DEFAULT_API_BASE)]
    pub api_base: String,
    #[arg(long, env = "REPLICATE_AUTH_HEADER", default_value = constants::DEFAULT_AUTH_HEADER)]
    pub auth_header: String,
    #[arg(long, env = "REPLICATE_AUTH_SCHEME", default_value = constants::DEFAULT_AUTH_SCHEME)]
    pub auth_scheme: String,

    #[arg(long, default_value_t = constants::POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,
    #[arg(long, default_value_t = constants::MAX_POLL_ATTEMPTS)]
    pub max_poll_attempts: u32,
    #[arg(long, default_value_t = constants::SUBMIT_TIMEOUT.as_secs())]
    pub submit_timeout_secs: u64,
    #[arg(long, default_value_t = constants::POLL_TIMEOUT.as_secs())]
    pub poll_timeout_secs: u64,
    #[arg(long, default_value_t = constants::MAX_NEW_TOKENS)]
    pub max_new_tokens: u32,
    #[arg(long, default_value_t = constants::TEMPERATURE)]
    pub temperature: f32,

    #[arg(long, env = "TURON_FACTS", help = "JSON file overriding the built-in knowledge base.")]
    pub facts: Option<PathBuf>,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings for the prediction client. Missing credentials are logged here
    /// and reported again as a configuration error on the first remote call.
    pub fn prediction_settings(&self) -> PredictionSettings {
        let model_version = self.model_version.clone().or_else(|| self.model.clone());
        if self.api_token.is_none() {
            warn!("REPLICATE_API_TOKEN is not set; remote answers will fail");
        }
        if model_version.is_none() {
            warn!("REPLICATE_MODEL_VERSION (or REPLICATE_MODEL) is not set; remote answers will fail");
        }

        PredictionSettings {
            api_base: self.api_base.trim_end_matches('/').to_string(),
            api_token: self.api_token.clone(),
            model_version,
            auth_header: self.auth_header.clone(),
            auth_scheme: self.auth_scheme.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_poll_attempts: self.max_poll_attempts,
            submit_timeout: Duration::from_secs(self.submit_timeout_secs),
            poll_timeout: Duration::from_secs(self.poll_timeout_secs),
            max_new_tokens: self.max_new_tokens,
            temperature: self.temperature,
        }
    }

    pub fn load_facts(&self) -> Result<KnowledgeFacts> {
        match &self.facts {
            Some(path) => {
                info!("Loading knowledge base from {}", path.display());
                KnowledgeFacts::from_json_file(path)
            }
            None => Ok(KnowledgeFacts::turon()),
        }
    }
}

/// Everything the prediction client needs, resolved once at startup.
#[derive(Clone)]
pub struct PredictionSettings {
    pub api_base: String,
    pub api_token: Option<String>,
    pub model_version: Option<String>,
    pub auth_header: String,
    pub auth_scheme: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub submit_timeout: Duration,
    pub poll_timeout: Duration,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl fmt::Debug for PredictionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionSettings")
            .field("api_base", &self.api_base)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("model_version", &self.model_version)
            .field("auth_header", &self.auth_header)
            .field("auth_scheme", &self.auth_scheme)
            .field("poll_interval", &self.poll_interval)
            .field("max_poll_attempts", &self.max_poll_attempts)
            .field("submit_timeout", &self.submit_timeout)
            .field("poll_timeout", &self.poll_timeout)
            .field("max_new_tokens", &self.max_new_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            api_base: constants::DEFAULT_API_BASE.to_string(),
            api_token: None,
            model_version: None,
            auth_header: constants::DEFAULT_AUTH_HEADER.to_string(),
            auth_scheme: constants::DEFAULT_AUTH_SCHEME.to_string(),
            poll_interval: constants::POLL_INTERVAL,
            max_poll_attempts: constants::MAX_POLL_ATTEMPTS,
            submit_timeout: constants::SUBMIT_TIMEOUT,
            poll_timeout: constants::POLL_TIMEOUT,
            max_new_tokens: constants::MAX_NEW_TOKENS,
            temperature: constants::TEMPERATURE,
        }
    }
}
