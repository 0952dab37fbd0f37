//! Service configuration
//!
//! JSON file plus environment overrides. Every field has a default so a
//! missing file still yields a runnable (in-memory) service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use courtier_core::{DefinitionError, LeadDefaults, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub listen_addr: String,
    pub store: StoreConfig,
    pub webhook: WebhookConfig,
    pub lead_defaults: LeadDefaults,
    pub prefill: PrefillConfig,
    /// Extra form definitions, loaded next to the built-in `default-form`
    pub forms: Vec<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            store: StoreConfig::default(),
            webhook: WebhookConfig::default(),
            lead_defaults: LeadDefaults::default(),
            prefill: PrefillConfig::default(),
            forms: Vec::new(),
        }
    }
}

/// Hosted store endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            request_timeout_secs: 10,
        }
    }
}

impl StoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Answer 500 instead of 200 when the interaction insert is rejected
    pub fail_on_insert_error: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefillConfig {
    /// HS256 secret for prefill tokens; tokens are refused when unset
    pub jwt_secret: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid form definition {path}: {source}")]
    Form {
        path: PathBuf,
        #[source]
        source: DefinitionError,
    },

    #[error("store url set without a service key")]
    MissingServiceKey,

    #[error("store.request_timeout_secs must be at least 1")]
    ZeroTimeout,

    #[error("store client: {0}")]
    Store(#[from] StoreError),
}

impl ApiConfig {
    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every store call fail
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = lookup("SUPABASE_URL") {
            self.store.url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_SERVICE_ROLE_KEY") {
            self.store.service_key = Some(key);
        }
        if let Some(secret) = lookup("PREFILL_JWT_SECRET") {
            self.prefill.jwt_secret = Some(secret);
        }
        if let Some(addr) = lookup("LISTEN_ADDR") {
            self.listen_addr = addr;
        }
    }
}
