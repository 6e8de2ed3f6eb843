use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_ENDPOINT: &str = "https://dsa-instructor-ai-bot-server.onrender.com/api/ask";
pub const DEFAULT_DEBOUNCE_MS: u64 = 700;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENDPOINT_VAR: &str = "DSA_MENTOR_ENDPOINT";
const DEBOUNCE_VAR: &str = "DSA_MENTOR_DEBOUNCE_MS";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub endpoint: Option<String>,
    pub debounce_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load from the user config directory, falling back to defaults when the
    /// file does not exist, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::get_config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = var(ENDPOINT_VAR).filter(|v| !v.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }

        if let Some(raw) = var(DEBOUNCE_VAR) {
            match raw.trim().parse() {
                Ok(ms) => self.debounce_ms = Some(ms),
                Err(e) => warn!("Invalid {DEBOUNCE_VAR} value {raw:?}: {e}"),
            }
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("dsa-mentor").join("config.json"))
    }
}
