use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::{tlog_debug, Error, Result};

/// Default scoring endpoint, matching the service's development address.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Default ranking strategy understood by the scoring service.
pub const DEFAULT_STRATEGY: &str = "smart_balance";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the scoring service.
    pub endpoint: Option<String>,
    /// Ranking strategy sent verbatim to the scorer.
    pub strategy: Option<String>,
    /// Fixed "today" override forwarded to the scorer for deterministic runs.
    pub today: Option<NaiveDate>,
}

impl Config {
    pub fn triage_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".triage"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::triage_dir()?.join("triage.toml"))
    }

    pub fn effective_endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn effective_strategy(&self) -> &str {
        self.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY)
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        tlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            tlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        tlog_debug!(
            "Config loaded: endpoint={:?}, strategy={:?}, today={:?}",
            config.endpoint,
            config.strategy,
            config.today
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::triage_dir()?;
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        tlog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
