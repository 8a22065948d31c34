use crate::core::session::SessionConfig;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:5000/api/analyze";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServiceConfig {
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            url: DEFAULT_SERVICE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Parameters a fresh session starts with.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DefaultsConfig {
    #[serde(default = "default_benchmark")]
    pub benchmark: String,
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

fn default_benchmark() -> String {
    SessionConfig::default().benchmark
}

fn default_start_date() -> NaiveDate {
    SessionConfig::default().start_date
}

fn default_risk_free_rate() -> f64 {
    SessionConfig::default().risk_free_rate
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let session = SessionConfig::default();
        DefaultsConfig {
            benchmark: session.benchmark,
            start_date: session.start_date,
            risk_free_rate: session.risk_free_rate,
        }
    }
}

impl From<&DefaultsConfig> for SessionConfig {
    fn from(defaults: &DefaultsConfig) -> Self {
        SessionConfig {
            benchmark: defaults.benchmark.clone(),
            start_date: defaults.start_date,
            risk_free_rate: defaults.risk_free_rate,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults when
    /// no config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "folio", "folio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "folio", "folio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
