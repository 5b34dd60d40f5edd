//! Configuration resolution for cd-catalog
//!
//! Two-tier resolution with ENV > TOML priority. The TOML file supplies
//! durable defaults; `CDCAT_*` environment variables override individual
//! keys for deployment.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "cd-catalog.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(
        "Discogs token not configured. Please configure using one of:\n\
         1. Environment: CDCAT_DISCOGS_TOKEN=your-token-here\n\
         2. TOML config: cd-catalog.toml (discogs_token = \"your-token\")\n\
         \n\
         Obtain a personal access token at: https://www.discogs.com/settings/developers"
    )]
    MissingToken,
}

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discogs personal access token
    pub discogs_token: Option<String>,
    /// HTTP bind address
    pub bind_address: String,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Candidates fetched per catalogue search
    pub search_limit: usize,
    /// Penalize non-CD formats when ranking add requests
    pub require_cd: bool,
    /// Maximum age of an unresolved ticket in seconds; unset means
    /// tickets never expire
    pub ticket_ttl_seconds: Option<u64>,
    /// Keep the ticket alive when a collaborator fails after the user
    /// confirmed, so the confirmation can be retried
    pub preserve_ticket_on_failure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discogs_token: None,
            bind_address: "127.0.0.1:5740".to_string(),
            database_path: PathBuf::from("cd-catalog.db"),
            search_limit: 5,
            require_cd: true,
            ticket_ttl_seconds: None,
            preserve_ticket_on_failure: true,
        }
    }
}

impl Config {
    /// Load configuration from `CDCAT_CONFIG` (or the default path) and
    /// apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("CDCAT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    /// Load from an explicit TOML path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            info!("Loading config from {}", path.display());
            toml::from_str(&std::fs::read_to_string(path)?)?
        } else {
            info!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("CDCAT_DISCOGS_TOKEN") {
            if self.discogs_token.is_some() {
                warn!("Discogs token found in both environment and TOML. Using environment (highest priority).");
            }
            self.discogs_token = Some(token);
        }
        if let Ok(addr) = std::env::var("CDCAT_BIND_ADDRESS") {
            self.bind_address = addr;
        }
        if let Ok(path) = std::env::var("CDCAT_DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
    }

    /// The Discogs token, validated non-empty.
    pub fn resolve_discogs_token(&self) -> Result<String, ConfigError> {
        match &self.discogs_token {
            Some(token) if !token.trim().is_empty() => Ok(token.clone()),
            _ => Err(ConfigError::MissingToken),
        }
    }
}
