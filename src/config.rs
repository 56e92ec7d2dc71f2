//! Application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::sync::SyncOptions;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for markdown documents
    pub documents_dir: PathBuf,
    /// Remote sync settings
    pub sync: SyncConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            documents_dir: home.join("notes"),
            sync: SyncConfig::default(),
        }
    }
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Server URL (e.g., "https://linkding.example.com")
    pub server_url: Option<String>,
    /// API token for authentication
    pub api_token: Option<String>,
    /// Front-matter field holding the bookmark URL
    pub url_field: String,
    /// Front-matter field holding the title
    pub title_field: String,
    /// Front-matter field holding the tag list
    pub tags_field: String,
    /// Front-matter field holding the remote identifier
    pub id_field: String,
    /// Overwrite the remote title from local values (default: true)
    pub sync_title: bool,
    /// Overwrite the remote tags from local values (default: true)
    pub sync_tags: bool,
    /// Probe for an existing bookmark before creating (default: false)
    pub check_before_create: bool,
    /// Probe before re-creating a stale identifier (default: true)
    pub recheck_on_recreate: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let defaults = SyncOptions::default();
        Self {
            server_url: None,
            api_token: None,
            url_field: defaults.url_field,
            title_field: defaults.title_field,
            tags_field: defaults.tags_field,
            id_field: defaults.id_field,
            sync_title: defaults.sync_title,
            sync_tags: defaults.sync_tags,
            check_before_create: defaults.check_before_create,
            recheck_on_recreate: defaults.recheck_on_recreate,
        }
    }
}

impl SyncConfig {
    /// Returns true if sync is configured (has both server_url and api_token)
    pub fn is_configured(&self) -> bool {
        self.server_url.is_some() && self.api_token.is_some()
    }

    /// Builds reconciliation options from this config.
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            url_field: self.url_field.clone(),
            title_field: self.title_field.clone(),
            tags_field: self.tags_field.clone(),
            id_field: self.id_field.clone(),
            sync_title: self.sync_title,
            sync_tags: self.sync_tags,
            check_before_create: self.check_before_create,
            recheck_on_recreate: self.recheck_on_recreate,
            dry_run: false,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Ok(documents_dir) = std::env::var("MARKDING_DOCUMENTS_DIR") {
            config.documents_dir = PathBuf::from(documents_dir);
        }
        if let Ok(server_url) = std::env::var("MARKDING_SERVER_URL") {
            config.sync.server_url = Some(server_url);
        }
        if let Ok(api_token) = std::env::var("MARKDING_API_TOKEN") {
            config.sync.api_token = Some(api_token);
        }

        Ok(config)
    }

    /// Default config file path: ~/.config/markding/config.yaml
    pub fn default_config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("markding").join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
