//! Configuration Management
//!
//! Handles persistent client configuration for skiff. The file is optional;
//! everything falls back to sensible defaults so mock-backed clients never
//! need one.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default API server endpoint when none is configured.
const DEFAULT_BASE_URL: &str = "http://localhost:6550";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// Base URL of the API server
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token sent on every request (token acquisition is the caller's job)
    #[serde(default)]
    pub token: Option<String>,
    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skiff").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Base URL to use (configured value, else the local default)
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// User agent to use (configured value, else crate name/version)
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("skiff/{}", env!("CARGO_PKG_VERSION")))
    }

    /// Set the base URL and save
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        self.base_url = Some(base_url.to_string());
        self.save()
    }

    /// Set the bearer token and save
    pub fn set_token(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        self.save()
    }
}
