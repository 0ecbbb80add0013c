//! @ai:module:intent Configuration structs for a marginalia run
//! @ai:module:layer infrastructure
//! @ai:module:public_api Config, SyntaxConfig, DiscoveryConfig, IdentityConfig
//! @ai:module:stateless true

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Top-level configuration, usually read from `marginalia.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fail the run on identifier collisions or unbound blocks.
    pub strict: bool,
    pub syntax: SyntaxConfig,
    pub discovery: DiscoveryConfig,
    pub identity: IdentityConfig,
}

/// @ai:intent How meta comment lines are spelled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxConfig {
    #[serde(default = "default_comment")]
    pub comment: String,
    #[serde(default = "default_marker")]
    pub marker: String,
}

/// @ai:intent Which files a directory scan picks up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_include")]
    pub include: Vec<String>,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

/// @ai:intent How derived identifiers are joined
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            comment: default_comment(),
            marker: default_marker(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include: default_include(),
            exclude: default_exclude(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

fn default_comment() -> String {
    "#".to_string()
}

fn default_marker() -> String {
    "meta:".to_string()
}

fn default_include() -> Vec<String> {
    vec!["*.py".to_string(), "*.pyw".to_string()]
}

fn default_exclude() -> Vec<String> {
    [".git", "__pycache__", ".venv", "build", "dist"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_separator() -> String {
    ".".to_string()
}

impl Config {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content).map_err(|message| Error::Config {
            path: path.to_path_buf(),
            message,
        })
    }

    /// @ai:intent Parse and validate configuration text
    /// @ai:effects pure
    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.syntax.comment.trim().is_empty() {
            return Err("syntax.comment must not be empty".to_string());
        }
        if self.syntax.marker.trim().is_empty() {
            return Err("syntax.marker must not be empty".to_string());
        }
        if self.identity.separator.is_empty() {
            return Err("identity.separator must not be empty".to_string());
        }
        Ok(())
    }
}
