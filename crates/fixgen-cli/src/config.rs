//! CLI configuration management

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An external tool and the client whose messages it speaks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Binary path; the builtin implementation is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Extra arguments passed before the tool's own
    #[serde(default)]
    pub args: Vec<String>,
    /// Exception mapper client name
    pub client: String,
}

fn default_t8n() -> ToolConfig {
    ToolConfig {
        path: None,
        args: Vec::new(),
        client: "geth".to_string(),
    }
}

fn default_eof() -> ToolConfig {
    ToolConfig {
        path: None,
        args: Vec::new(),
        client: "evmone".to_string(),
    }
}

fn default_chain_id() -> u64 {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("fixtures")
}

fn default_salt() -> String {
    "fixgen".to_string()
}

/// CLI configuration; tool tables come last so the TOML renders cleanly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Chain ID
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Worker threads, zero for one per core
    #[serde(default)]
    pub workers: usize,
    /// Skip remaining fills after the first failure
    #[serde(default)]
    pub stop_on_first_error: bool,
    /// Fail on header fields the fork forbids
    #[serde(default)]
    pub strict: bool,
    /// Fixture output directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Write pre-allocation group files
    #[serde(default)]
    pub pre_alloc_groups: bool,
    /// Salt for pre-allocation group keys
    #[serde(default = "default_salt")]
    pub pre_alloc_salt: String,
    /// Transition tool
    #[serde(default = "default_t8n")]
    pub t8n: ToolConfig,
    /// EOF validator
    #[serde(default = "default_eof")]
    pub eof: ToolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            workers: 0,
            stop_on_first_error: false,
            strict: false,
            output_dir: default_output_dir(),
            pre_alloc_groups: false,
            pre_alloc_salt: default_salt(),
            t8n: default_t8n(),
            eof: default_eof(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".fixgen"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from `explicit`, which must exist, or from the default
    /// location when present. Defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };
        Self::from_file(&path)
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let config_err = |reason: String| CliError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        let config = toml::from_str(&content).map_err(|e| config_err(e.to_string()))?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::InvalidInput(e.to_string()))
    }
}
