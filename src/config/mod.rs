mod client;
mod database;
pub mod defaults;
mod llm;
mod server;
mod validation;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use client::ClientConfig;
pub use database::DatabaseConfig;
pub use llm::LlmConfig;
pub use server::{ServerConfig, ToolHostConfig, ToolHostLaunch};
pub use validation::{expand_with, parse_flag};

/// Variable lookup used while resolving configuration; `std::env` in production.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

pub fn process_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmFileConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseFileConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub sample_rows: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerFileConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub max_iterations: Option<usize>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub session_expiry_minutes: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolHostFileConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment for the tool host process; values support `${VAR}` expansion.
    #[serde(default)]
    pub env: HashMap<String, String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ClientFileConfig {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

/// On-disk configuration. Every field is optional; secrets never live here.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub llm: LlmFileConfig,
    #[serde(default)]
    pub database: DatabaseFileConfig,
    #[serde(default)]
    pub server: ServerFileConfig,
    #[serde(default)]
    pub tool_host: ToolHostFileConfig,
    #[serde(default)]
    pub client: ClientFileConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl FileConfig {
    /// Load an explicit config file, or the first one found on the search path.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_file(path);
        }

        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }

        // No config file found, return default
        Ok(FileConfig::default())
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str());
        let config: FileConfig = if extension == Some("yaml") || extension == Some("yml") {
            serde_yaml::from_str(&contents).with_context(|| {
                format!("Failed to parse YAML config file: {}", path.display())
            })?
        } else {
            serde_json::from_str(&contents).with_context(|| {
                format!("Failed to parse JSON config file: {}", path.display())
            })?
        };

        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. Current directory (highest priority - local override)
        paths.push(PathBuf::from(".argochat.yaml"));
        paths.push(PathBuf::from(".argochat.yml"));
        paths.push(PathBuf::from(".argochat.json"));

        // 2. User's config directory (global config)
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("argochat");
            paths.push(config_dir.join("argochat.yaml"));
            paths.push(config_dir.join("argochat.yml"));
            paths.push(config_dir.join("argochat.json"));
        }

        paths
    }

    /// Verbose flag: CLI > env var > config file > default
    pub fn verbose(&self, cli_flag: bool, env: EnvLookup<'_>) -> bool {
        cli_flag
            || env("ARGOCHAT_VERBOSE")
                .map(|v| parse_flag(&v))
                .or(self.logging.verbose)
                .unwrap_or(false)
    }
}

pub(crate) fn parse_env<T: std::str::FromStr>(env: EnvLookup<'_>, name: &str) -> Option<T> {
    env(name).and_then(|s| s.trim().parse::<T>().ok())
}
