//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a TOML file. A missing or unreadable
//! file is never fatal: a warning is logged and built-in defaults are used.
//!
//! # Settings Sources Priority
//!
//! 1. Explicit argument (highest priority)
//! 2. Environment variables (`AUDITOR_ROOT_FOLDER`, `AUDITOR_AI_API_KEY`)
//! 3. TOML configuration file
//! 4. Built-in defaults

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "AUDITOR_ROOT_FOLDER";

/// Environment variable carrying the AI collaborator API key
pub const AI_API_KEY_ENV: &str = "AUDITOR_AI_API_KEY";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "auditor.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// AI recommendation collaborator settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Audit engine tuning
    #[serde(default)]
    pub audit: AuditConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// AI recommendation collaborator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Chat-completions endpoint (OpenAI-compatible)
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with each request
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// API key (the environment variable takes priority)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Deadline for one generation call
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,

    /// Client-side rate limit
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            model: default_ai_model(),
            api_key: None,
            timeout_secs: default_ai_timeout_secs(),
            requests_per_minute: default_requests_per_minute(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Audit engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Issues kept in the report's top-issue list
    #[serde(default = "default_top_issues")]
    pub top_issues: usize,

    /// Issues per module included in the AI digest
    #[serde(default = "default_digest_issue_cap")]
    pub digest_issue_cap: usize,

    /// Issues per module turned into fallback recommendations
    #[serde(default = "default_fallback_issues_per_module")]
    pub fallback_issues_per_module: usize,

    /// Upper bound on fallback recommendations
    #[serde(default = "default_fallback_max")]
    pub fallback_max: usize,

    /// Optional global deadline for the check phases
    #[serde(default)]
    pub deadline_secs: Option<u64>,

    /// Write finished audits to the database
    #[serde(default = "default_persist")]
    pub persist: bool,

    /// Weight map overrides: profile name -> category -> weight
    #[serde(default)]
    pub weights: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            top_issues: default_top_issues(),
            digest_issue_cap: default_digest_issue_cap(),
            fallback_issues_per_module: default_fallback_issues_per_module(),
            fallback_max: default_fallback_max(),
            deadline_secs: None,
            persist: default_persist(),
            weights: BTreeMap::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ai_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    60
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_temperature() -> f32 {
    0.3
}

fn default_top_issues() -> usize {
    25
}

fn default_digest_issue_cap() -> usize {
    10
}

fn default_fallback_issues_per_module() -> usize {
    3
}

fn default_fallback_max() -> usize {
    15
}

fn default_persist() -> bool {
    true
}

/// Load TOML configuration, falling back to defaults on any problem
///
/// Missing file: info log + defaults. Unreadable or malformed file:
/// warning + defaults.
pub fn load_toml_config(path: &Path) -> TomlConfig {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return TomlConfig::default();
    }

    match read_toml_config(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Read and parse a TOML configuration file, surfacing errors
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Write TOML configuration atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Root folder resolution:
/// 1. Explicit argument
/// 2. `AUDITOR_ROOT_FOLDER` environment variable
/// 3. TOML `root_folder`
/// 4. OS-dependent default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("auditor"))
        .unwrap_or_else(|| PathBuf::from("./auditor_data"))
}

/// Database path inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Resolve the AI API key
///
/// **Priority:** ENV → TOML. Returns `None` when neither holds a usable key,
/// which leaves the AI collaborator unconfigured.
pub fn resolve_ai_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var(AI_API_KEY_ENV).ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config.ai.api_key.clone().filter(|k| is_valid_key(k));

    if env_key.is_some() && toml_key.is_some() {
        warn!("AI API key found in both environment and TOML. Using environment.");
    }

    match (env_key, toml_key) {
        (Some(key), _) => {
            info!("AI API key loaded from environment variable");
            Some(key)
        }
        (None, Some(key)) => {
            info!("AI API key loaded from TOML config");
            Some(key)
        }
        (None, None) => {
            warn!("AI API key not configured; recommendations will use the fallback path");
            None
        }
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// User-Agent string for outbound HTTP clients
pub fn get_user_agent() -> String {
    format!("auditor/{}", env!("CARGO_PKG_VERSION"))
}
