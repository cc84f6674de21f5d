//! Configuration loading and resolution
//!
//! Settings resolve with ENV → TOML priority (the CLI layer sits above both;
//! see the service binary). Required keys fail fast with a message naming
//! every configuration channel.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable prefix for all prodsync settings
const ENV_PREFIX: &str = "PRODSYNC_";

/// Default Gemini model when none is configured
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default billing-cadence tokens stripped from structural seeds
const DEFAULT_STRIP_PATTERNS: &[&str] = &[
    "annual",
    "monthly",
    "yearly",
    "anual",
    "mensal",
    "semestral",
];

/// On-disk TOML configuration (all keys optional; ENV takes priority)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub jira_base_url: Option<String>,
    pub jira_email: Option<String>,
    pub jira_api_token: Option<String>,
    pub jira_project_key: Option<String>,
    pub jira_issue_type: Option<String>,
    pub product_field_id: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    pub require_validation: Option<bool>,
    pub strip_patterns: Option<Vec<String>>,
    pub propagation_delay_ms: Option<u64>,
    pub update_retry_attempts: Option<u32>,
    pub update_retry_delay_ms: Option<u64>,
    pub port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Jira instance base URL, e.g. `https://example.atlassian.net`
    pub jira_base_url: String,
    /// Account email for basic auth
    pub jira_email: String,
    /// API token for basic auth
    pub jira_api_token: String,
    /// Project whose issues are scanned and created
    pub jira_project_key: String,
    /// Issue type used by issue intake (default "Task")
    pub jira_issue_type: String,
    /// Single-select custom field holding the product vocabulary
    pub product_field_id: String,
    /// Gemini API key; when absent the pipeline runs on structural seeds only
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    pub gemini_model: String,
    /// Require generative validation before accepting a candidate
    pub require_validation: bool,
    /// Cadence/descriptor tokens stripped from structural seeds
    pub strip_patterns: Vec<String>,
    /// Wait after option creation before the confirming re-read
    pub propagation_delay_ms: u64,
    /// Attempt budget for the issue field update
    pub update_retry_attempts: u32,
    /// Delay between field update attempts
    pub update_retry_delay_ms: u64,
    /// HTTP listen port
    pub port: u16,
}

impl ServiceConfig {
    /// Resolve configuration with ENV → TOML priority.
    ///
    /// `config_path` overrides the default per-user location. An explicitly
    /// given path must exist; the default location is optional.
    pub fn resolve(config_path: Option<&Path>) -> Result<Self> {
        let toml_config = match config_path {
            Some(path) => load_toml_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => load_toml_config(&path)?,
                _ => TomlConfig::default(),
            },
        };
        Self::from_sources(&toml_config)
    }

    /// Combine environment variables with an already-loaded TOML config.
    pub fn from_sources(toml_config: &TomlConfig) -> Result<Self> {
        let jira_base_url = require(
            "jira_base_url",
            resolve_string("jira_base_url", toml_config.jira_base_url.as_deref()),
        )?;
        let jira_base_url = jira_base_url.trim_end_matches('/').to_string();
        let jira_email = require(
            "jira_email",
            resolve_string("jira_email", toml_config.jira_email.as_deref()),
        )?;
        let jira_api_token = require(
            "jira_api_token",
            resolve_string("jira_api_token", toml_config.jira_api_token.as_deref()),
        )?;
        let jira_project_key = require(
            "jira_project_key",
            resolve_string("jira_project_key", toml_config.jira_project_key.as_deref()),
        )?;
        let product_field_id = require(
            "product_field_id",
            resolve_string("product_field_id", toml_config.product_field_id.as_deref()),
        )?;

        let jira_issue_type = resolve_string("jira_issue_type", toml_config.jira_issue_type.as_deref())
            .unwrap_or_else(|| "Task".to_string());
        let gemini_api_key = resolve_string("gemini_api_key", toml_config.gemini_api_key.as_deref());
        let gemini_model = resolve_string("gemini_model", toml_config.gemini_model.as_deref())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let require_validation = resolve_parsed(
            "require_validation",
            toml_config.require_validation,
        )?
        .unwrap_or(false);

        let strip_patterns = resolve_strip_patterns(toml_config)?;

        let propagation_delay_ms =
            resolve_parsed("propagation_delay_ms", toml_config.propagation_delay_ms)?.unwrap_or(2000);
        let update_retry_attempts =
            resolve_parsed("update_retry_attempts", toml_config.update_retry_attempts)?.unwrap_or(3);
        let update_retry_delay_ms =
            resolve_parsed("update_retry_delay_ms", toml_config.update_retry_delay_ms)?.unwrap_or(2000);
        let port = resolve_parsed("port", toml_config.port)?.unwrap_or(3000);

        if update_retry_attempts == 0 {
            return Err(Error::Config(
                "update_retry_attempts must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            jira_base_url,
            jira_email,
            jira_api_token,
            jira_project_key,
            jira_issue_type,
            product_field_id,
            gemini_api_key,
            gemini_model,
            require_validation,
            strip_patterns,
            propagation_delay_ms,
            update_retry_attempts,
            update_retry_delay_ms,
            port,
        })
    }
}

/// Default per-user config location: `<config dir>/prodsync/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("prodsync").join("config.toml"))
}

/// Read and parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Environment variable name for a config key
fn env_var_name(key: &str) -> String {
    format!("{}{}", ENV_PREFIX, key.to_uppercase())
}

/// Non-empty environment variable lookup
fn env_value(key: &str) -> Option<String> {
    std::env::var(env_var_name(key))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve a string key with ENV → TOML priority, warning when both are set
fn resolve_string(key: &str, toml_value: Option<&str>) -> Option<String> {
    let env = env_value(key);
    let toml = toml_value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    if env.is_some() && toml.is_some() {
        warn!(
            key,
            "{} set in both environment and TOML config; using environment",
            key
        );
    }

    env.or(toml)
}

/// Resolve a parseable key with ENV → TOML priority
fn resolve_parsed<T>(key: &str, toml_value: Option<T>) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = env_value(key) {
        let parsed = raw.parse::<T>().map_err(|e| {
            Error::Config(format!("Invalid {} value {:?}: {}", env_var_name(key), raw, e))
        })?;
        if toml_value.is_some() {
            warn!(
                key,
                "{} set in both environment and TOML config; using environment",
                key
            );
        }
        return Ok(Some(parsed));
    }
    Ok(toml_value)
}

/// Strip patterns: ENV is a comma-separated list, TOML an array of strings
fn resolve_strip_patterns(toml_config: &TomlConfig) -> Result<Vec<String>> {
    if let Some(raw) = env_value("strip_patterns") {
        let patterns: Vec<String> = raw
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if patterns.is_empty() {
            return Err(Error::Config(format!(
                "{} must contain at least one pattern",
                env_var_name("strip_patterns")
            )));
        }
        return Ok(patterns);
    }

    if let Some(patterns) = &toml_config.strip_patterns {
        return Ok(patterns.clone());
    }

    Ok(DEFAULT_STRIP_PATTERNS.iter().map(|p| p.to_string()).collect())
}

/// Fail with a message naming every configuration channel for the key
fn require(key: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| {
        Error::Config(format!(
            "{key} not configured. Provide it using one of:\n\
             1. Environment: {env}=<value>\n\
             2. TOML config: {path} ({key} = \"<value>\")",
            key = key,
            env = env_var_name(key),
            path = default_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<config dir>/prodsync/config.toml".to_string()),
        ))
    })
}
