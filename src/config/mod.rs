//! Configuration loading for the triage board API.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `TRIAGE_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration derived from `TRIAGE_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Maximum concurrent items in the manual pipeline column.
    #[serde(default = "default_manual_capacity")]
    pub manual_capacity: usize,
    /// Maximum concurrent items in the automatic pipeline column.
    #[serde(default = "default_automatic_capacity")]
    pub automatic_capacity: usize,
    /// How often clients are expected to refresh SLA badges, advertised in
    /// the board snapshot.
    #[serde(default = "default_sla_refresh_seconds")]
    pub sla_refresh_seconds: u64,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default = "default_issue_tracker_base")]
    pub issue_tracker_base: String,
    #[serde(default = "default_ticket_system_base")]
    pub ticket_system_base: String,
    /// Optional JSON dataset loaded into the board at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<String>,
    /// Directory holding per-company source-reference files for the
    /// requirement-analysis stage.
    #[serde(default = "default_source_reference_dir")]
    pub source_reference_dir: String,
}

/// Chat-completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AiConfig {
    #[serde(default = "default_ai_api_base")]
    pub api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_ai_model")]
    pub model: String,
    #[serde(default = "default_ai_temperature")]
    pub temperature: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_base: default_ai_api_base(),
            api_key: None,
            model: default_ai_model(),
            temperature: default_ai_temperature(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            manual_capacity: default_manual_capacity(),
            automatic_capacity: default_automatic_capacity(),
            sla_refresh_seconds: default_sla_refresh_seconds(),
            ai: AiConfig::default(),
            issue_tracker_base: default_issue_tracker_base(),
            ticket_system_base: default_ticket_system_base(),
            dataset_path: None,
            source_reference_dir: default_source_reference_dir(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.ai.api_key.is_some() {
            config.ai.api_key = Some("[REDACTED]".to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error if a setting is out
    /// of bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manual_capacity == 0 {
            return Err(ConfigError::InvalidCapacity {
                column: "manual",
                value: self.manual_capacity,
            });
        }
        if self.automatic_capacity == 0 {
            return Err(ConfigError::InvalidCapacity {
                column: "automatic",
                value: self.automatic_capacity,
            });
        }
        if self.sla_refresh_seconds == 0 {
            return Err(ConfigError::InvalidSlaRefresh {
                value: self.sla_refresh_seconds,
            });
        }
        if !(0.0..=2.0).contains(&self.ai.temperature) {
            return Err(ConfigError::InvalidAiTemperature {
                value: self.ai.temperature,
            });
        }
        if self.ai.api_base.is_empty() {
            return Err(ConfigError::MissingAiApiBase);
        }
        // Outside local/test the chat endpoint requires a key.
        if !matches!(self.profile.as_str(), "local" | "test") && self.ai.api_key.is_none() {
            return Err(ConfigError::MissingAiApiKey);
        }
        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_manual_capacity() -> usize {
    10
}

fn default_automatic_capacity() -> usize {
    5
}

fn default_sla_refresh_seconds() -> u64 {
    60
}

fn default_ai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ai_temperature() -> f64 {
    0.2
}

fn default_issue_tracker_base() -> String {
    "http://localhost:9091".to_string()
}

fn default_ticket_system_base() -> String {
    "http://localhost:9092".to_string()
}

fn default_source_reference_dir() -> String {
    "./references".to_string()
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("{column} pipeline capacity must be at least 1, got {value}")]
    InvalidCapacity { column: &'static str, value: usize },
    #[error("SLA refresh interval must be positive, got {value}")]
    InvalidSlaRefresh { value: u64 },
    #[error("AI temperature must be between 0.0 and 2.0, got {value}")]
    InvalidAiTemperature { value: f64 },
    #[error("AI api base is empty; set TRIAGE_AI_API_BASE")]
    MissingAiApiBase,
    #[error("AI api key is missing; set TRIAGE_AI_API_KEY")]
    MissingAiApiKey,
}

/// Loads configuration using layered `.env` files and `TRIAGE_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads configuration from layered `.env` files with the process
    /// environment overlaid last.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix("TRIAGE_") {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let manual_capacity = layered
            .remove("MANUAL_CAPACITY")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_manual_capacity);
        let automatic_capacity = layered
            .remove("AUTOMATIC_CAPACITY")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_automatic_capacity);
        let sla_refresh_seconds = layered
            .remove("SLA_REFRESH_SECONDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_sla_refresh_seconds);

        let ai = AiConfig {
            api_base: layered
                .remove("AI_API_BASE")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_ai_api_base),
            api_key: layered.remove("AI_API_KEY").filter(|v| !v.is_empty()),
            model: layered
                .remove("AI_MODEL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_ai_model),
            temperature: layered
                .remove("AI_TEMPERATURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_ai_temperature),
        };

        let issue_tracker_base = layered
            .remove("ISSUE_TRACKER_BASE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_issue_tracker_base);
        let ticket_system_base = layered
            .remove("TICKET_SYSTEM_BASE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_ticket_system_base);
        let dataset_path = layered.remove("DATASET_PATH").filter(|v| !v.is_empty());
        let source_reference_dir = layered
            .remove("SOURCE_REFERENCE_DIR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_source_reference_dir);

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            manual_capacity,
            automatic_capacity,
            sla_refresh_seconds,
            ai,
            issue_tracker_base,
            ticket_system_base,
            dataset_path,
            source_reference_dir,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var("TRIAGE_PROFILE")
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix("TRIAGE_") {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
