//! Runtime configuration read from the environment (and `.env` via `dotenv`).
//!
//! | Variable                     | Default                                            |
//! |------------------------------|----------------------------------------------------|
//! | `GEMINI_API_KEY`             | required before the first model call               |
//! | `GEMINI_MODEL`               | `gemini-pro`                                       |
//! | `GEMINI_API_BASE`            | `https://generativelanguage.googleapis.com/v1beta` |
//! | `HRBOT_DATASET`              | `data/apexnuera_data.json` (path or http(s) URL)   |
//! | `HRBOT_REFRESH_SECS`         | `3600`                                             |
//! | `HRBOT_DATABASE_URL`         | unset (transcripts kept in memory only)            |
//! | `HRBOT_REQUEST_TIMEOUT_SECS` | `120`                                              |
//! | `HRBOT_LOG_FORMAT`           | `pretty` (`json` for structured output)            |

use crate::error::AppError;
use crate::llm::gemini::{DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::models::GenerationConfig;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use validator::Validate;

pub const DEFAULT_DATASET: &str = "data/apexnuera_data.json";
const DEFAULT_REFRESH_SECS: u64 = 3600;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!("Unknown log format: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    /// File path or http(s) URL of the JSON records export.
    pub dataset: String,
    pub refresh: Duration,
    pub database_url: Option<String>,
    pub request_timeout: Duration,
    pub generation: GenerationConfig,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            refresh: Duration::from_secs(DEFAULT_REFRESH_SECS),
            database_url: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            generation: GenerationConfig::default(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();

        let config = Self {
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            model: non_empty_var("GEMINI_MODEL").unwrap_or(defaults.model),
            api_base: non_empty_var("GEMINI_API_BASE").unwrap_or(defaults.api_base),
            dataset: non_empty_var("HRBOT_DATASET").unwrap_or(defaults.dataset),
            refresh: secs_var("HRBOT_REFRESH_SECS")?.unwrap_or(defaults.refresh),
            database_url: non_empty_var("HRBOT_DATABASE_URL"),
            request_timeout: secs_var("HRBOT_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
            generation: defaults.generation,
            log_format: match non_empty_var("HRBOT_LOG_FORMAT") {
                Some(raw) => raw.parse()?,
                None => defaults.log_format,
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks everything that can be checked without touching the network.
    pub fn validate(&self) -> Result<(), AppError> {
        self.generation.validate()?;
        Url::parse(&self.api_base)?;
        if self.model.trim().is_empty() {
            return Err(AppError::Config("GEMINI_MODEL is empty".to_string()));
        }
        if self.refresh.is_zero() {
            return Err(AppError::Config(
                "HRBOT_REFRESH_SECS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// The model credentials; their absence halts the app before any interaction.
    pub fn require_api_key(&self) -> Result<&str, AppError> {
        self.gemini_api_key.as_deref().ok_or_else(|| {
            AppError::Config(
                "Gemini API key not found. Set GEMINI_API_KEY in the environment or in a .env file."
                    .to_string(),
            )
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn secs_var(name: &str) -> Result<Option<Duration>, AppError> {
    non_empty_var(name)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| AppError::Config(format!("{} must be a number of seconds: {}", name, e)))
        })
        .transpose()
}
