//! Runtime settings resolved from the environment

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable selecting the log output format
pub const LOG_FORMAT_ENV: &str = "ADVISOR_LOG_FORMAT";

/// Environment variable pointing at an explicit advisor config file
pub const CONFIG_PATH_ENV: &str = "ADVISOR_CONFIG";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// Structured JSON lines
    Json,
}

impl LogFormat {
    /// Parse a format name, falling back to text for anything unknown
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Process-level settings shared by the binaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Application name
    pub app_name: String,
    /// Log output format
    pub log_format: LogFormat,
    /// Explicit config file, bypassing the user/project merge
    pub config_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "stock-advisor".to_string(),
            log_format: LogFormat::Text,
            config_path: None,
        }
    }
}

impl Settings {
    /// Read settings from `ADVISOR_LOG_FORMAT` and `ADVISOR_CONFIG`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_format: lookup(LOG_FORMAT_ENV)
                .map_or(defaults.log_format, |v| LogFormat::parse(&v)),
            config_path: lookup(CONFIG_PATH_ENV)
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            ..defaults
        }
    }
}
