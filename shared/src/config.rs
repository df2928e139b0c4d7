use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const API_URL_VAR: &str = "TASKBOARD_API_URL";
pub const DATA_SOURCE_VAR: &str = "TASKBOARD_DATA_SOURCE";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown data source '{0}', expected 'memory' or 'http'")]
    UnknownDataSource(String),
}

/// Where the task list is loaded from and synced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSourceKind {
    /// Sample tasks kept in memory for the session.
    #[default]
    Memory,
    Http,
}

impl fmt::Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceKind::Memory => write!(f, "memory"),
            DataSourceKind::Http => write!(f, "http"),
        }
    }
}

impl FromStr for DataSourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(DataSourceKind::Memory),
            "http" => Ok(DataSourceKind::Http),
            _ => Err(ConfigError::UnknownDataSource(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub data_source: DataSourceKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            data_source: DataSourceKind::default(),
        }
    }
}

impl ClientConfig {
    /// Resolves the config from any key lookup; missing or blank values fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = non_blank(API_URL_VAR)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_source = match non_blank(DATA_SOURCE_VAR) {
            Some(raw) => raw.parse()?,
            None => DataSourceKind::default(),
        };

        Ok(Self {
            api_base_url,
            data_source,
        })
    }

    /// Values baked in at compile time. Wasm builds have no process
    /// environment to read at runtime.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match key {
            API_URL_VAR => option_env!("TASKBOARD_API_URL").map(str::to_string),
            DATA_SOURCE_VAR => option_env!("TASKBOARD_DATA_SOURCE").map(str::to_string),
            _ => None,
        })
    }
}
