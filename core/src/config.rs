//! Runtime configuration resolved once at process startup.
//!
//! Binaries call [`Config::from_env`] after loading `.env`; everything else
//! receives the resulting value instead of reading the environment itself.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "CLINICA_API_URL";
pub const ENV_AUTH_FILE: &str = "CLINICA_AUTH_FILE";
pub const ENV_TIMEOUT_SECS: &str = "CLINICA_TIMEOUT_SECS";

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_AUTH_FILE: &str = ".clinica-auth.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{name} must start with http:// or https://, got {value:?}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{name} must be a positive number of seconds, got {value:?}")]
    InvalidTimeout { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    api_url: String,
    auth_file: PathBuf,
    timeout: Duration,
}

impl Config {
    pub fn new(api_url: &str, auth_file: PathBuf, timeout: Duration) -> Result<Self, ConfigError> {
        let api_url = api_url.trim();
        if api_url.is_empty() {
            return Err(ConfigError::Empty(ENV_API_URL));
        }
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                name: ENV_API_URL,
                value: api_url.to_string(),
            });
        }
        if auth_file.as_os_str().is_empty() {
            return Err(ConfigError::Empty(ENV_AUTH_FILE));
        }
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_file,
            timeout,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve from an arbitrary key lookup; unset keys take the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let auth_file = lookup(ENV_AUTH_FILE).unwrap_or_else(|| DEFAULT_AUTH_FILE.to_string());
        let timeout = match lookup(ENV_TIMEOUT_SECS) {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        name: ENV_TIMEOUT_SECS,
                        value: raw,
                    })
                }
            },
        };
        Self::new(&api_url, PathBuf::from(auth_file), Duration::from_secs(timeout))
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn auth_file(&self) -> &Path {
        &self.auth_file
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
