// src/config.rs

//! Application configuration.
//!
//! Tunables live in an optional TOML file; the API credential is read
//! separately from a single-line secret file and passed explicitly to the
//! components that need it. No process-wide state.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and rate-limit behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        if !path.as_ref().exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetch.user_agent is empty"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(AppError::validation("fetch.timeout_secs must be > 0"));
        }
        if self.fetch.page_size == 0 {
            return Err(AppError::validation("fetch.page_size must be > 0"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
        }
    }
}

/// HTTP client and rate-limit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Base URL of the API host
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Minimum spacing between actual network requests, in seconds.
    /// Cache hits neither wait nor reset this timer.
    #[serde(default = "defaults::rate_limit")]
    pub rate_limit_secs: u64,

    /// Posts per page; also the cursor advance step
    #[serde(default = "defaults::page_size")]
    pub page_size: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            rate_limit_secs: defaults::rate_limit(),
            page_size: defaults::page_size(),
        }
    }
}

/// Read the API key from a single-line secret file.
///
/// Missing or empty files are fatal: without a key every request fails.
pub fn read_api_key(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::config(format!("API key file missing: {:?}", path)));
        }
        Err(e) => {
            return Err(AppError::config(format!(
                "can't read API key file {:?}: {e}",
                path
            )));
        }
    };

    let key = content.lines().next().unwrap_or("").trim().to_string();
    if key.is_empty() {
        return Err(AppError::config(format!("API key file is empty: {:?}", path)));
    }
    Ok(key)
}

mod defaults {
    pub fn api_base() -> String {
        "https://api.tumblr.com".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; tumblr-backup/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    // Be nice to tumblr servers
    pub fn rate_limit() -> u64 {
        3
    }
    pub fn page_size() -> u64 {
        20
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.fetch.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_partial_toml_fills_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[fetch]\nrate_limit_secs = 1\n").unwrap();

        let config = Config::load_or_default(&path);
        assert_eq!(config.fetch.rate_limit_secs, 1);
        assert_eq!(config.fetch.page_size, 20);
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let config = Config::load_or_default("/nonexistent/config.toml");
        assert_eq!(config.fetch.rate_limit_secs, 3);
    }

    #[test]
    fn read_api_key_takes_first_line() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "  secret-key  ").unwrap();
        writeln!(file, "trailing junk").unwrap();

        assert_eq!(read_api_key(&path).unwrap(), "secret-key");
    }

    #[test]
    fn read_api_key_rejects_missing_file() {
        let err = read_api_key("/nonexistent/config.txt").unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn read_api_key_reports_other_io_errors_as_such() {
        // A directory is unreadable as a file, but it is not missing.
        let tmp = tempfile::TempDir::new().unwrap();
        let err = read_api_key(tmp.path()).unwrap_err();
        assert!(!err.to_string().contains("missing"));
        assert!(err.to_string().contains("can't read"));
    }
}
