//! Runtime configuration: where to send requests and how to authenticate.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://www.bungie.net/Platform";
pub const API_KEY_ENV: &str = "APIBIND_API_KEY";
pub const BASE_URL_ENV: &str = "APIBIND_BASE_URL";

/// Connection settings for [`crate::Api`].
///
/// Loadable from the `[api]` table of a TOML file:
/// ```toml
/// [api]
/// api_key = "..."
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub user_agent: String,
    /// Per-request deadline. `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Overrides file values with `APIBIND_API_KEY` / `APIBIND_BASE_URL` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            self.api_key = key;
        }
        if let Ok(url) = std::env::var(BASE_URL_ENV)
            && !url.is_empty()
        {
            self.base_url = url;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }
}

pub fn default_user_agent() -> String {
    format!("apibind/{}", env!("CARGO_PKG_VERSION"))
}

/// Reads and parses a TOML file.
pub fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize)]
    struct File {
        api: ApiConfig,
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.user_agent.starts_with("apibind/"));
        assert!(matches!(config.validate(), Err(ConfigError::MissingApiKey)));
        assert!(ApiConfig::new("abc").validate().is_ok());
    }

    #[test]
    fn test_read_partial_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("apibind.toml");
        fs::write(&path, "[api]\napi_key = \"k\"\ntimeout_secs = 5\n").unwrap();
        let file: File = read_toml(&path).unwrap();
        assert_eq!(file.api.api_key, "k");
        assert_eq!(file.api.timeout_secs, Some(5));
        assert_eq!(file.api.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_read_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            read_toml::<File>(&missing),
            Err(ConfigError::Read { .. })
        ));
        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[api\n").unwrap();
        assert!(matches!(read_toml::<File>(&bad), Err(ConfigError::Parse { .. })));
    }
}
