use std::path::Path;

use apibind_defs::CacheConfig;
use apibind_runtime::{ApiConfig, ConfigError, read_toml};
use serde::Deserialize;
use tracing::debug;

/// Contents of an `apibind.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub api: ApiConfig,
    pub cache: CacheConfig,
}

impl ConfigFile {
    /// Reads the file when given, applies environment overrides and checks
    /// that an API key is present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                debug!(path = %path.display(), "Reading configuration file.");
                read_toml::<ConfigFile>(path)?
            }
            None => ConfigFile::default(),
        };
        config.api = config.api.with_env_overrides();
        config.api.validate()?;
        Ok(config)
    }
}
