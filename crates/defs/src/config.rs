use serde::Deserialize;

pub const DEFAULT_LOCALE: &str = "en";
pub const DEFAULT_CONTENT_BASE_URL: &str = "https://www.bungie.net";

/// Settings for the definition cache, read from the `[cache]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Manifest locale whose tables are loaded.
    pub locale: String,
    /// Host that serves the table paths listed in the manifest.
    pub content_base_url: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            content_base_url: DEFAULT_CONTENT_BASE_URL.to_string(),
        }
    }
}
