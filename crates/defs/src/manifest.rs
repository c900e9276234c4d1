use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Content manifest: the version token plus, per locale, where each table lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: String,
    #[serde(
        default,
        rename = "jsonWorldComponentContentPaths",
        alias = "contentPaths"
    )]
    pub content_paths: HashMap<String, HashMap<String, String>>,
}

impl Manifest {
    pub fn table_path(&self, locale: &str, table: &str) -> Option<&str> {
        self.content_paths
            .get(locale)
            .and_then(|tables| tables.get(table))
            .map(String::as_str)
    }

    /// Table names published for `locale`, sorted.
    pub fn tables(&self, locale: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .content_paths
            .get(locale)
            .map(|tables| tables.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wire_manifest() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "version": "225432.24.07.17.1730-3",
                "mobileAssetContentPath": "/common/x.content",
                "jsonWorldComponentContentPaths": {
                    "en": {
                        "DestinyInventoryItemDefinition": "/common/destiny2_content/json/en/DestinyInventoryItemDefinition-1.json",
                        "DestinyActivityDefinition": "/common/destiny2_content/json/en/DestinyActivityDefinition-1.json"
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(manifest.version, "225432.24.07.17.1730-3");
        assert_eq!(
            manifest.table_path("en", "DestinyActivityDefinition"),
            Some("/common/destiny2_content/json/en/DestinyActivityDefinition-1.json")
        );
        assert_eq!(manifest.table_path("fr", "DestinyActivityDefinition"), None);
        assert_eq!(
            manifest.tables("en"),
            vec!["DestinyActivityDefinition", "DestinyInventoryItemDefinition"]
        );
    }

    #[test]
    fn test_short_alias() {
        let manifest: Manifest =
            serde_json::from_str(r#"{"version":"v1","contentPaths":{"en":{"T":"/p"}}}"#).unwrap();
        assert_eq!(manifest.table_path("en", "T"), Some("/p"));
    }
}
