use std::path::PathBuf;

use apibind_defs::DefinitionCache;
use apibind_runtime::Api;
use clap::Args;

use super::run_cli_async;
use crate::config::ConfigFile;

#[derive(Args, Debug, Clone)]
pub struct TablesArgs {
    #[arg(long = "config", value_name = "CONFIG_TOML", help = "Configuration file with [api] and [cache] tables")]
    pub config: Option<PathBuf>,
}

/// Prints the manifest version and the tables listed for the configured locale.
pub async fn run(args: TablesArgs) -> i32 {
    run_cli_async(move || async move {
        let config = ConfigFile::load(args.config.as_deref()).map_err(|e| e.to_string())?;
        let api = Api::from_config(&config.api).map_err(|e| e.to_string())?;
        let cache = DefinitionCache::from_api(api, &config.api, &config.cache).map_err(|e| e.to_string())?;

        let manifest = cache.manifest().await.map_err(|e| e.to_string())?;
        println!("version: {}", manifest.version);
        for table in manifest.tables(&config.cache.locale) {
            println!("{table}");
        }
        Ok(())
    })
    .await
}
