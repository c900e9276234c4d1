use std::path::PathBuf;

use apibind_defs::DefinitionCache;
use apibind_runtime::Api;
use clap::Args;
use tracing::debug;

use super::run_cli_async;
use crate::config::ConfigFile;

#[derive(Args, Debug, Clone)]
pub struct DefinitionArgs {
    #[arg(long = "table", value_name = "TABLE", help = "Definition table, e.g. DestinyInventoryItemDefinition")]
    pub table: String,
    #[arg(long = "hash", value_name = "HASH", help = "Record hash within the table")]
    pub hash: u32,
    #[arg(long = "config", value_name = "CONFIG_TOML", help = "Configuration file with [api] and [cache] tables")]
    pub config: Option<PathBuf>,
}

pub async fn run(args: DefinitionArgs) -> i32 {
    run_cli_async(move || async move {
        let config = ConfigFile::load(args.config.as_deref()).map_err(|e| e.to_string())?;
        let api = Api::from_config(&config.api).map_err(|e| e.to_string())?;
        let cache = DefinitionCache::from_api(api, &config.api, &config.cache).map_err(|e| e.to_string())?;

        debug!(table = %args.table, hash = args.hash, "Resolving definition.");
        let raw = cache
            .resolve(&args.table, args.hash)
            .await
            .map_err(|e| format!("Failed to resolve {} {}: {e}", args.table, args.hash))?;

        let value: serde_json::Value =
            serde_json::from_str(raw.get()).map_err(|e| format!("Invalid record JSON: {e}"))?;
        let pretty = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
        println!("{pretty}");
        Ok(())
    })
    .await
}
