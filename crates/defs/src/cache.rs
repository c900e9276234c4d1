//! Versioned, lazily loaded cache of definition tables.
//!
//! Locking layout:
//! - `directory` guards the current manifest and the table-name → entry map.
//!   It is only held for short reads and writes, never across a fetch.
//! - `manifest_gate` serializes manifest fetches.
//! - Each [`TableEntry`] has a `fetch_gate` so at most one task downloads a
//!   table per version change, and a `state` lock held only to compare,
//!   replace or look up.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use apibind_runtime::{Api, ApiConfig, Definition, DefinitionError, DefinitionSource, RawValue, TransportError};
use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::config::CacheConfig;
use crate::manifest::Manifest;
use crate::source::{ContentSource, HttpContentSource, TableRecords};

#[derive(Default)]
struct Directory {
    manifest: Option<Arc<Manifest>>,
    tables: HashMap<String, Arc<TableEntry>>,
}

#[derive(Default)]
struct TableEntry {
    fetch_gate: Mutex<()>,
    state: RwLock<TableState>,
}

/// Records loaded for one manifest version. An empty version means unloaded.
#[derive(Default)]
struct TableState {
    version: String,
    records: Arc<TableRecords>,
}

/// Resolves `(table, hash)` pairs against tables named by the manifest.
///
/// Tables are fetched on first use and refetched whenever the manifest
/// version changes. Loaded tables are kept for the life of the cache.
pub struct DefinitionCache {
    source: Arc<dyn ContentSource>,
    locale: String,
    directory: Mutex<Directory>,
    manifest_gate: Mutex<()>,
}

impl fmt::Debug for DefinitionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionCache")
            .field("source", &self.source)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

impl DefinitionCache {
    pub fn new(source: Arc<dyn ContentSource>, config: &CacheConfig) -> Self {
        Self {
            source,
            locale: config.locale.clone(),
            directory: Mutex::new(Directory::default()),
            manifest_gate: Mutex::new(()),
        }
    }

    /// A cache backed by the live API and content host.
    ///
    /// `api_config` supplies the user agent and deadline for table downloads.
    pub fn from_api(api: Api, api_config: &ApiConfig, config: &CacheConfig) -> Result<Self, TransportError> {
        let source = HttpContentSource::new(api, api_config, config)?;
        Ok(Self::new(Arc::new(source), config))
    }

    /// The loaded manifest, fetching it if none is loaded yet.
    pub async fn manifest(&self) -> Result<Arc<Manifest>, DefinitionError> {
        if let Some(manifest) = self.current_manifest().await {
            return Ok(manifest);
        }
        let _gate = self.manifest_gate.lock().await;
        if let Some(manifest) = self.current_manifest().await {
            return Ok(manifest);
        }
        self.refresh_manifest().await
    }

    /// Fetches the manifest unconditionally and installs it.
    ///
    /// Tables whose loaded version differs from the new manifest are refetched
    /// on their next use.
    pub async fn check_updates(&self) -> Result<Arc<Manifest>, DefinitionError> {
        let _gate = self.manifest_gate.lock().await;
        self.refresh_manifest().await
    }

    /// Version of `table` currently held, if it has been loaded.
    pub async fn loaded_version(&self, table: &str) -> Option<String> {
        let entry = self.directory.lock().await.tables.get(table).cloned()?;
        let state = entry.state.read().await;
        (!state.version.is_empty()).then(|| state.version.clone())
    }

    /// Raw record for `hash` in `table`.
    ///
    /// A miss forces one manifest refresh and one retry before reporting
    /// [`DefinitionError::NotFound`].
    pub async fn resolve(&self, table: &str, hash: u32) -> Result<Box<RawValue>, DefinitionError> {
        let entry = self.ensure_table(table).await?;
        if let Some(record) = lookup(&entry, hash).await {
            return Ok(record);
        }

        debug!(table, hash, "Definition miss, checking for manifest updates.");
        self.check_updates().await?;
        let entry = self.ensure_table(table).await?;
        lookup(&entry, hash)
            .await
            .ok_or_else(|| DefinitionError::NotFound {
                table: table.to_string(),
                hash,
            })
    }

    /// Decoded record of type `T` for `hash`.
    pub async fn get<T: Definition>(&self, hash: u32) -> Result<T, DefinitionError> {
        let raw = self.resolve(T::TABLE, hash).await?;
        Ok(serde_json::from_str(raw.get())?)
    }

    async fn current_manifest(&self) -> Option<Arc<Manifest>> {
        self.directory.lock().await.manifest.clone()
    }

    /// Caller holds `manifest_gate`.
    async fn refresh_manifest(&self) -> Result<Arc<Manifest>, DefinitionError> {
        let manifest = self.source.manifest().await?;
        if manifest.version.is_empty() {
            return Err(DefinitionError::MissingManifest);
        }
        debug!(version = %manifest.version, "Loaded content manifest.");
        let manifest = Arc::new(manifest);
        self.directory.lock().await.manifest = Some(Arc::clone(&manifest));
        Ok(manifest)
    }

    /// Makes sure `table` holds the current manifest version.
    async fn ensure_table(&self, table: &str) -> Result<Arc<TableEntry>, DefinitionError> {
        let manifest = self.manifest().await?;
        if manifest.table_path(&self.locale, table).is_none() {
            return Err(DefinitionError::UnknownTable(table.to_string()));
        }

        let entry = {
            let mut directory = self.directory.lock().await;
            Arc::clone(directory.tables.entry(table.to_string()).or_default())
        };
        if entry.state.read().await.version == manifest.version {
            return Ok(entry);
        }

        let _fetching = entry.fetch_gate.lock().await;
        // Another task may have loaded the table, or installed a newer
        // manifest, while this one waited.
        let manifest = self.manifest().await?;
        if entry.state.read().await.version == manifest.version {
            return Ok(Arc::clone(&entry));
        }
        let path = manifest
            .table_path(&self.locale, table)
            .ok_or_else(|| DefinitionError::UnknownTable(table.to_string()))?;

        debug!(table, version = %manifest.version, path, "Fetching definition table.");
        let records = self.source.table(path).await?;
        let mut state = entry.state.write().await;
        *state = TableState {
            version: manifest.version.clone(),
            records: Arc::new(records),
        };
        drop(state);
        Ok(Arc::clone(&entry))
    }
}

async fn lookup(entry: &TableEntry, hash: u32) -> Option<Box<RawValue>> {
    entry.state.read().await.records.get(&hash).cloned()
}

#[async_trait]
impl DefinitionSource for DefinitionCache {
    async fn definition(&self, table: &str, hash: u32) -> Result<Box<RawValue>, DefinitionError> {
        self.resolve(table, hash).await
    }
}
