//! Definition tables: the content manifest, table sources and a
//! concurrent, version-aware cache that resolves [`apibind_runtime::HashRef`]s.

pub mod cache;
pub mod config;
pub mod manifest;
pub mod source;

pub use cache::DefinitionCache;
pub use config::CacheConfig;
pub use manifest::Manifest;
pub use source::{ContentSource, HttpContentSource, TableRecords};
