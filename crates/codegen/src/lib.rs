//! OpenAPI to Rust bindings generator.
//!
//! Reads an OpenAPI 3.0 document with the vendor extensions for foreign keys
//! (`x-mapped-definition`), typed dictionary keys (`x-dictionary-key`) and
//! enum metadata (`x-enum-*`), and emits one Rust module with:
//! - a type declaration for every schema reachable from an operation
//! - a request struct and an async function per path
//!
//! The emitted module depends on `apibind-runtime` and `serde`.

pub mod error;
pub mod ir;
pub mod spec;

mod emitter;

pub use emitter::{build_module, generate};
pub use error::GenerateError;
pub use spec::OpenApiSpec;
