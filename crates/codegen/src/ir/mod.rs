//! Intermediate representation for OpenAPI to Rust binding generation.
//!
//! Generation runs in three layers:
//! 1. Resolution: schema nodes -> [`RustType`], including generic family
//!    instantiations and vendor-extension typing
//! 2. Normalization and closure: paths -> operations, then every declaration
//!    the operations transitively reach
//! 3. Emission: IR -> Rust source via the `Emit` trait
//!
//! ## Module Structure
//!
//! - `types`: Rust type IR (RustType, TypeDef)
//! - `api`: operation IR (OperationDescriptor, ParamDescriptor)
//! - `resolve`: schema -> RustType, generic family table
//! - `context`: wanted-set bookkeeping for one run
//! - `normalize`: paths -> operations
//! - `closure`: wanted identifiers -> type declarations
//! - `emit`: IR -> source text
//! - `utils`: naming helpers

mod api;
mod closure;
mod context;
mod emit;
mod normalize;
mod resolve;
mod types;
pub mod utils;

pub use api::{BodyDescriptor, HttpMethod, OperationDescriptor, ParamDescriptor, ParamLocation};
pub use closure::build_closure;
pub use context::GenerationContext;
pub use emit::{Emit, GeneratedModule};
pub use normalize::normalize_operations;
pub use resolve::{GENERIC_FAMILIES, GenericFamily, ParamSource};
pub use types::{EnumVariant, Field, RustType, ScalarKind, TypeDef, TypeDefKind};
