//! Rust binding emitter for OpenAPI documents.
//!
//! The pipeline is:
//! 1. Parse: OpenAPI JSON -> OpenApiSpec
//! 2. Normalize: paths -> OperationDescriptors, marking the types they use
//! 3. Closure: wanted identifiers -> TypeDefs
//! 4. Emit: GeneratedModule -> String (via Emit trait)

use tracing::debug;

use crate::error::GenerateError;
use crate::ir::{Emit, GeneratedModule, GenerationContext, build_closure, normalize_operations};
use crate::spec::OpenApiSpec;

/// Generate Rust bindings from an OpenAPI JSON string.
pub fn generate(openapi_json: &str) -> Result<String, GenerateError> {
    let spec = OpenApiSpec::from_json(openapi_json)?;
    Ok(build_module(&spec)?.emit())
}

/// Builds the module IR without rendering it.
pub fn build_module(spec: &OpenApiSpec) -> Result<GeneratedModule, GenerateError> {
    let mut ctx = GenerationContext::new(spec)?;
    let operations = normalize_operations(&mut ctx)?;
    let types = build_closure(&mut ctx)?;
    debug!(
        operations = operations.len(),
        types = types.len(),
        "Built bindings module."
    );
    Ok(GeneratedModule { types, operations })
}
