use thiserror::Error;

/// Reasons the schema document cannot be turned into bindings.
///
/// All of these are fatal: they mean the input violates what the generator
/// supports, not that a retry could help.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to parse schema document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported schema at {context}: {detail}")]
    UnsupportedSchema { context: String, detail: String },

    #[error("schemas {first} and {second} both normalize to identifier {ident}")]
    DuplicateIdentifier {
        ident: String,
        first: String,
        second: String,
    },

    #[error("schema {schema} normalizes to {ident}, which generated code imports from the runtime")]
    ReservedIdentifier { ident: String, schema: String },

    #[error("unresolved reference {0}")]
    UnresolvedReference(String),

    #[error("path {0} has neither a GET nor a POST operation")]
    UnsupportedVerb(String),

    #[error("parameter {name} of {operation} is in {location}; only path and query are supported")]
    UnsupportedParameterLocation {
        operation: String,
        name: String,
        location: String,
    },

    #[error("operation {0} has no 200 response payload")]
    MissingResponse(String),

    #[error("path {0} has no summary or operation id to name it by")]
    MissingOperationName(String),

    #[error("operation or function name {0} is used more than once")]
    DuplicateOperation(String),
}

impl GenerateError {
    pub(crate) fn unsupported(context: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsupportedSchema {
            context: context.into(),
            detail: detail.into(),
        }
    }
}
