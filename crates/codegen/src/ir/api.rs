//! API-level IR for normalized operations.

use super::types::RustType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }

    /// `ClientRequest` constructor used by generated code.
    pub fn constructor(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
}

#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    /// Name on the wire.
    pub name: String,
    /// Field name in the request struct.
    pub field: String,
    pub location: ParamLocation,
    pub ty: RustType,
    pub required: bool,
    /// Comma-joined on the wire.
    pub is_array: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BodyDescriptor {
    pub ty: RustType,
    pub required: bool,
}

/// Normalized API operation.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    /// Binding name, e.g. `Destiny2GetProfile`.
    pub name: String,
    pub operation_id: String,
    pub method: HttpMethod,
    pub path: String,
    pub description: Option<String>,
    pub deprecated: bool,
    /// Security scheme → required scopes.
    pub scopes: Vec<(String, Vec<String>)>,
    pub params: Vec<ParamDescriptor>,
    pub body: Option<BodyDescriptor>,
    /// Payload of the 200 response envelope.
    pub response: RustType,
}

impl OperationDescriptor {
    pub fn request_ident(&self) -> String {
        format!("{}Request", self.name)
    }
}
