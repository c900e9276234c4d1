//! Rust source emission via the Emit trait.
//!
//! Emission is mechanical: every naming and typing decision has been made by
//! resolution and normalization, so the impls here only lay out text.

use std::collections::HashSet;

use super::api::{OperationDescriptor, ParamDescriptor, ParamLocation};
use super::types::{Field, RustType, ScalarKind, TypeDef, TypeDefKind};
use super::utils::{doc_comment, sanitize_rust_ident, to_snake_case};

/// Trait for emitting Rust source from IR nodes.
pub trait Emit {
    fn emit(&self) -> String;
}

/// Everything one generated module declares.
#[derive(Debug, Clone, Default)]
pub struct GeneratedModule {
    /// Sorted by schema name.
    pub types: Vec<TypeDef>,
    /// Sorted by path.
    pub operations: Vec<OperationDescriptor>,
}

/// Names the generated module imports; no declared type may reuse them.
pub(super) const IMPORTED_NAMES: &[&str] = &[
    "HashMap",
    "fmt",
    "Api",
    "BitmaskSet",
    "BitmaskValue",
    "ClientError",
    "ClientRequest",
    "Definition",
    "Envelope",
    "HashRef",
    "Int64",
    "JsonMap",
    "Nullable",
    "Timestamp",
    "join_array",
    "Deserialize",
    "Serialize",
];

const HEADER: &str = "\
// Code generated by apibind-codegen. DO NOT EDIT.

#[allow(unused_imports)]
use std::collections::HashMap;
#[allow(unused_imports)]
use std::fmt;

#[allow(unused_imports)]
use apibind_runtime::{
    Api, BitmaskSet, BitmaskValue, ClientError, ClientRequest, Definition, Envelope, HashRef, Int64,
    JsonMap, Nullable, Timestamp, join_array,
};
#[allow(unused_imports)]
use serde::{Deserialize, Serialize};
";

impl Emit for GeneratedModule {
    fn emit(&self) -> String {
        let mut output = String::from(HEADER);
        for def in &self.types {
            output.push('\n');
            output.push_str(&def.emit());
        }
        for operation in &self.operations {
            output.push('\n');
            output.push_str(&operation.emit());
        }
        output
    }
}

// =============================================================================
// Types
// =============================================================================

impl Emit for ScalarKind {
    fn emit(&self) -> String {
        match self {
            ScalarKind::String => "String",
            ScalarKind::Bool => "bool",
            ScalarKind::U8 => "u8",
            ScalarKind::I16 => "i16",
            ScalarKind::I32 => "i32",
            ScalarKind::U32 => "u32",
            ScalarKind::I64 => "Int64",
            ScalarKind::F32 => "f32",
            ScalarKind::F64 => "f64",
        }
        .to_string()
    }
}

impl Emit for RustType {
    fn emit(&self) -> String {
        match self {
            RustType::Scalar(kind) => kind.emit(),
            RustType::Timestamp => "Timestamp".to_string(),
            RustType::Json => "JsonMap".to_string(),
            RustType::Named(ident) => ident.clone(),
            RustType::Param => "T".to_string(),
            RustType::Generic { family, arg } => format!("{family}<{}>", arg.emit()),
            RustType::Vec(inner) => format!("Vec<{}>", inner.emit()),
            RustType::Map { key, value } => format!("HashMap<{}, {}>", key.emit(), value.emit()),
            RustType::Nullable(inner) => format!("Nullable<{}>", inner.emit()),
            RustType::HashRef(ident) => format!("HashRef<{ident}>"),
            RustType::Bitmask(ident) => format!("BitmaskSet<{ident}>"),
        }
    }
}

/// Primitive backing an enum newtype. Unlike field types, 64-bit enums
/// stay plain numbers.
pub(super) fn enum_repr(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::U8 => "u8",
        ScalarKind::I16 => "i16",
        ScalarKind::U32 => "u32",
        ScalarKind::I64 => "i64",
        _ => "i32",
    }
}

impl Emit for TypeDef {
    fn emit(&self) -> String {
        let mut output = doc_comment(self.description.as_deref(), "");
        match &self.kind {
            TypeDefKind::Struct { generic, fields } => {
                output.push_str(&emit_struct(&self.ident, *generic, fields));
                if let Some(table) = &self.definition_table {
                    output.push_str(&format!(
                        "\nimpl Definition for {} {{\n    const TABLE: &'static str = {table:?};\n}}\n",
                        self.ident
                    ));
                }
            }
            TypeDefKind::OpenMap => {
                output.push_str(&format!("pub type {} = JsonMap;\n", self.ident));
            }
            TypeDefKind::Alias(ty) => {
                output.push_str(&format!("pub type {} = {};\n", self.ident, ty.emit()));
            }
            TypeDefKind::Enum { repr, variants } => {
                let repr = enum_repr(*repr);
                let ident = &self.ident;
                output.push_str(&format!(
                    "#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]\n\
                     #[serde(transparent)]\n\
                     pub struct {ident}(pub {repr});\n\n\
                     impl {ident} {{\n"
                ));
                for variant in variants {
                    output.push_str(&doc_comment(variant.description.as_deref(), "    "));
                    output.push_str(&format!(
                        "    pub const {}: Self = Self({});\n",
                        variant.const_name, variant.value
                    ));
                }
                if !variants.is_empty() {
                    output.push('\n');
                }
                output.push_str(
                    "    /// Identifier of a declared value.\n    pub fn name(self) -> Option<&'static str> {\n        match self.0 {\n",
                );
                let mut seen = HashSet::new();
                for variant in variants.iter().filter(|v| seen.insert(v.value.as_str())) {
                    output.push_str(&format!(
                        "            {} => Some({:?}),\n",
                        variant.value, variant.identifier
                    ));
                }
                output.push_str("            _ => None,\n        }\n    }\n}\n\n");
                output.push_str(&format!(
                    "impl fmt::Display for {ident} {{\n    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {{\n        write!(f, \"{{}}\", self.0)\n    }}\n}}\n\n\
                     impl BitmaskValue for {ident} {{\n    fn bits(self) -> u64 {{\n        self.0 as u64\n    }}\n}}\n"
                ));
            }
        }
        output
    }
}

fn emit_struct(ident: &str, generic: bool, fields: &[Field]) -> String {
    let mut output = String::from("#[derive(Debug, Clone, Default, Serialize, Deserialize)]\n");
    if generic {
        // serde cannot infer the key bounds of HashMap<T, _>.
        if fields.iter().any(|f| f.ty.has_param_key()) {
            output.push_str(
                "#[serde(bound(deserialize = \"T: Deserialize<'de> + Default + Eq + std::hash::Hash\"))]\n",
            );
        }
        output.push_str(&format!("pub struct {ident}<T> {{\n"));
    } else {
        output.push_str(&format!("pub struct {ident} {{\n"));
    }
    for field in fields {
        output.push_str(&doc_comment(field.description.as_deref(), "    "));
        let skip = if field.ty.is_nullable() {
            ", skip_serializing_if = \"Nullable::is_null\""
        } else {
            ""
        };
        output.push_str(&format!(
            "    #[serde(rename = {:?}, default{skip})]\n    pub {}: {},\n",
            field.wire_name,
            field.rust_name,
            field.ty.emit()
        ));
    }
    output.push_str("}\n");
    output
}

// =============================================================================
// Operations
// =============================================================================

impl OperationDescriptor {
    /// Name of the generated async function.
    pub fn function_name(&self) -> String {
        sanitize_rust_ident(&to_snake_case(&self.name))
    }
}

/// Field type in the request struct. Optional scalars become `Option`;
/// optional arrays stay `Vec` and are skipped when empty.
fn param_field_type(param: &ParamDescriptor) -> String {
    if param.required || param.is_array {
        param.ty.emit()
    } else {
        format!("Option<{}>", param.ty.emit())
    }
}

fn param_value(param: &ParamDescriptor, binding: &str) -> String {
    if param.is_array {
        format!("join_array({binding})")
    } else {
        binding.to_string()
    }
}

fn param_setter(param: &ParamDescriptor) -> &'static str {
    match param.location {
        ParamLocation::Path => "path_param",
        ParamLocation::Query => "query_param",
    }
}

impl Emit for OperationDescriptor {
    fn emit(&self) -> String {
        let request_ident = self.request_ident();
        let function = self.function_name();
        let body_field = if self.params.iter().any(|p| p.field == "body") {
            "request_body"
        } else {
            "body"
        };

        // Request struct
        let mut output = format!("/// Parameters of [`{function}`].\n");
        output.push_str("#[derive(Debug, Clone, Default)]\n");
        output.push_str(&format!("pub struct {request_ident} {{\n"));
        for param in &self.params {
            output.push_str(&doc_comment(param.description.as_deref(), "    "));
            output.push_str(&format!("    pub {}: {},\n", param.field, param_field_type(param)));
        }
        if let Some(body) = &self.body {
            let ty = if body.required {
                body.ty.emit()
            } else {
                format!("Option<{}>", body.ty.emit())
            };
            output.push_str(&format!("    pub {body_field}: {ty},\n"));
        }
        output.push_str("}\n\n");

        // Function docs
        output.push_str(&doc_comment(self.description.as_deref(), ""));
        if self.description.is_some() {
            output.push_str("///\n");
        }
        output.push_str(&format!("/// URL: `{}`\n", self.path));
        output.push_str(&format!(
            "/// Operation: `{}` ({})\n",
            self.operation_id,
            self.method.as_str()
        ));
        for (scheme, scopes) in &self.scopes {
            if scopes.is_empty() {
                output.push_str(&format!("/// Scope: {scheme}\n"));
            } else {
                output.push_str(&format!("/// Scope: {scheme}: {}\n", scopes.join(", ")));
            }
        }
        if self.deprecated {
            output.push_str("#[deprecated]\n");
        }

        // Function body
        output.push_str(&format!(
            "pub async fn {function}(api: &Api, req: &{request_ident}) -> Result<Envelope<{}>, ClientError> {{\n",
            self.response.emit()
        ));

        let mut chained = Vec::new();
        let mut conditional = Vec::new();
        for param in &self.params {
            let setter = param_setter(param);
            let binding = format!("&req.{}", param.field);
            if param.required {
                chained.push(format!(
                    "        .{setter}({:?}, {})\n",
                    param.name,
                    param_value(param, &binding)
                ));
            } else if param.is_array {
                conditional.push(format!(
                    "    if !req.{field}.is_empty() {{\n        request = request.{setter}({:?}, {});\n    }}\n",
                    param.name,
                    param_value(param, &binding),
                    field = param.field,
                ));
            } else {
                conditional.push(format!(
                    "    if let Some(value) = &req.{} {{\n        request = request.{setter}({:?}, value);\n    }}\n",
                    param.field, param.name,
                ));
            }
        }
        if let Some(body) = &self.body {
            if body.required {
                conditional.push(format!("    request = request.json_body(&req.{body_field})?;\n"));
            } else {
                conditional.push(format!(
                    "    if let Some(body) = &req.{body_field} {{\n        request = request.json_body(body)?;\n    }}\n"
                ));
            }
        }

        let binding = if conditional.is_empty() { "let request" } else { "let mut request" };
        output.push_str(&format!(
            "    {binding} = ClientRequest::{}({:?}, {:?})\n",
            self.method.constructor(),
            self.operation_id,
            self.path
        ));
        for call in &chained {
            output.push_str(call);
        }
        // Drop the trailing newline of the builder chain to end the statement.
        if output.ends_with('\n') {
            output.pop();
        }
        output.push_str(";\n");
        for statement in &conditional {
            output.push_str(statement);
        }
        output.push_str("    api.call(request).await\n}\n");
        output
    }
}
