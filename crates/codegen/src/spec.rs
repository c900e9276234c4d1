//! OpenAPI document structs for serde deserialization.
//!
//! This covers the subset of OpenAPI 3.0 that the generator understands,
//! plus the vendor extension tags that carry foreign keys, dictionary keys
//! and enum metadata.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::GenerateError;

pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
pub const RESPONSE_REF_PREFIX: &str = "#/components/responses/";

/// Root document.
#[derive(Debug, Deserialize)]
pub struct OpenApiSpec {
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: BTreeMap<String, Schema>,
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
}

#[derive(Debug, Deserialize)]
pub struct PathItem {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub get: Option<Operation>,
    pub post: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: BTreeMap<String, Response>,
    /// Alternative requirement sets, each mapping scheme → scopes.
    pub security: Option<Vec<BTreeMap<String, Vec<String>>>>,
}

#[derive(Debug, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<Schema>,
}

#[derive(Debug, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

/// A response, either inline or a reference into `components.responses`.
#[derive(Debug, Deserialize)]
pub struct Response {
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
}

#[derive(Debug, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// A `{ "$ref": ... }` object as used by the extension tags.
#[derive(Debug, Clone, Deserialize)]
pub struct RefObject {
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

/// JSON Schema node with the vendor extensions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<String>,

    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    pub format: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, Schema>,

    pub items: Option<Box<Schema>>,

    pub additional_properties: Option<AdditionalProperties>,

    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Schema>>,

    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<serde_json::Value>>,

    /// OpenAPI 3.0 nullable flag.
    #[serde(default)]
    pub nullable: bool,

    /// Foreign key into a definition table.
    #[serde(rename = "x-mapped-definition")]
    pub mapped_definition: Option<RefObject>,

    /// Marks an object as a dictionary and describes its key.
    #[serde(rename = "x-dictionary-key")]
    pub dictionary_key: Option<Box<Schema>>,

    #[serde(rename = "x-enum-reference")]
    pub enum_reference: Option<RefObject>,

    #[serde(rename = "x-enum-is-bitmask", default)]
    pub enum_is_bitmask: bool,

    #[serde(rename = "x-enum-values")]
    pub enum_value_info: Option<Vec<EnumValueInfo>>,
}

/// `additionalProperties` is either a flag or a value schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// One entry of `x-enum-values`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueInfo {
    pub identifier: String,
    pub numeric_value: NumericValue,
    pub description: Option<String>,
}

/// Enum numeric values appear both as strings and as numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl NumericValue {
    /// The value as an integer literal, if it is one.
    pub fn literal(&self) -> Option<String> {
        match self {
            Self::Text(text) => {
                let text = text.trim();
                (text.parse::<i64>().is_ok() || text.parse::<u64>().is_ok()).then(|| text.to_string())
            }
            Self::Signed(value) => Some(value.to_string()),
            Self::Unsigned(value) => Some(value.to_string()),
        }
    }
}

impl OpenApiSpec {
    pub fn from_json(json: &str) -> Result<Self, GenerateError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Component schema named by a `#/components/schemas/...` reference.
    pub fn schema(&self, reference: &str) -> Option<(&str, &Schema)> {
        let name = reference.strip_prefix(SCHEMA_REF_PREFIX).unwrap_or(reference);
        self.components
            .schemas
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Follows a response `$ref` into `components.responses`.
    pub fn response<'a>(&'a self, response: &'a Response) -> Option<&'a Response> {
        match &response.ref_path {
            None => Some(response),
            Some(reference) => {
                let name = reference.strip_prefix(RESPONSE_REF_PREFIX).unwrap_or(reference);
                self.components.responses.get(name)
            }
        }
    }
}

impl Schema {
    pub fn is_type(&self, name: &str) -> bool {
        self.schema_type.as_deref() == Some(name)
    }

    /// The single reference of an `allOf: [{ $ref }]` wrapper.
    pub fn single_all_of_ref(&self) -> Option<&str> {
        match self.all_of.as_deref() {
            Some([only]) => only.ref_path.as_deref(),
            _ => None,
        }
    }

    /// Value schema of a dictionary object.
    pub fn additional_schema(&self) -> Option<&Schema> {
        match &self.additional_properties {
            Some(AdditionalProperties::Schema(schema)) => Some(schema),
            _ => None,
        }
    }

    pub fn is_enum(&self) -> bool {
        self.enum_values.is_some() || self.enum_value_info.is_some()
    }
}
