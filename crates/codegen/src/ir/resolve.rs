//! Schema → Rust type resolution.
//!
//! Resolution is pure with respect to the output closure: it returns a
//! [`RustType`] and leaves marking dependencies as wanted to the caller
//! (see `GenerationContext::resolve_wanted`).

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use super::emit::IMPORTED_NAMES;
use super::types::{RustType, ScalarKind};
use super::utils::normalize_ident;
use crate::error::GenerateError;
use crate::spec::{OpenApiSpec, SCHEMA_REF_PREFIX, Schema};

/// Where a generic family member's type argument comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSource {
    /// The text after the marker: `ItemComponentSetOfint64` → `Int64`.
    Suffix,
    /// Element type of the `results` array.
    ResultsElement,
    /// Type of the `data` property.
    DataProperty,
}

/// A set of schemas that are instantiations of one generic type.
#[derive(Debug)]
pub struct GenericFamily {
    pub name: &'static str,
    pub markers: &'static [&'static str],
    pub source: ParamSource,
}

pub const GENERIC_FAMILIES: &[GenericFamily] = &[
    GenericFamily {
        name: "BaseItemComponentSet",
        markers: &["BaseItemComponentSetOf"],
        source: ParamSource::Suffix,
    },
    GenericFamily {
        name: "ItemComponentSet",
        markers: &["ItemComponentSetOf"],
        source: ParamSource::Suffix,
    },
    GenericFamily {
        name: "VendorItemComponentSet",
        markers: &["VendorItemComponentSetOf"],
        source: ParamSource::Suffix,
    },
    GenericFamily {
        name: "VendorSaleItemSetComponent",
        markers: &["VendorSaleItemSetComponentOf"],
        source: ParamSource::Suffix,
    },
    GenericFamily {
        name: "SearchResult",
        markers: &["SearchResultOf"],
        source: ParamSource::ResultsElement,
    },
    GenericFamily {
        name: "ComponentResponse",
        markers: &["SingleComponentResponseOf", "DictionaryComponentResponseOf"],
        source: ParamSource::DataProperty,
    },
];

/// Enums whose use as dictionary keys disagrees with the wire data, which
/// carries plain strings for them.
const STRING_KEYED_ENUMS: [&str; 3] = [
    "Destiny.DestinyGender",
    "BungieCredentialType",
    "BungieMembershipType",
];

/// The family an identifier belongs to, with the text after the marker.
pub fn family_member(ident: &str) -> Option<(&'static GenericFamily, &str)> {
    GENERIC_FAMILIES.iter().find_map(|family| {
        family
            .markers
            .iter()
            .find_map(|marker| ident.strip_prefix(marker))
            .filter(|suffix| !suffix.is_empty())
            .map(|suffix| (family, suffix))
    })
}

pub fn generic_family(name: &str) -> Option<&'static GenericFamily> {
    GENERIC_FAMILIES.iter().find(|family| family.name == name)
}

#[derive(Debug)]
pub struct Resolver<'a> {
    spec: &'a OpenApiSpec,
    /// Identifier → schema name, for schemas outside the generic families.
    idents: BTreeMap<String, String>,
    /// Family name → member schema names, sorted.
    members: BTreeMap<&'static str, Vec<String>>,
    instances: HashMap<String, RustType>,
    in_progress: HashSet<String>,
}

impl<'a> Resolver<'a> {
    /// Indexes every declared schema, failing on identifier collisions.
    pub fn new(spec: &'a OpenApiSpec) -> Result<Self, GenerateError> {
        let mut idents: BTreeMap<String, String> = BTreeMap::new();
        let mut members: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

        for name in spec.components.schemas.keys() {
            let ident = normalize_ident(name);
            if let Some((family, _)) = family_member(&ident) {
                members.entry(family.name).or_default().push(name.clone());
                continue;
            }
            if IMPORTED_NAMES.contains(&ident.as_str()) {
                return Err(GenerateError::ReservedIdentifier {
                    ident,
                    schema: name.clone(),
                });
            }
            if let Some(first) = idents.get(&ident) {
                return Err(GenerateError::DuplicateIdentifier {
                    ident,
                    first: first.clone(),
                    second: name.clone(),
                });
            }
            idents.insert(ident, name.clone());
        }

        for (family, names) in &members {
            if let (Some(existing), Some(member)) = (idents.get(*family), names.first()) {
                return Err(GenerateError::DuplicateIdentifier {
                    ident: (*family).to_string(),
                    first: existing.clone(),
                    second: member.clone(),
                });
            }
        }

        debug!(
            schemas = spec.components.schemas.len(),
            families = members.len(),
            "Indexed schema identifiers."
        );
        Ok(Self {
            spec,
            idents,
            members,
            instances: HashMap::new(),
            in_progress: HashSet::new(),
        })
    }

    /// Schema name declaring `ident`, for non-generic identifiers.
    pub fn ref_for(&self, ident: &str) -> Option<&str> {
        self.idents.get(ident).map(String::as_str)
    }

    pub fn family_members(&self, family: &str) -> &[String] {
        self.members.get(family).map_or(&[], Vec::as_slice)
    }

    pub fn resolve(&mut self, schema: &Schema, context: &str) -> Result<RustType, GenerateError> {
        if let Some(reference) = &schema.ref_path {
            return self.resolve_ref(reference);
        }
        let ty = self.resolve_shape(schema, context)?;
        Ok(if schema.nullable {
            RustType::nullable(ty)
        } else {
            ty
        })
    }

    /// Named type, or generic instantiation, for a schema reference.
    pub fn resolve_ref(&mut self, reference: &str) -> Result<RustType, GenerateError> {
        let spec = self.spec;
        let (name, schema) = spec
            .schema(reference)
            .ok_or_else(|| GenerateError::UnresolvedReference(reference.to_string()))?;
        let ident = normalize_ident(name);
        let Some((family, _)) = family_member(&ident) else {
            return Ok(RustType::Named(ident));
        };

        if let Some(instance) = self.instances.get(name) {
            return Ok(instance.clone());
        }
        if !self.in_progress.insert(name.to_string()) {
            return Err(GenerateError::unsupported(name, "generic instantiation refers to itself"));
        }
        let param = self.member_param_of(name, schema);
        self.in_progress.remove(name);
        let instance = RustType::generic(family.name, param?);
        self.instances.insert(name.to_string(), instance.clone());
        Ok(instance)
    }

    /// Type argument of the family member declared as `name`.
    pub fn member_param(&mut self, name: &str) -> Result<RustType, GenerateError> {
        let spec = self.spec;
        let (name, schema) = spec
            .schema(name)
            .ok_or_else(|| GenerateError::UnresolvedReference(name.to_string()))?;
        self.member_param_of(name, schema)
    }

    fn member_param_of(&mut self, name: &str, schema: &Schema) -> Result<RustType, GenerateError> {
        let ident = normalize_ident(name);
        let (family, suffix) = family_member(&ident)
            .ok_or_else(|| GenerateError::unsupported(name, "not a generic family member"))?;
        match family.source {
            ParamSource::Suffix => self.suffix_param(suffix),
            ParamSource::ResultsElement => {
                let items = schema
                    .properties
                    .get("results")
                    .and_then(|results| results.items.as_deref())
                    .ok_or_else(|| GenerateError::unsupported(name, "search result without a results array"))?;
                self.resolve(items, &format!("{name}.results"))
            }
            ParamSource::DataProperty => {
                let data = schema
                    .properties
                    .get("data")
                    .ok_or_else(|| GenerateError::unsupported(name, "component response without data"))?;
                self.resolve(data, &format!("{name}.data"))
            }
        }
    }

    fn suffix_param(&self, suffix: &str) -> Result<RustType, GenerateError> {
        Ok(match suffix {
            "int32" => RustType::Scalar(ScalarKind::I32),
            "int64" => RustType::Scalar(ScalarKind::I64),
            "uint32" => RustType::Scalar(ScalarKind::U32),
            other => {
                let ident = normalize_ident(other);
                if !self.idents.contains_key(&ident) {
                    return Err(GenerateError::UnresolvedReference(other.to_string()));
                }
                RustType::Named(ident)
            }
        })
    }

    fn resolve_shape(&mut self, schema: &Schema, context: &str) -> Result<RustType, GenerateError> {
        if let Some(key) = &schema.dictionary_key {
            return self.resolve_dictionary(schema, key, context);
        }
        if schema.is_type("array") {
            let items = schema
                .items
                .as_deref()
                .ok_or_else(|| GenerateError::unsupported(context, "array without items"))?;
            // A mapping declared on the array applies to its elements.
            let element = if items.mapped_definition.is_none() && schema.mapped_definition.is_some() {
                let mut items = items.clone();
                items.mapped_definition.clone_from(&schema.mapped_definition);
                self.resolve(&items, context)?
            } else {
                self.resolve(items, context)?
            };
            return Ok(RustType::vec(element));
        }
        if let Some(target) = &schema.mapped_definition {
            return Ok(RustType::HashRef(self.declared_ident(&target.ref_path)?));
        }
        if let Some(reference) = schema.single_all_of_ref() {
            return self.resolve_ref(reference);
        }
        if schema.is_type("object") {
            if schema.properties.is_empty() {
                return Ok(RustType::Json);
            }
            return Err(GenerateError::unsupported(context, "inline object with properties"));
        }
        if let Some(reference) = &schema.enum_reference {
            let ident = self.declared_ident(&reference.ref_path)?;
            return Ok(if schema.enum_is_bitmask {
                RustType::Bitmask(ident)
            } else {
                RustType::Named(ident)
            });
        }
        scalar(schema, context)
    }

    fn resolve_dictionary(
        &mut self,
        schema: &Schema,
        key: &Schema,
        context: &str,
    ) -> Result<RustType, GenerateError> {
        let value = schema
            .additional_schema()
            .ok_or_else(|| GenerateError::unsupported(context, "dictionary without a value schema"))?;

        let key_ty = match &key.enum_reference {
            Some(reference) => {
                let name = reference
                    .ref_path
                    .strip_prefix(SCHEMA_REF_PREFIX)
                    .unwrap_or(&reference.ref_path);
                if STRING_KEYED_ENUMS.contains(&name) {
                    RustType::Scalar(ScalarKind::String)
                } else {
                    RustType::Named(self.declared_ident(&reference.ref_path)?)
                }
            }
            None => {
                // A mapping on the dictionary describes its keys.
                let mut key = key.clone();
                if key.mapped_definition.is_none() {
                    key.mapped_definition.clone_from(&schema.mapped_definition);
                }
                self.resolve(&key, &format!("{context} key"))?
            }
        };
        let value_ty = self.resolve(value, &format!("{context} value"))?;
        Ok(RustType::map(key_ty, value_ty))
    }

    /// Identifier of a referenced schema that must be declared.
    fn declared_ident(&self, reference: &str) -> Result<String, GenerateError> {
        self.spec
            .schema(reference)
            .map(|(name, _)| normalize_ident(name))
            .ok_or_else(|| GenerateError::UnresolvedReference(reference.to_string()))
    }
}

fn scalar(schema: &Schema, context: &str) -> Result<RustType, GenerateError> {
    let format = schema.format.as_deref();
    let kind = match (schema.schema_type.as_deref(), format) {
        (Some("string"), None) => ScalarKind::String,
        (Some("string"), Some("date-time")) => return Ok(RustType::Timestamp),
        (Some("boolean"), _) => ScalarKind::Bool,
        (Some("integer" | "number"), Some("byte")) => ScalarKind::U8,
        (Some("integer" | "number"), Some("int16")) => ScalarKind::I16,
        (Some("integer" | "number"), Some("int32")) => ScalarKind::I32,
        (Some("integer" | "number"), Some("uint32")) => ScalarKind::U32,
        (Some("integer" | "number"), Some("int64")) => ScalarKind::I64,
        (Some("integer" | "number"), Some("float")) => ScalarKind::F32,
        (Some("integer" | "number"), Some("double")) => ScalarKind::F64,
        (Some("integer"), None) if schema.is_enum() => ScalarKind::I32,
        (ty, format) => {
            return Err(GenerateError::unsupported(
                context,
                format!("type {ty:?} with format {format:?}"),
            ));
        }
    };
    Ok(RustType::Scalar(kind))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn spec(schemas: &str) -> OpenApiSpec {
        OpenApiSpec::from_json(&format!(r#"{{"paths":{{}},"components":{{"schemas":{schemas}}}}}"#)).unwrap()
    }

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_family_member() {
        let (family, suffix) = family_member("ItemComponentSetOfint64").unwrap();
        assert_eq!((family.name, suffix), ("ItemComponentSet", "int64"));
        let (family, _) = family_member("BaseItemComponentSetOfuint32").unwrap();
        assert_eq!(family.name, "BaseItemComponentSet");
        let (family, _) = family_member("DictionaryComponentResponseOfint64AndDestinyItemComponent").unwrap();
        assert_eq!(family.name, "ComponentResponse");
        assert!(family_member("ItemComponentSet").is_none());
        assert!(family_member("ProfileResponse").is_none());
    }

    #[test]
    fn test_scalars() {
        let spec = spec("{}");
        let mut resolver = Resolver::new(&spec).unwrap();
        let cases = [
            (r#"{"type":"string"}"#, RustType::Scalar(ScalarKind::String)),
            (r#"{"type":"string","format":"date-time"}"#, RustType::Timestamp),
            (r#"{"type":"boolean"}"#, RustType::Scalar(ScalarKind::Bool)),
            (r#"{"type":"integer","format":"int64"}"#, RustType::Scalar(ScalarKind::I64)),
            (r#"{"type":"integer","format":"byte"}"#, RustType::Scalar(ScalarKind::U8)),
            (r#"{"type":"number","format":"double"}"#, RustType::Scalar(ScalarKind::F64)),
            (
                r#"{"type":"integer","format":"int32","nullable":true}"#,
                RustType::nullable(RustType::Scalar(ScalarKind::I32)),
            ),
            (r#"{"type":"object"}"#, RustType::Json),
        ];
        for (json, expected) in cases {
            assert_eq!(resolver.resolve(&schema(json), "t").unwrap(), expected, "{json}");
        }
    }

    #[test]
    fn test_unsupported_shapes_fail() {
        let spec = spec("{}");
        let mut resolver = Resolver::new(&spec).unwrap();
        for json in [
            r#"{"type":"string","format":"uuid"}"#,
            r#"{"type":"integer"}"#,
            r#"{"type":"object","properties":{"a":{"type":"string"}}}"#,
            r#"{"type":"array"}"#,
            r#"{}"#,
        ] {
            let err = resolver.resolve(&schema(json), "t").unwrap_err();
            assert!(matches!(err, GenerateError::UnsupportedSchema { .. }), "{json}");
        }
    }

    #[test]
    fn test_mapped_definition_and_dictionary_keys() {
        let spec = spec(
            r#"{
                "Destiny.Definitions.DestinyInventoryItemDefinition": {"type":"object","properties":{"hash":{"type":"integer","format":"uint32"}}},
                "Destiny.DestinyGender": {"type":"integer","format":"int32","enum":["0"]},
                "Destiny.DestinyClass": {"type":"integer","format":"int32","enum":["0"]}
            }"#,
        );
        let mut resolver = Resolver::new(&spec).unwrap();

        let hash = schema(
            r##"{"type":"integer","format":"uint32","x-mapped-definition":{"$ref":"#/components/schemas/Destiny.Definitions.DestinyInventoryItemDefinition"}}"##,
        );
        assert_eq!(
            resolver.resolve(&hash, "t").unwrap(),
            RustType::HashRef("InventoryItemDefinition".into())
        );

        let hash_keyed = schema(
            r##"{"type":"object","additionalProperties":{"type":"string"},
                "x-dictionary-key":{"type":"integer","format":"uint32"},
                "x-mapped-definition":{"$ref":"#/components/schemas/Destiny.Definitions.DestinyInventoryItemDefinition"}}"##,
        );
        assert_eq!(
            resolver.resolve(&hash_keyed, "t").unwrap(),
            RustType::map(
                RustType::HashRef("InventoryItemDefinition".into()),
                RustType::Scalar(ScalarKind::String)
            )
        );

        let gender_keyed = schema(
            r##"{"type":"object","additionalProperties":{"type":"boolean"},
                "x-dictionary-key":{"type":"integer","x-enum-reference":{"$ref":"#/components/schemas/Destiny.DestinyGender"}}}"##,
        );
        assert_eq!(
            resolver.resolve(&gender_keyed, "t").unwrap(),
            RustType::map(RustType::Scalar(ScalarKind::String), RustType::Scalar(ScalarKind::Bool))
        );

        let class_keyed = schema(
            r##"{"type":"object","additionalProperties":{"type":"boolean"},
                "x-dictionary-key":{"type":"integer","x-enum-reference":{"$ref":"#/components/schemas/Destiny.DestinyClass"}}}"##,
        );
        assert_eq!(
            resolver.resolve(&class_keyed, "t").unwrap(),
            RustType::map(RustType::Named("Class".into()), RustType::Scalar(ScalarKind::Bool))
        );
    }

    #[test]
    fn test_bitmask_and_array_mapping() {
        let spec = spec(
            r#"{
                "Destiny.DestinyGameVersions": {"type":"integer","format":"int32","enum":["0"]},
                "Destiny.Definitions.DestinyActivityDefinition": {"type":"object","properties":{"hash":{"type":"integer","format":"uint32"}}}
            }"#,
        );
        let mut resolver = Resolver::new(&spec).unwrap();
        let flags = schema(
            r##"{"type":"integer","format":"int32","x-enum-is-bitmask":true,"x-enum-reference":{"$ref":"#/components/schemas/Destiny.DestinyGameVersions"}}"##,
        );
        assert_eq!(
            resolver.resolve(&flags, "t").unwrap(),
            RustType::Bitmask("GameVersions".into())
        );

        let hashes = schema(
            r##"{"type":"array","items":{"type":"integer","format":"uint32"},
                "x-mapped-definition":{"$ref":"#/components/schemas/Destiny.Definitions.DestinyActivityDefinition"}}"##,
        );
        assert_eq!(
            resolver.resolve(&hashes, "t").unwrap(),
            RustType::vec(RustType::HashRef("ActivityDefinition".into()))
        );
    }

    #[test]
    fn test_generic_instantiation() {
        let spec = spec(
            r##"{
                "Destiny.Entities.Items.DestinyItemInstanceComponent": {"type":"object","properties":{"damage":{"type":"integer","format":"int32"}}},
                "DictionaryComponentResponseOfint64AndDestinyItemInstanceComponent": {"type":"object","properties":{
                    "data":{"type":"object","additionalProperties":{"$ref":"#/components/schemas/Destiny.Entities.Items.DestinyItemInstanceComponent"},"x-dictionary-key":{"type":"integer","format":"int64"}}
                }},
                "SearchResultOfGroupMember": {"type":"object","properties":{"results":{"type":"array","items":{"$ref":"#/components/schemas/GroupsV2.GroupMember"}}}},
                "GroupsV2.GroupMember": {"type":"object","properties":{"isOnline":{"type":"boolean"}}},
                "DestinyItemComponentSetOfint64": {"type":"object","properties":{}}
            }"##,
        );
        let mut resolver = Resolver::new(&spec).unwrap();
        let components = resolver
            .resolve_ref("#/components/schemas/DictionaryComponentResponseOfint64AndDestinyItemInstanceComponent")
            .unwrap();
        assert_eq!(
            components,
            RustType::generic(
                "ComponentResponse",
                RustType::map(RustType::Scalar(ScalarKind::I64), RustType::Named("ItemInstanceComponent".into()))
            )
        );
        assert_eq!(
            resolver.resolve_ref("#/components/schemas/SearchResultOfGroupMember").unwrap(),
            RustType::generic("SearchResult", RustType::Named("GroupMember".into()))
        );
        assert_eq!(
            resolver.resolve_ref("#/components/schemas/DestinyItemComponentSetOfint64").unwrap(),
            RustType::generic("ItemComponentSet", RustType::Scalar(ScalarKind::I64))
        );
        assert_eq!(resolver.family_members("ComponentResponse").len(), 1);
    }

    #[test]
    fn test_unresolved_reference() {
        let spec = spec("{}");
        let mut resolver = Resolver::new(&spec).unwrap();
        let err = resolver.resolve_ref("#/components/schemas/Missing").unwrap_err();
        assert!(matches!(err, GenerateError::UnresolvedReference(_)));
    }

    #[test]
    fn test_duplicate_identifiers() {
        let dup = spec(
            r#"{"Destiny.Foo": {"type":"object"}, "Destiny2.Foo": {"type":"object"}}"#,
        );
        assert!(matches!(
            Resolver::new(&dup),
            Err(GenerateError::DuplicateIdentifier { ref ident, .. }) if ident == "Foo"
        ));

        let family_ok = spec(
            r#"{"DestinyItemComponentSetOfint64": {"type":"object"}, "ItemComponentSetOfint64": {"type":"object"}}"#,
        );
        assert!(Resolver::new(&family_ok).is_ok());

        let family_clash = spec(
            r#"{"ItemComponentSetOfint64": {"type":"object"}, "Destiny.ItemComponentSet": {"type":"object"}}"#,
        );
        assert!(matches!(
            Resolver::new(&family_clash),
            Err(GenerateError::DuplicateIdentifier { ref ident, .. }) if ident == "ItemComponentSet"
        ));
    }

    #[test]
    fn test_identifier_shadowing_runtime_import() {
        let shadow = spec(r#"{"Destiny.Definitions.DestinyDefinition": {"type":"object"}}"#);
        assert!(matches!(
            Resolver::new(&shadow),
            Err(GenerateError::ReservedIdentifier { ref ident, ref schema })
                if ident == "Definition" && schema == "Destiny.Definitions.DestinyDefinition"
        ));

        let distinct = spec(r#"{"Destiny.Definitions.DestinyItemDefinition": {"type":"object"}}"#);
        assert!(Resolver::new(&distinct).is_ok());
    }
}
