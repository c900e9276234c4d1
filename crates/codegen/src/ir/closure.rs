//! Builds the declarations reachable from the wanted set.

use std::collections::HashSet;

use tracing::{debug, warn};

use super::context::GenerationContext;
use super::emit::enum_repr;
use super::resolve::{GenericFamily, generic_family};
use super::types::{EnumVariant, Field, RustType, ScalarKind, TypeDef, TypeDefKind};
use super::utils::{normalize_ident, sanitize_rust_ident, to_screaming_snake};
use crate::error::GenerateError;
use crate::spec::Schema;

/// Namespace segment marking records served from definition tables.
const DEFINITIONS_NAMESPACE: &str = "Definitions";

/// Drains the wanted queue into type declarations, sorted by schema name.
pub fn build_closure(ctx: &mut GenerationContext<'_>) -> Result<Vec<TypeDef>, GenerateError> {
    let mut defs = Vec::new();
    while let Some(ident) = ctx.next_wanted() {
        let def = if let Some(family) = generic_family(&ident) {
            family_definition(ctx, family)?
        } else {
            let ref_name = ctx
                .resolver()
                .ref_for(&ident)
                .ok_or_else(|| GenerateError::UnresolvedReference(ident.clone()))?
                .to_string();
            schema_definition(ctx, &ref_name)?
        };
        defs.push(def);
    }
    defs.sort_by(|a, b| a.ref_name.cmp(&b.ref_name));
    debug!(types = defs.len(), "Built type closure.");
    Ok(defs)
}

fn schema_definition(ctx: &mut GenerationContext<'_>, ref_name: &str) -> Result<TypeDef, GenerateError> {
    let schema = ctx
        .spec()
        .components
        .schemas
        .get(ref_name)
        .ok_or_else(|| GenerateError::UnresolvedReference(ref_name.to_string()))?;

    let mut definition_table = None;
    let kind = if schema.is_enum() {
        enum_kind(schema, ref_name)?
    } else if schema.dictionary_key.is_some() {
        TypeDefKind::Alias(ctx.resolve_wanted(schema, ref_name)?)
    } else if schema.is_type("array") {
        TypeDefKind::Alias(ctx.resolve_wanted(schema, ref_name)?)
    } else if !schema.properties.is_empty() {
        definition_table = table_name(ref_name);
        TypeDefKind::Struct {
            generic: false,
            fields: fields(ctx, ref_name, schema, None)?,
        }
    } else if schema.is_type("object") {
        TypeDefKind::OpenMap
    } else {
        return Err(GenerateError::unsupported(
            ref_name,
            format!("cannot declare a type for {:?}", schema.schema_type),
        ));
    };

    Ok(TypeDef {
        ident: normalize_ident(ref_name),
        ref_name: ref_name.to_string(),
        description: schema.description.clone(),
        kind,
        definition_table,
    })
}

/// One `Family<T>` declaration, shaped after the first member schema.
fn family_definition(
    ctx: &mut GenerationContext<'_>,
    family: &'static GenericFamily,
) -> Result<TypeDef, GenerateError> {
    let template = ctx
        .resolver()
        .family_members(family.name)
        .first()
        .cloned()
        .ok_or_else(|| GenerateError::UnresolvedReference(family.name.to_string()))?;
    let schema = ctx
        .spec()
        .components
        .schemas
        .get(&template)
        .ok_or_else(|| GenerateError::UnresolvedReference(template.clone()))?;
    if schema.properties.is_empty() {
        return Err(GenerateError::unsupported(&template, "generic family member without properties"));
    }

    let param = ctx.resolver().member_param(&template)?;
    let fields = fields(ctx, &template, schema, Some(&param))?;
    debug!(family = family.name, template = %template, "Declared generic family.");

    Ok(TypeDef {
        ident: family.name.to_string(),
        ref_name: template,
        description: schema.description.clone(),
        kind: TypeDefKind::Struct { generic: true, fields },
        definition_table: None,
    })
}

/// Struct fields, with `param` replaced by the type variable when given.
fn fields(
    ctx: &mut GenerationContext<'_>,
    ref_name: &str,
    schema: &Schema,
    param: Option<&RustType>,
) -> Result<Vec<Field>, GenerateError> {
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(schema.properties.len());
    for (wire_name, property) in &schema.properties {
        let context = format!("{ref_name}.{wire_name}");
        let mut ty = ctx.resolver().resolve(property, &context)?;
        if let Some(param) = param {
            ty = ty.substitute(param, &RustType::Param);
        }
        ctx.require(&ty);

        let mut rust_name = sanitize_rust_ident(wire_name);
        while !seen.insert(rust_name.clone()) {
            rust_name.push('_');
        }
        fields.push(Field {
            wire_name: wire_name.clone(),
            rust_name,
            ty,
            description: property.description.clone(),
        });
    }
    Ok(fields)
}

fn enum_kind(schema: &Schema, ref_name: &str) -> Result<TypeDefKind, GenerateError> {
    let repr = match schema.format.as_deref() {
        None | Some("int32") => ScalarKind::I32,
        Some("byte") => ScalarKind::U8,
        Some("int16") => ScalarKind::I16,
        Some("uint32") => ScalarKind::U32,
        Some("int64") => ScalarKind::I64,
        Some(other) => {
            return Err(GenerateError::unsupported(ref_name, format!("enum with format {other}")));
        }
    };

    let mut names = HashSet::new();
    let mut variants = Vec::new();
    for info in schema.enum_value_info.iter().flatten() {
        let value = info.numeric_value.literal().ok_or_else(|| {
            GenerateError::unsupported(
                format!("{ref_name}.{}", info.identifier),
                "enum value is not an integer",
            )
        })?;
        if !fits_repr(&value, repr) {
            return Err(GenerateError::unsupported(
                format!("{ref_name}.{}", info.identifier),
                format!("enum value {value} out of range for {}", enum_repr(repr)),
            ));
        }
        let const_name = to_screaming_snake(&info.identifier);
        if !names.insert(const_name.clone()) {
            warn!(schema = %ref_name, identifier = %info.identifier, "Skipping duplicate enum identifier.");
            continue;
        }
        variants.push(EnumVariant {
            identifier: info.identifier.clone(),
            const_name,
            value,
            description: info.description.clone(),
        });
    }
    Ok(TypeDefKind::Enum { repr, variants })
}

/// Whether an integer literal fits the primitive backing an enum newtype.
fn fits_repr(literal: &str, repr: ScalarKind) -> bool {
    match repr {
        ScalarKind::U8 => literal.parse::<u8>().is_ok(),
        ScalarKind::I16 => literal.parse::<i16>().is_ok(),
        ScalarKind::U32 => literal.parse::<u32>().is_ok(),
        ScalarKind::I64 => literal.parse::<i64>().is_ok(),
        _ => literal.parse::<i32>().is_ok(),
    }
}

fn table_name(ref_name: &str) -> Option<String> {
    let segments: Vec<&str> = ref_name.split('.').collect();
    let (last, namespace) = segments.split_last()?;
    namespace
        .contains(&DEFINITIONS_NAMESPACE)
        .then(|| (*last).to_string())
}
