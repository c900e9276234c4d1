//! Path items → [`OperationDescriptor`]s.

use std::collections::HashSet;

use tracing::debug;

use super::api::{BodyDescriptor, HttpMethod, OperationDescriptor, ParamDescriptor, ParamLocation};
use super::context::GenerationContext;
use super::types::RustType;
use super::utils::sanitize_rust_ident;
use crate::error::GenerateError;
use crate::spec::{Operation, Parameter, PathItem, Schema};

const JSON_MEDIA_TYPE: &str = "application/json";
/// Property of the response envelope that carries the payload.
const RESPONSE_PROPERTY: &str = "Response";

/// Normalizes every path, marking the types operations use as wanted.
pub fn normalize_operations(ctx: &mut GenerationContext<'_>) -> Result<Vec<OperationDescriptor>, GenerateError> {
    let spec = ctx.spec();
    let mut names = HashSet::new();
    let mut functions = HashSet::new();
    let mut operations = Vec::with_capacity(spec.paths.len());

    for (path, item) in &spec.paths {
        let (method, operation) = match (&item.get, &item.post) {
            (Some(get), _) => (HttpMethod::Get, get),
            (None, Some(post)) => (HttpMethod::Post, post),
            (None, None) => return Err(GenerateError::UnsupportedVerb(path.clone())),
        };
        let descriptor = normalize_operation(ctx, path, item, method, operation)?;
        if !names.insert(descriptor.name.clone()) {
            return Err(GenerateError::DuplicateOperation(descriptor.name));
        }
        let function = descriptor.function_name();
        if !functions.insert(function.clone()) {
            return Err(GenerateError::DuplicateOperation(function));
        }
        operations.push(descriptor);
    }

    debug!(operations = operations.len(), "Normalized operations.");
    Ok(operations)
}

fn normalize_operation(
    ctx: &mut GenerationContext<'_>,
    path: &str,
    item: &PathItem,
    method: HttpMethod,
    operation: &Operation,
) -> Result<OperationDescriptor, GenerateError> {
    let name = item
        .summary
        .as_deref()
        .or(operation.summary.as_deref())
        .or(operation.operation_id.as_deref())
        .map(|name| name.replace('.', ""))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| GenerateError::MissingOperationName(path.to_string()))?;
    let operation_id = operation.operation_id.clone().unwrap_or_else(|| name.clone());

    let mut params = Vec::new();
    for param in merged_parameters(item, operation) {
        params.push(parameter(ctx, &name, param)?);
    }

    let body = match &operation.request_body {
        None => None,
        Some(body) => {
            let schema = body
                .content
                .get(JSON_MEDIA_TYPE)
                .and_then(|media| media.schema.as_ref())
                .ok_or_else(|| GenerateError::unsupported(&name, "request body without a JSON schema"))?;
            Some(BodyDescriptor {
                ty: ctx.resolve_wanted(schema, &format!("{name} body"))?,
                required: body.required,
            })
        }
    };

    let response = response_type(ctx, &name, operation)?;

    let scopes = operation
        .security
        .iter()
        .flatten()
        .flat_map(|requirement| requirement.iter())
        .map(|(scheme, scopes)| (scheme.clone(), scopes.clone()))
        .collect();

    Ok(OperationDescriptor {
        name,
        operation_id,
        method,
        path: path.to_string(),
        description: operation.description.clone().or_else(|| item.description.clone()),
        deprecated: operation.deprecated,
        scopes,
        params,
        body,
        response,
    })
}

/// Path-level parameters followed by the operation's own; the operation
/// wins on a name and location clash.
fn merged_parameters<'s>(item: &'s PathItem, operation: &'s Operation) -> Vec<&'s Parameter> {
    let overridden = |shared: &&Parameter| {
        operation
            .parameters
            .iter()
            .any(|own| own.name == shared.name && own.location == shared.location)
    };
    item.parameters
        .iter()
        .filter(|shared| !overridden(shared))
        .chain(&operation.parameters)
        .collect()
}

fn parameter(
    ctx: &mut GenerationContext<'_>,
    operation: &str,
    param: &Parameter,
) -> Result<ParamDescriptor, GenerateError> {
    let location = match param.location.as_str() {
        "path" => ParamLocation::Path,
        "query" => ParamLocation::Query,
        other => {
            return Err(GenerateError::UnsupportedParameterLocation {
                operation: operation.to_string(),
                name: param.name.clone(),
                location: other.to_string(),
            });
        }
    };
    let context = format!("{operation}.{}", param.name);
    let schema = param
        .schema
        .as_ref()
        .ok_or_else(|| GenerateError::unsupported(&context, "parameter without a schema"))?;
    let ty = ctx.resolve_wanted(schema, &context)?;

    Ok(ParamDescriptor {
        name: param.name.clone(),
        field: sanitize_rust_ident(&param.name),
        location,
        is_array: matches!(ty, RustType::Vec(_)),
        ty,
        required: param.required || location == ParamLocation::Path,
        description: param.description.clone(),
    })
}

/// Type of the `Response` property of the 200 envelope.
fn response_type(
    ctx: &mut GenerationContext<'_>,
    name: &str,
    operation: &Operation,
) -> Result<RustType, GenerateError> {
    let spec = ctx.spec();
    let missing = || GenerateError::MissingResponse(name.to_string());

    let response = operation
        .responses
        .get("200")
        .and_then(|response| spec.response(response))
        .ok_or_else(missing)?;
    let envelope: &Schema = response
        .content
        .get(JSON_MEDIA_TYPE)
        .and_then(|media| media.schema.as_ref())
        .ok_or_else(missing)?;
    let envelope = match &envelope.ref_path {
        Some(reference) => spec.schema(reference).map(|(_, schema)| schema).ok_or_else(missing)?,
        None => envelope,
    };
    let payload = envelope.properties.get(RESPONSE_PROPERTY).ok_or_else(missing)?;
    ctx.resolve_wanted(payload, &format!("{name} response"))
}
