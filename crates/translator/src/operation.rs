//! Operation translation

use crate::naming::strip_version_suffix;
use crate::property_mapper::{PropertyMapper, PropertySink};
use crate::shape::{translate_shape, ShapeFlavor};
use crate::RawDescription;
use serde_json::Value;
use svcmodel_common::{Location, Operation, Result, Shape};

/// Per-operation translation settings
#[derive(Debug, Clone, Copy)]
pub struct OperationOptions<'a> {
    /// Format prefix for timestamp shapes
    pub timestamp_format: &'a str,
    /// Populate the error list
    pub errors: bool,
}

/// Translate one raw operation description
///
/// `default_name` is used when the raw description has no `name` field
/// (usually the operation's key in the raw `operations` mapping).
pub fn translate_operation(
    raw: &RawDescription,
    default_name: &str,
    options: OperationOptions<'_>,
) -> Result<Operation> {
    let mut builder = OperationBuilder {
        operation: Operation::new(strip_version_suffix(default_name)),
        options,
    };
    operation_rules().apply(raw, &mut builder)?;

    let mut operation = builder.operation;
    rewrite_uri_placeholders(&mut operation);
    Ok(operation)
}

/// Point URI placeholders at normalized member names
///
/// For each `uri` input member, `{WireName}` (or greedy `{WireName+}`) in
/// the path becomes `{member_name}` and the member's serialized name is
/// cleared. A member whose placeholder is missing is left untouched.
pub fn rewrite_uri_placeholders(operation: &mut Operation) {
    let Some(input) = operation.input.as_mut() else {
        return;
    };

    for (name, member) in input.members.iter_mut() {
        if member.location != Some(Location::Uri) {
            continue;
        }
        let Some(wire) = member.serialized_name.as_deref() else {
            continue;
        };

        let exact = format!("{{{}}}", wire);
        let greedy = format!("{{{}+}}", wire);
        let path = &mut operation.http_path;
        if path.contains(&exact) {
            *path = path.replace(&exact, &format!("{{{}}}", name));
        } else if path.contains(&greedy) {
            *path = path.replace(&greedy, &format!("{{{}+}}", name));
        } else {
            tracing::warn!(
                operation = %operation.name,
                member = %name,
                placeholder = %exact,
                "uri member has no placeholder in http path"
            );
            continue;
        }
        member.serialized_name = None;
    }
}

struct OperationBuilder<'a> {
    operation: Operation,
    options: OperationOptions<'a>,
}

impl OperationBuilder<'_> {
    fn shape(&self, value: &Value, kind: &str, flavor: ShapeFlavor) -> Result<Option<Shape>> {
        let Value::Object(raw) = value else {
            return Ok(None);
        };
        let mut raw = raw.clone();
        raw.insert("type".to_string(), Value::String(kind.to_string()));
        translate_shape(&raw, self.options.timestamp_format, flavor).map(Some)
    }
}

impl PropertySink for OperationBuilder<'_> {
    fn set_property(&mut self, name: &str, value: &Value) {
        match (name, value) {
            ("documentation", Value::String(s)) => {
                self.operation.documentation = Some(s.clone())
            }
            _ => {
                self.operation
                    .metadata
                    .insert(name.to_string(), value.clone());
            }
        }
    }
}

fn operation_rules<'a>() -> PropertyMapper<OperationBuilder<'a>> {
    PropertyMapper::new()
        .custom("name", set_name)
        .custom("http", set_http)
        .custom("input", set_input)
        .custom("output", set_output)
        .custom("errors", set_errors)
        .property("documentation")
        .ignore(&["documentation_url", "alias"])
}

fn set_name(builder: &mut OperationBuilder<'_>, value: &Value) -> Result<()> {
    if let Some(name) = value.as_str() {
        builder.operation.name = strip_version_suffix(name).to_string();
    }
    Ok(())
}

fn set_http(builder: &mut OperationBuilder<'_>, value: &Value) -> Result<()> {
    if let Some(method) = value.get("method").and_then(Value::as_str) {
        builder.operation.http_method = method.to_string();
    }
    if let Some(uri) = value.get("uri").and_then(Value::as_str) {
        builder.operation.http_path = uri.to_string();
    }
    Ok(())
}

fn set_input(builder: &mut OperationBuilder<'_>, value: &Value) -> Result<()> {
    builder.operation.input = builder.shape(value, "input", ShapeFlavor::Input)?;
    Ok(())
}

fn set_output(builder: &mut OperationBuilder<'_>, value: &Value) -> Result<()> {
    builder.operation.output = builder.shape(value, "output", ShapeFlavor::Output)?;
    Ok(())
}

fn set_errors(builder: &mut OperationBuilder<'_>, value: &Value) -> Result<()> {
    if !builder.options.errors {
        return Ok(());
    }
    let Value::Array(raw_errors) = value else {
        return Ok(());
    };

    let mut errors = Vec::with_capacity(raw_errors.len());
    for raw in raw_errors {
        if let Value::Object(raw) = raw {
            errors.push(translate_shape(
                raw,
                builder.options.timestamp_format,
                ShapeFlavor::Output,
            )?);
        }
    }
    builder.operation.errors = if errors.is_empty() { None } else { Some(errors) };
    Ok(())
}
