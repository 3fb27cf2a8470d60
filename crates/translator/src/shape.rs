//! Shape translation
//!
//! Converts a raw type description into a normalized [`Shape`], recursing
//! into structure members, list/map value shapes and map key shapes.

use crate::naming::underscore;
use crate::property_mapper::{PropertyMapper, PropertySink};
use crate::RawDescription;
use serde_json::Value;
use svcmodel_common::{metadata_keys, Location, Result, Shape, ShapeType};

/// Rule set selector for input and output shape trees
///
/// The two differ in one rule: only input shapes keep `required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFlavor {
    Input,
    Output,
}

/// Raw fields consumed by parameter validation, not by the model
const VALIDATION_ONLY: &[&str] = &[
    "pattern",
    "min_length",
    "max_length",
    "box",
    "streaming",
    "member_order",
];

/// Translate one raw shape description
///
/// `timestamp_format` prefixes every timestamp type in the tree.
pub fn translate_shape(
    raw: &RawDescription,
    timestamp_format: &str,
    flavor: ShapeFlavor,
) -> Result<Shape> {
    let mut builder = ShapeBuilder {
        shape: Shape::default(),
        raw_type: None,
        flattened: false,
        timestamp_format,
        flavor,
    };
    shape_rules().apply(raw, &mut builder)?;
    Ok(builder.finish())
}

/// Move a member's `payload` metadata flag onto the structure
///
/// The first flagged member becomes the payload; every flag is cleared.
pub fn promote_payload(shape: &mut Shape) {
    for (name, member) in shape.members.iter_mut() {
        let Some(flag) = member.metadata.shift_remove(metadata_keys::PAYLOAD) else {
            continue;
        };
        if flag != Value::Bool(true) {
            continue;
        }
        if shape.payload.is_none() {
            shape.payload = Some(name.clone());
        } else {
            tracing::warn!(
                payload = ?shape.payload,
                member = %name,
                "structure has more than one payload member; keeping the first"
            );
        }
    }
}

struct ShapeBuilder<'a> {
    shape: Shape,
    raw_type: Option<String>,
    flattened: bool,
    timestamp_format: &'a str,
    flavor: ShapeFlavor,
}

impl ShapeBuilder<'_> {
    fn child(&self, raw: &RawDescription) -> Result<Shape> {
        translate_shape(raw, self.timestamp_format, self.flavor)
    }

    fn finish(mut self) -> Shape {
        let raw_type = self.raw_type.as_deref().unwrap_or("structure");
        self.shape.shape_type = ShapeType::from_raw(raw_type, self.timestamp_format, self.flattened);
        promote_payload(&mut self.shape);
        self.shape
    }
}

impl PropertySink for ShapeBuilder<'_> {
    fn set_property(&mut self, name: &str, value: &Value) {
        match (name, value) {
            ("serialized_name", Value::String(s)) => self.shape.serialized_name = Some(s.clone()),
            ("documentation", Value::String(s)) => self.shape.documentation = Some(s.clone()),
            _ => {
                self.shape.metadata.insert(name.to_string(), value.clone());
            }
        }
    }
}

fn shape_rules<'a>() -> PropertyMapper<ShapeBuilder<'a>> {
    PropertyMapper::new()
        .custom("type", set_type)
        .custom("flattened", set_flattened)
        .custom("xmlnamespace", set_xmlnamespace)
        .custom("members", set_members)
        .custom("keys", set_keys)
        .custom("location", set_location)
        .custom("required", set_required)
        .custom("enum", set_enum)
        .property("serialized_name")
        .rename("location_name", "serialized_name")
        .rename("xmlname", "serialized_name")
        .property("documentation")
        .property(metadata_keys::PAYLOAD)
        .property(metadata_keys::XMLATTRIBUTE)
        .property(metadata_keys::WRAPPER)
        .ignore(VALIDATION_ONLY)
}

fn set_type(builder: &mut ShapeBuilder<'_>, value: &Value) -> Result<()> {
    match value.as_str() {
        Some(name) => builder.raw_type = Some(name.to_string()),
        None => tracing::warn!(%value, "ignoring non-string shape type"),
    }
    Ok(())
}

fn set_flattened(builder: &mut ShapeBuilder<'_>, value: &Value) -> Result<()> {
    builder.flattened = value.as_bool() == Some(true);
    Ok(())
}

fn set_xmlnamespace(builder: &mut ShapeBuilder<'_>, value: &Value) -> Result<()> {
    let metadata = &mut builder.shape.metadata;
    match value {
        Value::Object(ns) => {
            if let Some(uri) = ns.get("uri") {
                metadata.insert(metadata_keys::XMLNS_URI.to_string(), uri.clone());
            }
            if let Some(prefix) = ns.get("prefix") {
                metadata.insert(metadata_keys::XMLNS_PREFIX.to_string(), prefix.clone());
            }
        }
        Value::String(_) => {
            metadata.insert(metadata_keys::XMLNS_URI.to_string(), value.clone());
        }
        _ => {}
    }
    Ok(())
}

fn set_members(builder: &mut ShapeBuilder<'_>, value: &Value) -> Result<()> {
    let Value::Object(members) = value else {
        tracing::warn!(%value, "ignoring members that are not a mapping");
        return Ok(());
    };

    // A string `type` means a single homogeneous child (list/map value)
    if members.get("type").is_some_and(Value::is_string) {
        builder.shape.member = Some(Box::new(builder.child(members)?));
        return Ok(());
    }

    for (raw_name, raw_member) in members {
        let Value::Object(raw_member) = raw_member else {
            tracing::warn!(member = %raw_name, "skipping member that is not a mapping");
            continue;
        };
        let key = underscore(raw_name);
        if key.is_empty() {
            tracing::warn!(member = %raw_name, "skipping member whose name normalizes to nothing");
            continue;
        }
        let mut member = builder.child(raw_member)?;
        if member.serialized_name.is_none() {
            member.serialized_name = Some(raw_name.clone());
        }
        if builder.shape.members.insert(key.clone(), member).is_some() {
            tracing::warn!(
                member = %raw_name,
                key = %key,
                "duplicate member name; later definition wins"
            );
        }
    }
    Ok(())
}

fn set_keys(builder: &mut ShapeBuilder<'_>, value: &Value) -> Result<()> {
    if let Value::Object(keys) = value {
        builder.shape.keys = Some(Box::new(builder.child(keys)?));
    }
    Ok(())
}

fn set_location(builder: &mut ShapeBuilder<'_>, value: &Value) -> Result<()> {
    match value.as_str().and_then(Location::parse) {
        Some(location) => builder.shape.location = Some(location),
        None => {
            tracing::warn!(%value, "unrecognized member location");
            builder
                .shape
                .metadata
                .insert(metadata_keys::LOCATION.to_string(), value.clone());
        }
    }
    Ok(())
}

fn set_required(builder: &mut ShapeBuilder<'_>, value: &Value) -> Result<()> {
    if builder.flavor == ShapeFlavor::Input {
        builder.shape.required = value.as_bool() == Some(true);
    }
    Ok(())
}

fn set_enum(builder: &mut ShapeBuilder<'_>, value: &Value) -> Result<()> {
    if let Value::Array(values) = value {
        builder.shape.enum_values = Some(
            values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use svcmodel_common::BaseType;

    fn raw(value: Value) -> RawDescription {
        match value {
            Value::Object(map) => map,
            _ => panic!("fixture must be an object"),
        }
    }

    fn translate(value: Value, flavor: ShapeFlavor) -> Shape {
        translate_shape(&raw(value), "unix", flavor).unwrap()
    }

    #[test]
    fn test_type_aliases() {
        let shape = translate(json!({ "type": "long" }), ShapeFlavor::Input);
        assert_eq!(shape.shape_type.base, BaseType::Integer);

        let shape = translate(json!({ "type": "double" }), ShapeFlavor::Input);
        assert_eq!(shape.shape_type.to_string(), "float");
    }

    #[test]
    fn test_flattened_timestamp() {
        let shape = translate(
            json!({ "flattened": true, "type": "timestamp" }),
            ShapeFlavor::Output,
        );
        assert_eq!(shape.shape_type.to_string(), "flat_unix_timestamp");
    }

    #[test]
    fn test_xmlnamespace() {
        let shape = translate(
            json!({
                "type": "structure",
                "xmlnamespace": { "uri": "http://example.com/doc/", "prefix": "ex" }
            }),
            ShapeFlavor::Input,
        );
        assert_eq!(
            shape.metadata_str(metadata_keys::XMLNS_URI),
            Some("http://example.com/doc/")
        );
        assert_eq!(shape.metadata_str(metadata_keys::XMLNS_PREFIX), Some("ex"));
    }

    #[test]
    fn test_structure_members_keep_order_and_wire_names() {
        let shape = translate(
            json!({
                "type": "structure",
                "members": {
                    "TableName": { "type": "string", "required": true },
                    "Limit": { "type": "integer" },
                    "ExclusiveStartKey": { "type": "string", "location_name": "StartKey" }
                }
            }),
            ShapeFlavor::Input,
        );

        let names: Vec<&str> = shape.members.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["table_name", "limit", "exclusive_start_key"]);
        assert_eq!(
            shape.members["table_name"].serialized_name.as_deref(),
            Some("TableName")
        );
        assert_eq!(
            shape.members["exclusive_start_key"].serialized_name.as_deref(),
            Some("StartKey")
        );
        assert!(shape.members["table_name"].required);
        assert!(!shape.members["limit"].required);
    }

    #[test]
    fn test_output_drops_required() {
        let shape = translate(
            json!({
                "type": "structure",
                "members": { "Name": { "type": "string", "required": true } }
            }),
            ShapeFlavor::Output,
        );
        assert!(!shape.members["name"].required);
    }

    #[test]
    fn test_list_and_map_children() {
        let shape = translate(
            json!({
                "type": "map",
                "keys": { "type": "string" },
                "members": {
                    "type": "list",
                    "flattened": true,
                    "members": { "type": "timestamp" }
                }
            }),
            ShapeFlavor::Output,
        );

        assert!(shape.members.is_empty());
        assert_eq!(shape.keys.as_ref().unwrap().shape_type.to_string(), "string");
        let value = shape.member.as_ref().unwrap();
        assert_eq!(value.shape_type.to_string(), "flat_list");
        assert_eq!(
            value.member.as_ref().unwrap().shape_type.to_string(),
            "unix_timestamp"
        );
    }

    #[test]
    fn test_member_named_type_is_a_structure_member() {
        let shape = translate(
            json!({
                "type": "structure",
                "members": { "type": { "type": "string" } }
            }),
            ShapeFlavor::Input,
        );
        assert!(shape.member.is_none());
        assert!(shape.members.contains_key("type"));
    }

    #[test]
    fn test_payload_promotion() {
        let shape = translate(
            json!({
                "type": "structure",
                "members": {
                    "Bucket": { "type": "string", "location": "uri" },
                    "Body": { "type": "blob", "payload": true, "streaming": true }
                }
            }),
            ShapeFlavor::Input,
        );
        assert_eq!(shape.payload.as_deref(), Some("body"));
        assert!(!shape.members["body"].metadata.contains_key(metadata_keys::PAYLOAD));
        assert!(!shape.members["body"].metadata.contains_key("streaming"));
    }

    #[test]
    fn test_duplicate_payload_keeps_first() {
        let shape = translate(
            json!({
                "type": "structure",
                "members": {
                    "First": { "type": "blob", "payload": true },
                    "Second": { "type": "blob", "payload": true }
                }
            }),
            ShapeFlavor::Input,
        );
        assert_eq!(shape.payload.as_deref(), Some("first"));
        assert!(shape
            .members
            .values()
            .all(|m| !m.metadata.contains_key(metadata_keys::PAYLOAD)));
    }

    #[test]
    fn test_validation_fields_dropped_and_unknown_kept() {
        let shape = translate(
            json!({
                "type": "string",
                "pattern": "[a-z]+",
                "min_length": 1,
                "max_length": 10,
                "box": true,
                "enum": ["a", "b", "a"],
                "shape_name": "TableName"
            }),
            ShapeFlavor::Input,
        );
        assert_eq!(shape.metadata.len(), 1);
        assert_eq!(shape.metadata_str("shape_name"), Some("TableName"));
        let values: Vec<&str> = shape
            .enum_values
            .as_ref()
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(values, vec!["a", "b"]);
    }

    #[test]
    fn test_locations() {
        let shape = translate(
            json!({
                "type": "structure",
                "members": {
                    "Status": { "type": "integer", "location": "statusCode" },
                    "Odd": { "type": "string", "location": "cookie" }
                }
            }),
            ShapeFlavor::Output,
        );
        assert_eq!(shape.members["status"].location, Some(Location::StatusCode));
        assert_eq!(shape.members["odd"].location, None);
        assert_eq!(
            shape.members["odd"].metadata_str(metadata_keys::LOCATION),
            Some("cookie")
        );
    }

    #[test]
    fn test_unknown_type_passes_through() {
        let shape = translate(json!({ "type": "document" }), ShapeFlavor::Input);
        assert_eq!(shape.shape_type.base, BaseType::Other("document".to_string()));
    }

    #[test]
    fn test_member_names_that_normalize_to_nothing_are_skipped() {
        let shape = translate(
            json!({
                "type": "structure",
                "members": {
                    "_": { "type": "string" },
                    "-": { "type": "string" },
                    "Name": { "type": "string" }
                }
            }),
            ShapeFlavor::Input,
        );
        let keys: Vec<&str> = shape.members.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["name"]);
    }

    #[test]
    fn test_colliding_member_names_keep_later_definition() {
        let shape = translate(
            json!({
                "type": "structure",
                "members": {
                    "Foo": { "type": "string" },
                    "foo": { "type": "integer" }
                }
            }),
            ShapeFlavor::Input,
        );
        assert_eq!(shape.members.len(), 1);
        let foo = &shape.members["foo"];
        assert_eq!(foo.shape_type.base, BaseType::Integer);
        assert_eq!(foo.serialized_name.as_deref(), Some("foo"));
    }
}
