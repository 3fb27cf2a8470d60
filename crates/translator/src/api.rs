//! API translation
//!
//! Converts a complete raw service description into a [`NormalizedApi`].
//! The steps run in a fixed order because later ones read what earlier
//! ones established:
//!
//! 1. top-level properties, plugin derivation and endpoint
//! 2. metadata key sort
//! 3. every raw operation, in raw order
//! 4. XML namespace propagation (XML protocols only)
//! 5. service naming

use crate::naming::{underscore, DefaultNamingPolicy, NamingPolicy};
use crate::operation::{translate_operation, OperationOptions};
use crate::plugins::{self, ids};
use crate::property_mapper::{PropertyMapper, PropertySink};
use crate::RawDescription;
use serde_json::Value;
use std::fs;
use std::path::Path;
use svcmodel_common::{
    metadata_keys, BaseType, NormalizedApi, Operation, Result, Shape, ShapeType,
    TranslateError, TranslateOptions,
};

/// Raw service description translator
///
/// Holds a loaded raw description and the caller's options; the naming
/// policy used for step 5 defaults to [`DefaultNamingPolicy`].
pub struct ApiTranslator<P = DefaultNamingPolicy> {
    raw: RawDescription,
    options: TranslateOptions,
    naming: P,
}

impl ApiTranslator {
    pub fn new(raw: RawDescription, options: TranslateOptions) -> Self {
        Self {
            raw,
            options,
            naming: DefaultNamingPolicy,
        }
    }

    /// Load a raw description from a JSON file
    ///
    /// # Example
    /// ```rust,ignore
    /// let translator = ApiTranslator::from_file(
    ///     "apis/DynamoDB-2012-08-10.json",
    ///     TranslateOptions::default(),
    /// )?;
    /// let api = translator.translate()?;
    /// ```
    pub fn from_file<Q: AsRef<Path>>(path: Q, options: TranslateOptions) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content, options)
    }

    /// Parse a raw description from JSON text
    pub fn from_json(json: &str, options: TranslateOptions) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;

        match value {
            Value::Object(raw) => Ok(Self::new(raw, options)),
            other => Err(TranslateError::Parse(format!(
                "Service description must be a JSON object, found {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<P: NamingPolicy> ApiTranslator<P> {
    /// Replace the naming policy
    pub fn with_naming_policy<N: NamingPolicy>(self, naming: N) -> ApiTranslator<N> {
        ApiTranslator {
            raw: self.raw,
            options: self.options,
            naming,
        }
    }

    /// Translate the loaded description
    pub fn translate(&self) -> Result<NormalizedApi> {
        translate_api_with(&self.raw, &self.options, &self.naming)
    }

    /// Get reference to the underlying raw description
    pub fn raw(&self) -> &RawDescription {
        &self.raw
    }
}

/// Translate a raw description with the default naming policy
pub fn translate_api(raw: &RawDescription, options: &TranslateOptions) -> Result<NormalizedApi> {
    translate_api_with(raw, options, &DefaultNamingPolicy)
}

/// Translate a raw description with a caller-supplied naming policy
pub fn translate_api_with<P: NamingPolicy + ?Sized>(
    raw: &RawDescription,
    options: &TranslateOptions,
    naming: &P,
) -> Result<NormalizedApi> {
    let mut builder = ApiBuilder::default();
    api_rules().apply(raw, &mut builder)?;

    let protocol = options.protocol.as_deref().or(builder.protocol.as_deref());
    let signature_version = options
        .signature_version
        .as_deref()
        .or(builder.signature_version.as_deref());
    let derived = plugins::derive_plugins(protocol.unwrap_or_default(), signature_version)?;

    let timestamp_format = options
        .effective_timestamp_format(builder.timestamp_format.as_deref())
        .to_string();
    let result_wrapped = options.result_wrapped.unwrap_or(builder.result_wrapped);

    let mut api = builder.api;
    api.plugins.extend(derived);
    api.endpoint = options
        .endpoint
        .clone()
        .or(builder.global_endpoint)
        .or_else(|| {
            builder
                .endpoint_prefix
                .map(|prefix| format!("{}.{{region}}.amazonaws.com", prefix))
        });

    api.sort_metadata();

    let operation_options = OperationOptions {
        timestamp_format: &timestamp_format,
        errors: options.errors,
    };
    translate_operations(&mut api, raw.get("operations"), operation_options, result_wrapped)?;

    if api.has_plugin(ids::XML_PROTOCOL) {
        propagate_xml_namespace(&mut api);
    }

    apply_service_names(&mut api, naming);
    api.sort_metadata();

    tracing::debug!(
        operations = api.operations.len(),
        plugins = api.plugins.len(),
        "translated service description"
    );
    Ok(api)
}

fn translate_operations(
    api: &mut NormalizedApi,
    raw_operations: Option<&Value>,
    options: OperationOptions<'_>,
    result_wrapped: bool,
) -> Result<()> {
    let raw_operations = match raw_operations {
        None => return Ok(()),
        Some(Value::Object(ops)) => ops,
        Some(other) => {
            tracing::warn!(
                found = json_kind(other),
                "ignoring `operations` that is not a mapping"
            );
            return Ok(());
        }
    };

    for (raw_name, raw_operation) in raw_operations {
        let Value::Object(raw_operation) = raw_operation else {
            tracing::warn!(operation = %raw_name, "skipping operation that is not a mapping");
            continue;
        };

        let mut operation = translate_operation(raw_operation, raw_name, options)?;
        if result_wrapped {
            mark_output_wrapped(&mut operation);
        }

        let key = underscore(&operation.name);
        tracing::debug!(operation = %operation.name, key = %key, "translated operation");
        if api.operations.insert(key.clone(), operation).is_some() {
            tracing::warn!(key = %key, "duplicate operation name; later definition wins");
        }
    }
    Ok(())
}

/// Flag the output for response unwrapping, creating it if absent
fn mark_output_wrapped(operation: &mut Operation) {
    operation
        .output
        .get_or_insert_with(|| Shape::new(ShapeType::new(BaseType::Output)))
        .metadata
        .insert(metadata_keys::WRAPPER.to_string(), Value::Bool(true));
}

/// Attach the service XML namespace to each operation's document root
///
/// The root is the input's payload member when one is designated,
/// otherwise the input structure itself (renamed `<Operation>Request`).
fn propagate_xml_namespace(api: &mut NormalizedApi) {
    let Some(namespace) = api.metadata.shift_remove(metadata_keys::XMLNAMESPACE) else {
        return;
    };

    for operation in api.operations.values_mut() {
        let Some(input) = operation.input.as_mut() else {
            continue;
        };

        if input.payload.is_some() {
            if let Some(payload) = input.payload_member_mut() {
                payload
                    .metadata
                    .insert(metadata_keys::XMLNS_URI.to_string(), namespace.clone());
            }
        } else if !input.members.is_empty() {
            input.serialized_name = Some(format!("{}Request", operation.name));
            input
                .metadata
                .insert(metadata_keys::XMLNS_URI.to_string(), namespace.clone());
        }
    }
}

fn apply_service_names<P: NamingPolicy + ?Sized>(api: &mut NormalizedApi, naming: &P) {
    let full_name = take_string(api, metadata_keys::SERVICE_FULL_NAME);
    let abbreviation = take_string(api, metadata_keys::SERVICE_ABBREVIATION);

    let names = naming.service_names(
        api.endpoint.as_deref(),
        full_name.as_deref(),
        abbreviation.as_deref(),
    );

    let metadata = &mut api.metadata;
    metadata.insert(
        metadata_keys::SERVICE_FULL_NAME.to_string(),
        Value::String(names.full_name),
    );
    metadata.insert(
        metadata_keys::SERVICE_ABBREVIATION.to_string(),
        Value::String(names.abbreviation),
    );
    metadata.insert(
        metadata_keys::SERVICE_CLASS_NAME.to_string(),
        Value::String(names.class_name),
    );
}

fn take_string(api: &mut NormalizedApi, key: &str) -> Option<String> {
    match api.metadata.shift_remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Default)]
struct ApiBuilder {
    api: NormalizedApi,
    protocol: Option<String>,
    signature_version: Option<String>,
    timestamp_format: Option<String>,
    endpoint_prefix: Option<String>,
    global_endpoint: Option<String>,
    result_wrapped: bool,
}

impl PropertySink for ApiBuilder {
    fn set_property(&mut self, name: &str, value: &Value) {
        match (name, value) {
            ("version", Value::String(s)) => self.api.version = Some(s.clone()),
            ("documentation", Value::String(s)) => self.api.documentation = Some(s.clone()),
            _ => {
                self.api.metadata.insert(name.to_string(), value.clone());
            }
        }
    }
}

fn api_rules() -> PropertyMapper<ApiBuilder> {
    PropertyMapper::new()
        .rename("api_version", "version")
        .custom("type", set_type)
        .custom("signature_version", set_signature_version)
        .property(metadata_keys::SIGNING_NAME)
        .property(metadata_keys::CHECKSUM_FORMAT)
        .property(metadata_keys::JSON_VERSION)
        .rename("target_prefix", metadata_keys::JSON_TARGET_PREFIX)
        .property(metadata_keys::SERVICE_FULL_NAME)
        .property(metadata_keys::SERVICE_ABBREVIATION)
        .custom(metadata_keys::XMLNAMESPACE, set_xmlnamespace)
        .custom(metadata_keys::ENDPOINT_PREFIX, set_endpoint_prefix)
        .custom("global_endpoint", set_global_endpoint)
        .custom("result_wrapped", set_result_wrapped)
        .custom("timestamp_format", set_timestamp_format)
        .custom("plugins", set_plugins)
        .property("documentation")
        // translated after every other property
        .ignore(&["operations"])
}

fn string_value(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn set_type(builder: &mut ApiBuilder, value: &Value) -> Result<()> {
    builder.protocol = string_value(value);
    Ok(())
}

fn set_signature_version(builder: &mut ApiBuilder, value: &Value) -> Result<()> {
    builder.signature_version = string_value(value);
    Ok(())
}

fn set_xmlnamespace(builder: &mut ApiBuilder, value: &Value) -> Result<()> {
    let uri = match value {
        Value::Object(ns) => ns.get("uri").cloned(),
        Value::String(_) => Some(value.clone()),
        _ => None,
    };
    if let Some(uri) = uri {
        builder
            .api
            .metadata
            .insert(metadata_keys::XMLNAMESPACE.to_string(), uri);
    }
    Ok(())
}

fn set_endpoint_prefix(builder: &mut ApiBuilder, value: &Value) -> Result<()> {
    builder.endpoint_prefix = string_value(value);
    builder
        .api
        .metadata
        .insert(metadata_keys::ENDPOINT_PREFIX.to_string(), value.clone());
    Ok(())
}

fn set_global_endpoint(builder: &mut ApiBuilder, value: &Value) -> Result<()> {
    builder.global_endpoint = string_value(value);
    Ok(())
}

fn set_result_wrapped(builder: &mut ApiBuilder, value: &Value) -> Result<()> {
    builder.result_wrapped = value.as_bool() == Some(true);
    Ok(())
}

fn set_timestamp_format(builder: &mut ApiBuilder, value: &Value) -> Result<()> {
    builder.timestamp_format = string_value(value);
    Ok(())
}

fn set_plugins(builder: &mut ApiBuilder, value: &Value) -> Result<()> {
    let Value::Array(seeded) = value else {
        tracing::warn!(found = json_kind(value), "ignoring `plugins` that is not a list");
        return Ok(());
    };
    builder
        .api
        .plugins
        .extend(seeded.iter().filter_map(string_value));
    Ok(())
}
