//! Plugin derivation from protocol and signature metadata
//!
//! The plugin list layers client behavior, so the order in which
//! identifiers are appended here is significant.

use svcmodel_common::{Result, TranslateError};

/// Plugin identifiers attached to the model
pub mod ids {
    pub const RESTFUL_BINDINGS: &str = "restful_bindings";
    pub const CONTENT_LENGTH: &str = "content_length";
    pub const GLOBAL_CONFIGURATION: &str = "global_configuration";
    pub const REGIONAL_ENDPOINT: &str = "regional_endpoint";
    pub const CREDENTIALS: &str = "credentials";
    pub const SIMPLE_JSON: &str = "simple_json";
    pub const QUERY_PROTOCOL: &str = "query_protocol";
    pub const JSON_PROTOCOL: &str = "json_protocol";
    pub const JSON_RPC_HEADERS: &str = "json_rpc_headers";
    pub const XML_PROTOCOL: &str = "xml_protocol";
    pub const SIGNATURE_V4: &str = "signature_v4";
    pub const SIGNATURE_V3: &str = "signature_v3";
    pub const SIGNATURE_V2: &str = "signature_v2";
    pub const S3_SIGNER: &str = "s3_signer";
}

/// Plugins every service carries, in order
pub const DEFAULT_PLUGINS: [&str; 5] = [
    ids::RESTFUL_BINDINGS,
    ids::CONTENT_LENGTH,
    ids::GLOBAL_CONFIGURATION,
    ids::REGIONAL_ENDPOINT,
    ids::CREDENTIALS,
];

/// Append the default and protocol plugins for a wire protocol `type`
///
/// The first matching protocol branch wins: `query`, exact `json`, any
/// other `json`-containing name, then any `xml`-containing name. Unknown
/// protocols add no protocol plugin.
///
/// # Examples
/// ```
/// use svcmodel_translator::plugins::{append_protocol_plugins, ids};
///
/// let mut plugins = Vec::new();
/// append_protocol_plugins(&mut plugins, "query");
/// assert_eq!(plugins.last().map(String::as_str), Some(ids::QUERY_PROTOCOL));
/// ```
pub fn append_protocol_plugins(plugins: &mut Vec<String>, protocol: &str) {
    plugins.extend(DEFAULT_PLUGINS.iter().map(|p| p.to_string()));

    if protocol.contains("json") {
        plugins.push(ids::SIMPLE_JSON.to_string());
    }

    match protocol {
        "query" => plugins.push(ids::QUERY_PROTOCOL.to_string()),
        "json" => {
            plugins.push(ids::JSON_PROTOCOL.to_string());
            plugins.push(ids::JSON_RPC_HEADERS.to_string());
        }
        p if p.contains("json") => plugins.push(ids::JSON_PROTOCOL.to_string()),
        p if p.contains("xml") => plugins.push(ids::XML_PROTOCOL.to_string()),
        other => {
            tracing::warn!(protocol = other, "no protocol plugin for service type");
        }
    }
}

/// Map a signature version onto its signer plugin
pub fn signer_plugin(version: &str) -> Result<&'static str> {
    match version {
        "v4" | "v3" | "cloudfront" => Ok(ids::SIGNATURE_V4),
        "v3https" => Ok(ids::SIGNATURE_V3),
        "v2" => Ok(ids::SIGNATURE_V2),
        "s3" => Ok(ids::S3_SIGNER),
        other => Err(TranslateError::UnknownSignatureVersion(other.to_string())),
    }
}

/// Derive the complete plugin list for a protocol and optional signer
///
/// Fails before producing any list when the signature version is unknown.
pub fn derive_plugins(protocol: &str, signature_version: Option<&str>) -> Result<Vec<String>> {
    let signer = signature_version.map(signer_plugin).transpose()?;

    let mut plugins = Vec::new();
    append_protocol_plugins(&mut plugins, protocol);
    if let Some(signer) = signer {
        plugins.push(signer.to_string());
    }
    Ok(plugins)
}
