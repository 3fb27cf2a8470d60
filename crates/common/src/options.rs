//! Translation options loading from YAML files
//!
//! Callers can keep translation knobs in an options file instead of
//! passing them one by one. Every field is optional; anything left unset
//! falls back to the raw description and then to a built-in default.

use crate::{Result, TranslateError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Caller-supplied translation options
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslateOptions {
    /// Format prefix for timestamp shapes (e.g., "unix", "iso8601")
    pub timestamp_format: Option<String>,
    /// Populate each operation's error list
    pub errors: bool,
    /// Mark every operation output as wrapped
    pub result_wrapped: Option<bool>,
    /// Wire protocol, overriding the raw `type`
    pub protocol: Option<String>,
    /// Signer, overriding the raw `signature_version`
    pub signature_version: Option<String>,
    /// Endpoint template, overriding the raw endpoint fields
    pub endpoint: Option<String>,
}

impl TranslateOptions {
    /// Used when neither options nor the raw description name a format
    pub const DEFAULT_TIMESTAMP_FORMAT: &'static str = "iso8601";

    /// Load options from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TranslateError::Config(format!("Failed to read options file {:?}: {}", path, e))
        })?;

        Self::from_yaml_str(&content).map_err(|e| match e {
            TranslateError::Config(msg) => {
                TranslateError::Config(format!("{} (in {:?})", msg, path))
            }
            other => other,
        })
    }

    /// Parse options from YAML text
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| TranslateError::Config(format!("Failed to parse options YAML: {}", e)))
    }

    /// Overlay the fields set in `other` onto `self`
    ///
    /// `errors` is enabled if either side enables it.
    pub fn merge(mut self, other: TranslateOptions) -> Self {
        if other.timestamp_format.is_some() {
            self.timestamp_format = other.timestamp_format;
        }
        self.errors |= other.errors;
        if other.result_wrapped.is_some() {
            self.result_wrapped = other.result_wrapped;
        }
        if other.protocol.is_some() {
            self.protocol = other.protocol;
        }
        if other.signature_version.is_some() {
            self.signature_version = other.signature_version;
        }
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint;
        }
        self
    }

    /// Timestamp format to apply, given the raw description's own choice
    pub fn effective_timestamp_format<'a>(&'a self, raw: Option<&'a str>) -> &'a str {
        self.timestamp_format
            .as_deref()
            .or(raw)
            .unwrap_or(Self::DEFAULT_TIMESTAMP_FORMAT)
    }
}
