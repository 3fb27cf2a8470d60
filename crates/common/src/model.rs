//! Normalized service model
//!
//! These types are the translation target: a strongly-typed graph of
//! operations and shapes ready for code generation and for runtime
//! request/response marshaling.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ordered protocol hints and pass-through properties
pub type Metadata = IndexMap<String, serde_json::Value>;

/// Metadata keys written by the translator
pub mod metadata_keys {
    pub const SIGNING_NAME: &str = "signing_name";
    pub const CHECKSUM_FORMAT: &str = "checksum_format";
    pub const JSON_VERSION: &str = "json_version";
    pub const JSON_TARGET_PREFIX: &str = "json_target_prefix";
    pub const SERVICE_FULL_NAME: &str = "service_full_name";
    pub const SERVICE_ABBREVIATION: &str = "service_abbreviation";
    pub const SERVICE_CLASS_NAME: &str = "service_class_name";
    pub const ENDPOINT_PREFIX: &str = "endpoint_prefix";
    pub const XMLNAMESPACE: &str = "xmlnamespace";
    pub const XMLNS_URI: &str = "xmlns_uri";
    pub const XMLNS_PREFIX: &str = "xmlns_prefix";
    pub const XMLATTRIBUTE: &str = "xmlattribute";
    pub const PAYLOAD: &str = "payload";
    pub const WRAPPER: &str = "wrapper";
    pub const LOCATION: &str = "location";
}

/// A fully translated service API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedApi {
    /// API format version (e.g., "2012-08-10")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    /// Cross-cutting service facts, key-sorted
    #[serde(default)]
    pub metadata: Metadata,

    /// Network address template (e.g., "dynamodb.{region}.amazonaws.com")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Plugin identifiers; order determines client behavior layering
    #[serde(default)]
    pub plugins: Vec<String>,

    /// Operations keyed by underscored name
    #[serde(default)]
    pub operations: IndexMap<String, Operation>,
}

impl NormalizedApi {
    /// Re-sort metadata by key
    pub fn sort_metadata(&mut self) {
        self.metadata.sort_keys();
    }

    /// Whether the plugin list contains `plugin`
    pub fn has_plugin(&self, plugin: &str) -> bool {
        self.plugins.iter().any(|p| p == plugin)
    }

    /// Metadata value as a string, if it is one
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// A translated operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Operation name with any date-version suffix removed
    pub name: String,

    pub http_method: String,

    pub http_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Shape>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Shape>,

    /// Error shapes; never `Some` of an empty list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Shape>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    /// Unmapped raw properties
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: Metadata,
}

impl Operation {
    pub const DEFAULT_HTTP_METHOD: &'static str = "POST";
    pub const DEFAULT_HTTP_PATH: &'static str = "/";

    /// Create an operation with the default HTTP binding
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            http_method: Self::DEFAULT_HTTP_METHOD.to_string(),
            http_path: Self::DEFAULT_HTTP_PATH.to_string(),
            input: None,
            output: None,
            errors: None,
            documentation: None,
            metadata: Metadata::new(),
        }
    }
}

/// Where a member's value is placed in a request or response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "header")]
    Header,
    #[serde(rename = "uri")]
    Uri,
    #[serde(rename = "querystring")]
    Querystring,
    #[serde(rename = "body")]
    Body,
    #[serde(rename = "statusCode")]
    StatusCode,
    #[serde(rename = "payload")]
    Payload,
}

impl Location {
    /// Parse a raw location string
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "header" => Some(Location::Header),
            "uri" => Some(Location::Uri),
            "querystring" => Some(Location::Querystring),
            "body" => Some(Location::Body),
            "statusCode" | "status_code" => Some(Location::StatusCode),
            "payload" => Some(Location::Payload),
            _ => None,
        }
    }
}

/// Type family of a normalized shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseType {
    String,
    Integer,
    Float,
    Boolean,
    Blob,
    /// Timestamp with its wire format (e.g., "unix", "iso8601")
    Timestamp {
        format: String,
    },
    Structure,
    List,
    Map,
    /// Operation input structure
    Input,
    /// Operation output structure
    Output,
    /// Unrecognized type name, kept as given
    Other(String),
}

impl BaseType {
    fn from_name(name: &str) -> Self {
        match name {
            "string" => BaseType::String,
            "integer" => BaseType::Integer,
            "float" => BaseType::Float,
            "boolean" => BaseType::Boolean,
            "blob" => BaseType::Blob,
            "structure" => BaseType::Structure,
            "list" => BaseType::List,
            "map" => BaseType::Map,
            "input" => BaseType::Input,
            "output" => BaseType::Output,
            other => BaseType::Other(other.to_string()),
        }
    }
}

/// Normalized type tag, e.g. `integer` or `flat_unix_timestamp`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShapeType {
    pub base: BaseType,
    pub flattened: bool,
}

impl ShapeType {
    pub fn new(base: BaseType) -> Self {
        Self {
            base,
            flattened: false,
        }
    }

    /// Build a type from a raw type name
    ///
    /// Applies the `long`→`integer` and `double`→`float` aliases, attaches
    /// `timestamp_format` to timestamps, and records flattening.
    ///
    /// # Examples
    /// ```
    /// use svcmodel_common::ShapeType;
    ///
    /// assert_eq!(ShapeType::from_raw("long", "unix", false).to_string(), "integer");
    /// assert_eq!(
    ///     ShapeType::from_raw("timestamp", "unix", true).to_string(),
    ///     "flat_unix_timestamp"
    /// );
    /// ```
    pub fn from_raw(raw: &str, timestamp_format: &str, flattened: bool) -> Self {
        let base = match raw {
            "long" => BaseType::Integer,
            "double" => BaseType::Float,
            "timestamp" => BaseType::Timestamp {
                format: timestamp_format.to_string(),
            },
            other => BaseType::from_name(other),
        };
        Self { base, flattened }
    }

    /// Parse a normalized type tag (no raw aliasing)
    pub fn from_tag(tag: &str) -> Self {
        let (flattened, rest) = match tag.strip_prefix("flat_") {
            Some(rest) => (true, rest),
            None => (false, tag),
        };
        let base = if rest == "timestamp" {
            BaseType::Timestamp {
                format: String::new(),
            }
        } else if let Some(format) = rest.strip_suffix("_timestamp") {
            BaseType::Timestamp {
                format: format.to_string(),
            }
        } else {
            BaseType::from_name(rest)
        };
        Self { base, flattened }
    }
}

impl Default for ShapeType {
    fn default() -> Self {
        Self::new(BaseType::Structure)
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.flattened {
            f.write_str("flat_")?;
        }
        match &self.base {
            BaseType::String => f.write_str("string"),
            BaseType::Integer => f.write_str("integer"),
            BaseType::Float => f.write_str("float"),
            BaseType::Boolean => f.write_str("boolean"),
            BaseType::Blob => f.write_str("blob"),
            BaseType::Timestamp { format } if format.is_empty() => f.write_str("timestamp"),
            BaseType::Timestamp { format } => write!(f, "{}_timestamp", format),
            BaseType::Structure => f.write_str("structure"),
            BaseType::List => f.write_str("list"),
            BaseType::Map => f.write_str("map"),
            BaseType::Input => f.write_str("input"),
            BaseType::Output => f.write_str("output"),
            BaseType::Other(name) => f.write_str(name),
        }
    }
}

impl FromStr for ShapeType {
    type Err = std::convert::Infallible;

    fn from_str(tag: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_tag(tag))
    }
}

impl Serialize for ShapeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShapeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// A translated shape
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub shape_type: ShapeType,

    /// Wire-level name when it differs from the member name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialized_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Named members of a structure, in raw description order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub members: IndexMap<String, Shape>,

    /// Value shape of a list or map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Box<Shape>>,

    /// Key shape of a map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Box<Shape>>,

    /// Name of the member carrying the whole body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// Permitted literal values (not enforced)
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<IndexSet<String>>,

    /// Only ever set on input members
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: Metadata,
}

impl Shape {
    pub fn new(shape_type: ShapeType) -> Self {
        Self {
            shape_type,
            ..Default::default()
        }
    }

    /// The designated payload member, if any
    pub fn payload_member(&self) -> Option<&Shape> {
        self.payload.as_ref().and_then(|name| self.members.get(name))
    }

    pub fn payload_member_mut(&mut self) -> Option<&mut Shape> {
        let name = self.payload.as_ref()?;
        self.members.get_mut(name)
    }

    /// Metadata value as a string, if it is one
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Metadata flag, treating anything but `true` as unset
    pub fn metadata_flag(&self, key: &str) -> bool {
        self.metadata.get(key).and_then(|v| v.as_bool()) == Some(true)
    }
}
