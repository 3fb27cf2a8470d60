//! Raw service description translation
//!
//! This crate converts a raw, loosely-typed service description into the
//! normalized model defined in `svcmodel-common` (`NormalizedApi`).
//!
//! ## Translation Strategy
//!
//! Translation flows strictly downward through three translators, all
//! built on the declarative [`PropertyMapper`]:
//! - [`ApiTranslator`] reads top-level properties, derives plugins, and
//!   drives the operation translator for each raw operation
//! - [`translate_operation`] resolves the HTTP binding and drives the shape
//!   translator for input, output and error shapes
//! - [`translate_shape`] normalizes types and recurses into members
//!
//! ## Usage
//! ```rust
//! use svcmodel_common::TranslateOptions;
//! use svcmodel_translator::ApiTranslator;
//!
//! let translator = ApiTranslator::from_json(
//!     r#"{ "api_version": "2012-08-10", "type": "json", "operations": {} }"#,
//!     TranslateOptions::default(),
//! )
//! .unwrap();
//! let api = translator.translate().unwrap();
//! assert_eq!(api.version.as_deref(), Some("2012-08-10"));
//! ```

mod api;
mod naming;
mod operation;
pub mod plugins;
mod property_mapper;
mod shape;

pub use api::{translate_api, translate_api_with, ApiTranslator};
pub use naming::{
    strip_version_suffix, underscore, DefaultNamingPolicy, NamingPolicy, ServiceNames,
};
pub use operation::{rewrite_uri_placeholders, translate_operation, OperationOptions};
pub use property_mapper::{PropertyMapper, PropertySink, Setter};
pub use shape::{promote_payload, translate_shape, ShapeFlavor};

/// Order-preserving raw description mapping
pub type RawDescription = serde_json::Map<String, serde_json::Value>;
