//! Schema registry: loading, configuration and the bound API.
//!
//! This crate puts the core model and the validation engine behind one
//! handle:
//!
//! - [`SchemaStore`] loads a [`SchemaCollection`](schema_tools_core::SchemaCollection)
//!   from a directory of schema files or a single bundle, with a fallback
//!   [`StoreBuilder`].
//! - [`RegistryConfig`] reads custom formats and sources from YAML.
//! - [`bind`] merges collections and formats into a [`BoundApi`] exposing
//!   `validate`, `assert_schema`, `sanitize`, `trim`, `fill` and lookups.
//!
//! The object-shape utilities are also available unbound as
//! [`sanitize_by_schema`], [`trim_by_schema`] and [`fill_by_schema`].
//!
//! # Example
//!
//! ```
//! use schema_tools_core::*;
//! use schema_tools_registry::{BindSource, bind};
//! use serde_json::json;
//!
//! let pet = ObjectSchema::new(
//!     SemanticVersion::new(1, 0, 0),
//!     SchemaDocument::new("Pet")
//!         .with_property("kind", PropertyDescriptor::of(PrimitiveType::String))
//!         .with_property("legs", PropertyDescriptor::of(PrimitiveType::Integer).with_default(4))
//!         .with_required(["kind"]),
//!     json!({"kind": "cat", "legs": 4}).as_object().cloned().unwrap(),
//! );
//! let api = bind([BindSource::new(combine_schemas([version_schemas([pet]).unwrap()]))]);
//!
//! let filled = api.fill("pet", "1.0.0", &json!({"kind": "dog"})).unwrap();
//! assert_eq!(filled, json!({"kind": "dog", "legs": 4}));
//!
//! let trimmed = api.trim("pet", "1.0.0", &json!({"kind": "dog", "owner": "me"})).unwrap();
//! assert_eq!(trimmed, json!({"kind": "dog"}));
//! ```

mod bind;
mod config;
mod error;
mod fill;
mod loader;
mod sanitize;
mod trim;

pub use bind::{BindSource, BoundApi, bind, check_examples};
pub use config::{FormatConfig, RegistryConfig, SourceConfig};
pub use error::{RegistryError, Result};
pub use fill::{fill, fill_by_schema};
pub use loader::{CollectionSource, SchemaStore, StoreBuilder};
pub use sanitize::{sanitize, sanitize_by_schema};
pub use trim::{trim, trim_by_schema};
