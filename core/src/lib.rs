//! Core data model for versioned JSON schemas.
//!
//! This crate defines the schema dialect and the pure operations over it:
//!
//! - [`SemanticVersion`] - `M.m.p` version value with string round-trip.
//! - [`PropertyDescriptor`] and [`SchemaDocument`] - the authoring dialect,
//!   including the `required: true` shorthand ([`RequiredSpec`]) and `see`
//!   cross-references ([`SeeRef`]).
//! - [`ObjectSchema`] - one published schema version with its example.
//! - [`VersionedSchema`] and [`SchemaCollection`] - the registry containers
//!   with never-failing lookups keyed by [`normalize_name`].
//! - [`CustomFormat`] - named string formats with detectors and defaults.
//!
//! Schema history is derived with [`extend`] and [`add_property`], which
//! return new versions and keep the required list consistent. The
//! [`normalize_required`] normalizer runs before schemas enter a collection.
//! Structural checks ([`check_document`], [`check_collection`]) catch dialect
//! mistakes on demand.
//!
//! # Example
//!
//! ```
//! use schema_tools_core::*;
//! use serde_json::json;
//!
//! let person100 = ObjectSchema::new(
//!     SemanticVersion::new(1, 0, 0),
//!     SchemaDocument::new("Person")
//!         .with_property("name", PropertyDescriptor::of(PrimitiveType::String))
//!         .with_property("age", PropertyDescriptor::of(PrimitiveType::Integer).optional())
//!         .all_required(),
//!     json!({"name": "Joe", "age": 10}).as_object().cloned().unwrap(),
//! );
//! let person110 = add_property(
//!     &ExtensionSource::new(&person100, "Person with title"),
//!     &[PropertyAddition::new("title", PrimitiveType::String, json!("mr")).required()],
//! );
//!
//! let collection = combine_schemas([version_schemas([person100, person110]).unwrap()]);
//! assert_eq!(collection.schema_versions("person"), vec!["1.0.0", "1.1.0"]);
//! assert_eq!(
//!     collection.get("Person", "1.1.0").unwrap().schema.required,
//!     RequiredSpec::List(vec!["name".into(), "title".into()])
//! );
//! assert!(check_collection(&collection).is_empty());
//! ```

mod error;
mod formats;
mod merge;
mod package;
mod required;
mod types;
mod validate;
mod version;

pub use error::ModelError;
pub use formats::{
    CustomFormat, CustomFormats, FormatDefaults, FormatDetectors, detectors, format_defaults,
    one_of_regex, regex_as_pattern_key,
};
pub use merge::{
    ExtensionSource, PropertyAddition, SchemaDelta, SchemaPatch, add_property, extend,
    merge_objects,
};
pub use package::{
    SchemaCollection, VersionedSchema, combine_schemas, normalize_name, version_schemas,
};
pub use required::{normalize_required, required_names};
pub use types::*;
pub use validate::{DialectError, check_document, check_collection};
pub use version::SemanticVersion;
