//! Validation of objects against versioned dialect schemas.
//!
//! The [`bridge`](bridge_document) translates the authoring dialect into
//! standard JSON schema and compiles it with the `jsonschema` crate, wiring
//! in custom string formats and resolving `see` labels against a collection.
//! On top of it:
//!
//! - [`validate_by_schema`] / [`validate`] return [`ValidationErrors`] as a
//!   value.
//! - [`assert_by_schema`] / [`assert_schema`] fail with a [`SchemaError`]
//!   whose message shows the errors, the object and the expected example.
//!
//! # Example
//!
//! ```
//! use schema_tools_core::*;
//! use schema_tools_validate::*;
//! use serde_json::json;
//!
//! let person = ObjectSchema::new(
//!     SemanticVersion::new(1, 0, 0),
//!     SchemaDocument::new("Person")
//!         .with_property("name", PropertyDescriptor::of(PrimitiveType::String))
//!         .with_property("age", PropertyDescriptor::of(PrimitiveType::Integer))
//!         .with_required(["name", "age"]),
//!     json!({"name": "Joe", "age": 10}).as_object().cloned().unwrap(),
//! );
//! let schemas = combine_schemas([version_schemas([person]).unwrap()]);
//!
//! let options = ValidateOptions::new();
//! assert!(validate(&schemas, "person", "1.0.0", &json!({"name": "Ann", "age": 3}), &options).is_ok());
//!
//! let err = assert_schema(&schemas, "person", "1.0.0", json!({"age": 3}), &AssertOptions::new())
//!     .unwrap_err();
//! assert!(err.to_string().contains("data.name is required"));
//! ```

mod assert;
mod bridge;
mod engine;
mod error;

pub use assert::{AssertOptions, OmitSections, assert_by_schema, assert_schema, stable_json};
pub use bridge::{CompiledSchema, FieldError, bridge_document, compile};
pub use engine::{ValidateOptions, validate, validate_by_schema};
pub use error::{AssertError, BridgeError, SchemaError, ValidationErrors};
