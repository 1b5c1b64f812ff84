//! Insertion of declared default values for missing properties.

use schema_tools_core::{ObjectSchema, SchemaCollection};
use serde_json::Value;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::sanitize::kind_of;

/// Returns a copy of `object` with every missing schema property set to its
/// `defaultValue`.
///
/// Only top-level properties are filled. Existing values are never
/// overwritten.
///
/// # Errors
///
/// [`RegistryError::MissingDefault`] naming the first missing property that
/// has no default, and [`RegistryError::NotAnObject`] for non-object input.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use schema_tools_registry::fill_by_schema;
/// use serde_json::json;
///
/// let schema = ObjectSchema::new(
///     SemanticVersion::new(1, 0, 0),
///     SchemaDocument::new("Test")
///         .with_property("first", PropertyDescriptor::of(PrimitiveType::Number))
///         .with_property("second", PropertyDescriptor::of(PrimitiveType::Number).with_default(99))
///         .with_required(["first", "second"]),
///     json!({"first": 42, "second": 43}).as_object().cloned().unwrap(),
/// );
///
/// let filled = fill_by_schema(&schema, &json!({"first": 1})).unwrap();
/// assert_eq!(filled, json!({"first": 1, "second": 99}));
///
/// let err = fill_by_schema(&schema, &json!({})).unwrap_err();
/// assert_eq!(err.to_string(), r#"Do not know how to get default value for property "first""#);
/// ```
pub fn fill_by_schema(schema: &ObjectSchema, object: &Value) -> Result<Value> {
    let Value::Object(map) = object else {
        return Err(RegistryError::NotAnObject(kind_of(object).to_string()));
    };

    let mut filled = map.clone();
    for (key, property) in &schema.schema.properties {
        if filled.contains_key(key) {
            continue;
        }
        let Some(default) = &property.default_value else {
            return Err(RegistryError::MissingDefault(key.clone()));
        };
        debug!(property = %key, "filling missing property with default");
        filled.insert(key.clone(), default.clone());
    }

    Ok(Value::Object(filled))
}

/// Fills `object` against a named schema version.
pub fn fill(collection: &SchemaCollection, name: &str, version: &str, object: &Value) -> Result<Value> {
    let schema = collection
        .get(name, version)
        .ok_or_else(|| RegistryError::MissingSchema {
            name: name.to_string(),
            version: version.to_string(),
        })?;
    fill_by_schema(schema, object)
}
