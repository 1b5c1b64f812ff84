//! Removal of properties a schema does not declare.

use schema_tools_core::{ObjectSchema, PlainObject, Properties, SchemaCollection};
use serde_json::Value;

use crate::error::{RegistryError, Result};
use crate::sanitize::kind_of;

/// Returns a copy of `object` keeping only keys declared by the schema.
///
/// Nested objects and array entries whose property declares inline
/// `properties` are trimmed the same way.
///
/// # Errors
///
/// Returns [`RegistryError::NotAnObject`] when `object` is not an object.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use schema_tools_registry::trim_by_schema;
/// use serde_json::json;
///
/// let schema = ObjectSchema::new(
///     SemanticVersion::new(1, 0, 0),
///     SchemaDocument::new("Test").with_property("first", PropertyDescriptor::of(PrimitiveType::Number)),
///     json!({"first": 42}).as_object().cloned().unwrap(),
/// );
/// let trimmed = trim_by_schema(&schema, &json!({"first": 1, "second": 2})).unwrap();
/// assert_eq!(trimmed, json!({"first": 1}));
/// ```
pub fn trim_by_schema(schema: &ObjectSchema, object: &Value) -> Result<Value> {
    let Value::Object(map) = object else {
        return Err(RegistryError::NotAnObject(kind_of(object).to_string()));
    };
    Ok(Value::Object(trim_properties(&schema.schema.properties, map)))
}

/// Trims `object` against a named schema version.
pub fn trim(collection: &SchemaCollection, name: &str, version: &str, object: &Value) -> Result<Value> {
    let schema = collection
        .get(name, version)
        .ok_or_else(|| RegistryError::MissingSchema {
            name: name.to_string(),
            version: version.to_string(),
        })?;
    trim_by_schema(schema, object)
}

fn trim_properties(properties: &Properties, object: &PlainObject) -> PlainObject {
    object
        .iter()
        .filter_map(|(key, value)| {
            let property = properties.get(key)?;
            let value = match (value, &property.properties, &property.items) {
                (Value::Object(nested), Some(props), _) => Value::Object(trim_properties(props, nested)),
                (Value::Array(list), _, Some(items)) => match &items.properties {
                    Some(props) => Value::Array(
                        list.iter()
                            .map(|entry| match entry {
                                Value::Object(entry) => Value::Object(trim_properties(props, entry)),
                                other => other.clone(),
                            })
                            .collect(),
                    ),
                    None => value.clone(),
                },
                _ => value.clone(),
            };
            Some((key.clone(), value))
        })
        .collect()
}
