//! Replacement of dynamic values with format defaults.
//!
//! Values such as timestamps and generated ids differ between runs. Before
//! comparing an object with a stored snapshot, every string whose property
//! format has a default value in the [`FormatDefaults`] table is replaced
//! with that default.

use schema_tools_core::{
    FormatDefaults, PlainObject, PrimitiveType, Properties, PropertyDescriptor, SchemaCollection,
    SchemaDocument,
};
use schema_tools_validate::{AssertOptions, assert_schema};
use serde_json::Value;
use tracing::debug;

use crate::error::{RegistryError, Result};

/// Returns a copy of `object` with dynamic-format values replaced.
///
/// Only properties present in the object are touched. Arrays of strings
/// with a dynamic item format have every entry replaced; arrays of inline
/// objects and nested objects are sanitized recursively.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use schema_tools_registry::sanitize_by_schema;
/// use serde_json::json;
///
/// let doc = SchemaDocument::new("Event")
///     .with_property("at", PropertyDescriptor::of(PrimitiveType::String).with_format("date-time"))
///     .with_property("kind", PropertyDescriptor::of(PrimitiveType::String));
///
/// let mut defaults = FormatDefaults::new();
/// defaults.insert("date-time".into(), json!("2000-01-01T00:00:00Z"));
///
/// let object = json!({"at": "2024-05-06T07:08:09Z", "kind": "click"});
/// let clean = sanitize_by_schema(&doc, Some(&defaults), object.as_object().unwrap());
/// assert_eq!(clean["at"], "2000-01-01T00:00:00Z");
/// assert_eq!(clean["kind"], "click");
/// ```
pub fn sanitize_by_schema(
    schema: &SchemaDocument,
    defaults: Option<&FormatDefaults>,
    object: &PlainObject,
) -> PlainObject {
    match defaults {
        Some(defaults) => sanitize_properties(&schema.properties, defaults, object),
        None => object.clone(),
    }
}

/// Asserts `object` against a named schema version, then sanitizes it.
///
/// # Errors
///
/// [`RegistryError::AssertError`] if the schema is missing or the object
/// violates it, and [`RegistryError::NotAnObject`] for non-object input.
pub fn sanitize(
    collection: &SchemaCollection,
    defaults: Option<&FormatDefaults>,
    name: &str,
    version: &str,
    object: Value,
    options: &AssertOptions<'_>,
) -> Result<Value> {
    let object = assert_schema(collection, name, version, object, options)?;
    let Some(map) = object.as_object() else {
        return Err(RegistryError::NotAnObject(kind_of(&object).to_string()));
    };
    let schema = collection
        .get(name, version)
        .ok_or_else(|| RegistryError::MissingSchema {
            name: name.to_string(),
            version: version.to_string(),
        })?;

    Ok(Value::Object(sanitize_by_schema(&schema.schema, defaults, map)))
}

fn sanitize_properties(
    properties: &Properties,
    defaults: &FormatDefaults,
    object: &PlainObject,
) -> PlainObject {
    let mut result = object.clone();

    for (key, property) in properties {
        let Some(value) = object.get(key) else {
            continue;
        };

        let replaced = match value {
            Value::Array(list) => sanitize_array(key, property, defaults, list),
            Value::String(_) => dynamic_default(property, defaults).cloned(),
            Value::Object(nested) => property
                .properties
                .as_ref()
                .map(|props| Value::Object(sanitize_properties(props, defaults, nested))),
            _ => None,
        };

        if let Some(replaced) = replaced {
            result.insert(key.clone(), replaced);
        }
    }

    result
}

fn sanitize_array(
    key: &str,
    property: &PropertyDescriptor,
    defaults: &FormatDefaults,
    list: &[Value],
) -> Option<Value> {
    if !property.property_type.allows(PrimitiveType::Array) {
        return None;
    }
    let items = property.items.as_deref()?;

    if items.property_type.allows(PrimitiveType::String) {
        let default = dynamic_default(items, defaults)?;
        debug!(property = %key, "replacing dynamic string array entries");
        return Some(Value::Array(vec![default.clone(); list.len()]));
    }

    let item_props = items.properties.as_ref()?;
    let sanitized = list
        .iter()
        .map(|entry| match entry {
            Value::Object(entry) => Value::Object(sanitize_properties(item_props, defaults, entry)),
            other => other.clone(),
        })
        .collect();
    Some(Value::Array(sanitized))
}

fn dynamic_default<'d>(property: &PropertyDescriptor, defaults: &'d FormatDefaults) -> Option<&'d Value> {
    if !property.property_type.allows(PrimitiveType::String) {
        return None;
    }
    property.format.as_ref().and_then(|format| defaults.get(format))
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_tools_core::PropertyType;
    use serde_json::json;

    fn object(value: Value) -> PlainObject {
        value.as_object().cloned().unwrap()
    }

    fn defaults() -> FormatDefaults {
        let mut defaults = FormatDefaults::new();
        defaults.insert("name".into(), json!("Buddy"));
        defaults.insert("uuid".into(), json!("ffffffff-ffff-ffff-ffff-ffffffffffff"));
        defaults
    }

    fn string_with(format: &str) -> PropertyDescriptor {
        PropertyDescriptor::of(PrimitiveType::String).with_format(format)
    }

    #[test]
    fn test_empty_object_stays_empty() {
        let doc = SchemaDocument::new("TestSchema")
            .with_property("createdAt", string_with("date-time"))
            .with_property("ids", PropertyDescriptor::array_of(string_with("uuid")));
        let result = sanitize_by_schema(&doc, Some(&defaults()), &PlainObject::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_string_array() {
        let doc = SchemaDocument::new("TestSchema")
            .with_property("names", PropertyDescriptor::array_of(string_with("name")));
        let result = sanitize_by_schema(&doc, Some(&defaults()), &object(json!({"names": ["Joe", "Mary"]})));
        assert_eq!(Value::Object(result), json!({"names": ["Buddy", "Buddy"]}));
    }

    #[test]
    fn test_array_of_objects() {
        let item = PropertyDescriptor::of(PrimitiveType::Object).with_property("name", string_with("name"));
        let doc = SchemaDocument::new("TestSchema")
            .with_property("names", PropertyDescriptor::array_of(item));
        let input = object(json!({"names": [{"name": "Joe"}, {"name": "Mary", "age": 3}]}));
        let result = sanitize_by_schema(&doc, Some(&defaults()), &input);
        assert_eq!(
            Value::Object(result),
            json!({"names": [{"name": "Buddy"}, {"name": "Buddy", "age": 3}]})
        );
    }

    #[test]
    fn test_nullable_array_and_null_value() {
        let mut ids = PropertyDescriptor::array_of(string_with("uuid"));
        ids.property_type = PropertyType::Union(vec![PrimitiveType::Array, PrimitiveType::Null]);
        let doc = SchemaDocument::new("TestSchema").with_property("ids", ids);

        let result = sanitize_by_schema(&doc, Some(&defaults()), &object(json!({"ids": ["a"]})));
        assert_eq!(result["ids"], json!(["ffffffff-ffff-ffff-ffff-ffffffffffff"]));

        let result = sanitize_by_schema(&doc, Some(&defaults()), &object(json!({"ids": null})));
        assert_eq!(result["ids"], Value::Null);
    }

    #[test]
    fn test_nested_object() {
        let owner = PropertyDescriptor::of(PrimitiveType::Object)
            .with_property("id", string_with("uuid"))
            .with_property("label", PropertyDescriptor::of(PrimitiveType::String));
        let doc = SchemaDocument::new("Pet").with_property("owner", owner);
        let input = object(json!({"owner": {"id": "1234", "label": "me"}}));
        let result = sanitize_by_schema(&doc, Some(&defaults()), &input);
        assert_eq!(
            result["owner"],
            json!({"id": "ffffffff-ffff-ffff-ffff-ffffffffffff", "label": "me"})
        );
    }

    #[test]
    fn test_non_string_and_unknown_format_untouched() {
        let doc = SchemaDocument::new("TestSchema")
            .with_property("name", string_with("name"))
            .with_property("when", string_with("date-time"));
        let input = object(json!({"name": 42, "when": "yesterday"}));
        assert_eq!(sanitize_by_schema(&doc, Some(&defaults()), &input), input);
        assert_eq!(sanitize_by_schema(&doc, None, &input), input);
    }
}
