//! Assertions: validation that fails loudly with a descriptive error.
//!
//! Use these at pipeline boundaries where a non-conforming object should stop
//! processing. Before validating, selected fields can be replaced with the
//! values from the schema's example to ignore non-deterministic data such as
//! timestamps or generated ids.

use schema_tools_core::{PlainObject, SchemaCollection, SchemaDocument};
use serde_json::{Map, Value};

use crate::{AssertError, SchemaError, ValidateOptions, validate_by_schema};

/// Sections left out of the [`SchemaError`] message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OmitSections {
    pub errors: bool,
    pub object: bool,
    pub example: bool,
}

/// Options for [`assert_by_schema`] and [`assert_schema`].
#[derive(Debug, Clone, Default)]
pub struct AssertOptions<'a> {
    pub validate: ValidateOptions<'a>,
    /// Dotted paths (`"people.0.id"`) replaced with the example's values.
    pub substitutions: Vec<String>,
    pub omit: OmitSections,
    /// Label shown in the message title, such as `person@1.0.0`.
    pub label: Option<String>,
    pub schema_version: Option<String>,
}

impl<'a> AssertOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validate(mut self, validate: ValidateOptions<'a>) -> Self {
        self.validate = validate;
        self
    }

    pub fn greedy(mut self, greedy: bool) -> Self {
        self.validate.greedy = greedy;
        self
    }

    pub fn substitute(mut self, path: &str) -> Self {
        self.substitutions.push(path.to_string());
        self
    }

    pub fn omit(mut self, omit: OmitSections) -> Self {
        self.omit = omit;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Validates `object` and returns it unchanged when it conforms.
///
/// # Errors
///
/// Returns a [`SchemaError`] carrying the error list, the object that was
/// validated (after substitutions), the example and the schema title.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use schema_tools_validate::{AssertOptions, assert_by_schema};
/// use serde_json::json;
///
/// let doc = SchemaDocument::new("Person")
///     .with_property("age", PropertyDescriptor::of(PrimitiveType::Integer).with_minimum(0))
///     .with_required(["age"]);
/// let example = json!({"age": 10}).as_object().cloned().unwrap();
///
/// // "age" is taken from the example before validating
/// let options = AssertOptions::new().substitute("age");
/// let object = assert_by_schema(&doc, &example, json!({"age": -1}), &options).unwrap();
/// assert_eq!(object, json!({"age": -1}));
///
/// let err = assert_by_schema(&doc, &example, json!({"age": -1}), &AssertOptions::new()).unwrap_err();
/// assert_eq!(err.errors, vec!["data.age is less than minimum"]);
/// assert!(err.message.starts_with("Schema violated"));
/// ```
pub fn assert_by_schema(
    schema: &SchemaDocument,
    example: &PlainObject,
    object: Value,
    options: &AssertOptions<'_>,
) -> Result<Value, SchemaError> {
    let substituted = (!options.substitutions.is_empty())
        .then(|| substitute(&object, example, &options.substitutions));
    let checked = substituted.as_ref().unwrap_or(&object);

    let errors = match validate_by_schema(schema, checked, &options.validate) {
        Ok(()) => return Ok(object),
        Err(errors) => errors.into_inner(),
    };

    let checked = substituted.unwrap_or(object);
    let message = compose_message(&errors, &checked, example, options);

    Err(SchemaError {
        message,
        errors,
        object: checked,
        example: example.clone(),
        schema_name: schema.title.clone(),
        schema_version: options.schema_version.clone(),
    })
}

/// Asserts `object` against a named schema version in `collection`.
///
/// The message title is labelled `<name>@<version>` and `see` labels resolve
/// against `collection`.
///
/// # Errors
///
/// [`AssertError::MissingSchema`] if the schema version does not exist, and
/// [`AssertError::Violated`] if the object does not conform.
pub fn assert_schema(
    collection: &SchemaCollection,
    name: &str,
    version: &str,
    object: Value,
    options: &AssertOptions<'_>,
) -> Result<Value, AssertError> {
    let Some(target) = collection.get(name, version) else {
        return Err(AssertError::MissingSchema {
            name: name.to_string(),
            version: version.to_string(),
        });
    };

    let mut options = options.clone();
    options.label = Some(format!("{name}@{version}"));
    options.schema_version = Some(version.to_string());
    if options.validate.references.is_none() {
        options.validate.references = Some(collection);
    }

    Ok(assert_by_schema(&target.schema, &target.example, object, &options)?)
}

fn compose_message(errors: &[String], object: &Value, example: &PlainObject, options: &AssertOptions<'_>) -> String {
    let mut parts = vec![match &options.label {
        Some(label) => format!("Schema {label} violated"),
        None => "Schema violated".to_string(),
    }];

    if !options.omit.errors {
        parts.push(String::new());
        parts.push("Errors:".to_string());
        parts.extend(errors.iter().cloned());
    }
    if !options.omit.object {
        parts.push(String::new());
        parts.push("Current object:".to_string());
        parts.push(stable_json(object));
    }
    if !options.omit.example {
        parts.push(String::new());
        parts.push("Expected object like this:".to_string());
        parts.push(stable_json(&Value::Object(example.clone())));
    }

    parts.join("\n")
}

/// Pretty JSON with object keys sorted at every level.
pub fn stable_json(value: &Value) -> String {
    fn sorted(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut out = Map::new();
                for key in keys {
                    out.insert(key.clone(), sorted(&map[key.as_str()]));
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
            other => other.clone(),
        }
    }

    format!("{:#}", sorted(value))
}

/// Copies each dotted path from `example` into a clone of `object`. Paths
/// missing from the example are removed from the clone.
fn substitute(object: &Value, example: &PlainObject, paths: &[String]) -> Value {
    let mut cloned = object.clone();
    for path in paths {
        let segments: Vec<&str> = path.split('.').collect();
        match lookup(example, &segments) {
            Some(value) => set_path(&mut cloned, &segments, value.clone()),
            None => remove_path(&mut cloned, &segments),
        }
    }
    cloned
}

fn lookup<'v>(example: &'v PlainObject, segments: &[&str]) -> Option<&'v Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = example.get(*first)?;
    for segment in rest {
        current = child(current, segment)?;
    }
    Some(current)
}

fn child<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn set_path(target: &mut Value, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for (i, segment) in parents.iter().enumerate() {
        let next_is_index = segments[i + 1].parse::<usize>().is_ok();
        let fresh = || {
            if next_is_index {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            }
        };
        current = match current {
            Value::Object(map) => map.entry(segment.to_string()).or_insert_with(fresh),
            Value::Array(items) => {
                let Ok(index) = segment.parse::<usize>() else {
                    return;
                };
                if index >= items.len() {
                    items.resize(index, Value::Null);
                    items.push(fresh());
                }
                &mut items[index]
            }
            _ => return,
        };
        if current.is_null() {
            *current = fresh();
        }
    }

    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
        }
        Value::Array(items) => {
            if let Ok(index) = last.parse::<usize>() {
                if index >= items.len() {
                    items.resize(index + 1, Value::Null);
                }
                items[index] = value;
            }
        }
        _ => {}
    }
}

fn remove_path(target: &mut Value, segments: &[&str]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;
    for segment in parents {
        current = match current {
            Value::Object(map) => match map.get_mut(*segment) {
                Some(next) => next,
                None => return,
            },
            Value::Array(items) => match segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                Some(next) => next,
                None => return,
            },
            _ => return,
        };
    }

    if let Value::Object(map) = current {
        map.shift_remove(*last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema_tools_core::{
        ObjectSchema, PrimitiveType, PropertyDescriptor, SemanticVersion, combine_schemas,
        version_schemas,
    };
    use serde_json::json;

    fn person() -> ObjectSchema {
        ObjectSchema::new(
            SemanticVersion::new(1, 0, 0),
            SchemaDocument::new("Person")
                .with_property("name", PropertyDescriptor::of(PrimitiveType::String))
                .with_property(
                    "age",
                    PropertyDescriptor::of(PrimitiveType::Integer).with_minimum(0),
                )
                .with_required(["name", "age"])
                .closed(),
            json!({"name": "Joe", "age": 10}).as_object().cloned().unwrap(),
        )
    }

    fn collection() -> SchemaCollection {
        combine_schemas([version_schemas([person()]).unwrap()])
    }

    #[test]
    fn test_substitution_avoids_violation() {
        let object = json!({"name": "Joe", "age": -1});
        let options = AssertOptions::new().substitute("age");
        let result = assert_schema(&collection(), "person", "1.0.0", object.clone(), &options).unwrap();
        assert_eq!(result, object);
    }

    #[test]
    fn test_violation_message_layout() {
        let err = assert_schema(
            &collection(),
            "person",
            "1.0.0",
            json!({"name": "Joe", "age": -1}),
            &AssertOptions::new(),
        )
        .unwrap_err();

        let AssertError::Violated(err) = err else {
            panic!("expected a violation, got {err:?}");
        };
        let expected = [
            "Schema person@1.0.0 violated",
            "",
            "Errors:",
            "data.age is less than minimum",
            "",
            "Current object:",
            "{\n  \"age\": -1,\n  \"name\": \"Joe\"\n}",
            "",
            "Expected object like this:",
            "{\n  \"age\": 10,\n  \"name\": \"Joe\"\n}",
        ]
        .join("\n");
        assert_eq!(err.message, expected);
        assert_eq!(err.schema_name, "Person");
        assert_eq!(err.schema_version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn test_omitted_sections() {
        let options = AssertOptions::new().omit(OmitSections {
            errors: false,
            object: true,
            example: true,
        });
        let err = assert_schema(&collection(), "person", "1.0.0", json!({"name": "Joe"}), &options).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema person@1.0.0 violated\n\nErrors:\ndata.age is required"
        );
    }

    #[test]
    fn test_missing_schema_is_an_error() {
        let err = assert_schema(&collection(), "person", "9.0.0", json!({}), &AssertOptions::new()).unwrap_err();
        assert_eq!(
            err,
            AssertError::MissingSchema {
                name: "person".into(),
                version: "9.0.0".into()
            }
        );
        assert_eq!(err.to_string(), "Could not find schema person@9.0.0");
    }

    #[test]
    fn test_error_object_is_the_substituted_clone() {
        let options = AssertOptions::new().substitute("name");
        let err = assert_schema(
            &collection(),
            "person",
            "1.0.0",
            json!({"name": "Ann", "age": -5}),
            &options,
        )
        .unwrap_err();
        let AssertError::Violated(err) = err else {
            panic!("expected a violation");
        };
        assert_eq!(err.object, json!({"name": "Joe", "age": -5}));
    }

    #[test]
    fn test_substitute_nested_paths() {
        let example = json!({"people": [{"id": "fixed"}], "meta": {"at": 1}})
            .as_object()
            .cloned()
            .unwrap();
        let object = json!({"people": [{"id": "random", "x": 1}], "meta": {"at": 99, "gone": true}});
        let paths = vec![
            "people.0.id".to_string(),
            "meta.at".to_string(),
            "meta.gone".to_string(),
        ];
        assert_eq!(
            substitute(&object, &example, &paths),
            json!({"people": [{"id": "fixed", "x": 1}], "meta": {"at": 1}})
        );
    }

    #[test]
    fn test_substitute_builds_missing_array_path() {
        let example = json!({"people": [{"id": "fixed"}], "n": 1})
            .as_object()
            .cloned()
            .unwrap();
        let paths = vec!["people.0.id".to_string()];
        assert_eq!(
            substitute(&json!({"n": -1}), &example, &paths),
            json!({"n": -1, "people": [{"id": "fixed"}]})
        );

        let example = json!({"people": [{}, {"id": "x"}]}).as_object().cloned().unwrap();
        let paths = vec!["people.1.id".to_string()];
        assert_eq!(
            substitute(&json!({"people": []}), &example, &paths),
            json!({"people": [null, {"id": "x"}]})
        );
    }

    #[test]
    fn test_error_object_carries_substituted_nested_value() {
        let doc = SchemaDocument::new("Team").with_property(
            "n",
            PropertyDescriptor::of(PrimitiveType::Integer).with_minimum(0),
        );
        let example = json!({"people": [{"id": "fixed"}], "n": 1})
            .as_object()
            .cloned()
            .unwrap();
        let options = AssertOptions::new().substitute("people.0.id");

        let err = assert_by_schema(&doc, &example, json!({"n": -1}), &options).unwrap_err();
        assert_eq!(err.object, json!({"n": -1, "people": [{"id": "fixed"}]}));
        assert_eq!(err.errors, vec!["data.n is less than minimum"]);
    }

    #[test]
    fn test_stable_json_sorts_nested_keys() {
        let value = json!({"b": {"z": 1, "a": 2}, "a": [ {"y": 1, "x": 2} ]});
        assert_eq!(
            stable_json(&value),
            "{\n  \"a\": [\n    {\n      \"x\": 2,\n      \"y\": 1\n    }\n  ],\n  \"b\": {\n    \"a\": 2,\n    \"z\": 1\n  }\n}"
        );
    }
}
