//! Validation entry points.
//!
//! Validation failures are values, not panics or errors to propagate: both
//! [`validate_by_schema`] and [`validate`] return the list of problems so they
//! compose inside larger pipelines. A missing schema is reported the same
//! way.

use schema_tools_core::{FormatDetectors, SchemaCollection, SchemaDocument, normalize_name};
use serde_json::Value;
use tracing::warn;

use crate::{FieldError, ValidationErrors, compile};

const ROOT_FIELD: &str = "data";
const ADDITIONAL_PROPERTIES: &str = "has additional properties";

/// Formats, `$ref` resolution and error mode for one validation.
///
/// Greedy mode (the default) reports every violation; non-greedy mode keeps
/// the first violation per field.
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions<'a> {
    pub formats: Option<&'a FormatDetectors>,
    /// Collection used to resolve `see` labels.
    pub references: Option<&'a SchemaCollection>,
    pub greedy: bool,
}

impl Default for ValidateOptions<'_> {
    fn default() -> Self {
        Self {
            formats: None,
            references: None,
            greedy: true,
        }
    }
}

impl<'a> ValidateOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(mut self, formats: &'a FormatDetectors) -> Self {
        self.formats = Some(formats);
        self
    }

    pub fn with_references(mut self, references: &'a SchemaCollection) -> Self {
        self.references = Some(references);
        self
    }

    pub fn greedy(mut self, greedy: bool) -> Self {
        self.greedy = greedy;
        self
    }
}

/// Validates `object` against a dialect document.
///
/// Errors are de-duplicated in first-seen order. When the root object has
/// properties the schema does not declare, the root "has additional
/// properties" error names them.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use schema_tools_validate::{ValidateOptions, validate_by_schema};
/// use serde_json::json;
///
/// let doc = SchemaDocument::new("Person")
///     .with_property("name", PropertyDescriptor::of(PrimitiveType::String))
///     .with_property("age", PropertyDescriptor::of(PrimitiveType::Integer))
///     .with_required(["name", "age"])
///     .closed();
///
/// let errors = validate_by_schema(&doc, &json!({"age": 10}), &ValidateOptions::new()).unwrap_err();
/// assert_eq!(errors.into_inner(), vec!["data.name is required"]);
///
/// let errors = validate_by_schema(
///     &doc,
///     &json!({"name": "test", "age": 1, "foo": "bar"}),
///     &ValidateOptions::new(),
/// )
/// .unwrap_err();
/// assert_eq!(errors.into_inner(), vec!["data has additional properties: foo"]);
/// ```
pub fn validate_by_schema(
    schema: &SchemaDocument,
    object: &Value,
    options: &ValidateOptions<'_>,
) -> Result<(), ValidationErrors> {
    let compiled = match compile(schema, options) {
        Ok(compiled) => compiled,
        Err(err) => {
            warn!(schema = %schema.title, error = %err, "schema failed to compile");
            return Err(ValidationErrors::from(vec![err.to_string()]));
        }
    };

    let raw = compiled.errors(object);
    if raw.is_empty() {
        return Ok(());
    }

    let mut unique: Vec<FieldError> = Vec::with_capacity(raw.len());
    for error in raw {
        if !unique.contains(&error) {
            unique.push(error);
        }
    }

    if !schema.properties.is_empty() {
        if let Some(root) = unique
            .iter_mut()
            .find(|e| e.field == ROOT_FIELD && e.message == ADDITIONAL_PROPERTIES)
        {
            let extra: Vec<&str> = object
                .as_object()
                .map(|map| {
                    map.keys()
                        .filter(|key| !schema.properties.contains_key(key.as_str()))
                        .map(String::as_str)
                        .collect()
                })
                .unwrap_or_default();
            root.message = format!("{ADDITIONAL_PROPERTIES}: {}", extra.join(", "));
        }
    }

    let mut messages: Vec<String> = Vec::with_capacity(unique.len());
    for error in unique {
        let message = error.to_string();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }
    Err(ValidationErrors::from(messages))
}

/// Validates `object` against a named schema version in `collection`.
///
/// An unknown name yields `["Missing schema <name>"]` and an unknown version
/// `["Missing schema <name>@<version>"]`. `see` labels resolve against
/// `collection` unless `options` names other references.
///
/// # Examples
///
/// ```
/// use schema_tools_core::SchemaCollection;
/// use schema_tools_validate::{ValidateOptions, validate};
/// use serde_json::json;
///
/// let empty = SchemaCollection::new();
/// let errors = validate(&empty, "Person", "1.0.0", &json!({}), &ValidateOptions::new()).unwrap_err();
/// assert_eq!(errors.into_inner(), vec!["Missing schema person"]);
/// ```
pub fn validate(
    collection: &SchemaCollection,
    name: &str,
    version: &str,
    object: &Value,
    options: &ValidateOptions<'_>,
) -> Result<(), ValidationErrors> {
    let name = normalize_name(name);

    let Some(versioned) = collection.get_versioned_schema(&name) else {
        return Err(ValidationErrors::from(vec![format!("Missing schema {name}")]));
    };
    let Some(schema) = versioned.get_str(version) else {
        return Err(ValidationErrors::from(vec![format!(
            "Missing schema {name}@{version}"
        )]));
    };

    let mut options = *options;
    if options.references.is_none() {
        options.references = Some(collection);
    }
    validate_by_schema(&schema.schema, object, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use schema_tools_core::{
        ObjectSchema, PlainObject, PrimitiveType, PropertyDescriptor, PropertyType,
        SemanticVersion, combine_schemas, version_schemas,
    };
    use serde_json::json;

    fn person() -> SchemaDocument {
        SchemaDocument::new("Person")
            .with_property(
                "name",
                PropertyDescriptor::of(PrimitiveType::String).with_format("name"),
            )
            .with_property(
                "age",
                PropertyDescriptor::of(PrimitiveType::Integer).with_minimum(0),
            )
            .with_required(["name", "age"])
            .closed()
    }

    fn errors(doc: &SchemaDocument, object: Value, options: &ValidateOptions<'_>) -> Vec<String> {
        validate_by_schema(doc, &object, options)
            .err()
            .map(ValidationErrors::into_inner)
            .unwrap_or_default()
    }

    #[test]
    fn test_valid_object_passes() {
        assert!(validate_by_schema(&person(), &json!({"name": "Joe", "age": 10}), &ValidateOptions::new()).is_ok());
    }

    #[test]
    fn test_null_root_is_accepted() {
        assert!(validate_by_schema(&person(), &Value::Null, &ValidateOptions::new()).is_ok());
    }

    #[test]
    fn test_wrong_type_and_minimum() {
        let found = errors(&person(), json!({"name": "Joe", "age": "ten"}), &ValidateOptions::new());
        assert_eq!(found, vec!["data.age is the wrong type"]);

        let found = errors(&person(), json!({"name": "Joe", "age": -1}), &ValidateOptions::new());
        assert_eq!(found, vec!["data.age is less than minimum"]);
    }

    #[test]
    fn test_additional_properties_lists_every_extra_key() {
        let found = errors(
            &person(),
            json!({"zed": 1, "name": "Joe", "age": 1, "alpha": 2}),
            &ValidateOptions::new(),
        );
        assert_eq!(found, vec!["data has additional properties: zed, alpha"]);
    }

    #[test]
    fn test_custom_format_applies() {
        let mut formats = FormatDetectors::new();
        formats.insert("name".into(), Regex::new("^[A-Z][a-z]+$").unwrap());
        let options = ValidateOptions::new().with_formats(&formats);

        assert!(validate_by_schema(&person(), &json!({"name": "Joe", "age": 1}), &options).is_ok());
        let found = errors(&person(), json!({"name": "joe", "age": 1}), &options);
        assert_eq!(found, vec!["data.name must be name format"]);
    }

    #[test]
    fn test_custom_format_allows_null_in_union() {
        let mut formats = FormatDetectors::new();
        formats.insert("foo".into(), Regex::new("^foo$").unwrap());
        let doc = SchemaDocument::new("Nullable")
            .with_property(
                "value",
                PropertyDescriptor::new(PropertyType::nullable(PrimitiveType::String)).with_format("foo"),
            )
            .with_required(["value"]);
        let options = ValidateOptions::new().with_formats(&formats);

        assert!(validate_by_schema(&doc, &json!({"value": null}), &options).is_ok());
        assert!(validate_by_schema(&doc, &json!({"value": "foo"}), &options).is_ok());
        assert_eq!(
            errors(&doc, json!({"value": "bar"}), &options),
            vec!["data.value must be foo format"]
        );
    }

    #[test]
    fn test_builtin_name_format_uses_declared_bounds() {
        let doc = SchemaDocument::new("Named").with_property(
            "name",
            PropertyDescriptor::of(PrimitiveType::String)
                .with_format("name")
                .with_length(Some(2), Some(4)),
        );
        let found = errors(&doc, json!({"name": "abcdef"}), &ValidateOptions::new());
        assert!(found.contains(&"data.name must be name format".to_string()));
        assert!(found.contains(&"data.name has longer length than allowed".to_string()));
        assert!(validate_by_schema(&doc, &json!({"name": "abc"}), &ValidateOptions::new()).is_ok());
    }

    #[test]
    fn test_pattern_properties() {
        let doc: SchemaDocument = serde_json::from_value(json!({
            "title": "Labels",
            "patternProperties": {"^x-": {"type": "string"}},
            "additionalProperties": false
        }))
        .unwrap();
        assert!(validate_by_schema(&doc, &json!({"x-one": "1"}), &ValidateOptions::new()).is_ok());
        assert_eq!(
            errors(&doc, json!({"x-one": 1}), &ValidateOptions::new()),
            vec!["data.x-one is the wrong type"]
        );
        assert_eq!(
            errors(&doc, json!({"y": "1"}), &ValidateOptions::new()),
            vec!["data has additional properties"]
        );
    }

    #[test]
    fn test_validate_reports_missing_version() {
        let schema = ObjectSchema::new(SemanticVersion::new(1, 0, 0), person(), PlainObject::new());
        let collection = combine_schemas([version_schemas([schema]).unwrap()]);

        let err = validate(&collection, "Person", "2.0.0", &json!({}), &ValidateOptions::new()).unwrap_err();
        assert_eq!(err.into_inner(), vec!["Missing schema person@2.0.0"]);

        let err = validate(&collection, "Person", "1.0.0", &json!({"age": 10}), &ValidateOptions::new()).unwrap_err();
        assert_eq!(err.into_inner(), vec!["data.name is required"]);
    }

    #[test]
    fn test_see_label_resolves_against_collection() {
        let person100 = ObjectSchema::new(SemanticVersion::new(1, 0, 0), person(), PlainObject::new());
        let team = SchemaDocument::new("Team").with_property(
            "lead",
            PropertyDescriptor::of(PrimitiveType::Object).with_see("person@1.0.0"),
        );
        let team100 = ObjectSchema::new(SemanticVersion::new(1, 0, 0), team, PlainObject::new());
        let collection = combine_schemas([
            version_schemas([person100]).unwrap(),
            version_schemas([team100]).unwrap(),
        ]);

        let options = ValidateOptions::new();
        assert!(validate(&collection, "team", "1.0.0", &json!({"lead": {"name": "Joe", "age": 3}}), &options).is_ok());

        let err = validate(&collection, "team", "1.0.0", &json!({"lead": {"name": "Joe"}}), &options).unwrap_err();
        assert_eq!(err.into_inner(), vec!["data.lead.age is required"]);

        let err = validate(&collection, "team", "1.0.0", &json!({}), &options).unwrap_err();
        assert_eq!(err.into_inner(), vec!["data.lead is required"]);
    }

    #[test]
    fn test_unknown_see_label_is_permissive() {
        let doc = SchemaDocument::new("Loose").with_property(
            "other",
            PropertyDescriptor::of(PrimitiveType::Object).with_see("ghost@9.9.9"),
        );
        let collection = SchemaCollection::new();
        let options = ValidateOptions::new().with_references(&collection);
        assert!(validate_by_schema(&doc, &json!({"other": {"anything": true}}), &options).is_ok());
    }
}
