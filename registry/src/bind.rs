//! The bound registry API.
//!
//! [`bind`] merges any number of schema collections and format tables into a
//! [`BoundApi`]. Every operation on it is pre-applied to the merged
//! collection and formats, so callers pass only a name, a version and an
//! object.
//!
//! On name collisions the later source wins. Each replaced schema group or
//! format is traced at `debug` level.

use schema_tools_core::{
    CustomFormats, DialectError, FormatDefaults, FormatDetectors, PlainObject, SchemaCollection,
    check_collection, detectors, format_defaults,
};
use schema_tools_validate::{
    AssertError, AssertOptions, ValidateOptions, ValidationErrors, assert_schema, validate,
};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::{fill, sanitize, trim};

/// One input to [`bind`]: a schema collection and optional custom formats.
#[derive(Debug, Clone, Default)]
pub struct BindSource {
    pub schemas: SchemaCollection,
    pub formats: CustomFormats,
}

impl BindSource {
    pub fn new(schemas: SchemaCollection) -> Self {
        Self {
            schemas,
            formats: CustomFormats::new(),
        }
    }

    pub fn with_formats(mut self, formats: CustomFormats) -> Self {
        self.formats = formats;
        self
    }
}

/// Schema operations bound to one merged collection and format table.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use schema_tools_core::*;
/// use schema_tools_registry::{BindSource, bind};
/// use serde_json::json;
///
/// let person = ObjectSchema::new(
///     SemanticVersion::new(1, 0, 0),
///     SchemaDocument::new("Person")
///         .with_property("name", PropertyDescriptor::of(PrimitiveType::String).with_format("name"))
///         .with_required(["name"]),
///     json!({"name": "Joe"}).as_object().cloned().unwrap(),
/// );
/// let mut formats = CustomFormats::new();
/// formats.insert(
///     "name".into(),
///     CustomFormat::new("name", "Capitalized", Regex::new("^[A-Z][a-z]+$").unwrap())
///         .with_default("Buddy"),
/// );
///
/// let api = bind([
///     BindSource::new(combine_schemas([version_schemas([person]).unwrap()])).with_formats(formats),
/// ]);
///
/// assert!(api.has_schema("Person", "1.0.0"));
/// assert!(api.validate("person", "1.0.0", &json!({"name": "joe"})).is_err());
/// assert_eq!(api.sanitize("person", "1.0.0", json!({"name": "Ann"})).unwrap(), json!({"name": "Buddy"}));
/// ```
#[derive(Debug, Clone)]
pub struct BoundApi {
    schemas: SchemaCollection,
    formats: CustomFormats,
    detectors: FormatDetectors,
    defaults: FormatDefaults,
    greedy: bool,
}

/// Merges `sources` left to right into a [`BoundApi`].
pub fn bind(sources: impl IntoIterator<Item = BindSource>) -> BoundApi {
    let mut schemas = SchemaCollection::new();
    let mut formats = CustomFormats::new();

    for source in sources {
        schemas.merge(source.schemas);
        for (key, format) in source.formats {
            if formats.insert(key.clone(), format).is_some() {
                debug!(format = %key, "replaced existing format");
            }
        }
    }

    let detectors = detectors(&formats);
    let defaults = format_defaults(&formats);
    debug!(schemas = schemas.len(), formats = formats.len(), "bound schema api");

    BoundApi {
        schemas,
        formats,
        detectors,
        defaults,
        greedy: true,
    }
}

impl BoundApi {
    /// Sets whether validation reports every error or the first per field.
    pub fn with_greedy(mut self, greedy: bool) -> Self {
        self.greedy = greedy;
        self
    }

    pub fn schemas(&self) -> &SchemaCollection {
        &self.schemas
    }

    pub fn formats(&self) -> &CustomFormats {
        &self.formats
    }

    pub fn defaults(&self) -> &FormatDefaults {
        &self.defaults
    }

    /// Validation options wired to the merged formats and collection.
    pub fn validate_options(&self) -> ValidateOptions<'_> {
        ValidateOptions::new()
            .with_formats(&self.detectors)
            .with_references(&self.schemas)
            .greedy(self.greedy)
    }

    pub fn validate(&self, name: &str, version: &str, object: &Value) -> std::result::Result<(), ValidationErrors> {
        validate(&self.schemas, name, version, object, &self.validate_options())
    }

    /// Asserts with default options; returns the object when it conforms.
    pub fn assert_schema(&self, name: &str, version: &str, object: Value) -> std::result::Result<Value, AssertError> {
        self.assert_schema_with(name, version, object, &AssertOptions::new())
    }

    /// Asserts with caller options. The bound formats, collection and greedy
    /// flag replace whatever validation settings `options` carries.
    pub fn assert_schema_with(
        &self,
        name: &str,
        version: &str,
        object: Value,
        options: &AssertOptions<'_>,
    ) -> std::result::Result<Value, AssertError> {
        let mut options = options.clone();
        options.validate = self.validate_options();
        assert_schema(&self.schemas, name, version, object, &options)
    }

    /// Asserts, then replaces dynamic-format values with format defaults.
    pub fn sanitize(&self, name: &str, version: &str, object: Value) -> Result<Value> {
        let options = AssertOptions::new().with_validate(self.validate_options());
        sanitize::sanitize(&self.schemas, Some(&self.defaults), name, version, object, &options)
    }

    pub fn trim(&self, name: &str, version: &str, object: &Value) -> Result<Value> {
        trim::trim(&self.schemas, name, version, object)
    }

    pub fn fill(&self, name: &str, version: &str, object: &Value) -> Result<Value> {
        fill::fill(&self.schemas, name, version, object)
    }

    pub fn get_example(&self, name: &str, version: &str) -> Option<&PlainObject> {
        self.schemas.get_example(name, version)
    }

    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.schema_names()
    }

    pub fn has_schema(&self, name: &str, version: &str) -> bool {
        self.schemas.has_schema(name, version)
    }

    pub fn schema_versions(&self, name: &str) -> Vec<String> {
        self.schemas.schema_versions(name)
    }

    /// Validates every example against its own schema version.
    pub fn check_examples(&self) -> Vec<String> {
        check_examples(&self.schemas, &self.validate_options())
    }

    /// Structural dialect checks over the merged collection.
    pub fn check(&self) -> Vec<DialectError> {
        check_collection(&self.schemas)
    }
}

/// Validates each entry's example against its own schema.
///
/// Failures are reported as `name@version: error`, one line per error.
pub fn check_examples(collection: &SchemaCollection, options: &ValidateOptions<'_>) -> Vec<String> {
    let mut failures = Vec::new();
    for (name, schema) in collection.object_schemas() {
        let version = schema.version.to_string();
        let example = Value::Object(schema.example.clone());
        if let Err(errors) = validate(collection, name, &version, &example, options) {
            failures.extend(errors.iter().map(|error| format!("{name}@{version}: {error}")));
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use schema_tools_core::{
        CustomFormat, ObjectSchema, PrimitiveType, PropertyDescriptor, SchemaDocument,
        SemanticVersion, combine_schemas, version_schemas,
    };
    use serde_json::json;

    fn collection(title: &str, example: Value) -> SchemaCollection {
        let schema = ObjectSchema::new(
            SemanticVersion::new(1, 0, 0),
            SchemaDocument::new(title)
                .with_property("id", PropertyDescriptor::of(PrimitiveType::String).with_format("code"))
                .with_required(["id"]),
            example.as_object().cloned().unwrap(),
        );
        combine_schemas([version_schemas([schema]).unwrap()])
    }

    fn code_format(pattern: &str, default: &str) -> CustomFormats {
        let mut formats = CustomFormats::new();
        formats.insert(
            "code".into(),
            CustomFormat::new("code", "Code", Regex::new(pattern).unwrap()).with_default(default),
        );
        formats
    }

    #[test]
    fn test_later_source_wins() {
        let api = bind([
            BindSource::new(collection("Item", json!({"id": "a"}))).with_formats(code_format("^a+$", "a")),
            BindSource::new(collection("Item", json!({"id": "b"}))).with_formats(code_format("^b+$", "b")),
        ]);
        assert_eq!(api.get_example("item", "1.0.0"), json!({"id": "b"}).as_object());
        assert!(api.validate("item", "1.0.0", &json!({"id": "bbb"})).is_ok());
        assert!(api.validate("item", "1.0.0", &json!({"id": "aaa"})).is_err());
        assert_eq!(api.defaults()["code"], json!("b"));
    }

    #[test]
    fn test_check_examples_reports_failures() {
        let api = bind([
            BindSource::new(collection("Good", json!({"id": "aa"}))),
            BindSource::new(collection("Bad", json!({"id": "zz"}))),
            BindSource::default().with_formats(code_format("^a+$", "a")),
        ]);
        assert_eq!(api.check_examples(), vec!["bad@1.0.0: data.id must be code format"]);
        assert!(api.check().is_empty());
    }

    #[test]
    fn test_greedy_flag_flows_into_options() {
        let api = bind([BindSource::new(collection("Item", json!({"id": "a"})))]).with_greedy(false);
        assert!(!api.validate_options().greedy);
        assert!(api.validate_options().references.is_some());
    }
}
