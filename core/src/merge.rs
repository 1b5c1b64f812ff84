//! Schema evolution: deriving new schema versions from existing ones.
//!
//! Schema history is expressed as a chain of derivations rooted at the first
//! version instead of hand-writing each version in full. [`extend`] merges a
//! structural delta onto a base version; [`add_property`] adds individual
//! properties. Both clone their input and never mutate it, and both keep the
//! `required` list explicit and duplicate-free.
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
//!         .with_property("age", PropertyDescriptor::of(PrimitiveType::Integer))
//!         .with_required(["name", "age"]),
//!     json!({"name": "Joe", "age": 10}).as_object().cloned().unwrap(),
//! );
//!
//! let person110 = extend(
//!     &person100,
//!     &SchemaDelta::new(
//!         SchemaPatch::new()
//!             .with_property("title", PropertyDescriptor::of(PrimitiveType::String))
//!             .with_required(["title"]),
//!     )
//!     .with_example(json!({"title": "mr"}).as_object().cloned().unwrap()),
//! );
//!
//! assert_eq!(person110.version, SemanticVersion::new(1, 1, 0));
//! assert_eq!(required_names(&person110.schema), vec!["name", "age", "title"]);
//! assert_eq!(person110.example["title"], "mr");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    ObjectSchema, PlainObject, Properties, PropertyDescriptor, PropertyRequired, PropertyType,
    RequiredSpec, SchemaDocument, SeeRef, SemanticVersion, normalize_required, required_names,
};

/// Partial schema document merged onto a base document by [`extend`].
///
/// Unset fields keep the base value. `properties` merge key-wise, and a
/// `required` list is added to the base list rather than replacing it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<RequiredSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl SchemaPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_property(mut self, name: &str, property: PropertyDescriptor) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = Some(RequiredSpec::List(names.into_iter().map(Into::into).collect()));
        self
    }

    pub fn deprecated(mut self, message: &str) -> Self {
        self.deprecated = Some(message.to_string());
        self
    }
}

/// Changes applied by [`extend`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDelta {
    #[serde(default)]
    pub schema: SchemaPatch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<PlainObject>,
    /// Explicit version for the result. When unset, or equal to the base
    /// version, the minor version is bumped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<SemanticVersion>,
}

impl SchemaDelta {
    pub fn new(schema: SchemaPatch) -> Self {
        Self {
            schema,
            example: None,
            version: None,
        }
    }

    pub fn with_example(mut self, example: PlainObject) -> Self {
        self.example = Some(example);
        self
    }

    pub fn with_version(mut self, version: SemanticVersion) -> Self {
        self.version = Some(version);
        self
    }
}

/// Derives a new schema version by deep-merging `delta` onto `base`.
///
/// Scalars from the delta win, nested maps merge key-wise, the required list
/// of the result is the base list followed by any new names, and the example
/// is deep-merged the same way. `base` is left untouched.
pub fn extend(base: &ObjectSchema, delta: &SchemaDelta) -> ObjectSchema {
    let mut next = base.clone();

    merge_document(&mut next.schema, &delta.schema);
    if let Some(example) = &delta.example {
        merge_objects(&mut next.example, example);
    }

    next.version = match delta.version {
        Some(version) if version != base.version => version,
        _ => base.version.bump_minor(),
    };

    normalize_required(&mut next.schema);
    next
}

fn merge_document(doc: &mut SchemaDocument, patch: &SchemaPatch) {
    // `required: true` is resolved against the base properties only, so new
    // properties stay optional unless the patch names them.
    let base_required = required_names(doc);

    if let Some(title) = &patch.title {
        doc.title = title.clone();
    }
    if let Some(description) = &patch.description {
        doc.description = Some(description.clone());
    }
    if let Some(additional) = patch.additional_properties {
        doc.additional_properties = Some(additional);
    }
    if let Some(deprecated) = &patch.deprecated {
        doc.deprecated = Some(deprecated.clone());
    }
    if let Some(patterns) = &patch.pattern_properties {
        merge_objects(
            doc.pattern_properties.get_or_insert_with(Map::new),
            patterns,
        );
    }

    merge_properties(&mut doc.properties, &patch.properties);

    doc.required = match &patch.required {
        Some(RequiredSpec::All) => RequiredSpec::All,
        Some(RequiredSpec::List(added)) => {
            RequiredSpec::List(union(base_required, added.iter().cloned()))
        }
        None => RequiredSpec::List(base_required),
    };
}

fn merge_properties(base: &mut Properties, patch: &Properties) {
    for (name, property) in patch {
        match base.get_mut(name) {
            Some(existing) => merge_property(existing, property),
            None => {
                base.insert(name.clone(), property.clone());
            }
        }
    }
}

fn merge_property(base: &mut PropertyDescriptor, patch: &PropertyDescriptor) {
    base.property_type = patch.property_type.clone();

    fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
        if let Some(v) = value {
            *slot = Some(v.clone());
        }
    }

    take(&mut base.format, &patch.format);
    take(&mut base.title, &patch.title);
    take(&mut base.description, &patch.description);
    take(&mut base.minimum, &patch.minimum);
    take(&mut base.maximum, &patch.maximum);
    take(&mut base.min_length, &patch.min_length);
    take(&mut base.max_length, &patch.max_length);
    take(&mut base.min_items, &patch.min_items);
    take(&mut base.max_items, &patch.max_items);
    take(&mut base.enum_values, &patch.enum_values);
    take(&mut base.default_value, &patch.default_value);
    take(&mut base.deprecated, &patch.deprecated);
    take(&mut base.see, &patch.see);
    take(&mut base.additional_properties, &patch.additional_properties);
    base.required = match (base.required.take(), &patch.required) {
        (Some(PropertyRequired::Fields(existing)), Some(PropertyRequired::Fields(added))) => {
            Some(PropertyRequired::Fields(union(existing, added.iter().cloned())))
        }
        (current, None) => current,
        (_, Some(required)) => Some(required.clone()),
    };

    if let Some(items) = &patch.items {
        if let Some(existing) = base.items.as_mut() {
            merge_property(existing, items);
        } else {
            base.items = Some(items.clone());
        }
    }
    if let Some(properties) = &patch.properties {
        if let Some(existing) = base.properties.as_mut() {
            merge_properties(existing, properties);
        } else {
            base.properties = Some(properties.clone());
        }
    }
    if let Some(patterns) = &patch.pattern_properties {
        merge_objects(
            base.pattern_properties.get_or_insert_with(Map::new),
            patterns,
        );
    }
    merge_objects(&mut base.keywords, &patch.keywords);
}

/// Deep-merges `patch` into `base`: objects merge key-wise, anything else is
/// replaced by the patch value.
pub fn merge_objects(base: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, value) in patch {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                merge_objects(existing, incoming);
            }
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

fn union(mut names: Vec<String>, added: impl IntoIterator<Item = String>) -> Vec<String> {
    for name in added {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Source schema and document-level changes for [`add_property`].
#[derive(Debug, Clone)]
pub struct ExtensionSource<'a> {
    pub schema: &'a ObjectSchema,
    /// New title. When unset the title is kept and the minor version bumped.
    pub title: Option<String>,
    pub description: String,
}

impl<'a> ExtensionSource<'a> {
    pub fn new(schema: &'a ObjectSchema, description: &str) -> Self {
        Self {
            schema,
            title: None,
            description: description.to_string(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// One property added by [`add_property`].
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use serde_json::json;
///
/// let title = PropertyAddition::new("title", PrimitiveType::String, json!("mr"))
///     .with_description("How to address this person");
/// assert!(!title.is_required);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAddition {
    pub property: String,
    pub property_type: PropertyType,
    pub property_format: Option<String>,
    pub example_value: Value,
    pub is_required: bool,
    pub property_description: Option<String>,
    pub see: Option<SeeRef>,
}

impl PropertyAddition {
    pub fn new(property: &str, property_type: impl Into<PropertyType>, example_value: Value) -> Self {
        Self {
            property: property.to_string(),
            property_type: property_type.into(),
            property_format: None,
            example_value,
            is_required: false,
            property_description: None,
            see: None,
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.property_format = Some(format.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.property_description = Some(description.to_string());
        self
    }

    pub fn with_see(mut self, see: impl Into<SeeRef>) -> Self {
        self.see = Some(see.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    fn descriptor(&self) -> PropertyDescriptor {
        let mut descriptor = PropertyDescriptor::new(self.property_type.clone());
        descriptor.format = self.property_format.clone();
        descriptor.description = self.property_description.clone();
        descriptor.see = self.see.clone();
        descriptor
    }
}

/// Derives a new schema version that adds (or overwrites) properties.
///
/// Sets the new description, and the new title when given; otherwise bumps
/// the minor version. Each added property is put on the required list when
/// `is_required` is set and removed from it otherwise, and its example value
/// is copied into the example object.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use serde_json::json;
///
/// let a = ObjectSchema::new(
///     SemanticVersion::new(1, 0, 0),
///     SchemaDocument::new("test")
///         .with_property("foo", PropertyDescriptor::of(PrimitiveType::String))
///         .all_required(),
///     json!({"foo": "foo"}).as_object().cloned().unwrap(),
/// );
///
/// let b = add_property(
///     &ExtensionSource::new(&a, "Test schema B"),
///     &[PropertyAddition::new("bar", PrimitiveType::String, json!("bar"))],
/// );
/// assert_eq!(b.schema.required, RequiredSpec::List(vec!["foo".into()]));
/// assert_eq!(b.version, SemanticVersion::new(1, 1, 0));
/// assert_eq!(b.example["bar"], "bar");
/// ```
pub fn add_property(from: &ExtensionSource<'_>, additions: &[PropertyAddition]) -> ObjectSchema {
    let mut next = from.schema.clone();
    next.schema.description = Some(from.description.clone());
    match &from.title {
        Some(title) => next.schema.title = title.clone(),
        None => next.version = next.version.bump_minor(),
    }

    for addition in additions {
        next.schema
            .properties
            .insert(addition.property.clone(), addition.descriptor());

        normalize_required(&mut next.schema);
        let mut required = next.schema.required.as_list().map(<[String]>::to_vec).unwrap_or_default();
        if addition.is_required {
            required = union(required, [addition.property.clone()]);
        } else {
            required.retain(|name| name != &addition.property);
        }
        next.schema.required = RequiredSpec::List(required);

        next.example
            .insert(addition.property.clone(), addition.example_value.clone());
    }

    next
}
