//! Schema type definitions for versioned object schemas.
//!
//! This module defines the data model for the schema dialect: property
//! descriptors, schema documents and versioned object schemas. The types
//! derive [`serde`] with the dialect's camelCase keys, so authored schemas can
//! be read straight from JSON or YAML.
//!
//! Two dialect fields are loosely typed in authored documents and are modeled
//! as sum types here:
//!
//! - [`RequiredSpec`]: `required: true` (every property) or an explicit list.
//! - [`PropertyRequired`]: the per-property flag, or the standard list of an
//!   inline object's required fields.
//! - [`SeeRef`]: a bare label or a reference to another schema version.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::{SemanticVersion, normalize_name};

/// "Simple" JSON object: example payloads, validated inputs.
pub type PlainObject = Map<String, Value>;

/// Ordered map of property name to descriptor.
///
/// Insertion order is significant: normalizing `required: true` lists
/// properties in declaration order.
pub type Properties = IndexMap<String, PropertyDescriptor>;

/// Primitive JSON type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

/// The `type` of a property: one primitive or a union of alternatives.
///
/// Unions are mostly used for nullable fields, e.g. `["string", "null"]`.
///
/// # Examples
///
/// ```
/// use schema_tools_core::{PrimitiveType, PropertyType};
///
/// let t = PropertyType::nullable(PrimitiveType::String);
/// assert!(t.allows(PrimitiveType::Null));
/// assert!(t.allows(PrimitiveType::String));
/// assert!(!t.allows(PrimitiveType::Number));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyType {
    Single(PrimitiveType),
    Union(Vec<PrimitiveType>),
}

impl PropertyType {
    /// Union of `primitive` and `null`.
    pub fn nullable(primitive: PrimitiveType) -> Self {
        PropertyType::Union(vec![primitive, PrimitiveType::Null])
    }

    /// Returns `true` if a value of `primitive` type is admitted.
    pub fn allows(&self, primitive: PrimitiveType) -> bool {
        match self {
            PropertyType::Single(p) => *p == primitive,
            PropertyType::Union(ps) => ps.contains(&primitive),
        }
    }
}

impl From<PrimitiveType> for PropertyType {
    fn from(primitive: PrimitiveType) -> Self {
        PropertyType::Single(primitive)
    }
}

impl Default for PropertyType {
    fn default() -> Self {
        PropertyType::Single(PrimitiveType::Object)
    }
}

/// Identity of one schema version, used for cross-schema references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaRef {
    pub name: String,
    pub version: SemanticVersion,
}

impl SchemaRef {
    /// Returns the `name@M.m.p` label, with the name normalized.
    pub fn label(&self) -> String {
        format!("{}@{}", normalize_name(&self.name), self.version)
    }
}

/// Cross-reference from a property to another schema.
///
/// Documentation uses it to link schemas; the validator turns it into a
/// `$ref`. A [`SeeRef::Schema`] is always lowered to its label first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeeRef {
    Label(String),
    Schema(SchemaRef),
}

impl SeeRef {
    /// Returns the string label used as the `$ref` target.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_tools_core::{SchemaRef, SeeRef, SemanticVersion};
    ///
    /// let see = SeeRef::Schema(SchemaRef {
    ///     name: "Person".into(),
    ///     version: SemanticVersion::new(1, 0, 0),
    /// });
    /// assert_eq!(see.label(), "person@1.0.0");
    /// assert_eq!(SeeRef::from("person").label(), "person");
    /// ```
    pub fn label(&self) -> String {
        match self {
            SeeRef::Label(label) => label.clone(),
            SeeRef::Schema(reference) => reference.label(),
        }
    }
}

impl From<&str> for SeeRef {
    fn from(label: &str) -> Self {
        SeeRef::Label(label.to_string())
    }
}

impl From<&ObjectSchema> for SeeRef {
    fn from(schema: &ObjectSchema) -> Self {
        SeeRef::Schema(schema.reference())
    }
}

/// Describes one field of a schema.
///
/// `required` is either the dialect shorthand (`true` marks the property as
/// required on its parent) or, on an inline object, the standard list of its
/// required fields. See [`PropertyRequired`].
/// Keywords without a dedicated field (`oneOf`, `const`, ...) are kept in
/// `keywords` and passed through to the validator unchanged.
///
/// # Examples
///
/// ```
/// use schema_tools_core::{PrimitiveType, PropertyDescriptor};
///
/// let age = PropertyDescriptor::of(PrimitiveType::Integer)
///     .with_minimum(0)
///     .with_description("Age in years")
///     .required();
/// assert!(age.is_required());
///
/// let json = serde_json::to_value(&age).unwrap();
/// assert_eq!(json["type"], "integer");
/// assert_eq!(json["minimum"], 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Deprecation message shown in documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub see: Option<SeeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertyDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<PropertyRequired>,
    #[serde(flatten)]
    pub keywords: Map<String, Value>,
}

impl PropertyDescriptor {
    pub fn new(property_type: impl Into<PropertyType>) -> Self {
        Self {
            property_type: property_type.into(),
            format: None,
            title: None,
            description: None,
            minimum: None,
            maximum: None,
            min_length: None,
            max_length: None,
            min_items: None,
            max_items: None,
            enum_values: None,
            default_value: None,
            deprecated: None,
            see: None,
            items: None,
            properties: None,
            pattern_properties: None,
            additional_properties: None,
            required: None,
            keywords: Map::new(),
        }
    }

    /// Shorthand for a descriptor of a single primitive type.
    pub fn of(primitive: PrimitiveType) -> Self {
        Self::new(primitive)
    }

    /// Array descriptor with the given item descriptor.
    pub fn array_of(items: PropertyDescriptor) -> Self {
        Self::of(PrimitiveType::Array).with_items(items)
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_minimum(mut self, minimum: impl Into<Number>) -> Self {
        self.minimum = Some(minimum.into());
        self
    }

    pub fn with_maximum(mut self, maximum: impl Into<Number>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }

    pub fn with_length(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_length = min;
        self.max_length = max;
        self
    }

    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_see(mut self, see: impl Into<SeeRef>) -> Self {
        self.see = Some(see.into());
        self
    }

    pub fn with_items(mut self, items: PropertyDescriptor) -> Self {
        self.items = Some(Box::new(items));
        self
    }

    pub fn with_property(mut self, name: &str, property: PropertyDescriptor) -> Self {
        self.properties
            .get_or_insert_with(Properties::new)
            .insert(name.to_string(), property);
        self
    }

    pub fn deprecated(mut self, message: &str) -> Self {
        self.deprecated = Some(message.to_string());
        self
    }

    /// Marks the property as required on its parent (dialect shorthand).
    pub fn required(mut self) -> Self {
        self.required = Some(PropertyRequired::Flag(true));
        self
    }

    /// Marks the property as optional even under `required: true`.
    pub fn optional(mut self) -> Self {
        self.required = Some(PropertyRequired::Flag(false));
        self
    }

    /// Sets the standard required list of an inline object.
    pub fn with_required_fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required = Some(PropertyRequired::Fields(names.into_iter().map(Into::into).collect()));
        self
    }

    /// `true` if the property is flagged `required: true`.
    pub fn is_required(&self) -> bool {
        self.required == Some(PropertyRequired::Flag(true))
    }

    /// `true` if the property is flagged `required: false`.
    pub fn is_optional(&self) -> bool {
        self.required == Some(PropertyRequired::Flag(false))
    }

    /// Required field names of an inline object; empty for the flag form.
    pub fn required_fields(&self) -> &[String] {
        match &self.required {
            Some(PropertyRequired::Fields(names)) => names,
            _ => &[],
        }
    }

    /// Returns `true` if this descriptor carries nested object properties.
    pub fn has_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// The `required` field of a property descriptor.
///
/// A boolean is the dialect flag on the property itself. A list names the
/// required fields of an inline object, as in standard JSON schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyRequired {
    Flag(bool),
    Fields(Vec<String>),
}

/// The `required` field of a schema document.
///
/// `true` in authored documents is [`RequiredSpec::All`]: every property
/// unless individually marked `required: false`. After normalization the
/// value is always a [`RequiredSpec::List`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRequired", into = "RawRequired")]
pub enum RequiredSpec {
    All,
    List(Vec<String>),
}

impl RequiredSpec {
    /// Returns the explicit list, or `None` for the unnormalized `All` form.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            RequiredSpec::All => None,
            RequiredSpec::List(names) => Some(names),
        }
    }
}

impl Default for RequiredSpec {
    fn default() -> Self {
        RequiredSpec::List(Vec::new())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawRequired {
    Flag(bool),
    List(Vec<String>),
}

impl From<RawRequired> for RequiredSpec {
    fn from(raw: RawRequired) -> Self {
        match raw {
            RawRequired::Flag(true) => RequiredSpec::All,
            RawRequired::Flag(false) => RequiredSpec::List(Vec::new()),
            RawRequired::List(names) => RequiredSpec::List(names),
        }
    }
}

impl From<RequiredSpec> for RawRequired {
    fn from(spec: RequiredSpec) -> Self {
        match spec {
            RequiredSpec::All => RawRequired::Flag(true),
            RequiredSpec::List(names) => RawRequired::List(names),
        }
    }
}

/// A JSON-schema-like document in the authoring dialect.
///
/// The title doubles as the schema name and as a documentation anchor, so it
/// must be non-empty and free of whitespace (see
/// [`check_document`](crate::check_document)).
///
/// `additional_properties` left as `None` means unknown properties are
/// allowed, as in standard JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub title: String,
    #[serde(rename = "type", default)]
    pub schema_type: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub required: RequiredSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<String>,
}

impl SchemaDocument {
    /// Creates an object document with no properties and an empty required
    /// list.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            schema_type: PropertyType::default(),
            description: None,
            properties: Properties::new(),
            pattern_properties: None,
            required: RequiredSpec::default(),
            additional_properties: None,
            deprecated: None,
        }
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
        self.required = RequiredSpec::List(names.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the `required: true` shorthand.
    pub fn all_required(mut self) -> Self {
        self.required = RequiredSpec::All;
        self
    }

    pub fn closed(mut self) -> Self {
        self.additional_properties = Some(false);
        self
    }
}

/// One published version of a schema: document, canonical example and
/// metadata.
///
/// Immutable once placed in a collection; [`extend`](crate::extend) and
/// [`add_property`](crate::add_property) return new values.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use serde_json::json;
///
/// let person = ObjectSchema::new(
///     SemanticVersion::new(1, 0, 0),
///     SchemaDocument::new("Person")
///         .with_property("name", PropertyDescriptor::of(PrimitiveType::String))
///         .with_required(["name"]),
///     json!({"name": "Joe"}).as_object().cloned().unwrap(),
/// );
/// assert_eq!(person.name(), "person");
/// assert_eq!(person.reference().label(), "person@1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub version: SemanticVersion,
    pub schema: SchemaDocument,
    #[serde(default)]
    pub example: PlainObject,
    /// Usually the name of the package this schema is defined in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl ObjectSchema {
    pub fn new(version: SemanticVersion, schema: SchemaDocument, example: PlainObject) -> Self {
        Self {
            version,
            schema,
            example,
            package: None,
        }
    }

    /// Normalized schema name derived from the title.
    pub fn name(&self) -> String {
        normalize_name(&self.schema.title)
    }

    pub fn reference(&self) -> SchemaRef {
        SchemaRef {
            name: self.schema.title.clone(),
            version: self.version,
        }
    }
}
