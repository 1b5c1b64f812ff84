//! Translation of the authoring dialect into standard JSON schema.
//!
//! The dialect marks required properties on the property itself
//! (`required: true`) and links other schemas with `see`. The bridge moves
//! those marks into a standard `required` list, turns URI-like `see` labels
//! into `$ref`s, strips the remaining dialect-only keys and compiles the result
//! with the `jsonschema` crate. Validator errors are adapted into
//! [`FieldError`] records with `data.`-rooted field paths.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Retrieve, Uri, Validator};
use schema_tools_core::{
    PropertyDescriptor, Properties, SchemaCollection, SchemaDocument, SeeRef, required_names,
};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{BridgeError, ValidateOptions};

/// Dialect keys that have no meaning to a standard validator.
const DIALECT_KEYS: [&str; 4] = ["required", "deprecated", "defaultValue", "see"];

/// One validation failure: a `data.`-rooted field path and a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Translates a dialect document into a standard JSON schema value.
///
/// Properties marked `required: true` or carrying a `see` come first, then
/// the rest, in declaration order. The root accepts `null` as well as
/// objects. The `required` list is the document's own list followed by the
/// marked properties, without duplicates.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use schema_tools_validate::bridge_document;
/// use serde_json::json;
///
/// let doc = SchemaDocument::new("Team")
///     .with_property("motto", PropertyDescriptor::of(PrimitiveType::String))
///     .with_property("lead", PropertyDescriptor::of(PrimitiveType::Object).with_see("person@1.0.0"));
///
/// let bridged = bridge_document(&doc).unwrap();
/// assert_eq!(bridged["type"], json!(["object", "null"]));
/// assert_eq!(bridged["required"], json!(["lead"]));
/// assert_eq!(bridged["properties"]["lead"]["$ref"], "person@1.0.0");
/// assert!(bridged["properties"]["lead"].get("see").is_none());
/// ```
pub fn bridge_document(schema: &SchemaDocument) -> Result<Value, BridgeError> {
    let translate = |source| BridgeError::Translate {
        title: schema.title.clone(),
        source,
    };

    let mut root = match serde_json::to_value(schema).map_err(translate)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    let (properties, marked) = bridge_properties(&schema.properties).map_err(translate)?;

    let mut required = required_names(schema);
    for name in marked {
        if !required.contains(&name) {
            required.push(name);
        }
    }

    root.remove("deprecated");
    root.insert("type".into(), json!(["object", "null"]));
    root.insert("properties".into(), Value::Object(properties));
    root.insert("required".into(), json!(required));
    Ok(Value::Object(root))
}

fn bridge_properties(properties: &Properties) -> Result<(Map<String, Value>, Vec<String>), serde_json::Error> {
    let mut marked = Map::new();
    let mut unmarked = Map::new();
    let mut required = Vec::new();

    for (name, property) in properties {
        let bridged = bridge_property(property)?;
        if property.is_required() || property.see.is_some() {
            required.push(name.clone());
            marked.insert(name.clone(), bridged);
        } else {
            unmarked.insert(name.clone(), bridged);
        }
    }

    marked.extend(unmarked);
    Ok((marked, required))
}

fn bridge_property(property: &PropertyDescriptor) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(property)?;
    let Value::Object(map) = &mut value else {
        return Ok(value);
    };

    for key in DIALECT_KEYS {
        map.remove(key);
    }
    // A full schema reference or a free-text label only links documentation.
    if let Some(label) = reference_label(property) {
        map.insert("$ref".into(), Value::String(label.to_string()));
    } else if let Some(SeeRef::Label(label)) = &property.see {
        debug!(label = %label, "see label is not a URI reference, kept as documentation");
    }
    if let Some(items) = &property.items {
        map.insert("items".into(), bridge_property(items)?);
    }

    let mut required = property.required_fields().to_vec();
    if let Some(properties) = &property.properties {
        let (nested, marked) = bridge_properties(properties)?;
        map.insert("properties".into(), Value::Object(nested));
        for name in marked {
            if !required.contains(&name) {
                required.push(name);
            }
        }
    }
    if !required.is_empty() {
        map.insert("required".into(), json!(required));
    }
    Ok(value)
}

/// The `see` label of `property` if it can be emitted as a `$ref`.
fn reference_label(property: &PropertyDescriptor) -> Option<&str> {
    match &property.see {
        Some(SeeRef::Label(label)) if is_uri_reference(label) => Some(label.as_str()),
        _ => None,
    }
}

/// Accepts non-empty strings made only of URI reference characters.
fn is_uri_reference(label: &str) -> bool {
    !label.is_empty()
        && label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-._~:/?#[]@!$&'()*+,;=%".contains(c))
}

/// A dialect document compiled into a standard validator.
pub struct CompiledSchema {
    validator: Validator,
    greedy: bool,
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("greedy", &self.greedy)
            .finish_non_exhaustive()
    }
}

impl CompiledSchema {
    /// Returns `true` if `instance` conforms.
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.validator.is_valid(instance)
    }

    /// Runs validation and adapts every failure into a [`FieldError`].
    ///
    /// In non-greedy mode only the first failure per field is kept.
    pub fn errors(&self, instance: &Value) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = Vec::new();
        for error in self.validator.iter_errors(instance) {
            let adapted = adapt_error(&error, instance);
            if !self.greedy && errors.iter().any(|e| e.field == adapted.field) {
                continue;
            }
            errors.push(adapted);
        }
        errors
    }
}

/// Compiles a dialect document with the formats and references in `options`.
///
/// Two formats are always available: `name` (length within the bounds of the
/// property called `name`, if any) and `hookId` (non-empty). Caller formats
/// with the same names replace them. `see` labels of the form `name@M.m.p`
/// are resolved against `options.references`.
pub fn compile(schema: &SchemaDocument, options: &ValidateOptions<'_>) -> Result<CompiledSchema, BridgeError> {
    let document = bridge_document(schema)?;

    let mut opts = jsonschema::options();
    opts.with_draft(jsonschema::Draft::Draft202012);
    opts.should_validate_formats(true);

    let (min_name, max_name) = name_bounds(&schema.properties);
    opts.with_format("name", move |s: &str| {
        let len = s.chars().count() as u64;
        min_name.is_none_or(|min| len >= min) && max_name.is_none_or(|max| len <= max)
    });
    opts.with_format("hookId", |s: &str| !s.is_empty());

    if let Some(formats) = options.formats {
        for (name, detect) in formats {
            let detect = detect.clone();
            opts.with_format(name.clone(), move |s: &str| detect.is_match(s));
        }
    }

    let schemas_by_label = referenced_schemas(schema, options.references)?;
    opts.with_retriever(LabelRetriever { schemas_by_label });

    let validator = opts.build(&document).map_err(|err| BridgeError::Compile {
        title: schema.title.clone(),
        reason: err.to_string(),
    })?;

    Ok(CompiledSchema {
        validator,
        greedy: options.greedy,
    })
}

/// Length bounds declared on the first property named `name`, searching
/// nested objects and array items.
fn name_bounds(properties: &Properties) -> (Option<u64>, Option<u64>) {
    fn find(properties: &Properties) -> Option<&PropertyDescriptor> {
        if let Some(name) = properties.get("name") {
            return Some(name);
        }
        properties.values().find_map(|property| {
            let mut current = property;
            while let Some(items) = &current.items {
                current = items;
            }
            current.properties.as_ref().and_then(find)
        })
    }

    find(properties)
        .map(|name| (name.min_length, name.max_length))
        .unwrap_or_default()
}

fn see_labels(properties: &Properties, labels: &mut Vec<String>) {
    for property in properties.values() {
        let mut current = Some(property);
        while let Some(p) = current {
            if let Some(label) = reference_label(p) {
                labels.push(label.to_string());
            }
            if let Some(nested) = &p.properties {
                see_labels(nested, labels);
            }
            current = p.items.as_deref();
        }
    }
}

/// Bridges every schema reachable through `see` labels, transitively.
fn referenced_schemas(
    schema: &SchemaDocument,
    references: Option<&SchemaCollection>,
) -> Result<HashMap<String, Value>, BridgeError> {
    let mut resolved = HashMap::new();
    let Some(collection) = references else {
        return Ok(resolved);
    };

    let mut pending = Vec::new();
    see_labels(&schema.properties, &mut pending);
    let mut queue: VecDeque<String> = pending.into();

    while let Some(label) = queue.pop_front() {
        if resolved.contains_key(&label) {
            continue;
        }
        let Some((name, version)) = label.rsplit_once('@') else {
            debug!(label = %label, "see label has no version");
            continue;
        };
        let Some(target) = collection.get(name, version) else {
            debug!(label = %label, "see label does not name a known schema");
            continue;
        };

        resolved.insert(label, bridge_document(&target.schema)?);

        let mut nested = Vec::new();
        see_labels(&target.schema.properties, &mut nested);
        queue.extend(nested);
    }

    Ok(resolved)
}

/// Resolves `$ref` labels from memory; never touches the network.
struct LabelRetriever {
    schemas_by_label: HashMap<String, Value>,
}

impl Retrieve for LabelRetriever {
    fn retrieve(&self, uri: &Uri<&str>) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri = uri.as_str();
        let label = uri.rsplit('/').next().unwrap_or(uri);

        if let Some(value) = self.schemas_by_label.get(label) {
            return Ok(value.clone());
        }

        debug!(uri = %uri, "unresolved schema reference, accepting any value");
        Ok(json!({}))
    }
}

fn adapt_error(error: &jsonschema::ValidationError<'_>, instance: &Value) -> FieldError {
    let field = field_path(instance, &error.instance_path.to_string());

    let message = match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            return FieldError {
                field: format!("{field}.{name}"),
                message: "is required".to_string(),
            };
        }
        ValidationErrorKind::AdditionalProperties { .. } => "has additional properties".to_string(),
        ValidationErrorKind::Type { .. } => "is the wrong type".to_string(),
        ValidationErrorKind::Format { format } => format!("must be {format} format"),
        ValidationErrorKind::Minimum { .. } | ValidationErrorKind::ExclusiveMinimum { .. } => {
            "is less than minimum".to_string()
        }
        ValidationErrorKind::Maximum { .. } | ValidationErrorKind::ExclusiveMaximum { .. } => {
            "is more than maximum".to_string()
        }
        ValidationErrorKind::MinLength { .. } => "has less length than allowed".to_string(),
        ValidationErrorKind::MaxLength { .. } => "has longer length than allowed".to_string(),
        ValidationErrorKind::MinItems { .. } => "has less items than allowed".to_string(),
        ValidationErrorKind::MaxItems { .. } => "has more items than allowed".to_string(),
        ValidationErrorKind::Enum { .. } => "must be an enum value".to_string(),
        ValidationErrorKind::Pattern { .. } => "pattern mismatch".to_string(),
        ValidationErrorKind::OneOfNotValid { .. } | ValidationErrorKind::OneOfMultipleValid { .. } => {
            "no (or more than one) schemas match".to_string()
        }
        ValidationErrorKind::UniqueItems { .. } => "must be unique".to_string(),
        _ => error.to_string(),
    };

    FieldError { field, message }
}

/// Converts a JSON pointer into a `data.`-rooted field path, writing array
/// positions as `[i]`.
fn field_path(instance: &Value, pointer: &str) -> String {
    let mut field = String::from("data");
    let mut current = Some(instance);

    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        match current {
            Some(Value::Array(items)) => {
                field.push('[');
                field.push_str(&segment);
                field.push(']');
                current = segment.parse::<usize>().ok().and_then(|i| items.get(i));
            }
            other => {
                field.push('.');
                field.push_str(&segment);
                current = other.and_then(|value| value.get(segment.as_str()));
            }
        }
    }

    field
}
