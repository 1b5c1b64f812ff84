//! Structural checks for schema documents and collections.
//!
//! These checks catch dialect mistakes (whitespace in titles, required names
//! without a matching property, mixed titles inside one versioned group)
//! before they break documentation anchors or validation downstream. They are
//! run on demand and never during construction.
//!
//! # Examples
//!
//! ```
//! use schema_tools_core::*;
//!
//! let doc = SchemaDocument::new("Person")
//!     .with_property("name", PropertyDescriptor::of(PrimitiveType::String))
//!     .with_required(["name"]);
//! assert!(check_document(&doc).is_empty());
//!
//! // Invalid: title with whitespace, unknown required name
//! let bad = SchemaDocument::new("Bad Person").with_required(["age"]);
//! assert_eq!(check_document(&bad).len(), 2);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{SchemaCollection, SchemaDocument, normalize_name, required_names};

/// Dialect problems found by [`check_document`] and [`check_collection`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    /// Title is empty or whitespace-only.
    #[error("schema title cannot be empty")]
    EmptyTitle,
    /// Title contains whitespace and cannot be used as an anchor.
    #[error("schema title {0:?} must not contain whitespace")]
    WhitespaceInTitle(String),
    /// A required name has no property with that name.
    #[error("schema {title} requires unknown property {property}")]
    UnknownRequired { title: String, property: String },
    /// A name appears more than once in the required list.
    #[error("schema {title} lists required property {property} twice")]
    DuplicateRequired { title: String, property: String },
    /// Versions of one schema do not share a title.
    #[error("schema {name} has versions with different titles: {titles}")]
    MixedTitles { name: String, titles: String },
    /// A group is stored under a name its title does not normalize to.
    #[error("schema {name} is stored under the wrong name for title {title}")]
    MisfiledSchema { name: String, title: String },
    /// A version is stored under a different version key.
    #[error("schema {name}@{key} declares version {version}")]
    MisfiledVersion {
        name: String,
        key: String,
        version: String,
    },
}

/// Checks one schema document.
///
/// Required names are resolved the way validation resolves them, so
/// `required: true` never reports unknown properties.
pub fn check_document(doc: &SchemaDocument) -> Vec<DialectError> {
    let mut errors = Vec::new();

    if doc.title.trim().is_empty() {
        errors.push(DialectError::EmptyTitle);
        return errors;
    }
    if doc.title.chars().any(char::is_whitespace) {
        errors.push(DialectError::WhitespaceInTitle(doc.title.clone()));
    }

    let mut seen: HashSet<String> = HashSet::new();
    for property in required_names(doc) {
        if !doc.properties.contains_key(&property) {
            errors.push(DialectError::UnknownRequired {
                title: doc.title.clone(),
                property: property.clone(),
            });
        }
        if !seen.insert(property.clone()) {
            errors.push(DialectError::DuplicateRequired {
                title: doc.title.clone(),
                property,
            });
        }
    }

    errors
}

/// Checks every schema version in a collection.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
/// use serde_json::json;
///
/// let collection: SchemaCollection = serde_json::from_value(json!({
///     "person": {
///         "1.0.0": {"version": "1.0.0", "schema": {"title": "Person"}},
///         "1.1.0": {"version": "1.1.0", "schema": {"title": "Human"}}
///     }
/// }))
/// .unwrap();
///
/// let errors = check_collection(&collection);
/// assert!(errors.iter().any(|e| matches!(e, DialectError::MixedTitles { .. })));
/// ```
pub fn check_collection(collection: &SchemaCollection) -> Vec<DialectError> {
    let mut errors = Vec::new();

    for (name, versioned) in collection.iter() {
        let titles: Vec<&str> = versioned
            .iter()
            .map(|(_, schema)| schema.schema.title.as_str())
            .collect();
        let mut distinct = titles.clone();
        distinct.dedup();
        if distinct.len() > 1 {
            errors.push(DialectError::MixedTitles {
                name: name.to_string(),
                titles: titles.join(", "),
            });
        } else if let Some(title) = distinct.first() {
            if normalize_name(title) != name {
                errors.push(DialectError::MisfiledSchema {
                    name: name.to_string(),
                    title: title.to_string(),
                });
            }
        }

        for (key, schema) in versioned.iter() {
            if *key != schema.version {
                errors.push(DialectError::MisfiledVersion {
                    name: name.to_string(),
                    key: key.to_string(),
                    version: schema.version.to_string(),
                });
            }
            errors.extend(check_document(&schema.schema));
        }
    }

    errors
}
