use std::fmt;

use schema_tools_core::PlainObject;
use serde_json::Value;
use thiserror::Error;

/// A dialect schema could not be turned into a working validator.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("could not translate schema {title}: {source}")]
    Translate {
        title: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not compile schema {title}: {reason}")]
    Compile { title: String, reason: String },
}

/// Ordered, de-duplicated `"<field> <message>"` strings from one validation.
///
/// # Examples
///
/// ```
/// use schema_tools_validate::ValidationErrors;
///
/// let errors = ValidationErrors::from(vec!["data.name is required".to_string()]);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.to_string(), "data.name is required");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ValidationErrors {
    fn from(errors: Vec<String>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// An object violated its schema during an assertion.
///
/// `object` is the value that was actually validated, after any
/// substitutions from the example.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SchemaError {
    pub message: String,
    pub errors: Vec<String>,
    pub object: Value,
    pub example: PlainObject,
    pub schema_name: String,
    pub schema_version: Option<String>,
}

/// Failure of [`assert_schema`](crate::assert_schema).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssertError {
    /// The requested schema version does not exist.
    #[error("Could not find schema {name}@{version}")]
    MissingSchema { name: String, version: String },

    #[error(transparent)]
    Violated(#[from] SchemaError),
}
