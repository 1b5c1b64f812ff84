//! Error type for registry operations.
//!
//! Covers loading (I/O, JSON, YAML), configuration (bad format regex) and
//! the object-shape utilities (missing schema, missing default value).

use schema_tools_core::ModelError;
use schema_tools_validate::AssertError;
use thiserror::Error;

/// Errors that can occur while loading or using a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Schema files could not be grouped into versioned schemas.
    #[error("invalid schema set: {0}")]
    ModelError(#[from] ModelError),

    /// A configured format has a detector that is not a valid regex.
    #[error("invalid format {name}: {source}")]
    InvalidFormat {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,

    /// The requested schema version does not exist.
    #[error("Could not find schema {name}@{version}")]
    MissingSchema { name: String, version: String },

    /// A property is missing and declares no default value to fill it with.
    #[error("Do not know how to get default value for property \"{0}\"")]
    MissingDefault(String),

    /// The input is not a JSON object.
    #[error("expected an object, got {0}")]
    NotAnObject(String),

    /// The object violated its schema.
    #[error(transparent)]
    AssertError(#[from] AssertError),
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
