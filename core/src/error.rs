use thiserror::Error;

/// Errors raised while building the schema data model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// A version string is not of the form `M.m.p`.
    #[error("invalid schema version: {0:?}")]
    InvalidVersion(String),

    /// No schemas were given to group into a versioned schema.
    #[error("expected list of schemas")]
    EmptySchemaList,

    /// Schemas grouped together do not share a title.
    #[error("expected same schema titles, got {0}")]
    MixedTitles(String),
}
