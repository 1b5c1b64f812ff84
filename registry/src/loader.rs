//! Schema collection loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaStore`] for loading a [`SchemaCollection`] from disk and
//! [`StoreBuilder`] for trying multiple sources in order.
//!
//! # Loading patterns
//!
//! ```no_run
//! use schema_tools_registry::SchemaStore;
//!
//! // One file per schema version; JSON or YAML
//! let store = SchemaStore::from_dir("schemas/").unwrap();
//! assert!(store.schemas().has_schema("person", "1.0.0"));
//!
//! // A whole collection in a single file
//! let store = SchemaStore::from_bundle("schemas.json").unwrap();
//!
//! // First source that loads wins
//! let store = SchemaStore::builder()
//!     .from_dir("/opt/schemas/")
//!     .from_bundle("/opt/schemas.yaml")
//!     .build()
//!     .unwrap();
//! ```

use std::collections::BTreeMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use schema_tools_core::{ObjectSchema, SchemaCollection, normalize_name, version_schemas};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{RegistryError, Result};

/// Describes where a [`SchemaStore`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionSource {
    /// Directory of individual schema version files.
    Directory(PathBuf),
    /// Single file holding a serialized [`SchemaCollection`].
    Bundle(PathBuf),
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<CollectionSource>),
}

/// A loaded schema collection together with its origin.
#[derive(Debug)]
pub struct SchemaStore {
    schemas: SchemaCollection,
    source: CollectionSource,
}

impl SchemaStore {
    /// Returns a new [`StoreBuilder`] for configuring a fallback chain.
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Loads every `*.json`, `*.yaml` and `*.yml` file in a directory.
    ///
    /// Each file holds one [`ObjectSchema`]. Files are grouped by normalized
    /// title and every group is normalized before it enters the collection.
    /// Titles that differ only in spelling fail the group. Files are
    /// read in path order, so a duplicate version keeps the last file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the directory or a file cannot be
    /// read, a parse error if any file is malformed, or
    /// [`RegistryError::ModelError`] if a group cannot be versioned.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_format(&file_path).is_some() {
                files.push(file_path);
            }
        }
        files.sort();

        let mut groups: BTreeMap<String, Vec<ObjectSchema>> = BTreeMap::new();
        for file_path in &files {
            let schema: ObjectSchema = read_file(file_path)?;
            debug!(file = %file_path.display(), title = %schema.schema.title, version = %schema.version, "loaded schema file");
            groups.entry(normalize_name(&schema.schema.title)).or_default().push(schema);
        }

        let mut schemas = SchemaCollection::new();
        for (_, group) in groups {
            schemas.insert(version_schemas(group)?);
        }

        Ok(Self {
            schemas,
            source: CollectionSource::Directory(path.to_path_buf()),
        })
    }

    /// Loads a whole collection from one JSON or YAML file.
    ///
    /// The file maps schema names to version maps. Each group is regrouped
    /// so hand-written bundles get the same normalization as directories.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the file cannot be read, or a
    /// parse error if it is not a valid collection.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw: SchemaCollection = read_file(path)?;

        let mut schemas = SchemaCollection::new();
        for (name, versioned) in raw.iter() {
            if versioned.is_empty() {
                warn!(schema = %name, "skipping empty schema group");
                continue;
            }
            let group = version_schemas(versioned.iter().map(|(_, schema)| schema.clone()))?;
            schemas.insert_named(name, group);
        }

        Ok(Self {
            schemas,
            source: CollectionSource::Bundle(path.to_path_buf()),
        })
    }

    /// Loads a directory or a bundle file, whichever `path` is.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_bundle(path)
        }
    }

    pub fn schemas(&self) -> &SchemaCollection {
        &self.schemas
    }

    pub fn into_schemas(self) -> SchemaCollection {
        self.schemas
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &CollectionSource {
        &self.source
    }
}

/// Builder for constructing a [`SchemaStore`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`RegistryError::NoSourcesAvailable`] is returned.
#[derive(Debug, Default)]
pub struct StoreBuilder {
    sources: Vec<CollectionSource>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory of schema files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CollectionSource::Directory(path.into()));
        self
    }

    /// Adds a collection bundle file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CollectionSource::Bundle(path.into()));
        self
    }

    /// Attempts to load from configured sources in order.
    pub fn build(self) -> Result<SchemaStore> {
        for source in &self.sources {
            let result = match source {
                CollectionSource::Directory(path) => SchemaStore::from_dir(path),
                CollectionSource::Bundle(path) => SchemaStore::from_bundle(path),
                CollectionSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut store) => {
                    store.source = CollectionSource::Multiple(self.sources.clone());
                    return Ok(store);
                }
                Err(err) => debug!(?source, %err, "schema source failed, trying next"),
            }
        }

        Err(RegistryError::NoSourcesAvailable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Yaml,
}

fn file_format(path: &Path) -> Option<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(FileFormat::Json),
        Some("yaml" | "yml") => Some(FileFormat::Yaml),
        _ => None,
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    match file_format(path) {
        Some(FileFormat::Yaml) => Ok(serde_yaml::from_reader(reader)?),
        _ => Ok(serde_json::from_reader(reader)?),
    }
}
