//! Registry configuration: custom formats, schema sources, validation mode.
//!
//! # Example YAML
//!
//! ```yaml
//! greedy: true
//! formats:
//!   - name: uuid
//!     description: Unique id
//!     detect: "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$"
//!     default_value: ffffffff-ffff-ffff-ffff-ffffffffffff
//!   - name: projectId
//!     description: Project identifier
//!     detect: "^[a-z]{4}[0-9]{2}$"
//!     example: abcd12
//! sources:
//!   - dir: schemas/
//!   - bundle: vendor/schemas.json
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use regex::Regex;
use schema_tools_core::{CustomFormat, CustomFormats};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RegistryError, Result};
use crate::{BindSource, BoundApi, SchemaStore, bind};

/// One custom string format, with its detector as regex source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Regex source, compiled at load time.
    pub detect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl FormatConfig {
    /// Compiles the detector.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidFormat`] naming the format if the
    /// detector is not a valid regex.
    pub fn compile(&self) -> Result<CustomFormat> {
        let detect = Regex::new(&self.detect).map_err(|source| RegistryError::InvalidFormat {
            name: self.name.clone(),
            source,
        })?;
        Ok(CustomFormat {
            name: self.name.clone(),
            description: self.description.clone(),
            detect,
            default_value: self.default_value.clone(),
            example: self.example.clone(),
        })
    }
}

/// Where schemas are loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceConfig {
    /// Directory of schema version files.
    Dir(PathBuf),
    /// Single file holding a whole schema collection.
    Bundle(PathBuf),
}

fn default_greedy() -> bool {
    true
}

/// Top-level registry configuration.
///
/// Relative source paths are resolved against the directory of the
/// configuration file when loaded with [`RegistryConfig::load`].
///
/// # Examples
///
/// ```
/// use schema_tools_registry::RegistryConfig;
///
/// let config = RegistryConfig::from_yaml_str(r#"
/// formats:
///   - name: hour
///     description: Hour of the day
///     detect: "^([01][0-9]|2[0-3])$"
///     default_value: "12"
/// "#).unwrap();
///
/// let formats = config.custom_formats().unwrap();
/// assert!(formats["hour"].matches("23"));
/// assert!(!formats["hour"].matches("24"));
/// assert!(config.greedy);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub formats: Vec<FormatConfig>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default = "default_greedy")]
    pub greedy: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            sources: Vec::new(),
            greedy: true,
        }
    }
}

impl RegistryConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](RegistryError::IoError) if the file cannot be
    /// read, or [`YamlError`](RegistryError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;

        if let Some(base) = path.parent() {
            config.resolve_sources(base);
        }
        Ok(config)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Compiles the configured formats into a table keyed by format name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidFormat`] for the first format whose
    /// detector does not compile.
    pub fn custom_formats(&self) -> Result<CustomFormats> {
        self.formats
            .iter()
            .map(|format| Ok((format.name.clone(), format.compile()?)))
            .collect()
    }

    /// Loads every source and binds them with the configured formats.
    ///
    /// Sources are merged in order; later sources replace same-named
    /// schemas from earlier ones.
    pub fn bind(&self) -> Result<BoundApi> {
        let mut sources = Vec::with_capacity(self.sources.len() + 1);
        for source in &self.sources {
            let store = match source {
                SourceConfig::Dir(path) => SchemaStore::from_dir(path)?,
                SourceConfig::Bundle(path) => SchemaStore::from_bundle(path)?,
            };
            sources.push(BindSource::new(store.into_schemas()));
        }
        sources.push(BindSource::default().with_formats(self.custom_formats()?));

        Ok(bind(sources).with_greedy(self.greedy))
    }

    fn resolve_sources(&mut self, base: &Path) {
        for source in &mut self.sources {
            let (SourceConfig::Dir(path) | SourceConfig::Bundle(path)) = source;
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_yaml() -> &'static str {
        r#"
greedy: false
formats:
  - name: uuid
    description: Unique id
    detect: "^[0-9a-f-]{36}$"
    default_value: ffffffff-ffff-ffff-ffff-ffffffffffff
  - name: count
    detect: "^[0-9]+$"
    default_value: 7
    example: "3"
sources:
  - dir: schemas
  - bundle: /opt/schemas.json
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config = RegistryConfig::from_yaml_str(sample_yaml()).unwrap();
        assert!(!config.greedy);
        assert_eq!(config.formats.len(), 2);
        assert_eq!(config.formats[0].name, "uuid");
        assert_eq!(config.formats[1].description, "");
        assert_eq!(config.formats[1].default_value, Some(json!(7)));
        assert_eq!(
            config.sources,
            vec![
                SourceConfig::Dir("schemas".into()),
                SourceConfig::Bundle("/opt/schemas.json".into()),
            ]
        );
    }

    #[test]
    fn test_deserialize_empty() {
        let config = RegistryConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert!(config.custom_formats().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_regex_names_format() {
        let config = RegistryConfig::from_yaml_str(
            r#"
formats:
  - name: broken
    detect: "([a-z"
"#,
        )
        .unwrap();
        let err = config.custom_formats().unwrap_err();
        assert!(matches!(err, RegistryError::InvalidFormat { ref name, .. } if name == "broken"));
        assert!(err.to_string().starts_with("invalid format broken"));
    }

    #[test]
    fn test_load_resolves_relative_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.yml");
        let original = RegistryConfig::from_yaml_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = RegistryConfig::load(&path).unwrap();
        assert_eq!(loaded.formats, original.formats);
        assert_eq!(
            loaded.sources,
            vec![
                SourceConfig::Dir(dir.path().join("schemas")),
                SourceConfig::Bundle("/opt/schemas.json".into()),
            ]
        );
    }

    #[test]
    fn test_custom_formats_compile() {
        let config = RegistryConfig::from_yaml_str(sample_yaml()).unwrap();
        let formats = config.custom_formats().unwrap();
        assert!(formats["uuid"].matches("3b3a4f0e-5f6e-4c55-9d61-2f1a2b3c4d5e"));
        assert_eq!(formats["count"].example, Some(json!("3")));
    }
}
