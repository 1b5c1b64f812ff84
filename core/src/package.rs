//! Versioned schema groups and schema collections.
//!
//! A [`VersionedSchema`] holds every version of one schema; a
//! [`SchemaCollection`] maps normalized schema names to those groups. Both
//! are built once (usually at startup) and then shared read-only. All lookups
//! are pure and signal absence with `None` or an empty list.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ModelError, ObjectSchema, PlainObject, SemanticVersion, normalize_required};

/// Returns the canonical camelCase name for a schema.
///
/// Words are split on any non-alphanumeric character and on case
/// boundaries, so names that differ only in casing or separators collide.
///
/// # Examples
///
/// ```
/// use schema_tools_core::normalize_name;
///
/// assert_eq!(normalize_name("membership_invitation"), "membershipInvitation");
/// assert_eq!(normalize_name("Membership Invitation"), "membershipInvitation");
/// assert_eq!(normalize_name("todoItem"), "todoItem");
/// assert_eq!(normalize_name("Person"), "person");
/// ```
pub fn normalize_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (index, word) in split_words(s).iter().enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in s.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if c.is_uppercase() => {
                    // fooBar | foo2Bar | XMLHttp
                    p.is_lowercase()
                        || p.is_ascii_digit()
                        || (p.is_uppercase() && next.is_some_and(char::is_lowercase))
                }
                _ => false,
            };
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// All versions of one schema, keyed by semantic version.
///
/// Every entry shares the same `schema.title`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionedSchema {
    versions: BTreeMap<SemanticVersion, ObjectSchema>,
}

impl VersionedSchema {
    /// Groups schema versions, normalizing the `required` field of each.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptySchemaList`] for an empty input and
    /// [`ModelError::MixedTitles`] when the entries do not share one title.
    pub fn from_schemas(schemas: impl IntoIterator<Item = ObjectSchema>) -> Result<Self, ModelError> {
        let schemas: Vec<ObjectSchema> = schemas.into_iter().collect();
        let Some(first) = schemas.first() else {
            return Err(ModelError::EmptySchemaList);
        };
        if schemas.iter().any(|s| s.schema.title != first.schema.title) {
            let titles: Vec<&str> = schemas.iter().map(|s| s.schema.title.as_str()).collect();
            return Err(ModelError::MixedTitles(titles.join(", ")));
        }

        let mut versions = BTreeMap::new();
        for mut schema in schemas {
            normalize_required(&mut schema.schema);
            versions.insert(schema.version, schema);
        }
        Ok(Self { versions })
    }

    /// Title shared by every version.
    pub fn title(&self) -> Option<&str> {
        self.versions.values().next().map(|s| s.schema.title.as_str())
    }

    pub fn get(&self, version: &SemanticVersion) -> Option<&ObjectSchema> {
        self.versions.get(version)
    }

    /// Looks up a version by its `"M.m.p"` string; malformed strings miss.
    pub fn get_str(&self, version: &str) -> Option<&ObjectSchema> {
        let version: SemanticVersion = version.parse().ok()?;
        self.versions.get(&version)
    }

    /// Returns the highest version, if any.
    pub fn latest(&self) -> Option<&ObjectSchema> {
        self.versions.values().next_back()
    }

    /// Version strings in ascending semantic order.
    pub fn version_strings(&self) -> Vec<String> {
        self.versions.keys().map(ToString::to_string).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SemanticVersion, &ObjectSchema)> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ObjectSchema> {
        self.versions.values_mut()
    }
}

/// Convenience wrapper over [`VersionedSchema::from_schemas`].
pub fn version_schemas(
    schemas: impl IntoIterator<Item = ObjectSchema>,
) -> Result<VersionedSchema, ModelError> {
    VersionedSchema::from_schemas(schemas)
}

/// Map of normalized schema name to every version of that schema.
///
/// Names passed to lookups are normalized with [`normalize_name`] first.
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
///         .with_property("name", PropertyDescriptor::of(PrimitiveType::String)),
///     json!({"name": "Joe"}).as_object().cloned().unwrap(),
/// );
/// let collection = combine_schemas([version_schemas([person]).unwrap()]);
///
/// assert!(collection.has_schema("Person", "1.0.0"));
/// assert!(collection.get("person", "1.0.0").is_some());
/// assert_eq!(collection.schema_versions("PERSON"), vec!["1.0.0"]);
/// assert!(collection.get_example("person", "2.0.0").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaCollection {
    schemas: BTreeMap<String, VersionedSchema>,
}

impl SchemaCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a group under the normalized form of its title.
    ///
    /// An existing group with the same name is replaced (last write wins);
    /// the replaced group is returned.
    pub fn insert(&mut self, versioned: VersionedSchema) -> Option<VersionedSchema> {
        let name = normalize_name(versioned.title().unwrap_or_default());
        self.insert_named(name, versioned)
    }

    /// Inserts a group under an explicit name (normalized).
    pub fn insert_named(&mut self, name: impl AsRef<str>, versioned: VersionedSchema) -> Option<VersionedSchema> {
        let name = normalize_name(name.as_ref());
        let replaced = self.schemas.insert(name.clone(), versioned);
        if replaced.is_some() {
            debug!(schema = %name, "replaced existing schema group");
        }
        replaced
    }

    /// Merges `other` into `self`; groups in `other` replace same-named ones.
    pub fn merge(&mut self, other: SchemaCollection) {
        for (name, versioned) in other.schemas {
            self.insert_named(name, versioned);
        }
    }

    /// Returns every version of the named schema.
    pub fn get_versioned_schema(&self, name: &str) -> Option<&VersionedSchema> {
        self.schemas.get(&normalize_name(name))
    }

    /// Looks up one schema version. Never fails; misses return `None`.
    pub fn get(&self, name: &str, version: &str) -> Option<&ObjectSchema> {
        let name = normalize_name(name);
        let Some(versioned) = self.schemas.get(&name) else {
            debug!(schema = %name, "missing schema");
            return None;
        };
        versioned.get_str(version)
    }

    pub fn has_schema(&self, name: &str, version: &str) -> bool {
        self.get(name, version).is_some()
    }

    /// Normalized names of all schemas, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// Version strings for a schema name; empty when the name is unknown.
    pub fn schema_versions(&self, name: &str) -> Vec<String> {
        self.get_versioned_schema(name)
            .map(VersionedSchema::version_strings)
            .unwrap_or_default()
    }

    /// Returns the canonical example of a schema version.
    pub fn get_example(&self, name: &str, version: &str) -> Option<&PlainObject> {
        match self.get(name, version) {
            Some(schema) => Some(&schema.example),
            None => {
                debug!(schema = %name, version = %version, "could not find object schema");
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VersionedSchema)> {
        self.schemas.iter().map(|(name, v)| (name.as_str(), v))
    }

    /// Iterates over every schema version in the collection.
    pub fn object_schemas(&self) -> impl Iterator<Item = (&str, &ObjectSchema)> {
        self.schemas
            .iter()
            .flat_map(|(name, v)| v.iter().map(move |(_, s)| (name.as_str(), s)))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Sets `package` on every schema version that does not have one yet.
    ///
    /// This mutates the collection in place. Call it once while the
    /// collection is still exclusively owned, before sharing it with readers.
    pub fn set_package_name(&mut self, package: &str) -> &mut Self {
        for versioned in self.schemas.values_mut() {
            for schema in versioned.iter_mut() {
                if schema.package.is_none() {
                    schema.package = Some(package.to_string());
                }
            }
        }
        self
    }
}

impl FromIterator<VersionedSchema> for SchemaCollection {
    fn from_iter<I: IntoIterator<Item = VersionedSchema>>(iter: I) -> Self {
        let mut collection = SchemaCollection::new();
        for versioned in iter {
            collection.insert(versioned);
        }
        collection
    }
}

/// Combines versioned schema groups into a collection keyed by normalized
/// title. Later groups replace earlier ones with the same name.
pub fn combine_schemas(versioned: impl IntoIterator<Item = VersionedSchema>) -> SchemaCollection {
    versioned.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrimitiveType, PropertyDescriptor, RequiredSpec, SchemaDocument};
    use serde_json::json;

    fn schema(title: &str, version: SemanticVersion) -> ObjectSchema {
        ObjectSchema::new(
            version,
            SchemaDocument::new(title)
                .with_property("id", PropertyDescriptor::of(PrimitiveType::String))
                .all_required(),
            json!({"id": "abc"}).as_object().cloned().unwrap(),
        )
    }

    #[test]
    fn test_normalize_name_variants() {
        assert_eq!(normalize_name("membership_invitation"), "membershipInvitation");
        assert_eq!(normalize_name("__FOO_BAR__"), "fooBar");
        assert_eq!(normalize_name("TodoItem"), "todoItem");
        assert_eq!(normalize_name("todo-item"), "todoItem");
        assert_eq!(normalize_name("XMLHttpRequest"), "xmlHttpRequest");
        assert_eq!(normalize_name("test schema"), "testSchema");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_version_schemas_rejects_empty_and_mixed_titles() {
        assert_eq!(
            version_schemas(Vec::new()).unwrap_err(),
            ModelError::EmptySchemaList
        );

        let err = version_schemas([
            schema("Person", SemanticVersion::new(1, 0, 0)),
            schema("Team", SemanticVersion::new(1, 1, 0)),
        ])
        .unwrap_err();
        assert_eq!(err, ModelError::MixedTitles("Person, Team".to_string()));
    }

    #[test]
    fn test_version_schemas_normalizes_required() {
        let versioned = version_schemas([schema("Person", SemanticVersion::new(1, 0, 0))]).unwrap();
        let stored = versioned.get_str("1.0.0").unwrap();
        assert_eq!(stored.schema.required, RequiredSpec::List(vec!["id".to_string()]));
    }

    #[test]
    fn test_versions_sorted_semantically() {
        let versioned = version_schemas([
            schema("Person", SemanticVersion::new(1, 10, 0)),
            schema("Person", SemanticVersion::new(1, 2, 0)),
            schema("Person", SemanticVersion::new(1, 0, 0)),
        ])
        .unwrap();
        assert_eq!(versioned.version_strings(), vec!["1.0.0", "1.2.0", "1.10.0"]);
        assert_eq!(versioned.latest().unwrap().version, SemanticVersion::new(1, 10, 0));
    }

    #[test]
    fn test_collection_lookups_never_fail() {
        let collection = combine_schemas([
            version_schemas([schema("Person", SemanticVersion::new(1, 0, 0))]).unwrap(),
            version_schemas([schema("todo_item", SemanticVersion::new(1, 0, 0))]).unwrap(),
        ]);

        assert_eq!(collection.schema_names(), vec!["person", "todoItem"]);
        assert!(collection.has_schema("todo item", "1.0.0"));
        assert!(!collection.has_schema("person", "9.9.9"));
        assert!(!collection.has_schema("person", "not-a-version"));
        assert!(collection.schema_versions("nobody").is_empty());
        assert!(collection.get_example("nobody", "1.0.0").is_none());
        assert_eq!(
            collection.get_example("Person", "1.0.0"),
            json!({"id": "abc"}).as_object()
        );
    }

    #[test]
    fn test_combine_last_write_wins() {
        let first = version_schemas([schema("Person", SemanticVersion::new(1, 0, 0))]).unwrap();
        let second = version_schemas([schema("person", SemanticVersion::new(2, 0, 0))]).unwrap();
        let collection = combine_schemas([first, second]);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.schema_versions("person"), vec!["2.0.0"]);
    }

    #[test]
    fn test_set_package_name_only_fills_missing() {
        let mut tagged = schema("Team", SemanticVersion::new(1, 0, 0));
        tagged.package = Some("teams".to_string());
        let mut collection = combine_schemas([
            version_schemas([schema("Person", SemanticVersion::new(1, 0, 0))]).unwrap(),
            version_schemas([tagged]).unwrap(),
        ]);

        collection.set_package_name("people");

        let person = collection.get("person", "1.0.0").unwrap();
        let team = collection.get("team", "1.0.0").unwrap();
        assert_eq!(person.package.as_deref(), Some("people"));
        assert_eq!(team.package.as_deref(), Some("teams"));
    }

    #[test]
    fn test_collection_serde_round_trip() {
        let collection = combine_schemas([
            version_schemas([schema("Person", SemanticVersion::new(1, 0, 0))]).unwrap(),
        ]);
        let json = serde_json::to_value(&collection).unwrap();
        assert!(json["person"]["1.0.0"]["schema"].is_object());
        let back: SchemaCollection = serde_json::from_value(json).unwrap();
        assert_eq!(back, collection);
    }
}
