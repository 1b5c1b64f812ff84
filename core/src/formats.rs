//! Custom string formats such as `uuid` or `projectId`.
//!
//! A [`CustomFormat`] pairs a detector regex with an optional replacement
//! value. The detectors are installed on the validator as string formats and
//! the replacement values feed sanitization.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;

/// A named string format recognized by a regular expression.
#[derive(Debug, Clone)]
pub struct CustomFormat {
    pub name: String,
    pub description: String,
    pub detect: Regex,
    /// Replacement used by sanitize for highly dynamic values.
    pub default_value: Option<Value>,
    pub example: Option<Value>,
}

impl CustomFormat {
    pub fn new(name: &str, description: &str, detect: Regex) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            detect,
            default_value: None,
            example: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_example(mut self, value: impl Into<Value>) -> Self {
        self.example = Some(value.into());
        self
    }

    /// Returns `true` if `value` matches the detector.
    pub fn matches(&self, value: &str) -> bool {
        self.detect.is_match(value)
    }
}

/// Custom formats keyed by table name.
pub type CustomFormats = BTreeMap<String, CustomFormat>;

/// Detector regex per format, as installed on the validator.
pub type FormatDetectors = BTreeMap<String, Regex>;

/// Sanitize replacement value per format name.
pub type FormatDefaults = BTreeMap<String, Value>;

/// Returns the detector of every format, keyed like the input table.
pub fn detectors(formats: &CustomFormats) -> FormatDetectors {
    formats
        .iter()
        .map(|(key, format)| (key.clone(), format.detect.clone()))
        .collect()
}

/// Returns the default values of formats that declare one.
///
/// Values are keyed by [`CustomFormat::name`], not by the table key, because
/// sanitize looks them up by the `format` written on a property.
///
/// # Examples
///
/// ```
/// use regex::Regex;
/// use schema_tools_core::*;
///
/// let mut formats = CustomFormats::new();
/// formats.insert(
///     "uuidFormat".into(),
///     CustomFormat::new("uuid", "Unique id", Regex::new(r"^[0-9a-f-]{36}$").unwrap())
///         .with_default("ffffffff-ffff-ffff-ffff-ffffffffffff"),
/// );
/// formats.insert(
///     "hour".into(),
///     CustomFormat::new("hour", "Hour of day", Regex::new(r"^\d{1,2}$").unwrap()),
/// );
///
/// let defaults = format_defaults(&formats);
/// assert_eq!(defaults.len(), 1);
/// assert!(defaults.contains_key("uuid"));
/// ```
pub fn format_defaults(formats: &CustomFormats) -> FormatDefaults {
    formats
        .values()
        .filter_map(|format| {
            format
                .default_value
                .as_ref()
                .map(|value| (format.name.clone(), value.clone()))
        })
        .collect()
}

/// Builds a regex that matches exactly one of `values` and nothing else.
///
/// Values are escaped, so they match literally.
///
/// # Examples
///
/// ```
/// use schema_tools_core::one_of_regex;
///
/// let r = one_of_regex(["foo", "bar"]).unwrap();
/// assert!(r.is_match("foo"));
/// assert!(r.is_match("bar"));
/// assert!(!r.is_match("FOO"));
/// assert!(!r.is_match("foobar"));
/// ```
pub fn one_of_regex<I, S>(values: I) -> Result<Regex, regex::Error>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let alternatives: Vec<String> = values
        .into_iter()
        .map(|value| regex::escape(value.as_ref()))
        .collect();
    Regex::new(&format!("^(?:{})$", alternatives.join("|")))
}

/// Returns the regex source, usable as a `patternProperties` key.
///
/// Sources written in `/.../` literal form lose their delimiters.
pub fn regex_as_pattern_key(regex: &Regex) -> String {
    let source = regex.as_str();
    source
        .strip_prefix('/')
        .and_then(|s| s.strip_suffix('/'))
        .unwrap_or(source)
        .to_string()
}
