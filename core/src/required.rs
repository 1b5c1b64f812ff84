//! Canonicalization of the `required` field.
//!
//! Authored schemas may say `required: true` to mean "every property". Before
//! a document is validated or placed in a collection, that shorthand is
//! replaced with the explicit list of property names.

use crate::{RequiredSpec, SchemaDocument};

/// Replaces `required: true` with the explicit list of required properties.
///
/// Properties individually marked `required: false` are left out; all other
/// properties are included in declaration order. An explicit list is left
/// unchanged. Calling this more than once has no further effect.
///
/// # Examples
///
/// ```
/// use schema_tools_core::*;
///
/// let mut doc = SchemaDocument::new("Example")
///     .with_property("a", PropertyDescriptor::of(PrimitiveType::String))
///     .with_property("b", PropertyDescriptor::of(PrimitiveType::String).optional())
///     .with_property("c", PropertyDescriptor::of(PrimitiveType::String))
///     .all_required();
///
/// normalize_required(&mut doc);
/// assert_eq!(doc.required, RequiredSpec::List(vec!["a".into(), "c".into()]));
/// ```
pub fn normalize_required(schema: &mut SchemaDocument) -> &mut SchemaDocument {
    if schema.required == RequiredSpec::All {
        let names = schema
            .properties
            .iter()
            .filter(|(_, property)| !property.is_optional())
            .map(|(name, _)| name.clone())
            .collect();
        schema.required = RequiredSpec::List(names);
    }
    schema
}

/// Returns the explicit required list, normalizing a copy when needed.
pub fn required_names(schema: &SchemaDocument) -> Vec<String> {
    match &schema.required {
        RequiredSpec::List(names) => names.clone(),
        RequiredSpec::All => {
            let mut copy = schema.clone();
            normalize_required(&mut copy);
            copy.required.as_list().map(<[String]>::to_vec).unwrap_or_default()
        }
    }
}
