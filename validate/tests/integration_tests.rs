use regex::Regex;
use schema_tools_core::{
    CustomFormat, CustomFormats, ExtensionSource, ObjectSchema, PlainObject, PrimitiveType,
    PropertyAddition, PropertyDescriptor, SchemaCollection, SchemaDelta, SchemaDocument,
    SchemaPatch, SemanticVersion, add_property, combine_schemas, detectors, extend,
    version_schemas,
};
use schema_tools_validate::{
    AssertError, AssertOptions, ValidateOptions, assert_schema, validate, validate_by_schema,
};
use serde_json::{Value, json};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn object(value: Value) -> PlainObject {
    value.as_object().cloned().unwrap()
}

fn example_formats() -> CustomFormats {
    let mut formats = CustomFormats::new();
    formats.insert(
        "name".into(),
        CustomFormat::new("name", "Custom name format", Regex::new("^[A-Z][a-z]+$").unwrap())
            .with_default("Buddy"),
    );
    formats
}

fn person100() -> ObjectSchema {
    ObjectSchema::new(
        SemanticVersion::new(1, 0, 0),
        SchemaDocument::new("Person")
            .with_description("An example schema describing a person")
            .with_property(
                "name",
                PropertyDescriptor::of(PrimitiveType::String)
                    .with_format("name")
                    .with_description("this person needs a name"),
            )
            .with_property(
                "age",
                PropertyDescriptor::of(PrimitiveType::Integer)
                    .with_minimum(0)
                    .with_description("Age in years"),
            )
            .with_required(["name", "age"])
            .closed(),
        object(json!({"name": "Joe", "age": 10})),
    )
}

/// Person fields inlined as array items, marked with the dialect shorthand.
fn person_item() -> PropertyDescriptor {
    let mut item = PropertyDescriptor::of(PrimitiveType::Object)
        .with_property(
            "name",
            PropertyDescriptor::of(PrimitiveType::String).with_format("name").required(),
        )
        .with_property(
            "age",
            PropertyDescriptor::of(PrimitiveType::Integer).with_minimum(0).required(),
        );
    item.additional_properties = Some(false);
    item
}

fn team100() -> ObjectSchema {
    let person = person100();
    ObjectSchema::new(
        SemanticVersion::new(1, 0, 0),
        SchemaDocument::new("Team")
            .with_description("A team of people")
            .with_property(
                "people",
                PropertyDescriptor::array_of(person_item()).with_see(&person),
            ),
        object(json!({"people": [person.example]})),
    )
}

fn schemas() -> SchemaCollection {
    combine_schemas([
        version_schemas([person100()]).unwrap(),
        version_schemas([team100()]).unwrap(),
    ])
}

fn errors_of(result: Result<(), schema_tools_validate::ValidationErrors>) -> Vec<String> {
    result.err().map(|e| e.into_inner()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_examples_conform_to_their_schemas() {
    let collection = schemas();
    let formats = detectors(&example_formats());
    let options = ValidateOptions::new().with_formats(&formats);

    for (name, schema) in collection.object_schemas() {
        let result = validate(
            &collection,
            name,
            &schema.version.to_string(),
            &Value::Object(schema.example.clone()),
            &options,
        );
        assert!(result.is_ok(), "{name}@{}: {result:?}", schema.version);
    }
}

#[test]
fn test_missing_required_field() {
    let collection = schemas();
    let result = validate(&collection, "Person", "1.0.0", &json!({"age": 10}), &ValidateOptions::new());
    assert_eq!(errors_of(result), vec!["data.name is required"]);
}

#[test]
fn test_additional_property_reported_by_name() {
    let collection = schemas();
    let result = validate(
        &collection,
        "person",
        "1.0.0",
        &json!({"name": "test", "age": 1, "foo": "bar"}),
        &ValidateOptions::new(),
    );
    assert_eq!(errors_of(result), vec!["data has additional properties: foo"]);
}

#[test]
fn test_missing_schema_name_is_a_result() {
    let result = validate(&schemas(), "Nobody", "1.0.0", &json!({}), &ValidateOptions::new());
    assert_eq!(errors_of(result), vec!["Missing schema nobody"]);
}

#[test]
fn test_builtin_and_standard_formats() {
    let doc: SchemaDocument = serde_json::from_value(json!({
        "title": "TestSchema",
        "type": "object",
        "properties": {
            "createdAt": {"type": "string", "format": "date-time"},
            "name": {"type": "string"},
            "hook": {"type": "string", "format": "hookId"}
        },
        "required": ["createdAt", "name", "hook"]
    }))
    .unwrap();
    let options = ValidateOptions::new();

    assert!(validate_by_schema(
        &doc,
        &json!({"createdAt": "2024-01-15T10:30:00Z", "name": "Joe", "hook": "h1"}),
        &options
    )
    .is_ok());

    let result = validate_by_schema(&doc, &json!({"name": "Joe", "hook": "h1"}), &options);
    assert_eq!(errors_of(result), vec!["data.createdAt is required"]);

    let result = validate_by_schema(
        &doc,
        &json!({"createdAt": "Sunday", "name": "Joe", "hook": "h1"}),
        &options,
    );
    assert_eq!(errors_of(result), vec!["data.createdAt must be date-time format"]);

    let result = validate_by_schema(
        &doc,
        &json!({"createdAt": "2024-01-15T10:30:00Z", "name": "Joe", "hook": ""}),
        &options,
    );
    assert_eq!(errors_of(result), vec!["data.hook must be hookId format"]);
}

#[test]
fn test_team_validates_nested_people() {
    let collection = schemas();
    let formats = detectors(&example_formats());
    let options = ValidateOptions::new().with_formats(&formats);

    let result = validate(
        &collection,
        "team",
        "1.0.0",
        &json!({"people": [{"name": "Joe", "age": 10}, {"name": "mary", "age": 1}]}),
        &options,
    );
    assert_eq!(errors_of(result), vec!["data.people[1].name must be name format"]);

    let result = validate(&collection, "team", "1.0.0", &json!({}), &options);
    assert_eq!(errors_of(result), vec!["data.people is required"]);
}

#[test]
fn test_string_length_bounds() {
    let doc = SchemaDocument::new("Bounded").with_property(
        "code",
        PropertyDescriptor::of(PrimitiveType::String).with_length(Some(2), Some(3)),
    );
    let options = ValidateOptions::new();
    assert!(validate_by_schema(&doc, &json!({"code": "ab"}), &options).is_ok());
    assert_eq!(
        errors_of(validate_by_schema(&doc, &json!({"code": "a"}), &options)),
        vec!["data.code has less length than allowed"]
    );
    assert_eq!(
        errors_of(validate_by_schema(&doc, &json!({"code": "abcd"}), &options)),
        vec!["data.code has longer length than allowed"]
    );
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

#[test]
fn test_assert_returns_original_object() {
    let input = json!({"name": "Joe", "age": -1});
    let options = AssertOptions::new().substitute("age");
    let output = assert_schema(&schemas(), "person", "1.0.0", input.clone(), &options).unwrap();
    assert_eq!(output, input);
}

#[test]
fn test_assert_uses_custom_formats() {
    let formats = detectors(&example_formats());
    let options = AssertOptions::new().with_validate(ValidateOptions::new().with_formats(&formats));
    let err = assert_schema(&schemas(), "person", "1.0.0", json!({"name": "joe", "age": 1}), &options)
        .unwrap_err();
    let AssertError::Violated(err) = err else {
        panic!("expected a violation");
    };
    assert_eq!(err.errors, vec!["data.name must be name format"]);
    assert_eq!(err.example, person100().example);
}

// ---------------------------------------------------------------------------
// Evolution keeps examples valid
// ---------------------------------------------------------------------------

#[test]
fn test_derived_versions_validate_their_examples() {
    let person100 = person100();
    let person110 = extend(
        &person100,
        &SchemaDelta::new(
            SchemaPatch::new()
                .with_description("Person with title")
                .with_property(
                    "title",
                    PropertyDescriptor::of(PrimitiveType::String).with_description("How to address"),
                )
                .with_required(["title"]),
        )
        .with_example(object(json!({"title": "mr"}))),
    );
    let person120 = add_property(
        &ExtensionSource::new(&person110, "Person with mood"),
        &[PropertyAddition::new("mood", PrimitiveType::String, json!("happy"))],
    );

    let collection = combine_schemas([
        version_schemas([person100.clone(), person110, person120]).unwrap(),
    ]);
    assert_eq!(collection.schema_versions("person"), vec!["1.0.0", "1.1.0", "1.2.0"]);

    for version in ["1.0.0", "1.1.0", "1.2.0"] {
        let example = collection.get_example("person", version).cloned().unwrap();
        let result = validate(&collection, "person", version, &Value::Object(example), &ValidateOptions::new());
        assert!(result.is_ok(), "person@{version}: {result:?}");
    }

    let result = validate(
        &collection,
        "person",
        "1.1.0",
        &Value::Object(person100.example.clone()),
        &ValidateOptions::new(),
    );
    assert_eq!(errors_of(result), vec!["data.title is required"]);
}
