//! Tests for descriptor compilation.

use formcheck::descriptor::{self, Descriptor};
use formcheck::{signup, validate, FileHandle, SchemaBuildError, Value};
use serde_json::json;

fn signup_descriptor() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "avatar": {
                "type": "file_list",
                "first": { "type": "file", "maxSize": 5242880, "message": "Avatar must be at most 5MB" }
            },
            "name": { "type": "string", "nonEmpty": true, "message": "Name is required", "transform": "capitalize_words" },
            "email": { "type": "string", "nonEmpty": true, "format": "email", "transform": "lowercase" },
            "password": { "type": "string", "minLength": 6 },
            "techs": {
                "type": "array",
                "minItems": 2,
                "message": "Add at least 2 technologies",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string", "nonEmpty": true },
                        "knowledge": { "type": "number", "coerce": true, "minimum": 1, "maximum": 100 }
                    },
                    "required": ["title", "knowledge"]
                }
            }
        },
        "required": ["avatar", "name", "email", "password", "techs"]
    })
}

fn sample_input() -> Value {
    Value::object([
        ("avatar", Value::from(vec![FileHandle::new("me.png", 4096, "image/png")])),
        ("name", Value::from("ada lovelace")),
        ("email", Value::from("ADA@example.com")),
        ("password", Value::from("analytical")),
        (
            "techs",
            Value::Array(vec![
                Value::object([("title", "Rust"), ("knowledge", "80")]),
                Value::object([("title", "Go"), ("knowledge", "40")]),
            ]),
        ),
    ])
}

#[test]
fn test_descriptor_matches_builder_form() {
    let compiled = descriptor::compile(&signup_descriptor()).unwrap();
    let from_descriptor = validate(&compiled, &sample_input()).into_result().unwrap();
    let from_builder = validate(&signup::form(), &sample_input()).into_result().unwrap();

    assert_eq!(from_descriptor, Value::Object(from_builder));
}

#[test]
fn test_descriptor_errors_follow_property_order() {
    let compiled = descriptor::compile(&signup_descriptor()).unwrap();
    let input = Value::object([
        ("techs", Value::Array(vec![Value::object([("title", ""), ("knowledge", "0")])])),
        ("password", Value::from("1")),
        ("name", Value::from(" ")),
    ]);

    let errors = validate(&compiled, &input).into_result().unwrap_err();
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "avatar",
            "name",
            "email",
            "password",
            "techs[0].title",
            "techs[0].knowledge",
            "techs"
        ]
    );
}

#[test]
fn test_descriptor_parses_from_text() {
    let parsed: Descriptor = r#"{ "type": "string", "maxLength": 3 }"#.parse().unwrap();
    assert_eq!(parsed.max_length, Some(3));

    let schema = parsed.compile().unwrap();
    assert!(validate(&schema, &Value::from("abcd")).is_failure());
}

#[test]
fn test_construction_errors_are_input_independent() {
    let cases = [
        json!({ "type": "string", "maximum": 3 }),
        json!({ "type": "number", "minLength": 3 }),
        json!({ "type": "file", "pattern": "x" }),
        json!({ "type": "array", "minItems": 1 }),
        json!({ "type": "object", "properties": { "x": { "type": "array" } } }),
    ];

    for case in cases {
        let err = descriptor::compile(&case).err().unwrap();
        assert!(
            matches!(
                err,
                SchemaBuildError::UnsupportedCheck { .. } | SchemaBuildError::MissingElement { .. }
            ),
            "{} -> {}",
            case,
            err
        );
    }
}

#[test]
fn test_missing_element_reports_location() {
    let err = descriptor::compile(&json!({
        "type": "object",
        "properties": {
            "groups": {
                "type": "array",
                "items": { "type": "object", "properties": { "members": { "type": "array" } } }
            }
        }
    }))
    .err()
    .unwrap();

    assert_eq!(
        err.to_string(),
        "array schema at 'groups[].members' has no element schema"
    );
}
