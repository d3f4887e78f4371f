//! Object schemas: optional and defaulted fields, unknown keys, cross-field
//! refinements and combinators.

use formcheck::{validate, Schema, SchemaExt, UnknownFields, Value};
use stillwater::Validation;

fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
    v.into_result().unwrap_err()
}

fn password_form() -> formcheck::ObjectSchema {
    Schema::object()
        .field("password", Schema::string().min_len(6))
        .field("confirm", Schema::string())
        .refine_at(
            "confirm",
            |obj| obj.get("password") == obj.get("confirm"),
            "Passwords do not match",
        )
}

#[test]
fn test_cross_field_refinement() {
    let ok = Value::object([("password", "hunter22"), ("confirm", "hunter22")]);
    assert!(validate(&password_form(), &ok).is_success());

    let mismatch = Value::object([("password", "hunter22"), ("confirm", "hunter23")]);
    let errors = unwrap_failure(validate(&password_form(), &mismatch));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().path.to_string(), "confirm");
    assert_eq!(errors.first().message, "Passwords do not match");
}

#[test]
fn test_refinement_skipped_while_fields_invalid() {
    let input = Value::object([("password", "short"), ("confirm", "other")]);
    let errors = unwrap_failure(validate(&password_form(), &input));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().code, "min_length");
}

#[test]
fn test_refinement_sees_transformed_values() {
    let schema = Schema::object()
        .field("email", Schema::string().transform(|s| s.to_lowercase()))
        .field("confirm", Schema::string().transform(|s| s.to_lowercase()))
        .refine(|obj| obj.get("email") == obj.get("confirm"), "Emails differ");

    let input = Value::object([("email", "A@B.io"), ("confirm", "a@b.IO")]);
    assert!(validate(&schema, &input).is_success());
}

#[test]
fn test_optional_and_default_fields() {
    let schema = Schema::object()
        .field("name", Schema::string())
        .optional("bio", Schema::string().max_len(10))
        .default("newsletter", Schema::string(), Value::from("weekly"))
        .field("nickname", Schema::string().optional());

    let data = validate(&schema, &Value::object([("name", "Ada")]))
        .into_result()
        .unwrap();
    assert_eq!(data.get("bio"), None);
    assert_eq!(data["newsletter"], Value::from("weekly"));
    assert_eq!(data.get("nickname"), Some(&Value::Null));

    let input = Value::object([("name", Value::from("Ada")), ("nickname", Value::Null)]);
    let data = validate(&schema, &input).into_result().unwrap();
    assert_eq!(data["nickname"], Value::Null);

    let errors = unwrap_failure(validate(&schema, &Value::object([("bio", "far too long a bio")])));
    let codes: Vec<_> = errors.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["required", "max_length"]);
}

#[test]
fn test_unknown_field_policies() {
    let input = Value::object([("name", "Ada"), ("role", "admin")]);

    let strip = Schema::object().field("name", Schema::string());
    assert_eq!(validate(&strip, &input).into_result().unwrap().len(), 1);

    let pass = Schema::object()
        .field("name", Schema::string())
        .unknown_fields(UnknownFields::Passthrough);
    assert_eq!(
        validate(&pass, &input).into_result().unwrap()["role"],
        Value::from("admin")
    );

    let deny = Schema::object()
        .field("name", Schema::string())
        .unknown_fields(UnknownFields::Deny);
    let errors = unwrap_failure(validate(&deny, &input));
    assert_eq!(errors.first().path.to_string(), "role");
    assert_eq!(errors.first().code, "unknown_field");
}

#[test]
fn test_non_object_input() {
    let schema = Schema::object()
        .field("name", Schema::string())
        .error("Form data is missing");
    let errors = unwrap_failure(validate(&schema, &Value::from("name=Ada")));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().message, "Form data is missing");
}

#[test]
fn test_validate_field_in_isolation() {
    let schema = password_form();
    let root = formcheck::FieldPath::root();

    let result = schema.validate_field("password", &Value::from("abc"), &root).unwrap();
    assert_eq!(unwrap_failure(result).first().path.to_string(), "password");
    assert!(schema.validate_field("username", &Value::Null, &root).is_none());
}

#[test]
fn test_pipe_splits_then_validates_list() {
    let tags = Schema::string()
        .map(|v| match v {
            Value::String(s) => Value::Array(
                s.split(',')
                    .map(|t| Value::from(t.trim()))
                    .collect(),
            ),
            other => other,
        })
        .pipe(Schema::array(Schema::string().non_empty()).max_items(2));

    let schema = Schema::object().field("tags", tags);

    let errors = unwrap_failure(validate(&schema, &Value::object([("tags", "a, ,b")])));
    let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["tags[1]", "tags"]);
}
