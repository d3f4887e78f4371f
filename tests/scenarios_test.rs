//! End-to-end validation scenarios: aggregation, transforms, arrays,
//! coercion and file sizes.

use formcheck::{transform, validate, FieldErrors, FileHandle, Schema, Value};
use stillwater::Validation;

fn unwrap_success<T, E: std::fmt::Debug>(v: Validation<T, E>) -> T {
    v.into_result().unwrap()
}

fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
    v.into_result().unwrap_err()
}

fn paths(errors: &FieldErrors) -> Vec<String> {
    errors.iter().map(|e| e.path.to_string()).collect()
}

#[test]
fn test_every_failing_field_is_reported() {
    let schema = Schema::object()
        .field("name", Schema::string().non_empty())
        .field("email", Schema::string().non_empty().email())
        .field("password", Schema::string().min_len(6));

    let input = Value::object([("name", " "), ("email", "bad"), ("password", "12345")]);
    let errors = unwrap_failure(validate(&schema, &input));

    assert_eq!(errors.len(), 3);
    assert_eq!(paths(&errors), vec!["name", "email", "password"]);
    let codes: Vec<_> = errors.iter().map(|e| e.code.as_str()).collect();
    assert_eq!(codes, vec!["non_empty", "email", "min_length"]);
}

#[test]
fn test_transform_applied_on_success() {
    let schema = Schema::object().field(
        "name",
        Schema::string().non_empty().transform(transform::capitalize_words),
    );

    let data = unwrap_success(validate(&schema, &Value::object([("name", "ada lovelace")])));
    assert_eq!(data["name"], Value::from("Ada Lovelace"));
    assert_eq!(data.len(), 1);
}

#[test]
fn test_min_items_and_element_errors_together() {
    let schema = Schema::array(
        Schema::object()
            .field("title", Schema::string().non_empty())
            .field(
                "knowledge",
                Schema::number().coerce().bounds(1.0, 100.0).unwrap(),
            ),
    )
    .min_items(2);

    let input = Value::Array(vec![Value::object([("title", "Go"), ("knowledge", "150")])]);
    let errors = unwrap_failure(validate(&schema, &input));

    assert_eq!(paths(&errors), vec!["[0].knowledge", ""]);
    assert_eq!(errors.iter().next().unwrap().message, "must be between 1 and 100");
    assert_eq!(errors.with_code("min_items").len(), 1);
}

#[test]
fn test_min_items_independent_of_element_validity() {
    let schema = Schema::array(Schema::string().non_empty())
        .min_items(3)
        .error("Add at least 3");

    let errors = unwrap_failure(validate(
        &schema,
        &Value::Array(vec![Value::from("a"), Value::from("b")]),
    ));
    assert_eq!(errors.len(), 1);
    assert!(errors.first().path.is_root());
    assert_eq!(errors.first().message, "Add at least 3");
}

#[test]
fn test_file_size_bound() {
    let schema = Schema::file()
        .max_size(5 * 1024 * 1024)
        .error("Avatar must be at most 5MB");

    let large = Value::from(FileHandle::new("a.png", 6 * 1024 * 1024, "image/png"));
    let errors = unwrap_failure(validate(&schema, &large));
    assert_eq!(errors.first().message, "Avatar must be at most 5MB");

    let small = Value::from(FileHandle::new("a.png", 1024, "image/png"));
    assert_eq!(unwrap_success(validate(&schema, &small)).size, 1024);
}

#[test]
fn test_coercion_success_and_short_circuit() {
    let schema = Schema::number().coerce().min(50.0).max(10.0);

    let errors = unwrap_failure(validate(&schema, &Value::from("abc")));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first().message, "invalid number");

    let schema = Schema::number().coerce();
    assert_eq!(unwrap_success(validate(&schema, &Value::from("42"))), 42.0);
    assert_eq!(unwrap_success(validate(&schema, &Value::from(" 7.5 "))), 7.5);
    assert!(validate(&schema, &Value::from("")).is_failure());
    assert!(validate(&schema, &Value::from("   ")).is_failure());
    assert!(validate(&schema, &Value::from("inf")).is_failure());
    assert!(validate(&schema, &Value::Null).is_failure());
}

#[test]
fn test_bounds_are_inclusive() {
    let schema = Schema::number().min(1.0).max(100.0);
    assert!(validate(&schema, &Value::from(1)).is_success());
    assert!(validate(&schema, &Value::from(100)).is_success());
    assert!(validate(&schema, &Value::from(100.5)).is_failure());
}

#[test]
fn test_nested_errors_carry_full_paths() {
    let schema = Schema::object().field(
        "techs",
        Schema::array(
            Schema::object()
                .field("title", Schema::string().non_empty())
                .field("knowledge", Schema::number().coerce().min(1.0).max(100.0)),
        ),
    );

    let input = Value::object([(
        "techs",
        Value::Array(vec![
            Value::object([("title", "Rust"), ("knowledge", "90")]),
            Value::object([("title", ""), ("knowledge", "x")]),
        ]),
    )]);
    let errors = unwrap_failure(validate(&schema, &input));
    assert_eq!(paths(&errors), vec!["techs[1].title", "techs[1].knowledge"]);
}

#[test]
fn test_shape_failure_stops_at_node_only() {
    let schema = Schema::object()
        .field("name", Schema::string().min_len(2).max_len(4))
        .field("age", Schema::number().min(0.0));

    let input = Value::object([("name", Value::from(12)), ("age", Value::from(-1))]);
    let errors = unwrap_failure(validate(&schema, &input));

    // One type error for name, not one per length check; age still checked.
    assert_eq!(errors.len(), 2);
    assert_eq!(errors.first().code, "invalid_type");
    assert_eq!(errors.with_code("min_value").len(), 1);
}

#[test]
fn test_unknown_fields_are_stripped() {
    let schema = Schema::object().field("a", Schema::string());
    let data = unwrap_success(validate(&schema, &Value::object([("a", "1"), ("b", "2")])));
    assert_eq!(data.keys().collect::<Vec<_>>(), vec!["a"]);
}
