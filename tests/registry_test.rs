//! Tests for the schema registry, including concurrent access.

use formcheck::{signup, RegistryError, Schema, SchemaRegistry, Value};
use serde_json::json;
use std::sync::Arc;
use std::thread;

#[test]
fn test_register_and_validate_by_name() {
    let registry = SchemaRegistry::new();
    registry.register("signup", signup::form()).unwrap();
    registry
        .register_descriptor(
            "newsletter",
            &json!({
                "type": "object",
                "properties": { "email": { "type": "string", "format": "email", "transform": "lowercase" } },
                "required": ["email"]
            }),
        )
        .unwrap();

    assert_eq!(registry.names(), vec!["newsletter", "signup"]);

    let out = registry
        .validate("newsletter", &Value::from(json!({ "email": "A@B.io" })))
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(out.get("email"), Some(&Value::from("a@b.io")));
}

#[test]
fn test_missing_schema_is_an_error_not_a_failure() {
    let registry = SchemaRegistry::new();
    assert!(matches!(
        registry.validate("ghost", &Value::Null),
        Err(RegistryError::SchemaNotFound(_))
    ));
    assert!(matches!(
        registry.validate_batch("ghost", &[]),
        Err(RegistryError::SchemaNotFound(_))
    ));
}

#[test]
fn test_validate_field_for_live_feedback() {
    let registry = SchemaRegistry::new();
    registry.register("signup", signup::form()).unwrap();

    let ok = registry
        .validate_field("signup", "name", &Value::from("ada"))
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(ok, Value::from("Ada"));

    let errors = registry
        .validate_field("signup", "techs", &Value::Array(vec![]))
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(errors.first().path.to_string(), "techs");
    assert_eq!(errors.first().message, "Add at least 2 technologies");
}

#[test]
fn test_concurrent_validation() {
    let registry = Arc::new(SchemaRegistry::new());

    registry
        .register(
            "user",
            Schema::object()
                .field("name", Schema::string().non_empty())
                .field("age", Schema::number().coerce().positive()),
        )
        .unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let input = Value::object([
                    ("name", Value::from(format!("User{}", i))),
                    ("age", Value::from((20 + i).to_string())),
                ]);
                let result = registry.validate("user", &input).unwrap();
                assert!(result.is_success());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_registration() {
    let registry = Arc::new(SchemaRegistry::new());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                registry
                    .register(format!("schema{}", i), Schema::string().min_len(i))
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.names().len(), 10);
}

#[test]
fn test_batch_results_follow_input_order() {
    let registry = SchemaRegistry::new();
    registry
        .register("score", Schema::number().coerce().min(0.0).max(10.0))
        .unwrap();

    let values: Vec<Value> = (-20..20).map(|n| Value::from(n.to_string())).collect();
    let results = registry.validate_batch("score", &values).unwrap();

    for (n, result) in (-20..20).zip(results) {
        match result.into_result() {
            Ok(v) => {
                assert!((0..=10).contains(&n));
                assert_eq!(v, Value::Number(n as f64));
            }
            Err(_) => assert!(!(0..=10).contains(&n)),
        }
    }
}
