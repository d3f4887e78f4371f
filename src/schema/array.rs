//! Array schema validation.
//!
//! This module provides [`ArraySchema`] for dynamic lists in a form, such as
//! a user-extendable list of entries. Every element is validated against the
//! element schema, then the list-level checks run.

use std::sync::Arc;

use indexmap::IndexMap;
use stillwater::Validation;

use crate::error::{finish, FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::value::Value;

use super::traits::SchemaLike;

type KeyFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// A constraint applied to the list as a whole.
#[derive(Clone)]
enum ArrayConstraint {
    MinItems { min: usize, message: Option<String> },
    MaxItems { max: usize, message: Option<String> },
    UniqueBy { key_fn: KeyFn, message: Option<String> },
}

/// A schema for validating arrays.
///
/// # Validation order
///
/// 1. A non-array input fails with one `invalid_type` error; nothing else runs.
/// 2. Each element is validated at `path[index]`; all element errors are kept.
/// 3. List-level checks (item counts, uniqueness) run regardless of element
///    results and append their errors at the array's own path.
///
/// # Example
///
/// ```rust
/// use formcheck::{validate, Schema, Value};
///
/// let techs = Schema::array(
///     Schema::object()
///         .field("title", Schema::string().non_empty())
///         .field("knowledge", Schema::number().coerce().bounds(1.0, 100.0).unwrap()),
/// )
/// .min_items(2);
///
/// let input = Value::Array(vec![Value::object([("title", "Go"), ("knowledge", "150")])]);
/// let errors = validate(&techs, &input).into_result().unwrap_err();
///
/// let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
/// assert_eq!(paths, vec!["[0].knowledge", ""]);
/// ```
#[derive(Clone)]
pub struct ArraySchema<S> {
    element: S,
    constraints: Vec<ArrayConstraint>,
    type_error_message: Option<String>,
}

impl<S: SchemaLike> ArraySchema<S> {
    pub fn new(element: S) -> Self {
        Self {
            element,
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    /// Requires at least `min` items.
    pub fn min_items(mut self, min: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MinItems { min, message: None });
        self
    }

    /// Allows at most `max` items.
    pub fn max_items(mut self, max: usize) -> Self {
        self.constraints
            .push(ArrayConstraint::MaxItems { max, message: None });
        self
    }

    /// Shorthand for `min_items(1)`.
    pub fn non_empty(self) -> Self {
        self.min_items(1)
    }

    /// Requires distinct keys across items. `key_fn` sees the raw items.
    ///
    /// One error is reported per group of colliding items.
    pub fn unique_by<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.constraints.push(ArrayConstraint::UniqueBy {
            key_fn: Arc::new(key_fn),
            message: None,
        });
        self
    }

    /// Sets the message of the most recently added check, or the type error
    /// message when no check was added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = Some(message.into());
        match self.constraints.last_mut() {
            Some(ArrayConstraint::MinItems { message: m, .. })
            | Some(ArrayConstraint::MaxItems { message: m, .. })
            | Some(ArrayConstraint::UniqueBy { message: m, .. }) => *m = message,
            None => self.type_error_message = message,
        }
        self
    }

    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Vec<Value>, FieldErrors> {
        let Some(items) = value.as_array() else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "expected array".to_string());
            return Validation::Failure(FieldErrors::single(
                FieldError::new(path.clone(), message)
                    .with_code("invalid_type")
                    .with_got(value.type_name())
                    .with_expected("array"),
            ));
        };

        let mut errors = Vec::new();
        let mut validated = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            match self.element.validate_to_value(item, &path.push_index(index)) {
                Validation::Success(v) => validated.push(v),
                Validation::Failure(e) => errors.extend(e),
            }
        }

        for constraint in &self.constraints {
            check_constraint(constraint, items, path, &mut errors);
        }

        finish(errors, || validated)
    }
}

impl<S: SchemaLike> SchemaLike for ArraySchema<S> {
    type Output = Vec<Value>;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Self::Output, FieldErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate(value, path).map(Value::Array)
    }
}

fn check_constraint(
    constraint: &ArrayConstraint,
    items: &[Value],
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) {
    match constraint {
        ArrayConstraint::MinItems { min, message } if items.len() < *min => {
            let msg = message.clone().unwrap_or_else(|| {
                format!("must have at least {} items, got {}", min, items.len())
            });
            errors.push(
                FieldError::new(path.clone(), msg)
                    .with_code("min_items")
                    .with_expected(format!("at least {} items", min))
                    .with_got(format!("{} items", items.len())),
            );
        }
        ArrayConstraint::MaxItems { max, message } if items.len() > *max => {
            let msg = message.clone().unwrap_or_else(|| {
                format!("must have at most {} items, got {}", max, items.len())
            });
            errors.push(
                FieldError::new(path.clone(), msg)
                    .with_code("max_items")
                    .with_expected(format!("at most {} items", max))
                    .with_got(format!("{} items", items.len())),
            );
        }
        ArrayConstraint::UniqueBy { key_fn, message } => {
            for indices in find_duplicates(items, key_fn.as_ref()) {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("duplicate entries at indices {:?}", indices));
                errors.push(
                    FieldError::new(path.clone(), msg)
                        .with_code("unique")
                        .with_got(format!("duplicates at indices {:?}", indices)),
                );
            }
        }
        _ => {}
    }
}

/// Groups of indices whose keys collide, in order of first appearance.
fn find_duplicates(items: &[Value], key_fn: &(dyn Fn(&Value) -> Value + Send + Sync)) -> Vec<Vec<usize>> {
    let mut seen: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (i, item) in items.iter().enumerate() {
        // Value holds floats, so it is keyed by its JSON rendering.
        let key = key_fn(item).to_json().to_string();
        seen.entry(key).or_default().push(i);
    }
    seen.into_values().filter(|indices| indices.len() > 1).collect()
}
