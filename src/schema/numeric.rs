//! Numeric schema validation.
//!
//! This module provides [`NumberSchema`] for validating numbers, optionally
//! coercing form text such as `"42"` into a number before any check runs.

use std::sync::Arc;

use stillwater::Validation;

use crate::error::{finish, FieldError, FieldErrors, SchemaBuildError};
use crate::path::FieldPath;
use crate::value::Value;

use super::traits::SchemaLike;

type NumPredicate = Arc<dyn Fn(f64) -> bool + Send + Sync>;
type NumTransform = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A constraint applied to numeric values.
#[derive(Clone)]
enum NumberConstraint {
    Min { value: f64, message: Option<String> },
    Max { value: f64, message: Option<String> },
    Int { message: Option<String> },
    Positive { message: Option<String> },
    Refine { predicate: NumPredicate, message: String },
}

/// A schema for validating numbers.
///
/// Without [`coerce`](Self::coerce) only [`Value::Number`] is accepted. With
/// it, strings and booleans are converted first; a value that cannot be
/// converted fails with `invalid number` and no bound is checked.
///
/// # Example
///
/// ```rust
/// use formcheck::{validate, Schema, Value};
///
/// let knowledge = Schema::number().coerce().bounds(1.0, 100.0).unwrap();
///
/// assert_eq!(validate(&knowledge, &Value::from("42")).into_result().unwrap(), 42.0);
///
/// let errors = validate(&knowledge, &Value::from("abc")).into_result().unwrap_err();
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.first().message, "invalid number");
/// ```
#[derive(Clone)]
pub struct NumberSchema {
    constraints: Vec<NumberConstraint>,
    coerce: bool,
    type_error_message: Option<String>,
    transform: Option<NumTransform>,
}

impl NumberSchema {
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            coerce: false,
            type_error_message: None,
            transform: None,
        }
    }

    /// Converts strings and booleans to numbers before checking.
    ///
    /// Strings are trimmed; empty, whitespace-only, non-numeric and
    /// non-finite strings fail rather than becoming zero. `true` and `false`
    /// become `1` and `0`.
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Adds an inclusive lower bound.
    pub fn min(mut self, value: f64) -> Self {
        self.constraints.push(NumberConstraint::Min {
            value,
            message: None,
        });
        self
    }

    /// Adds an inclusive upper bound.
    pub fn max(mut self, value: f64) -> Self {
        self.constraints.push(NumberConstraint::Max {
            value,
            message: None,
        });
        self
    }

    /// Adds a single inclusive range check reporting one message for either
    /// side.
    ///
    /// # Errors
    ///
    /// Fails if either bound is not finite or `min > max`.
    pub fn bounds(self, min: f64, max: f64) -> Result<Self, SchemaBuildError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(SchemaBuildError::NonFiniteBound { min, max });
        }
        if min > max {
            return Err(SchemaBuildError::InvertedBounds { min, max });
        }
        Ok(self.refine(
            move |n| n >= min && n <= max,
            format!("must be between {} and {}", min, max),
        ))
    }

    /// Requires a whole number.
    pub fn int(mut self) -> Self {
        self.constraints.push(NumberConstraint::Int { message: None });
        self
    }

    /// Requires a value greater than zero.
    pub fn positive(mut self) -> Self {
        self.constraints
            .push(NumberConstraint::Positive { message: None });
        self
    }

    /// Adds a caller-supplied check, evaluated in declaration order.
    pub fn refine<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(f64) -> bool + Send + Sync + 'static,
    {
        self.constraints.push(NumberConstraint::Refine {
            predicate: Arc::new(predicate),
            message: message.into(),
        });
        self
    }

    /// Sets the transform applied after every check passes.
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Sets the message of the most recently added check, or the
    /// type/coercion message when no check was added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.constraints.last_mut() {
            Some(NumberConstraint::Min { message: m, .. })
            | Some(NumberConstraint::Max { message: m, .. })
            | Some(NumberConstraint::Int { message: m })
            | Some(NumberConstraint::Positive { message: m }) => *m = Some(message),
            Some(NumberConstraint::Refine { message: m, .. }) => *m = message,
            None => self.type_error_message = Some(message),
        }
        self
    }

    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<f64, FieldErrors> {
        let n = match self.read_number(value) {
            Some(n) => n,
            None if self.coerce => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| "invalid number".to_string());
                return Validation::Failure(FieldErrors::single(
                    FieldError::new(path.clone(), message)
                        .with_code("invalid_number")
                        .with_got(describe(value))
                        .with_expected("number"),
                ));
            }
            None => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| "expected number".to_string());
                return Validation::Failure(FieldErrors::single(
                    FieldError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(value.type_name())
                        .with_expected("number"),
                ));
            }
        };

        let errors: Vec<FieldError> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, n, path))
            .collect();

        finish(errors, || match &self.transform {
            Some(transform) => transform(n),
            None => n,
        })
    }

    fn read_number(&self, value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::String(s) if self.coerce => coerce_str(s),
            Value::Bool(b) if self.coerce => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }
}

impl Default for NumberSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for NumberSchema {
    type Output = f64;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<f64, FieldErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate(value, path).map(Value::Number)
    }
}

fn coerce_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.type_name().to_string(),
    }
}

fn check_constraint(constraint: &NumberConstraint, value: f64, path: &FieldPath) -> Option<FieldError> {
    match constraint {
        NumberConstraint::Min { value: min, message } => {
            if value >= *min {
                return None;
            }
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("must be at least {}, got {}", min, value));
            Some(
                FieldError::new(path.clone(), msg)
                    .with_code("min_value")
                    .with_expected(format!("at least {}", min))
                    .with_got(value.to_string()),
            )
        }
        NumberConstraint::Max { value: max, message } => {
            if value <= *max {
                return None;
            }
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("must be at most {}, got {}", max, value));
            Some(
                FieldError::new(path.clone(), msg)
                    .with_code("max_value")
                    .with_expected(format!("at most {}", max))
                    .with_got(value.to_string()),
            )
        }
        NumberConstraint::Int { message } => {
            if value.fract() == 0.0 {
                return None;
            }
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("must be a whole number, got {}", value));
            Some(
                FieldError::new(path.clone(), msg)
                    .with_code("not_integer")
                    .with_expected("whole number")
                    .with_got(value.to_string()),
            )
        }
        NumberConstraint::Positive { message } => {
            if value > 0.0 {
                return None;
            }
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("must be positive, got {}", value));
            Some(
                FieldError::new(path.clone(), msg)
                    .with_code("positive")
                    .with_expected("value > 0")
                    .with_got(value.to_string()),
            )
        }
        NumberConstraint::Refine { predicate, message } => {
            if predicate(value) {
                None
            } else {
                Some(
                    FieldError::new(path.clone(), message.clone())
                        .with_code("custom")
                        .with_got(value.to_string()),
                )
            }
        }
    }
}
