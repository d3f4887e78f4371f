//! String schema validation.
//!
//! This module provides [`StringSchema`] for validating text inputs with
//! constraints like non-emptiness, length bounds, regex patterns and email
//! format, followed by an optional normalizing transform.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use stillwater::Validation;

use crate::error::{finish, FieldError, FieldErrors, SchemaBuildError};
use crate::path::FieldPath;
use crate::value::Value;

use super::traits::SchemaLike;

type StrPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;
type StrTransform = Arc<dyn Fn(String) -> String + Send + Sync>;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$";

/// The compiled email pattern. `None` only if `EMAIL_PATTERN` stops
/// compiling, in which case every value fails the email check.
fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// A constraint applied to string values.
#[derive(Clone)]
enum StringConstraint {
    NonEmpty {
        message: Option<String>,
    },
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
    Email {
        message: Option<String>,
    },
    Refine {
        predicate: StrPredicate,
        message: String,
    },
}

/// A schema for validating string values.
///
/// Checks run in the order they were declared and every failing check
/// contributes its own error. A value that is not a string fails with a
/// single `invalid_type` error and no further checks run.
///
/// # Example
///
/// ```rust
/// use formcheck::{validate, Schema, Value};
///
/// let schema = Schema::string()
///     .non_empty()
///     .error("Email is required")
///     .email()
///     .error("Invalid email")
///     .transform(|s| s.to_lowercase());
///
/// let result = validate(&schema, &Value::from("Ada@Example.COM"));
/// assert_eq!(result.into_result().unwrap(), "ada@example.com");
///
/// let result = validate(&schema, &Value::from(" "));
/// assert_eq!(result.into_result().unwrap_err().len(), 2);
/// ```
#[derive(Clone)]
pub struct StringSchema {
    constraints: Vec<StringConstraint>,
    type_error_message: Option<String>,
    transform: Option<StrTransform>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            type_error_message: None,
            transform: None,
        }
    }

    /// Requires at least one non-whitespace character.
    pub fn non_empty(mut self) -> Self {
        self.constraints
            .push(StringConstraint::NonEmpty { message: None });
        self
    }

    /// Requires at least `min` characters (Unicode scalar values).
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(StringConstraint::MinLength { min, message: None });
        self
    }

    /// Allows at most `max` characters (Unicode scalar values).
    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(StringConstraint::MaxLength { max, message: None });
        self
    }

    /// Requires a match of the regex `pattern` somewhere in the value.
    ///
    /// Anchor the pattern with `^...$` to match the whole string.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaBuildError::InvalidPattern`] if `pattern` does not
    /// compile.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, SchemaBuildError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaBuildError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.constraints.push(StringConstraint::Pattern {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Requires an email-shaped value (`local@domain.tld`).
    pub fn email(mut self) -> Self {
        self.constraints
            .push(StringConstraint::Email { message: None });
        self
    }

    /// Adds a caller-supplied check. It runs in declaration order with the
    /// built-in checks and reports `message` when `predicate` returns false.
    ///
    /// ```rust
    /// use formcheck::{validate, Schema, Value};
    ///
    /// let schema = Schema::string().refine(|s| s.chars().any(|c| c.is_ascii_digit()), "needs a digit");
    /// assert!(validate(&schema, &Value::from("abc")).is_failure());
    /// assert!(validate(&schema, &Value::from("abc1")).is_success());
    /// ```
    pub fn refine<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.constraints.push(StringConstraint::Refine {
            predicate: Arc::new(predicate),
            message: message.into(),
        });
        self
    }

    /// Sets the transform applied after every check passes, replacing any
    /// earlier one.
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Sets the message of the most recently added check.
    ///
    /// Called before any check, it sets the message used when the value is
    /// not a string at all.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.constraints.last_mut() {
            Some(StringConstraint::NonEmpty { message: m })
            | Some(StringConstraint::MinLength { message: m, .. })
            | Some(StringConstraint::MaxLength { message: m, .. })
            | Some(StringConstraint::Pattern { message: m, .. })
            | Some(StringConstraint::Email { message: m }) => *m = Some(message),
            Some(StringConstraint::Refine { message: m, .. }) => *m = message,
            None => self.type_error_message = Some(message),
        }
        self
    }

    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<String, FieldErrors> {
        let s = match value.as_str() {
            Some(s) => s,
            None => {
                let message = self
                    .type_error_message
                    .clone()
                    .unwrap_or_else(|| "expected string".to_string());
                return Validation::Failure(FieldErrors::single(
                    FieldError::new(path.clone(), message)
                        .with_code("invalid_type")
                        .with_got(value.type_name())
                        .with_expected("string"),
                ));
            }
        };

        let errors: Vec<FieldError> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, s, path))
            .collect();

        finish(errors, || match &self.transform {
            Some(transform) => transform(s.to_string()),
            None => s.to_string(),
        })
    }
}

impl Default for StringSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for StringSchema {
    type Output = String;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<String, FieldErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate(value, path).map(Value::String)
    }
}

fn check_constraint(constraint: &StringConstraint, value: &str, path: &FieldPath) -> Option<FieldError> {
    match constraint {
        StringConstraint::NonEmpty { message } => {
            if value.trim().is_empty() {
                let msg = message.clone().unwrap_or_else(|| "must not be empty".to_string());
                Some(
                    FieldError::new(path.clone(), msg)
                        .with_code("non_empty")
                        .with_expected("non-blank text"),
                )
            } else {
                None
            }
        }
        StringConstraint::MinLength { min, message } => {
            let len = value.chars().count();
            if len < *min {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("length must be at least {}, got {}", min, len));
                Some(
                    FieldError::new(path.clone(), msg)
                        .with_code("min_length")
                        .with_expected(format!("at least {} characters", min))
                        .with_got(format!("{} characters", len)),
                )
            } else {
                None
            }
        }
        StringConstraint::MaxLength { max, message } => {
            let len = value.chars().count();
            if len > *max {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("length must be at most {}, got {}", max, len));
                Some(
                    FieldError::new(path.clone(), msg)
                        .with_code("max_length")
                        .with_expected(format!("at most {} characters", max))
                        .with_got(format!("{} characters", len)),
                )
            } else {
                None
            }
        }
        StringConstraint::Pattern { regex, message } => {
            if regex.is_match(value) {
                return None;
            }
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("must match pattern '{}'", regex.as_str()));
            Some(
                FieldError::new(path.clone(), msg)
                    .with_code("pattern")
                    .with_expected(format!("string matching '{}'", regex.as_str()))
                    .with_got(value),
            )
        }
        StringConstraint::Email { message } => {
            if email_regex().is_some_and(|re| re.is_match(value)) {
                return None;
            }
            let msg = message
                .clone()
                .unwrap_or_else(|| "invalid email address".to_string());
            Some(
                FieldError::new(path.clone(), msg)
                    .with_code("email")
                    .with_expected("email address")
                    .with_got(value),
            )
        }
        StringConstraint::Refine { predicate, message } => {
            if predicate(value) {
                None
            } else {
                Some(FieldError::new(path.clone(), message.clone()).with_code("custom"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_success<T, E: std::fmt::Debug>(v: Validation<T, E>) -> T {
        v.into_result().unwrap()
    }

    fn unwrap_failure<T: std::fmt::Debug, E>(v: Validation<T, E>) -> E {
        v.into_result().unwrap_err()
    }

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_accepts_string() {
        let result = StringSchema::new().validate(&text("hello"), &FieldPath::root());
        assert_eq!(unwrap_success(result), "hello");
    }

    #[test]
    fn test_rejects_non_string_with_single_error() {
        let schema = StringSchema::new().min_len(3).email();
        let errors = unwrap_failure(schema.validate(&Value::Number(1.0), &FieldPath::root()));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().code, "invalid_type");
        assert_eq!(errors.first().got.as_deref(), Some("number"));
    }

    #[test]
    fn test_non_empty_rejects_blank() {
        let schema = StringSchema::new().non_empty();
        for blank in ["", " ", "\t\n "] {
            let errors = unwrap_failure(schema.validate(&text(blank), &FieldPath::root()));
            assert_eq!(errors.first().code, "non_empty");
        }
        assert!(schema.validate(&text(" a "), &FieldPath::root()).is_success());
    }

    #[test]
    fn test_length_bounds_are_inclusive() {
        let schema = StringSchema::new().min_len(2).max_len(4);
        assert!(schema.validate(&text("ab"), &FieldPath::root()).is_success());
        assert!(schema.validate(&text("abcd"), &FieldPath::root()).is_success());
        assert!(schema.validate(&text("a"), &FieldPath::root()).is_failure());
        assert!(schema.validate(&text("abcde"), &FieldPath::root()).is_failure());
    }

    #[test]
    fn test_length_counts_chars() {
        let schema = StringSchema::new().max_len(3);
        assert!(schema.validate(&text("日本語"), &FieldPath::root()).is_success());
    }

    #[test]
    fn test_email_format() {
        let schema = StringSchema::new().email();
        for ok in ["a@b.co", "first.last+tag@mail.example.org"] {
            assert!(schema.validate(&text(ok), &FieldPath::root()).is_success(), "{}", ok);
        }
        for bad in ["bad", "a@b", "@b.com", "a b@c.com", "a@.com"] {
            let errors = unwrap_failure(schema.validate(&text(bad), &FieldPath::root()));
            assert_eq!(errors.first().code, "email", "{}", bad);
        }
    }

    #[test]
    fn test_email_pattern_compiles() {
        assert!(email_regex().is_some());
    }

    #[test]
    fn test_invalid_pattern_is_build_error() {
        let err = StringSchema::new().pattern("[unclosed").err().unwrap();
        assert!(matches!(err, SchemaBuildError::InvalidPattern { .. }));
    }

    #[test]
    fn test_every_failing_check_is_reported_in_order() {
        let schema = StringSchema::new()
            .min_len(10)
            .pattern(r"^\d+$")
            .unwrap()
            .refine(|s| s.starts_with('x'), "must start with x");

        let errors = unwrap_failure(schema.validate(&text("abc"), &FieldPath::root()));
        let codes: Vec<_> = errors.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["min_length", "pattern", "custom"]);
    }

    #[test]
    fn test_error_overrides_last_check_only() {
        let schema = StringSchema::new()
            .error("Name must be text")
            .non_empty()
            .error("Name is required")
            .min_len(3);

        let errors = unwrap_failure(schema.validate(&text(""), &FieldPath::root()));
        assert_eq!(errors.iter().next().unwrap().message, "Name is required");
        assert!(errors.iter().nth(1).unwrap().message.starts_with("length must be"));

        let errors = unwrap_failure(schema.validate(&Value::Null, &FieldPath::root()));
        assert_eq!(errors.first().message, "Name must be text");
    }

    #[test]
    fn test_transform_runs_after_checks_only() {
        let schema = StringSchema::new()
            .max_len(3)
            .transform(|s| s.repeat(3));

        assert_eq!(
            unwrap_success(schema.validate(&text("ab"), &FieldPath::root())),
            "ababab"
        );
        assert!(schema.validate(&text("abcd"), &FieldPath::root()).is_failure());
    }

    #[test]
    fn test_later_transform_replaces_earlier() {
        let schema = StringSchema::new()
            .transform(|s| s.to_uppercase())
            .transform(|s| s.trim().to_string());
        assert_eq!(
            unwrap_success(schema.validate(&text(" ab "), &FieldPath::root())),
            "ab"
        );
    }

    #[test]
    fn test_path_is_reported() {
        let path = FieldPath::root().push_field("password");
        let errors = unwrap_failure(StringSchema::new().min_len(6).validate(&text("12345"), &path));
        assert_eq!(errors.first().path.to_string(), "password");
    }
}
