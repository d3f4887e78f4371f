//! Field-level validation errors.

use std::fmt::{self, Display};

use stillwater::prelude::*;
use stillwater::Validation;

use crate::path::FieldPath;

/// One validation failure at one location.
///
/// The `code` is stable and machine-readable (`min_length`, `email`,
/// `invalid_number`, ...); the `message` is what a form shows next to the
/// input at `path`.
///
/// # Example
///
/// ```rust
/// use formcheck::{FieldError, FieldPath};
///
/// let error = FieldError::new(FieldPath::root().push_field("email"), "Invalid email")
///     .with_code("email")
///     .with_got("bad");
///
/// assert_eq!(error.to_string(), "email: Invalid email (got: bad)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub path: FieldPath,
    pub message: String,
    /// What was received, rendered for humans.
    pub got: Option<String>,
    /// What the check wanted, rendered for humans.
    pub expected: Option<String>,
    pub code: String,
}

impl FieldError {
    /// Creates an error with the generic `validation_error` code.
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
            got: None,
            expected: None,
            code: "validation_error".to_string(),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }

        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// Every error a single `validate` call produced, in evaluation order.
///
/// Backed by a `NonEmptyVec`, so a failed validation always carries at least
/// one error. Combining two collections through [`Semigroup`] keeps the
/// left-hand errors first.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Wraps `errors`, or returns `None` if there are none.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    /// Errors reported exactly at `path`.
    pub fn at_path(&self, path: &FieldPath) -> Vec<&FieldError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Errors reported at `path` or anywhere below it.
    pub fn under(&self, path: &FieldPath) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.path.starts_with(path)).collect()
    }

    pub fn with_code(&self, code: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Messages grouped by rendered path, in first-seen order.
    ///
    /// This is the shape a form wants when it shows errors next to inputs.
    pub fn by_path(&self) -> indexmap::IndexMap<String, Vec<String>> {
        let mut grouped: indexmap::IndexMap<String, Vec<String>> = indexmap::IndexMap::new();
        for error in self.0.iter() {
            grouped
                .entry(error.path.to_string())
                .or_default()
                .push(error.message.clone());
        }
        grouped
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

// Results cross thread boundaries in batch validation.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FieldError>();
    assert_send_sync::<FieldErrors>();
};

/// Turns collected errors into a validation outcome.
///
/// `value` is only produced when `errors` is empty, so transforms run
/// strictly after every check passed.
pub(crate) fn finish<T>(errors: Vec<FieldError>, value: impl FnOnce() -> T) -> Validation<T, FieldErrors> {
    match FieldErrors::from_vec(errors) {
        Some(errors) => Validation::Failure(errors),
        None => Validation::Success(value()),
    }
}
