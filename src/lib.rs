//! # formcheck
//!
//! A schema-driven validation engine for form input that accumulates ALL
//! field errors and normalizes valid input in the same pass.
//!
//! ## Overview
//!
//! A form is described once as an immutable schema. Each submission is then
//! validated against it, yielding either the transformed payload (trimmed,
//! capitalized, coerced to numbers, reduced to a single file, ...) or every
//! error at once, each tagged with the path of the input it belongs to.
//! Results use stillwater's `Validation` type for applicative error
//! accumulation.
//!
//! ## Core Types
//!
//! - [`Value`]: raw form input, including [`FileHandle`]s
//! - [`Schema`]: entry point for building schemas
//! - [`FieldPath`]: where an error belongs (e.g. `techs[1].knowledge`)
//! - [`FieldError`] / [`FieldErrors`]: what went wrong, never empty
//! - [`SchemaBuildError`]: the schema itself is inconsistent
//! - [`SchemaRegistry`]: named schemas shared across threads
//!
//! ## Example
//!
//! ```rust
//! use formcheck::{transform, validate, Schema, Value};
//!
//! let schema = Schema::object()
//!     .field("name", Schema::string().non_empty().transform(transform::capitalize_words))
//!     .field("email", Schema::string().non_empty().email())
//!     .field("password", Schema::string().min_len(6));
//!
//! // Every failing field is reported, not just the first
//! let input = Value::object([("name", " "), ("email", "bad"), ("password", "12345")]);
//! let errors = validate(&schema, &input).into_result().unwrap_err();
//! assert_eq!(errors.len(), 3);
//!
//! let input = Value::object([
//!     ("name", "ada lovelace"),
//!     ("email", "ada@example.com"),
//!     ("password", "analytical"),
//! ]);
//! let data = validate(&schema, &input).into_result().unwrap();
//! assert_eq!(data["name"], Value::from("Ada Lovelace"));
//! ```

pub mod descriptor;
pub mod error;
pub mod path;
pub mod registry;
pub mod schema;
pub mod signup;
pub mod transform;
pub mod value;

#[cfg(feature = "loader")]
pub mod loader;

pub use error::{FieldError, FieldErrors, SchemaBuildError};
pub use path::{FieldPath, PathParseError, Segment};
pub use registry::{RegistryError, SchemaRegistry};
pub use schema::{
    ArraySchema, FileListSchema, FileSchema, FirstFileSchema, Mapped, NumberSchema, ObjectSchema,
    Optional, Pipe, Schema, SchemaExt, SchemaLike, StringSchema, UnknownFields, ValueValidator,
};
pub use value::{FileHandle, Value};

/// Type alias for validation results using FieldErrors
pub type ValidationResult<T> = stillwater::Validation<T, FieldErrors>;

/// Validates `input` against `schema`, reporting errors from the root path.
pub fn validate<S: SchemaLike>(schema: &S, input: &Value) -> ValidationResult<S::Output> {
    let result = schema.validate(input, &FieldPath::root());
    match &result {
        stillwater::Validation::Success(_) => tracing::debug!("validation passed"),
        stillwater::Validation::Failure(errors) => {
            tracing::debug!(errors = errors.len(), "validation failed")
        }
    }
    result
}
