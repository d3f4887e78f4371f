//! Schema combinators.
//!
//! These wrap any schema to change how it composes:
//! - [`Optional`]: a missing field or `Null` is accepted and yields `Null`
//! - [`Mapped`]: a transform over the produced [`Value`]
//! - [`Pipe`]: the output of one schema is validated by another
//!
//! All of them are reached through [`SchemaExt`].
//!
//! # Example
//!
//! ```rust
//! use formcheck::{validate, Schema, SchemaExt, Value};
//!
//! let schema = Schema::object()
//!     .field("bio", Schema::string().max_len(280).optional())
//!     .field(
//!         "tags",
//!         Schema::string()
//!             .map(|v| match v {
//!                 Value::String(s) => Value::Array(s.split(',').map(|t| Value::from(t.trim())).collect()),
//!                 other => other,
//!             })
//!             .pipe(Schema::array(Schema::string().non_empty()).max_items(3)),
//!     );
//!
//! let input = Value::object([("tags", "rust, forms")]);
//! let out = validate(&schema, &input).into_result().unwrap();
//! assert_eq!(out["tags"], Value::Array(vec![Value::from("rust"), Value::from("forms")]));
//! assert_eq!(out["bio"], Value::Null);
//! ```

use std::sync::Arc;

use stillwater::Validation;

use crate::error::FieldErrors;
use crate::path::FieldPath;
use crate::value::Value;

use super::traits::{SchemaLike, ValueValidator};

type ValueTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Accepts absence: a missing object field, or an explicit `Null`.
#[derive(Clone)]
pub struct Optional<S> {
    inner: S,
}

impl<S: SchemaLike> SchemaLike for Optional<S> {
    type Output = Option<S::Output>;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Self::Output, FieldErrors> {
        if value.is_null() {
            Validation::Success(None)
        } else {
            self.inner.validate(value, path).map(Some)
        }
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        if value.is_null() {
            Validation::Success(Value::Null)
        } else {
            self.inner.validate_to_value(value, path)
        }
    }

    fn accepts_absent(&self) -> bool {
        true
    }

    fn field_schema(&self, name: &str) -> Option<&dyn ValueValidator> {
        SchemaLike::field_schema(&self.inner, name)
    }
}

/// Applies a transform to the inner schema's output.
#[derive(Clone)]
pub struct Mapped<S> {
    inner: S,
    transform: ValueTransform,
}

impl<S: SchemaLike> SchemaLike for Mapped<S> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate_to_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        let transform = &self.transform;
        self.inner
            .validate_to_value(value, path)
            .map(|v| transform(v))
    }

    fn accepts_absent(&self) -> bool {
        SchemaLike::accepts_absent(&self.inner)
    }

    fn field_schema(&self, name: &str) -> Option<&dyn ValueValidator> {
        SchemaLike::field_schema(&self.inner, name)
    }
}

/// Validates with `first`, then validates the result with `then` at the
/// same path.
#[derive(Clone)]
pub struct Pipe<A, B> {
    first: A,
    then: B,
}

impl<A: SchemaLike, B: SchemaLike> SchemaLike for Pipe<A, B> {
    type Output = B::Output;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<B::Output, FieldErrors> {
        match self.first.validate_to_value(value, path) {
            Validation::Success(v) => self.then.validate(&v, path),
            Validation::Failure(errors) => Validation::Failure(errors),
        }
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        match self.first.validate_to_value(value, path) {
            Validation::Success(v) => self.then.validate_to_value(&v, path),
            Validation::Failure(errors) => Validation::Failure(errors),
        }
    }

    fn accepts_absent(&self) -> bool {
        SchemaLike::accepts_absent(&self.first)
    }
}

/// Combinator methods available on every schema.
pub trait SchemaExt: SchemaLike + Sized {
    /// Tolerates a missing field or `Null`, producing `Null`.
    fn optional(self) -> Optional<Self> {
        Optional { inner: self }
    }

    /// Transforms the produced value once validation succeeded.
    fn map<F>(self, transform: F) -> Mapped<Self>
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Mapped {
            inner: self,
            transform: Arc::new(transform),
        }
    }

    /// Feeds the produced value into `next`.
    fn pipe<B: SchemaLike>(self, next: B) -> Pipe<Self, B> {
        Pipe {
            first: self,
            then: next,
        }
    }

    /// Erases the schema's type so it can be stored alongside others.
    fn boxed(self) -> Arc<dyn ValueValidator>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<S: SchemaLike> SchemaExt for S {}
