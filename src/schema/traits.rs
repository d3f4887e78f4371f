//! Traits shared by every schema type.

use stillwater::Validation;

use crate::error::FieldErrors;
use crate::path::FieldPath;
use crate::value::Value;

/// A schema that validates a [`Value`] and produces a typed output.
///
/// Every builder (`StringSchema`, `NumberSchema`, `ObjectSchema`, ...)
/// implements this trait, which is what lets them nest inside objects and
/// arrays. Implementations must be pure: no I/O, no interior mutation.
///
/// The `Send + Sync` bound lets one schema serve many threads at once.
pub trait SchemaLike: Send + Sync {
    /// What a successful validation yields, after transforms.
    type Output;

    /// Validates `value`, reporting errors relative to `path`.
    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Self::Output, FieldErrors>;

    /// Like [`validate`](Self::validate), with the output turned back into a
    /// [`Value`] so heterogeneous schemas can be composed.
    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors>;

    /// Whether a missing object field is acceptable for this schema.
    fn accepts_absent(&self) -> bool {
        false
    }

    /// The schema of a named child field, for schemas that have fields.
    fn field_schema(&self, _name: &str) -> Option<&dyn ValueValidator> {
        None
    }
}

/// Object-safe view of a schema whose output is a [`Value`].
///
/// Objects, arrays and the registry store children as
/// `Arc<dyn ValueValidator>`. Every [`SchemaLike`] gets this for free.
pub trait ValueValidator: Send + Sync {
    fn validate_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors>;

    fn accepts_absent(&self) -> bool;

    fn field_schema(&self, name: &str) -> Option<&dyn ValueValidator>;
}

impl<S: SchemaLike> ValueValidator for S {
    fn validate_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate_to_value(value, path)
    }

    fn accepts_absent(&self) -> bool {
        SchemaLike::accepts_absent(self)
    }

    fn field_schema(&self, name: &str) -> Option<&dyn ValueValidator> {
        SchemaLike::field_schema(self, name)
    }
}

/// Lets a type-erased schema nest inside builders that want a `SchemaLike`,
/// such as descriptors compiled at runtime.
impl SchemaLike for std::sync::Arc<dyn ValueValidator> {
    type Output = Value;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        (**self).validate_value(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        (**self).validate_value(value, path)
    }

    fn accepts_absent(&self) -> bool {
        (**self).accepts_absent()
    }

    fn field_schema(&self, name: &str) -> Option<&dyn ValueValidator> {
        (**self).field_schema(name)
    }
}
