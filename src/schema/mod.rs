//! Schema definitions.
//!
//! Each schema type validates one shape of form value and accumulates all
//! of its errors rather than stopping at the first. Builders take `self` by
//! value and return the extended schema, so a finished schema is an
//! immutable value that can be shared across threads.
//!
//! # Example
//!
//! ```rust
//! use formcheck::{validate, Schema, Value};
//!
//! let schema = Schema::string().min_len(1).max_len(100);
//! assert!(validate(&schema, &Value::from("hello")).is_success());
//! ```

mod array;
mod combinators;
mod file;
mod numeric;
mod object;
mod string;
mod traits;

pub use array::ArraySchema;
pub use combinators::{Mapped, Optional, Pipe, SchemaExt};
pub use file::{FileListSchema, FileSchema, FirstFileSchema};
pub use numeric::NumberSchema;
pub use object::{ObjectSchema, UnknownFields};
pub use string::StringSchema;
pub use traits::{SchemaLike, ValueValidator};

/// Entry point for building schemas.
///
/// # Example
///
/// ```rust
/// use formcheck::{validate, Schema, Value};
///
/// let schema = Schema::object()
///     .field("name", Schema::string().non_empty())
///     .field("age", Schema::number().coerce().int().min(0.0));
///
/// let input = Value::object([("name", "Ada"), ("age", "36")]);
/// assert!(validate(&schema, &input).is_success());
/// ```
pub struct Schema;

impl Schema {
    pub fn string() -> StringSchema {
        StringSchema::new()
    }

    pub fn number() -> NumberSchema {
        NumberSchema::new()
    }

    /// A single file handle.
    pub fn file() -> FileSchema {
        FileSchema::new()
    }

    /// The list of handles a file input produces.
    pub fn file_list() -> FileListSchema {
        FileListSchema::new()
    }

    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// A list whose every item must satisfy `element`.
    pub fn array<S: SchemaLike>(element: S) -> ArraySchema<S> {
        ArraySchema::new(element)
    }
}
