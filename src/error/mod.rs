//! Error types.
//!
//! Two families live here and must not be confused:
//!
//! - [`FieldError`] / [`FieldErrors`]: the input was invalid. These are
//!   ordinary values carried by a failed [`Validation`](stillwater::Validation).
//! - [`SchemaBuildError`]: the schema itself is inconsistent. Raised while
//!   constructing a schema, before any input is seen.

mod build_error;
mod field_error;

pub use build_error::SchemaBuildError;
pub use field_error::{FieldError, FieldErrors};

pub(crate) use field_error::finish;
