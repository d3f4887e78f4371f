//! The sign-up form.
//!
//! A ready-made schema for a registration form with an avatar upload, the
//! user's name, email and password, and a list of technologies they know
//! together with a self-assessed knowledge level.
//!
//! # Example
//!
//! ```rust
//! use formcheck::{signup, validate, FileHandle, Value};
//!
//! let input = Value::object([
//!     ("avatar", Value::from(vec![FileHandle::new("me.png", 2048, "image/png")])),
//!     ("name", Value::from("ada lovelace")),
//!     ("email", Value::from("Ada@Example.com")),
//!     ("password", Value::from("analytical")),
//!     (
//!         "techs",
//!         Value::Array(vec![
//!             Value::object([("title", "Rust"), ("knowledge", "80")]),
//!             Value::object([("title", "Go"), ("knowledge", "65")]),
//!         ]),
//!     ),
//! ]);
//!
//! let data = validate(&signup::form(), &input).into_result().unwrap();
//! assert_eq!(data["name"], Value::from("Ada Lovelace"));
//! assert_eq!(data["email"], Value::from("ada@example.com"));
//! ```

use crate::error::FieldErrors;
use crate::schema::{ObjectSchema, Schema};
use crate::transform::{capitalize_words, lowercase};
use crate::value::Value;

/// Largest avatar accepted, in bytes.
pub const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// Fewest technologies a user must list.
pub const MIN_TECHS: usize = 2;

/// Builds the sign-up form schema.
///
/// The output holds the avatar as a single file, the name capitalized, the
/// email lower-cased, and every knowledge level as a number.
pub fn form() -> ObjectSchema {
    Schema::object()
        .field(
            "avatar",
            Schema::file_list()
                .first()
                .error("Avatar is required")
                .then_check(
                    Schema::file()
                        .max_size(MAX_AVATAR_BYTES)
                        .error("Avatar must be at most 5MB"),
                ),
        )
        .required_error("Avatar is required")
        .field(
            "name",
            Schema::string()
                .non_empty()
                .error("Name is required")
                .transform(capitalize_words),
        )
        .required_error("Name is required")
        .field(
            "email",
            Schema::string()
                .non_empty()
                .error("Email is required")
                .email()
                .error("Invalid email format")
                .transform(lowercase),
        )
        .required_error("Email is required")
        .field(
            "password",
            Schema::string()
                .min_len(6)
                .error("Password must be at least 6 characters"),
        )
        .required_error("Password is required")
        .field(
            "techs",
            Schema::array(tech())
                .min_items(MIN_TECHS)
                .error("Add at least 2 technologies"),
        )
        .required_error("Add at least 2 technologies")
}

/// One entry of the technologies list.
fn tech() -> ObjectSchema {
    Schema::object()
        .field("title", Schema::string().non_empty().error("Title is required"))
        .required_error("Title is required")
        .field(
            "knowledge",
            Schema::number()
                .coerce()
                .error("Knowledge must be a number")
                .min(1.0)
                .error("Knowledge must be between 1 and 100")
                .max(100.0)
                .error("Knowledge must be between 1 and 100"),
        )
        .required_error("Knowledge is required")
}

/// Pretty-prints a validated payload.
pub fn render(output: &Value) -> String {
    output.to_pretty_string()
}

/// Pretty-prints errors as a map from field path to messages, the shape a
/// form uses to put each message next to its input.
pub fn render_errors(errors: &FieldErrors) -> String {
    serde_json::to_string_pretty(&errors.by_path()).unwrap_or_default()
}
