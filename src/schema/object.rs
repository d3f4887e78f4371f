//! Object schema validation.
//!
//! This module provides [`ObjectSchema`] for validating a form's mapping of
//! field names to raw values: required, optional and defaulted fields,
//! unknown-field handling, and cross-field refinements.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use stillwater::Validation;

use crate::error::{finish, FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::value::Value;

use super::traits::{SchemaLike, ValueValidator};

type ObjectPredicate = Arc<dyn Fn(&IndexMap<String, Value>) -> bool + Send + Sync>;

/// Definition of a field within an object schema.
#[derive(Clone)]
struct FieldDef {
    schema: Arc<dyn ValueValidator>,
    required: bool,
    default: Option<Value>,
    missing_message: Option<String>,
}

/// What to do with input keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Copy them to the output unchecked.
    Passthrough,
    /// Report each one as an error.
    Deny,
}

#[derive(Clone)]
struct Refinement {
    field: Option<String>,
    predicate: ObjectPredicate,
    message: String,
}

/// A schema for validating objects.
///
/// Every declared field is validated, and every failing field contributes
/// its errors; one bad field never hides another. The output is a new
/// object built from the fields' transformed values, in declaration order.
///
/// # Example
///
/// ```rust
/// use formcheck::{validate, Schema, Value};
///
/// let schema = Schema::object()
///     .field("name", Schema::string().non_empty())
///     .field("email", Schema::string().non_empty().email())
///     .field("password", Schema::string().min_len(6));
///
/// let input = Value::object([("name", " "), ("email", "bad"), ("password", "12345")]);
/// let errors = validate(&schema, &input).into_result().unwrap_err();
///
/// let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
/// assert_eq!(paths, vec!["name", "email", "password"]);
/// ```
#[derive(Clone)]
pub struct ObjectSchema {
    fields: IndexMap<String, FieldDef>,
    unknown_fields: UnknownFields,
    refinements: Vec<Refinement>,
    type_error_message: Option<String>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self {
            fields: IndexMap::new(),
            unknown_fields: UnknownFields::Strip,
            refinements: Vec::new(),
            type_error_message: None,
        }
    }

    /// Adds a field that must be present, unless `schema` itself tolerates
    /// absence (see [`SchemaExt::optional`](super::SchemaExt::optional)). A
    /// missing field is then validated as `Null`, so it lands in the output
    /// exactly as an explicit `Null` would.
    pub fn field<S>(self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.insert(name.into(), Arc::new(schema), true, None)
    }

    /// Adds a field that may be missing; when missing it is left out of the
    /// output.
    pub fn optional<S>(self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.insert(name.into(), Arc::new(schema), false, None)
    }

    /// Adds a field that may be missing; when missing `default` is placed in
    /// the output unchecked.
    pub fn default<S>(self, name: impl Into<String>, schema: S, default: Value) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.insert(name.into(), Arc::new(schema), false, Some(default))
    }

    /// Adds a field from an already type-erased schema.
    pub fn field_dyn(self, name: impl Into<String>, schema: Arc<dyn ValueValidator>, required: bool) -> Self {
        self.insert(name.into(), schema, required, None)
    }

    fn insert(
        mut self,
        name: String,
        schema: Arc<dyn ValueValidator>,
        required: bool,
        default: Option<Value>,
    ) -> Self {
        self.fields.insert(
            name,
            FieldDef {
                schema,
                required,
                default,
                missing_message: None,
            },
        );
        self
    }

    /// Sets the message reported when the most recently added field is
    /// missing. Without it the message is `"<name> is required"`.
    pub fn required_error(mut self, message: impl Into<String>) -> Self {
        if let Some((_, def)) = self.fields.last_mut() {
            def.missing_message = Some(message.into());
        }
        self
    }

    pub fn unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Adds a whole-object check reported at the object's own path.
    ///
    /// Refinements see the transformed field values and run only when every
    /// field passed, so they never have to cope with malformed input.
    pub fn refine<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&IndexMap<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            field: None,
            predicate: Arc::new(predicate),
            message: message.into(),
        });
        self
    }

    /// Like [`refine`](Self::refine), but reports at `field`. Useful for
    /// checks such as "passwords must match".
    ///
    /// ```rust
    /// use formcheck::{validate, Schema, Value};
    ///
    /// let schema = Schema::object()
    ///     .field("password", Schema::string().min_len(6))
    ///     .field("confirm", Schema::string())
    ///     .refine_at("confirm", |o| o.get("password") == o.get("confirm"), "Passwords differ");
    ///
    /// let input = Value::object([("password", "secret1"), ("confirm", "secret2")]);
    /// let errors = validate(&schema, &input).into_result().unwrap_err();
    /// assert_eq!(errors.first().path.to_string(), "confirm");
    /// ```
    pub fn refine_at<F>(mut self, field: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&IndexMap<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            field: Some(field.into()),
            predicate: Arc::new(predicate),
            message: message.into(),
        });
        self
    }

    /// Sets the message used when the input is not an object.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Names of the declared fields, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Validates a single declared field in isolation.
    ///
    /// This is what a form calls for live feedback while the user types.
    /// `path` is the object's path; errors are reported under
    /// `path.name`. Returns `None` if `name` is not declared.
    pub fn validate_field(
        &self,
        name: &str,
        value: &Value,
        path: &FieldPath,
    ) -> Option<Validation<Value, FieldErrors>> {
        let def = self.fields.get(name)?;
        Some((*def.schema).validate_value(value, &path.push_field(name)))
    }

    pub fn validate(
        &self,
        value: &Value,
        path: &FieldPath,
    ) -> Validation<IndexMap<String, Value>, FieldErrors> {
        let Some(obj) = value.as_object() else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "expected object".to_string());
            return Validation::Failure(FieldErrors::single(
                FieldError::new(path.clone(), message)
                    .with_code("invalid_type")
                    .with_got(value.type_name())
                    .with_expected("object"),
            ));
        };

        let mut errors = Vec::new();
        let mut validated = IndexMap::with_capacity(self.fields.len());

        for (name, def) in &self.fields {
            let field_path = path.push_field(name);

            match obj.get(name) {
                Some(field_value) => match (*def.schema).validate_value(field_value, &field_path) {
                    Validation::Success(v) => {
                        validated.insert(name.clone(), v);
                    }
                    Validation::Failure(e) => errors.extend(e),
                },
                None if def.default.is_some() => {
                    if let Some(default) = &def.default {
                        validated.insert(name.clone(), default.clone());
                    }
                }
                // Absence-tolerant schemas decide what a missing field becomes.
                None if ValueValidator::accepts_absent(&*def.schema) => {
                    match (*def.schema).validate_value(&Value::Null, &field_path) {
                        Validation::Success(v) => {
                            validated.insert(name.clone(), v);
                        }
                        Validation::Failure(e) => errors.extend(e),
                    }
                }
                None if def.required => {
                    let message = def
                        .missing_message
                        .clone()
                        .unwrap_or_else(|| format!("{} is required", name));
                    errors.push(
                        FieldError::new(field_path, message)
                            .with_code("required")
                            .with_expected("value")
                            .with_got("nothing"),
                    );
                }
                None => {}
            }
        }

        for (key, value) in obj.iter().filter(|(k, _)| !self.fields.contains_key(*k)) {
            match self.unknown_fields {
                UnknownFields::Strip => {}
                UnknownFields::Passthrough => {
                    validated.insert(key.clone(), value.clone());
                }
                UnknownFields::Deny => {
                    errors.push(
                        FieldError::new(path.push_field(key), format!("unknown field '{}'", key))
                            .with_code("unknown_field"),
                    );
                }
            }
        }

        if errors.is_empty() {
            errors.extend(
                self.refinements
                    .iter()
                    .filter(|r| !(r.predicate)(&validated))
                    .map(|r| {
                        let at = match &r.field {
                            Some(field) => path.push_field(field),
                            None => path.clone(),
                        };
                        FieldError::new(at, r.message.clone()).with_code("custom")
                    }),
            );
        }

        finish(errors, || validated)
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLike for ObjectSchema {
    type Output = IndexMap<String, Value>;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Self::Output, FieldErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate(value, path).map(Value::Object)
    }

    fn field_schema(&self, name: &str) -> Option<&dyn ValueValidator> {
        self.fields.get(name).map(|def| &*def.schema)
    }
}
