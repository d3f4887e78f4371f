//! Schema registry for named schema storage.
//!
//! This module provides the [`SchemaRegistry`] type, which stores named
//! schemas so that an application can build every form once at startup and
//! validate submissions by name from any thread.

use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::Validation;
use tracing::{debug, trace};

use crate::descriptor;
use crate::error::{FieldErrors, SchemaBuildError};
use crate::path::FieldPath;
use crate::schema::ValueValidator;
use crate::value::Value;

/// Type alias for the schema storage map.
type SchemaMap = Arc<RwLock<HashMap<String, Arc<dyn ValueValidator>>>>;

/// A thread-safe registry for storing and retrieving named schemas.
///
/// # Thread Safety
///
/// The registry uses `Arc<RwLock<...>>` and clones share storage:
/// - Lookups take a read lock just long enough to clone an `Arc`
/// - Validation runs outside the lock
/// - Registration operations are serialized (write access)
///
/// # Example
///
/// ```rust
/// use formcheck::{Schema, SchemaRegistry, Value};
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register(
///         "login",
///         Schema::object()
///             .field("email", Schema::string().non_empty().email())
///             .field("password", Schema::string().min_len(6)),
///     )
///     .unwrap();
///
/// let input = Value::object([("email", "ada@example.com"), ("password", "secret1")]);
/// assert!(registry.validate("login", &input).unwrap().is_success());
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: SchemaMap,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema with the given name.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::DuplicateName` if the name is already registered.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{Schema, SchemaRegistry};
    ///
    /// let registry = SchemaRegistry::new();
    /// registry.register("email", Schema::string().email()).unwrap();
    ///
    /// // Duplicate registration fails
    /// assert!(registry.register("email", Schema::string()).is_err());
    /// ```
    pub fn register<S>(&self, name: impl Into<String>, schema: S) -> Result<(), RegistryError>
    where
        S: ValueValidator + 'static,
    {
        self.insert(name.into(), Arc::new(schema))
    }

    /// Registers an already type-erased schema.
    pub fn register_dyn(
        &self,
        name: impl Into<String>,
        schema: Arc<dyn ValueValidator>,
    ) -> Result<(), RegistryError> {
        self.insert(name.into(), schema)
    }

    /// Compiles a JSON descriptor and registers the result.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Build` if the descriptor is malformed, or
    /// `RegistryError::DuplicateName`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::SchemaRegistry;
    /// use serde_json::json;
    ///
    /// let registry = SchemaRegistry::new();
    /// registry
    ///     .register_descriptor("age", &json!({ "type": "number", "coerce": true, "minimum": 0 }))
    ///     .unwrap();
    ///
    /// assert!(registry.validate("age", &"42".into()).unwrap().is_success());
    /// ```
    pub fn register_descriptor(
        &self,
        name: impl Into<String>,
        descriptor: &serde_json::Value,
    ) -> Result<(), RegistryError> {
        let schema = descriptor::compile(descriptor)?;
        self.insert(name.into(), schema)
    }

    fn insert(&self, name: String, schema: Arc<dyn ValueValidator>) -> Result<(), RegistryError> {
        let mut schemas = self.schemas.write();

        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }

        debug!(schema = %name, "registered schema");
        schemas.insert(name, schema);
        Ok(())
    }

    /// Retrieves a schema by name.
    ///
    /// Returns `None` if no schema with the given name is registered.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ValueValidator>> {
        let found = self.schemas.read().get(name).cloned();
        trace!(schema = name, found = found.is_some(), "schema lookup");
        found
    }

    /// Names of every registered schema, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn require(&self, name: &str) -> Result<Arc<dyn ValueValidator>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::SchemaNotFound(name.to_string()))
    }

    /// Validates a value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if the schema name doesn't exist.
    /// Invalid input is not an error here; it is the `Failure` side of the
    /// returned validation.
    pub fn validate(
        &self,
        schema_name: &str,
        value: &Value,
    ) -> Result<Validation<Value, FieldErrors>, RegistryError> {
        let schema = self.require(schema_name)?;
        let result = schema.validate_value(value, &FieldPath::root());
        log_outcome(schema_name, &result);
        Ok(result)
    }

    /// Validates one field of a named object schema in isolation.
    ///
    /// Errors are reported under the field's own path.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` or `RegistryError::UnknownField`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use formcheck::{Schema, SchemaRegistry, Value};
    ///
    /// let registry = SchemaRegistry::new();
    /// registry
    ///     .register("signup", Schema::object().field("password", Schema::string().min_len(6)))
    ///     .unwrap();
    ///
    /// let errors = registry
    ///     .validate_field("signup", "password", &Value::from("123"))
    ///     .unwrap()
    ///     .into_result()
    ///     .unwrap_err();
    /// assert_eq!(errors.first().path.to_string(), "password");
    /// ```
    pub fn validate_field(
        &self,
        schema_name: &str,
        field: &str,
        value: &Value,
    ) -> Result<Validation<Value, FieldErrors>, RegistryError> {
        let schema = self.require(schema_name)?;
        let field_schema = schema
            .field_schema(field)
            .ok_or_else(|| RegistryError::UnknownField {
                schema: schema_name.to_string(),
                field: field.to_string(),
            })?;

        let result = field_schema.validate_value(value, &FieldPath::root().push_field(field));
        log_outcome(schema_name, &result);
        Ok(result)
    }

    /// Validates many values against a named schema in parallel.
    ///
    /// Results come back in the order of `values`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::SchemaNotFound` if the schema name doesn't exist.
    pub fn validate_batch(
        &self,
        schema_name: &str,
        values: &[Value],
    ) -> Result<Vec<Validation<Value, FieldErrors>>, RegistryError> {
        let schema = self.require(schema_name)?;
        let results: Vec<_> = values
            .par_iter()
            .map(|value| schema.validate_value(value, &FieldPath::root()))
            .collect();

        let failed = results.iter().filter(|r| r.is_failure()).count();
        debug!(
            schema = schema_name,
            total = results.len(),
            failed,
            "batch validation finished"
        );
        Ok(results)
    }
}

fn log_outcome(schema_name: &str, result: &Validation<Value, FieldErrors>) {
    match result {
        Validation::Success(_) => debug!(schema = schema_name, "validation passed"),
        Validation::Failure(errors) => {
            debug!(schema = schema_name, errors = errors.len(), "validation failed")
        }
    }
}

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Attempted to register a schema with a name that already exists.
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    /// Attempted to validate with a schema name that doesn't exist.
    #[error("schema '{0}' not found")]
    SchemaNotFound(String),

    /// The schema has no field with that name.
    #[error("schema '{schema}' has no field '{field}'")]
    UnknownField { schema: String, field: String },

    #[error(transparent)]
    Build(#[from] SchemaBuildError),
}
