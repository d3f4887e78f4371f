//! Declarative schema descriptors.
//!
//! A descriptor is a JSON document describing a schema, so forms can be
//! configured without recompiling:
//!
//! ```json
//! {
//!   "type": "object",
//!   "properties": {
//!     "email": { "type": "string", "nonEmpty": true, "format": "email", "transform": "lowercase" },
//!     "age": { "type": "number", "coerce": true, "minimum": 18, "message": "Adults only" }
//!   },
//!   "required": ["email"]
//! }
//! ```
//!
//! Compiling a descriptor is the construction step: every inconsistency in
//! the graph is reported as a [`SchemaBuildError`] before any input is seen.
//! Properties not listed in `required` are optional.
//!
//! `message` replaces the message of the last check the descriptor adds,
//! in the order the keys are listed in [`Descriptor`].

use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::SchemaBuildError;
use crate::schema::{
    ArraySchema, FileListSchema, FileSchema, NumberSchema, ObjectSchema, SchemaExt, StringSchema,
    UnknownFields, ValueValidator,
};
use crate::transform;

/// The kinds a descriptor's `type` may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Number,
    File,
    FileList,
    Object,
    Array,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::File => "file",
            Kind::FileList => "file_list",
            Kind::Object => "object",
            Kind::Array => "array",
        }
    }

    /// Keys, besides `type` and `message`, that make sense for this kind.
    fn allowed_keys(self) -> &'static [&'static str] {
        match self {
            Kind::String => &["nonEmpty", "minLength", "maxLength", "pattern", "format", "transform"],
            Kind::Number => &["coerce", "integer", "minimum", "maximum"],
            Kind::File => &["maxSize", "minSize", "mimeTypes"],
            Kind::FileList => &["minFiles", "maxFiles", "maxFileSize", "first"],
            Kind::Object => &["properties", "required", "unknownFields"],
            Kind::Array => &["items", "minItems", "maxItems"],
        }
    }
}

impl FromStr for Kind {
    type Err = SchemaBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(Kind::String),
            "number" => Ok(Kind::Number),
            "file" => Ok(Kind::File),
            "file_list" => Ok(Kind::FileList),
            "object" => Ok(Kind::Object),
            "array" => Ok(Kind::Array),
            other => Err(SchemaBuildError::UnknownKind(other.to_string())),
        }
    }
}

/// What a file list's `first` key holds: a bare flag, or the checks to run
/// on the extracted file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FirstFile {
    Flag(bool),
    Check(Box<Descriptor>),
}

/// A schema description as read from JSON.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Descriptor {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub non_empty: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub format: Option<String>,

    #[serde(default)]
    pub coerce: bool,
    #[serde(default)]
    pub integer: bool,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,

    pub max_size: Option<u64>,
    pub min_size: Option<u64>,
    pub mime_types: Option<Vec<String>>,

    pub min_files: Option<usize>,
    pub max_files: Option<usize>,
    pub max_file_size: Option<u64>,
    pub first: Option<FirstFile>,

    pub properties: Option<IndexMap<String, Descriptor>>,
    pub required: Option<Vec<String>>,
    pub unknown_fields: Option<UnknownFields>,

    pub items: Option<Box<Descriptor>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,

    pub transform: Option<String>,
    pub message: Option<String>,
}

impl FromStr for Descriptor {
    type Err = SchemaBuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Descriptor {
    /// Compiles the descriptor into a schema.
    pub fn compile(&self) -> Result<Arc<dyn ValueValidator>, SchemaBuildError> {
        self.compile_at("")
    }

    fn compile_at(&self, at: &str) -> Result<Arc<dyn ValueValidator>, SchemaBuildError> {
        let kind: Kind = self.kind.parse()?;
        self.reject_foreign_keys(kind)?;

        let schema = match kind {
            Kind::String => self.string()?.boxed(),
            Kind::Number => self.number()?.boxed(),
            Kind::File => self.file()?.boxed(),
            Kind::FileList => self.file_list()?,
            Kind::Object => self.object(at)?.boxed(),
            Kind::Array => self.array(at)?.boxed(),
        };
        Ok(schema)
    }

    /// Keys that are set on this descriptor.
    fn present_keys(&self) -> Vec<&'static str> {
        [
            ("nonEmpty", self.non_empty),
            ("minLength", self.min_length.is_some()),
            ("maxLength", self.max_length.is_some()),
            ("pattern", self.pattern.is_some()),
            ("format", self.format.is_some()),
            ("coerce", self.coerce),
            ("integer", self.integer),
            ("minimum", self.minimum.is_some()),
            ("maximum", self.maximum.is_some()),
            ("maxSize", self.max_size.is_some()),
            ("minSize", self.min_size.is_some()),
            ("mimeTypes", self.mime_types.is_some()),
            ("minFiles", self.min_files.is_some()),
            ("maxFiles", self.max_files.is_some()),
            ("maxFileSize", self.max_file_size.is_some()),
            ("first", self.first.is_some()),
            ("properties", self.properties.is_some()),
            ("required", self.required.is_some()),
            ("unknownFields", self.unknown_fields.is_some()),
            ("items", self.items.is_some()),
            ("minItems", self.min_items.is_some()),
            ("maxItems", self.max_items.is_some()),
            ("transform", self.transform.is_some()),
        ]
        .into_iter()
        .filter_map(|(key, set)| set.then_some(key))
        .collect()
    }

    fn reject_foreign_keys(&self, kind: Kind) -> Result<(), SchemaBuildError> {
        let allowed = kind.allowed_keys();
        match self.present_keys().into_iter().find(|key| !allowed.contains(key)) {
            Some(key) => Err(SchemaBuildError::UnsupportedCheck {
                check: key.to_string(),
                kind: kind.as_str(),
            }),
            None => Ok(()),
        }
    }

    fn string(&self) -> Result<StringSchema, SchemaBuildError> {
        check_order(widen(self.min_length), widen(self.max_length))?;

        let mut schema = StringSchema::new();
        if self.non_empty {
            schema = schema.non_empty();
        }
        if let Some(min) = self.min_length {
            schema = schema.min_len(min);
        }
        if let Some(max) = self.max_length {
            schema = schema.max_len(max);
        }
        if let Some(pattern) = &self.pattern {
            schema = schema.pattern(pattern)?;
        }
        match self.format.as_deref() {
            Some("email") => schema = schema.email(),
            Some(other) => {
                return Err(SchemaBuildError::UnsupportedCheck {
                    check: format!("format '{}'", other),
                    kind: Kind::String.as_str(),
                })
            }
            None => {}
        }
        if let Some(message) = &self.message {
            schema = schema.error(message.clone());
        }
        if let Some(name) = &self.transform {
            let f = transform::by_name(name)
                .ok_or_else(|| SchemaBuildError::UnknownTransform(name.clone()))?;
            schema = schema.transform(f);
        }
        Ok(schema)
    }

    fn number(&self) -> Result<NumberSchema, SchemaBuildError> {
        let mut schema = NumberSchema::new();
        if self.coerce {
            schema = schema.coerce();
        }
        if self.integer {
            schema = schema.int();
        }
        schema = match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => schema.bounds(min, max)?,
            (Some(min), None) => schema.min(min),
            (None, Some(max)) => schema.max(max),
            (None, None) => schema,
        };
        if let Some(message) = &self.message {
            schema = schema.error(message.clone());
        }
        Ok(schema)
    }

    fn file(&self) -> Result<FileSchema, SchemaBuildError> {
        check_order(self.min_size, self.max_size)?;

        let mut schema = FileSchema::new();
        if let Some(max) = self.max_size {
            schema = schema.max_size(max);
        }
        if let Some(min) = self.min_size {
            schema = schema.min_size(min);
        }
        if let Some(allowed) = &self.mime_types {
            schema = schema.mime_types(allowed.iter().cloned());
        }
        if let Some(message) = &self.message {
            schema = schema.error(message.clone());
        }
        Ok(schema)
    }

    fn file_list(&self) -> Result<Arc<dyn ValueValidator>, SchemaBuildError> {
        check_order(widen(self.min_files), widen(self.max_files))?;

        let mut list = FileListSchema::new();
        if let Some(min) = self.min_files {
            list = list.min_files(min);
        }
        if let Some(max) = self.max_files {
            list = list.max_files(max);
        }
        if let Some(bytes) = self.max_file_size {
            list = list.max_file_size(bytes);
        }

        let check = match &self.first {
            None | Some(FirstFile::Flag(false)) => {
                if let Some(message) = &self.message {
                    list = list.error(message.clone());
                }
                return Ok(list.boxed());
            }
            Some(FirstFile::Flag(true)) => None,
            Some(FirstFile::Check(inner)) => {
                let kind: Kind = inner.kind.parse()?;
                if kind != Kind::File {
                    return Err(SchemaBuildError::UnsupportedCheck {
                        check: format!("first as {}", kind.as_str()),
                        kind: Kind::FileList.as_str(),
                    });
                }
                inner.reject_foreign_keys(kind)?;
                Some(inner.file()?)
            }
        };

        let mut first = list.first();
        if let Some(file) = check {
            first = first.then_check(file);
        }
        if let Some(message) = &self.message {
            first = first.error(message.clone());
        }
        Ok(first.boxed())
    }

    fn object(&self, at: &str) -> Result<ObjectSchema, SchemaBuildError> {
        let empty = IndexMap::new();
        let properties = self.properties.as_ref().unwrap_or(&empty);
        let required = self.required.as_deref().unwrap_or_default();

        if let Some(name) = required.iter().find(|name| !properties.contains_key(*name)) {
            return Err(SchemaBuildError::UndeclaredRequired(name.clone()));
        }

        let mut schema = ObjectSchema::new();
        for (name, descriptor) in properties {
            let child = descriptor.compile_at(&join(at, name))?;
            schema = schema.field_dyn(name.clone(), child, required.contains(name));
        }
        if let Some(policy) = self.unknown_fields {
            schema = schema.unknown_fields(policy);
        }
        if let Some(message) = &self.message {
            schema = schema.error(message.clone());
        }
        Ok(schema)
    }

    fn array(&self, at: &str) -> Result<ArraySchema<Arc<dyn ValueValidator>>, SchemaBuildError> {
        let items = self.items.as_ref().ok_or_else(|| SchemaBuildError::MissingElement {
            at: if at.is_empty() { "(root)".to_string() } else { at.to_string() },
        })?;
        check_order(widen(self.min_items), widen(self.max_items))?;

        let mut schema = ArraySchema::new(items.compile_at(&format!("{}[]", at))?);
        if let Some(min) = self.min_items {
            schema = schema.min_items(min);
        }
        if let Some(max) = self.max_items {
            schema = schema.max_items(max);
        }
        if let Some(message) = &self.message {
            schema = schema.error(message.clone());
        }
        Ok(schema)
    }
}

/// Parses and compiles a descriptor from JSON text.
pub fn compile_str(text: &str) -> Result<Arc<dyn ValueValidator>, SchemaBuildError> {
    text.parse::<Descriptor>()?.compile()
}

/// Compiles an already parsed JSON document.
pub fn compile(json: &serde_json::Value) -> Result<Arc<dyn ValueValidator>, SchemaBuildError> {
    Descriptor::deserialize(json)?.compile()
}

fn join(at: &str, name: &str) -> String {
    if at.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", at, name)
    }
}

/// Rejects a lower count or size limit above the upper one.
fn check_order(min: Option<u64>, max: Option<u64>) -> Result<(), SchemaBuildError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(SchemaBuildError::InvertedBounds {
            min: min as f64,
            max: max as f64,
        }),
        _ => Ok(()),
    }
}

fn widen(n: Option<usize>) -> Option<u64> {
    n.map(|n| n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::FieldPath;
    use crate::value::Value;
    use serde_json::json;

    fn run(schema: &Arc<dyn ValueValidator>, input: serde_json::Value) -> Result<Value, Vec<String>> {
        schema
            .validate_value(&Value::from(input), &FieldPath::root())
            .into_result()
            .map_err(|errors| errors.iter().map(|e| format!("{}: {}", e.path, e.message)).collect())
    }

    #[test]
    fn test_string_descriptor_with_transform() {
        let schema = compile(&json!({
            "type": "string",
            "nonEmpty": true,
            "format": "email",
            "transform": "lowercase"
        }))
        .unwrap();

        assert_eq!(run(&schema, json!("Ada@Example.COM")).unwrap(), Value::from("ada@example.com"));
        assert_eq!(run(&schema, json!("")).unwrap_err().len(), 2);
    }

    #[test]
    fn test_message_replaces_last_check() {
        let schema = compile(&json!({
            "type": "number",
            "coerce": true,
            "minimum": 1,
            "maximum": 100,
            "message": "Pick 1 to 100"
        }))
        .unwrap();

        assert_eq!(run(&schema, json!("150")).unwrap_err(), vec![": Pick 1 to 100"]);
        assert_eq!(run(&schema, json!("abc")).unwrap_err(), vec![": invalid number"]);
    }

    #[test]
    fn test_required_and_optional_properties() {
        let schema = compile(&json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "nonEmpty": true },
                "nickname": { "type": "string" }
            },
            "required": ["name"]
        }))
        .unwrap();

        assert!(run(&schema, json!({ "name": "Ada" })).is_ok());
        assert_eq!(
            run(&schema, json!({ "nickname": "ada" })).unwrap_err(),
            vec!["name: name is required"]
        );
    }

    #[test]
    fn test_file_list_first_with_checks() {
        let schema = compile(&json!({
            "type": "file_list",
            "first": { "type": "file", "maxSize": 10, "message": "too big" }
        }))
        .unwrap();

        let big = Value::from(vec![crate::FileHandle::new("a.png", 11, "image/png")]);
        let errors = schema.validate_value(&big, &FieldPath::root()).into_result().unwrap_err();
        assert_eq!(errors.first().message, "too big");
    }

    #[test]
    fn test_numeric_check_on_string_is_rejected() {
        let err = compile(&json!({ "type": "string", "minimum": 3 })).err().unwrap();
        assert!(matches!(
            err,
            SchemaBuildError::UnsupportedCheck { ref check, kind: "string" } if check == "minimum"
        ));
    }

    #[test]
    fn test_array_without_items_is_rejected() {
        let err = compile(&json!({
            "type": "object",
            "properties": { "techs": { "type": "array", "minItems": 2 } }
        }))
        .err()
        .unwrap();
        assert!(matches!(err, SchemaBuildError::MissingElement { ref at } if at == "techs"));
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            compile(&json!({ "type": "number", "minimum": 10, "maximum": 1 })),
            Err(SchemaBuildError::InvertedBounds { .. })
        ));
        assert!(matches!(
            compile(&json!({ "type": "string", "minLength": 5, "maxLength": 2 })),
            Err(SchemaBuildError::InvertedBounds { .. })
        ));
        assert!(matches!(
            compile(&json!({ "type": "string", "pattern": "(" })),
            Err(SchemaBuildError::InvalidPattern { .. })
        ));
        assert!(matches!(
            compile(&json!({ "type": "date" })),
            Err(SchemaBuildError::UnknownKind(ref k)) if k == "date"
        ));
        assert!(matches!(
            compile(&json!({ "type": "string", "transform": "reverse" })),
            Err(SchemaBuildError::UnknownTransform(_))
        ));
        assert!(matches!(
            compile(&json!({ "type": "object", "required": ["ghost"] })),
            Err(SchemaBuildError::UndeclaredRequired(_))
        ));
        assert!(matches!(
            compile(&json!({ "type": "string", "minLen": 3 })),
            Err(SchemaBuildError::Descriptor(_))
        ));
    }

    #[test]
    fn test_compile_str() {
        let schema = compile_str(r#"{ "type": "array", "items": { "type": "number" }, "maxItems": 1 }"#).unwrap();
        assert!(run(&schema, json!([1])).is_ok());
        assert!(run(&schema, json!([1, 2])).is_err());
    }
}
