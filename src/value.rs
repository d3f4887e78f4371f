//! Raw form input.
//!
//! [`Value`] is the closed set of shapes a form can hand to the engine:
//! JSON-like scalars and containers plus opaque file handles. Everything a
//! schema inspects goes through this type, so the input contract is total.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A file the user picked, as reported by the platform.
///
/// Only metadata is carried. The engine never reads file content; size
/// checks use `size` as reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    /// Byte length.
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }
}

/// A raw or validated form value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or explicitly empty.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    File(FileHandle),
    FileList(Vec<FileHandle>),
}

impl Value {
    /// Builds an object from `(name, value)` pairs, keeping their order.
    pub fn object<K, V, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Name of the shape, used in type-mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::File(_) => "file",
            Value::FileList(_) => "file list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            Value::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_file_list(&self) -> Option<&[FileHandle]> {
        match self {
            Value::FileList(files) => Some(files),
            _ => None,
        }
    }

    /// Looks up a field of an object value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.as_object().and_then(|fields| fields.get(field))
    }

    /// Converts to JSON for display or hand-off.
    ///
    /// Integral numbers become JSON integers, non-finite numbers become
    /// `null`, and files become `{"name", "size", "type"}` objects.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(fields) => Json::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::File(file) => file_to_json(file),
            Value::FileList(files) => Json::Array(files.iter().map(file_to_json).collect()),
        }
    }

    /// Renders the value as indented JSON text.
    pub fn to_pretty_string(&self) -> String {
        // Serializing an in-memory serde_json::Value cannot fail.
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }
}

fn number_to_json(n: f64) -> serde_json::Value {
    const EXACT_I64: f64 = 9_007_199_254_740_992.0;

    if n.fract() == 0.0 && n.abs() <= EXACT_I64 {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

fn file_to_json(file: &FileHandle) -> serde_json::Value {
    serde_json::json!({
        "name": file.name,
        "size": file.size,
        "type": file.mime_type,
    })
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => {
                Value::Object(fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<FileHandle> for Value {
    fn from(file: FileHandle) -> Self {
        Value::File(file)
    }
}

impl From<Vec<FileHandle>> for Value {
    fn from(files: Vec<FileHandle>) -> Self {
        Value::FileList(files)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(fields: IndexMap<String, Value>) -> Self {
        Value::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_shape_and_order() {
        let value = Value::from(json!({"b": 1, "a": [true, null, "x"]}));
        let fields = value.as_object().unwrap();
        let keys: Vec<_> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(value.get("b"), Some(&Value::Number(1.0)));
        assert_eq!(
            value.get("a"),
            Some(&Value::Array(vec![
                Value::Bool(true),
                Value::Null,
                Value::String("x".into())
            ]))
        );
    }

    #[test]
    fn test_object_builder_keeps_insertion_order() {
        let value = Value::object([("name", Value::from("Ada")), ("age", Value::from(36))]);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "age"]);
    }

    #[test]
    fn test_to_json_integral_numbers() {
        assert_eq!(Value::Number(42.0).to_json(), json!(42));
        assert_eq!(Value::Number(-3.0).to_json(), json!(-3));
        assert_eq!(Value::Number(2.5).to_json(), json!(2.5));
        assert_eq!(Value::Number(f64::NAN).to_json(), json!(null));
    }

    #[test]
    fn test_files_render_as_metadata() {
        let file = FileHandle::new("me.png", 1024, "image/png");
        assert_eq!(
            Value::File(file.clone()).to_json(),
            json!({"name": "me.png", "size": 1024, "type": "image/png"})
        );
        assert_eq!(
            Value::FileList(vec![file]).to_json(),
            json!([{"name": "me.png", "size": 1024, "type": "image/png"}])
        );
    }

    #[test]
    fn test_pretty_string_is_indented() {
        let value = Value::object([("name", "Ada")]);
        assert_eq!(value.to_pretty_string(), "{\n  \"name\": \"Ada\"\n}");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from(vec![FileHandle::new("a", 1, "")]).type_name(), "file list");
        assert_eq!(Value::from(FileHandle::new("a", 1, "")).type_name(), "file");
    }
}
