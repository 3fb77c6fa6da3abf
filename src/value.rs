//! Dynamic value model shared by parse, serialize and sample.
//!
//! [`Value`] is a superset of JSON: besides the usual scalars and containers
//! it carries native dates, binary buffers and uploaded-file descriptors,
//! which is what the engine produces when it parses request data.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

/// Ordered object representation used by [`Value::Object`].
pub type ValueMap = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq)]
/// Owned dynamic value.
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Date(DateTime<Utc>),
    Binary(Vec<u8>),
    File(FileUpload),
    Array(Vec<Value>),
    Object(ValueMap),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Descriptor of an uploaded file, as produced by a multipart collaborator.
pub struct FileUpload {
    /// File size in bytes.
    pub size: u64,
    /// Location of the stored upload.
    pub path: String,
    /// Name of the file on the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originalname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fieldname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl FileUpload {
    /// Creates a descriptor with only the required fields set.
    pub fn new(size: u64, path: impl Into<String>) -> Self {
        Self {
            size,
            path: path.into(),
            originalname: None,
            mimetype: None,
            fieldname: None,
            encoding: None,
        }
    }

    /// Sets the client-side file name.
    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.originalname = Some(name.into());
        self
    }

    /// Recognises an upload descriptor.
    ///
    /// Objects qualify only when they carry a string `path` and a non-negative
    /// integral `size`; optional string fields are copied when present.
    pub fn from_value(value: &Value) -> Option<FileUpload> {
        match value {
            Value::File(file) => Some(file.clone()),
            Value::Object(map) => {
                let path = map.get("path")?.as_str()?;
                let size = match map.get("size")? {
                    Value::Integer(n) if *n >= 0 => *n as u64,
                    Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 => *n as u64,
                    _ => return None,
                };
                let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
                Some(FileUpload {
                    size,
                    path: path.to_string(),
                    originalname: text("originalname"),
                    mimetype: text("mimetype"),
                    fieldname: text("fieldname"),
                    encoding: text("encoding"),
                })
            }
            _ => None,
        }
    }

    /// Name used in error messages.
    pub fn display_name(&self) -> &str {
        self.originalname.as_deref().unwrap_or(&self.path)
    }
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_empty_string(&self) -> bool {
        matches!(self, Value::String(s) if s.is_empty())
    }

    /// `true` for an object without keys or an array without elements.
    pub fn is_empty_structure(&self) -> bool {
        match self {
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Short type label used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => "integer",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Binary(_) => "binary",
            Value::File(_) => "file",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Rebuilds a byte buffer from its JSON shape `{"type":"Buffer","data":[..]}`.
    pub fn to_buffer(&self) -> Option<Vec<u8>> {
        let map = self.as_object()?;
        if map.get("type")?.as_str()? != "Buffer" {
            return None;
        }
        let data = map.get("data")?.as_array()?;
        data.iter()
            .map(|byte| match byte {
                Value::Integer(n) => u8::try_from(*n).ok(),
                _ => None,
            })
            .collect()
    }

    /// Converts to JSON for transmission.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Integer(n) => JsonValue::Number((*n).into()),
            Value::Number(n) => JsonNumber::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Date(date) => JsonValue::String(format_iso(date)),
            Value::Binary(bytes) => serde_json::json!({ "type": "Buffer", "data": bytes }),
            Value::File(file) => serde_json::to_value(file).unwrap_or(JsonValue::Null),
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => {
                let mut out = JsonMap::new();
                for (k, v) in map {
                    out.insert(k.clone(), v.to_json());
                }
                JsonValue::Object(out)
            }
        }
    }

    /// Renders the value the way it would appear as raw request text.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(n) => n.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Date(date) => format_iso(date),
            Value::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            other => other.to_json().to_string(),
        }
    }
}

/// ISO-8601 rendering with millisecond precision and a `Z` suffix.
pub fn format_iso(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            JsonValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        Value::from(value.clone())
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        value.to_json()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<FileUpload> for Value {
    fn from(value: FileUpload) -> Self {
        Value::File(value)
    }
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
