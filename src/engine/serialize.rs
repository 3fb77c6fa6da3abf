//! Lenient serialization of stored values.

use super::{integer_value, join_property, parse_date_text, to_number, JsonSchema};
use crate::schema::SchemaType;
use crate::value::{format_iso, FileUpload, Value};

impl JsonSchema<'_> {
    /// Converts a stored value into its transmittable form.
    ///
    /// Never fails: values that cannot be coerced are returned unchanged.
    /// Returns `None` only for an undefined value without `default`/`example`.
    pub fn serialize(&self, value: Option<Value>, path: &str) -> Option<Value> {
        let value = self.resolve(value, path)?;

        let serialized = match self.schema.effective_type() {
            SchemaType::Number => self.serialize_number(value, path, false),
            SchemaType::Integer => self.serialize_number(value, path, true),
            SchemaType::Boolean => Value::Bool(to_boolean(&value)),
            SchemaType::String => match self.schema.format() {
                Some("byte") => self.serialize_number(value, path, true),
                Some("date") | Some("date-time") => self.serialize_date(value),
                _ => match value {
                    Value::String(s) => Value::String(s),
                    other => Value::String(other.to_text()),
                },
            },
            SchemaType::Array => self.serialize_array(value, path),
            SchemaType::Object => self.serialize_object(value, path),
            SchemaType::File => serialize_file(value),
        };
        Some(serialized)
    }

    fn serialize_number(&self, value: Value, path: &str, integer: bool) -> Value {
        match value {
            Value::Integer(_) | Value::Number(_) => value,
            Value::String(_) => match to_number(&value) {
                Some(n) if integer => integer_value(&value, n),
                Some(n) => Value::Number(n),
                None => {
                    tracing::warn!(path, "non-numeric value serialized unchanged");
                    value
                }
            },
            Value::Bool(b) => Value::Integer(i64::from(b)),
            Value::Date(date) => Value::Integer(date.timestamp_millis()),
            _ => {
                tracing::warn!(
                    path,
                    kind = value.type_name(),
                    "non-numeric value serialized unchanged"
                );
                value
            }
        }
    }

    fn serialize_date(&self, value: Value) -> Value {
        if self.schema.format() == Some("date") {
            let iso = match &value {
                Value::Date(date) => Some(format_iso(date)),
                Value::String(s) if parse_date_text(s).is_some() => Some(s.trim().to_string()),
                _ => None,
            };
            if let Some(day) = iso.as_deref().and_then(|iso| iso.get(..10)) {
                return Value::String(day.to_string());
            }
        }
        match value {
            Value::Date(date) => Value::String(format_iso(&date)),
            Value::String(s) => Value::String(s),
            other => Value::String(other.to_text()),
        }
    }

    fn serialize_array(&self, value: Value, path: &str) -> Value {
        match (value, self.schema.items.as_deref()) {
            (Value::Array(items), Some(items_schema)) => {
                let child = self.child(items_schema);
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    out.extend(child.serialize(Some(item), &format!("{path}[{index}]")));
                }
                Value::Array(out)
            }
            (other, _) => other,
        }
    }

    fn serialize_object(&self, value: Value, path: &str) -> Value {
        let mut map = match value {
            Value::Object(map) => map,
            other => return other,
        };
        for (name, prop_schema) in &self.schema.properties {
            let current = map.get(name).cloned();
            let prop_path = join_property(path, name);
            if let Some(serialized) = self.child(prop_schema).serialize(current, &prop_path) {
                map.insert(name.clone(), serialized);
            }
        }
        Value::Object(map)
    }
}

/// Strict boolean coercion.
fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Integer(n) => *n != 0,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => true,
    }
}

/// Picks the upload descriptor out of a stored file wrapper.
fn serialize_file(value: Value) -> Value {
    if let Value::Object(map) = &value {
        if let Some(file) = map.values().find_map(FileUpload::from_value) {
            return Value::File(file);
        }
    }
    value
}
