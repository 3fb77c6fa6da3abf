//! Schema-directed value engine.
//!
//! A [`JsonSchema`] wraps one [`SchemaNode`] and offers three operations:
//! [`JsonSchema::parse`] turns loosely-typed request data into typed values,
//! [`JsonSchema::serialize`] turns stored values into transmittable ones and
//! [`JsonSchema::sample`] synthesizes a conforming value from the schema alone.
//! Child schemas (array items, object properties) are handled by child
//! engines borrowing the child node.

mod parse;
mod sample;
mod serialize;

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::schema::{SchemaNode, SchemaType};
use crate::validate::{SchemaValidator, SubsetValidator};
use crate::value::Value;

/// Engine node for one schema.
#[derive(Clone, Copy)]
pub struct JsonSchema<'a> {
    schema: &'a SchemaNode,
    validator: &'a dyn SchemaValidator,
}

impl<'a> JsonSchema<'a> {
    /// Creates an engine validating with [`SubsetValidator`].
    pub fn new(schema: &'a SchemaNode) -> Self {
        Self {
            schema,
            validator: &SubsetValidator,
        }
    }

    /// Creates an engine delegating structural validation to `validator`.
    pub fn with_validator(schema: &'a SchemaNode, validator: &'a dyn SchemaValidator) -> Self {
        Self { schema, validator }
    }

    pub fn schema(&self) -> &'a SchemaNode {
        self.schema
    }

    fn child(&self, schema: &'a SchemaNode) -> JsonSchema<'a> {
        JsonSchema {
            schema,
            validator: self.validator,
        }
    }

    /// Effective-value resolution.
    ///
    /// Undefined input, the empty string and (for object schemas) an empty
    /// object or array fall back to `default`, then `example`. A serialized
    /// byte buffer is turned back into binary.
    fn resolve(&self, value: Option<Value>, path: &str) -> Option<Value> {
        let blank = match &value {
            None => true,
            Some(v) => {
                v.is_empty_string()
                    || (self.schema.effective_type() == SchemaType::Object
                        && v.is_empty_structure())
            }
        };

        let value = if !blank {
            value
        } else if let Some(default) = &self.schema.default {
            tracing::debug!(path, "blank value replaced by schema default");
            Some(default.clone())
        } else if let Some(example) = &self.schema.example {
            tracing::debug!(path, "blank value replaced by schema example");
            Some(example.clone())
        } else {
            value
        };

        value.map(|v| match v.to_buffer() {
            Some(bytes) => Value::Binary(bytes),
            None => v,
        })
    }
}

/// Appends a property name to a dotted path.
pub(crate) fn join_property(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

fn integer_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^[+-]?(\d+|0x[0-9a-f]+)$").expect("valid regex"))
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"))
}

fn date_time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\d{4}-\d{2}-\d{2}t\d{2}:\d{2}:\d{2}(\.\d+)?(z|[+-]\d{2}:\d{2})$")
            .expect("valid regex")
    })
}

/// Reads a number from a numeric value or numeric text (`0x` hex allowed).
pub(crate) fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Integer(n) => Some(*n as f64),
        Value::Number(n) => Some(*n),
        Value::String(s) => parse_numeric_text(s.trim()),
        _ => None,
    }
}

fn parse_numeric_text(text: &str) -> Option<f64> {
    if let Some(n) = parse_integer_text(text) {
        return Some(n as f64);
    }
    text.parse::<f64>().ok()
}

fn parse_integer_text(text: &str) -> Option<i64> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16).ok()?,
        None if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) => {
            return text.parse::<i64>().ok();
        }
        None => return None,
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Typed integer for `n`, falling back to a float when it does not fit `i64`.
///
/// Integer text that overflows `i64` is always a float, even when `n` has
/// rounded back into range.
pub(crate) fn integer_value(source: &Value, n: f64) -> Value {
    if let Value::String(s) = source {
        let text = s.trim();
        if let Some(exact) = parse_integer_text(text) {
            return Value::Integer(exact);
        }
        if integer_pattern().is_match(text) {
            return Value::Number(n);
        }
    }
    if let Value::Integer(exact) = source {
        return Value::Integer(*exact);
    }
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::Integer(n as i64)
    } else {
        Value::Number(n)
    }
}

/// Parses `YYYY-MM-DD` (UTC midnight) or an RFC 3339 date-time.
pub(crate) fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if date_pattern().is_match(text) {
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Reads a date bound from a schema: date text or epoch milliseconds.
pub(crate) fn date_bound(raw: &JsonValue) -> Option<DateTime<Utc>> {
    match raw {
        JsonValue::String(s) => parse_date_text(s),
        JsonValue::Number(n) => {
            let millis = n.as_i64()?;
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}
