//! Parsing of raw request values.

use serde_json::Value as JsonValue;

use super::{
    date_bound, date_pattern, date_time_pattern, integer_pattern, integer_value, join_property,
    parse_date_text, to_number, JsonSchema,
};
use crate::error::ValueError;
use crate::formats::{format_bound, numeric_range};
use crate::schema::{numeric_bound, SchemaType};
use crate::validate::validate_value;
use crate::value::{format_iso, FileUpload, Value};

impl JsonSchema<'_> {
    /// Parses a raw value into its typed form.
    ///
    /// `path` names the property for error messages. Returns `Ok(None)` when
    /// the value is undefined and the schema supplies neither `default` nor
    /// `example`.
    pub fn parse(&self, value: Option<Value>, path: &str) -> Result<Option<Value>, ValueError> {
        let Some(value) = self.resolve(value, path) else {
            return Ok(None);
        };

        let schema_type = self.schema.effective_type();
        tracing::debug!(path, %schema_type, format = self.schema.format(), "parsing value");

        let parsed = match schema_type {
            SchemaType::Number => self.parse_number(value, path)?,
            SchemaType::Integer => self.parse_integer(value, path)?,
            SchemaType::Boolean => self.parse_boolean(value, path)?,
            SchemaType::String => match self.schema.format() {
                Some("byte") => self.parse_integer(value, path)?,
                Some("date") | Some("date-time") => self.parse_date(value, path)?,
                _ => self.parse_string(value, path)?,
            },
            SchemaType::Array => self.parse_array(value, path)?,
            SchemaType::Object => self.parse_object(value, path)?,
            SchemaType::File => self.parse_file(value, path)?,
        };
        Ok(Some(parsed))
    }

    fn parse_number(&self, value: Value, path: &str) -> Result<Value, ValueError> {
        let n = self.finite_number(&value, "number")?;
        let parsed = Value::Number(n);
        validate_value(self.validator, self.schema, Some(SchemaType::Number), &parsed, path)?;
        self.check_format_range(&value, n, true)?;
        Ok(parsed)
    }

    fn parse_integer(&self, value: Value, path: &str) -> Result<Value, ValueError> {
        let n = self.finite_number(&value, "integer")?;
        let text = value.to_text();
        if !integer_pattern().is_match(text.trim()) {
            return Err(ValueError::ClientData(format!(
                "\"{text}\" is not a valid integer"
            )));
        }
        let parsed = integer_value(&value, n);
        validate_value(self.validator, self.schema, Some(SchemaType::Integer), &parsed, path)?;
        // A float result means the integer did not fit i64.
        self.check_format_range(&value, n, matches!(parsed, Value::Integer(_)))?;
        Ok(parsed)
    }

    fn finite_number(&self, value: &Value, kind: &str) -> Result<f64, ValueError> {
        match to_number(value) {
            Some(n) if n.is_finite() => Ok(n),
            _ => Err(ValueError::ClientData(format!(
                "\"{}\" is not a properly-formatted {kind}",
                value.to_text()
            ))),
        }
    }

    fn check_format_range(
        &self,
        value: &Value,
        n: f64,
        fits_i64: bool,
    ) -> Result<(), ValueError> {
        let Some(format) = self.schema.format() else {
            return Ok(());
        };
        let Some(range) = numeric_range(format) else {
            return Ok(());
        };
        if !range.contains(n, fits_i64) {
            let (min, max) = range.describe();
            return Err(ValueError::ClientData(format!(
                "\"{}\" is not a valid {format}. Must be between {min} and {max}",
                value.to_text()
            )));
        }
        Ok(())
    }

    fn parse_boolean(&self, value: Value, path: &str) -> Result<Value, ValueError> {
        let coerced = match value {
            Value::String(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
            other => other,
        };
        validate_value(self.validator, self.schema, None, &coerced, path)?;
        Ok(Value::Bool(matches!(coerced, Value::Bool(true))))
    }

    fn parse_string(&self, value: Value, path: &str) -> Result<Value, ValueError> {
        validate_value(self.validator, self.schema, None, &value, path)?;
        Ok(value)
    }

    fn parse_date(&self, value: Value, path: &str) -> Result<Value, ValueError> {
        let format = if self.schema.format() == Some("date") {
            "date"
        } else {
            "date-time"
        };

        let (date, text) = match value {
            Value::Date(date) => (date, format_iso(&date)),
            other => {
                validate_value(self.validator, self.schema, None, &other, path)?;
                let text = other.to_text();
                let pattern = if format == "date" {
                    date_pattern()
                } else {
                    date_time_pattern()
                };
                if !pattern.is_match(&text) {
                    return Err(ValueError::ClientData(format!(
                        "\"{text}\" is not a properly-formatted {format}"
                    )));
                }
                let date = parse_date_text(&text).ok_or_else(|| {
                    ValueError::ClientData(format!("\"{text}\" is an invalid {format}"))
                })?;
                (date, text)
            }
        };

        if let Some(raw) = &self.schema.minimum {
            let min = date_bound(raw).ok_or_else(|| invalid_definition("minimum", raw))?;
            if date < min {
                return Err(ValueError::ClientData(format!(
                    "\"{text}\" is less than minimum {}",
                    bound_text(raw)
                )));
            }
            if self.schema.exclusive_minimum && date == min {
                return Err(ValueError::ClientData(format!(
                    "\"{text}\" is equal to exclusive minimum {}",
                    bound_text(raw)
                )));
            }
        }

        if let Some(raw) = &self.schema.maximum {
            let max = date_bound(raw).ok_or_else(|| invalid_definition("maximum", raw))?;
            if date > max {
                return Err(ValueError::ClientData(format!(
                    "\"{text}\" is greater than maximum {}",
                    bound_text(raw)
                )));
            }
            if self.schema.exclusive_maximum && date == max {
                return Err(ValueError::ClientData(format!(
                    "\"{text}\" is equal to exclusive maximum {}",
                    bound_text(raw)
                )));
            }
        }

        Ok(Value::Date(date))
    }

    fn parse_array(&self, value: Value, path: &str) -> Result<Value, ValueError> {
        let value = match value {
            Value::String(s) if !s.is_empty() => {
                let items = match self.schema.collection_format.separator() {
                    Some(sep) => s.split(sep).map(Value::from).collect(),
                    None => vec![Value::String(s)],
                };
                Value::Array(items)
            }
            other => other,
        };

        let items_schema = self.schema.items.as_deref();
        // String items need no coercion, so the array is validated as a whole first.
        let validate_first =
            items_schema.is_some_and(|items| items.effective_type() == SchemaType::String);
        if validate_first {
            validate_value(self.validator, self.schema, None, &value, path)?;
        }

        let value = match (value, items_schema) {
            (Value::Array(items), Some(items_schema)) => {
                let child = self.child(items_schema);
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let item_path = format!("{path}[{index}]");
                    let parsed = child.parse(Some(item), &item_path).map_err(|source| {
                        ValueError::ArrayItem {
                            index,
                            path: item_path.clone(),
                            source: Box::new(source),
                        }
                    })?;
                    out.extend(parsed);
                }
                Value::Array(out)
            }
            (other, _) => other,
        };

        if !validate_first {
            validate_value(self.validator, self.schema, None, &value, path)?;
        }
        Ok(value)
    }

    fn parse_object(&self, value: Value, path: &str) -> Result<Value, ValueError> {
        let mut value = match value {
            Value::String(s) if !s.is_empty() => {
                let decoded: JsonValue = serde_json::from_str(&s).map_err(|e| {
                    ValueError::ClientData(format!("\"{s}\" is not a valid JSON object: {e}"))
                })?;
                Value::from(decoded)
            }
            other => other,
        };

        validate_value(self.validator, self.schema, None, &value, path)?;

        if let Value::Object(map) = &mut value {
            for (name, prop_schema) in &self.schema.properties {
                let current = map.get(name).cloned();
                if current.is_none() && prop_schema.default.is_none() {
                    continue;
                }
                let prop_path = join_property(path, name);
                if let Some(parsed) = self.child(prop_schema).parse(current, &prop_path)? {
                    map.insert(name.clone(), parsed);
                }
            }
        }
        Ok(value)
    }

    fn parse_file(&self, value: Value, path: &str) -> Result<Value, ValueError> {
        let (size, name) = match &value {
            Value::File(file) => (Some(file.size as f64), file.display_name().to_string()),
            Value::Object(map) => {
                let name = FileUpload::from_value(&value)
                    .map(|file| file.display_name().to_string())
                    .unwrap_or_else(|| path.to_string());
                (map.get("size").and_then(Value::as_f64), name)
            }
            _ => (None, path.to_string()),
        };
        let size = size.filter(|s| s.is_finite()).ok_or_else(|| {
            ValueError::ClientData(format!("File \"{path}\" is invalid or corrupted"))
        })?;

        if let Some(raw) = &self.schema.min_length {
            let min = numeric_bound(raw).ok_or_else(|| invalid_definition("minLength", raw))?;
            if size < min {
                return Err(ValueError::ClientData(format!(
                    "File \"{name}\" is only {} bytes. The minimum is {} bytes",
                    format_bound(size),
                    format_bound(min)
                )));
            }
        }

        if let Some(raw) = &self.schema.max_length {
            let max = numeric_bound(raw).ok_or_else(|| invalid_definition("maxLength", raw))?;
            if size > max {
                return Err(ValueError::PayloadTooLarge(format!(
                    "File \"{name}\" is {} bytes. The maximum is {} bytes",
                    format_bound(size),
                    format_bound(max)
                )));
            }
        }

        Ok(value)
    }
}

fn invalid_definition(keyword: &str, raw: &JsonValue) -> ValueError {
    ValueError::ApiDefinition(format!(
        "The \"{keyword}\" value in the API definition is invalid ({raw})"
    ))
}

fn bound_text(raw: &JsonValue) -> String {
    match raw {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
