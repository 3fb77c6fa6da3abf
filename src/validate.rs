//! Structural validation of values against schema nodes.
//!
//! [`SchemaValidator`] is the seam to a structural JSON-Schema validator.
//! [`SubsetValidator`] implements the OpenAPI 2.0 keyword subset parsed by
//! [`crate::schema`]; [`validate_value`] adapts any validator's failure into a
//! [`ValueError::SchemaValidation`].

use std::borrow::Cow;

use crate::error::ValueError;
use crate::schema::{numeric_bound, SchemaNode, SchemaType};
use crate::value::{FileUpload, Value};

const MAX_SCHEMA_VALIDATION_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Failure reported by a structural validator.
pub struct ValidationFailure {
    pub message: String,
    /// JSON-pointer style location in the value (`""` for the root).
    pub data_path: String,
    /// Location of the violated keyword (`#/properties/age/type`).
    pub schema_path: String,
}

/// Structural validator abstraction used by the engine.
pub trait SchemaValidator {
    /// Checks `value` against `schema`.
    fn validate(&self, schema: &SchemaNode, value: &Value) -> Result<(), ValidationFailure>;
}

#[derive(Debug, Clone, Copy, Default)]
/// [`SchemaValidator`] for the OpenAPI 2.0 keyword subset.
pub struct SubsetValidator;

impl SchemaValidator for SubsetValidator {
    fn validate(&self, schema: &SchemaNode, value: &Value) -> Result<(), ValidationFailure> {
        validate_inner(value, schema, "", "#", 0)
    }
}

/// Validates `value`, optionally as if `schema` declared `as_type`.
///
/// The override is applied to a copy; `schema` itself is never modified.
pub fn validate_value(
    validator: &dyn SchemaValidator,
    schema: &SchemaNode,
    as_type: Option<SchemaType>,
    value: &Value,
    property: &str,
) -> Result<(), ValueError> {
    let schema = match as_type {
        Some(t) if schema.schema_type != Some(t) => Cow::Owned(schema.with_type(t)),
        _ => Cow::Borrowed(schema),
    };
    validator.validate(&schema, value).map_err(|failure| {
        tracing::debug!(
            property,
            data_path = %failure.data_path,
            schema_path = %failure.schema_path,
            "structural validation failed"
        );
        ValueError::SchemaValidation {
            property: (!property.is_empty()).then(|| property.to_string()),
            message: failure.message,
            data_path: failure.data_path,
            schema_path: failure.schema_path,
        }
    })
}

fn fail(message: String, data_path: &str, schema_path: &str) -> ValidationFailure {
    ValidationFailure {
        message,
        data_path: data_path.to_string(),
        schema_path: schema_path.to_string(),
    }
}

fn validate_inner(
    value: &Value,
    schema: &SchemaNode,
    data_path: &str,
    schema_path: &str,
    depth: usize,
) -> Result<(), ValidationFailure> {
    if depth > MAX_SCHEMA_VALIDATION_DEPTH {
        return Err(fail(
            format!("schema validation exceeded max depth ({MAX_SCHEMA_VALIDATION_DEPTH})"),
            data_path,
            schema_path,
        ));
    }

    if let Some(type_name) = schema.schema_type {
        if !value_matches_type(value, type_name) {
            return Err(fail(
                format!(
                    "type mismatch: expected {type_name}, found {}",
                    value.type_name()
                ),
                data_path,
                &format!("{schema_path}/type"),
            ));
        }
    }

    if let Some(options) = &schema.enum_values {
        if !options.iter().any(|candidate| enum_matches(candidate, value)) {
            return Err(fail(
                format!("enum mismatch: value {} not in enum set", value.to_json()),
                data_path,
                &format!("{schema_path}/enum"),
            ));
        }
    }

    validate_numeric_keywords(value, schema, data_path, schema_path)?;
    validate_string_keywords(value, schema, data_path, schema_path)?;
    validate_object_keywords(value, schema, data_path, schema_path, depth)?;
    validate_array_keywords(value, schema, data_path, schema_path, depth)?;

    Ok(())
}

fn enum_matches(candidate: &Value, value: &Value) -> bool {
    match (candidate.as_f64(), value.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => candidate == value,
    }
}

fn validate_numeric_keywords(
    value: &Value,
    schema: &SchemaNode,
    data_path: &str,
    schema_path: &str,
) -> Result<(), ValidationFailure> {
    let val = match value.as_f64() {
        Some(v) => v,
        None => return Ok(()),
    };

    // Non-numeric bounds belong to date schemas and are checked by the engine.
    if let Some(min) = schema.minimum.as_ref().and_then(numeric_bound) {
        if val < min || (schema.exclusive_minimum && val == min) {
            let op = if schema.exclusive_minimum { "<=" } else { "<" };
            return Err(fail(
                format!("minimum violation: {val} {op} {min}"),
                data_path,
                &format!("{schema_path}/minimum"),
            ));
        }
    }

    if let Some(max) = schema.maximum.as_ref().and_then(numeric_bound) {
        if val > max || (schema.exclusive_maximum && val == max) {
            let op = if schema.exclusive_maximum { ">=" } else { ">" };
            return Err(fail(
                format!("maximum violation: {val} {op} {max}"),
                data_path,
                &format!("{schema_path}/maximum"),
            ));
        }
    }

    Ok(())
}

fn validate_string_keywords(
    value: &Value,
    schema: &SchemaNode,
    data_path: &str,
    schema_path: &str,
) -> Result<(), ValidationFailure> {
    let s = match value.as_str() {
        Some(v) => v,
        None => return Ok(()),
    };
    let len = s.chars().count() as f64;

    if let Some(min) = schema.min_length.as_ref().and_then(numeric_bound) {
        if len < min {
            return Err(fail(
                format!("minLength violation: {len} < {min}"),
                data_path,
                &format!("{schema_path}/minLength"),
            ));
        }
    }

    if let Some(max) = schema.max_length.as_ref().and_then(numeric_bound) {
        if len > max {
            return Err(fail(
                format!("maxLength violation: {len} > {max}"),
                data_path,
                &format!("{schema_path}/maxLength"),
            ));
        }
    }

    Ok(())
}

fn validate_object_keywords(
    value: &Value,
    schema: &SchemaNode,
    data_path: &str,
    schema_path: &str,
    depth: usize,
) -> Result<(), ValidationFailure> {
    let obj = match value.as_object() {
        Some(v) => v,
        None => return Ok(()),
    };

    for key in &schema.required {
        if !obj.contains_key(key) {
            return Err(fail(
                format!("required property missing: '{key}'"),
                data_path,
                &format!("{schema_path}/required"),
            ));
        }
    }

    for (k, child_schema) in &schema.properties {
        if let Some(child_value) = obj.get(k) {
            validate_inner(
                child_value,
                child_schema,
                &format!("{data_path}/{k}"),
                &format!("{schema_path}/properties/{k}"),
                depth + 1,
            )?;
        }
    }

    Ok(())
}

fn validate_array_keywords(
    value: &Value,
    schema: &SchemaNode,
    data_path: &str,
    schema_path: &str,
    depth: usize,
) -> Result<(), ValidationFailure> {
    let arr = match value.as_array() {
        Some(v) => v,
        None => return Ok(()),
    };

    if let Some(min) = schema.min_items {
        if (arr.len() as u64) < min {
            return Err(fail(
                format!("minItems violation: {} < {min}", arr.len()),
                data_path,
                &format!("{schema_path}/minItems"),
            ));
        }
    }

    if let Some(max) = schema.max_items {
        if (arr.len() as u64) > max {
            return Err(fail(
                format!("maxItems violation: {} > {max}", arr.len()),
                data_path,
                &format!("{schema_path}/maxItems"),
            ));
        }
    }

    if schema.unique_items {
        for (idx, item) in arr.iter().enumerate() {
            if arr[..idx].contains(item) {
                return Err(fail(
                    format!("uniqueItems violation: item {idx} is a duplicate"),
                    data_path,
                    &format!("{schema_path}/uniqueItems"),
                ));
            }
        }
    }

    if let Some(items_schema) = &schema.items {
        for (idx, item) in arr.iter().enumerate() {
            validate_inner(
                item,
                items_schema,
                &format!("{data_path}/{idx}"),
                &format!("{schema_path}/items"),
                depth + 1,
            )?;
        }
    }

    Ok(())
}

fn value_matches_type(value: &Value, schema_type: SchemaType) -> bool {
    match schema_type {
        SchemaType::String => matches!(value, Value::String(_) | Value::Binary(_) | Value::Date(_)),
        SchemaType::Integer => match value {
            Value::Integer(_) => true,
            Value::Number(n) => n.is_finite() && n.fract() == 0.0,
            _ => false,
        },
        SchemaType::Number => matches!(value, Value::Integer(_) | Value::Number(_)),
        SchemaType::Boolean => matches!(value, Value::Bool(_)),
        SchemaType::Array => matches!(value, Value::Array(_)),
        SchemaType::Object => matches!(value, Value::Object(_) | Value::File(_)),
        SchemaType::File => FileUpload::from_value(value).is_some(),
    }
}
