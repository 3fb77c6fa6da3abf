pub mod defaults;
pub mod engine;
pub mod error;
pub mod formats;
pub mod parameter;
pub mod parse_info;
pub mod schema;
pub mod validate;
pub mod value;

use serde_json::Value as JsonValue;

pub use defaults::{default_parameter, default_schema};
pub use engine::JsonSchema;
pub use error::ValueError;
pub use parameter::{ParameterDescriptor, ParameterLocation, ParameterStyle};
pub use parse_info::{ParseInfo, PathSegment, TraversalFrame};
pub use schema::{CollectionFormat, SchemaNode, SchemaType};
pub use validate::{SchemaValidator, SubsetValidator, ValidationFailure};
pub use value::{FileUpload, Value, ValueMap};

/// Parses `value` against a JSON schema document.
pub fn parse_with_schema(
    schema: &JsonValue,
    value: Option<Value>,
    path: &str,
) -> Result<Option<Value>, ValueError> {
    let node = SchemaNode::from_json(schema)?;
    JsonSchema::new(&node).parse(value, path)
}

/// Serializes `value` against a JSON schema document.
pub fn serialize_with_schema(
    schema: &JsonValue,
    value: Option<Value>,
    path: &str,
) -> Result<Option<Value>, ValueError> {
    let node = SchemaNode::from_json(schema)?;
    Ok(JsonSchema::new(&node).serialize(value, path))
}

/// Samples a value from a JSON schema document.
pub fn sample_from_schema(schema: &JsonValue) -> Result<Value, ValueError> {
    let node = SchemaNode::from_json(schema)?;
    Ok(JsonSchema::new(&node).sample())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{parse_with_schema, sample_from_schema, serialize_with_schema, Value};

    #[test]
    fn parses_query_string_integer() {
        let parsed = parse_with_schema(
            &json!({ "type": "integer", "format": "int32" }),
            Some(Value::from("42")),
            "limit",
        )
        .unwrap();
        assert_eq!(parsed, Some(Value::Integer(42)));
    }

    #[test]
    fn undefined_without_fallback_stays_undefined() {
        let parsed = parse_with_schema(&json!({ "type": "number" }), None, "x").unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn broken_schema_fails_before_parsing() {
        let err = parse_with_schema(&json!({ "type": "text" }), Some(Value::from("a")), "x")
            .unwrap_err();
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn serialize_and_sample_report_schema_errors_only() {
        let serialized =
            serialize_with_schema(&json!({ "type": "integer" }), Some(Value::from("nope")), "")
                .unwrap();
        assert_eq!(serialized, Some(Value::from("nope")));
        assert!(sample_from_schema(&json!({ "type": "tuple" })).is_err());
    }
}
