use serde_json::json;

use swagger_values::{
    default_parameter, ParameterDescriptor, ParameterStyle, ParseInfo, SchemaType, Value,
};

fn param(raw: serde_json::Value) -> ParameterDescriptor {
    ParameterDescriptor::from_json(&raw).unwrap()
}

#[test]
fn openapi2_query_parameter_parses_through_its_inline_schema() {
    let limit = param(json!({
        "name": "limit",
        "in": "query",
        "required": false,
        "type": "integer",
        "format": "int32",
        "default": 10
    }));

    let info = ParseInfo::new(&limit, None).unwrap();
    assert_eq!(info.path(), "limit");
    assert_eq!(info.parameter().style, Some(ParameterStyle::Form));
    assert_eq!(info.value_or_default(), Some(&Value::Integer(10)));
    assert_eq!(info.parse_current().unwrap(), Some(Value::Integer(10)));

    let info = ParseInfo::new(&limit, Some(Value::from("25"))).unwrap();
    assert_eq!(info.parse_current().unwrap(), Some(Value::Integer(25)));
}

#[test]
fn parse_errors_name_the_nested_path() {
    let body = param(json!({
        "name": "order",
        "in": "body",
        "schema": {
            "type": "object",
            "properties": {
                "lines": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": { "qty": { "type": "integer", "minimum": 1 } }
                    }
                }
            }
        }
    }));
    let root = ParseInfo::new(&body, None).unwrap();
    let lines_schema = root.schema().properties["lines"].clone();
    let line_schema = lines_schema.items.as_deref().unwrap().clone();
    let qty_schema = line_schema.properties["qty"].clone();

    let lines = root.push("lines", None, &lines_schema);
    let line = lines.push(2usize, None, &line_schema);
    let qty = line.push("qty", Some(Value::from("0")), &qty_schema);

    assert_eq!(qty.path(), "order.lines[2].qty");
    let err = qty.parse_current().unwrap_err();
    assert!(
        err.to_string().starts_with("Error in property \"order.lines[2].qty\"."),
        "{err}"
    );

    let trail: Vec<&str> = qty.ancestors().map(|frame| frame.path.as_str()).collect();
    assert_eq!(trail, vec!["order.lines[2]", "order.lines", "order"]);
}

#[test]
fn pushed_schemas_are_defaulted() {
    let body = param(json!({ "name": "blob", "in": "body", "schema": {} }));
    let root = ParseInfo::new(&body, Some(Value::from(json!({ "a": {} })))).unwrap();
    assert_eq!(root.schema().schema_type, Some(SchemaType::Object));

    let untyped = swagger_values::SchemaNode::default();
    let child = root.push("a", Some(Value::from(json!({}))), &untyped);
    assert_eq!(child.schema().schema_type, Some(SchemaType::Object));
    assert_eq!(child.depth(), 1);
    assert_eq!(child.pop().unwrap().path(), "blob");
}

#[test]
fn defaulting_leaves_the_descriptor_untouched() {
    let header = param(json!({ "name": "X-Trace", "in": "header", "type": "string" }));
    let defaulted = default_parameter(&header);
    assert_eq!(defaulted.style, Some(ParameterStyle::Simple));
    assert_eq!(defaulted.explode, Some(false));
    assert_eq!(header.style, None);
    assert_eq!(header.explode, None);
}
