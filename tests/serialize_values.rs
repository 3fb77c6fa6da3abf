use chrono::{TimeZone, Utc};
use serde_json::json;

use swagger_values::{serialize_with_schema, FileUpload, Value};

fn serialize(schema: serde_json::Value, value: Value) -> Option<Value> {
    serialize_with_schema(&schema, Some(value), "prop").unwrap()
}

#[test]
fn dates_are_rendered_as_iso_text() {
    let instant = Value::Date(Utc.with_ymd_and_hms(2009, 8, 12, 10, 30, 0).unwrap());

    assert_eq!(
        serialize(json!({ "type": "string", "format": "date" }), instant.clone()),
        Some(Value::from("2009-08-12"))
    );
    assert_eq!(
        serialize(json!({ "type": "string", "format": "date-time" }), instant),
        Some(Value::from("2009-08-12T10:30:00.000Z"))
    );
    assert_eq!(
        serialize(
            json!({ "type": "string", "format": "date" }),
            Value::from("2009-08-12T23:00:00Z")
        ),
        Some(Value::from("2009-08-12"))
    );
}

#[test]
fn numbers_are_coerced_leniently() {
    let integer = json!({ "type": "integer" });
    assert_eq!(serialize(integer.clone(), Value::from("42")), Some(Value::Integer(42)));
    assert_eq!(serialize(integer.clone(), Value::Bool(true)), Some(Value::Integer(1)));
    assert_eq!(serialize(integer.clone(), Value::from("abc")), Some(Value::from("abc")));

    let number = json!({ "type": "number" });
    assert_eq!(serialize(number.clone(), Value::from("2.5")), Some(Value::Number(2.5)));

    let stamp = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
    assert_eq!(serialize(number, Value::Date(stamp)), Some(Value::Integer(1000)));
}

#[test]
fn booleans_and_strings_are_coerced() {
    let boolean = json!({ "type": "boolean" });
    assert_eq!(serialize(boolean.clone(), Value::from("TRUE")), Some(Value::Bool(true)));
    assert_eq!(serialize(boolean.clone(), Value::from("no")), Some(Value::Bool(false)));
    assert_eq!(serialize(boolean, Value::Integer(0)), Some(Value::Bool(false)));

    let string = json!({ "type": "string" });
    assert_eq!(serialize(string.clone(), Value::Integer(7)), Some(Value::from("7")));
    assert_eq!(serialize(string, Value::Bool(false)), Some(Value::from("false")));
}

#[test]
fn byte_values_serialize_as_integers() {
    let schema = json!({ "type": "string", "format": "byte" });
    assert_eq!(serialize(schema, Value::from("255")), Some(Value::Integer(255)));
}

#[test]
fn containers_serialize_their_members() {
    let schema = json!({
        "type": "object",
        "properties": {
            "tags": { "type": "array", "items": { "type": "integer" } },
            "seen": { "type": "string", "format": "date" },
            "level": { "type": "integer", "default": 1 }
        }
    });
    let seen = Value::Date(Utc.with_ymd_and_hms(2020, 2, 29, 12, 0, 0).unwrap());
    let mut input = Value::from(json!({ "tags": ["1", "2"], "extra": true }));
    if let Value::Object(map) = &mut input {
        map.insert("seen".to_string(), seen);
    }

    let out = serialize(schema, input).unwrap();
    assert_eq!(
        out.to_json(),
        json!({
            "tags": [1, 2],
            "extra": true,
            "seen": "2020-02-29",
            "level": 1
        })
    );
}

#[test]
fn blank_values_use_default() {
    let schema = json!({ "type": "string", "default": "fallback" });
    assert_eq!(
        serialize_with_schema(&schema, None, "s").unwrap(),
        Some(Value::from("fallback"))
    );
    assert_eq!(
        serialize_with_schema(&json!({ "type": "string" }), None, "s").unwrap(),
        None
    );
}

#[test]
fn file_wrappers_yield_the_upload() {
    let wrapper = Value::from(json!({
        "avatar": { "path": "uploads/1", "size": 10, "originalname": "me.png" }
    }));
    let out = serialize(json!({ "type": "file" }), wrapper);
    assert_eq!(
        out,
        Some(Value::File(
            FileUpload::new(10, "uploads/1").with_original_name("me.png")
        ))
    );

    let plain = Value::from(json!({ "note": "not a file" }));
    assert_eq!(serialize(json!({ "type": "file" }), plain.clone()), Some(plain));
}
