//! Schema node parsing.
//!
//! Supported keyword subset (OpenAPI 2.0):
//! - Common: `type`, `format`, `enum`, `default`, `example`
//! - Numeric and date: `minimum`, `maximum`, `exclusiveMinimum`, `exclusiveMaximum`
//! - String and file: `minLength`, `maxLength`
//! - Object: `properties`, `required`
//! - Array: `items`, `minItems`, `maxItems`, `uniqueItems`, `collectionFormat`

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::ValueError;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The seven data kinds a schema may declare.
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
    File,
}

impl SchemaType {
    pub fn from_name(name: &str) -> Option<SchemaType> {
        match name {
            "string" => Some(SchemaType::String),
            "number" => Some(SchemaType::Number),
            "integer" => Some(SchemaType::Integer),
            "boolean" => Some(SchemaType::Boolean),
            "array" => Some(SchemaType::Array),
            "object" => Some(SchemaType::Object),
            "file" => Some(SchemaType::File),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::String => "string",
            SchemaType::Number => "number",
            SchemaType::Integer => "integer",
            SchemaType::Boolean => "boolean",
            SchemaType::Array => "array",
            SchemaType::Object => "object",
            SchemaType::File => "file",
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Encoding used to pack an array into a single string.
pub enum CollectionFormat {
    #[default]
    Csv,
    Ssv,
    Tsv,
    Pipes,
    Multi,
}

impl CollectionFormat {
    pub fn from_name(name: &str) -> Option<CollectionFormat> {
        match name {
            "csv" => Some(CollectionFormat::Csv),
            "ssv" => Some(CollectionFormat::Ssv),
            "tsv" => Some(CollectionFormat::Tsv),
            "pipes" => Some(CollectionFormat::Pipes),
            "multi" => Some(CollectionFormat::Multi),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CollectionFormat::Csv => "csv",
            CollectionFormat::Ssv => "ssv",
            CollectionFormat::Tsv => "tsv",
            CollectionFormat::Pipes => "pipes",
            CollectionFormat::Multi => "multi",
        }
    }

    /// Element separator, `None` for `multi` (values arrive already repeated).
    pub fn separator(self) -> Option<char> {
        match self {
            CollectionFormat::Csv => Some(','),
            CollectionFormat::Ssv => Some(' '),
            CollectionFormat::Tsv => Some('\t'),
            CollectionFormat::Pipes => Some('|'),
            CollectionFormat::Multi => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// One node of a schema tree.
///
/// Bounds that may legitimately hold non-numeric values (date strings for
/// `minimum`/`maximum`) or that must report a broken definition at use time
/// (`minLength`/`maxLength` on files) are kept as raw JSON.
pub struct SchemaNode {
    /// Declared type. `None` is treated as `object`.
    pub schema_type: Option<SchemaType>,
    pub format: Option<String>,
    pub properties: IndexMap<String, SchemaNode>,
    pub items: Option<Box<SchemaNode>>,
    pub required: Vec<String>,
    pub minimum: Option<JsonValue>,
    pub maximum: Option<JsonValue>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub min_length: Option<JsonValue>,
    pub max_length: Option<JsonValue>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,
    pub collection_format: CollectionFormat,
    pub enum_values: Option<Vec<Value>>,
    pub default: Option<Value>,
    pub example: Option<Value>,
}

impl SchemaNode {
    /// Parses a schema from its JSON form.
    pub fn from_json(value: &JsonValue) -> Result<SchemaNode, ValueError> {
        parse_node(value, "#")
    }

    /// Shorthand for a bare `{ "type": ... }` schema.
    pub fn of_type(schema_type: SchemaType) -> SchemaNode {
        SchemaNode {
            schema_type: Some(schema_type),
            ..SchemaNode::default()
        }
    }

    /// Declared type, or `object` when none is declared.
    pub fn effective_type(&self) -> SchemaType {
        self.schema_type.unwrap_or(SchemaType::Object)
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// `true` for `format: date` and `format: date-time`.
    pub fn is_date_format(&self) -> bool {
        matches!(self.format(), Some("date") | Some("date-time"))
    }

    /// Copy of this node with a different declared type.
    pub fn with_type(&self, schema_type: SchemaType) -> SchemaNode {
        SchemaNode {
            schema_type: Some(schema_type),
            ..self.clone()
        }
    }

    /// Renders the node back to JSON.
    pub fn to_json(&self) -> JsonValue {
        let mut out = JsonMap::new();
        if let Some(t) = self.schema_type {
            out.insert("type".to_string(), JsonValue::String(t.as_str().to_string()));
        }
        if let Some(format) = &self.format {
            out.insert("format".to_string(), JsonValue::String(format.clone()));
        }
        if !self.properties.is_empty() {
            let mut props = JsonMap::new();
            for (name, child) in &self.properties {
                props.insert(name.clone(), child.to_json());
            }
            out.insert("properties".to_string(), JsonValue::Object(props));
        }
        if let Some(items) = &self.items {
            out.insert("items".to_string(), items.to_json());
        }
        if !self.required.is_empty() {
            out.insert("required".to_string(), serde_json::json!(self.required));
        }
        let raw_bounds = [
            ("minimum", &self.minimum),
            ("maximum", &self.maximum),
            ("minLength", &self.min_length),
            ("maxLength", &self.max_length),
        ];
        for (key, bound) in raw_bounds {
            if let Some(bound) = bound {
                out.insert(key.to_string(), bound.clone());
            }
        }
        if self.exclusive_minimum {
            out.insert("exclusiveMinimum".to_string(), JsonValue::Bool(true));
        }
        if self.exclusive_maximum {
            out.insert("exclusiveMaximum".to_string(), JsonValue::Bool(true));
        }
        if let Some(n) = self.min_items {
            out.insert("minItems".to_string(), n.into());
        }
        if let Some(n) = self.max_items {
            out.insert("maxItems".to_string(), n.into());
        }
        if self.unique_items {
            out.insert("uniqueItems".to_string(), JsonValue::Bool(true));
        }
        if self.collection_format != CollectionFormat::Csv {
            out.insert(
                "collectionFormat".to_string(),
                JsonValue::String(self.collection_format.as_str().to_string()),
            );
        }
        if let Some(options) = &self.enum_values {
            out.insert(
                "enum".to_string(),
                JsonValue::Array(options.iter().map(Value::to_json).collect()),
            );
        }
        if let Some(default) = &self.default {
            out.insert("default".to_string(), default.to_json());
        }
        if let Some(example) = &self.example {
            out.insert("example".to_string(), example.to_json());
        }
        JsonValue::Object(out)
    }
}

impl TryFrom<&JsonValue> for SchemaNode {
    type Error = ValueError;

    fn try_from(value: &JsonValue) -> Result<Self, Self::Error> {
        SchemaNode::from_json(value)
    }
}

/// Reads a bound as a number, accepting numeric strings.
pub fn numeric_bound(raw: &JsonValue) -> Option<f64> {
    match raw {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn parse_node(value: &JsonValue, path: &str) -> Result<SchemaNode, ValueError> {
    let map = value.as_object().ok_or_else(|| {
        ValueError::ApiDefinition(format!("schema at {path} must be an object, found {value}"))
    })?;

    let schema_type = match map.get("type") {
        None => None,
        Some(raw) => {
            let name = raw.as_str().ok_or_else(|| {
                ValueError::ApiDefinition(format!("schema 'type' at {path} must be a string"))
            })?;
            Some(SchemaType::from_name(name).ok_or_else(|| {
                ValueError::ApiDefinition(format!(
                    "unsupported schema type '{name}' at {path}/type"
                ))
            })?)
        }
    };

    let format = match map.get("format") {
        None => None,
        Some(raw) => Some(
            raw.as_str()
                .ok_or_else(|| {
                    ValueError::ApiDefinition(format!("schema 'format' at {path} must be a string"))
                })?
                .to_string(),
        ),
    };

    let mut properties = IndexMap::new();
    if let Some(raw) = map.get("properties") {
        let prop_map = raw.as_object().ok_or_else(|| {
            ValueError::ApiDefinition(format!("properties at {path} must be an object"))
        })?;
        for (name, child) in prop_map {
            let child_path = format!("{path}/properties/{name}");
            properties.insert(name.clone(), parse_node(child, &child_path)?);
        }
    }

    let items = match map.get("items") {
        None => None,
        Some(raw) => Some(Box::new(parse_node(raw, &format!("{path}/items"))?)),
    };

    let required = match map.get("required") {
        None | Some(JsonValue::Bool(_)) => Vec::new(),
        Some(JsonValue::Array(entries)) => {
            let mut out = Vec::with_capacity(entries.len());
            for entry in entries {
                let key = entry.as_str().ok_or_else(|| {
                    ValueError::ApiDefinition(format!("required entries at {path} must be strings"))
                })?;
                out.push(key.to_string());
            }
            out
        }
        Some(_) => {
            return Err(ValueError::ApiDefinition(format!(
                "required at {path} must be an array"
            )))
        }
    };

    let collection_format = match map.get("collectionFormat") {
        None => CollectionFormat::default(),
        Some(raw) => raw
            .as_str()
            .and_then(CollectionFormat::from_name)
            .ok_or_else(|| {
                ValueError::ApiDefinition(format!(
                    "unsupported collectionFormat {raw} at {path}/collectionFormat"
                ))
            })?,
    };

    let enum_values = match map.get("enum") {
        None => None,
        Some(JsonValue::Array(options)) => Some(options.iter().map(Value::from).collect()),
        Some(_) => {
            return Err(ValueError::ApiDefinition(format!(
                "schema 'enum' at {path} must be an array"
            )))
        }
    };

    Ok(SchemaNode {
        schema_type,
        format,
        properties,
        items,
        required,
        minimum: map.get("minimum").cloned(),
        maximum: map.get("maximum").cloned(),
        exclusive_minimum: flag(map, "exclusiveMinimum", path)?,
        exclusive_maximum: flag(map, "exclusiveMaximum", path)?,
        min_length: map.get("minLength").cloned(),
        max_length: map.get("maxLength").cloned(),
        min_items: count(map, "minItems", path)?,
        max_items: count(map, "maxItems", path)?,
        unique_items: flag(map, "uniqueItems", path)?,
        collection_format,
        enum_values,
        default: map.get("default").map(Value::from),
        example: map.get("example").map(Value::from),
    })
}

fn flag(map: &JsonMap<String, JsonValue>, key: &str, path: &str) -> Result<bool, ValueError> {
    match map.get(key) {
        None => Ok(false),
        Some(JsonValue::Bool(b)) => Ok(*b),
        Some(_) => Err(ValueError::ApiDefinition(format!(
            "{key} at {path} must be a boolean"
        ))),
    }
}

fn count(
    map: &JsonMap<String, JsonValue>,
    key: &str,
    path: &str,
) -> Result<Option<u64>, ValueError> {
    match map.get(key) {
        None => Ok(None),
        Some(raw) => raw.as_u64().map(Some).ok_or_else(|| {
            ValueError::ApiDefinition(format!(
                "{key} at {path} must be a non-negative integer, found {raw}"
            ))
        }),
    }
}
