//! OpenAPI parameter descriptors.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::defaults::default_schema;
use crate::error::ValueError;
use crate::schema::SchemaNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Where a parameter is carried in the request.
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Body,
    FormData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Serialization style of a parameter value.
pub enum ParameterStyle {
    Form,
    Simple,
    Matrix,
    Label,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// OpenAPI 2.0 / 3.0 parameter object.
///
/// Keys without a dedicated field (OpenAPI 2.0 inline `type`, `format`,
/// `items`, `default`, ...) are kept in `extra`.
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<JsonMap<String, JsonValue>>,
    #[serde(flatten)]
    pub extra: JsonMap<String, JsonValue>,
}

impl ParameterDescriptor {
    /// Parses a parameter object.
    pub fn from_json(value: &JsonValue) -> Result<ParameterDescriptor, ValueError> {
        serde_json::from_value(value.clone()).map_err(|e| {
            ValueError::ApiDefinition(format!("invalid parameter definition: {e}"))
        })
    }

    /// Governing schema, with defaults applied.
    ///
    /// Resolution order: `schema`, then the schema of the first `content`
    /// media type, then the inline OpenAPI 2.0 keys of the parameter itself.
    pub fn schema_node(&self) -> Result<SchemaNode, ValueError> {
        let media_schema = self
            .content
            .as_ref()
            .and_then(|content| content.values().next())
            .and_then(|media| media.get("schema"));

        let node = match self.schema.as_ref().or(media_schema) {
            Some(schema) => SchemaNode::from_json(schema)?,
            None => SchemaNode::from_json(&JsonValue::Object(self.extra.clone()))?,
        };
        Ok(default_schema(&node))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ParameterDescriptor, ParameterLocation, ParameterStyle};
    use crate::schema::SchemaType;

    #[test]
    fn parses_openapi2_inline_parameter() {
        let param = ParameterDescriptor::from_json(&json!({
            "name": "tags",
            "in": "query",
            "type": "array",
            "items": { "type": "string" },
            "collectionFormat": "pipes"
        }))
        .unwrap();
        assert_eq!(param.location, ParameterLocation::Query);
        let schema = param.schema_node().unwrap();
        assert_eq!(schema.schema_type, Some(SchemaType::Array));
        assert_eq!(schema.items.unwrap().schema_type, Some(SchemaType::String));
    }

    #[test]
    fn prefers_content_schema_when_no_schema_given() {
        let param = ParameterDescriptor::from_json(&json!({
            "name": "filter",
            "in": "query",
            "style": "deepObject",
            "content": { "application/json": { "schema": { "type": "integer" } } }
        }))
        .unwrap();
        assert_eq!(param.style, Some(ParameterStyle::DeepObject));
        assert_eq!(param.schema_node().unwrap().schema_type, Some(SchemaType::Integer));
    }

    #[test]
    fn body_parameter_without_type_defaults_to_object() {
        let param = ParameterDescriptor::from_json(&json!({
            "name": "pet", "in": "body", "schema": {}
        }))
        .unwrap();
        assert_eq!(param.schema_node().unwrap().schema_type, Some(SchemaType::Object));
    }

    #[test]
    fn unknown_location_is_a_definition_error() {
        let err = ParameterDescriptor::from_json(&json!({ "name": "x", "in": "matrix" }))
            .unwrap_err();
        assert_eq!(err.status(), 500);
    }
}
