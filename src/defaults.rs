//! Defaulting of parameter styles and schema types.

use crate::parameter::{ParameterDescriptor, ParameterLocation, ParameterStyle};
use crate::schema::{SchemaNode, SchemaType};

/// Returns a copy of `param` with `style` and `explode` resolved.
///
/// `style` defaults to `form` for query and cookie parameters and `simple`
/// otherwise; `explode` defaults to `true` only for the `form` style.
pub fn default_parameter(param: &ParameterDescriptor) -> ParameterDescriptor {
    let mut out = param.clone();
    let style = out.style.unwrap_or(match out.location {
        ParameterLocation::Query | ParameterLocation::Cookie => ParameterStyle::Form,
        _ => ParameterStyle::Simple,
    });
    out.style = Some(style);
    out.explode = Some(out.explode.unwrap_or(style == ParameterStyle::Form));
    out
}

/// Returns a copy of `schema` with a missing `type` set to `object` and
/// array `items` defaulted recursively. An array without `items` gets an
/// object item schema.
pub fn default_schema(schema: &SchemaNode) -> SchemaNode {
    let mut out = schema.clone();
    if out.schema_type.is_none() {
        out.schema_type = Some(SchemaType::Object);
    }
    if out.schema_type == Some(SchemaType::Array) {
        let items = out.items.take().unwrap_or_default();
        out.items = Some(Box::new(default_schema(&items)));
    }
    out
}
