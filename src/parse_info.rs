//! Traversal context for walking a parameter's nested fields.
//!
//! A [`ParseInfo`] is a persistent stack of [`TraversalFrame`]s. Descending
//! into a field with [`ParseInfo::push`] returns a new context whose parent
//! is the current one; [`ParseInfo::pop`] hands the parent back. Contexts
//! share their ancestors, so an unbalanced walk cannot leak into another.

use std::fmt;
use std::sync::Arc;

use crate::defaults::{default_parameter, default_schema};
use crate::engine::JsonSchema;
use crate::error::ValueError;
use crate::parameter::ParameterDescriptor;
use crate::schema::SchemaNode;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
/// One level of nested-field descent.
pub struct TraversalFrame {
    /// Dotted/bracketed property path, e.g. `customers[0].name.first`.
    pub path: String,
    /// Raw value at `path`.
    pub value: Option<Value>,
    /// Defaulted schema governing `value`.
    pub schema: SchemaNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Name of a nested field: an array index or an object property.
pub enum PathSegment {
    Index(usize),
    Name(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "[{index}]"),
            PathSegment::Name(name) => write!(f, ".{name}"),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Name(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Name(name)
    }
}

#[derive(Debug)]
struct Node {
    frame: TraversalFrame,
    parent: Option<Arc<Node>>,
    depth: usize,
}

#[derive(Debug, Clone)]
/// Cursor over a parameter's value.
pub struct ParseInfo {
    parameter: Arc<ParameterDescriptor>,
    head: Arc<Node>,
}

impl ParseInfo {
    /// Starts a traversal at the parameter itself.
    ///
    /// The parameter's `style`/`explode` and schema are defaulted first.
    pub fn new(
        param: &ParameterDescriptor,
        value: Option<Value>,
    ) -> Result<ParseInfo, ValueError> {
        let parameter = default_parameter(param);
        let schema = parameter.schema_node()?;
        let frame = TraversalFrame {
            path: parameter.name.clone(),
            value,
            schema,
        };
        Ok(ParseInfo {
            parameter: Arc::new(parameter),
            head: Arc::new(Node {
                frame,
                parent: None,
                depth: 0,
            }),
        })
    }

    /// The defaulted parameter being traversed.
    pub fn parameter(&self) -> &ParameterDescriptor {
        &self.parameter
    }

    pub fn current(&self) -> &TraversalFrame {
        &self.head.frame
    }

    pub fn path(&self) -> &str {
        &self.head.frame.path
    }

    pub fn value(&self) -> Option<&Value> {
        self.head.frame.value.as_ref()
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.head.frame.schema
    }

    /// Number of saved frames below the current one.
    pub fn depth(&self) -> usize {
        self.head.depth
    }

    /// Current value, or the schema `default` when it is undefined or `""`.
    pub fn value_or_default(&self) -> Option<&Value> {
        match self.value() {
            None => self.schema().default.as_ref(),
            Some(v) if v.is_empty_string() => self.schema().default.as_ref(),
            Some(v) => Some(v),
        }
    }

    /// Descends one level into `name`.
    pub fn push(
        &self,
        name: impl Into<PathSegment>,
        value: Option<Value>,
        schema: &SchemaNode,
    ) -> ParseInfo {
        let segment = name.into();
        let path = format!("{}{segment}", self.path());
        tracing::trace!(%path, depth = self.depth() + 1, "traversal push");
        ParseInfo {
            parameter: Arc::clone(&self.parameter),
            head: Arc::new(Node {
                frame: TraversalFrame {
                    path,
                    value,
                    schema: default_schema(schema),
                },
                parent: Some(Arc::clone(&self.head)),
                depth: self.depth() + 1,
            }),
        }
    }

    /// Ascends to the most recently saved frame; `None` at the root.
    pub fn pop(&self) -> Option<ParseInfo> {
        let parent = self.head.parent.as_ref()?;
        tracing::trace!(path = %parent.frame.path, depth = parent.depth, "traversal pop");
        Some(ParseInfo {
            parameter: Arc::clone(&self.parameter),
            head: Arc::clone(parent),
        })
    }

    /// Saved frames, most recent first, excluding the current one.
    pub fn ancestors(&self) -> impl Iterator<Item = &TraversalFrame> {
        std::iter::successors(self.head.parent.as_deref(), |&node| node.parent.as_deref())
            .map(|node| &node.frame)
    }

    /// Parses the current value against the current schema.
    pub fn parse_current(&self) -> Result<Option<Value>, ValueError> {
        JsonSchema::new(self.schema()).parse(self.value_or_default().cloned(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ParseInfo;
    use crate::parameter::ParameterDescriptor;
    use crate::schema::{SchemaNode, SchemaType};
    use crate::value::Value;

    #[test]
    fn push_builds_bracketed_and_dotted_paths() {
        let param = ParameterDescriptor::from_json(&json!({
            "name": "customers", "in": "body", "schema": { "type": "array", "items": {} }
        }))
        .unwrap();
        let root = ParseInfo::new(&param, None).unwrap();
        let item_schema = root.schema().items.as_deref().unwrap().clone();
        let item = root.push(0usize, None, &item_schema);
        let name = item.push("name", None, &SchemaNode::default());
        let first = name.push(
            "first",
            Some(Value::from("Bob")),
            &SchemaNode::of_type(SchemaType::String),
        );

        assert_eq!(first.path(), "customers[0].name.first");
        assert_eq!(first.depth(), 3);
        assert_eq!(name.schema().schema_type, Some(SchemaType::Object));

        let back = first.pop().unwrap().pop().unwrap();
        assert_eq!(back.path(), "customers[0]");
        assert!(root.pop().is_none());
    }
}
