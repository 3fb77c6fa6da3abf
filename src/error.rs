//! Error definitions for parsing, serializing and validating schema values.

use thiserror::Error;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
///
/// Every variant maps to an HTTP-style status through [`ValueError::status`],
/// so callers can surface the message to API clients unchanged.
pub enum ValueError {
    /// Malformed, out-of-range or otherwise unacceptable input value.
    #[error("{0}")]
    ClientData(String),
    /// Uploaded file exceeds the schema's `maxLength`.
    #[error("{0}")]
    PayloadTooLarge(String),
    /// The schema itself carries an unusable constraint.
    #[error("{0}")]
    ApiDefinition(String),
    /// Structural validation failure reported by a [`crate::SchemaValidator`].
    #[error("{}JSON Schema validation error. {message} (data path: \"{data_path}\", schema path: \"{schema_path}\")", property_prefix(.property))]
    SchemaValidation {
        /// Property path being parsed, when known.
        property: Option<String>,
        /// Validator message.
        message: String,
        /// JSON-pointer style location inside the value.
        data_path: String,
        /// Location of the violated keyword inside the schema.
        schema_path: String,
    },
    /// Failure parsing one element of an array value.
    #[error("Unable to parse array item at index {index} ({path}). {source}")]
    ArrayItem {
        /// Zero-based element index.
        index: usize,
        /// Property path of the element.
        path: String,
        /// Error raised for the element.
        #[source]
        source: Box<ValueError>,
    },
    /// Raw JSON text could not be decoded.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Filesystem I/O error from the CLI.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ValueError {
    /// HTTP status code associated with this error.
    pub fn status(&self) -> u16 {
        match self {
            ValueError::ClientData(_)
            | ValueError::SchemaValidation { .. }
            | ValueError::ArrayItem { .. }
            | ValueError::Json(_) => 400,
            ValueError::PayloadTooLarge(_) => 413,
            ValueError::ApiDefinition(_) | ValueError::Io(_) => 500,
        }
    }
}

fn property_prefix(property: &Option<String>) -> String {
    match property {
        Some(path) if !path.is_empty() => format!("Error in property \"{path}\". "),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::ValueError;

    #[test]
    fn array_item_error_keeps_cause_and_status() {
        let err = ValueError::ArrayItem {
            index: 2,
            path: "tags[2]".to_string(),
            source: Box::new(ValueError::ClientData("\"x\" is not a valid integer".to_string())),
        };
        assert_eq!(err.status(), 400);
        let text = err.to_string();
        assert!(text.starts_with("Unable to parse array item at index 2"));
        assert!(text.contains("\"x\" is not a valid integer"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn schema_validation_message_names_property_and_paths() {
        let err = ValueError::SchemaValidation {
            property: Some("pet.age".to_string()),
            message: "type mismatch: expected integer, found string".to_string(),
            data_path: "/age".to_string(),
            schema_path: "#/properties/age/type".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("Error in property \"pet.age\". "));
        assert!(text.contains("schema path: \"#/properties/age/type\""));
        assert_eq!(err.status(), 400);
    }
}
