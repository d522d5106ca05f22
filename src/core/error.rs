use thiserror::Error;

/// Errors that can occur while building, parsing, rendering or sealing a
/// comprobante.
///
/// Structural validation defects are not errors: they are returned as a
/// [`ValidationReport`](super::ValidationReport). `Validation` only appears
/// when a builder is asked to refuse invalid documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CfdiError {
    /// One or more validation rules failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// Loosely shaped input could not be normalized into a comprobante.
    #[error("invalid invoice input: {0}")]
    Input(String),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Retrieved markup could not be turned into a record.
    #[error("error processing the invoice XML: {0}")]
    Parse(String),

    /// The signer failed or returned unusable certificate data.
    #[error("error sealing the comprobante: {0}")]
    Seal(String),
}

/// A single validation defect with the path of the offending node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the invalid node or attribute (e.g. "Conceptos[0].Impuestos").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Defect for a required attribute that is missing or blank.
    pub fn required(node: &str, attribute: &str) -> Self {
        Self::new(
            format!("{node}.{attribute}"),
            format!("the \"{attribute}\" attribute is required"),
        )
    }
}
