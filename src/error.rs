//! Structured error types for the report engine.
//!
//! Most failure sources inside a generation run are absorbed on purpose
//! (unknown variables, broken photos, missing colors). What remains here are
//! input parsing, programmer errors in the template and output failures.

use thiserror::Error;

/// The unified error type returned by all public API functions.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON input failed to parse as an inspection bundle or template.
    #[error("Failed to parse input: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The template references a section with no registered renderer.
    #[error("Unknown section id '{0}' has no registered renderer")]
    UnknownSection(String),

    /// An image could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the inspection/template schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}
