use serde_json::json;
use thiserror::Error;

use crate::models::Field;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("This is not an ID card")]
    NotAnIdentityDocument,
    #[error("Failed to extract complete ID card details, missing: {}", join_fields(.0))]
    IncompleteExtraction(Vec<Field>),
    #[error("OCR error: {0}")]
    OcrFailed(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl ExtractionError {
    /// Stable identifier reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            ExtractionError::InvalidUpload(_) => "invalid_upload",
            ExtractionError::UnsupportedFormat(_) => "unsupported_format",
            ExtractionError::NotAnIdentityDocument => "not_an_identity_document",
            ExtractionError::IncompleteExtraction(_) => "incomplete_extraction",
            ExtractionError::OcrFailed(_) => "ocr_failed",
            ExtractionError::Config(_) => "config_error",
            ExtractionError::Io(_) => "io_error",
        }
    }

    pub fn missing_fields(&self) -> &[Field] {
        match self {
            ExtractionError::IncompleteExtraction(fields) => fields,
            _ => &[],
        }
    }

    pub fn to_json(&self) -> String {
        let mut body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        if let ExtractionError::IncompleteExtraction(fields) = self {
            body["missing"] = json!(fields);
        }
        body.to_string()
    }
}

impl From<std::io::Error> for ExtractionError {
    fn from(err: std::io::Error) -> Self {
        ExtractionError::Io(err.to_string())
    }
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| field.name())
        .collect::<Vec<_>>()
        .join(", ")
}
