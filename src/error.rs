//! Error handling for the submission checker

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    /// Deployment defect: checklist or config missing, unreadable or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An injected capability (embedding model, sentence tokenizer) failed.
    #[error("{capability} capability unavailable: {reason}")]
    CapabilityUnavailable {
        capability: &'static str,
        reason: String,
    },

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

impl CheckerError {
    pub fn embedding(reason: impl Into<String>) -> Self {
        CheckerError::CapabilityUnavailable {
            capability: "embedding",
            reason: reason.into(),
        }
    }

    pub fn tokenizer(reason: impl Into<String>) -> Self {
        CheckerError::CapabilityUnavailable {
            capability: "sentence tokenizer",
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CheckerError>;

/// Model2Vec reports failures through anyhow; those only surface from the embedding backend.
impl From<anyhow::Error> for CheckerError {
    fn from(err: anyhow::Error) -> Self {
        CheckerError::embedding(format!("{:#}", err))
    }
}
