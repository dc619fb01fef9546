//! Error types for docqa.
//!
//! A single error enum covers configuration, ingestion, index lifecycle,
//! provider and prompt failures. The CLI converts every variant into a
//! human-readable message through [`AppError::user_message`].

use thiserror::Error;

/// Unified error type for docqa.
///
/// All fallible functions return `Result<T, AppError>`; nothing in the
/// library panics on bad input.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed, unreadable or unsupported source document
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// No index has been persisted at the storage location yet
    #[error("No index found at {0}")]
    IndexNotFound(String),

    /// Embedding or language-model collaborator failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// Query vector does not match the stored index dimensionality
    #[error("Dimension mismatch: index has {expected} dimensions, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Persisted index is corrupt or written by an incompatible version
    #[error("Index error: {0}")]
    Index(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Message suitable for showing to an end user.
    ///
    /// Provider failures are reduced to a generic retry-later message so
    /// that upstream response bodies never reach the terminal.
    pub fn user_message(&self) -> String {
        match self {
            AppError::IndexNotFound(_) => {
                "No document has been uploaded yet. Upload a PDF first with `docqa ingest <file>`."
                    .to_string()
            }
            AppError::Provider(_) => {
                "The embedding or language model service is unavailable right now. Please try again later."
                    .to_string()
            }
            AppError::DimensionMismatch { expected, actual } => format!(
                "The embedding model changed since the document was indexed ({} vs {} dimensions). Re-upload the document.",
                expected, actual
            ),
            AppError::Ingestion(msg) => format!("Upload failed: {}", msg),
            AppError::Index(_) => {
                "The stored index is unreadable. Re-upload the document to rebuild it.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether this error is an expected, recoverable condition rather than a fault.
    pub fn is_expected(&self) -> bool {
        matches!(self, AppError::IndexNotFound(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for AppError {
    fn from(err: bincode::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_not_found_is_expected() {
        let err = AppError::IndexNotFound(".docqa/index".to_string());
        assert!(err.is_expected());
        assert!(err.user_message().contains("Upload a PDF first"));
    }

    #[test]
    fn test_provider_message_hides_detail() {
        let err = AppError::Provider("401 Unauthorized: sk-secret".to_string());
        let msg = err.user_message();
        assert!(!msg.contains("sk-secret"));
        assert!(msg.contains("try again later"));
        assert!(!err.is_expected());
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = AppError::DimensionMismatch {
            expected: 768,
            actual: 384,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: index has 768 dimensions, query has 384"
        );
    }
}
