use std::path::PathBuf;

/// Failures that make an analysis call meaningless.
///
/// Recoverable conditions (scanner ambiguity, reconciliation gaps, unknown idiom
/// kinds, cursors outside the buffer) are carried as data on the results instead.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Clojure language unavailable: {0}")]
    LanguageUnavailable(String),
    #[error("Invalid encoding in {path}: {reason}")]
    InvalidEncoding { path: PathBuf, reason: String },
    #[error("Invalid name pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Whether the error aborts every buffer of a batch, not just the current one.
    pub fn is_fatal_for_batch(&self) -> bool {
        matches!(self, AnalysisError::LanguageUnavailable(_))
    }
}

pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;
