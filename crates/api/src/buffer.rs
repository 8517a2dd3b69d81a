use crate::error::{AnalysisError, AnalysisResult};
use crate::models::util::serde_arc_str;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Immutable content of one source file plus its identity.
///
/// A buffer is never edited in place: re-analysis after an edit starts from a new
/// buffer. Cloning is cheap, the text is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceBuffer {
    path: PathBuf,
    #[serde(with = "serde_arc_str")]
    text: Arc<str>,
}

impl SourceBuffer {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Builds a buffer from raw bytes, rejecting anything that is not UTF-8.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> AnalysisResult<Self> {
        let path = path.into();
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Self::new(path, text)),
            Err(e) => Err(AnalysisError::InvalidEncoding {
                path,
                reason: e.utf8_error().to_string(),
            }),
        }
    }

    /// Convenience for in-memory snippets that have no file behind them.
    pub fn anonymous(text: impl Into<Arc<str>>) -> Self {
        Self::new("<memory>", text)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Slices the buffer, returning `None` for ranges that are out of bounds or
    /// split a UTF-8 sequence.
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        self.text.get(start..end)
    }
}
