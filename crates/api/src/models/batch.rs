use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Per-file outcome of a batch call. Exactly one of `value` and `error` is set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct BatchEntry<T> {
    pub path: PathBuf,
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T> BatchEntry<T> {
    pub fn ok(path: PathBuf, value: T) -> Self {
        Self {
            path,
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(path: PathBuf, error: impl ToString) -> Self {
        Self {
            path,
            value: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct BatchReport<T> {
    /// Entries in the order the paths were given.
    pub entries: Vec<BatchEntry<T>>,
    pub succeeded: usize,
    pub failed: usize,
}

impl<T> BatchReport<T> {
    pub fn from_entries(entries: Vec<BatchEntry<T>>) -> Self {
        let failed = entries.iter().filter(|e| !e.is_ok()).count();
        Self {
            succeeded: entries.len() - failed,
            failed,
            entries,
        }
    }
}
