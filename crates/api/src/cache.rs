use crate::error::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identity of one buffer version: its path plus a hash of its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub path: PathBuf,
    pub content_hash: u64,
}

impl CacheKey {
    pub fn new(path: impl Into<PathBuf>, content_hash: u64) -> Self {
        Self {
            path: path.into(),
            content_hash,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Memoizes per-buffer analysis results.
///
/// Implementations must run `compute` at most once concurrently per key. A failed
/// computation is not cached; the next lookup retries it.
pub trait ContentCache<V>: Send + Sync {
    /// Returns the cached value for `key`, computing and storing it on a miss.
    fn get_or_compute(
        &self,
        key: &CacheKey,
        compute: &mut dyn FnMut() -> AnalysisResult<Arc<V>>,
    ) -> AnalysisResult<Arc<V>>;

    /// Drops every version cached for `path`.
    fn invalidate(&self, path: &Path);

    fn clear(&self);

    fn stats(&self) -> CacheStats;
}
