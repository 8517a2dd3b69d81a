use cljscope_api::{AnalysisResult, CacheKey, CacheStats, ContentCache};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use xxhash_rust::xxh3::xxh3_64;

/// Key for one version of a buffer's text.
pub fn content_key(path: &Path, text: &str) -> CacheKey {
    CacheKey::new(path, xxh3_64(text.as_bytes()))
}

/// In-process `ContentCache` backed by a `DashMap` of `OnceCell`s.
///
/// Concurrent lookups of one key share a cell, so the value is computed once.
/// Inserting a new content hash for a path evicts older versions of that path.
pub struct MemoryCache<V> {
    entries: DashMap<CacheKey, Arc<OnceCell<Arc<V>>>>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> MemoryCache<V> {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cell_for(&self, key: &CacheKey) -> Arc<OnceCell<Arc<V>>> {
        if let Some(cell) = self.entries.get(key) {
            return cell.clone();
        }

        self.entries
            .retain(|k, _| k.path != key.path || k.content_hash == key.content_hash);
        if self.entries.len() >= self.max_entries {
            // No recency tracking: drop an arbitrary entry to stay bounded.
            let victim = self.entries.iter().next().map(|e| e.key().clone());
            if let Some(victim) = victim {
                self.entries.remove(&victim);
            }
        }

        self.entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }
}

impl<V: Send + Sync> ContentCache<V> for MemoryCache<V> {
    fn get_or_compute(
        &self,
        key: &CacheKey,
        compute: &mut dyn FnMut() -> AnalysisResult<Arc<V>>,
    ) -> AnalysisResult<Arc<V>> {
        let cell = self.cell_for(key);
        if let Some(value) = cell.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = cell.get_or_try_init(|| compute())?;
        Ok(value.clone())
    }

    fn invalidate(&self, path: &Path) {
        self.entries.retain(|k, _| k.path != path);
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cljscope_api::AnalysisError;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_computes_once_per_key() {
        let cache = MemoryCache::<String>::new(8);
        let key = content_key(Path::new("a.clj"), "(ns a)");
        let calls = AtomicUsize::new(0);
        let mut compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new("value".to_string()))
        };
        let first = cache.get_or_compute(&key, &mut compute).unwrap();
        let second = cache.get_or_compute(&key, &mut compute).unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_new_content_evicts_stale_version() {
        let cache = MemoryCache::<usize>::new(8);
        let path = PathBuf::from("a.clj");
        let old = content_key(&path, "(ns a)");
        let new = content_key(&path, "(ns a.b)");
        cache.get_or_compute(&old, &mut || Ok(Arc::new(1))).unwrap();
        cache.get_or_compute(&new, &mut || Ok(Arc::new(2))).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(*cache.get_or_compute(&new, &mut || Ok(Arc::new(3))).unwrap(), 2);
    }

    #[test]
    fn test_failed_computation_is_retried() {
        let cache = MemoryCache::<usize>::new(8);
        let key = content_key(Path::new("a.clj"), "");
        let err = cache
            .get_or_compute(&key, &mut || Err(AnalysisError::Internal("boom".into())))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Internal(_)));
        let value = cache.get_or_compute(&key, &mut || Ok(Arc::new(7))).unwrap();
        assert_eq!(*value, 7);
    }

    #[test]
    fn test_bounded_by_max_entries() {
        let cache = MemoryCache::<usize>::new(2);
        for i in 0..5 {
            let key = content_key(Path::new(&format!("{}.clj", i)), "x");
            cache.get_or_compute(&key, &mut || Ok(Arc::new(i))).unwrap();
        }
        assert!(cache.len() <= 2);
        cache.invalidate(Path::new("4.clj"));
        cache.clear();
        assert!(cache.is_empty());
    }
}
