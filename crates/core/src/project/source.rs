use super::is_relevant_path;
use super::pattern::NamePattern;
use crate::error::{AnalysisError, Result};
use cljscope_api::SourceBuffer;
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// Reads a file into a buffer. Non-UTF-8 content is `InvalidEncoding`.
pub fn read_buffer(path: &Path) -> Result<SourceBuffer> {
    let bytes = fs::read(path)?;
    SourceBuffer::from_bytes(path, bytes)
}

/// Clojure sources under `root`, honoring ignore files, sorted by path.
/// With a `pattern`, only files whose name matches the glob are kept.
pub fn list_sources(root: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(AnalysisError::NotFound(root.display().to_string()));
    }
    let pattern = NamePattern::optional(pattern)?;

    let mut paths: Vec<PathBuf> = WalkBuilder::new(root)
        .build()
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !path.is_file() || !is_relevant_path(path) {
                return None;
            }
            if let Some(p) = &pattern {
                let name = path.file_name()?.to_str()?;
                if !p.matches(name) {
                    return None;
                }
            }
            Some(path.to_path_buf())
        })
        .collect();
    paths.sort();
    tracing::debug!("found {} sources under {}", paths.len(), root.display());
    Ok(paths)
}
