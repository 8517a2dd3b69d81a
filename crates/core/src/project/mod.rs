pub mod pattern;
pub mod source;

use std::path::Path;

/// Checks if a path is a Clojure source file (`.clj`, `.cljs`, `.cljc`, `.edn`).
pub fn is_relevant_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| matches!(ext, "clj" | "cljs" | "cljc" | "edn"))
        .unwrap_or(false)
}
