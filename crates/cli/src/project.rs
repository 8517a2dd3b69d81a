use crate::print_json;
use cljscope_api::{Analyzer, BatchAnalysis};
use cljscope_core::project::source::list_sources;
use std::path::Path;
use tracing::info;

pub fn batch(
    analyzer: &dyn Analyzer,
    root: &Path,
    pattern: Option<&str>,
    files: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = list_sources(root, files)?;
    info!("Found {} Clojure files under {}", paths.len(), root.display());
    let report = analyzer.extract_functions_batch(&paths, pattern)?;
    print_json(&report)
}

pub fn deps(analyzer: &dyn Analyzer, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let paths = list_sources(root, None)?;
    info!("Found {} Clojure files under {}", paths.len(), root.display());
    print_json(&analyzer.namespace_graph(&paths)?)
}

pub fn dependency_tree(
    analyzer: &dyn Analyzer,
    root: &Path,
    namespace: &str,
    depth: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = list_sources(root, None)?;
    info!("Found {} Clojure files under {}", paths.len(), root.display());
    print_json(&analyzer.namespace_dependency_tree(&paths, namespace, depth)?)
}
