use crate::buffer::SourceBuffer;
use crate::error::AnalysisResult;
use crate::models::{
    BatchReport, CallGraph, ComplexityReport, DependencyTree, FormRecord, FunctionRecord,
    IdiomReport, IdiomSummary, MacroRecord, NamespaceGraph, NamespaceRecord, TypeRecord,
};
use std::path::PathBuf;

/// Structure-aware facts about a single Clojure buffer.
///
/// Every call is synchronous and pure: results are fresh values owned by the
/// caller and repeated calls on the same buffer return identical results.
pub trait ClojureAnalysis: Send + Sync {
    /// Reconciled form records in start-offset order.
    fn forms(&self, buffer: &SourceBuffer) -> AnalysisResult<Vec<FormRecord>>;

    /// Function definitions, optionally filtered by a glob over the literal name.
    ///
    /// `*` matches any substring and `?` one character; matching is anchored and
    /// case-sensitive. An invalid pattern is an `InvalidPattern` error, no match
    /// is an empty list.
    fn extract_functions(
        &self,
        buffer: &SourceBuffer,
        name_pattern: Option<&str>,
    ) -> AnalysisResult<Vec<FunctionRecord>>;

    /// The first namespace declaration, if any.
    fn extract_namespace(&self, buffer: &SourceBuffer) -> AnalysisResult<Option<NamespaceRecord>>;

    fn extract_namespaces(&self, buffer: &SourceBuffer) -> AnalysisResult<Vec<NamespaceRecord>>;

    fn extract_macros(
        &self,
        buffer: &SourceBuffer,
        name_pattern: Option<&str>,
    ) -> AnalysisResult<Vec<MacroRecord>>;

    /// Protocols, types, records and interfaces.
    fn extract_types(
        &self,
        buffer: &SourceBuffer,
        name_pattern: Option<&str>,
    ) -> AnalysisResult<Vec<TypeRecord>>;

    /// Calls made by the buffer's functions. With a `target`, only that function
    /// and the edges touching it are kept; an unknown target is `NotFound`.
    fn trace_calls(&self, buffer: &SourceBuffer, target: Option<&str>) -> AnalysisResult<CallGraph>;

    /// Detects idioms of the requested kinds (all kinds when `kinds` is empty).
    /// Unknown kind names end up in `IdiomReport::unsupported`.
    fn classify_idioms(&self, buffer: &SourceBuffer, kinds: &[String]) -> AnalysisResult<IdiomReport>;

    /// Totals and most frequent operators over every idiom kind.
    fn summarize_idioms(&self, buffer: &SourceBuffer) -> AnalysisResult<IdiomSummary> {
        Ok(self.classify_idioms(buffer, &[])?.summary())
    }

    /// Concurrency, state, destructuring and call graph complexity of the buffer.
    fn analyze_complexity(&self, buffer: &SourceBuffer) -> AnalysisResult<ComplexityReport>;
}

/// Multi-file entry points. A file that cannot be read is reported in its entry
/// and the rest of the batch continues.
pub trait BatchAnalysis: Send + Sync {
    fn extract_functions_batch(
        &self,
        paths: &[PathBuf],
        name_pattern: Option<&str>,
    ) -> AnalysisResult<BatchReport<Vec<FunctionRecord>>>;

    /// Dependency graph of every namespace declared in `paths`.
    fn namespace_graph(&self, paths: &[PathBuf]) -> AnalysisResult<NamespaceGraph>;

    /// Namespaces reachable from `root` within `max_depth` edges. A root no file
    /// declares or requires is `NotFound`.
    fn namespace_dependency_tree(
        &self,
        paths: &[PathBuf],
        root: &str,
        max_depth: usize,
    ) -> AnalysisResult<DependencyTree>;
}
