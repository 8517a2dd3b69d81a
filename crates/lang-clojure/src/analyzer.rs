use crate::analysis::FileAnalysis;
use crate::classify::{Classifier, Scope};
use crate::extract::Extractor;
use crate::inspect::Inspector;
use crate::metrics;
use crate::parser::{Capability, ClojureParser};
use crate::sexp::{self, Sexp};
use cljscope_api::{
    CacheStats, CallGraph, ClojureAnalysis, ComplexityReport, ContentCache, Cursor,
    DelimiterMatch, Direction, EnclosingFormChain, FormInspection, FormRecord, FunctionRecord,
    IdiomReport, MacroRecord, Movement, NamespaceRecord, NavOutcome, SexpNavigation, SourceBuffer,
    TypeRecord,
};
use cljscope_core::AnalyzerConfig;
use cljscope_core::Result;
use cljscope_core::cache::{MemoryCache, content_key};
use cljscope_core::project::pattern::NamePattern;
use std::sync::Arc;
use tracing::debug;

/// The Clojure analysis engine.
///
/// Holds the grammar handle, the configuration and an optional content cache.
/// Every operation analyzes the buffer (or reuses the cached analysis of the
/// same text) and derives its answer from that snapshot.
#[derive(Clone)]
pub struct ClojureAnalyzer {
    parser: Arc<ClojureParser>,
    config: AnalyzerConfig,
    cache: Option<Arc<dyn ContentCache<FileAnalysis>>>,
}

impl ClojureAnalyzer {
    /// Creates an analyzer with the in-memory cache described by `config.cache`.
    pub fn new(parser: Arc<ClojureParser>, config: AnalyzerConfig) -> Self {
        let cache: Option<Arc<dyn ContentCache<FileAnalysis>>> = if config.cache.enabled {
            Some(Arc::new(MemoryCache::new(config.cache.max_entries)))
        } else {
            None
        };
        Self {
            parser,
            config,
            cache,
        }
    }

    pub fn from_capability(capability: &Capability, config: AnalyzerConfig) -> Result<Self> {
        Ok(Self::new(capability.parser()?, config))
    }

    /// Replaces the cache, e.g. to share one between analyzers.
    pub fn with_cache(mut self, cache: Option<Arc<dyn ContentCache<FileAnalysis>>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn parser(&self) -> &ClojureParser {
        &self.parser
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|c| c.stats())
    }

    /// Full analysis of `buffer`, shared with earlier calls on the same text.
    pub fn analyze(&self, buffer: &SourceBuffer) -> Result<Arc<FileAnalysis>> {
        let build = || {
            FileAnalysis::build(&self.parser, buffer.clone(), &self.config.reconciliation)
                .map(Arc::new)
        };
        match &self.cache {
            Some(cache) => {
                let key = content_key(buffer.path(), buffer.text());
                cache.get_or_compute(&key, &mut || {
                    debug!("analyzing {}", buffer.path().display());
                    build()
                })
            }
            None => build(),
        }
    }

    fn extractor<'a>(&'a self, analysis: &'a FileAnalysis) -> Extractor<'a> {
        Extractor::new(analysis, &self.parser)
    }

    /// Top-level forms for the classifier. A tree with error nodes loses
    /// structure there, so such buffers are re-read lexically.
    fn top_level_forms(&self, analysis: &FileAnalysis) -> Vec<Sexp> {
        let root = analysis.tree.root_node();
        if root.has_error() {
            return sexp::read(analysis.source());
        }
        let mut cursor = root.walk();
        root.named_children(&mut cursor)
            .filter(|n| !sexp::is_trivia(n.kind()))
            .map(|n| sexp::from_node(n, analysis.source()))
            .collect()
    }
}

impl ClojureAnalysis for ClojureAnalyzer {
    fn forms(&self, buffer: &SourceBuffer) -> Result<Vec<FormRecord>> {
        Ok(self.analyze(buffer)?.records.clone())
    }

    fn extract_functions(
        &self,
        buffer: &SourceBuffer,
        name_pattern: Option<&str>,
    ) -> Result<Vec<FunctionRecord>> {
        let pattern = NamePattern::optional(name_pattern)?;
        let analysis = self.analyze(buffer)?;
        Ok(self.extractor(&analysis).functions(pattern.as_ref()))
    }

    fn extract_namespace(&self, buffer: &SourceBuffer) -> Result<Option<NamespaceRecord>> {
        Ok(self.extract_namespaces(buffer)?.into_iter().next())
    }

    fn extract_namespaces(&self, buffer: &SourceBuffer) -> Result<Vec<NamespaceRecord>> {
        let analysis = self.analyze(buffer)?;
        Ok(self.extractor(&analysis).namespaces())
    }

    fn extract_macros(
        &self,
        buffer: &SourceBuffer,
        name_pattern: Option<&str>,
    ) -> Result<Vec<MacroRecord>> {
        let pattern = NamePattern::optional(name_pattern)?;
        let analysis = self.analyze(buffer)?;
        Ok(self.extractor(&analysis).macros(pattern.as_ref()))
    }

    fn extract_types(
        &self,
        buffer: &SourceBuffer,
        name_pattern: Option<&str>,
    ) -> Result<Vec<TypeRecord>> {
        let pattern = NamePattern::optional(name_pattern)?;
        let analysis = self.analyze(buffer)?;
        Ok(self.extractor(&analysis).types(pattern.as_ref()))
    }

    fn trace_calls(&self, buffer: &SourceBuffer, target: Option<&str>) -> Result<CallGraph> {
        let analysis = self.analyze(buffer)?;
        self.extractor(&analysis).call_graph(target)
    }

    fn classify_idioms(&self, buffer: &SourceBuffer, kinds: &[String]) -> Result<IdiomReport> {
        let analysis = self.analyze(buffer)?;
        let namespaces = self.extractor(&analysis).namespaces();
        let forms = self.top_level_forms(&analysis);
        let classifier = Classifier::new(
            Scope::new(analysis.source(), &namespaces),
            &analysis.lines,
            &analysis.records,
            &self.config.idioms,
        );
        Ok(classifier.classify(&forms, kinds, analysis.index.list_count()))
    }

    fn analyze_complexity(&self, buffer: &SourceBuffer) -> Result<ComplexityReport> {
        let idioms = self.classify_idioms(buffer, &[])?;
        let graph = self.trace_calls(buffer, None)?;
        Ok(metrics::complexity(&idioms, &graph))
    }
}

impl SexpNavigation for ClojureAnalyzer {
    fn locate_enclosing_form(
        &self,
        buffer: &SourceBuffer,
        cursor: Cursor,
    ) -> Result<NavOutcome<EnclosingFormChain>> {
        Ok(self.analyze(buffer)?.navigator().locate(cursor))
    }

    fn navigate(
        &self,
        buffer: &SourceBuffer,
        cursor: Cursor,
        direction: Direction,
    ) -> Result<NavOutcome<Movement>> {
        Ok(self.analyze(buffer)?.navigator().navigate(cursor, direction))
    }

    fn find_matching_delimiter(
        &self,
        buffer: &SourceBuffer,
        cursor: Cursor,
    ) -> Result<NavOutcome<Option<DelimiterMatch>>> {
        Ok(self.analyze(buffer)?.navigator().matching_delimiter(cursor))
    }

    fn inspect_form(
        &self,
        buffer: &SourceBuffer,
        cursor: Cursor,
    ) -> Result<NavOutcome<Option<FormInspection>>> {
        let analysis = self.analyze(buffer)?;
        Ok(Inspector::new(&analysis, &self.parser, &self.config.idioms).inspect(cursor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ClojureAnalyzer {
        let parser = Arc::new(ClojureParser::new().unwrap());
        ClojureAnalyzer::new(parser, AnalyzerConfig::default())
    }

    #[test]
    fn test_cache_reuses_analysis() {
        let analyzer = analyzer();
        let buffer = SourceBuffer::new("a.clj", "(defn f [x] x)");
        let first = analyzer.analyze(&buffer).unwrap();
        let second = analyzer.analyze(&buffer).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(analyzer.cache_stats().unwrap().hits, 1);
    }

    #[test]
    fn test_changed_text_is_reanalyzed() {
        let analyzer = analyzer();
        analyzer
            .analyze(&SourceBuffer::new("a.clj", "(defn f [x] x)"))
            .unwrap();
        let functions = analyzer
            .extract_functions(&SourceBuffer::new("a.clj", "(defn g [y] y)"), None)
            .unwrap();
        assert_eq!(functions[0].name, "g");
        assert_eq!(analyzer.cache_stats().unwrap().entries, 1);
    }

    #[test]
    fn test_uncached_analyzer() {
        let mut config = AnalyzerConfig::default();
        config.cache.enabled = false;
        let analyzer = ClojureAnalyzer::new(Arc::new(ClojureParser::new().unwrap()), config);
        assert!(analyzer.cache_stats().is_none());
        let forms = analyzer
            .forms(&SourceBuffer::anonymous("(ns a.b) (defn f [] 1)"))
            .unwrap();
        assert_eq!(forms.len(), 2);
    }
}
