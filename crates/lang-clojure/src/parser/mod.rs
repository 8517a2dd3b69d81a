use crate::lexer::unqualified;
use crate::queries::clojure_calls::{CLOJURE_CALLS_SCM, CallIndices};
use crate::sexp;
use cljscope_api::{AnalysisError, Span};
use cljscope_core::Result;
use cljscope_core::parser::utils::load_query;
use std::sync::Arc;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

/// Captures of one query match.
#[derive(Debug, Clone)]
pub struct QueryBinding<'tree> {
    pub captures: Vec<(u32, Node<'tree>)>,
}

impl<'tree> QueryBinding<'tree> {
    pub fn capture(&self, index: u32) -> Option<Node<'tree>> {
        self.captures
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, node)| *node)
    }
}

/// A list whose first form is a symbol.
#[derive(Debug, Clone)]
pub struct CallSite<'tree> {
    pub node: Node<'tree>,
    /// Head symbol without metadata, possibly namespace-qualified.
    pub head: String,
    pub head_span: Span,
    /// List span from the opening delimiter, metadata excluded.
    pub span: Span,
}

impl CallSite<'_> {
    pub fn head_name(&self) -> &str {
        unqualified(&self.head)
    }
}

/// Grammar handle plus the compiled queries. Holds no parser state, so it is
/// shared freely across threads.
pub struct ClojureParser {
    language: Language,
    call_query: Arc<Query>,
    call_indices: CallIndices,
}

impl Clone for ClojureParser {
    fn clone(&self) -> Self {
        Self {
            language: self.language.clone(),
            call_query: Arc::clone(&self.call_query),
            call_indices: self.call_indices.clone(),
        }
    }
}

impl ClojureParser {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_clojure::LANGUAGE.into();

        // Fails early when the grammar's ABI does not match the runtime.
        Parser::new()
            .set_language(&language)
            .map_err(|e| AnalysisError::LanguageUnavailable(e.to_string()))?;

        let call_query = load_query(&language, CLOJURE_CALLS_SCM)?;
        let call_indices = CallIndices::new(&call_query)?;

        Ok(Self {
            language,
            call_query: Arc::new(call_query),
            call_indices,
        })
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Parses `source` with a fresh parser. Malformed input yields error nodes
    /// in the tree, not an error.
    pub fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| AnalysisError::LanguageUnavailable(e.to_string()))?;
        parser
            .parse(source, None)
            .ok_or_else(|| AnalysisError::Internal("tree-sitter parse was cancelled".to_string()))
    }

    /// Runs `query` over the whole tree and materializes every match.
    pub fn run_query<'tree>(
        &self,
        tree: &'tree Tree,
        query: &Query,
        source: &str,
    ) -> Vec<QueryBinding<'tree>> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());
        let mut bindings = Vec::new();
        while let Some(mat) = matches.next() {
            bindings.push(QueryBinding {
                captures: mat.captures.iter().map(|c| (c.index, c.node)).collect(),
            });
        }
        bindings
    }

    /// All call sites in document order.
    pub fn calls<'tree>(&self, tree: &'tree Tree, source: &str) -> Vec<CallSite<'tree>> {
        let mut calls: Vec<CallSite<'tree>> = self
            .run_query(tree, &self.call_query, source)
            .into_iter()
            .filter_map(|binding| {
                let node = binding.capture(self.call_indices.call)?;
                let head_node = binding.capture(self.call_indices.head)?;
                let head_span = sexp::bare_span(&head_node);
                let head = source.get(head_span.start..head_span.end)?.to_string();
                Some(CallSite {
                    node,
                    head,
                    head_span,
                    span: sexp::bare_span(&node),
                })
            })
            .collect();
        calls.sort_by_key(|c| c.span.start);
        calls.dedup_by_key(|c| c.span.start);
        calls
    }

    /// The smallest collection node whose bare span is exactly `span`.
    pub fn node_at<'tree>(&self, tree: &'tree Tree, span: Span) -> Option<Node<'tree>> {
        let mut node = tree
            .root_node()
            .descendant_for_byte_range(span.start, span.start)?;
        loop {
            if sexp::bare_span(&node) == span {
                return Some(node);
            }
            if node.start_byte() < span.start || node.end_byte() > span.end {
                return None;
            }
            node = node.parent()?;
        }
    }
}

/// Whether the tree-sitter grammar loaded at startup.
#[derive(Clone)]
pub enum Capability {
    Available(Arc<ClojureParser>),
    Unavailable(String),
}

impl Capability {
    pub fn detect() -> Self {
        match ClojureParser::new() {
            Ok(parser) => {
                tracing::debug!("Clojure grammar loaded");
                Capability::Available(Arc::new(parser))
            }
            Err(e) => {
                tracing::warn!("Clojure grammar unavailable: {}", e);
                Capability::Unavailable(e.to_string())
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    pub fn parser(&self) -> Result<Arc<ClojureParser>> {
        match self {
            Capability::Available(parser) => Ok(Arc::clone(parser)),
            Capability::Unavailable(reason) => {
                Err(AnalysisError::LanguageUnavailable(reason.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_detection() {
        let capability = Capability::detect();
        assert!(capability.is_available());
        assert!(capability.parser().is_ok());
    }

    #[test]
    fn test_parse_malformed_input_is_not_an_error() {
        let parser = ClojureParser::new().unwrap();
        let tree = parser.parse("(defn f [x").unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_calls_in_order() {
        let parser = ClojureParser::new().unwrap();
        let src = "(defn f [x] (inc x)) #(swap! a %)";
        let tree = parser.parse(src).unwrap();
        let heads: Vec<String> = parser
            .calls(&tree, src)
            .into_iter()
            .map(|c| c.head)
            .collect();
        assert_eq!(heads, vec!["defn", "inc", "swap!"]);
    }

    #[test]
    fn test_head_metadata_and_qualifier() {
        let parser = ClojureParser::new().unwrap();
        let src = "(clojure.core/defn g [] 1)";
        let tree = parser.parse(src).unwrap();
        let calls = parser.calls(&tree, src);
        assert_eq!(calls[0].head, "clojure.core/defn");
        assert_eq!(calls[0].head_name(), "defn");
        assert_eq!(calls[0].span, Span::new(0, src.len()));
    }

    #[test]
    fn test_node_at_span() {
        let parser = ClojureParser::new().unwrap();
        let src = "(ns a)\n(defn f [x] x)";
        let tree = parser.parse(src).unwrap();
        let node = parser.node_at(&tree, Span::new(7, src.len())).unwrap();
        assert_eq!(node.kind(), "list_lit");
        assert!(parser.node_at(&tree, Span::new(7, 10)).is_none());
    }
}
