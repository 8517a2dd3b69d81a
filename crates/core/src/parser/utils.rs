use crate::error::{AnalysisError, Result};
use cljscope_api::Span;
use tree_sitter::{Language, Node, Query};

pub fn span_of(node: &Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Text of `node`, or an empty string when its range does not fit `source`.
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Loads a Tree-sitter query from an SCM string.
pub fn load_query(language: &Language, scm: &str) -> Result<Query> {
    Query::new(language, scm)
        .map_err(|e| AnalysisError::LanguageUnavailable(format!("Invalid query: {:?}", e)))
}

/// Gets the index of a capture name in a query.
pub fn get_capture_index(query: &Query, name: &str) -> Result<u32> {
    query.capture_index_for_name(name).ok_or_else(|| {
        AnalysisError::LanguageUnavailable(format!("Capture name '{}' not found in SCM", name))
    })
}

/// Macro to define a struct for capture indices and a `new` method to initialize it from a query.
#[macro_export]
macro_rules! decl_indices {
    ($name:ident, { $($field:ident => $capture:expr),+ $(,)? }) => {
        #[derive(Clone)]
        pub struct $name {
            $(pub $field: u32,)+
        }

        impl $name {
            pub fn new(query: &tree_sitter::Query) -> $crate::error::Result<Self> {
                Ok(Self {
                    $($field: $crate::parser::utils::get_capture_index(query, $capture)?,)+
                })
            }
        }
    };
}
