//! Clojure semantic analysis.
//!
//! A logos lexer drives the lexical boundary scanner, tree-sitter supplies the
//! syntax tree, and the reconciler merges both into [`FormRecord`]s that every
//! extractor, the navigator and the idiom classifier build on.
//!
//! [`FormRecord`]: cljscope_api::FormRecord

pub mod analysis;
pub mod analyzer;
pub mod batch;
pub mod classify;
pub mod extract;
pub mod inspect;
pub mod lexer;
pub mod metrics;
pub mod navigate;
pub mod parser;
pub mod queries;
pub mod reconcile;
pub mod scanner;
pub mod sexp;

pub use analysis::FileAnalysis;
pub use analyzer::ClojureAnalyzer;
pub use parser::{Capability, ClojureParser};
