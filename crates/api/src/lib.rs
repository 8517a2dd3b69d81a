pub mod analysis;
pub mod buffer;
pub mod cache;
pub mod error;
pub mod models;
pub mod navigation;

// Re-export commonly used types
pub use analysis::{BatchAnalysis, ClojureAnalysis};
pub use buffer::SourceBuffer;
pub use cache::{CacheKey, CacheStats, ContentCache};
pub use error::{AnalysisError, AnalysisResult};
pub use models::*;
pub use navigation::SexpNavigation;

/// Composite trait for the full analyzer surface, so clients can hold a single
/// `Arc<dyn Analyzer>`.
pub trait Analyzer: ClojureAnalysis + SexpNavigation + BatchAnalysis {}

impl<T> Analyzer for T where T: ClojureAnalysis + SexpNavigation + BatchAnalysis {}
