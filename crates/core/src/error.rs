pub use cljscope_api::error::AnalysisError;

pub type Result<T> = std::result::Result<T, AnalysisError>;
