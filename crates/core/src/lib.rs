pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod project;
pub mod text;

pub use config::AnalyzerConfig;
pub use error::Result;
