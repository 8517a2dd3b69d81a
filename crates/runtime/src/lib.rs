use cljscope_api::{AnalysisResult, Analyzer};
use cljscope_clojure::{Capability, ClojureAnalyzer};
use cljscope_core::AnalyzerConfig;
use std::path::Path;
use std::sync::Arc;

/// Bootstraps the default analyzer.
///
/// Probes the Clojure grammar once; when it cannot be loaded every entry point
/// would fail, so the error is returned here instead.
pub fn build_default_analyzer(config: AnalyzerConfig) -> AnalysisResult<Arc<dyn Analyzer>> {
    let capability = Capability::detect();
    if let Capability::Unavailable(reason) = &capability {
        tracing::error!("Clojure grammar unavailable: {}", reason);
    }
    let analyzer = ClojureAnalyzer::from_capability(&capability, config)?;
    Ok(Arc::new(analyzer))
}

/// Loads the configuration file when one is given, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> AnalysisResult<AnalyzerConfig> {
    let config = AnalyzerConfig::load_or_default(path)?;
    if let Some(p) = path {
        tracing::debug!("Loaded configuration from {}", p.display());
    }
    Ok(config)
}

/// Initializes the logging system for a specific component.
/// This delegates to the core logging module.
pub fn init_logging(component: &str, to_stderr: bool) -> Option<impl Drop> {
    Some(cljscope_core::logging::init_logging(component, to_stderr))
}
