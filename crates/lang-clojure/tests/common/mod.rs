use cljscope_api::SourceBuffer;
use cljscope_clojure::{ClojureAnalyzer, ClojureParser};
use cljscope_core::AnalyzerConfig;
use std::sync::{Arc, OnceLock};

#[allow(dead_code)]
pub fn shared_parser() -> Arc<ClojureParser> {
    static PARSER: OnceLock<Arc<ClojureParser>> = OnceLock::new();
    PARSER
        .get_or_init(|| Arc::new(ClojureParser::new().expect("Clojure grammar should load")))
        .clone()
}

#[allow(dead_code)]
pub fn analyzer() -> ClojureAnalyzer {
    ClojureAnalyzer::new(shared_parser(), AnalyzerConfig::default())
}

#[allow(dead_code)]
pub fn analyzer_with(config: AnalyzerConfig) -> ClojureAnalyzer {
    ClojureAnalyzer::new(shared_parser(), config)
}

#[allow(dead_code)]
pub fn buffer(text: &str) -> SourceBuffer {
    SourceBuffer::new("test.clj", text)
}
