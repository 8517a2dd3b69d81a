use crate::error::{AnalysisError, Result};
use cljscope_api::IdiomKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one analyzer instance. Every field has a default, so an empty
/// JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub reconciliation: ReconciliationConfig,
    pub idioms: IdiomConfig,
    pub cache: CacheConfig,
}

impl AnalyzerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.idioms.baseline_per_100_forms <= 0.0 {
            return Err(AnalysisError::Config(
                "idioms.baseline_per_100_forms must be positive".to_string(),
            ));
        }
        for kind in IdiomKind::ALL {
            if self.idioms.weights.weight(kind) < 0.0 {
                return Err(AnalysisError::Config(format!(
                    "weight for {} must not be negative",
                    kind
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// When false, form records come from the syntax tree alone.
    pub enabled: bool,
    /// Maximum distance in bytes between a tree anchor and a scanner start.
    pub anchor_tolerance: usize,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            anchor_tolerance: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct IdiomConfig {
    pub weights: IdiomWeights,
    /// Weighted occurrences per 100 list forms that scores 100.
    pub baseline_per_100_forms: f64,
}

impl Default for IdiomConfig {
    fn default() -> Self {
        Self {
            weights: IdiomWeights::default(),
            baseline_per_100_forms: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "kebab-case")]
pub struct IdiomWeights {
    pub threading_macro: f64,
    pub destructuring: f64,
    pub state_mutation: f64,
    pub concurrency_primitive: f64,
    pub function_composition: f64,
    pub conditional_binding: f64,
    pub collection_processing: f64,
    pub nil_handling: f64,
}

impl Default for IdiomWeights {
    fn default() -> Self {
        Self {
            threading_macro: 2.0,
            destructuring: 1.5,
            state_mutation: 1.0,
            concurrency_primitive: 1.0,
            function_composition: 1.5,
            conditional_binding: 1.0,
            collection_processing: 1.0,
            nil_handling: 1.0,
        }
    }
}

impl IdiomWeights {
    pub fn weight(&self, kind: IdiomKind) -> f64 {
        match kind {
            IdiomKind::ThreadingMacro => self.threading_macro,
            IdiomKind::Destructuring => self.destructuring,
            IdiomKind::StateMutation => self.state_mutation,
            IdiomKind::ConcurrencyPrimitive => self.concurrency_primitive,
            IdiomKind::FunctionComposition => self.function_composition,
            IdiomKind::ConditionalBinding => self.conditional_binding,
            IdiomKind::CollectionProcessing => self.collection_processing,
            IdiomKind::NilHandling => self.nil_handling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 512,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_is_default() {
        let config = AnalyzerConfig::from_json("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.reconciliation.anchor_tolerance, 2);
    }

    #[test]
    fn test_partial_override() {
        let config = AnalyzerConfig::from_json(
            r#"{"reconciliation": {"enabled": false}, "idioms": {"weights": {"threading-macro": 3.0}}}"#,
        )
        .unwrap();
        assert!(!config.reconciliation.enabled);
        assert_eq!(config.reconciliation.anchor_tolerance, 2);
        assert_eq!(config.idioms.weights.weight(IdiomKind::ThreadingMacro), 3.0);
        assert_eq!(config.idioms.weights.weight(IdiomKind::Destructuring), 1.5);
    }

    #[test]
    fn test_invalid_baseline_rejected() {
        let err = AnalyzerConfig::from_json(r#"{"idioms": {"baseline_per_100_forms": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cache": {{"max_entries": 8}}}}"#).unwrap();
        let config = AnalyzerConfig::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.cache.max_entries, 8);
        assert!(config.cache.enabled);

        let missing = AnalyzerConfig::load(Path::new("/nonexistent/cljscope.json"));
        assert!(matches!(missing, Err(AnalysisError::Config(_))));
    }
}
