use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct ConcurrencyComplexity {
    pub total: usize,
    /// Occurrences per concurrency category.
    pub categories: BTreeMap<String, usize>,
    /// Category-weighted sum of the occurrences.
    pub score: usize,
    /// Average weight per occurrence.
    pub intensity: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct StateComplexity {
    pub total: usize,
    pub categories: BTreeMap<String, usize>,
    /// Operations that change state, as opposed to constructors and reads.
    pub mutations: usize,
    /// `mutations / total`, 0 when there is no state usage.
    pub mutation_ratio: f64,
    pub score: usize,
    /// Average weight per occurrence.
    pub intensity: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct DestructuringComplexity {
    pub total: usize,
    pub map_patterns: usize,
    pub vector_patterns: usize,
    pub nested_patterns: usize,
    /// Mean of the per-pattern complexity: bound names, rest and `:as`, plus one when nested.
    pub average_complexity: f64,
    pub max_complexity: usize,
    /// Binding forms patterns appeared in, e.g. `let` or `params`.
    pub contexts: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct CallGraphMetrics {
    pub total_functions: usize,
    /// Distinct call heads summed over functions.
    pub total_calls: usize,
    pub average_calls_per_function: f64,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    /// Functions reaching the maximum in-degree, when it is non-zero.
    pub most_called: Vec<String>,
    pub most_calling: Vec<String>,
    pub total_complexity: usize,
    pub average_complexity: f64,
    /// Caller/callee edges between the buffer's functions over all possible pairs.
    pub call_density: f64,
}

/// Complexity figures for one buffer, derived from its idioms and call graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct ComplexityReport {
    pub concurrency: ConcurrencyComplexity,
    pub state: StateComplexity,
    pub destructuring: DestructuringComplexity,
    pub calls: CallGraphMetrics,
}
