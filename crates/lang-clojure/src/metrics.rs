//! Complexity figures derived from an idiom report and a call graph.

use cljscope_api::{
    CallGraph, CallGraphMetrics, ComplexityReport, ConcurrencyCategory, ConcurrencyComplexity,
    DestructuringComplexity, DestructuringShape, FunctionCalls, IdiomDetail, IdiomReport,
    StateCategory, StateComplexity,
};
use serde::Serialize;
use std::collections::BTreeSet;

fn concurrency_weight(category: ConcurrencyCategory) -> usize {
    match category {
        ConcurrencyCategory::Block => 3,
        ConcurrencyCategory::Channel => 2,
        ConcurrencyCategory::Io => 2,
        ConcurrencyCategory::Selection => 4,
        ConcurrencyCategory::Utility => 1,
        ConcurrencyCategory::Future => 2,
    }
}

fn state_weight(category: StateCategory) -> usize {
    match category {
        StateCategory::Atom => 2,
        StateCategory::Ref => 4,
        StateCategory::Agent => 3,
        StateCategory::Var => 1,
        StateCategory::Volatile => 2,
        StateCategory::Promise => 2,
        StateCategory::Transient => 1,
    }
}

/// Serialized name of a unit enum variant, as used in the report keys.
fn key<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        round2(numerator / denominator as f64)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn complexity(report: &IdiomReport, graph: &CallGraph) -> ComplexityReport {
    ComplexityReport {
        concurrency: concurrency(report),
        state: state(report),
        destructuring: destructuring(report),
        calls: call_graph_metrics(graph),
    }
}

fn concurrency(report: &IdiomReport) -> ConcurrencyComplexity {
    let mut metrics = ConcurrencyComplexity::default();
    for occurrence in &report.occurrences {
        if let IdiomDetail::Concurrency { category, .. } = &occurrence.detail {
            metrics.total += 1;
            metrics.score += concurrency_weight(*category);
            *metrics.categories.entry(key(category)).or_default() += 1;
        }
    }
    metrics.intensity = ratio(metrics.score as f64, metrics.total);
    metrics
}

fn state(report: &IdiomReport) -> StateComplexity {
    let mut metrics = StateComplexity::default();
    for occurrence in &report.occurrences {
        if let IdiomDetail::StateMutation {
            category, mutates, ..
        } = &occurrence.detail
        {
            metrics.total += 1;
            metrics.score += state_weight(*category);
            metrics.mutations += usize::from(*mutates);
            *metrics.categories.entry(key(category)).or_default() += 1;
        }
    }
    metrics.mutation_ratio = ratio(metrics.mutations as f64, metrics.total);
    metrics.intensity = ratio(metrics.score as f64, metrics.total);
    metrics
}

fn destructuring(report: &IdiomReport) -> DestructuringComplexity {
    let mut metrics = DestructuringComplexity::default();
    let mut contexts = BTreeSet::new();
    let mut summed = 0;
    for occurrence in &report.occurrences {
        let IdiomDetail::Destructuring {
            context,
            shape,
            bindings,
            has_rest,
            as_binding,
            nested,
            ..
        } = &occurrence.detail
        else {
            continue;
        };
        metrics.total += 1;
        match shape {
            DestructuringShape::Map => metrics.map_patterns += 1,
            DestructuringShape::Vector => metrics.vector_patterns += 1,
        }
        metrics.nested_patterns += usize::from(*nested);
        let pattern = bindings.len()
            + usize::from(*has_rest)
            + usize::from(as_binding.is_some())
            + usize::from(*nested);
        summed += pattern;
        metrics.max_complexity = metrics.max_complexity.max(pattern);
        contexts.insert(context.clone());
    }
    metrics.average_complexity = ratio(summed as f64, metrics.total);
    metrics.contexts = contexts.into_iter().collect();
    metrics
}

pub fn call_graph_metrics(graph: &CallGraph) -> CallGraphMetrics {
    let functions = graph.functions.len();
    let max_in_degree = graph
        .functions
        .iter()
        .map(|f| f.called_by.len())
        .max()
        .unwrap_or(0);
    let max_out_degree = graph
        .functions
        .iter()
        .map(|f| f.calls.len())
        .max()
        .unwrap_or(0);
    let reaching = |max: usize, degree: fn(&FunctionCalls) -> usize| -> Vec<String> {
        if max == 0 {
            return Vec::new();
        }
        graph
            .functions
            .iter()
            .filter(|f| degree(f) == max)
            .map(|f| f.name.clone())
            .collect()
    };

    let total_calls: usize = graph.functions.iter().map(|f| f.calls.len()).sum();
    let total_complexity: usize = graph.functions.iter().map(|f| f.complexity).sum();
    CallGraphMetrics {
        total_functions: functions,
        total_calls,
        average_calls_per_function: ratio(total_calls as f64, functions),
        max_in_degree,
        max_out_degree,
        most_called: reaching(max_in_degree, |f| f.called_by.len()),
        most_calling: reaching(max_out_degree, |f| f.calls.len()),
        total_complexity,
        average_complexity: ratio(total_complexity as f64, functions),
        call_density: ratio(graph.edges.len() as f64, functions * functions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cljscope_api::{IdiomKind, IdiomOccurrence, Position, Range, Span};

    fn occurrence(kind: IdiomKind, detail: IdiomDetail) -> IdiomOccurrence {
        let at = Position { line: 0, column: 0 };
        IdiomOccurrence {
            kind,
            span: Span::new(0, 1),
            range: Range::from_positions(at, at),
            enclosing_definition: None,
            detail,
        }
    }

    fn report(occurrences: Vec<IdiomOccurrence>) -> IdiomReport {
        IdiomReport {
            occurrences,
            ..IdiomReport::default()
        }
    }

    #[test]
    fn test_weighted_concurrency_and_state() {
        let concurrency = |operation: &str, category| {
            occurrence(
                IdiomKind::ConcurrencyPrimitive,
                IdiomDetail::Concurrency {
                    operation: operation.to_string(),
                    category,
                },
            )
        };
        let state = |operation: &str, category, mutates| {
            occurrence(
                IdiomKind::StateMutation,
                IdiomDetail::StateMutation {
                    operation: operation.to_string(),
                    category,
                    mutates,
                },
            )
        };
        let report = report(vec![
            concurrency("go", ConcurrencyCategory::Block),
            concurrency("alts!", ConcurrencyCategory::Selection),
            concurrency("<!", ConcurrencyCategory::Io),
            state("atom", StateCategory::Atom, false),
            state("swap!", StateCategory::Atom, true),
            state("alter", StateCategory::Ref, true),
        ]);

        let result = complexity(&report, &CallGraph::default());
        assert_eq!(result.concurrency.total, 3);
        assert_eq!(result.concurrency.score, 9);
        assert_eq!(result.concurrency.intensity, 3.0);
        assert_eq!(result.concurrency.categories["selection"], 1);

        assert_eq!(result.state.score, 8);
        assert_eq!(result.state.mutations, 2);
        assert_eq!(result.state.mutation_ratio, 0.67);
        assert_eq!(result.state.categories["atom"], 2);
    }

    #[test]
    fn test_destructuring_pattern_complexity() {
        let pattern = |context: &str, shape, bindings: &[&str], nested| {
            occurrence(
                IdiomKind::Destructuring,
                IdiomDetail::Destructuring {
                    context: context.to_string(),
                    shape,
                    key_style: None,
                    bindings: bindings.iter().map(|b| b.to_string()).collect(),
                    has_rest: false,
                    as_binding: None,
                    nested,
                },
            )
        };
        let report = report(vec![
            pattern("let", DestructuringShape::Vector, &["a", "b"], false),
            pattern("defn", DestructuringShape::Map, &["x", "y", "z"], true),
        ]);

        let result = destructuring(&report);
        assert_eq!(result.total, 2);
        assert_eq!(result.nested_patterns, 1);
        assert_eq!(result.max_complexity, 4);
        assert_eq!(result.average_complexity, 3.0);
        assert_eq!(result.contexts, vec!["defn", "let"]);
    }

    #[test]
    fn test_call_graph_degrees() {
        let function = |name: &str, calls: &[&str], called_by: &[&str], complexity| FunctionCalls {
            name: name.to_string(),
            calls: calls.iter().map(|c| c.to_string()).collect(),
            called_by: called_by.iter().map(|c| c.to_string()).collect(),
            span: Span::new(0, 1),
            complexity,
        };
        let graph = CallGraph {
            functions: vec![
                function("main", &["parse", "run", "println"], &[], 4),
                function("parse", &["split"], &["main"], 1),
                function("run", &[], &["main"], 0),
            ],
            edges: Vec::new(),
        };

        let metrics = call_graph_metrics(&graph);
        assert_eq!(metrics.total_calls, 4);
        assert_eq!(metrics.max_out_degree, 3);
        assert_eq!(metrics.most_calling, vec!["main"]);
        assert_eq!(metrics.most_called, vec!["parse", "run"]);
        assert_eq!(metrics.average_complexity, 1.67);
        assert_eq!(metrics.call_density, 0.0);
    }

    #[test]
    fn test_empty_inputs_are_zero() {
        let result = complexity(&IdiomReport::default(), &CallGraph::default());
        assert_eq!(result.state.mutation_ratio, 0.0);
        assert!(result.calls.most_called.is_empty());
    }
}
