use crate::lexer::{qualifier, unqualified};
use crate::parser::CallSite;
use crate::scanner::definition_kind;
use cljscope_api::{CallEdge, CallGraph, FunctionCalls, FunctionRecord};

/// Heads that are language syntax rather than calls.
const SPECIAL_FORMS: &[&str] = &[
    "def", "if", "do", "let", "let*", "letfn", "quote", "var", "fn", "fn*", "loop", "loop*",
    "recur", "throw", "try", "catch", "finally", "monitor-enter", "monitor-exit", "new", "set!",
    ".", "when", "when-not", "cond", "case", "and", "or", "not", "binding",
];

/// Special forms that add a branch or a binding scope to a function body.
const BRANCHING_FORMS: &[&str] = &["let", "if", "when", "cond", "loop"];

pub(crate) fn is_special_form(head: &str) -> bool {
    let name = unqualified(head);
    SPECIAL_FORMS.contains(&name) || definition_kind(name).is_some()
}

/// Call graph of `functions`, built from the call sites inside their bodies.
pub(crate) fn build_call_graph(functions: &[FunctionRecord], calls: &[CallSite]) -> CallGraph {
    let mut graph = CallGraph {
        functions: functions
            .iter()
            .map(|f| FunctionCalls {
                name: f.name.clone(),
                calls: Vec::new(),
                called_by: Vec::new(),
                span: f.span,
                complexity: 0,
            })
            .collect(),
        edges: Vec::new(),
    };
    let mut branches = vec![0; functions.len()];

    for call in calls {
        // Innermost function whose body contains the call.
        let Some(caller) = functions
            .iter()
            .enumerate()
            .filter(|(_, f)| f.span.encloses(&call.span) && f.span != call.span)
            .max_by_key(|(_, f)| f.span.start)
            .map(|(i, _)| i)
        else {
            continue;
        };
        if is_special_form(&call.head) {
            if BRANCHING_FORMS.contains(&unqualified(&call.head)) {
                branches[caller] += 1;
            }
            continue;
        }

        let entry = &mut graph.functions[caller];
        if !entry.calls.contains(&call.head) {
            entry.calls.push(call.head.clone());
        }

        let caller_ns = functions[caller].namespace.as_deref();
        let Some(callee) = functions.iter().find(|f| {
            f.name == unqualified(&call.head)
                && match qualifier(&call.head) {
                    None => true,
                    Some(q) => f.namespace.as_deref() == Some(q) || Some(q) == caller_ns,
                }
        }) else {
            continue;
        };

        let caller_name = functions[caller].name.clone();
        match graph
            .edges
            .iter_mut()
            .find(|e| e.caller == caller_name && e.callee == callee.name)
        {
            Some(edge) => edge.sites.push(call.span),
            None => graph.edges.push(CallEdge {
                caller: caller_name,
                callee: callee.name.clone(),
                sites: vec![call.span],
            }),
        }
    }

    for (entry, branches) in graph.functions.iter_mut().zip(branches) {
        entry.complexity = entry.calls.len() + branches;
    }

    for edge in &graph.edges {
        for entry in graph.functions.iter_mut().filter(|f| f.name == edge.callee) {
            if !entry.called_by.contains(&edge.caller) {
                entry.called_by.push(edge.caller.clone());
            }
        }
    }

    graph
}

/// Restricts a graph to `target` and the edges touching it.
pub(crate) fn focus(graph: CallGraph, target: &str) -> Option<CallGraph> {
    if !graph.functions.iter().any(|f| f.name == target) {
        return None;
    }
    Some(CallGraph {
        functions: graph
            .functions
            .into_iter()
            .filter(|f| f.name == target)
            .collect(),
        edges: graph
            .edges
            .into_iter()
            .filter(|e| e.caller == target || e.callee == target)
            .collect(),
    })
}
