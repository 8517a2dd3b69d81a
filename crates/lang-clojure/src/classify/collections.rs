use super::{Found, Scope, core_head};
use crate::lexer::unqualified;
use crate::sexp::{Sexp, SexpKind};
use cljscope_api::{CollectionCategory, IdiomDetail, NilStyle};

/// Sequence functions whose single-argument call returns a transducer.
const TRANSDUCER_STEPS: &[&str] = &[
    "map",
    "filter",
    "remove",
    "take",
    "drop",
    "take-while",
    "drop-while",
    "partition-all",
    "partition-by",
    "mapcat",
    "keep",
    "dedupe",
    "cat",
];

fn category(operator: &str) -> Option<CollectionCategory> {
    Some(match operator {
        "take-while" | "drop-while" => CollectionCategory::ConditionalSequence,
        "partition-by" | "group-by" => CollectionCategory::Grouping,
        "map-indexed" | "keep-indexed" => CollectionCategory::Indexed,
        "frequencies" => CollectionCategory::Analysis,
        "transduce" | "eduction" => CollectionCategory::Transducer,
        _ => return None,
    })
}

/// `(map f)` and friends, or a bare `cat`.
fn is_transducer_step(scope: &Scope, step: &Sexp) -> bool {
    if step.symbol(scope.source).map(unqualified) == Some("cat") {
        return true;
    }
    step.kind == SexpKind::List
        && step.args().len() == 1
        && core_head(step, scope.source)
            .map(unqualified)
            .is_some_and(|h| TRANSDUCER_STEPS.contains(&h))
}

pub(super) fn detect_collection(scope: &Scope, form: &Sexp, found: &mut Vec<Found>) {
    let Some(operator) = core_head(form, scope.source).map(unqualified) else {
        return;
    };
    let args = form.args();
    let category = match category(operator) {
        // A one-argument call is itself a transducer step, reported by its `comp`.
        Some(_) if args.len() == 1 && TRANSDUCER_STEPS.contains(&operator) => return,
        Some(category) => category,
        None if operator == "comp"
            && !args.is_empty()
            && args.iter().all(|a| is_transducer_step(scope, a)) =>
        {
            CollectionCategory::Transducer
        }
        None => return,
    };
    found.push((
        form.span,
        IdiomDetail::Collection {
            operator: operator.to_string(),
            category,
        },
    ));
}

pub(super) fn detect_nil_handling(scope: &Scope, form: &Sexp, found: &mut Vec<Found>) {
    let Some(operator) = core_head(form, scope.source).map(unqualified) else {
        return;
    };
    let style = match operator {
        "fnil" => NilStyle::NilSafeFunction,
        "some->" | "some->>" => NilStyle::NilSafeThreading,
        // (or x default): the fallback is a constant or a name, not a computation.
        "or" if form.args().len() >= 2
            && form
                .args()
                .last()
                .is_some_and(|d| !matches!(d.kind, SexpKind::List | SexpKind::AnonFn)) =>
        {
            NilStyle::DefaultValue
        }
        _ => return,
    };
    found.push((
        form.span,
        IdiomDetail::NilHandling {
            operator: operator.to_string(),
            style,
        },
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::read;

    fn run(detector: fn(&Scope, &Sexp, &mut Vec<Found>), src: &str) -> Vec<IdiomDetail> {
        let scope = Scope::new(src, &[]);
        let mut found = Vec::new();
        for form in read(src) {
            form.walk(&mut |f| {
                if f.kind == SexpKind::List {
                    detector(&scope, f, &mut found)
                }
            });
        }
        found.into_iter().map(|(_, d)| d).collect()
    }

    fn operators(found: &[IdiomDetail]) -> Vec<(&str, CollectionCategory)> {
        found
            .iter()
            .filter_map(|d| match d {
                IdiomDetail::Collection { operator, category } => Some((operator.as_str(), *category)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sequence_functions() {
        let found = run(
            detect_collection,
            "(take-while pos? xs) (group-by :k rows) (map-indexed vector xs) (frequencies ws) (map inc xs)",
        );
        assert_eq!(
            operators(&found),
            vec![
                ("take-while", CollectionCategory::ConditionalSequence),
                ("group-by", CollectionCategory::Grouping),
                ("map-indexed", CollectionCategory::Indexed),
                ("frequencies", CollectionCategory::Analysis),
            ]
        );
    }

    #[test]
    fn test_transducer_stack() {
        let found = run(
            detect_collection,
            "(transduce (comp (map inc) (filter odd?) (take-while pos?)) + xs)",
        );
        assert_eq!(
            operators(&found),
            vec![
                ("transduce", CollectionCategory::Transducer),
                ("comp", CollectionCategory::Transducer),
            ]
        );
        assert!(run(detect_collection, "(comp str inc)").is_empty());
    }

    #[test]
    fn test_nil_handling_styles() {
        let found = run(
            detect_nil_handling,
            "(or (:port opts) 8080) (or a (compute)) ((fnil inc 0) n) (some-> m :a name) (or x)",
        );
        let styles: Vec<NilStyle> = found
            .iter()
            .filter_map(|d| match d {
                IdiomDetail::NilHandling { style, .. } => Some(*style),
                _ => None,
            })
            .collect();
        assert_eq!(
            styles,
            vec![
                NilStyle::DefaultValue,
                NilStyle::NilSafeFunction,
                NilStyle::NilSafeThreading,
            ]
        );
    }
}
