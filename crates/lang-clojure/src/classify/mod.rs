//! Idiom detection over the forms of one buffer.
//!
//! Each [`IdiomKind`] has exactly one detector in [`DETECTORS`]. Detectors see
//! every list form with a symbol head and push what they find; the classifier
//! owns counting, enclosing-definition lookup and scoring.

mod collections;
mod combinators;
mod destructuring;
mod effects;
mod threading;

use crate::lexer::qualifier;
use crate::sexp::{Sexp, SexpKind};
use cljscope_api::{
    FormKind, FormRecord, IdiomDetail, IdiomKind, IdiomOccurrence, IdiomReport, NamespaceRecord,
    PatternUnsupported, Span,
};
use cljscope_core::config::IdiomConfig;
use cljscope_core::text::LineIndex;
use std::collections::{BTreeMap, HashSet};

/// What the detectors know about the buffer besides the form under inspection.
pub(crate) struct Scope<'a> {
    pub source: &'a str,
    async_aliases: HashSet<String>,
    async_refers: HashSet<String>,
    async_refer_all: bool,
}

impl<'a> Scope<'a> {
    pub fn new(source: &'a str, namespaces: &[NamespaceRecord]) -> Self {
        let mut scope = Self {
            source,
            async_aliases: HashSet::new(),
            async_refers: HashSet::new(),
            async_refer_all: false,
        };
        for spec in namespaces
            .iter()
            .flat_map(|ns| &ns.requires)
            .filter(|spec| spec.namespace.contains("async"))
        {
            scope.async_aliases.insert(spec.namespace.clone());
            scope.async_aliases.extend(spec.alias.clone());
            scope.async_refers.extend(spec.refers.iter().cloned());
            scope.async_refer_all |= spec.refer_all;
        }
        scope
    }

    /// Whether `symbol` resolves to core.async through the buffer's requires.
    pub fn is_async(&self, symbol: &str) -> bool {
        match qualifier(symbol) {
            Some(q) => self.async_aliases.contains(q),
            None => self.async_refer_all || self.async_refers.contains(symbol),
        }
    }
}

/// Unqualified head of a list form, `None` for heads qualified with a
/// namespace other than clojure.core.
pub(crate) fn core_head<'s>(form: &Sexp, source: &'s str) -> Option<&'s str> {
    let head = form.head(source)?;
    match qualifier(head) {
        None | Some("clojure.core") | Some("cljs.core") => Some(head),
        Some(_) => None,
    }
}

pub(crate) type Found = (Span, IdiomDetail);
type Detector = fn(&Scope, &Sexp, &mut Vec<Found>);

const DETECTORS: &[(IdiomKind, Detector)] = &[
    (IdiomKind::ThreadingMacro, threading::detect),
    (IdiomKind::Destructuring, destructuring::detect),
    (IdiomKind::StateMutation, effects::detect_state),
    (IdiomKind::ConcurrencyPrimitive, effects::detect_concurrency),
    (IdiomKind::FunctionComposition, combinators::detect_composition),
    (IdiomKind::ConditionalBinding, combinators::detect_conditional),
    (IdiomKind::CollectionProcessing, collections::detect_collection),
    (IdiomKind::NilHandling, collections::detect_nil_handling),
];

/// Resolves requested kind names; an empty request selects every kind.
pub fn resolve_kinds(requested: &[String]) -> (Vec<IdiomKind>, Vec<PatternUnsupported>) {
    if requested.is_empty() {
        return (IdiomKind::ALL.to_vec(), Vec::new());
    }
    let mut kinds = Vec::new();
    let mut unsupported = Vec::new();
    for name in requested {
        match name.trim().parse::<IdiomKind>() {
            Ok(kind) => {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            Err(reason) => unsupported.push(PatternUnsupported {
                requested: name.clone(),
                reason,
            }),
        }
    }
    (kinds, unsupported)
}

pub struct Classifier<'a> {
    scope: Scope<'a>,
    lines: &'a LineIndex,
    records: &'a [FormRecord],
    config: &'a IdiomConfig,
}

impl<'a> Classifier<'a> {
    pub(crate) fn new(
        scope: Scope<'a>,
        lines: &'a LineIndex,
        records: &'a [FormRecord],
        config: &'a IdiomConfig,
    ) -> Self {
        Self {
            scope,
            lines,
            records,
            config,
        }
    }

    /// Classifies `forms`. `list_forms` is the number of list forms in the
    /// buffer and normalizes the score.
    pub fn classify(&self, forms: &[Sexp], kinds: &[String], list_forms: usize) -> IdiomReport {
        let (kinds, unsupported) = resolve_kinds(kinds);
        let detectors: Vec<&(IdiomKind, Detector)> = DETECTORS
            .iter()
            .filter(|(kind, _)| kinds.contains(kind))
            .collect();

        let mut occurrences = Vec::new();
        let mut found = Vec::new();
        for form in forms {
            visit_code(form, self.scope.source, &mut |list| {
                for (kind, detect) in &detectors {
                    detect(&self.scope, list, &mut found);
                    occurrences.extend(found.drain(..).map(|(span, detail)| IdiomOccurrence {
                        kind: *kind,
                        span,
                        range: self.lines.range(span),
                        enclosing_definition: self.enclosing_definition(span),
                        detail,
                    }));
                }
            });
        }
        occurrences.sort_by_key(|o| (o.span.start, o.kind));

        let mut counts: BTreeMap<String, usize> = kinds
            .iter()
            .map(|k| (k.as_str().to_string(), 0))
            .collect();
        for occurrence in &occurrences {
            *counts.entry(occurrence.kind.as_str().to_string()).or_default() += 1;
        }

        let weighted: f64 = kinds
            .iter()
            .map(|k| {
                let count = counts.get(k.as_str()).copied().unwrap_or(0);
                self.config.weights.weight(*k) * count as f64
            })
            .sum();

        IdiomReport {
            occurrences,
            counts,
            score: score(weighted, list_forms, self.config.baseline_per_100_forms),
            form_count: list_forms,
            unsupported,
        }
    }

    fn enclosing_definition(&self, span: Span) -> Option<String> {
        self.records
            .iter()
            .filter(|r| {
                !matches!(r.kind, FormKind::GenericList | FormKind::Other)
                    && r.span.encloses(&span)
            })
            .max_by_key(|r| r.span.start)
            .and_then(|r| r.name.clone())
    }
}

/// Density score in `[0, 100]`.
pub fn score(weighted: f64, list_forms: usize, baseline_per_100_forms: f64) -> f64 {
    if list_forms == 0 || baseline_per_100_forms <= 0.0 {
        return 0.0;
    }
    let per_100 = weighted * 100.0 / list_forms as f64;
    (per_100 * 100.0 / baseline_per_100_forms).clamp(0.0, 100.0)
}

/// Visits every list and anonymous function that is code. Quoted forms are data
/// and are not entered.
fn visit_code<'s>(form: &'s Sexp, source: &str, visit: &mut dyn FnMut(&'s Sexp)) {
    match form.kind {
        SexpKind::Prefixed
            if source
                .get(form.span.start..)
                .is_some_and(|rest| rest.starts_with('\'')) => {}
        SexpKind::List | SexpKind::AnonFn => {
            if form.head(source).is_some() {
                visit(form);
            }
            for child in &form.children {
                visit_code(child, source, visit);
            }
        }
        _ => {
            for child in &form.children {
                visit_code(child, source, visit);
            }
        }
    }
}
