//! Inspection of the innermost form at a cursor: what it is, where it sits,
//! which idioms it contains and what could be improved.

use crate::analysis::FileAnalysis;
use crate::classify::{Classifier, Scope};
use crate::extract::Extractor;
use crate::lexer::unqualified;
use crate::metrics;
use crate::parser::ClojureParser;
use crate::scanner::definition_kind;
use crate::sexp::{self, Sexp};
use cljscope_api::{
    CallGraph, Cursor, Delimiter, FormContext, FormInspection, FormKind, FormSpan, FunctionRecord,
    IdiomDetail, IdiomReport, NamespaceRecord, NavOutcome, Priority, Suggestion, SuggestionKind,
};
use cljscope_core::config::IdiomConfig;

const LOCAL_BINDINGS: &[&str] = &[
    "let", "letfn", "loop", "binding", "with-open", "when-let", "if-let", "when-some", "if-some",
    "when-first", "dotimes", "doseq", "for",
];

/// Pattern complexity above which splitting it is suggested.
const MAX_PATTERN_COMPLEXITY: usize = 5;
/// State changes in one form above which transaction boundaries are suggested.
const MAX_MUTATIONS: usize = 3;
const MAX_THREADING_STEPS: usize = 6;

pub struct Inspector<'a> {
    analysis: &'a FileAnalysis,
    parser: &'a ClojureParser,
    config: &'a IdiomConfig,
}

impl<'a> Inspector<'a> {
    pub fn new(analysis: &'a FileAnalysis, parser: &'a ClojureParser, config: &'a IdiomConfig) -> Self {
        Self {
            analysis,
            parser,
            config,
        }
    }

    pub fn inspect(&self, cursor: Cursor) -> NavOutcome<Option<FormInspection>> {
        let navigator = self.analysis.navigator();
        let chain = match navigator.locate(cursor) {
            NavOutcome::Located(chain) => chain,
            NavOutcome::OutOfBounds { cursor, reason } => {
                return NavOutcome::OutOfBounds { cursor, reason };
            }
        };
        let (Some(idx), Some(form)) = (
            self.analysis.index.innermost_at(chain.offset),
            chain.innermost().cloned(),
        ) else {
            return NavOutcome::Located(None);
        };

        let source = self.analysis.source();
        let text = source
            .get(form.span.start..form.span.end)
            .unwrap_or_default()
            .to_string();
        let parsed = sexp::read_span(source, form.span).into_iter().next();

        let extractor = Extractor::new(self.analysis, self.parser);
        let namespaces = extractor.namespaces();
        let function = extractor
            .functions(None)
            .into_iter()
            .filter(|f| f.span.encloses(&form.span))
            .max_by_key(|f| f.span.start);

        let idioms = self.idioms(&form, parsed.as_ref(), &namespaces);
        let context = context(&form, parsed.as_ref(), source);
        let suggestions = suggestions(&context, &form, function.as_ref(), &idioms);

        NavOutcome::Located(Some(FormInspection {
            navigation: navigator.options(idx),
            namespace: namespaces.into_iter().next(),
            chain,
            form,
            text,
            context,
            function,
            idioms,
            suggestions,
        }))
    }

    fn idioms(
        &self,
        form: &FormSpan,
        parsed: Option<&Sexp>,
        namespaces: &[NamespaceRecord],
    ) -> IdiomReport {
        let lists = self
            .analysis
            .index
            .forms()
            .iter()
            .filter(|f| {
                matches!(f.delimiter, Delimiter::List | Delimiter::AnonFn)
                    && form.span.encloses(&f.span)
            })
            .count();
        let classifier = Classifier::new(
            Scope::new(self.analysis.source(), namespaces),
            &self.analysis.lines,
            &self.analysis.records,
            self.config,
        );
        classifier.classify(parsed.map(std::slice::from_ref).unwrap_or_default(), &[], lists)
    }
}

/// Second element of a definition form, when it is a symbol.
fn defined_name(parsed: Option<&Sexp>, source: &str) -> Option<String> {
    parsed?
        .args()
        .first()
        .and_then(|s| s.symbol(source))
        .map(str::to_string)
}

fn context(form: &FormSpan, parsed: Option<&Sexp>, source: &str) -> FormContext {
    match form.delimiter {
        Delimiter::Vector => return FormContext::VectorLiteral,
        Delimiter::Map => return FormContext::MapLiteral,
        Delimiter::Set => return FormContext::SetLiteral,
        Delimiter::AnonFn => return FormContext::AnonymousFunction,
        Delimiter::ReaderConditional => return FormContext::ReaderConditional,
        Delimiter::List => {}
    }
    let Some(head) = form.head.as_deref() else {
        return FormContext::Other;
    };
    let name = || {
        form.record_name
            .clone()
            .or_else(|| defined_name(parsed, source))
    };
    let construct = unqualified(head);
    match definition_kind(head) {
        Some(FormKind::FunctionDef) => FormContext::FunctionDefinition { name: name() },
        Some(FormKind::MacroDef) => FormContext::MacroDefinition { name: name() },
        Some(FormKind::NamespaceDecl) => FormContext::NamespaceDefinition { name: name() },
        Some(FormKind::ProtocolDef | FormKind::TypeDef) => FormContext::TypeDefinition {
            construct: construct.to_string(),
            name: name(),
        },
        _ if construct.starts_with("def") => FormContext::Definition {
            construct: construct.to_string(),
            name: name(),
        },
        _ if LOCAL_BINDINGS.contains(&construct) => FormContext::LocalBinding {
            construct: construct.to_string(),
        },
        _ => FormContext::FunctionCall {
            name: head.to_string(),
        },
    }
}

fn suggestions(
    context: &FormContext,
    form: &FormSpan,
    function: Option<&FunctionRecord>,
    idioms: &IdiomReport,
) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    if let (FormContext::FunctionDefinition { name }, Some(function)) = (context, function) {
        if function.span == form.span && function.docstring.is_none() {
            suggestions.push(Suggestion {
                kind: SuggestionKind::Documentation,
                priority: Priority::Medium,
                message: format!(
                    "add a docstring to {}",
                    name.as_deref().unwrap_or(&function.name)
                ),
            });
        }
    }

    let complexity = metrics::complexity(idioms, &CallGraph::default());
    if complexity.destructuring.max_complexity > MAX_PATTERN_COMPLEXITY {
        suggestions.push(Suggestion {
            kind: SuggestionKind::Complexity,
            priority: Priority::Low,
            message: format!(
                "destructuring pattern of complexity {}; consider splitting it",
                complexity.destructuring.max_complexity
            ),
        });
    }
    if complexity.state.mutations > MAX_MUTATIONS {
        suggestions.push(Suggestion {
            kind: SuggestionKind::StateManagement,
            priority: Priority::Medium,
            message: format!(
                "{} state changes in one form; consider a single transaction or swap",
                complexity.state.mutations
            ),
        });
    }

    for occurrence in &idioms.occurrences {
        if let IdiomDetail::Threading {
            operator,
            step_count,
        } = &occurrence.detail
        {
            if *step_count > MAX_THREADING_STEPS {
                suggestions.push(Suggestion {
                    kind: SuggestionKind::Readability,
                    priority: Priority::Low,
                    message: format!(
                        "{} chain of {} steps at line {}; consider naming intermediate results",
                        operator,
                        step_count,
                        occurrence.range.start_line + 1
                    ),
                });
            }
        }
    }

    suggestions
}
