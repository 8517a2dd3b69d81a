use super::{Found, Scope, core_head};
use crate::lexer::{qualifier, unqualified};
use crate::sexp::Sexp;
use cljscope_api::{ConcurrencyCategory, IdiomDetail, StateCategory};

/// Operation, category, and whether it changes state in place.
const STATE_OPERATIONS: &[(&str, StateCategory, bool)] = &[
    ("atom", StateCategory::Atom, false),
    ("swap!", StateCategory::Atom, true),
    ("swap-vals!", StateCategory::Atom, true),
    ("reset!", StateCategory::Atom, true),
    ("reset-vals!", StateCategory::Atom, true),
    ("compare-and-set!", StateCategory::Atom, true),
    ("add-watch", StateCategory::Atom, false),
    ("ref", StateCategory::Ref, false),
    ("dosync", StateCategory::Ref, false),
    ("alter", StateCategory::Ref, true),
    ("ref-set", StateCategory::Ref, true),
    ("commute", StateCategory::Ref, true),
    ("ensure", StateCategory::Ref, false),
    ("agent", StateCategory::Agent, false),
    ("send", StateCategory::Agent, true),
    ("send-off", StateCategory::Agent, true),
    ("send-via", StateCategory::Agent, true),
    ("await", StateCategory::Agent, false),
    ("await-for", StateCategory::Agent, false),
    ("restart-agent", StateCategory::Agent, true),
    ("set-error-handler!", StateCategory::Agent, true),
    ("set-error-mode!", StateCategory::Agent, true),
    ("alter-var-root", StateCategory::Var, true),
    ("with-redefs", StateCategory::Var, false),
    ("binding", StateCategory::Var, false),
    ("set!", StateCategory::Var, true),
    ("volatile!", StateCategory::Volatile, false),
    ("vreset!", StateCategory::Volatile, true),
    ("vswap!", StateCategory::Volatile, true),
    ("promise", StateCategory::Promise, false),
    ("deliver", StateCategory::Promise, true),
    ("delay", StateCategory::Promise, false),
    ("force", StateCategory::Promise, false),
    ("transient", StateCategory::Transient, false),
    ("persistent!", StateCategory::Transient, false),
    ("conj!", StateCategory::Transient, true),
    ("assoc!", StateCategory::Transient, true),
    ("dissoc!", StateCategory::Transient, true),
    ("disj!", StateCategory::Transient, true),
    ("pop!", StateCategory::Transient, true),
];

const ASYNC_OPERATIONS: &[(&str, ConcurrencyCategory)] = &[
    ("go", ConcurrencyCategory::Block),
    ("go-loop", ConcurrencyCategory::Block),
    ("thread", ConcurrencyCategory::Block),
    ("chan", ConcurrencyCategory::Channel),
    ("promise-chan", ConcurrencyCategory::Channel),
    ("buffer", ConcurrencyCategory::Channel),
    ("dropping-buffer", ConcurrencyCategory::Channel),
    ("sliding-buffer", ConcurrencyCategory::Channel),
    ("timeout", ConcurrencyCategory::Channel),
    ("close!", ConcurrencyCategory::Channel),
    (">!", ConcurrencyCategory::Io),
    (">!!", ConcurrencyCategory::Io),
    ("<!", ConcurrencyCategory::Io),
    ("<!!", ConcurrencyCategory::Io),
    ("put!", ConcurrencyCategory::Io),
    ("take!", ConcurrencyCategory::Io),
    ("offer!", ConcurrencyCategory::Io),
    ("poll!", ConcurrencyCategory::Io),
    ("alt!", ConcurrencyCategory::Selection),
    ("alt!!", ConcurrencyCategory::Selection),
    ("alts!", ConcurrencyCategory::Selection),
    ("alts!!", ConcurrencyCategory::Selection),
    ("pipe", ConcurrencyCategory::Utility),
    ("pipeline", ConcurrencyCategory::Utility),
    ("pipeline-async", ConcurrencyCategory::Utility),
    ("pipeline-blocking", ConcurrencyCategory::Utility),
    ("mult", ConcurrencyCategory::Utility),
    ("tap", ConcurrencyCategory::Utility),
    ("untap", ConcurrencyCategory::Utility),
    ("pub", ConcurrencyCategory::Utility),
    ("sub", ConcurrencyCategory::Utility),
    ("unsub", ConcurrencyCategory::Utility),
    ("mix", ConcurrencyCategory::Utility),
    ("admix", ConcurrencyCategory::Utility),
    ("split", ConcurrencyCategory::Utility),
    ("merge", ConcurrencyCategory::Utility),
    ("onto-chan!", ConcurrencyCategory::Utility),
    ("to-chan!", ConcurrencyCategory::Utility),
];

/// clojure.core concurrency, recognized without any require.
const CORE_CONCURRENCY: &[(&str, ConcurrencyCategory)] = &[
    ("future", ConcurrencyCategory::Future),
    ("future-call", ConcurrencyCategory::Future),
    ("pmap", ConcurrencyCategory::Future),
    ("pcalls", ConcurrencyCategory::Future),
    ("pvalues", ConcurrencyCategory::Future),
];

/// core.async names that collide with clojure.core or common locals; they only
/// count when they resolve to core.async.
const AMBIGUOUS: &[&str] = &[
    "thread", "buffer", "timeout", "pipe", "tap", "pub", "sub", "mix", "split", "merge",
];

pub(super) fn detect_state(scope: &Scope, form: &Sexp, found: &mut Vec<Found>) {
    let Some(operation) = core_head(form, scope.source).map(unqualified) else {
        return;
    };
    let Some((_, category, mutates)) = STATE_OPERATIONS.iter().find(|(op, ..)| *op == operation)
    else {
        return;
    };
    found.push((
        form.span,
        IdiomDetail::StateMutation {
            operation: operation.to_string(),
            category: *category,
            mutates: *mutates,
        },
    ));
}

pub(super) fn detect_concurrency(scope: &Scope, form: &Sexp, found: &mut Vec<Found>) {
    let Some(head) = form.head(scope.source) else {
        return;
    };
    let operation = unqualified(head);

    let category = if let Some((_, category)) = core_head(form, scope.source)
        .and_then(|_| CORE_CONCURRENCY.iter().find(|(op, _)| *op == operation))
    {
        *category
    } else {
        let Some((_, category)) = ASYNC_OPERATIONS.iter().find(|(op, _)| *op == operation) else {
            return;
        };
        // Qualified heads must name a required async namespace; bare heads
        // only need resolving when the name is ambiguous.
        let resolves = if qualifier(head).is_some() || AMBIGUOUS.contains(&operation) {
            scope.is_async(head)
        } else {
            true
        };
        if !resolves {
            return;
        }
        *category
    };

    found.push((
        form.span,
        IdiomDetail::Concurrency {
            operation: operation.to_string(),
            category,
        },
    ));
}
