use super::{Found, Scope, core_head};
use crate::lexer::unqualified;
use crate::sexp::Sexp;
use cljscope_api::IdiomDetail;

/// Number of threaded steps, given the number of forms after the operator.
fn step_count(operator: &str, args: usize) -> Option<usize> {
    match operator {
        "->" | "->>" | "some->" | "some->>" => Some(args.saturating_sub(1)),
        // (as-> expr name step...)
        "as->" => Some(args.saturating_sub(2)),
        // (cond-> expr test step test step...)
        "cond->" | "cond->>" => Some(args.saturating_sub(1) / 2),
        _ => None,
    }
}

pub(super) fn detect(scope: &Scope, form: &Sexp, found: &mut Vec<Found>) {
    let Some(head) = core_head(form, scope.source) else {
        return;
    };
    let operator = unqualified(head);
    let Some(step_count) = step_count(operator, form.args().len()) else {
        return;
    };
    found.push((
        form.span,
        IdiomDetail::Threading {
            operator: operator.to_string(),
            step_count,
        },
    ));
}
