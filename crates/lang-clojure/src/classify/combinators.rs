use super::{Found, Scope, core_head};
use crate::lexer::unqualified;
use crate::sexp::{Sexp, SexpKind};
use cljscope_api::IdiomDetail;

const COMPOSERS: &[&str] = &[
    "comp",
    "partial",
    "juxt",
    "every-pred",
    "some-fn",
    "fnil",
    "complement",
];

const CONDITIONAL_BINDERS: &[&str] = &["when-let", "if-let", "when-some", "if-some", "when-first"];

pub(super) fn detect_composition(scope: &Scope, form: &Sexp, found: &mut Vec<Found>) {
    let Some(operator) = core_head(form, scope.source).map(unqualified) else {
        return;
    };
    if !COMPOSERS.contains(&operator) {
        return;
    }
    found.push((
        form.span,
        IdiomDetail::Composition {
            operator: operator.to_string(),
            arg_count: form.args().len(),
        },
    ));
}

pub(super) fn detect_conditional(scope: &Scope, form: &Sexp, found: &mut Vec<Found>) {
    let Some(operator) = core_head(form, scope.source).map(unqualified) else {
        return;
    };
    if !CONDITIONAL_BINDERS.contains(&operator) {
        return;
    }
    let binding = form
        .args()
        .first()
        .filter(|b| b.kind == SexpKind::Vector)
        .and_then(|b| b.children.first())
        .map(|target| target.text(scope.source).to_string());
    found.push((
        form.span,
        IdiomDetail::ConditionalBinding {
            operator: operator.to_string(),
            binding,
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
            detector(&scope, &form, &mut found);
        }
        found.into_iter().map(|(_, d)| d).collect()
    }

    #[test]
    fn test_composition() {
        let found = run(detect_composition, "(comp inc dec) (partial + 1) (map inc xs)");
        assert_eq!(
            found,
            vec![
                IdiomDetail::Composition {
                    operator: "comp".to_string(),
                    arg_count: 2
                },
                IdiomDetail::Composition {
                    operator: "partial".to_string(),
                    arg_count: 2
                },
            ]
        );
    }

    #[test]
    fn test_conditional_binding_target() {
        let found = run(detect_conditional, "(when-let [{:keys [a]} (f)] a) (if-some [x y] x 0)");
        assert_eq!(
            found,
            vec![
                IdiomDetail::ConditionalBinding {
                    operator: "when-let".to_string(),
                    binding: Some("{:keys [a]}".to_string())
                },
                IdiomDetail::ConditionalBinding {
                    operator: "if-some".to_string(),
                    binding: Some("x".to_string())
                },
            ]
        );
    }
}
