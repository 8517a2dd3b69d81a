use super::{Found, Scope, core_head};
use crate::lexer::unqualified;
use crate::sexp::{Sexp, SexpKind};
use cljscope_api::{DestructuringShape, IdiomDetail};

const BINDING_FORMS: &[&str] = &[
    "let", "loop", "for", "doseq", "when-let", "if-let", "when-some", "if-some", "binding",
    "with-open", "dotimes",
];

const FN_FORMS: &[&str] = &["defn", "defn-", "defmacro", "fn", "fn*"];

pub(super) fn detect(scope: &Scope, form: &Sexp, found: &mut Vec<Found>) {
    let Some(head) = core_head(form, scope.source).map(unqualified) else {
        return;
    };
    if BINDING_FORMS.contains(&head) {
        if let Some(bindings) = form.args().first().filter(|b| b.kind == SexpKind::Vector) {
            binding_vector(scope, head, bindings, found);
        }
    } else if FN_FORMS.contains(&head) {
        for params in fn_parameter_vectors(form) {
            for param in &params.children {
                pattern(scope, head, param, found);
            }
        }
    }
}

/// `[pattern expr pattern expr ...]`, with `for`/`doseq` modifiers.
fn binding_vector(scope: &Scope, context: &str, bindings: &Sexp, found: &mut Vec<Found>) {
    for pair in bindings.children.chunks(2) {
        let target = &pair[0];
        match target.keyword(scope.source) {
            Some(":let") => {
                if let Some(inner) = pair.get(1).filter(|v| v.kind == SexpKind::Vector) {
                    binding_vector(scope, context, inner, found);
                }
            }
            Some(_) => {}
            None => pattern(scope, context, target, found),
        }
    }
}

/// Parameter vectors of every arity of a function form.
fn fn_parameter_vectors(form: &Sexp) -> Vec<&Sexp> {
    let mut vectors = Vec::new();
    for arg in form.args() {
        match arg.kind {
            SexpKind::Vector => {
                vectors.push(arg);
                break;
            }
            SexpKind::List => {
                if let Some(params) = arg.children.first().filter(|p| p.kind == SexpKind::Vector) {
                    vectors.push(params);
                }
            }
            _ => {}
        }
    }
    vectors
}

fn pattern(scope: &Scope, context: &str, target: &Sexp, found: &mut Vec<Found>) {
    let detail = match target.kind {
        SexpKind::Map => map_pattern(scope.source, context, target),
        SexpKind::Vector => vector_pattern(scope.source, context, target),
        _ => return,
    };
    found.push((target.span, detail));
}

fn map_pattern(source: &str, context: &str, map: &Sexp) -> IdiomDetail {
    let mut key_style = None;
    let mut bindings = Vec::new();
    let mut as_binding = None;
    let mut nested = false;

    for pair in map.children.chunks(2) {
        let [key, value] = pair else {
            continue;
        };
        match key.keyword(source) {
            Some(":as") => as_binding = value.symbol(source).map(str::to_string),
            Some(":or") => {}
            Some(k) if matches!(unqualified(k.trim_start_matches(':')), "keys" | "strs" | "syms") => {
                key_style.get_or_insert_with(|| k.to_string());
                bindings.extend(value.children.iter().map(|b| {
                    unqualified(b.text(source).trim_start_matches(':')).to_string()
                }));
            }
            _ => {
                nested |= is_pattern(key);
                bindings.extend(binding_names(source, key));
            }
        }
    }

    IdiomDetail::Destructuring {
        context: context.to_string(),
        shape: DestructuringShape::Map,
        key_style,
        bindings,
        has_rest: false,
        as_binding,
        nested,
    }
}

fn vector_pattern(source: &str, context: &str, vector: &Sexp) -> IdiomDetail {
    let mut bindings = Vec::new();
    let mut has_rest = false;
    let mut as_binding = None;
    let mut nested = false;

    let mut elements = vector.children.iter();
    while let Some(element) = elements.next() {
        if element.symbol(source) == Some("&") {
            has_rest = true;
            continue;
        }
        if element.keyword(source) == Some(":as") {
            as_binding = elements
                .next()
                .and_then(|s| s.symbol(source))
                .map(str::to_string);
            continue;
        }
        nested |= is_pattern(element);
        bindings.extend(binding_names(source, element));
    }

    IdiomDetail::Destructuring {
        context: context.to_string(),
        shape: DestructuringShape::Vector,
        key_style: None,
        bindings,
        has_rest,
        as_binding,
        nested,
    }
}

fn is_pattern(target: &Sexp) -> bool {
    matches!(target.kind, SexpKind::Map | SexpKind::Vector)
}

/// Symbols bound by a nested pattern, in order.
fn binding_names(source: &str, target: &Sexp) -> Vec<String> {
    match target.kind {
        SexpKind::Symbol => {
            let name = target.text(source);
            if name == "&" {
                Vec::new()
            } else {
                vec![name.to_string()]
            }
        }
        SexpKind::Map | SexpKind::Vector => {
            let nested = if target.kind == SexpKind::Map {
                map_pattern(source, "", target)
            } else {
                vector_pattern(source, "", target)
            };
            match nested {
                IdiomDetail::Destructuring {
                    mut bindings,
                    as_binding,
                    ..
                } => {
                    bindings.extend(as_binding);
                    bindings
                }
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}
