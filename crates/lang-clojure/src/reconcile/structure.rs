use crate::sexp::{Sexp, SexpKind};
use cljscope_api::models::util::unquote;
use cljscope_api::{FormKind, Span};

/// Inner fields of a definition form, read from its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Structure {
    pub name: Option<String>,
    pub name_span: Option<Span>,
    pub private_meta: bool,
    pub docstring: Option<String>,
    pub parameter_shapes: Vec<String>,
    /// Spans of the children the fields were read from.
    pub field_spans: Vec<Span>,
}

impl Structure {
    /// Reads `(keyword name doc? attr-map? params-or-arities ...)`.
    ///
    /// A string counts as a docstring only when it comes before the parameters,
    /// so `(defn f [] "x")` has no docstring.
    pub fn from_list(list: &Sexp, kind: FormKind, source: &str) -> Self {
        let mut structure = Structure::default();
        let children = &list.children;

        let mut rest = match children.get(1) {
            Some(name) if name.is_symbol() => {
                structure.name = Some(name.text(source).to_string());
                structure.name_span = Some(name.span);
                structure.private_meta = name.has_private_meta(source);
                structure.field_spans.push(name.span);
                &children[2..]
            }
            _ => children.get(1..).unwrap_or(&[]),
        };

        let takes_params = matches!(kind, FormKind::FunctionDef | FormKind::MacroDef);
        if let Some(first) = rest.first() {
            if first.kind == SexpKind::Str && (rest.len() > 1 || !takes_params) {
                structure.docstring = Some(unquote(first.text(source)).to_string());
                structure.field_spans.push(first.span);
                rest = &rest[1..];
            }
        }

        if !takes_params {
            return structure;
        }

        if rest.first().is_some_and(|f| f.kind == SexpKind::Map) {
            rest = &rest[1..];
        }

        match rest.first() {
            Some(params) if params.kind == SexpKind::Vector => {
                structure.parameter_shapes.push(params.text(source).to_string());
                structure.field_spans.push(params.span);
            }
            _ => {
                for arity in rest {
                    let Some(params) = arity_params(arity) else {
                        break;
                    };
                    structure.parameter_shapes.push(params.text(source).to_string());
                    structure.field_spans.push(params.span);
                }
            }
        }

        structure
    }

    pub fn lies_within(&self, span: Span) -> bool {
        self.field_spans.iter().all(|s| span.encloses(s))
    }
}

/// Parameter vector of an arity body `([params] body...)`.
pub(crate) fn arity_params(form: &Sexp) -> Option<&Sexp> {
    if form.kind != SexpKind::List {
        return None;
    }
    form.children.first().filter(|p| p.kind == SexpKind::Vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::read;

    fn structure_of(src: &str, kind: FormKind) -> Structure {
        Structure::from_list(&read(src)[0], kind, src)
    }

    #[test]
    fn test_docstring_and_params() {
        let s = structure_of("(defn f \"Adds.\" [a b] (+ a b))", FormKind::FunctionDef);
        assert_eq!(s.name.as_deref(), Some("f"));
        assert_eq!(s.docstring.as_deref(), Some("Adds."));
        assert_eq!(s.parameter_shapes, vec!["[a b]"]);
    }

    #[test]
    fn test_string_after_params_is_body() {
        let s = structure_of("(defn f [] \"hello\")", FormKind::FunctionDef);
        assert_eq!(s.docstring, None);
        assert_eq!(s.parameter_shapes, vec!["[]"]);
    }

    #[test]
    fn test_attr_map_and_multi_arity() {
        let s = structure_of(
            "(defn g \"doc\" {:added \"1.0\"} ([x] x) ([x y] (+ x y)))",
            FormKind::FunctionDef,
        );
        assert_eq!(s.docstring.as_deref(), Some("doc"));
        assert_eq!(s.parameter_shapes, vec!["[x]", "[x y]"]);
    }

    #[test]
    fn test_namespace_docstring_without_clauses() {
        let s = structure_of("(ns my.ns \"Top doc.\")", FormKind::NamespaceDecl);
        assert_eq!(s.docstring.as_deref(), Some("Top doc."));
        assert!(s.parameter_shapes.is_empty());
    }

    #[test]
    fn test_missing_name() {
        let s = structure_of("(defn [x] x)", FormKind::FunctionDef);
        assert_eq!(s.name, None);
        assert_eq!(s.parameter_shapes, vec!["[x]"]);
    }

    #[test]
    fn test_type_hinted_params_strip_metadata() {
        let s = structure_of("(defn ^String h ^String [^long n] (str n))", FormKind::FunctionDef);
        assert_eq!(s.name.as_deref(), Some("h"));
        assert_eq!(s.parameter_shapes, vec!["[^long n]"]);
    }
}
