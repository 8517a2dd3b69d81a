//! `ns` clause parsing: `:require`, `:use` and `:import` in all their shapes.

use crate::sexp::{Sexp, SexpKind};
use cljscope_api::DependencySpec;

#[derive(Debug, Default)]
pub(crate) struct NsClauses {
    pub requires: Vec<DependencySpec>,
    pub imports: Vec<DependencySpec>,
}

pub(crate) fn parse_clauses(ns: &Sexp, source: &str) -> NsClauses {
    let mut clauses = NsClauses::default();
    for child in ns.children.iter().skip(2) {
        collect_clause(child, source, &mut clauses);
    }
    clauses
}

fn collect_clause(form: &Sexp, source: &str, out: &mut NsClauses) {
    match form.kind {
        // `#?(:clj (:require ...) :cljs (:require ...))`
        SexpKind::ReaderCond => {
            for branch in form.children.iter().skip(1).step_by(2) {
                collect_clause(branch, source, out);
            }
        }
        SexpKind::List | SexpKind::Vector => {
            let Some(directive) = form.children.first().and_then(|c| c.keyword(source)) else {
                return;
            };
            let args = &form.children[1..];
            match directive {
                ":require" | ":require-macros" => {
                    for arg in args {
                        collect_libspecs(arg, None, false, source, &mut out.requires);
                    }
                }
                ":use" | ":use-macros" => {
                    for arg in args {
                        collect_libspecs(arg, None, true, source, &mut out.requires);
                    }
                }
                ":import" => {
                    for arg in args {
                        collect_imports(arg, source, &mut out.imports);
                    }
                }
                _ => {}
            }
        }
        _ => {}
    }
}

fn qualify(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(p) => format!("{}.{}", p, name),
        None => name.to_string(),
    }
}

fn collect_libspecs(
    form: &Sexp,
    prefix: Option<&str>,
    is_use: bool,
    source: &str,
    out: &mut Vec<DependencySpec>,
) {
    match form.kind {
        SexpKind::Symbol => {
            let mut spec = DependencySpec::named(qualify(prefix, form.text(source)), form.text(source));
            spec.refer_all = is_use;
            out.push(spec);
        }
        SexpKind::Prefixed => {
            if let Some(inner) = form.children.first() {
                collect_libspecs(inner, prefix, is_use, source, out);
            }
        }
        SexpKind::Vector | SexpKind::List => {
            let Some(lib) = form.children.first().and_then(|c| c.symbol(source)) else {
                return;
            };
            let rest = &form.children[1..];
            let is_prefix_list = form.kind == SexpKind::List
                || rest.first().is_some_and(|r| r.kind != SexpKind::Keyword);
            if is_prefix_list {
                let full_prefix = qualify(prefix, lib);
                for item in rest {
                    collect_libspecs(item, Some(&full_prefix), is_use, source, out);
                }
                return;
            }

            let mut spec = DependencySpec::named(qualify(prefix, lib), form.text(source));
            let mut has_only = false;
            let mut i = 0;
            while i < rest.len() {
                let option = rest[i].keyword(source);
                let value = rest.get(i + 1);
                match (option, value) {
                    (Some(":as") | Some(":as-alias"), Some(v)) => {
                        spec.alias = v.symbol(source).map(str::to_string);
                    }
                    (Some(":refer") | Some(":only"), Some(v)) => {
                        has_only |= option == Some(":only");
                        if v.keyword(source) == Some(":all") {
                            spec.refer_all = true;
                        } else {
                            spec.refers.extend(
                                v.children
                                    .iter()
                                    .filter_map(|s| s.symbol(source))
                                    .map(str::to_string),
                            );
                        }
                    }
                    _ => {}
                }
                i += 2;
            }
            if is_use && !has_only {
                spec.refer_all = true;
            }
            out.push(spec);
        }
        _ => {}
    }
}

/// `java.util.Date` or `[java.util Date List]`: namespace is the package,
/// refers are the classes.
fn collect_imports(form: &Sexp, source: &str, out: &mut Vec<DependencySpec>) {
    match form.kind {
        SexpKind::Symbol => {
            let text = form.text(source);
            let spec = match text.rsplit_once('.') {
                Some((package, class)) if class.starts_with(char::is_uppercase) => DependencySpec {
                    namespace: package.to_string(),
                    refers: vec![class.to_string()],
                    raw: text.to_string(),
                    ..Default::default()
                },
                _ => DependencySpec::named(text, text),
            };
            out.push(spec);
        }
        SexpKind::Prefixed => {
            if let Some(inner) = form.children.first() {
                collect_imports(inner, source, out);
            }
        }
        SexpKind::Vector | SexpKind::List => {
            let Some(package) = form.children.first().and_then(|c| c.symbol(source)) else {
                return;
            };
            let mut spec = DependencySpec::named(package, form.text(source));
            spec.refers = form.children[1..]
                .iter()
                .filter_map(|c| c.symbol(source))
                .map(str::to_string)
                .collect();
            out.push(spec);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sexp::read;

    fn clauses(src: &str) -> NsClauses {
        parse_clauses(&read(src)[0], src)
    }

    #[test]
    fn test_libspec_shapes() {
        let c = clauses(
            "(ns app.core\n  (:require [clojure.string :as str]\n            [app.db :refer [query insert!]]\n            app.util\n            [clojure [set :as set] [walk]]))",
        );
        let names: Vec<&str> = c.requires.iter().map(|r| r.namespace.as_str()).collect();
        assert_eq!(
            names,
            vec!["clojure.string", "app.db", "app.util", "clojure.set", "clojure.walk"]
        );
        assert_eq!(c.requires[0].alias.as_deref(), Some("str"));
        assert_eq!(c.requires[1].refers, vec!["query", "insert!"]);
        assert_eq!(c.requires[3].alias.as_deref(), Some("set"));
        assert_eq!(c.requires[0].raw, "[clojure.string :as str]");
    }

    #[test]
    fn test_refer_all_and_use() {
        let c = clauses("(ns t (:require [clojure.test :refer :all]) (:use [a.b :only [x]] c.d))");
        assert!(c.requires[0].refer_all);
        assert!(!c.requires[1].refer_all);
        assert_eq!(c.requires[1].refers, vec!["x"]);
        assert!(c.requires[2].refer_all);
    }

    #[test]
    fn test_imports() {
        let c = clauses("(ns t (:import [java.util Date List] java.io.File (java.net URI)))");
        assert_eq!(c.imports.len(), 3);
        assert_eq!(c.imports[0].namespace, "java.util");
        assert_eq!(c.imports[0].refers, vec!["Date", "List"]);
        assert_eq!(c.imports[1].namespace, "java.io");
        assert_eq!(c.imports[1].refers, vec!["File"]);
        assert_eq!(c.imports[2].refers, vec!["URI"]);
    }

    #[test]
    fn test_reader_conditional_clauses() {
        let c = clauses("(ns t #?(:clj (:require [clj.only]) :cljs (:require [cljs.only])))");
        let names: Vec<&str> = c.requires.iter().map(|r| r.namespace.as_str()).collect();
        assert_eq!(names, vec!["clj.only", "cljs.only"]);
    }
}
