mod common;

use cljscope_api::{AnalysisError, ClojureAnalysis, Confidence, TypeKind, Visibility};
use common::{analyzer, buffer};

#[test]
fn test_adjacent_private_definitions() {
    let functions = analyzer()
        .extract_functions(&buffer("(defn- a [x] x)(defn- b [y] y)"), None)
        .unwrap();
    let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(functions.iter().all(|f| f.visibility == Visibility::Private));
}

#[test]
fn test_glob_selects_private_tools() {
    let mut src = String::new();
    for c in 'a'..='p' {
        src.push_str(&format!("(defn- tool-{} [args] (run args))\n", c));
    }
    for name in ["helper", "main", "parse-args", "tools", "run-tool"] {
        src.push_str(&format!("(defn {} [x] x)\n", name));
    }
    let analyzer = analyzer();
    let buffer = buffer(&src);

    assert_eq!(analyzer.extract_functions(&buffer, None).unwrap().len(), 21);

    let tools = analyzer.extract_functions(&buffer, Some("tool-*")).unwrap();
    assert_eq!(tools.len(), 16);
    assert!(tools.iter().all(|f| f.is_private()));
    assert_eq!(tools[0].name, "tool-a");
    assert_eq!(tools[15].name, "tool-p");

    let single = analyzer.extract_functions(&buffer, Some("tool-?")).unwrap();
    assert_eq!(single.len(), 16);
    assert!(analyzer
        .extract_functions(&buffer, Some("Tool-*"))
        .unwrap()
        .is_empty());
}

#[test]
fn test_invalid_pattern_is_an_error() {
    let err = analyzer()
        .extract_functions(&buffer("(defn f [] 1)"), Some("tool-("))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidPattern { .. }));
}

#[test]
fn test_multi_arity_function() {
    let src = r#"(defn greet
  "Says hello."
  ([] (greet "world"))
  ([name] (str "Hello, " name)))"#;
    let functions = analyzer().extract_functions(&buffer(src), None).unwrap();
    assert_eq!(functions.len(), 1);
    let greet = &functions[0];
    assert_eq!(greet.arities, vec!["[]", "[name]"]);
    assert!(greet.is_multi_arity());
    assert_eq!(greet.docstring.as_deref(), Some("Says hello."));
    assert_eq!(greet.confidence, Confidence::High);
}

#[test]
fn test_private_metadata() {
    let src = "(defn ^:private hidden [] 1)\n(defn ^{:private true} also-hidden [] 2)\n(defn shown [] 3)";
    let functions = analyzer().extract_functions(&buffer(src), None).unwrap();
    let visibility: Vec<(&str, Visibility)> = functions
        .iter()
        .map(|f| (f.name.as_str(), f.visibility))
        .collect();
    assert_eq!(
        visibility,
        vec![
            ("hidden", Visibility::Private),
            ("also-hidden", Visibility::Private),
            ("shown", Visibility::Public),
        ]
    );
}

#[test]
fn test_namespace_with_alias() {
    let ns = analyzer()
        .extract_namespace(&buffer("(ns my.ns (:require [a.b :as c]))"))
        .unwrap()
        .unwrap();
    assert_eq!(ns.name, "my.ns");
    assert_eq!(ns.required_namespaces(), vec!["a.b"]);
    assert_eq!(ns.requires[0].alias.as_deref(), Some("c"));
}

#[test]
fn test_namespace_clause_shapes() {
    let src = r#"(ns app.core
  "Entry point."
  (:require [clojure.string :as str :refer [join]]
            clojure.set
            (clojure [walk] [edn :as edn]))
  (:import [java.util Date UUID]
           java.io.File))

(defn run [] (str/join "," []))
(defn- helper [] nil)"#;
    let ns = analyzer()
        .extract_namespace(&buffer(src))
        .unwrap()
        .unwrap();
    assert_eq!(ns.docstring.as_deref(), Some("Entry point."));
    assert_eq!(
        ns.required_namespaces(),
        vec!["clojure.string", "clojure.set", "clojure.walk", "clojure.edn"]
    );
    assert_eq!(ns.requires[0].refers, vec!["join"]);
    assert_eq!(ns.imported_names(), vec!["java.util", "java.io"]);
    assert_eq!(ns.imports[0].refers, vec!["Date", "UUID"]);
    assert_eq!(ns.defined_symbols, vec!["run", "helper"]);
}

#[test]
fn test_functions_carry_their_namespace() {
    let src = "(ns first.ns)\n(defn a [] 1)\n(ns second.ns)\n(defn b [] 2)";
    let analyzer = analyzer();
    let buffer = buffer(src);
    let functions = analyzer.extract_functions(&buffer, None).unwrap();
    assert_eq!(functions[0].namespace.as_deref(), Some("first.ns"));
    assert_eq!(functions[1].namespace.as_deref(), Some("second.ns"));

    let namespaces = analyzer.extract_namespaces(&buffer).unwrap();
    assert_eq!(namespaces.len(), 2);
    assert_eq!(namespaces[0].defined_symbols, vec!["a"]);
    assert_eq!(namespaces[1].defined_symbols, vec!["b"]);
}

#[test]
fn test_no_namespace() {
    assert!(analyzer()
        .extract_namespace(&buffer("(defn f [] 1)"))
        .unwrap()
        .is_none());
}

#[test]
fn test_macros() {
    let src = "(defmacro unless \"Inverse when.\" [test & body] `(when-not ~test ~@body))\n(defn f [] 1)";
    let macros = analyzer().extract_macros(&buffer(src), None).unwrap();
    assert_eq!(macros.len(), 1);
    assert_eq!(macros[0].name, "unless");
    assert_eq!(macros[0].arities, vec!["[test & body]"]);
    assert_eq!(macros[0].docstring.as_deref(), Some("Inverse when."));
}

#[test]
fn test_protocols_and_records() {
    let src = r#"(defprotocol Shape
  "Plane figures."
  (area [s] "Surface.")
  (scale [s k]))

(defrecord Circle [r]
  Shape
  (area [_] (* 3.14 r r))
  (scale [_ k] (->Circle (* r k))))"#;
    let types = analyzer().extract_types(&buffer(src), None).unwrap();
    assert_eq!(types.len(), 2);

    let shape = &types[0];
    assert_eq!(shape.kind, TypeKind::Protocol);
    assert_eq!(shape.docstring.as_deref(), Some("Plane figures."));
    let methods: Vec<&str> = shape.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(methods, vec!["area", "scale"]);
    assert_eq!(shape.methods[0].docstring.as_deref(), Some("Surface."));

    let circle = &types[1];
    assert_eq!(circle.kind, TypeKind::Record);
    assert_eq!(circle.fields, vec!["r"]);
    assert_eq!(circle.protocols, vec!["Shape"]);
    assert_eq!(circle.methods[1].arities, vec!["[_ k]"]);
    assert_eq!(circle.methods[1].protocol.as_deref(), Some("Shape"));
}

#[test]
fn test_call_graph() {
    let src = r#"(defn parse [s] (clojure.string/split s #","))
(defn total [s] (reduce + (map parse-long (parse s))))
(defn report [s] (let [t (total s)] (println t) (total s)))"#;
    let analyzer = analyzer();
    let buffer = buffer(src);

    let graph = analyzer.trace_calls(&buffer, None).unwrap();
    let report = graph.functions.iter().find(|f| f.name == "report").unwrap();
    assert_eq!(report.calls, vec!["total", "println"]);
    assert_eq!(report.complexity, 3);

    let total = graph.functions.iter().find(|f| f.name == "total").unwrap();
    assert_eq!(total.calls, vec!["reduce", "map", "parse"]);
    assert_eq!(total.called_by, vec!["report"]);
    assert_eq!(total.complexity, 3);

    let edge = graph
        .edges
        .iter()
        .find(|e| e.caller == "report" && e.callee == "total")
        .unwrap();
    assert_eq!(edge.sites.len(), 2);

    let focused = analyzer.trace_calls(&buffer, Some("parse")).unwrap();
    assert_eq!(focused.functions.len(), 1);
    assert_eq!(focused.edges.len(), 1);

    let missing = analyzer.trace_calls(&buffer, Some("nope")).unwrap_err();
    assert!(matches!(missing, AnalysisError::NotFound(_)));
}
