mod common;

use cljscope_api::{
    Cursor, Delimiter, Direction, FormContext, FormKind, IdiomKind, NavOutcome, SexpNavigation,
    SuggestionKind,
};
use common::{analyzer, buffer};

#[test]
fn test_empty_buffer_is_out_of_bounds() {
    let analyzer = analyzer();
    let empty = buffer("");
    let outcome = analyzer
        .locate_enclosing_form(&empty, Cursor::new(0, 0))
        .unwrap();
    assert!(matches!(outcome, NavOutcome::OutOfBounds { .. }));
    assert!(analyzer
        .navigate(&empty, Cursor::new(0, 0), Direction::Next)
        .unwrap()
        .is_out_of_bounds());
    assert!(analyzer
        .find_matching_delimiter(&empty, Cursor::new(0, 0))
        .unwrap()
        .is_out_of_bounds());
}

#[test]
fn test_cursor_is_never_clamped() {
    let analyzer = analyzer();
    let buffer = buffer("(defn f [x] x)");
    assert!(analyzer
        .locate_enclosing_form(&buffer, Cursor::new(0, 40))
        .unwrap()
        .is_out_of_bounds());
    assert!(analyzer
        .locate_enclosing_form(&buffer, Cursor::new(3, 0))
        .unwrap()
        .is_out_of_bounds());
}

#[test]
fn test_single_form_is_innermost_and_outermost() {
    let analyzer = analyzer();
    let buffer = buffer("(defn f [x] x)");
    let chain = analyzer
        .locate_enclosing_form(&buffer, Cursor::new(0, 2))
        .unwrap()
        .located()
        .unwrap();
    assert_eq!(chain.forms.len(), 1);
    assert_eq!(chain.innermost(), chain.outermost());

    let definition = chain.definition.unwrap();
    assert_eq!(definition.record_kind, Some(FormKind::FunctionDef));
    assert_eq!(definition.record_name.as_deref(), Some("f"));
}

#[test]
fn test_chain_reports_enclosing_definition() {
    let src = "(ns demo)\n\n(defn handler [req]\n  (let [{:keys [body]} req]\n    (process body)))";
    let analyzer = analyzer();
    let chain = analyzer
        .locate_enclosing_form(&buffer(src), Cursor::new(4, 6))
        .unwrap()
        .located()
        .unwrap();
    let delimiters: Vec<Delimiter> = chain.forms.iter().map(|f| f.delimiter).collect();
    assert_eq!(
        delimiters,
        vec![Delimiter::List, Delimiter::List, Delimiter::List]
    );
    assert_eq!(chain.forms[0].head.as_deref(), Some("process"));
    assert_eq!(
        chain.definition.and_then(|d| d.record_name).as_deref(),
        Some("handler")
    );
}

#[test]
fn test_navigate_between_top_level_forms() {
    let src = "(ns demo)\n(defn a [] 1)\n(defn b [] 2)";
    let analyzer = analyzer();
    let buffer = buffer(src);

    let next = analyzer
        .navigate(&buffer, Cursor::new(1, 1), Direction::Next)
        .unwrap()
        .located()
        .unwrap();
    assert!(next.moved);
    assert_eq!(next.target, Some(Cursor::new(2, 0)));
    assert_eq!(
        next.chain.definition.and_then(|d| d.record_name).as_deref(),
        Some("b")
    );

    let last = analyzer
        .navigate(&buffer, Cursor::new(2, 1), Direction::Next)
        .unwrap()
        .located()
        .unwrap();
    assert!(!last.moved);
    assert_eq!(last.target, None);
}

#[test]
fn test_matching_delimiter_both_ways() {
    let src = "(defn f [x] (inc x))";
    let analyzer = analyzer();
    let buffer = buffer(src);

    let from_open = analyzer
        .find_matching_delimiter(&buffer, Cursor::new(0, 0))
        .unwrap()
        .located()
        .flatten()
        .unwrap();
    assert_eq!(from_open.partner, Some(Cursor::new(0, 19)));

    let from_close = analyzer
        .find_matching_delimiter(&buffer, Cursor::new(0, 18))
        .unwrap()
        .located()
        .flatten()
        .unwrap();
    assert_eq!(from_close.partner, Some(Cursor::new(0, 12)));
}

#[test]
fn test_unterminated_form_has_no_partner() {
    let analyzer = analyzer();
    let matched = analyzer
        .find_matching_delimiter(&buffer("(defn f [x]\n  (inc x)"), Cursor::new(0, 0))
        .unwrap()
        .located()
        .flatten()
        .unwrap();
    assert_eq!(matched.close, None);
    assert_eq!(matched.partner, None);
}

#[test]
fn test_inspect_form_in_namespace() {
    let src = "(ns demo.shapes)\n\n(defn area [{:keys [w h]}]\n  (* w h))\n";
    let analyzer = analyzer();
    let buffer = buffer(src);

    let inspection = analyzer
        .inspect_form(&buffer, Cursor::new(2, 11))
        .unwrap()
        .located()
        .unwrap()
        .unwrap();
    assert_eq!(inspection.context, FormContext::VectorLiteral);
    assert_eq!(inspection.namespace.unwrap().name, "demo.shapes");
    assert_eq!(inspection.function.unwrap().name, "area");
    assert_eq!(inspection.navigation.parent, Some(Cursor::new(2, 0)));
    assert_eq!(inspection.navigation.first_child, Some(Cursor::new(2, 12)));
    assert!(inspection.suggestions.is_empty());

    let definition = analyzer
        .inspect_form(&buffer, Cursor::new(2, 2))
        .unwrap()
        .located()
        .unwrap()
        .unwrap();
    assert_eq!(definition.idioms.count(IdiomKind::Destructuring), 1);
    assert_eq!(definition.suggestions[0].kind, SuggestionKind::Documentation);
    assert_eq!(definition.navigation.previous, Some(Cursor::new(0, 0)));
}

#[test]
fn test_inspect_form_out_of_bounds() {
    let outcome = analyzer()
        .inspect_form(&buffer("(a)"), Cursor::new(3, 0))
        .unwrap();
    assert!(outcome.is_out_of_bounds());
}
