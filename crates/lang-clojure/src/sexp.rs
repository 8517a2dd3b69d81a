//! A minimal s-expression model shared by the tree-backed and the lexical paths.
//!
//! Both builders drop `#_` discarded forms and comments, attach `^` metadata to
//! the form it annotates, and give every form a span that excludes that
//! metadata, so `text()` of a symbol is its bare name.

use crate::lexer::{self, Lexeme, Token};
use cljscope_api::Span;
use cljscope_core::parser::utils::span_of;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SexpKind {
    List,
    Vector,
    Map,
    Set,
    AnonFn,
    ReaderCond,
    Symbol,
    Keyword,
    Str,
    Regex,
    Number,
    Char,
    /// A reader macro applied to `children[0]`, e.g. `'x` or `@state`.
    Prefixed,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sexp {
    pub kind: SexpKind,
    pub span: Span,
    pub children: Vec<Sexp>,
    /// Metadata values, `^:private` contributes the `:private` keyword.
    pub meta: Vec<Sexp>,
    /// False for collections that run to the end of the input.
    pub closed: bool,
}

impl Sexp {
    fn leaf(kind: SexpKind, span: Span) -> Self {
        Self {
            kind,
            span,
            children: Vec::new(),
            meta: Vec::new(),
            closed: true,
        }
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.start..self.span.end).unwrap_or("")
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self.kind,
            SexpKind::List
                | SexpKind::Vector
                | SexpKind::Map
                | SexpKind::Set
                | SexpKind::AnonFn
                | SexpKind::ReaderCond
        )
    }

    pub fn is_symbol(&self) -> bool {
        self.kind == SexpKind::Symbol
    }

    pub fn symbol<'s>(&self, source: &'s str) -> Option<&'s str> {
        self.is_symbol().then(|| self.text(source))
    }

    pub fn keyword<'s>(&self, source: &'s str) -> Option<&'s str> {
        (self.kind == SexpKind::Keyword).then(|| self.text(source))
    }

    /// First symbol of a list-like form.
    pub fn head<'s>(&self, source: &'s str) -> Option<&'s str> {
        if !matches!(self.kind, SexpKind::List | SexpKind::AnonFn) {
            return None;
        }
        self.children.first().and_then(|c| c.symbol(source))
    }

    /// Forms after the head.
    pub fn args(&self) -> &[Sexp] {
        self.children.get(1..).unwrap_or(&[])
    }

    /// `^:private` or `^{:private true}`.
    pub fn has_private_meta(&self, source: &str) -> bool {
        self.meta.iter().any(|m| match m.kind {
            SexpKind::Keyword => m.text(source) == ":private",
            SexpKind::Map => m.children.chunks(2).any(|pair| {
                pair.len() == 2
                    && pair[0].keyword(source) == Some(":private")
                    && pair[1].text(source) == "true"
            }),
            _ => false,
        })
    }

    /// Depth-first walk over this form and everything nested in it.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Sexp)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Reads every form in `source`.
pub fn read(source: &str) -> Vec<Sexp> {
    Reader::new(lexer::tokenize(source)).read_all(source.len())
}

/// Reads the forms inside `span`, with offsets relative to the whole source.
pub fn read_span(source: &str, span: Span) -> Vec<Sexp> {
    Reader::new(lexer::tokenize_span(source, span)).read_all(span.end)
}

struct Reader {
    tokens: Vec<Lexeme>,
    pos: usize,
}

impl Reader {
    fn new(tokens: Vec<Lexeme>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn read_all(&mut self, end: usize) -> Vec<Sexp> {
        let mut forms = Vec::new();
        while self.pos < self.tokens.len() {
            // Stray closers at the top level are skipped.
            if self.tokens[self.pos].token.closer().is_some() {
                self.pos += 1;
                continue;
            }
            if let Some(form) = self.read_form(end) {
                forms.push(form);
            }
        }
        forms
    }

    /// Reads one form, returning `None` when the form was discarded or the input
    /// ended before a form started.
    fn read_form(&mut self, end: usize) -> Option<Sexp> {
        let mut meta = Vec::new();
        loop {
            let lexeme = *self.tokens.get(self.pos)?;
            match lexeme.token {
                Token::Meta => {
                    self.pos += 1;
                    if let Some(value) = self.read_form(end) {
                        meta.push(value);
                    }
                }
                Token::Discard => {
                    self.pos += 1;
                    self.read_form(end);
                    return None;
                }
                t if t.closer().is_some() => return None,
                _ => break,
            }
        }

        let lexeme = self.tokens[self.pos];
        self.pos += 1;
        let mut form = if lexeme.token.opener().is_some() {
            self.read_collection(lexeme, end)
        } else if lexeme.token.is_reader_prefix() {
            match self.read_form(end) {
                Some(inner) => Sexp {
                    kind: SexpKind::Prefixed,
                    span: Span::new(lexeme.span.start, inner.span.end),
                    closed: inner.closed,
                    children: vec![inner],
                    meta: Vec::new(),
                },
                None => Sexp::leaf(SexpKind::Other, lexeme.span),
            }
        } else {
            let kind = match lexeme.token {
                Token::Symbol => SexpKind::Symbol,
                Token::Keyword => SexpKind::Keyword,
                Token::Str | Token::UnterminatedStr => SexpKind::Str,
                Token::Regex | Token::UnterminatedRegex => SexpKind::Regex,
                Token::Number => SexpKind::Number,
                Token::Char => SexpKind::Char,
                _ => SexpKind::Other,
            };
            let mut leaf = Sexp::leaf(kind, lexeme.span);
            leaf.closed = !lexeme.token.is_unterminated_literal();
            leaf
        };
        form.meta = meta;
        Some(form)
    }

    fn read_collection(&mut self, open: Lexeme, end: usize) -> Sexp {
        let kind = match open.token {
            Token::OpenList => SexpKind::List,
            Token::OpenVector => SexpKind::Vector,
            Token::OpenMap => SexpKind::Map,
            Token::OpenSet => SexpKind::Set,
            Token::OpenAnonFn => SexpKind::AnonFn,
            _ => SexpKind::ReaderCond,
        };
        let mut children = Vec::new();
        while let Some(lexeme) = self.tokens.get(self.pos).copied() {
            if lexeme.token.closer().is_some() {
                // A closer of the wrong shape still ends the collection.
                self.pos += 1;
                return Sexp {
                    kind,
                    span: Span::new(open.span.start, lexeme.span.end),
                    children,
                    meta: Vec::new(),
                    closed: true,
                };
            }
            if let Some(child) = self.read_form(end) {
                children.push(child);
            }
        }
        Sexp {
            kind,
            span: Span::new(open.span.start, end.max(open.span.end)),
            children,
            meta: Vec::new(),
            closed: false,
        }
    }
}

/// Node kinds that sit between forms without being forms themselves.
pub(crate) fn is_trivia(kind: &str) -> bool {
    matches!(kind, "comment" | "dis_expr" | "meta_lit" | "old_meta_lit")
}

/// Start of a node once its leading metadata is skipped.
fn bare_start(node: &Node) -> usize {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .find(|c| !is_trivia(c.kind()))
        .map(|c| c.start_byte())
        .unwrap_or_else(|| node.start_byte())
}

/// Span of a node without its leading metadata.
pub(crate) fn bare_span(node: &Node) -> Span {
    Span::new(bare_start(node), span_of(node).end)
}

/// Builds a `Sexp` from a tree-sitter node.
pub fn from_node(node: Node, source: &str) -> Sexp {
    let span = bare_span(&node);
    let kind = match node.kind() {
        "list_lit" => SexpKind::List,
        "vec_lit" => SexpKind::Vector,
        "map_lit" | "ns_map_lit" => SexpKind::Map,
        "set_lit" => SexpKind::Set,
        "anon_fn_lit" => SexpKind::AnonFn,
        "read_cond_lit" | "splicing_read_cond_lit" => SexpKind::ReaderCond,
        "sym_lit" => SexpKind::Symbol,
        "kwd_lit" => SexpKind::Keyword,
        "str_lit" => SexpKind::Str,
        "regex_lit" => SexpKind::Regex,
        "num_lit" => SexpKind::Number,
        "char_lit" => SexpKind::Char,
        "quoting_lit" | "syn_quoting_lit" | "unquoting_lit" | "unquote_splicing_lit"
        | "derefing_lit" | "var_quoting_lit" | "evaling_lit" | "tagged_or_ctor_lit"
        | "sym_val_lit" => SexpKind::Prefixed,
        _ => SexpKind::Other,
    };

    let mut cursor = node.walk();
    let mut meta = Vec::new();
    let mut forms = Vec::new();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "meta_lit" | "old_meta_lit" => {
                if let Some(value) = last_form_child(&child) {
                    meta.push(from_node(value, source));
                }
            }
            k if is_trivia(k) => {}
            _ => forms.push(child),
        }
    }

    let children = match kind {
        SexpKind::Symbol
        | SexpKind::Keyword
        | SexpKind::Str
        | SexpKind::Regex
        | SexpKind::Number
        | SexpKind::Char
        | SexpKind::Other => Vec::new(),
        // The tag of a tagged literal is a form too; keep only the value.
        SexpKind::Prefixed => forms
            .last()
            .map(|n| vec![from_node(*n, source)])
            .unwrap_or_default(),
        _ => forms.into_iter().map(|n| from_node(n, source)).collect(),
    };

    let closed = !has_missing_child(&node);

    Sexp {
        kind,
        span,
        children,
        meta,
        closed,
    }
}

fn has_missing_child(node: &Node) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.is_missing())
}

fn last_form_child<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !is_trivia(c.kind()))
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_nested_forms() {
        let src = "(defn f [x] {:a [1 2]}) :k";
        let forms = read(src);
        assert_eq!(forms.len(), 2);
        let defn = &forms[0];
        assert_eq!(defn.kind, SexpKind::List);
        assert_eq!(defn.head(src), Some("defn"));
        assert_eq!(defn.children[2].kind, SexpKind::Vector);
        assert_eq!(defn.children[3].children[1].text(src), "[1 2]");
        assert_eq!(forms[1].keyword(src), Some(":k"));
    }

    #[test]
    fn test_metadata_is_attached_not_a_child() {
        let src = "(defn ^:private ^String f [])";
        let forms = read(src);
        let name = &forms[0].children[1];
        assert_eq!(name.symbol(src), Some("f"));
        assert_eq!(name.meta.len(), 2);
        assert!(name.has_private_meta(src));
        assert_eq!(forms[0].children.len(), 3);
    }

    #[test]
    fn test_private_meta_map() {
        let src = "^{:private true :doc \"x\"} sym";
        let forms = read(src);
        assert!(forms[0].has_private_meta(src));
    }

    #[test]
    fn test_discard_and_prefix() {
        let src = "(a #_(b c) 'd @e)";
        let forms = read(src);
        let list = &forms[0];
        assert_eq!(list.children.len(), 3);
        assert_eq!(list.children[1].kind, SexpKind::Prefixed);
        assert_eq!(list.children[1].children[0].text(src), "d");
    }

    #[test]
    fn test_unterminated_collection() {
        let src = "(defn f [x]\n  (inc x)";
        let forms = read(src);
        assert_eq!(forms.len(), 1);
        assert!(!forms[0].closed);
        assert_eq!(forms[0].span.end, src.len());
        assert!(forms[0].children[3].closed);
    }

    #[test]
    fn test_read_span_keeps_offsets() {
        let src = "(a) (b [c])";
        let forms = read_span(src, Span::new(4, src.len()));
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].span, Span::new(4, 11));
        assert_eq!(forms[0].children[1].text(src), "[c]");
    }
}
