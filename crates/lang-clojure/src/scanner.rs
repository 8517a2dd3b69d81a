//! Lexical boundary scanner.
//!
//! Walks the token stream with a delimiter stack and reports every `(` whose
//! first token is a definition keyword, together with the span the delimiters
//! give it. This is independent of the syntax tree and is the authority on
//! where definition forms start and end.

use crate::lexer::{Lexeme, Token, unqualified};
use cljscope_api::{Confidence, Delimiter, FormKind, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    Scanner,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCandidate {
    /// Offset of the opening `(`.
    pub start: usize,
    pub end: usize,
    pub confidence: Confidence,
    pub source: CandidateSource,
    /// Keyword as written, possibly qualified.
    pub keyword: String,
    pub name: Option<String>,
    pub name_span: Option<Span>,
    /// Number of enclosing delimited forms.
    pub depth: usize,
    pub private_meta: bool,
    pub truncated: bool,
    pub mismatched: bool,
    /// Reader macro quoting this form or one of its ancestors.
    pub reader_prefix: Option<String>,
}

impl BoundaryCandidate {
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn kind(&self) -> FormKind {
        definition_kind(&self.keyword).unwrap_or(FormKind::GenericList)
    }

    pub(crate) fn settle_confidence(&mut self) {
        self.confidence = if self.name.is_some()
            && self.reader_prefix.is_none()
            && !self.truncated
            && !self.mismatched
        {
            Confidence::High
        } else {
            Confidence::Low
        };
    }
}

/// Form kind introduced by a definition keyword, qualified or not.
pub fn definition_kind(keyword: &str) -> Option<FormKind> {
    match unqualified(keyword) {
        "defn" | "defn-" => Some(FormKind::FunctionDef),
        "defmacro" => Some(FormKind::MacroDef),
        "ns" => Some(FormKind::NamespaceDecl),
        "defprotocol" | "definterface" => Some(FormKind::ProtocolDef),
        "deftype" | "defrecord" => Some(FormKind::TypeDef),
        _ => None,
    }
}

struct Frame {
    delimiter: Delimiter,
    candidate: Option<usize>,
    quoted_by: Option<String>,
}

/// Scans `tokens` (from `lexer::tokenize(source)`). Never fails: unbalanced
/// input yields low-confidence candidates.
pub fn scan(tokens: &[Lexeme], source: &str) -> Vec<BoundaryCandidate> {
    let mut candidates: Vec<BoundaryCandidate> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut pending_prefix: Option<String> = None;
    let mut i = 0;

    while i < tokens.len() {
        let lexeme = tokens[i];
        match lexeme.token {
            Token::Meta => {
                // Metadata does not consume a pending prefix: `#_ ^:m (defn ...)`.
                i = skip_form(tokens, i + 1);
                continue;
            }
            t if t.is_reader_prefix() => {
                if t.quotes_code() {
                    pending_prefix = Some(lexeme.text(source).to_string());
                }
                i += 1;
                continue;
            }
            t if t.closer().is_some() => {
                if let Some(frame) = stack.pop() {
                    if let Some(idx) = frame.candidate {
                        let candidate = &mut candidates[idx];
                        candidate.end = lexeme.span.end;
                        candidate.mismatched = t.closer() != Some(frame.delimiter.closer());
                    }
                }
                pending_prefix = None;
            }
            t if t.opener().is_some() => {
                let delimiter = t.opener().unwrap_or(Delimiter::List);
                let inherited = stack.last().and_then(|f| f.quoted_by.clone());
                let quoted_by = pending_prefix.take().or(inherited);
                let candidate = if delimiter == Delimiter::List {
                    definition_at(tokens, i, source, stack.len(), quoted_by.clone())
                        .map(|c| {
                            candidates.push(c);
                            candidates.len() - 1
                        })
                } else {
                    None
                };
                stack.push(Frame {
                    delimiter,
                    candidate,
                    quoted_by,
                });
            }
            _ => {
                pending_prefix = None;
            }
        }
        i += 1;
    }

    // Whatever is still open runs to the end of the buffer.
    for frame in stack {
        if let Some(idx) = frame.candidate {
            let candidate = &mut candidates[idx];
            candidate.end = source.len();
            candidate.truncated = true;
        }
    }

    for candidate in &mut candidates {
        candidate.settle_confidence();
    }
    candidates
}

/// Builds a candidate when the list opened at `open` starts with a definition keyword.
fn definition_at(
    tokens: &[Lexeme],
    open: usize,
    source: &str,
    depth: usize,
    reader_prefix: Option<String>,
) -> Option<BoundaryCandidate> {
    let head = tokens.get(open + 1)?;
    if head.token != Token::Symbol {
        return None;
    }
    let keyword = head.text(source);
    definition_kind(keyword)?;

    let mut private_meta = false;
    let mut j = open + 2;
    while let Some(lexeme) = tokens.get(j) {
        if lexeme.token != Token::Meta {
            break;
        }
        let value_end = skip_form(tokens, j + 1);
        private_meta |= meta_marks_private(&tokens[(j + 1).min(value_end)..value_end], source);
        j = value_end;
    }

    let (name, name_span) = match tokens.get(j) {
        Some(l) if l.token == Token::Symbol => (Some(l.text(source).to_string()), Some(l.span)),
        _ => (None, None),
    };

    Some(BoundaryCandidate {
        start: tokens[open].span.start,
        end: source.len(),
        confidence: Confidence::Low,
        source: CandidateSource::Scanner,
        keyword: keyword.to_string(),
        name,
        name_span,
        depth,
        private_meta,
        truncated: false,
        mismatched: false,
        reader_prefix,
    })
}

/// `:private` keyword, or a map holding `:private true`.
fn meta_marks_private(value: &[Lexeme], source: &str) -> bool {
    match value.first().map(|l| l.token) {
        Some(Token::Keyword) => value[0].text(source) == ":private",
        Some(Token::OpenMap) => value.windows(2).any(|w| {
            w[0].token == Token::Keyword
                && w[0].text(source) == ":private"
                && w[1].text(source) == "true"
        }),
        _ => false,
    }
}

/// Index just past the form starting at `i`, including its prefixes and metadata.
pub(crate) fn skip_form(tokens: &[Lexeme], mut i: usize) -> usize {
    loop {
        match tokens.get(i).map(|l| l.token) {
            None => return tokens.len(),
            Some(Token::Meta) => i = skip_form(tokens, i + 1),
            Some(t) if t.is_reader_prefix() => i += 1,
            Some(_) => break,
        }
    }
    let Some(first) = tokens.get(i) else {
        return tokens.len();
    };
    if first.token.closer().is_some() {
        return i;
    }
    if first.token.opener().is_none() {
        return i + 1;
    }
    let mut depth = 0usize;
    while let Some(lexeme) = tokens.get(i) {
        if lexeme.token.opener().is_some() {
            depth += 1;
        } else if lexeme.token.closer().is_some() {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return i + 1;
            }
        }
        i += 1;
    }
    tokens.len()
}
