//! Token-level view of Clojure source.
//!
//! The lexer only knows what is needed to find form boundaries: delimiters,
//! literals that may contain delimiter characters, reader prefixes and metadata
//! markers. Whitespace, commas and comments are skipped.

use cljscope_api::{Delimiter, Span};
use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f,]+")]
#[logos(skip r";[^\n]*")]
#[logos(skip r"#![^\n]*")]
pub enum Token {
    #[token("(")]
    OpenList,
    #[token("[")]
    OpenVector,
    #[token("{")]
    OpenMap,
    #[token("#{")]
    OpenSet,
    #[token("#(")]
    OpenAnonFn,
    #[regex(r"#\?@?\(")]
    OpenReaderCond,

    #[token(")")]
    CloseParen,
    #[token("]")]
    CloseBracket,
    #[token("}")]
    CloseBrace,

    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,
    #[regex(r#""([^"\\]|\\.)*"#)]
    UnterminatedStr,
    #[regex(r##"#"([^"\\]|\\.)*""##)]
    Regex,
    #[regex(r##"#"([^"\\]|\\.)*"##)]
    UnterminatedRegex,
    #[regex(r"\\(newline|space|tab|formfeed|backspace|return|u[0-9a-fA-F]{4}|o[0-7]{1,3}|[^\s])")]
    Char,

    #[token("^")]
    #[token("#^")]
    Meta,

    #[token("'")]
    Quote,
    #[token("`")]
    SyntaxQuote,
    #[token("~")]
    Unquote,
    #[token("~@")]
    UnquoteSplicing,
    #[token("@")]
    Deref,
    #[token("#'")]
    VarQuote,
    #[token("#_")]
    Discard,
    #[token("#=")]
    Eval,
    #[token("##")]
    SymbolicValue,
    #[regex(r"#[a-zA-Z][^\s,(){}\[\]\x22';@^`~\\]*")]
    Tagged,
    #[regex(r"#::?[^\s,(){}\[\]\x22';@^`~\\]*")]
    NsMapPrefix,

    #[regex(r"::?[^\s,(){}\[\]\x22';@^`~\\]+")]
    Keyword,
    #[regex(r"[+-]?[0-9][^\s,(){}\[\]\x22';@^`~\\]*", priority = 5)]
    Number,
    #[regex(r"[^\s,(){}\[\]\x22';@^`~\\#:0-9][^\s,(){}\[\]\x22@^`~\\;]*")]
    Symbol,
}

impl Token {
    pub fn opener(&self) -> Option<Delimiter> {
        match self {
            Token::OpenList => Some(Delimiter::List),
            Token::OpenVector => Some(Delimiter::Vector),
            Token::OpenMap => Some(Delimiter::Map),
            Token::OpenSet => Some(Delimiter::Set),
            Token::OpenAnonFn => Some(Delimiter::AnonFn),
            Token::OpenReaderCond => Some(Delimiter::ReaderConditional),
            _ => None,
        }
    }

    /// The closing character this token represents, if any.
    pub fn closer(&self) -> Option<char> {
        match self {
            Token::CloseParen => Some(')'),
            Token::CloseBracket => Some(']'),
            Token::CloseBrace => Some('}'),
            _ => None,
        }
    }

    /// Reader macros that change how the following form is read.
    pub fn is_reader_prefix(&self) -> bool {
        matches!(
            self,
            Token::Quote
                | Token::SyntaxQuote
                | Token::Unquote
                | Token::UnquoteSplicing
                | Token::Deref
                | Token::VarQuote
                | Token::Discard
                | Token::Eval
                | Token::SymbolicValue
                | Token::Tagged
                | Token::NsMapPrefix
        )
    }

    /// Prefixes under which a definition form is data rather than code.
    pub fn quotes_code(&self) -> bool {
        matches!(
            self,
            Token::Quote | Token::SyntaxQuote | Token::Discard | Token::Eval | Token::Tagged
        )
    }

    pub fn is_unterminated_literal(&self) -> bool {
        matches!(self, Token::UnterminatedStr | Token::UnterminatedRegex)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Span,
}

impl Lexeme {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.span.start..self.span.end).unwrap_or("")
    }
}

/// Tokenizes `source`, dropping input the lexer does not recognize.
pub fn tokenize(source: &str) -> Vec<Lexeme> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            let range = lexer.span();
            tokens.push(Lexeme {
                token,
                span: Span::new(range.start, range.end),
            });
        }
    }

    tokens
}

/// Tokenizes a slice of `source`, keeping offsets relative to the whole text.
pub fn tokenize_span(source: &str, span: Span) -> Vec<Lexeme> {
    let Some(slice) = source.get(span.start..span.end) else {
        return Vec::new();
    };
    tokenize(slice)
        .into_iter()
        .map(|mut lexeme| {
            lexeme.span = Span::new(lexeme.span.start + span.start, lexeme.span.end + span.start);
            lexeme
        })
        .collect()
}

/// Drops a namespace qualifier: `clojure.core/defn` becomes `defn`.
pub fn unqualified(symbol: &str) -> &str {
    if symbol == "/" {
        return symbol;
    }
    match symbol.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => symbol,
    }
}

/// The namespace qualifier of a symbol, if any.
pub fn qualifier(symbol: &str) -> Option<&str> {
    if symbol == "/" {
        return None;
    }
    symbol
        .rsplit_once('/')
        .filter(|(ns, name)| !ns.is_empty() && !name.is_empty())
        .map(|(ns, _)| ns)
}
