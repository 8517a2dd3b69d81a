//! S-expression navigation over the lexical form index.

use crate::lexer::{Lexeme, Token};
use cljscope_api::{
    Cursor, Delimiter, DelimiterMatch, Direction, EnclosingFormChain, FormKind, FormRecord,
    FormSpan, Movement, NavOutcome, NavigationOptions, Span,
};
use cljscope_core::text::LineIndex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct IndexedForm {
    pub delimiter: Delimiter,
    /// Opening delimiter token, e.g. `#?(`.
    pub open: Span,
    /// `None` when the form runs to the end of the buffer.
    pub close: Option<Span>,
    pub span: Span,
    pub depth: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub head: Option<String>,
}

/// Every delimited form of a buffer, in opening order.
#[derive(Debug, Clone, Default)]
pub struct FormIndex {
    forms: Vec<IndexedForm>,
    roots: Vec<usize>,
    /// Span → (kind, name) of the form record that coincides with it.
    labels: HashMap<Span, (FormKind, Option<String>)>,
}

impl FormIndex {
    pub fn build(tokens: &[Lexeme], source: &str) -> Self {
        let mut forms: Vec<IndexedForm> = Vec::new();
        let mut roots = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        for (i, lexeme) in tokens.iter().enumerate() {
            if let Some(delimiter) = lexeme.token.opener() {
                let idx = forms.len();
                let parent = stack.last().copied();
                let head = match delimiter {
                    Delimiter::List | Delimiter::AnonFn => tokens
                        .get(i + 1)
                        .filter(|t| t.token == Token::Symbol)
                        .map(|t| t.text(source).to_string()),
                    _ => None,
                };
                forms.push(IndexedForm {
                    delimiter,
                    open: lexeme.span,
                    close: None,
                    span: Span::new(lexeme.span.start, source.len()),
                    depth: stack.len(),
                    parent,
                    children: Vec::new(),
                    head,
                });
                match parent {
                    Some(p) => forms[p].children.push(idx),
                    None => roots.push(idx),
                }
                stack.push(idx);
            } else if lexeme.token.closer().is_some() {
                if let Some(idx) = stack.pop() {
                    forms[idx].close = Some(lexeme.span);
                    forms[idx].span.end = lexeme.span.end;
                }
            }
        }

        Self {
            forms,
            roots,
            labels: HashMap::new(),
        }
    }

    /// Attaches record kinds and names to the forms whose span they share.
    pub fn label(&mut self, records: &[FormRecord]) {
        self.labels = records
            .iter()
            .map(|r| (r.span, (r.kind, r.name.clone())))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn forms(&self) -> &[IndexedForm] {
        &self.forms
    }

    pub fn list_count(&self) -> usize {
        self.forms
            .iter()
            .filter(|f| matches!(f.delimiter, Delimiter::List | Delimiter::AnonFn))
            .count()
    }

    fn siblings(&self, idx: usize) -> &[usize] {
        match self.forms[idx].parent {
            Some(p) => &self.forms[p].children,
            None => &self.roots,
        }
    }

    /// Deepest form containing `offset`.
    pub fn innermost_at(&self, offset: usize) -> Option<usize> {
        let mut level = &self.roots;
        let mut found = None;
        loop {
            let pos = level.partition_point(|&i| self.forms[i].span.start <= offset);
            let candidate = pos.checked_sub(1).map(|p| level[p]);
            match candidate {
                Some(idx) if self.forms[idx].span.contains_offset(offset) => {
                    found = Some(idx);
                    level = &self.forms[idx].children;
                }
                _ => return found,
            }
        }
    }

    fn chain_from(&self, innermost: Option<usize>) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = innermost;
        while let Some(idx) = current {
            chain.push(idx);
            current = self.forms[idx].parent;
        }
        chain
    }

    fn form_span(&self, idx: usize, lines: &LineIndex) -> FormSpan {
        let form = &self.forms[idx];
        let label = self.labels.get(&form.span);
        FormSpan {
            delimiter: form.delimiter,
            span: form.span,
            range: lines.range(form.span),
            depth: form.depth,
            head: form.head.clone(),
            record_kind: label.map(|(kind, _)| *kind),
            record_name: label.and_then(|(_, name)| name.clone()),
        }
    }
}

/// Cursor-to-form resolution over one buffer's index.
pub struct Navigator<'a> {
    index: &'a FormIndex,
    lines: &'a LineIndex,
    len: usize,
}

impl<'a> Navigator<'a> {
    pub fn new(index: &'a FormIndex, lines: &'a LineIndex, len: usize) -> Self {
        Self { index, lines, len }
    }

    fn offset_of(&self, cursor: Cursor) -> Result<usize, String> {
        if self.len == 0 {
            return Err("buffer is empty".to_string());
        }
        let offset = self.lines.offset(cursor.line, cursor.column).ok_or_else(|| {
            format!(
                "line {} column {} is outside the buffer",
                cursor.line, cursor.column
            )
        })?;
        if offset >= self.len {
            return Err(format!("offset {} is past the end of the buffer", offset));
        }
        Ok(offset)
    }

    fn out_of_bounds<T>(cursor: Cursor, reason: String) -> NavOutcome<T> {
        NavOutcome::OutOfBounds { cursor, reason }
    }

    pub fn locate(&self, cursor: Cursor) -> NavOutcome<EnclosingFormChain> {
        match self.offset_of(cursor) {
            Ok(offset) => NavOutcome::Located(self.chain_at(cursor, offset)),
            Err(reason) => Self::out_of_bounds(cursor, reason),
        }
    }

    fn chain_at(&self, cursor: Cursor, offset: usize) -> EnclosingFormChain {
        let innermost = self.index.innermost_at(offset);
        let ambiguity_resolved = innermost.is_some_and(|idx| {
            let form = &self.index.forms[idx];
            form.open.start == offset
                && self
                    .index
                    .forms
                    .iter()
                    .any(|f| f.close.is_some() && f.span.end == offset)
        });

        let forms: Vec<FormSpan> = self
            .index
            .chain_from(innermost)
            .into_iter()
            .map(|idx| self.index.form_span(idx, self.lines))
            .collect();
        let definition = forms
            .iter()
            .find(|f| {
                f.record_name.is_some()
                    && !matches!(f.record_kind, Some(FormKind::GenericList) | None)
            })
            .cloned();

        EnclosingFormChain {
            cursor,
            offset,
            forms,
            ambiguity_resolved,
            definition,
        }
    }

    pub fn navigate(&self, cursor: Cursor, direction: Direction) -> NavOutcome<Movement> {
        let offset = match self.offset_of(cursor) {
            Ok(offset) => offset,
            Err(reason) => return Self::out_of_bounds(cursor, reason),
        };
        let current = self.index.innermost_at(offset);
        let target = match current {
            Some(idx) => self.step(idx, direction),
            None => self.step_from_top_level(offset, direction),
        };

        let movement = match target {
            Some(idx) => {
                let start = self.index.forms[idx].open.start;
                let target_cursor = self.cursor_at(start);
                Movement {
                    direction,
                    moved: true,
                    target: Some(target_cursor),
                    chain: self.chain_at(target_cursor, start),
                }
            }
            None => Movement {
                direction,
                moved: false,
                target: None,
                chain: self.chain_at(cursor, offset),
            },
        };
        NavOutcome::Located(movement)
    }

    fn step(&self, idx: usize, direction: Direction) -> Option<usize> {
        let form = &self.index.forms[idx];
        match direction {
            Direction::In => form.children.first().copied(),
            Direction::Out => form.parent,
            Direction::Top => {
                let top = *self.index.chain_from(Some(idx)).last()?;
                (top != idx).then_some(top)
            }
            Direction::Next | Direction::Previous => {
                let siblings = self.index.siblings(idx);
                let pos = siblings.iter().position(|&s| s == idx)?;
                if direction == Direction::Next {
                    siblings.get(pos + 1).copied()
                } else {
                    pos.checked_sub(1).map(|p| siblings[p])
                }
            }
        }
    }

    /// Moves between top-level forms when the cursor is outside all of them.
    fn step_from_top_level(&self, offset: usize, direction: Direction) -> Option<usize> {
        let roots = &self.index.roots;
        match direction {
            Direction::Next => roots
                .iter()
                .copied()
                .find(|&r| self.index.forms[r].span.start > offset),
            Direction::Previous => roots
                .iter()
                .copied()
                .rev()
                .find(|&r| self.index.forms[r].span.end <= offset),
            Direction::In | Direction::Out | Direction::Top => None,
        }
    }

    fn cursor_at(&self, offset: usize) -> Cursor {
        Cursor::from(self.lines.position(offset))
    }

    /// Where every direction leads from form `idx`, plus its closing delimiter.
    pub fn options(&self, idx: usize) -> NavigationOptions {
        let target = |direction| {
            self.step(idx, direction)
                .map(|t| self.cursor_at(self.index.forms[t].open.start))
        };
        NavigationOptions {
            next: target(Direction::Next),
            previous: target(Direction::Previous),
            parent: target(Direction::Out),
            first_child: target(Direction::In),
            top: target(Direction::Top),
            closing_delimiter: self.index.forms[idx]
                .close
                .map(|c| self.cursor_at(c.start)),
        }
    }

    pub fn matching_delimiter(&self, cursor: Cursor) -> NavOutcome<Option<DelimiterMatch>> {
        let offset = match self.offset_of(cursor) {
            Ok(offset) => offset,
            Err(reason) => return Self::out_of_bounds(cursor, reason),
        };

        let on_open = self
            .index
            .forms
            .iter()
            .position(|f| f.open.contains_offset(offset));
        let on_close = self
            .index
            .forms
            .iter()
            .position(|f| f.close.is_some_and(|c| c.contains_offset(offset)));

        let (idx, partner) = if let Some(idx) = on_open {
            (idx, self.index.forms[idx].close.map(|c| c.start))
        } else if let Some(idx) = on_close {
            (idx, Some(self.index.forms[idx].open.start))
        } else if let Some(idx) = self.index.innermost_at(offset) {
            (idx, self.index.forms[idx].close.map(|c| c.start))
        } else {
            return NavOutcome::Located(None);
        };

        let form = &self.index.forms[idx];
        NavOutcome::Located(Some(DelimiterMatch {
            form: self.index.form_span(idx, self.lines),
            open: form.open,
            close: form.close,
            partner: partner.map(|p| self.cursor_at(p)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn index(src: &str) -> (FormIndex, LineIndex) {
        (FormIndex::build(&tokenize(src), src), LineIndex::new(src))
    }

    #[test]
    fn test_chain_innermost_first() {
        let src = "(defn f [x]\n  (let [y (inc x)] y))";
        let (idx, lines) = index(src);
        let nav = Navigator::new(&idx, &lines, src.len());
        // On `inc`.
        let chain = nav.locate(Cursor::new(1, 11)).located().unwrap();
        let heads: Vec<Option<&str>> = chain.forms.iter().map(|f| f.head.as_deref()).collect();
        assert_eq!(heads, vec![Some("inc"), None, Some("let"), Some("defn")]);
        assert_eq!(chain.forms[1].delimiter, Delimiter::Vector);
        assert!(!chain.ambiguity_resolved);
    }

    #[test]
    fn test_out_of_bounds() {
        let (idx, lines) = index("");
        let nav = Navigator::new(&idx, &lines, 0);
        assert!(nav.locate(Cursor::new(0, 0)).is_out_of_bounds());

        let src = "(a)\n(b)";
        let (idx, lines) = index(src);
        let nav = Navigator::new(&idx, &lines, src.len());
        assert!(nav.locate(Cursor::new(0, 9)).is_out_of_bounds());
        assert!(nav.locate(Cursor::new(5, 0)).is_out_of_bounds());
        assert!(nav.locate(Cursor::new(1, 3)).is_out_of_bounds());
    }

    #[test]
    fn test_adjacent_boundary_prefers_opener() {
        let src = "(a)(b)";
        let (idx, lines) = index(src);
        let nav = Navigator::new(&idx, &lines, src.len());
        let chain = nav.locate(Cursor::new(0, 3)).located().unwrap();
        assert!(chain.ambiguity_resolved);
        assert_eq!(chain.forms[0].head.as_deref(), Some("b"));
    }

    #[test]
    fn test_navigate_directions() {
        let src = "(a (b) (c))\n(d)";
        let (idx, lines) = index(src);
        let nav = Navigator::new(&idx, &lines, src.len());

        let inward = nav.navigate(Cursor::new(0, 1), Direction::In).located().unwrap();
        assert!(inward.moved);
        assert_eq!(inward.target, Some(Cursor::new(0, 3)));

        let next = nav.navigate(Cursor::new(0, 4), Direction::Next).located().unwrap();
        assert_eq!(next.target, Some(Cursor::new(0, 7)));

        let prev = nav.navigate(Cursor::new(0, 4), Direction::Previous).located().unwrap();
        assert!(!prev.moved);
        assert_eq!(prev.chain.forms[0].head.as_deref(), Some("b"));

        let top = nav.navigate(Cursor::new(0, 8), Direction::Top).located().unwrap();
        assert_eq!(top.target, Some(Cursor::new(0, 0)));

        let out = nav.navigate(Cursor::new(1, 1), Direction::Out).located().unwrap();
        assert!(!out.moved);

        let down_from_space = nav.navigate(Cursor::new(0, 11), Direction::Next).located().unwrap();
        assert_eq!(down_from_space.target, Some(Cursor::new(1, 0)));
    }

    #[test]
    fn test_options_of_nested_form() {
        let src = "(a (b) (c))\n(d)";
        let (idx, lines) = index(src);
        let nav = Navigator::new(&idx, &lines, src.len());

        let options = nav.options(1);
        assert_eq!(options.next, Some(Cursor::new(0, 7)));
        assert_eq!(options.previous, None);
        assert_eq!(options.parent, Some(Cursor::new(0, 0)));
        assert_eq!(options.first_child, None);
        assert_eq!(options.top, Some(Cursor::new(0, 0)));
        assert_eq!(options.closing_delimiter, Some(Cursor::new(0, 5)));

        let top_level = nav.options(3);
        assert_eq!(top_level.parent, None);
        assert_eq!(top_level.top, None);
    }

    #[test]
    fn test_matching_delimiter() {
        let src = "(f #{1 2} [x]\n";
        let (idx, lines) = index(src);
        let nav = Navigator::new(&idx, &lines, src.len());

        let on_set = nav.matching_delimiter(Cursor::new(0, 4)).located().unwrap().unwrap();
        assert_eq!(on_set.open, Span::new(3, 5));
        assert_eq!(on_set.partner, Some(Cursor::new(0, 8)));

        let on_close = nav.matching_delimiter(Cursor::new(0, 12)).located().unwrap().unwrap();
        assert_eq!(on_close.partner, Some(Cursor::new(0, 10)));

        let unterminated = nav.matching_delimiter(Cursor::new(0, 0)).located().unwrap().unwrap();
        assert_eq!(unterminated.close, None);
        assert_eq!(unterminated.partner, None);
    }
}
