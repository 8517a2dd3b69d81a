use cljscope_api::{Position, Range, Span};

/// Byte offsets of line starts, for converting between offsets and positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: text.len(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Position of `offset`; offsets past the end map to the end of the text.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position {
            line,
            column: offset - self.line_starts[line],
        }
    }

    pub fn range(&self, span: Span) -> Range {
        Range::from_positions(self.position(span.start), self.position(span.end))
    }

    /// Byte offset of a 0-based line and byte column, or `None` when the line
    /// does not exist or the column lies past the line's end (its newline
    /// excluded). The column of the final line may equal its length.
    pub fn offset(&self, line: usize, column: usize) -> Option<usize> {
        let start = *self.line_starts.get(line)?;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.len,
        };
        let offset = start + column;
        (offset <= end).then_some(offset)
    }
}
