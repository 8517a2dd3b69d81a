use crate::buffer::SourceBuffer;
use crate::error::AnalysisResult;
use crate::models::{
    Cursor, DelimiterMatch, Direction, EnclosingFormChain, FormInspection, Movement, NavOutcome,
};

/// Cursor-driven movement over the s-expression structure of a buffer.
///
/// Cursors are 0-based with byte columns. A cursor outside the buffer (or past the
/// end of its line) yields `NavOutcome::OutOfBounds`; it is never clamped.
pub trait SexpNavigation: Send + Sync {
    /// Enclosing forms of the cursor, innermost first.
    fn locate_enclosing_form(
        &self,
        buffer: &SourceBuffer,
        cursor: Cursor,
    ) -> AnalysisResult<NavOutcome<EnclosingFormChain>>;

    /// Moves from the innermost form in `direction`. At an edge the current chain
    /// is returned with `moved = false`.
    fn navigate(
        &self,
        buffer: &SourceBuffer,
        cursor: Cursor,
        direction: Direction,
    ) -> AnalysisResult<NavOutcome<Movement>>;

    /// On an opener returns its closer, on a closer its opener, elsewhere the
    /// delimiters of the innermost form.
    fn find_matching_delimiter(
        &self,
        buffer: &SourceBuffer,
        cursor: Cursor,
    ) -> AnalysisResult<NavOutcome<Option<DelimiterMatch>>>;

    /// Context, navigation targets, idioms and suggestions for the innermost
    /// form at the cursor. `None` when the cursor lies outside every form.
    fn inspect_form(
        &self,
        buffer: &SourceBuffer,
        cursor: Cursor,
    ) -> AnalysisResult<NavOutcome<Option<FormInspection>>>;
}
