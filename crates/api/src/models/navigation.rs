use super::form::FormKind;
use super::idiom::IdiomReport;
use super::span::{Cursor, Range, Span};
use super::symbol::{FunctionRecord, NamespaceRecord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opening delimiter shape of a form.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Delimiter {
    /// `(`
    List,
    /// `[`
    Vector,
    /// `{`
    Map,
    /// `#{`
    Set,
    /// `#(`
    AnonFn,
    /// `#?(` and `#?@(`
    ReaderConditional,
}

impl Delimiter {
    pub fn closer(&self) -> char {
        match self {
            Delimiter::List | Delimiter::AnonFn | Delimiter::ReaderConditional => ')',
            Delimiter::Vector => ']',
            Delimiter::Map | Delimiter::Set => '}',
        }
    }
}

/// One delimited form on an enclosing chain.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct FormSpan {
    pub delimiter: Delimiter,
    pub span: Span,
    pub range: Range,
    pub depth: usize,
    /// First symbol of a list form, e.g. `defn` or `let`.
    pub head: Option<String>,
    /// Set when the span coincides with a reconciled form record.
    pub record_kind: Option<FormKind>,
    pub record_name: Option<String>,
}

/// Enclosing forms of a cursor, innermost first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct EnclosingFormChain {
    pub cursor: Cursor,
    pub offset: usize,
    pub forms: Vec<FormSpan>,
    /// The cursor sat on a boundary shared by two forms and the opener was chosen.
    pub ambiguity_resolved: bool,
    /// Innermost chain member labelled with a definition record.
    pub definition: Option<FormSpan>,
}

impl EnclosingFormChain {
    pub fn innermost(&self) -> Option<&FormSpan> {
        self.forms.first()
    }

    pub fn outermost(&self) -> Option<&FormSpan> {
        self.forms.last()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

/// Result of every navigation call. A cursor outside the buffer is an outcome,
/// not an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum NavOutcome<T> {
    Located(T),
    OutOfBounds { cursor: Cursor, reason: String },
}

impl<T> NavOutcome<T> {
    pub fn located(self) -> Option<T> {
        match self {
            NavOutcome::Located(v) => Some(v),
            NavOutcome::OutOfBounds { .. } => None,
        }
    }

    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, NavOutcome::OutOfBounds { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> NavOutcome<U> {
        match self {
            NavOutcome::Located(v) => NavOutcome::Located(f(v)),
            NavOutcome::OutOfBounds { cursor, reason } => NavOutcome::OutOfBounds { cursor, reason },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// First child form of the innermost form.
    In,
    /// Parent of the innermost form.
    Out,
    Next,
    Previous,
    /// Outermost (top-level) form.
    Top,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" | "down" => Ok(Direction::In),
            "out" | "up" => Ok(Direction::Out),
            "next" => Ok(Direction::Next),
            "previous" | "prev" => Ok(Direction::Previous),
            "top" => Ok(Direction::Top),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Next => "next",
            Direction::Previous => "previous",
            Direction::Top => "top",
        };
        f.write_str(s)
    }
}

/// Where a directional move landed. `chain` is the enclosing chain at the target
/// form's opening delimiter, or the unchanged chain when `moved` is false.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct Movement {
    pub direction: Direction,
    pub moved: bool,
    pub target: Option<Cursor>,
    pub chain: EnclosingFormChain,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct DelimiterMatch {
    pub form: FormSpan,
    /// Opening delimiter token, e.g. `#{`.
    pub open: Span,
    /// Closing delimiter; `None` for forms that run to the end of the buffer.
    pub close: Option<Span>,
    /// Position of the delimiter paired with the one under the cursor.
    pub partner: Option<Cursor>,
}

/// What the innermost form at a cursor is, read from its head and delimiter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FormContext {
    FunctionDefinition { name: Option<String> },
    NamespaceDefinition { name: Option<String> },
    MacroDefinition { name: Option<String> },
    /// `defprotocol`, `deftype`, `defrecord` or `definterface`.
    TypeDefinition { construct: String, name: Option<String> },
    /// Any other `def`-style form.
    Definition { construct: String, name: Option<String> },
    /// `let`, `loop`, `binding` and the conditional binding forms.
    LocalBinding { construct: String },
    FunctionCall { name: String },
    AnonymousFunction,
    VectorLiteral,
    MapLiteral,
    SetLiteral,
    ReaderConditional,
    /// A list whose head is not a symbol, or an empty list.
    Other,
}

/// Cursor targets reachable from the inspected form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct NavigationOptions {
    pub next: Option<Cursor>,
    pub previous: Option<Cursor>,
    pub parent: Option<Cursor>,
    pub first_child: Option<Cursor>,
    pub top: Option<Cursor>,
    pub closing_delimiter: Option<Cursor>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    Documentation,
    Complexity,
    StateManagement,
    Readability,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub priority: Priority,
    pub message: String,
}

/// Everything known about the innermost form at a cursor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct FormInspection {
    pub chain: EnclosingFormChain,
    pub form: FormSpan,
    pub text: String,
    pub context: FormContext,
    /// Function definition enclosing (or equal to) the form.
    pub function: Option<FunctionRecord>,
    /// Namespace declared at the top of the buffer.
    pub namespace: Option<NamespaceRecord>,
    pub navigation: NavigationOptions,
    /// Idioms found inside the form only.
    pub idioms: IdiomReport,
    pub suggestions: Vec<Suggestion>,
}
