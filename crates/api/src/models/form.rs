use super::span::{Range, Span};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    FunctionDef,
    NamespaceDecl,
    MacroDef,
    ProtocolDef,
    TypeDef,
    GenericList,
    Other,
}

impl FormKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormKind::FunctionDef => "function-def",
            FormKind::NamespaceDecl => "namespace-decl",
            FormKind::MacroDef => "macro-def",
            FormKind::ProtocolDef => "protocol-def",
            FormKind::TypeDef => "type-def",
            FormKind::GenericList => "generic-list",
            FormKind::Other => "other",
        }
    }

    /// Kinds whose records must carry a name.
    pub fn requires_name(&self) -> bool {
        matches!(
            self,
            FormKind::FunctionDef
                | FormKind::NamespaceDecl
                | FormKind::MacroDef
                | FormKind::ProtocolDef
                | FormKind::TypeDef
        )
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    High,
}

/// Which side of the reconciliation a record's name and outer span came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RecordOrigin {
    /// Tree and scanner agreed on the name.
    TreeConfirmed,
    /// Tree name disagreed; scanner name and span were used.
    NameCorrected,
    /// No tree node matched; built from the scanner candidate and raw text.
    Synthesized,
    /// Reconciliation disabled; taken from the tree alone.
    TreeOnly,
}

/// A region that could not be reconciled with confidence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, JsonSchema)]
#[serde(tag = "gap", rename_all = "kebab-case")]
pub enum ReconciliationGap {
    /// The syntax tree produced no node for this scanner candidate.
    TreeNodeMissing,
    /// Tree children fell outside the corrected span; fields were re-sliced from text.
    StructureFromText,
    /// The form runs to the end of the buffer without a closing delimiter.
    Truncated,
    /// A reader macro precedes the form, so it may be data rather than a definition.
    ReaderPrefixed { prefix: String },
    /// The keyword was not followed by a usable name.
    MissingName,
    /// A closing delimiter of the wrong shape ended the form.
    MismatchedDelimiter,
}

/// The corrected unit of analysis produced by one reconciliation pass.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct FormRecord {
    pub kind: FormKind,
    /// Definition keyword as written, e.g. `defn-`.
    pub keyword: Option<String>,
    pub name: Option<String>,
    /// Only set for function definitions whose kind could be inferred.
    pub visibility: Option<Visibility>,
    pub span: Span,
    pub range: Range,
    pub docstring: Option<String>,
    /// Raw parameter-vector texts, one per arity.
    pub parameter_shapes: Vec<String>,
    pub raw_text: String,
    /// Number of enclosing delimited forms.
    pub depth: usize,
    pub confidence: Confidence,
    pub origin: RecordOrigin,
    pub gaps: Vec<ReconciliationGap>,
}

impl FormRecord {
    pub fn is_top_level(&self) -> bool {
        self.depth == 0
    }

    pub fn is_low_confidence(&self) -> bool {
        self.confidence == Confidence::Low
    }
}
