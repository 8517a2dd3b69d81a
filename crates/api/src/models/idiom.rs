use super::span::{Range, Span};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Closed set of idiom kinds the classifier knows how to detect.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum IdiomKind {
    ThreadingMacro,
    Destructuring,
    StateMutation,
    ConcurrencyPrimitive,
    FunctionComposition,
    ConditionalBinding,
    CollectionProcessing,
    NilHandling,
}

impl IdiomKind {
    pub const ALL: [IdiomKind; 8] = [
        IdiomKind::ThreadingMacro,
        IdiomKind::Destructuring,
        IdiomKind::StateMutation,
        IdiomKind::ConcurrencyPrimitive,
        IdiomKind::FunctionComposition,
        IdiomKind::ConditionalBinding,
        IdiomKind::CollectionProcessing,
        IdiomKind::NilHandling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdiomKind::ThreadingMacro => "threading-macro",
            IdiomKind::Destructuring => "destructuring",
            IdiomKind::StateMutation => "state-mutation",
            IdiomKind::ConcurrencyPrimitive => "concurrency-primitive",
            IdiomKind::FunctionComposition => "function-composition",
            IdiomKind::ConditionalBinding => "conditional-binding",
            IdiomKind::CollectionProcessing => "collection-processing",
            IdiomKind::NilHandling => "nil-handling",
        }
    }
}

impl fmt::Display for IdiomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdiomKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Older callers use the short names.
        let canonical = match s {
            "threading" => "threading-macro",
            "state" | "state-management" => "state-mutation",
            "async" | "concurrency" => "concurrency-primitive",
            "composition" => "function-composition",
            "collection" | "collections" => "collection-processing",
            "nil" | "nil-safety" => "nil-handling",
            other => other,
        };
        IdiomKind::ALL
            .into_iter()
            .find(|k| k.as_str() == canonical)
            .ok_or_else(|| format!("unknown idiom kind '{}'", s))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DestructuringShape {
    Map,
    Vector,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StateCategory {
    Atom,
    Ref,
    Agent,
    Var,
    Volatile,
    Promise,
    Transient,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyCategory {
    /// `go`, `go-loop`, `thread`
    Block,
    /// channel and buffer construction
    Channel,
    /// puts and takes
    Io,
    /// `alt!` family
    Selection,
    Utility,
    /// `future`, `pmap` and friends
    Future,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionCategory {
    /// `take-while`, `drop-while`
    ConditionalSequence,
    /// `partition-by`, `group-by`
    Grouping,
    /// `map-indexed`, `keep-indexed`
    Indexed,
    /// `frequencies`
    Analysis,
    /// `transduce`, `eduction`, `into` with an xform, and `comp` of transducers
    Transducer,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum NilStyle {
    /// `(or x default)`
    DefaultValue,
    /// `fnil`
    NilSafeFunction,
    /// `some->`, `some->>`
    NilSafeThreading,
}

/// Kind-specific payload of an occurrence.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum IdiomDetail {
    Threading {
        operator: String,
        step_count: usize,
    },
    Destructuring {
        /// Binding form the pattern appears in, e.g. `let` or `params`.
        context: String,
        shape: DestructuringShape,
        /// `:keys`, `:strs` or `:syms` when present.
        key_style: Option<String>,
        bindings: Vec<String>,
        has_rest: bool,
        as_binding: Option<String>,
        /// The pattern contains another map or vector pattern.
        #[serde(default)]
        nested: bool,
    },
    StateMutation {
        operation: String,
        category: StateCategory,
        /// False for constructors such as `atom` or `ref`.
        mutates: bool,
    },
    Concurrency {
        operation: String,
        category: ConcurrencyCategory,
    },
    Composition {
        operator: String,
        arg_count: usize,
    },
    ConditionalBinding {
        operator: String,
        binding: Option<String>,
    },
    Collection {
        operator: String,
        category: CollectionCategory,
    },
    NilHandling {
        operator: String,
        style: NilStyle,
    },
}

impl IdiomDetail {
    /// The operator or binding form that produced the occurrence.
    pub fn label(&self) -> &str {
        match self {
            IdiomDetail::Threading { operator, .. }
            | IdiomDetail::Composition { operator, .. }
            | IdiomDetail::ConditionalBinding { operator, .. }
            | IdiomDetail::Collection { operator, .. }
            | IdiomDetail::NilHandling { operator, .. } => operator,
            IdiomDetail::Destructuring { context, .. } => context,
            IdiomDetail::StateMutation { operation, .. }
            | IdiomDetail::Concurrency { operation, .. } => operation,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct IdiomOccurrence {
    pub kind: IdiomKind,
    pub span: Span,
    pub range: Range,
    /// Name of the top-level definition containing the occurrence.
    pub enclosing_definition: Option<String>,
    pub detail: IdiomDetail,
}

/// A requested kind name the classifier has no detector for.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct PatternUnsupported {
    pub requested: String,
    pub reason: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct IdiomReport {
    /// Occurrences in source order.
    pub occurrences: Vec<IdiomOccurrence>,
    /// Occurrence count per kind name.
    pub counts: BTreeMap<String, usize>,
    /// Idiomaticity score in `[0, 100]`.
    pub score: f64,
    /// Number of list forms in the buffer, the score's denominator.
    pub form_count: usize,
    pub unsupported: Vec<PatternUnsupported>,
}

impl IdiomReport {
    pub fn count(&self, kind: IdiomKind) -> usize {
        self.counts.get(kind.as_str()).copied().unwrap_or(0)
    }

    pub fn of_kind(&self, kind: IdiomKind) -> impl Iterator<Item = &IdiomOccurrence> {
        self.occurrences.iter().filter(move |o| o.kind == kind)
    }
}

/// How often one operator was seen.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct PatternCount {
    pub pattern: String,
    pub count: usize,
}

/// Condensed view of an [`IdiomReport`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
pub struct IdiomSummary {
    pub total: usize,
    /// Non-zero counts per kind name.
    pub counts: BTreeMap<String, usize>,
    /// Most frequent operators, most frequent first.
    pub top_patterns: Vec<PatternCount>,
    pub score: f64,
}

impl IdiomSummary {
    pub const TOP_PATTERNS: usize = 5;
}

impl IdiomReport {
    /// Totals and the most frequent operators. Ties are broken by name.
    pub fn summary(&self) -> IdiomSummary {
        let mut by_label: BTreeMap<&str, usize> = BTreeMap::new();
        for occurrence in &self.occurrences {
            *by_label.entry(occurrence.detail.label()).or_default() += 1;
        }
        let mut top_patterns: Vec<PatternCount> = by_label
            .into_iter()
            .map(|(pattern, count)| PatternCount {
                pattern: pattern.to_string(),
                count,
            })
            .collect();
        top_patterns.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.pattern.cmp(&b.pattern)));
        top_patterns.truncate(IdiomSummary::TOP_PATTERNS);

        IdiomSummary {
            total: self.occurrences.len(),
            counts: self
                .counts
                .iter()
                .filter(|(_, n)| **n > 0)
                .map(|(k, n)| (k.clone(), *n))
                .collect(),
            top_patterns,
            score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::span::Position;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in IdiomKind::ALL {
            assert_eq!(kind.as_str().parse::<IdiomKind>().unwrap(), kind);
        }
        assert_eq!("async".parse::<IdiomKind>().unwrap(), IdiomKind::ConcurrencyPrimitive);
        assert_eq!("nil".parse::<IdiomKind>().unwrap(), IdiomKind::NilHandling);
        assert!("transducer".parse::<IdiomKind>().is_err());
    }

    fn occurrence(kind: IdiomKind, detail: IdiomDetail) -> IdiomOccurrence {
        IdiomOccurrence {
            kind,
            span: Span::new(0, 1),
            range: Range::from_positions(
                Position { line: 0, column: 0 },
                Position { line: 0, column: 1 },
            ),
            enclosing_definition: None,
            detail,
        }
    }

    fn threading(operator: &str) -> IdiomOccurrence {
        occurrence(
            IdiomKind::ThreadingMacro,
            IdiomDetail::Threading {
                operator: operator.to_string(),
                step_count: 2,
            },
        )
    }

    #[test]
    fn test_summary_orders_patterns_by_frequency() {
        let mut occurrences = vec![threading("->>"), threading("->"), threading("->>")];
        occurrences.push(occurrence(
            IdiomKind::NilHandling,
            IdiomDetail::NilHandling {
                operator: "fnil".to_string(),
                style: NilStyle::NilSafeFunction,
            },
        ));
        let mut counts = BTreeMap::new();
        counts.insert("threading-macro".to_string(), 3);
        counts.insert("nil-handling".to_string(), 1);
        counts.insert("destructuring".to_string(), 0);
        let report = IdiomReport {
            occurrences,
            counts,
            score: 12.5,
            form_count: 8,
            unsupported: Vec::new(),
        };

        let summary = report.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.score, 12.5);
        assert!(!summary.counts.contains_key("destructuring"));
        let top: Vec<(&str, usize)> = summary
            .top_patterns
            .iter()
            .map(|p| (p.pattern.as_str(), p.count))
            .collect();
        assert_eq!(top, vec![("->>", 2), ("->", 1), ("fnil", 1)]);
    }
}
