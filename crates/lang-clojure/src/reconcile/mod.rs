//! Boundary reconciliation.
//!
//! The scanner decides where definition forms start and end; the syntax tree
//! supplies their inner structure when it agrees. Every scanner candidate
//! becomes exactly one form record, so reconciliation never drops a definition
//! the delimiters show.

pub mod candidates;
pub mod structure;

pub use candidates::{TreeCandidate, collect_tree_candidates};
pub use structure::Structure;

use crate::lexer::unqualified;
use crate::scanner::BoundaryCandidate;
use crate::sexp;
use cljscope_api::{
    Confidence, FormKind, FormRecord, RecordOrigin, ReconciliationGap, Span, Visibility,
};
use cljscope_core::config::ReconciliationConfig;
use cljscope_core::text::LineIndex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Scanner boundaries, tree structure where it agrees.
    Hybrid { anchor_tolerance: usize },
    /// Records from the syntax tree alone.
    TreeOnly,
}

impl ReconcileMode {
    pub fn from_config(config: &ReconciliationConfig) -> Self {
        if config.enabled {
            ReconcileMode::Hybrid {
                anchor_tolerance: config.anchor_tolerance,
            }
        } else {
            ReconcileMode::TreeOnly
        }
    }
}

pub struct Reconciler<'a> {
    source: &'a str,
    lines: &'a LineIndex,
    mode: ReconcileMode,
}

impl<'a> Reconciler<'a> {
    pub fn new(source: &'a str, lines: &'a LineIndex, mode: ReconcileMode) -> Self {
        Self {
            source,
            lines,
            mode,
        }
    }

    /// Merges both candidate lists into form records sorted by start offset.
    pub fn reconcile(
        &self,
        scanned: &[BoundaryCandidate],
        tree_candidates: &[TreeCandidate],
    ) -> Vec<FormRecord> {
        let mut records = match self.mode {
            ReconcileMode::TreeOnly => tree_candidates
                .iter()
                .map(|tc| self.tree_only_record(tc))
                .collect(),
            ReconcileMode::Hybrid { anchor_tolerance } => {
                let pairs = pair_candidates(scanned, tree_candidates, anchor_tolerance);
                scanned
                    .iter()
                    .zip(pairs)
                    .map(|(sc, pair)| self.hybrid_record(sc, pair.map(|i| &tree_candidates[i])))
                    .collect::<Vec<_>>()
            }
        };
        records.sort_by_key(|r: &FormRecord| (r.span.start, r.depth));
        records
    }

    fn hybrid_record(&self, sc: &BoundaryCandidate, tc: Option<&TreeCandidate>) -> FormRecord {
        let kind = sc.kind();
        let mut gaps = Vec::new();
        let mut end = sc.end;

        let (origin, structure) = match tc {
            Some(tc) if tc.candidate.name == sc.name => {
                if tc.candidate.end != sc.end {
                    debug!(
                        "tree end {} disagrees with lexical end {} for '{}', keeping lexical",
                        tc.candidate.end,
                        sc.end,
                        sc.name.as_deref().unwrap_or("?")
                    );
                } else {
                    end = tc.candidate.end;
                }
                let structure = Structure::from_list(&tc.sexp, kind, self.source);
                (RecordOrigin::TreeConfirmed, structure)
            }
            Some(tc) => {
                debug!(
                    "tree name {:?} corrected to {:?} at offset {}",
                    tc.candidate.name, sc.name, sc.start
                );
                let from_tree = Structure::from_list(&tc.sexp, kind, self.source);
                let structure = if from_tree.lies_within(sc.span()) {
                    from_tree
                } else {
                    gaps.push(ReconciliationGap::StructureFromText);
                    self.positional_structure(sc.span(), kind)
                };
                (RecordOrigin::NameCorrected, structure)
            }
            None => {
                debug!(
                    "no tree node for '{}' at offset {}, synthesizing",
                    sc.name.as_deref().unwrap_or("?"),
                    sc.start
                );
                gaps.push(ReconciliationGap::TreeNodeMissing);
                (
                    RecordOrigin::Synthesized,
                    self.positional_structure(sc.span(), kind),
                )
            }
        };

        self.finish(
            sc,
            Span::new(sc.start, end),
            origin,
            structure.private_meta,
            structure,
            gaps,
        )
    }

    fn tree_only_record(&self, tc: &TreeCandidate) -> FormRecord {
        let candidate = &tc.candidate;
        let structure = Structure::from_list(&tc.sexp, candidate.kind(), self.source);
        self.finish(
            candidate,
            candidate.span(),
            RecordOrigin::TreeOnly,
            structure.private_meta,
            structure,
            Vec::new(),
        )
    }

    /// Re-reads the form from raw text when the tree cannot be trusted.
    fn positional_structure(&self, span: Span, kind: FormKind) -> Structure {
        sexp::read_span(self.source, span)
            .first()
            .map(|list| Structure::from_list(list, kind, self.source))
            .unwrap_or_default()
    }

    fn finish(
        &self,
        candidate: &BoundaryCandidate,
        span: Span,
        origin: RecordOrigin,
        private_meta: bool,
        structure: Structure,
        mut gaps: Vec<ReconciliationGap>,
    ) -> FormRecord {
        let mut kind = candidate.kind();
        if candidate.truncated {
            gaps.push(ReconciliationGap::Truncated);
        }
        if candidate.mismatched {
            gaps.push(ReconciliationGap::MismatchedDelimiter);
        }
        if let Some(prefix) = &candidate.reader_prefix {
            gaps.push(ReconciliationGap::ReaderPrefixed {
                prefix: prefix.clone(),
            });
            kind = FormKind::GenericList;
        } else if candidate.name.is_none() && kind.requires_name() {
            gaps.push(ReconciliationGap::MissingName);
            kind = FormKind::Other;
        }

        let visibility = (kind == FormKind::FunctionDef).then(|| {
            if unqualified(&candidate.keyword) == "defn-" || candidate.private_meta || private_meta
            {
                Visibility::Private
            } else {
                Visibility::Public
            }
        });

        let confidence = if candidate.confidence == Confidence::High && gaps.is_empty() {
            Confidence::High
        } else {
            Confidence::Low
        };

        FormRecord {
            kind,
            keyword: Some(candidate.keyword.clone()),
            name: candidate.name.clone(),
            visibility,
            span,
            range: self.lines.range(span),
            docstring: structure.docstring,
            parameter_shapes: structure.parameter_shapes,
            raw_text: self
                .source
                .get(span.start..span.end)
                .unwrap_or_default()
                .to_string(),
            depth: candidate.depth,
            confidence,
            origin,
            gaps,
        }
    }
}

/// For each scanner candidate, the index of the tree candidate paired with it.
///
/// Tree candidates are taken in order and each claims the closest unclaimed
/// scanner candidate whose start lies within `tolerance` bytes of its anchor.
/// Tree candidates that claim nothing are dropped.
fn pair_candidates(
    scanned: &[BoundaryCandidate],
    tree_candidates: &[TreeCandidate],
    tolerance: usize,
) -> Vec<Option<usize>> {
    let mut pairs = vec![None; scanned.len()];
    for (ti, tc) in tree_candidates.iter().enumerate() {
        let anchor = tc.candidate.start;
        let lo = scanned.partition_point(|s| s.start + tolerance < anchor);
        let best = scanned[lo..]
            .iter()
            .enumerate()
            .take_while(|(_, s)| s.start <= anchor + tolerance)
            .filter(|(i, _)| pairs[lo + i].is_none())
            .min_by_key(|(_, s)| s.start.abs_diff(anchor))
            .map(|(i, _)| lo + i);
        match best {
            Some(si) => pairs[si] = Some(ti),
            None => debug!(
                "dropping tree-only candidate '{}' at offset {}",
                tc.candidate.name.as_deref().unwrap_or("?"),
                anchor
            ),
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::ClojureParser;
    use crate::scanner::scan;

    fn records(src: &str, mode: ReconcileMode) -> Vec<FormRecord> {
        let parser = ClojureParser::new().unwrap();
        let tree = parser.parse(src).unwrap();
        let lines = LineIndex::new(src);
        let scanned = scan(&tokenize(src), src);
        let tree_candidates = collect_tree_candidates(&parser, &tree, src);
        Reconciler::new(src, &lines, mode).reconcile(&scanned, &tree_candidates)
    }

    fn hybrid(src: &str) -> Vec<FormRecord> {
        records(src, ReconcileMode::Hybrid { anchor_tolerance: 2 })
    }

    #[test]
    fn test_confirmed_records() {
        let src = "(ns demo.core)\n\n(defn- helper \"Doc.\" [x] (inc x))\n(defmacro m [& body] `(do ~@body))";
        let recs = hybrid(src);
        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].kind, FormKind::NamespaceDecl);
        assert_eq!(recs[1].kind, FormKind::FunctionDef);
        assert_eq!(recs[1].visibility, Some(Visibility::Private));
        assert_eq!(recs[1].docstring.as_deref(), Some("Doc."));
        assert_eq!(recs[1].origin, RecordOrigin::TreeConfirmed);
        assert_eq!(recs[1].confidence, Confidence::High);
        assert_eq!(recs[2].kind, FormKind::MacroDef);
        assert_eq!(recs[2].visibility, None);
        for r in &recs {
            assert_eq!(r.raw_text, &src[r.span.start..r.span.end]);
        }
    }

    #[test]
    fn test_unmatched_scanner_candidate_is_synthesized() {
        let src = "(defn a [x] x)";
        let lines = LineIndex::new(src);
        let scanned = scan(&tokenize(src), src);
        let recs = Reconciler::new(src, &lines, ReconcileMode::Hybrid { anchor_tolerance: 2 })
            .reconcile(&scanned, &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].origin, RecordOrigin::Synthesized);
        assert_eq!(recs[0].gaps, vec![ReconciliationGap::TreeNodeMissing]);
        assert_eq!(recs[0].confidence, Confidence::Low);
        assert_eq!(recs[0].parameter_shapes, vec!["[x]"]);
    }

    #[test]
    fn test_disagreeing_name_is_corrected() {
        let src = "(defn right [x] x)";
        let parser = ClojureParser::new().unwrap();
        let tree = parser.parse(src).unwrap();
        let lines = LineIndex::new(src);
        let scanned = scan(&tokenize(src), src);
        let mut tree_candidates = collect_tree_candidates(&parser, &tree, src);
        tree_candidates[0].candidate.name = Some("wrong".to_string());
        let recs = Reconciler::new(src, &lines, ReconcileMode::Hybrid { anchor_tolerance: 2 })
            .reconcile(&scanned, &tree_candidates);
        assert_eq!(recs[0].name.as_deref(), Some("right"));
        assert_eq!(recs[0].origin, RecordOrigin::NameCorrected);
        assert_eq!(recs[0].parameter_shapes, vec!["[x]"]);
    }

    #[test]
    fn test_misplaced_tree_structure_is_read_from_text() {
        let src = "(defn right \"Doc.\" [x] x)";
        let parser = ClojureParser::new().unwrap();
        let tree = parser.parse(src).unwrap();
        let lines = LineIndex::new(src);
        let scanned = scan(&tokenize(src), src);
        let mut tree_candidates = collect_tree_candidates(&parser, &tree, src);
        let tc = &mut tree_candidates[0];
        tc.candidate.name = Some("wrong".to_string());
        tc.candidate.end = 12;
        for child in &mut tc.sexp.children {
            child.span = Span::new(child.span.start + 100, child.span.end + 100);
        }

        let recs = Reconciler::new(src, &lines, ReconcileMode::Hybrid { anchor_tolerance: 2 })
            .reconcile(&scanned, &tree_candidates);
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.origin, RecordOrigin::NameCorrected);
        assert_eq!(rec.gaps, vec![ReconciliationGap::StructureFromText]);
        assert_eq!(rec.confidence, Confidence::Low);
        assert_eq!(rec.name.as_deref(), Some("right"));
        assert_eq!(rec.docstring.as_deref(), Some("Doc."));
        assert_eq!(rec.parameter_shapes, vec!["[x]"]);
        assert_eq!(rec.span, Span::new(0, src.len()));
    }

    #[test]
    fn test_quoted_definition_is_generic() {
        let recs = hybrid("'(defn not-code [] 1)");
        assert_eq!(recs[0].kind, FormKind::GenericList);
        assert_eq!(recs[0].visibility, None);
        assert!(recs[0].gaps.contains(&ReconciliationGap::ReaderPrefixed {
            prefix: "'".to_string()
        }));
    }

    #[test]
    fn test_missing_name_becomes_other() {
        let recs = hybrid("(defn [x] x)");
        assert_eq!(recs[0].kind, FormKind::Other);
        assert!(recs[0].gaps.contains(&ReconciliationGap::MissingName));
    }

    #[test]
    fn test_truncated_form() {
        let src = "(defn ok [] 1)\n(defn broken [x]";
        let recs = hybrid(src);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].span.end, src.len());
        assert!(recs[1].gaps.contains(&ReconciliationGap::Truncated));
        assert!(recs[1].is_low_confidence());
    }

    #[test]
    fn test_tree_only_mode() {
        let recs = records("(defn a [x] x)", ReconcileMode::TreeOnly);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].origin, RecordOrigin::TreeOnly);
        assert_eq!(recs[0].name.as_deref(), Some("a"));
    }
}
