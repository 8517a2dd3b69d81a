use crate::lexer;
use crate::navigate::{FormIndex, Navigator};
use crate::parser::ClojureParser;
use crate::reconcile::{ReconcileMode, Reconciler, collect_tree_candidates};
use crate::scanner;
use cljscope_api::{FormRecord, SourceBuffer};
use cljscope_core::Result;
use cljscope_core::config::ReconciliationConfig;
use cljscope_core::text::LineIndex;
use tracing::warn;
use tree_sitter::Tree;

/// Everything derived from one buffer: the tree, the reconciled records and the
/// lexical form index.
pub struct FileAnalysis {
    pub buffer: SourceBuffer,
    pub lines: LineIndex,
    pub tree: Tree,
    pub records: Vec<FormRecord>,
    pub index: FormIndex,
}

impl FileAnalysis {
    pub fn build(
        parser: &ClojureParser,
        buffer: SourceBuffer,
        config: &ReconciliationConfig,
    ) -> Result<Self> {
        let source = buffer.text();

        let ((scanned, mut index), tree) = rayon::join(
            || {
                let tokens = lexer::tokenize(source);
                (scanner::scan(&tokens, source), FormIndex::build(&tokens, source))
            },
            || parser.parse(source),
        );
        let tree = tree?;

        let lines = LineIndex::new(source);
        let tree_candidates = collect_tree_candidates(parser, &tree, source);
        let records = Reconciler::new(source, &lines, ReconcileMode::from_config(config))
            .reconcile(&scanned, &tree_candidates);

        for record in records.iter().filter(|r| r.is_low_confidence()) {
            warn!(
                "low-confidence {} '{}' at {}:{} in {}: {:?}",
                record.kind,
                record.name.as_deref().unwrap_or("?"),
                record.range.start_line,
                record.range.start_col,
                buffer.path().display(),
                record.gaps
            );
        }

        index.label(&records);

        Ok(Self {
            lines,
            tree,
            records,
            index,
            buffer,
        })
    }

    pub fn source(&self) -> &str {
        self.buffer.text()
    }

    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::new(&self.index, &self.lines, self.buffer.len())
    }
}
