//! Function, macro, namespace and type records derived from form records.

mod calls;
mod namespace;
mod types;

use crate::analysis::FileAnalysis;
use crate::parser::ClojureParser;
use crate::sexp::{self, Sexp};
use cljscope_api::{
    AnalysisError, CallGraph, FormKind, FormRecord, FunctionRecord, MacroRecord,
    NamespaceRecord, TypeRecord, Visibility,
};
use cljscope_core::Result;
use cljscope_core::project::pattern::NamePattern;

pub struct Extractor<'a> {
    analysis: &'a FileAnalysis,
    parser: &'a ClojureParser,
}

impl<'a> Extractor<'a> {
    pub fn new(analysis: &'a FileAnalysis, parser: &'a ClojureParser) -> Self {
        Self { analysis, parser }
    }

    fn source(&self) -> &'a str {
        self.analysis.buffer.text()
    }

    fn records_of(&self, kind: FormKind) -> impl Iterator<Item = &'a FormRecord> + 'a {
        self.analysis.records.iter().filter(move |r| r.kind == kind)
    }

    /// Name of the closest top-level namespace declaration before `offset`.
    fn namespace_at(&self, offset: usize) -> Option<String> {
        self.analysis
            .records
            .iter()
            .filter(|r| {
                r.kind == FormKind::NamespaceDecl && r.is_top_level() && r.span.start < offset
            })
            .last()
            .and_then(|r| r.name.clone())
    }

    /// The form behind a record: the tree node anchored at its span when there is
    /// one, otherwise the form re-read from text.
    fn form_of(&self, record: &FormRecord) -> Option<Sexp> {
        if let Some(node) = self.parser.node_at(&self.analysis.tree, record.span) {
            return Some(sexp::from_node(node, self.source()));
        }
        sexp::read_span(self.source(), record.span).into_iter().next()
    }

    pub fn functions(&self, pattern: Option<&NamePattern>) -> Vec<FunctionRecord> {
        self.records_of(FormKind::FunctionDef)
            .filter_map(|r| {
                let name = r.name.as_ref()?;
                if pattern.is_some_and(|p| !p.matches(name)) {
                    return None;
                }
                Some(FunctionRecord {
                    name: name.clone(),
                    visibility: r.visibility.unwrap_or(Visibility::Public),
                    arities: r.parameter_shapes.clone(),
                    docstring: r.docstring.clone(),
                    namespace: self.namespace_at(r.span.start),
                    span: r.span,
                    range: r.range,
                    confidence: r.confidence,
                })
            })
            .collect()
    }

    pub fn macros(&self, pattern: Option<&NamePattern>) -> Vec<MacroRecord> {
        self.records_of(FormKind::MacroDef)
            .filter_map(|r| {
                let name = r.name.as_ref()?;
                if pattern.is_some_and(|p| !p.matches(name)) {
                    return None;
                }
                Some(MacroRecord {
                    name: name.clone(),
                    arities: r.parameter_shapes.clone(),
                    docstring: r.docstring.clone(),
                    namespace: self.namespace_at(r.span.start),
                    span: r.span,
                    range: r.range,
                    confidence: r.confidence,
                })
            })
            .collect()
    }

    pub fn namespaces(&self) -> Vec<NamespaceRecord> {
        let declarations: Vec<&FormRecord> = self
            .records_of(FormKind::NamespaceDecl)
            .filter(|r| r.name.is_some())
            .collect();
        let functions = self.functions(None);

        declarations
            .iter()
            .enumerate()
            .map(|(i, decl)| {
                let clauses = self
                    .form_of(decl)
                    .map(|form| namespace::parse_clauses(&form, self.source()))
                    .unwrap_or_default();
                let scope_end = declarations
                    .get(i + 1)
                    .map(|next| next.span.start)
                    .unwrap_or(usize::MAX);
                let defined_symbols = functions
                    .iter()
                    .filter(|f| f.span.start >= decl.span.end && f.span.start < scope_end)
                    .map(|f| f.name.clone())
                    .collect();
                NamespaceRecord {
                    name: decl.name.clone().unwrap_or_default(),
                    docstring: decl.docstring.clone(),
                    requires: clauses.requires,
                    imports: clauses.imports,
                    defined_symbols,
                    span: decl.span,
                    range: decl.range,
                }
            })
            .collect()
    }

    pub fn types(&self, pattern: Option<&NamePattern>) -> Vec<TypeRecord> {
        self.analysis
            .records
            .iter()
            .filter(|r| matches!(r.kind, FormKind::ProtocolDef | FormKind::TypeDef))
            .filter(|r| match (pattern, &r.name) {
                (Some(p), Some(name)) => p.matches(name),
                (Some(_), None) => false,
                (None, _) => true,
            })
            .filter_map(|r| {
                let form = self.form_of(r)?;
                types::type_record(r, &form, self.source(), self.namespace_at(r.span.start))
            })
            .collect()
    }

    pub fn call_graph(&self, target: Option<&str>) -> Result<CallGraph> {
        let functions = self.functions(None);
        let calls = self.parser.calls(&self.analysis.tree, self.source());
        let graph = calls::build_call_graph(&functions, &calls);
        match target {
            None => Ok(graph),
            Some(t) => calls::focus(graph, t)
                .ok_or_else(|| AnalysisError::NotFound(format!("function '{}'", t))),
        }
    }
}
