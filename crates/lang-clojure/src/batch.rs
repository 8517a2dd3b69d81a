//! Multi-file operations: batch extraction and the namespace dependency graph.

use crate::analyzer::ClojureAnalyzer;
use crate::extract::Extractor;
use cljscope_api::{
    AnalysisError, BatchAnalysis, BatchEntry, BatchReport, DependencyEdge, DependencyKind,
    DependencyTree, FunctionRecord, NamespaceGraph, NamespaceNode, NamespaceRecord,
};
use cljscope_core::Result;
use cljscope_core::project::pattern::NamePattern;
use cljscope_core::project::source::read_buffer;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

impl ClojureAnalyzer {
    fn functions_in(&self, path: &Path, pattern: Option<&NamePattern>) -> Result<Vec<FunctionRecord>> {
        let buffer = read_buffer(path)?;
        let analysis = self.analyze(&buffer)?;
        Ok(Extractor::new(&analysis, self.parser()).functions(pattern))
    }

    fn namespaces_in(&self, path: &Path) -> Result<Vec<NamespaceRecord>> {
        let buffer = read_buffer(path)?;
        let analysis = self.analyze(&buffer)?;
        Ok(Extractor::new(&analysis, self.parser()).namespaces())
    }

    fn graph_builder(&self, paths: &[PathBuf]) -> Result<GraphBuilder> {
        let per_file = paths
            .par_iter()
            .map(|path| match self.namespaces_in(path) {
                Ok(namespaces) => Ok(Some((path.clone(), namespaces))),
                Err(e) if e.is_fatal_for_batch() => Err(e),
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    Ok(None)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut builder = GraphBuilder::default();
        for (path, namespaces) in per_file.iter().flatten() {
            for ns in namespaces {
                builder.declare(&ns.name, path);
            }
        }
        for (_, namespaces) in per_file.iter().flatten() {
            for ns in namespaces {
                for spec in &ns.requires {
                    builder.depend(&ns.name, &spec.namespace, DependencyKind::Require);
                }
                for spec in &ns.imports {
                    builder.depend(&ns.name, &spec.namespace, DependencyKind::Import);
                }
            }
        }

        Ok(builder)
    }
}

impl BatchAnalysis for ClojureAnalyzer {
    fn extract_functions_batch(
        &self,
        paths: &[PathBuf],
        name_pattern: Option<&str>,
    ) -> Result<BatchReport<Vec<FunctionRecord>>> {
        let pattern = NamePattern::optional(name_pattern)?;
        info!("extracting functions from {} files", paths.len());

        let entries = paths
            .par_iter()
            .map(|path| match self.functions_in(path, pattern.as_ref()) {
                Ok(functions) => Ok(BatchEntry::ok(path.clone(), functions)),
                Err(e) if e.is_fatal_for_batch() => Err(e),
                Err(e) => {
                    warn!("skipping {}: {}", path.display(), e);
                    Ok(BatchEntry::failed(path.clone(), e))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let report = BatchReport::from_entries(entries);
        info!(
            "batch done: {} succeeded, {} failed",
            report.succeeded, report.failed
        );
        Ok(report)
    }

    fn namespace_graph(&self, paths: &[PathBuf]) -> Result<NamespaceGraph> {
        info!("building namespace graph over {} files", paths.len());
        let graph = self.graph_builder(paths)?.finish();
        info!(
            "namespace graph: {} namespaces, {} edges, {} cycles",
            graph.namespaces.len(),
            graph.edges.len(),
            graph.cycles.len()
        );
        Ok(graph)
    }

    fn namespace_dependency_tree(
        &self,
        paths: &[PathBuf],
        root: &str,
        max_depth: usize,
    ) -> Result<DependencyTree> {
        info!("dependency tree of {} over {} files", root, paths.len());
        self.graph_builder(paths)?
            .tree(root, max_depth)
            .ok_or_else(|| AnalysisError::NotFound(format!("namespace '{}'", root)))
    }
}

#[derive(Default)]
struct GraphBuilder {
    graph: DiGraph<String, DependencyKind>,
    nodes: HashMap<String, NodeIndex>,
    paths: HashMap<String, PathBuf>,
}

impl GraphBuilder {
    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(idx) = self.nodes.get(name) {
            return *idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    fn declare(&mut self, name: &str, path: &Path) {
        self.node(name);
        self.paths
            .entry(name.to_string())
            .or_insert_with(|| path.to_path_buf());
    }

    fn depend(&mut self, from: &str, to: &str, kind: DependencyKind) {
        let from = self.node(from);
        let to = self.node(to);
        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|e| *e.weight() == kind);
        if !exists {
            self.graph.add_edge(from, to, kind);
        }
    }

    /// Breadth-first walk from `root`; each namespace is listed at the level it
    /// is first reached and the root itself is never listed.
    fn tree(&self, root: &str, max_depth: usize) -> Option<DependencyTree> {
        let start = *self.nodes.get(root)?;
        let mut visited = HashSet::from([start]);
        let mut frontier = vec![start];
        let mut levels: Vec<Vec<String>> = Vec::new();

        while !frontier.is_empty() && levels.len() < max_depth {
            let mut next: Vec<NodeIndex> = frontier
                .iter()
                .flat_map(|&n| self.graph.neighbors_directed(n, petgraph::Direction::Outgoing))
                .filter(|n| visited.insert(*n))
                .collect();
            if next.is_empty() {
                break;
            }
            next.sort_by(|a, b| self.graph[*a].cmp(&self.graph[*b]));
            levels.push(next.iter().map(|n| self.graph[*n].clone()).collect());
            frontier = next;
        }

        Some(DependencyTree {
            root: root.to_string(),
            direct: levels.first().cloned().unwrap_or_default(),
            total_transitive: levels.iter().map(Vec::len).sum(),
            max_depth,
            levels,
        })
    }

    fn finish(self) -> NamespaceGraph {
        let graph = &self.graph;
        let names = |indices: &mut dyn Iterator<Item = NodeIndex>| -> Vec<String> {
            let mut names: Vec<String> = indices.map(|i| graph[i].clone()).collect();
            names.sort();
            names.dedup();
            names
        };

        let mut namespaces: Vec<NamespaceNode> = graph
            .node_indices()
            .map(|idx| NamespaceNode {
                name: graph[idx].clone(),
                path: self.paths.get(&graph[idx]).cloned(),
                dependencies: names(
                    &mut graph.neighbors_directed(idx, petgraph::Direction::Outgoing),
                ),
                dependents: names(
                    &mut graph.neighbors_directed(idx, petgraph::Direction::Incoming),
                ),
            })
            .collect();
        namespaces.sort_by(|a, b| a.name.cmp(&b.name));

        let mut edges: Vec<DependencyEdge> = graph
            .edge_indices()
            .filter_map(|e| {
                let (from, to) = graph.edge_endpoints(e)?;
                Some(DependencyEdge {
                    from: graph[from].clone(),
                    to: graph[to].clone(),
                    kind: graph[e],
                })
            })
            .collect();
        edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

        let mut cycles: Vec<Vec<String>> = tarjan_scc(graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| names(&mut scc.into_iter()))
            .collect();
        cycles.sort();

        NamespaceGraph {
            namespaces,
            edges,
            cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_detection_and_external_nodes() {
        let mut builder = GraphBuilder::default();
        builder.declare("a", Path::new("a.clj"));
        builder.declare("b", Path::new("b.clj"));
        builder.depend("a", "b", DependencyKind::Require);
        builder.depend("b", "a", DependencyKind::Require);
        builder.depend("a", "clojure.string", DependencyKind::Require);
        builder.depend("a", "clojure.string", DependencyKind::Require);

        let graph = builder.finish();
        assert_eq!(graph.cycles, vec![vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(graph.edges.len(), 3);
        assert!(graph.node("clojure.string").unwrap().is_external());
        assert_eq!(graph.node("clojure.string").unwrap().dependents, vec!["a"]);
        assert!(!graph.node("a").unwrap().is_external());
    }

    #[test]
    fn test_tree_levels_and_depth_limit() {
        let mut builder = GraphBuilder::default();
        builder.depend("app", "db", DependencyKind::Require);
        builder.depend("app", "http", DependencyKind::Require);
        builder.depend("db", "jdbc", DependencyKind::Require);
        builder.depend("http", "jdbc", DependencyKind::Require);
        builder.depend("jdbc", "app", DependencyKind::Require);
        builder.depend("jdbc", "java.sql.Connection", DependencyKind::Import);

        let tree = builder.tree("app", 10).unwrap();
        assert_eq!(tree.direct, vec!["db", "http"]);
        assert_eq!(
            tree.levels,
            vec![
                vec!["db".to_string(), "http".to_string()],
                vec!["jdbc".to_string()],
                vec!["java.sql.Connection".to_string()],
            ]
        );
        assert_eq!(tree.total_transitive, 4);

        let shallow = builder.tree("app", 1).unwrap();
        assert_eq!(shallow.levels.len(), 1);
        assert_eq!(shallow.total_transitive, 2);

        assert!(builder.tree("missing", 3).is_none());
        assert!(builder.tree("java.sql.Connection", 3).unwrap().levels.is_empty());
    }
}
