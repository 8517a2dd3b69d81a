use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Require,
    Import,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct NamespaceNode {
    pub name: String,
    /// File declaring the namespace; `None` for external dependencies.
    pub path: Option<PathBuf>,
    pub dependencies: Vec<String>,
    pub dependents: Vec<String>,
}

impl NamespaceNode {
    pub fn is_external(&self) -> bool {
        self.path.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub kind: DependencyKind,
}

/// Namespace dependencies across one analysis batch, linked by name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct NamespaceGraph {
    pub namespaces: Vec<NamespaceNode>,
    pub edges: Vec<DependencyEdge>,
    /// Groups of declared namespaces that require each other in a cycle.
    pub cycles: Vec<Vec<String>>,
}

impl NamespaceGraph {
    pub fn node(&self, name: &str) -> Option<&NamespaceNode> {
        self.namespaces.iter().find(|n| n.name == name)
    }
}

/// Transitive dependencies of one namespace, level by level.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct DependencyTree {
    pub root: String,
    /// Namespaces the root requires or imports directly.
    pub direct: Vec<String>,
    /// `levels[k]` holds the namespaces first reached `k + 1` edges from the root.
    pub levels: Vec<Vec<String>>,
    pub max_depth: usize,
    pub total_transitive: usize,
}
