use super::form::{Confidence, Visibility};
use super::span::{Range, Span};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A function definition, derived one-to-one from a `function-def` form record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct FunctionRecord {
    pub name: String,
    pub visibility: Visibility,
    /// Parameter vectors as written, one per arity.
    pub arities: Vec<String>,
    pub docstring: Option<String>,
    /// Namespace declared by the closest preceding top-level `ns` form.
    pub namespace: Option<String>,
    pub span: Span,
    pub range: Range,
    pub confidence: Confidence,
}

impl FunctionRecord {
    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    pub fn is_multi_arity(&self) -> bool {
        self.arities.len() > 1
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct MacroRecord {
    pub name: String,
    pub arities: Vec<String>,
    pub docstring: Option<String>,
    pub namespace: Option<String>,
    pub span: Span,
    pub range: Range,
    pub confidence: Confidence,
}

/// One entry of a `:require`, `:use` or `:import` clause.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct DependencySpec {
    /// Namespace for requires, package (or fully qualified class) for imports.
    pub namespace: String,
    pub alias: Option<String>,
    /// Referred vars for requires, class names for package-style imports.
    pub refers: Vec<String>,
    pub refer_all: bool,
    /// Source text of the clause entry.
    pub raw: String,
}

impl DependencySpec {
    pub fn named(namespace: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            raw: raw.into(),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct NamespaceRecord {
    pub name: String,
    pub docstring: Option<String>,
    pub requires: Vec<DependencySpec>,
    pub imports: Vec<DependencySpec>,
    /// Names of functions declared after this declaration, looked up by name.
    pub defined_symbols: Vec<String>,
    pub span: Span,
    pub range: Range,
}

impl NamespaceRecord {
    pub fn required_namespaces(&self) -> Vec<&str> {
        self.requires.iter().map(|r| r.namespace.as_str()).collect()
    }

    pub fn imported_names(&self) -> Vec<&str> {
        self.imports.iter().map(|r| r.namespace.as_str()).collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Protocol,
    Type,
    Record,
    Interface,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct MethodSignature {
    pub name: String,
    pub arities: Vec<String>,
    pub docstring: Option<String>,
    /// Protocol or interface the method is implemented for, if stated.
    pub protocol: Option<String>,
}

/// `defprotocol`, `deftype`, `defrecord` and `definterface` forms.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct TypeRecord {
    pub kind: TypeKind,
    pub name: String,
    pub docstring: Option<String>,
    pub fields: Vec<String>,
    pub protocols: Vec<String>,
    pub methods: Vec<MethodSignature>,
    pub namespace: Option<String>,
    pub span: Span,
    pub range: Range,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct FunctionCalls {
    pub name: String,
    /// Distinct call heads in body order, special forms excluded.
    pub calls: Vec<String>,
    /// Functions of the same buffer calling this one.
    pub called_by: Vec<String>,
    pub span: Span,
    /// Distinct calls plus branching forms (`if`, `let`, `loop`, ...) in the body.
    pub complexity: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
    /// Offsets of each call site inside the caller.
    pub sites: Vec<Span>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default, JsonSchema)]
pub struct CallGraph {
    pub functions: Vec<FunctionCalls>,
    pub edges: Vec<CallEdge>,
}
