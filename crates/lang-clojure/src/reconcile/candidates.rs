use crate::parser::ClojureParser;
use crate::scanner::{BoundaryCandidate, CandidateSource, definition_kind};
use crate::sexp::{self, Sexp};
use cljscope_api::Confidence;
use cljscope_core::parser::utils::node_text;
use tree_sitter::{Node, Tree};

/// A definition form as the syntax tree sees it.
pub struct TreeCandidate {
    pub candidate: BoundaryCandidate,
    pub sexp: Sexp,
}

/// Definition lists found by the call query, in document order.
pub fn collect_tree_candidates(
    parser: &ClojureParser,
    tree: &Tree,
    source: &str,
) -> Vec<TreeCandidate> {
    parser
        .calls(tree, source)
        .into_iter()
        .filter(|call| call.node.kind() == "list_lit" && definition_kind(&call.head).is_some())
        .map(|call| {
            let sexp = sexp::from_node(call.node, source);
            let name_form = sexp.children.get(1).filter(|n| n.is_symbol());
            let mut candidate = BoundaryCandidate {
                start: call.span.start,
                end: call.span.end,
                confidence: Confidence::Low,
                source: CandidateSource::Tree,
                keyword: call.head.clone(),
                name: name_form.map(|n| n.text(source).to_string()),
                name_span: name_form.map(|n| n.span),
                depth: collection_depth(call.node),
                private_meta: name_form.is_some_and(|n| n.has_private_meta(source)),
                truncated: !sexp.closed,
                mismatched: false,
                reader_prefix: quoting_ancestor(call.node, source),
            };
            candidate.settle_confidence();
            TreeCandidate { candidate, sexp }
        })
        .collect()
}

fn is_collection(kind: &str) -> bool {
    matches!(
        kind,
        "list_lit"
            | "vec_lit"
            | "map_lit"
            | "set_lit"
            | "anon_fn_lit"
            | "read_cond_lit"
            | "splicing_read_cond_lit"
            | "ns_map_lit"
    )
}

fn collection_depth(node: Node) -> usize {
    let mut depth = 0;
    let mut current = node.parent();
    while let Some(parent) = current {
        if is_collection(parent.kind()) {
            depth += 1;
        }
        current = parent.parent();
    }
    depth
}

/// Reader macro of the nearest ancestor that turns code into data.
fn quoting_ancestor(node: Node, source: &str) -> Option<String> {
    let mut current = node.parent();
    while let Some(parent) = current {
        let prefix = match parent.kind() {
            "quoting_lit" => Some("'".to_string()),
            "syn_quoting_lit" => Some("`".to_string()),
            "dis_expr" => Some("#_".to_string()),
            "evaling_lit" => Some("#=".to_string()),
            "tagged_or_ctor_lit" => node_text(&parent, source)
                .split_whitespace()
                .next()
                .map(str::to_string),
            _ => None,
        };
        if prefix.is_some() {
            return prefix;
        }
        current = parent.parent();
    }
    None
}
