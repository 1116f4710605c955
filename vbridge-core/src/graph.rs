//! Comparison graph snapshots and their renderable projection.
//!
//! The verifier sends a [`ComparisonGraph`] on every update. The interface never
//! draws it directly: [`build_rendered_graph`] turns it into a [`RenderedGraph`]
//! of text nodes, highlight categories and directed edges. The projection is
//! rebuilt from scratch on each update and is fully deterministic, so two
//! replays of the same transcript produce byte-identical graphs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Separator between a node and its predecessor chain inside an identifier.
const PREDECESSOR_SEPARATOR: &str = " <- ";
/// Marker for a node that pairs an original and a patched block.
const TWO_SIDED_MARKER: &str = " vs ";
/// Marker for a node that only exists on the original side.
const ORIGINAL_MARKER: &str = "(original";
/// Marker for a node that only exists on the patched side.
const PATCHED_MARKER: &str = "(patched)";

/// One node of the verifier's comparison graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonNode {
    pub id: String,
    /// Identifiers of successor nodes.
    #[serde(default)]
    pub exits: Vec<String>,
    /// Pretty-printed node summary, one entry per line.
    #[serde(default)]
    pub contents: Vec<String>,
    /// Counter-example trace detail, shown only on request.
    #[serde(default)]
    pub ce_trace: Vec<String>,
}

impl ComparisonNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), exits: Vec::new(), contents: Vec::new(), ce_trace: Vec::new() }
    }

    pub fn with_exits<I, S>(mut self, exits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exits = exits.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_contents<I, S>(mut self, contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contents = contents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ce_trace<I, S>(mut self, trace: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ce_trace = trace.into_iter().map(Into::into).collect();
        self
    }

    /// Writes the node's content block, trace detail included only when asked.
    fn pretty_print(&self, show_ce_trace: bool, out: &mut String) {
        for line in &self.contents {
            out.push_str(line);
            out.push('\n');
        }
        if show_ce_trace && !self.ce_trace.is_empty() {
            out.push_str("Counter-example trace:\n");
            for line in &self.ce_trace {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
}

/// A complete snapshot of the comparison graph, in the verifier's order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonGraph {
    pub nodes: Vec<ComparisonNode>,
}

impl ComparisonGraph {
    pub fn new(nodes: Vec<ComparisonNode>) -> Self {
        Self { nodes }
    }
}

/// Visual category of a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Highlight {
    /// No highlight. Used for two-sided nodes and anything unrecognised.
    #[default]
    Plain,
    /// Node belongs to the original program only.
    Original,
    /// Node belongs to the patched program only.
    Patched,
}

/// Classifies a node identifier into a highlight category.
///
/// The rules are checked in this order and the first match wins:
///
/// 1. contains `" vs "` → [`Highlight::Plain`] (two-sided nodes are never tinted)
/// 2. contains `"(original"` → [`Highlight::Original`]
/// 3. contains `"(patched)"` → [`Highlight::Patched`]
/// 4. otherwise → [`Highlight::Plain`]
pub fn classify(id: &str) -> Highlight {
    if id.contains(TWO_SIDED_MARKER) {
        Highlight::Plain
    } else if id.contains(ORIGINAL_MARKER) {
        Highlight::Original
    } else if id.contains(PATCHED_MARKER) {
        Highlight::Patched
    } else {
        Highlight::Plain
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedNode {
    pub id: String,
    pub lines: Vec<String>,
    pub highlight: Highlight,
}

/// Directed edge, always from a node to one of its exits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedGraph {
    pub nodes: Vec<RenderedNode>,
    pub edges: Vec<RenderedEdge>,
}

impl RenderedGraph {
    pub fn node(&self, id: &str) -> Option<&RenderedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Groups the edges by source node in one pass, keeping insertion order.
    pub fn edges_by_source(&self) -> HashMap<&str, Vec<&RenderedEdge>> {
        let mut out: HashMap<&str, Vec<&RenderedEdge>> = HashMap::new();
        for edge in &self.edges {
            out.entry(edge.source.as_str()).or_default().push(edge);
        }
        out
    }
}

/// Projects a comparison graph snapshot into a renderable graph.
///
/// Node order and edge order follow the snapshot. Every exit becomes an edge,
/// including exits naming a node the snapshot does not (yet) contain; the
/// verifier builds the graph incrementally and the snapshot is authoritative.
pub fn build_rendered_graph(graph: &ComparisonGraph, show_ce_trace: bool) -> RenderedGraph {
    let mut nodes = Vec::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        let mut text = node.id.replace(PREDECESSOR_SEPARATOR, "\n  <- ");
        text.push('\n');
        node.pretty_print(show_ce_trace, &mut text);
        let lines = text.split('\n').map(str::to_owned).collect();
        nodes.push(RenderedNode { id: node.id.clone(), lines, highlight: classify(&node.id) });
    }

    let known: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
    let mut edges = Vec::new();
    for node in &graph.nodes {
        for exit in &node.exits {
            if !known.contains(exit.as_str()) {
                tracing::debug!(source = %node.id, target = %exit, "edge to node outside snapshot");
            }
            edges.push(RenderedEdge { source: node.id.clone(), target: exit.clone() });
        }
    }

    RenderedGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_graph() -> ComparisonGraph {
        ComparisonGraph::new(vec![
            ComparisonNode::new("A (original)").with_exits(["B"]),
            ComparisonNode::new("B (patched)"),
        ])
    }

    #[test]
    fn classification_follows_rule_order() {
        assert_eq!(classify("0x10 (original) vs 0x10 (patched)"), Highlight::Plain);
        assert_eq!(classify("0x10 (original)"), Highlight::Original);
        assert_eq!(classify("0x10 (original, return)"), Highlight::Original);
        assert_eq!(classify("0x20 (patched)"), Highlight::Patched);
        assert_eq!(classify("0x30"), Highlight::Plain);
    }

    #[test]
    fn vs_marker_wins_over_original_marker() {
        assert_eq!(classify("f (original) vs g"), Highlight::Plain);
    }

    #[test]
    fn identifier_separator_is_split_across_lines() {
        let graph = ComparisonGraph::new(vec![ComparisonNode::new("a <- b <- c")
            .with_contents(["summary"])]);
        let rendered = build_rendered_graph(&graph, false);
        assert_eq!(
            rendered.nodes[0].lines,
            vec!["a", "  <- b", "  <- c", "summary", ""]
        );
    }

    #[test]
    fn ce_trace_only_included_when_requested() {
        let graph = ComparisonGraph::new(vec![ComparisonNode::new("n")
            .with_contents(["body"])
            .with_ce_trace(["step 1"])]);
        let hidden = build_rendered_graph(&graph, false);
        assert!(!hidden.nodes[0].lines.iter().any(|l| l.contains("step 1")));
        let shown = build_rendered_graph(&graph, true);
        assert!(shown.nodes[0].lines.contains(&"  step 1".to_owned()));
    }

    #[test]
    fn edges_follow_exit_relation() {
        let rendered = build_rendered_graph(&two_node_graph(), false);
        assert_eq!(
            rendered.edges,
            vec![RenderedEdge { source: "A (original)".into(), target: "B".into() }]
        );
        let by_source = rendered.edges_by_source();
        assert_eq!(by_source.get("A (original)").map(Vec::len), Some(1));
        assert!(!by_source.contains_key("B (patched)"));
    }

    #[test]
    fn two_node_graph_is_classified_and_stable() {
        let graph = two_node_graph();
        let first = build_rendered_graph(&graph, false);
        assert_eq!(first.node("A (original)").unwrap().highlight, Highlight::Original);
        assert_eq!(first.node("B (patched)").unwrap().highlight, Highlight::Patched);
        let second = build_rendered_graph(&graph, false);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn node_order_follows_snapshot() {
        let graph = ComparisonGraph::new(vec![
            ComparisonNode::new("z"),
            ComparisonNode::new("a"),
            ComparisonNode::new("m"),
        ]);
        let ids: Vec<_> = build_rendered_graph(&graph, false)
            .nodes
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, ["z", "a", "m"]);
    }
}
