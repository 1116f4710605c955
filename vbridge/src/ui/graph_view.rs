//! Graph panel renderer for vbridge.
//!
//! Lays the rendered comparison graph out as a vertical listing: each node's
//! text block in its highlight color, followed by one `-> target` line per
//! outgoing edge. Only the visible window is materialized into `ListItem`s.
//!
//! The flattened lines are cached in [`GraphCache`] and rebuilt only when the
//! surface's revision moves.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use vbridge_core::graph::RenderedGraph;
use vbridge_core::surface::Surface;

use crate::app::{AppState, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Flattened graph lines for one surface revision.
#[derive(Debug, Default)]
pub struct GraphCache {
    revision: Option<u64>,
    lines: Vec<Line<'static>>,
}

impl GraphCache {
    /// Returns the lines for the surface's current graph, rebuilding them only
    /// when the surface changed since the last call. The theme is fixed for
    /// the lifetime of the interface, so it is not part of the key.
    pub fn lines(&mut self, surface: &Surface, theme: &Theme) -> &[Line<'static>] {
        let revision = surface.revision();
        if self.revision != Some(revision) {
            self.lines = surface.graph().map(|g| graph_lines(g, theme)).unwrap_or_default();
            self.revision = Some(revision);
        }
        &self.lines
    }
}

/// Flattens a rendered graph into styled display lines.
pub fn graph_lines(graph: &RenderedGraph, theme: &Theme) -> Vec<Line<'static>> {
    let edges = graph.edges_by_source();
    let mut out = Vec::new();
    for node in &graph.nodes {
        let color = theme.highlight(node.highlight);
        let end = node.lines.iter().rposition(|l| !l.is_empty()).map_or(0, |i| i + 1);
        for (i, text) in node.lines[..end].iter().enumerate() {
            let mut style = Style::default().fg(color);
            if i == 0 {
                style = style.add_modifier(Modifier::BOLD);
            }
            out.push(Line::from(Span::styled(text.clone(), style)));
        }
        for edge in edges.get(node.id.as_str()).into_iter().flatten() {
            out.push(Line::from(Span::styled(
                format!("  -> {}", edge.target.replace('\n', " ")),
                Style::default().fg(theme.graph_edge),
            )));
        }
        out.push(Line::default());
    }
    out
}

/// Renders the graph panel, clamping `state.graph_scroll` to the content.
pub fn render_graph(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Graph;
    let title = match state.surface.graph() {
        Some(g) => format!(" {} | graph ({} nodes) ", state.title, g.nodes.len()),
        None => format!(" {} | graph ", state.title),
    };
    let inner = inner_rect(area);
    frame.render_widget(panel_block(title, is_focused, theme), area);

    if state.surface.graph().is_none() {
        let msg = if state.is_running() { "Waiting for the verifier..." } else { "No graph received." };
        frame.render_widget(Paragraph::new(msg).style(Style::default().fg(theme.border_inactive)), inner);
        return;
    }

    let lines = state.graph_cache.lines(&state.surface, theme);
    let viewport = inner.height as usize;
    let max_start = lines.len().saturating_sub(viewport);
    state.graph_scroll = state.graph_scroll.min(max_start);

    let items: Vec<ListItem> = lines
        .iter()
        .skip(state.graph_scroll)
        .take(viewport)
        .cloned()
        .map(ListItem::new)
        .collect();
    frame.render_widget(List::new(items), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use vbridge_core::graph::{build_rendered_graph, ComparisonGraph, ComparisonNode};
    use vbridge_core::SessionMode;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn nodes_list_their_edges_in_order() {
        let graph = build_rendered_graph(
            &ComparisonGraph::new(vec![
                ComparisonNode::new("A (original) <- root").with_exits(["B (patched)", "C"]),
                ComparisonNode::new("B (patched)").with_contents(["ret"]),
            ]),
            false,
        );
        let theme = Theme::dark();

        let lines: Vec<String> = graph_lines(&graph, &theme).iter().map(text).collect();

        assert_eq!(
            lines,
            ["A (original)", "  <- root", "  -> B (patched)", "  -> C", "", "B (patched)", "ret", ""]
        );
    }

    #[test]
    fn node_text_takes_its_highlight_color() {
        let graph = build_rendered_graph(
            &ComparisonGraph::new(vec![ComparisonNode::new("x (patched)")]),
            false,
        );
        let theme = Theme::dark();
        let lines = graph_lines(&graph, &theme);
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.graph_patched));
    }

    #[test]
    fn cache_rebuilds_only_when_the_surface_changes() {
        let theme = Theme::dark();
        let mut surface = Surface::new(SessionMode::Interactive);
        let mut cache = GraphCache::default();
        assert!(cache.lines(&surface, &theme).is_empty());

        surface.set_graph(build_rendered_graph(
            &ComparisonGraph::new(vec![ComparisonNode::new("first")]),
            false,
        ));
        assert_eq!(text(&cache.lines(&surface, &theme)[0]), "first");
        let cached = cache.lines(&surface, &theme).as_ptr();
        assert_eq!(cache.lines(&surface, &theme).as_ptr(), cached, "unchanged surface reuses lines");

        surface.set_graph(build_rendered_graph(
            &ComparisonGraph::new(vec![ComparisonNode::new("second")]),
            false,
        ));
        assert_eq!(text(&cache.lines(&surface, &theme)[0]), "second");
    }
}
