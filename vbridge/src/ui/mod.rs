//! UI rendering module for vbridge.
//!
//! `render()` is the single entry point called by the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`, the graph
//! panel in `graph_view.rs`, and the output log with the command line in
//! `log_view.rs`.

mod layout;
pub mod graph_view;
pub mod help;
pub mod keybindings;
pub mod log_view;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame: graph, output log, command line and status bar.
///
/// Viewport heights are written back into `state` so that half-page scrolling
/// on the next keypress uses the current geometry.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [graph, log, command_line, status_bar] = compute_layout(frame);

    state.graph_viewport_height = inner_rect(graph).height;
    state.log_viewport_height = inner_rect(log).height;

    graph_view::render_graph(frame, graph, state, theme);
    log_view::render_log(frame, log, state, theme);
    log_view::render_command_line(frame, command_line, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    // Rendered last so it sits on top.
    if state.mode == Mode::HelpOverlay {
        help::render_help_overlay(frame, theme, state.help_scroll);
    }
}
