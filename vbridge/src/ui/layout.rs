//! Stacked panel layout for vbridge.
//!
//! This module is pure layout arithmetic plus the shared panel chrome. It is
//! called inside `terminal.draw()` on every render so every frame gets a fresh
//! layout that reflects the current terminal size.
//!
//! `Spacing::Overlap(1)` combined with `Block::merge_borders(MergeStrategy::Fuzzy)`
//! makes adjacent panel borders share a single row and merge their junction
//! box-drawing characters automatically.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use vbridge_core::SessionStatus;

use crate::app::{AppState, Mode};
use crate::theme::Theme;

/// Below this many rows the graph and log panels split evenly.
const TALL_TERMINAL_ROWS: u16 = 30;

/// Returns `[graph, log, command_line, status_bar]` for the current frame.
///
/// The returned rects are valid only for the current draw closure.
pub fn compute_layout(frame: &Frame) -> [Rect; 4] {
    let area = frame.area();
    let [main_area, status_bar] =
        area.layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let (graph_share, log_share) = if area.height >= TALL_TERMINAL_ROWS { (3, 2) } else { (1, 1) };
    let [graph, log, command_line] = main_area.layout(
        &Layout::vertical([
            Constraint::Fill(graph_share),
            Constraint::Fill(log_share),
            Constraint::Length(3),
        ])
        .spacing(Spacing::Overlap(1)),
    );

    [graph, log, command_line, status_bar]
}

/// Returns the inner `Rect` of a panel after removing the 1-cell border on each side.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Builds a bordered `Block` for a panel.
///
/// Focused panels get a thick border in `border_active`. `MergeStrategy::Fuzzy`
/// is required because `Exact` produces incorrect junctions when mixing `Thick`
/// and `Plain` borders.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar: mode indicator, session state, status text.
///
/// `HelpOverlay` and `ConfirmQuit` display `NORMAL`; they are transient layers
/// over Normal mode, not separate editing states.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Input => (" INPUT ", theme.status_mode_input),
        Mode::Normal | Mode::ConfirmQuit | Mode::HelpOverlay => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };
    let mode_span =
        Span::styled(mode_text, Style::default().fg(mode_fg).add_modifier(Modifier::BOLD));

    let session_fg = match state.session {
        SessionStatus::Failed => theme.status_failed,
        SessionStatus::Running | SessionStatus::Finished => theme.status_bar_fg,
    };
    let mut spans = vec![
        mode_span,
        Span::raw(" "),
        Span::styled(state.surface.status().to_owned(), Style::default().fg(session_fg)),
    ];
    if state.mode == Mode::ConfirmQuit {
        spans.push(Span::styled(
            "  Verifier still running. Quit and stop it? (y/n)",
            Style::default().add_modifier(Modifier::BOLD),
        ));
    } else {
        spans.push(Span::raw("  ? help"));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
