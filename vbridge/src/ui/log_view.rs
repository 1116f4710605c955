//! Output log and command-line renderers.
//!
//! The log can hold up to a million lines, so only the visible window is read
//! from the surface's buffer each frame. `log_scroll` counts lines back from the
//! tail; zero means the view follows new output.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
};

use vbridge_core::surface::ANSWER_PREFIX;

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

/// Returns the index range of log lines visible in a viewport of `height` rows.
///
/// `scroll` is clamped so the window never runs past the head of the log.
pub fn visible_window(total: usize, height: usize, scroll: &mut usize) -> std::ops::Range<usize> {
    let max_scroll = total.saturating_sub(height);
    *scroll = (*scroll).min(max_scroll);
    let end = total - *scroll;
    end.saturating_sub(height)..end
}

pub fn render_log(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Log;
    let total = state.surface.log().len();
    let title = if state.log_scroll > 0 {
        format!(" output (-{}) ", state.log_scroll)
    } else {
        " output ".to_owned()
    };
    let inner = inner_rect(area);
    frame.render_widget(panel_block(title, is_focused, theme), area);

    let window = visible_window(total, inner.height as usize, &mut state.log_scroll);
    let items: Vec<ListItem> = state
        .surface
        .log()
        .range(window)
        .map(|line| {
            let color =
                if line.starts_with(ANSWER_PREFIX) { theme.log_command } else { theme.log_text };
            ListItem::new(Line::from(Span::styled(line.clone(), Style::default().fg(color))))
        })
        .collect();
    frame.render_widget(List::new(items), inner);
}

/// Renders the one-line command input beneath the log.
pub fn render_command_line(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let editing = state.mode == Mode::Input;
    let inner = inner_rect(area);
    frame.render_widget(panel_block(" command ", editing, theme), area);

    let line = if state.surface.input_enabled() {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(theme.input_active)),
            Span::raw(state.input.clone()),
        ])
    } else {
        let hint = if state.is_running() { "(no question pending)" } else { "(session ended)" };
        Line::from(Span::styled(hint, Style::default().fg(theme.input_inactive)))
    };
    frame.render_widget(Paragraph::new(line), inner);

    if editing && inner.width > 0 {
        let offset = u16::try_from(state.input.chars().count() + 2).unwrap_or(u16::MAX);
        let x = inner.x.saturating_add(offset).min(inner.right().saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_follows_the_tail_by_default() {
        let mut scroll = 0;
        assert_eq!(visible_window(100, 10, &mut scroll), 90..100);
    }

    #[test]
    fn window_scrolls_back_and_clamps_at_the_head() {
        let mut scroll = 5;
        assert_eq!(visible_window(100, 10, &mut scroll), 85..95);

        let mut scroll = 500;
        assert_eq!(visible_window(100, 10, &mut scroll), 0..10);
        assert_eq!(scroll, 90);
    }

    #[test]
    fn short_log_fits_in_the_window() {
        let mut scroll = 3;
        assert_eq!(visible_window(4, 10, &mut scroll), 0..4);
        assert_eq!(scroll, 0);
    }
}
