//! Help overlay renderer for vbridge.
//!
//! Draws a centred modal over the panels, erasing the background with ratatui's
//! `Clear` widget first. The overlay is rendered inside the same `terminal.draw()`
//! closure as everything else.

use ratatui::{
    Frame,
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay as a centred modal.
///
/// Skipped on terminals narrower than 60 columns, where the modal would collapse
/// to a zero-height `Rect`.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame.area().centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help | j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Navigation"),
        Line::from("  j / k         Scroll down / up one line"),
        Line::from("  g / G         Jump to top / bottom (G on the log follows new output)"),
        Line::from("  Ctrl-d / u    Scroll half page down / up"),
        Line::from("  Tab           Switch focus between graph and output"),
        Line::from(""),
        Line::from("Answering the verifier"),
        Line::from("  (typing)      A new question opens the command line automatically"),
        Line::from("  Enter         Send the typed answer"),
        Line::from("  Esc           Leave the command line without answering"),
        Line::from("  i / :         Return to the command line while a question is open"),
        Line::from(""),
        Line::from("Graph colors"),
        Line::from("  green         Block exists only in the original program"),
        Line::from("  magenta       Block exists only in the patched program"),
        Line::from("  plain         Paired blocks (original vs patched)"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help overlay"),
        Line::from("  q             Quit (asks first while the verifier is running)"),
    ])
}
