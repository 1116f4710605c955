//! Color theme system for vbridge.
//!
//! A `Theme` holds named `ratatui::style::Color` fields covering every UI surface
//! vbridge renders. Two built-in themes are provided:
//!
//! - `dark` uses ANSI 16 colors (`Color::Reset`, `Color::DarkGray`, etc.) so it
//!   works on any terminal including 256-color SSH sessions with no truecolor support.
//! - `catppuccin_mocha` uses the Catppuccin Mocha palette in RGB and requires truecolor.

use ratatui::style::Color;

use vbridge_core::graph::Highlight;

/// All color values used across vbridge's UI surfaces.
///
/// Every field is a `ratatui::style::Color`. Callers use `theme.field` directly
/// inside `Style::default().fg(theme.border_active)`.
#[derive(Debug, Clone)]
pub struct Theme {
    // Panel borders
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    // Graph panel
    /// Nodes present only in the original program.
    pub graph_original: Color,
    /// Nodes present only in the patched program.
    pub graph_patched: Color,
    /// Two-sided and unclassified nodes.
    pub graph_plain: Color,
    /// Edge arrows listed under each node.
    pub graph_edge: Color,

    // Output log
    /// Prompt lines and echoed answers.
    pub log_command: Color,
    /// Everything else the verifier prints.
    pub log_text: Color,

    // Command line
    /// Prompt glyph when the verifier is waiting for an answer.
    pub input_active: Color,
    /// Placeholder text while input is disabled.
    pub input_inactive: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color when in NORMAL mode.
    pub status_mode_normal: Color,
    /// Mode indicator color when in INPUT mode.
    pub status_mode_input: Color,
    /// Session indicator once the verifier has failed.
    pub status_failed: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors.
    ///
    /// Works on all terminals: 16-color, 256-color, and truecolor. Suitable
    /// as the default when no config is present or color capability is unknown.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            graph_original: Color::Green,
            graph_patched: Color::Magenta,
            graph_plain: Color::Reset,
            graph_edge: Color::DarkGray,

            log_command: Color::Cyan,
            log_text: Color::Reset,

            input_active: Color::Green,
            input_inactive: Color::DarkGray,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode_normal: Color::Cyan,
            status_mode_input: Color::Green,
            status_failed: Color::Red,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        // Catppuccin Mocha palette (selected subset)
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let teal = Color::Rgb(148, 226, 213); // #94e2d5
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            graph_original: green,
            graph_patched: mauve,
            graph_plain: text,
            graph_edge: overlay1,

            log_command: teal,
            log_text: text,

            input_active: green,
            input_inactive: overlay1,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode_normal: lavender,
            status_mode_input: green,
            status_failed: red,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup. The fallback is logged as a warning.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    /// Foreground color for a graph node of the given category.
    pub fn highlight(&self, highlight: Highlight) -> Color {
        match highlight {
            Highlight::Original => self.graph_original,
            Highlight::Patched => self.graph_patched,
            Highlight::Plain => self.graph_plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_name_falls_back_to_dark() {
        assert_eq!(Theme::from_name("solarized").border_active, Theme::dark().border_active);
    }

    #[test]
    fn highlight_colors_follow_category() {
        let theme = Theme::dark();
        assert_eq!(theme.highlight(Highlight::Original), Color::Green);
        assert_eq!(theme.highlight(Highlight::Patched), Color::Magenta);
        assert_eq!(theme.highlight(Highlight::Plain), Color::Reset);
    }
}
