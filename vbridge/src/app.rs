//! Central application state for vbridge.
//!
//! This module owns all mutable UI state: the current mode, which panel has focus,
//! per-panel scroll offsets and viewport heights, the command-line buffer and the
//! session [`Surface`]. No ratatui rendering logic lives here: `app.rs` is pure
//! state that is read by the render module and mutated by the keybinding dispatcher
//! and by closures marshaled from the session thread. The one render artifact it
//! holds is the graph panel's line cache, owned here so it outlives a frame.

use vbridge_core::surface::Surface;
use vbridge_core::SessionStatus;

use crate::ui::graph_view::GraphCache;

/// Interaction mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigation mode (default).
    #[default]
    Normal,
    /// Keys edit the command line; `Enter` answers the open question.
    Input,
    /// Full-screen help overlay is shown above all panels.
    HelpOverlay,
    /// Quit confirmation, shown while the verifier is still running.
    ConfirmQuit,
}

/// Which panel currently has keyboard focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    /// Comparison graph (top).
    #[default]
    Graph,
    /// Verifier output log (bottom).
    Log,
}

impl PanelFocus {
    /// Returns the other panel. There are only two, so `next` is its own inverse.
    pub fn next(self) -> Self {
        match self {
            PanelFocus::Graph => PanelFocus::Log,
            PanelFocus::Log => PanelFocus::Graph,
        }
    }
}

pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,

    /// Session-facing state, mutated by marshaled calls.
    pub surface: Surface,
    /// Panel title prefix, e.g. `vbridge lastrun.replay`.
    pub title: String,
    /// Last status polled from the session handle.
    pub session: SessionStatus,

    /// First visible graph line. Clamped by the renderer.
    pub graph_scroll: usize,
    /// Lines scrolled back from the bottom of the log; `0` follows new output.
    pub log_scroll: usize,
    /// Vertical scroll offset for the help overlay.
    pub help_scroll: u16,

    /// Inner heights cached after each render for half-page scrolling.
    pub graph_viewport_height: u16,
    pub log_viewport_height: u16,
    /// Graph lines from the last render, keyed on the surface revision.
    pub graph_cache: GraphCache,

    /// Text typed on the command line, not yet submitted.
    pub input: String,
    /// Whether the surface accepted input at the last sync.
    input_was_enabled: bool,
}

impl AppState {
    pub fn new(surface: Surface, title: String) -> Self {
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            surface,
            title,
            session: SessionStatus::Running,
            graph_scroll: 0,
            log_scroll: 0,
            help_scroll: 0,
            graph_viewport_height: 0,
            log_viewport_height: 0,
            graph_cache: GraphCache::default(),
            input: String::new(),
            input_was_enabled: false,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.session.is_terminal()
    }

    /// Follows the surface's input state after marshaled calls have run.
    ///
    /// A newly posted question moves focus to the command line; a closed one
    /// drops back to Normal mode and discards any half-typed answer.
    pub fn sync_with_surface(&mut self) {
        let enabled = self.surface.input_enabled();
        if enabled && !self.input_was_enabled && self.mode == Mode::Normal {
            self.mode = Mode::Input;
            self.log_scroll = 0;
        }
        if !enabled && self.mode == Mode::Input {
            self.mode = Mode::Normal;
            self.input.clear();
        }
        self.input_was_enabled = enabled;
    }

    /// Re-enters the command line if a question is open. Returns whether it did.
    pub fn enter_input(&mut self) -> bool {
        if self.surface.input_enabled() {
            self.mode = Mode::Input;
            true
        } else {
            false
        }
    }

    /// Submits the command line as the answer to the open question.
    ///
    /// The text goes out as typed; only trailing line breaks are dropped. On
    /// success the buffer is cleared and the mode returns to Normal. When the
    /// surface refuses the answer the buffer is kept so nothing typed is lost.
    pub fn submit_input(&mut self) -> bool {
        let text = self.input.trim_end_matches(['\r', '\n']).to_owned();
        if !self.surface.submit_answer(&text) {
            return false;
        }
        tracing::debug!(answer = %text, "answer submitted");
        self.input.clear();
        self.mode = Mode::Normal;
        self.input_was_enabled = false;
        self.log_scroll = 0;
        true
    }

    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Graph => {
                self.graph_scroll = self.graph_scroll.saturating_add(lines as usize);
            }
            PanelFocus::Log => {
                self.log_scroll = self.log_scroll.saturating_sub(lines as usize);
            }
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Graph => {
                self.graph_scroll = self.graph_scroll.saturating_sub(lines as usize);
            }
            PanelFocus::Log => {
                self.log_scroll = self.log_scroll.saturating_add(lines as usize);
            }
        }
    }

    pub fn scroll_top(&mut self) {
        match self.focus {
            PanelFocus::Graph => self.graph_scroll = 0,
            PanelFocus::Log => self.log_scroll = self.surface.log().len(),
        }
    }

    /// Scrolls to the end. For the log this resumes following new output.
    pub fn scroll_bottom(&mut self) {
        match self.focus {
            PanelFocus::Graph => self.graph_scroll = usize::MAX,
            PanelFocus::Log => self.log_scroll = 0,
        }
    }

    fn viewport_height(&self) -> u16 {
        match self.focus {
            PanelFocus::Graph => self.graph_viewport_height,
            PanelFocus::Log => self.log_viewport_height,
        }
    }

    /// Scrolls by half the focused panel's height, at least one line.
    pub fn half_page_down(&mut self) {
        self.scroll_down((self.viewport_height() / 2).max(1));
    }

    pub fn half_page_up(&mut self) {
        self.scroll_up((self.viewport_height() / 2).max(1));
    }
}
