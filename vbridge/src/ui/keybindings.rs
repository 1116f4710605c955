//! Keybinding dispatcher for vbridge.
//!
//! Translates raw crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` telling the event loop whether to continue or quit. The dispatcher
//! branches first on `state.mode` so that HelpOverlay, ConfirmQuit, Input, and
//! Normal all have isolated handler functions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{AppState, Mode};

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Continue the event loop normally.
    Continue,
    /// Tear the session down and exit.
    Quit,
}

/// Dispatches a key event to the handler matching the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    // Ctrl-C always quits, whatever mode the interface is in.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyAction::Quit;
    }
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Input => handle_input(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if let Some(action) = handle_scroll_key(key, state) {
        return action;
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => {
            state.focus = state.focus.next();
            KeyAction::Continue
        }
        KeyCode::Char('i') | KeyCode::Char(':') | KeyCode::Enter => {
            state.enter_input();
            KeyAction::Continue
        }
        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }
        KeyCode::Char('q') => {
            if state.is_running() {
                state.mode = Mode::ConfirmQuit;
                KeyAction::Continue
            } else {
                KeyAction::Quit
            }
        }
        _ => KeyAction::Continue,
    }
}

/// Handles j / k / g / G and the Ctrl half-page combos.
///
/// Returns `None` when the key should fall through to the rest of the Normal handler.
fn handle_scroll_key(key: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Char('g') | KeyCode::Home => state.scroll_top(),
        KeyCode::Char('G') | KeyCode::End => state.scroll_bottom(),
        KeyCode::Char('d') if ctrl => state.half_page_down(),
        KeyCode::Char('u') if ctrl => state.half_page_up(),
        KeyCode::PageDown => state.half_page_down(),
        KeyCode::PageUp => state.half_page_up(),
        _ => return None,
    }
    Some(KeyAction::Continue)
}

// ---------------------------------------------------------------------------
// Input mode
// ---------------------------------------------------------------------------

/// Edits the command line. `Enter` submits, `Esc` leaves without answering.
fn handle_input(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Enter => {
            if !state.submit_input() {
                tracing::debug!("answer not accepted, no question is pending");
            }
        }
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => state.input.clear(),
        KeyCode::Char(c) => state.input.push(c),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// HelpOverlay mode
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') => state.help_scroll = state.help_scroll.saturating_add(1),
        KeyCode::Char('k') => state.help_scroll = state.help_scroll.saturating_sub(1),
        KeyCode::Char('g') => state.help_scroll = 0,
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// ConfirmQuit mode
// ---------------------------------------------------------------------------

/// `y` confirms; `n` or `Esc` cancels. All other keys are ignored.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Scroll wheel moves the focused panel (or the help overlay) by 3 lines.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let help = state.mode == Mode::HelpOverlay;
    match mouse.kind {
        MouseEventKind::ScrollUp if help => state.help_scroll = state.help_scroll.saturating_sub(3),
        MouseEventKind::ScrollDown if help => state.help_scroll = state.help_scroll.saturating_add(3),
        MouseEventKind::ScrollUp => state.scroll_up(3),
        MouseEventKind::ScrollDown => state.scroll_down(3),
        _ => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PanelFocus;
    use vbridge_core::surface::Surface;
    use vbridge_core::{SessionMode, SessionStatus};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn state() -> AppState {
        AppState::new(Surface::new(SessionMode::Interactive), "vbridge t".to_owned())
    }

    fn type_str(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(press(KeyCode::Char(c)), state);
        }
    }

    #[test]
    fn quit_asks_while_the_session_runs() {
        let mut app = state();
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut app), KeyAction::Continue);
        assert_eq!(app.mode, Mode::ConfirmQuit);
        assert_eq!(handle_key(press(KeyCode::Char('n')), &mut app), KeyAction::Continue);
        assert_eq!(app.mode, Mode::Normal);

        app.session = SessionStatus::Finished;
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut app), KeyAction::Quit);
    }

    #[test]
    fn typed_answer_is_submitted_on_enter() {
        let mut app = state();
        let choices = vec!["0".to_owned(), "1".to_owned()];
        app.surface.slot().open("Pick", &choices).unwrap();
        app.surface.post_prompt("Pick", &choices);
        app.sync_with_surface();

        type_str(&mut app, "12");
        handle_key(press(KeyCode::Backspace), &mut app);
        handle_key(press(KeyCode::Enter), &mut app);

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.surface.log().back().map(String::as_str), Some("Command: 1"));
    }

    #[test]
    fn letters_are_text_in_input_mode() {
        let mut app = state();
        app.surface.post_prompt("Pick", &[]);
        app.sync_with_surface();

        type_str(&mut app, "jq?");

        assert_eq!(app.input, "jq?");
        assert_eq!(app.mode, Mode::Input);
        handle_key(press(KeyCode::Esc), &mut app);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.input, "jq?", "leaving the line keeps the draft");
    }

    #[test]
    fn tab_switches_focus_and_j_scrolls_it() {
        let mut app = state();
        handle_key(press(KeyCode::Tab), &mut app);
        assert_eq!(app.focus, PanelFocus::Log);
        handle_key(press(KeyCode::Char('k')), &mut app);
        assert_eq!(app.log_scroll, 1);
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut app = state();
        app.mode = Mode::HelpOverlay;
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(key, &mut app), KeyAction::Quit);
    }
}
