//! vbridge: terminal front-end for an interactive binary-diffing verifier.
//!
//! Entry point for the `vbridge` binary. Wires together run selection (`run`),
//! configuration (`config`, `cli`), file logging (`logging`), the terminal
//! lifecycle (`tui`), the event bus (`event`) and the session thread from
//! `vbridge-core`.
//!
//! # Startup sequence
//!
//! 1. Parse the CLI, start file logging, load the config. Read-only, safe before
//!    terminal init.
//! 2. Resolve the run selection. Errors here print to stderr and exit before the
//!    terminal is touched.
//! 3. `install_panic_hook()`, then `register_sigterm()`.
//! 4. Spawn the session thread. It starts writing to the surface through the
//!    marshal immediately; the calls queue until the loop drains them.
//! 5. `init_tui()`, then spawn the event task.
//!
//! The event loop exits only via `break`, so teardown (terminate, join,
//! `restore_tui()`) always runs. The panic hook covers unexpected panics.

mod app;
mod cli;
mod config;
mod event;
mod logging;
mod run;
mod theme;
mod tui;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;

use clap::Parser;
use vbridge_core::marshal::{drain_pending, Marshal};
use vbridge_core::session::{SessionConfig, SessionHandle, SessionSource};
use vbridge_core::surface::Surface;
use vbridge_core::SessionStatus;

use crate::app::AppState;
use crate::cli::Cli;
use crate::config::Config;
use crate::run::{RunSelection, RunSelectionError};
use crate::ui::keybindings::{handle_key, handle_mouse, KeyAction};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let log_path = match logging::init() {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("vbridge: logging disabled: {e}");
            None
        }
    };
    let config = cli.apply(Config::load());

    let (title, source) = match resolve(&cli, &config) {
        Ok(resolved) => resolved,
        Err(e) => {
            tracing::error!(error = %e, "invalid run selection");
            eprintln!("vbridge: {e}");
            return ExitCode::from(2);
        }
    };

    match run_tui(title, source, &config).await {
        Ok(SessionStatus::Failed) => {
            if let Some(path) = log_path {
                eprintln!("vbridge: verifier session failed (log: {})", path.display());
            }
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "terminal error");
            eprintln!("vbridge: {e}");
            ExitCode::FAILURE
        }
    }
}

fn resolve(cli: &Cli, config: &Config) -> Result<(String, SessionSource), RunSelectionError> {
    let selection = RunSelection::from_path(&cli.run)?.with_trace(cli.trace.clone());
    let title = selection.title();
    let source = selection.into_source(&config.verifier)?;
    if let SessionSource::Live { command, trace } = &source {
        tracing::info!(
            program = %command.program,
            args = ?command.args,
            trace = ?trace.as_ref().map(PathBuf::as_path),
            "live run selected"
        );
    }
    Ok((title, source))
}

async fn run_tui(
    title: String,
    source: SessionSource,
    config: &Config,
) -> std::io::Result<SessionStatus> {
    let theme = theme::Theme::from_name(&config.theme);
    let surface = Surface::new(source.mode());
    let slot = surface.slot();
    let mut state = AppState::new(surface, title);

    // Panic hook first so it is the innermost hook and restores the terminal.
    tui::install_panic_hook();
    let term_flag = tui::register_sigterm()?;

    let (marshal, mut ui_rx) = Marshal::channel();
    let session = SessionHandle::spawn(
        SessionConfig { source, show_ce_trace: config.show_ce_trace },
        marshal,
        slot,
    )?;

    // If this fails, dropping `session` tears the verifier down.
    let mut terminal = tui::init_tui()?;

    let handler = event::EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let mut draw_error = None;
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when the
            // terminal is quiet.
            _ = tokio::time::sleep(std::time::Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    tracing::info!("SIGTERM received");
                    break 'event_loop;
                }
            }
            Some(call) = ui_rx.recv() => {
                call.run(&mut state.surface);
                drain_pending(&mut ui_rx, &mut state.surface);
                state.sync_with_surface();
            }
            maybe_event = rx.recv() => {
                match maybe_event {
                    Some(event::AppEvent::Render) => {
                        // Exactly one draw() call per Render event.
                        if let Err(e) = terminal.draw(|frame| ui::render(frame, &mut state, &theme)) {
                            draw_error = Some(e);
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::Key(key)) => {
                        if handle_key(key, &mut state) == KeyAction::Quit {
                            break 'event_loop;
                        }
                    }
                    Some(event::AppEvent::Mouse(mouse)) => {
                        handle_mouse(mouse, &mut state);
                    }
                    Some(event::AppEvent::Tick) => {
                        let status = session.status();
                        if status != state.session {
                            tracing::debug!(?status, "session status changed");
                            state.session = status;
                        }
                    }
                    // ratatui picks up the new size from frame.area() on the next Render.
                    Some(event::AppEvent::Resize(_, _)) => {}
                    None => break 'event_loop,
                }
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    // Closing the receiver releases a session thread parked in post_and_wait.
    drop(ui_rx);
    if !session.is_finished() {
        session.terminate();
    }
    let status = session.join();
    tracing::info!(?status, "vbridge exiting");

    tui::restore_tui()?;
    match draw_error {
        Some(e) => Err(e),
        None => Ok(status),
    }
}
