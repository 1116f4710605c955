//! Interface-thread state for one session.
//!
//! A [`Surface`] is owned by the interface thread and mutated only there, either
//! directly (the operator submits an answer) or through closures marshaled from
//! the session thread. The one piece the session thread touches directly is the
//! shared [`AnswerSlot`], which carries its own lock.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::graph::RenderedGraph;
use crate::slot::AnswerSlot;
use crate::types::SessionMode;

/// Upper bound on retained log lines. Oldest lines are evicted first.
pub const MAX_LOG_LINES: usize = 1_000_000;

/// Log line written in place of an answer during replay.
pub const AUTO_REPLAY_MARKER: &str = "Command: auto replay";

/// Prefix of the log line echoing an operator answer.
pub const ANSWER_PREFIX: &str = "Command: ";

#[derive(Debug)]
pub struct Surface {
    mode: SessionMode,
    slot: Arc<AnswerSlot>,
    log: VecDeque<String>,
    input_enabled: bool,
    graph: Option<RenderedGraph>,
    status: String,
    /// Bumped on every mutation so the renderer can tell when to re-layout.
    revision: u64,
}

impl Surface {
    pub fn new(mode: SessionMode) -> Self {
        Self::with_slot(mode, Arc::new(AnswerSlot::new()))
    }

    pub fn with_slot(mode: SessionMode, slot: Arc<AnswerSlot>) -> Self {
        Self {
            mode,
            slot,
            log: VecDeque::new(),
            input_enabled: false,
            graph: None,
            status: String::new(),
            revision: 0,
        }
    }

    /// Handle to the shared answer slot, for the session thread's port.
    pub fn slot(&self) -> Arc<AnswerSlot> {
        Arc::clone(&self.slot)
    }

    fn push_line(&mut self, line: impl Into<String>) {
        if self.log.len() == MAX_LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(line.into());
    }

    /// Appends text to the log, one entry per line.
    pub fn append_message(&mut self, text: &str) {
        for line in text.split('\n') {
            self.push_line(line);
        }
        self.revision += 1;
    }

    /// Shows a question and its choices, then opens the command line.
    ///
    /// Replay sessions log the auto-replay marker instead and leave input
    /// disabled.
    pub fn post_prompt(&mut self, prompt: &str, choices: &[String]) {
        self.push_line("");
        self.push_line(prompt);
        for choice in choices {
            self.push_line(format!("  {choice}"));
        }
        if self.mode.is_replay() {
            self.push_line(AUTO_REPLAY_MARKER);
        } else {
            self.input_enabled = true;
        }
        self.revision += 1;
    }

    /// Hands the operator's answer to the waiting session thread.
    ///
    /// Returns `false` without touching anything when input is disabled or
    /// no question is open.
    pub fn submit_answer(&mut self, text: &str) -> bool {
        if !self.input_enabled || !self.slot.fulfil(text) {
            return false;
        }
        self.input_enabled = false;
        self.push_line(format!("{ANSWER_PREFIX}{text}"));
        self.revision += 1;
        true
    }

    pub fn set_graph(&mut self, graph: RenderedGraph) {
        self.graph = Some(graph);
        self.revision += 1;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.revision += 1;
    }

    /// Disables input, e.g. once the session has ended.
    pub fn close_input(&mut self) {
        self.input_enabled = false;
        self.revision += 1;
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn log(&self) -> &VecDeque<String> {
        &self.log
    }

    pub fn graph(&self) -> Option<&RenderedGraph> {
        self.graph.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy() -> Vec<String> {
        vec!["X".to_owned(), "Y".to_owned()]
    }

    #[test]
    fn interactive_prompt_enables_input() {
        let mut s = Surface::new(SessionMode::Interactive);
        s.post_prompt("Choose", &xy());
        assert!(s.input_enabled());
        let lines: Vec<_> = s.log().iter().cloned().collect();
        assert_eq!(lines, ["", "Choose", "  X", "  Y"]);
    }

    #[test]
    fn replay_prompt_logs_marker_and_keeps_input_closed() {
        let mut s = Surface::new(SessionMode::Replay);
        s.post_prompt("Choose", &xy());
        assert!(!s.input_enabled());
        assert_eq!(s.log().back().map(String::as_str), Some(AUTO_REPLAY_MARKER));
    }

    #[test]
    fn submit_requires_open_question() {
        let mut s = Surface::new(SessionMode::Interactive);
        assert!(!s.submit_answer("X"), "input is disabled before any prompt");

        s.post_prompt("Choose", &xy());
        assert!(!s.submit_answer("X"), "no pending question in the slot yet");
        assert!(s.input_enabled());

        s.slot().open("Choose", &xy()).unwrap();
        assert!(s.submit_answer("X"));
        assert!(!s.input_enabled());
        assert_eq!(s.log().back().map(String::as_str), Some("Command: X"));
        assert!(s.slot().pending().unwrap().is_answered());
    }

    #[test]
    fn messages_split_into_lines() {
        let mut s = Surface::new(SessionMode::Interactive);
        s.append_message("one\ntwo");
        assert_eq!(s.log().len(), 2);
        assert!(s.revision() > 0);
    }
}
