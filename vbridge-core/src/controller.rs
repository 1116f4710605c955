//! The command loop that drives one verifier session.
//!
//! [`Controller::run`] reads events from the verifier line by line, hands each
//! one to the [`UserInteraction`] port and writes answers back. Every consumed
//! line and every written answer is teed to the [`Transcript`] when one is
//! attached, in the order they happened, so the transcript can later stand in
//! for the verifier.
//!
//! In a replay the reader *is* a transcript: each question line is followed by
//! the answer that was given live. The replay port answers
//! [`Answer::AutoReplay`], and the loop consumes that recorded answer line
//! instead of writing anything.

use std::io::{BufRead, Write};

use crate::error::SessionError;
use crate::port::UserInteraction;
use crate::protocol::{encode_answer, parse_event, Event};
use crate::transcript::Transcript;
use crate::types::{Answer, ControllerState};

pub struct Controller<R, W, P> {
    reader: R,
    writer: W,
    port: P,
    transcript: Option<Transcript>,
    state: ControllerState,
    line_no: usize,
    events: usize,
}

impl<R, W, P> Controller<R, W, P>
where
    R: BufRead,
    W: Write,
    P: UserInteraction,
{
    pub fn new(reader: R, writer: W, port: P) -> Self {
        Self {
            reader,
            writer,
            port,
            transcript: None,
            state: ControllerState::Idle,
            line_no: 0,
            events: 0,
        }
    }

    /// Attaches a transcript that receives every byte read and written.
    pub fn with_transcript(mut self, transcript: Option<Transcript>) -> Self {
        self.transcript = transcript;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Number of events dispatched so far (blank lines excluded).
    pub fn events(&self) -> usize {
        self.events
    }

    fn transition(&mut self, next: ControllerState) {
        tracing::debug!(from = ?self.state, to = ?next, "controller state");
        self.state = next;
    }

    /// Runs the loop to end-of-stream.
    ///
    /// On failure the error is shown through the port before it is returned,
    /// and the state ends in [`ControllerState::Failed`].
    pub fn run(&mut self) -> Result<(), SessionError> {
        self.transition(ControllerState::Running);
        let result = self.command_loop().and_then(|()| self.close_transcript());
        match result {
            Ok(()) => {
                self.transition(ControllerState::Finished);
                tracing::info!(events = self.events, "verifier stream ended");
                Ok(())
            }
            Err(e) => {
                self.transition(ControllerState::Failed);
                tracing::error!(error = %e, line = self.line_no, "verifier session failed");
                // Best effort: the interface may be the thing that went away.
                let _ = self.port.show_message(&format!("Verifier session failed: {e}"));
                Err(e)
            }
        }
    }

    fn command_loop(&mut self) -> Result<(), SessionError> {
        while let Some(line) = self.next_line()? {
            if let Some(event) = parse_event(&line, self.line_no)? {
                self.dispatch(event)?;
            }
        }
        Ok(())
    }

    /// Reads one line, tees it to the transcript, and decodes it as UTF-8.
    fn next_line(&mut self) -> Result<Option<String>, SessionError> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        if let Some(t) = self.transcript.as_mut() {
            t.record(&buf)?;
        }
        String::from_utf8(buf)
            .map(Some)
            .map_err(|_| SessionError::protocol(self.line_no, "line is not valid UTF-8"))
    }

    fn dispatch(&mut self, event: Event) -> Result<(), SessionError> {
        self.events += 1;
        tracing::trace!(kind = event.kind(), line = self.line_no, "event");
        match event {
            Event::Question { prompt, choices } => self.question(&prompt, &choices),
            Event::Message { text } => self.port.show_message(&text),
            Event::Graph(graph) => self.port.show_graph(&graph),
        }
    }

    fn question(&mut self, prompt: &str, choices: &[String]) -> Result<(), SessionError> {
        // The loop is blocked in `ask_user` until the answer arrives, so the
        // single outstanding question is enforced by `AnswerSlot::open`.
        self.transition(ControllerState::WaitingForAnswer);
        let answer = self.port.ask_user(prompt, choices)?;
        self.transition(ControllerState::Running);
        match answer {
            Answer::Given(text) => self.write_answer(&text),
            Answer::AutoReplay => self.skip_recorded_answer(),
            Answer::Cancelled => Err(SessionError::Cancelled),
        }
    }

    fn write_answer(&mut self, text: &str) -> Result<(), SessionError> {
        let line = encode_answer(text);
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;
        if let Some(t) = self.transcript.as_mut() {
            t.record(line.as_bytes())?;
        }
        Ok(())
    }

    /// Consumes the answer line that follows a question in a transcript.
    fn skip_recorded_answer(&mut self) -> Result<(), SessionError> {
        match self.next_line()? {
            Some(line) => {
                tracing::debug!(answer = line.trim_end(), "replayed answer");
                Ok(())
            }
            // The recorded session ended on an unanswered question.
            None => Ok(()),
        }
    }

    fn close_transcript(&mut self) -> Result<(), SessionError> {
        if let Some(t) = self.transcript.take() {
            t.finish()?;
        }
        Ok(())
    }
}
