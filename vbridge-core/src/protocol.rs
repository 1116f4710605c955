//! Wire format spoken by the verifier.
//!
//! The verifier writes newline-delimited JSON to its stdout, one object per
//! event, tagged by an `"event"` field. Answers go back on its stdin as a single
//! line of plain text. Blank lines are tolerated; anything else that does not
//! decode into an [`Event`] is a protocol error.

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::graph::ComparisonGraph;

/// One structured event read from the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// The verifier needs a decision before it can continue.
    Question {
        prompt: String,
        #[serde(default)]
        choices: Vec<String>,
    },
    /// Free-form output for the log.
    Message { text: String },
    /// A full snapshot of the comparison graph.
    Graph(ComparisonGraph),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Question { .. } => "question",
            Event::Message { .. } => "message",
            Event::Graph(_) => "graph",
        }
    }
}

/// Decodes one input line. `line_no` is 1-based and only used for errors.
///
/// Returns `Ok(None)` for blank lines.
pub fn parse_event(line: &str, line_no: usize) -> Result<Option<Event>, SessionError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| SessionError::protocol(line_no, e.to_string()))
}

/// Encodes an event as one wire line, trailing newline included.
pub fn encode_event(event: &Event) -> Result<String, serde_json::Error> {
    let mut line = serde_json::to_string(event)?;
    line.push('\n');
    Ok(line)
}

/// Encodes an operator answer as one wire line.
///
/// Embedded line breaks would split the answer into several commands, so they
/// are folded into spaces.
pub fn encode_answer(answer: &str) -> String {
    let mut line: String = answer
        .trim_end_matches(['\r', '\n'])
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    line.push('\n');
    line
}
