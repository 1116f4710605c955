//! The user-interaction port the controller talks to.
//!
//! [`UserInteraction`] is the one contract the command loop depends on. Two
//! implementations exist, selected by [`SessionMode`] and wrapped in the
//! tagged [`Port`]:
//!
//! - [`InteractivePort`] shows the prompt, then parks the session thread on the
//!   [`AnswerSlot`] until the operator answers or the session is torn down.
//! - [`ReplayPort`] shows the prompt and returns [`Answer::AutoReplay`] at once.
//!
//! Both marshal every display change onto the interface thread and wait for it
//! to land before returning.

use std::sync::Arc;

use crate::error::SessionError;
use crate::graph::{build_rendered_graph, ComparisonGraph};
use crate::marshal::Marshal;
use crate::slot::AnswerSlot;
use crate::types::{Answer, SessionMode};

/// Operator-facing capability used by the command loop.
///
/// Implementations are called from the session thread only, and `ask_user` is
/// never re-entered while a previous call is still waiting.
pub trait UserInteraction {
    fn ask_user(&self, prompt: &str, choices: &[String]) -> Result<Answer, SessionError>;
    fn show_message(&self, text: &str) -> Result<(), SessionError>;
    fn show_graph(&self, graph: &ComparisonGraph) -> Result<(), SessionError>;
}

impl<T: UserInteraction + ?Sized> UserInteraction for &T {
    fn ask_user(&self, prompt: &str, choices: &[String]) -> Result<Answer, SessionError> {
        (**self).ask_user(prompt, choices)
    }

    fn show_message(&self, text: &str) -> Result<(), SessionError> {
        (**self).show_message(text)
    }

    fn show_graph(&self, graph: &ComparisonGraph) -> Result<(), SessionError> {
        (**self).show_graph(graph)
    }
}

fn marshal_message(marshal: &Marshal, text: &str) -> Result<(), SessionError> {
    let text = text.to_owned();
    marshal.post_and_wait(move |s| s.append_message(&text))
}

fn marshal_graph(
    marshal: &Marshal,
    graph: &ComparisonGraph,
    show_ce_trace: bool,
) -> Result<(), SessionError> {
    // Built here so the interface thread only swaps the finished projection in.
    let rendered = build_rendered_graph(graph, show_ce_trace);
    marshal.post_and_wait(move |s| s.set_graph(rendered))
}

fn marshal_prompt(marshal: &Marshal, prompt: &str, choices: &[String]) -> Result<(), SessionError> {
    let prompt = prompt.to_owned();
    let choices = choices.to_vec();
    marshal.post_and_wait(move |s| s.post_prompt(&prompt, &choices))
}

/// Port for live sessions: every question waits on a human.
#[derive(Debug, Clone)]
pub struct InteractivePort {
    marshal: Marshal,
    slot: Arc<AnswerSlot>,
    show_ce_trace: bool,
}

impl InteractivePort {
    pub fn new(marshal: Marshal, slot: Arc<AnswerSlot>, show_ce_trace: bool) -> Self {
        Self { marshal, slot, show_ce_trace }
    }
}

impl UserInteraction for InteractivePort {
    fn ask_user(&self, prompt: &str, choices: &[String]) -> Result<Answer, SessionError> {
        self.slot.open(prompt, choices)?;
        if let Err(e) = marshal_prompt(&self.marshal, prompt, choices) {
            self.slot.abandon();
            return Err(e);
        }
        tracing::debug!(prompt, "waiting for operator");
        let answer = self.slot.wait();
        tracing::debug!(?answer, "operator answered");
        Ok(answer)
    }

    fn show_message(&self, text: &str) -> Result<(), SessionError> {
        marshal_message(&self.marshal, text)
    }

    fn show_graph(&self, graph: &ComparisonGraph) -> Result<(), SessionError> {
        marshal_graph(&self.marshal, graph, self.show_ce_trace)
    }
}

/// Port for replay sessions: questions are answered by the transcript.
#[derive(Debug, Clone)]
pub struct ReplayPort {
    marshal: Marshal,
    show_ce_trace: bool,
}

impl ReplayPort {
    pub fn new(marshal: Marshal, show_ce_trace: bool) -> Self {
        Self { marshal, show_ce_trace }
    }
}

impl UserInteraction for ReplayPort {
    fn ask_user(&self, prompt: &str, choices: &[String]) -> Result<Answer, SessionError> {
        // The surface tags replayed prompts with the auto-replay marker.
        marshal_prompt(&self.marshal, prompt, choices)?;
        Ok(Answer::AutoReplay)
    }

    fn show_message(&self, text: &str) -> Result<(), SessionError> {
        marshal_message(&self.marshal, text)
    }

    fn show_graph(&self, graph: &ComparisonGraph) -> Result<(), SessionError> {
        marshal_graph(&self.marshal, graph, self.show_ce_trace)
    }
}

/// The port variant chosen for a session.
#[derive(Debug, Clone)]
pub enum Port {
    Interactive(InteractivePort),
    Replay(ReplayPort),
}

impl Port {
    pub fn for_mode(
        mode: SessionMode,
        marshal: Marshal,
        slot: Arc<AnswerSlot>,
        show_ce_trace: bool,
    ) -> Self {
        match mode {
            SessionMode::Interactive => {
                Port::Interactive(InteractivePort::new(marshal, slot, show_ce_trace))
            }
            SessionMode::Replay => Port::Replay(ReplayPort::new(marshal, show_ce_trace)),
        }
    }
}

impl UserInteraction for Port {
    fn ask_user(&self, prompt: &str, choices: &[String]) -> Result<Answer, SessionError> {
        match self {
            Port::Interactive(p) => p.ask_user(prompt, choices),
            Port::Replay(p) => p.ask_user(prompt, choices),
        }
    }

    fn show_message(&self, text: &str) -> Result<(), SessionError> {
        match self {
            Port::Interactive(p) => p.show_message(text),
            Port::Replay(p) => p.show_message(text),
        }
    }

    fn show_graph(&self, graph: &ComparisonGraph) -> Result<(), SessionError> {
        match self {
            Port::Interactive(p) => p.show_graph(graph),
            Port::Replay(p) => p.show_graph(graph),
        }
    }
}
