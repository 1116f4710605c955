//! Shared harness: a stand-in interface thread that drains marshaled calls.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::UnboundedReceiver;
use vbridge_core::graph::ComparisonGraph;
use vbridge_core::marshal::UiCall;
use vbridge_core::port::UserInteraction;
use vbridge_core::slot::AnswerSlot;
use vbridge_core::surface::Surface;
use vbridge_core::{Answer, SessionError, SessionMode};

pub struct FakeUi {
    pub slot: Arc<AnswerSlot>,
    thread: JoinHandle<Surface>,
}

impl FakeUi {
    /// Starts the fake interface thread. When `reply` is set, every prompt that
    /// enables input is answered with it, as an operator would.
    pub fn start(mode: SessionMode, mut rx: UnboundedReceiver<UiCall>, reply: Option<&str>) -> Self {
        let mut surface = Surface::new(mode);
        let slot = surface.slot();
        let reply = reply.map(str::to_owned);
        let thread = thread::spawn(move || {
            while let Some(call) = rx.blocking_recv() {
                call.run(&mut surface);
                if let Some(reply) = &reply {
                    if surface.input_enabled() {
                        assert!(surface.submit_answer(reply));
                    }
                }
            }
            surface
        });
        Self { slot, thread }
    }

    /// Waits for every marshal clone to be dropped and returns the final surface.
    pub fn finish(self) -> Surface {
        self.thread.join().expect("interface thread panicked")
    }
}

pub fn log_lines(surface: &Surface) -> Vec<String> {
    surface.log().iter().cloned().collect()
}

/// What a port was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Seen {
    Asked(String, Vec<String>),
    Message(String),
    Graph(ComparisonGraph),
}

/// Wraps a port and records every call that reaches it.
pub struct Recording<P> {
    pub inner: P,
    pub seen: Mutex<Vec<Seen>>,
}

impl<P> Recording<P> {
    pub fn new(inner: P) -> Self {
        Self { inner, seen: Mutex::new(Vec::new()) }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

impl<P: UserInteraction> UserInteraction for Recording<P> {
    fn ask_user(&self, prompt: &str, choices: &[String]) -> Result<Answer, SessionError> {
        self.seen.lock().unwrap().push(Seen::Asked(prompt.into(), choices.to_vec()));
        self.inner.ask_user(prompt, choices)
    }

    fn show_message(&self, text: &str) -> Result<(), SessionError> {
        self.seen.lock().unwrap().push(Seen::Message(text.into()));
        self.inner.show_message(text)
    }

    fn show_graph(&self, graph: &ComparisonGraph) -> Result<(), SessionError> {
        self.seen.lock().unwrap().push(Seen::Graph(graph.clone()));
        self.inner.show_graph(graph)
    }
}
