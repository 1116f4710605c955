//! Recording a live session and replaying its transcript.
//!
//! Exercises: Transcript + Controller on the live side, ReplayPort + Controller
//! and SessionHandle on the replay side, and graph determinism across replays.

mod common;

use std::io::{self, BufReader, Cursor};
use std::sync::Mutex;

use common::{log_lines, FakeUi, Recording, Seen};
use vbridge_core::controller::Controller;
use vbridge_core::graph::{build_rendered_graph, ComparisonGraph, ComparisonNode};
use vbridge_core::marshal::Marshal;
use vbridge_core::port::{ReplayPort, UserInteraction};
use vbridge_core::protocol::{encode_event, Event};
use vbridge_core::session::{SessionConfig, SessionHandle, SessionSource};
use vbridge_core::surface::{Surface, AUTO_REPLAY_MARKER};
use vbridge_core::transcript::Transcript;
use vbridge_core::{Answer, SessionError, SessionMode, SessionStatus};

/// Answers questions from a fixed list, like an operator following a script.
struct Operator {
    answers: Mutex<Vec<&'static str>>,
}

impl UserInteraction for Operator {
    fn ask_user(&self, _prompt: &str, _choices: &[String]) -> Result<Answer, SessionError> {
        let next = self.answers.lock().unwrap().remove(0);
        Ok(Answer::Given(next.to_owned()))
    }
    fn show_message(&self, _text: &str) -> Result<(), SessionError> {
        Ok(())
    }
    fn show_graph(&self, _graph: &ComparisonGraph) -> Result<(), SessionError> {
        Ok(())
    }
}

fn sample_graph() -> ComparisonGraph {
    ComparisonGraph::new(vec![
        ComparisonNode::new("0x100 (original) vs 0x100 (patched)")
            .with_exits(["0x120 (original)", "0x130 (patched)"])
            .with_contents(["Equivalence: inequivalent"]),
        ComparisonNode::new("0x120 (original) <- 0x100").with_contents(["return"]),
        ComparisonNode::new("0x130 (patched)").with_ce_trace(["r1 = 0x7"]),
    ])
}

fn verifier_output() -> String {
    [
        Event::Message { text: "Loading binaries".into() },
        Event::Question {
            prompt: "Choose an entry point".into(),
            choices: vec!["0: main".into(), "1: handler".into()],
        },
        Event::Graph(sample_graph()),
        Event::Question { prompt: "Continue?".into(), choices: vec!["yes".into(), "no".into()] },
        Event::Message { text: "Verification complete".into() },
    ]
    .iter()
    .map(|e| encode_event(e).unwrap())
    .collect()
}

/// Runs a live session over canned verifier output and returns the transcript path.
fn record(dir: &tempfile::TempDir) -> (std::path::PathBuf, Vec<Seen>) {
    let path = dir.path().join("lastrun.replay");
    let port = Recording::new(Operator { answers: Mutex::new(vec!["1", "yes"]) });
    let mut written = Vec::new();
    let mut controller = Controller::new(Cursor::new(verifier_output()), &mut written, &port)
        .with_transcript(Some(Transcript::create(&path).unwrap()));
    controller.run().unwrap();
    drop(controller);
    assert_eq!(written, b"1\nyes\n");
    (path, port.seen())
}

#[test]
fn replayed_transcript_reproduces_event_sequence() {
    let dir = tempfile::TempDir::new().unwrap();
    let (path, live) = record(&dir);

    let (marshal, rx) = Marshal::channel();
    let ui = FakeUi::start(SessionMode::Replay, rx, None);
    let port = Recording::new(ReplayPort::new(marshal, false));
    let file = std::fs::File::open(&path).unwrap();
    let mut controller = Controller::new(BufReader::new(file), io::sink(), &port);
    controller.run().unwrap();
    drop(controller);

    assert_eq!(port.seen(), live);
    drop(port);
    let surface = ui.finish();
    let lines = log_lines(&surface);
    assert_eq!(lines.iter().filter(|l| *l == AUTO_REPLAY_MARKER).count(), 2);
    assert!(lines.contains(&"Verification complete".to_owned()));
}

#[test]
fn replay_session_never_needs_an_operator() {
    let dir = tempfile::TempDir::new().unwrap();
    let (path, _) = record(&dir);

    let mut graphs = Vec::new();
    for _ in 0..2 {
        let (marshal, rx) = Marshal::channel();
        let ui = FakeUi::start(SessionMode::Replay, rx, None);
        let config = SessionConfig {
            source: SessionSource::Replay { transcript: path.clone() },
            show_ce_trace: true,
        };
        let handle = SessionHandle::spawn(config, marshal, ui.slot.clone()).unwrap();

        assert_eq!(handle.join(), SessionStatus::Finished);
        let surface: Surface = ui.finish();
        assert_eq!(surface.status(), "Verifier finished.");
        let graph = surface.graph().cloned().expect("graph replayed");
        assert_eq!(graph, build_rendered_graph(&sample_graph(), true));
        graphs.push(serde_json::to_vec(&graph).unwrap());
    }
    assert_eq!(graphs[0], graphs[1], "replays render byte-identical graphs");
}

#[test]
fn missing_replay_file_fails_with_message() {
    let dir = tempfile::TempDir::new().unwrap();
    let (marshal, rx) = Marshal::channel();
    let ui = FakeUi::start(SessionMode::Replay, rx, None);
    let config = SessionConfig {
        source: SessionSource::Replay { transcript: dir.path().join("absent.replay") },
        show_ce_trace: false,
    };
    let handle = SessionHandle::spawn(config, marshal, ui.slot.clone()).unwrap();

    assert_eq!(handle.join(), SessionStatus::Failed);
    let surface = ui.finish();
    assert!(log_lines(&surface).iter().any(|l| l.starts_with("Verifier session failed")));
    assert_eq!(surface.status(), "Verifier failed.");
}
