//! Session coordination between a human operator and a binary-diffing verifier.
//!
//! The verifier runs as a subprocess driven from a dedicated session thread.
//! The pieces, leaves first:
//!
//! - [`transcript`] tees the verifier's I/O to a replayable trace file.
//! - [`graph`] projects comparison-graph snapshots into renderable graphs.
//! - [`protocol`] decodes the verifier's newline-delimited JSON events.
//! - [`slot`] is the lock-and-condvar handoff for the single open question.
//! - [`marshal`] queues closures onto the interface thread.
//! - [`surface`] is the interface-thread state those closures mutate.
//! - [`port`] is the operator capability, interactive or replay.
//! - [`controller`] is the command loop and its state machine.
//! - [`session`] owns the thread, the process and teardown.

pub mod controller;
pub mod error;
pub mod graph;
pub mod marshal;
pub mod port;
pub mod protocol;
pub mod session;
pub mod slot;
pub mod surface;
pub mod transcript;
pub mod types;

pub use error::SessionError;
pub use types::{Answer, ControllerState, SessionMode, SessionStatus};
