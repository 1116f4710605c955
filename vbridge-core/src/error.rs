//! Error taxonomy for a verifier session.
//!
//! Every variant is something the session thread can hit while driving the
//! verifier. None of them are retried: the session reaches `Failed` and the
//! operator relaunches it.

use std::process::ExitStatus;

/// Failure raised anywhere on the session thread.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The verifier emitted a line that is not a well-formed event.
    #[error("protocol error on line {line}: {reason}")]
    Protocol { line: usize, reason: String },

    /// Reading from or writing to the verifier (or the transcript) failed.
    #[error("verifier I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The verifier could not be started.
    #[error("failed to start verifier `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The verifier closed its output and then exited unsuccessfully.
    #[error("verifier exited with {0}")]
    ProcessExit(ExitStatus),

    /// A second question was opened while one was still outstanding.
    #[error("protocol invariant violated: {0}")]
    InvariantViolation(String),

    /// The session was torn down while waiting on the operator.
    #[error("session cancelled")]
    Cancelled,

    /// The interface thread stopped accepting marshaled calls.
    #[error("interface thread is no longer running")]
    UiClosed,
}

impl SessionError {
    /// Builds a [`SessionError::Protocol`] for the given 1-based input line.
    pub fn protocol(line: usize, reason: impl Into<String>) -> Self {
        Self::Protocol { line, reason: reason.into() }
    }
}
