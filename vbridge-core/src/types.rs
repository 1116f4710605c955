/// How a session is driven.
///
/// `Interactive` sessions talk to a live verifier and wait on the operator for
/// every question. `Replay` sessions read a recorded transcript and answer every
/// question automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    #[default]
    Interactive,
    Replay,
}

impl SessionMode {
    pub fn is_replay(self) -> bool {
        self == SessionMode::Replay
    }
}

/// Lifecycle status of a whole session, as seen by the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    Finished,
    Failed,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SessionStatus::Running)
    }
}

/// State machine of the command loop.
///
/// `Idle -> Running -> (WaitingForAnswer <-> Running) -> Finished | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Running,
    WaitingForAnswer,
    Finished,
    Failed,
}

/// Result of asking the operator a question.
///
/// `AutoReplay` is returned by replay sessions: the verifier's next input comes
/// from the transcript, so the variant carries no content on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The operator typed this text.
    Given(String),
    /// Replay mode answered without a human.
    AutoReplay,
    /// The session was torn down before an answer arrived.
    Cancelled,
}
