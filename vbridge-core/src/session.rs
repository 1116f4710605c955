//! The session thread and the handle the launcher keeps for it.
//!
//! [`SessionHandle::spawn`] starts a named `std::thread` that owns everything
//! slow: the verifier process, its pipes, the transcript file, and the blocking
//! wait on the operator. The interface thread only ever holds the handle, the
//! [`Surface`](crate::surface::Surface) and the marshal receiver.
//!
//! Cleanup runs on every exit path. The transcript is flushed by the controller
//! or by its `Drop`. The verifier is reaped by [`ChildGuard`], which kills it
//! first when the loop ended abnormally. [`SessionHandle::terminate`] cancels a
//! parked question and kills the verifier so a blocked read returns.
//!
//! On Unix the verifier leads its own process group and every kill targets the
//! whole group. A helper the verifier started may hold its stdout open, and the
//! session thread only sees end of stream once that helper is gone too.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::controller::Controller;
use crate::error::SessionError;
use crate::marshal::Marshal;
use crate::port::Port;
use crate::slot::AnswerSlot;
use crate::transcript::Transcript;
use crate::types::{SessionMode, SessionStatus};

/// Status line shown while the verifier runs.
pub const STATUS_RUNNING: &str = "Verifier running...";
pub const STATUS_FINISHED: &str = "Verifier finished.";
pub const STATUS_FAILED: &str = "Verifier failed.";

/// How often [`ChildGuard::reap`] polls a verifier that closed its stdout.
const REAP_POLL: Duration = Duration::from_millis(20);

/// Fully resolved command line for a live verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl VerifierCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), cwd: None }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn spawn(&self) -> Result<Child, SessionError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt as _;
            cmd.process_group(0);
        }
        cmd.spawn().map_err(|source| SessionError::Spawn { program: self.program.clone(), source })
    }
}

/// Where a session's events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    /// Spawn the verifier, optionally recording a transcript.
    Live { command: VerifierCommand, trace: Option<PathBuf> },
    /// Re-drive a recorded transcript; no process is spawned.
    Replay { transcript: PathBuf },
}

impl SessionSource {
    pub fn mode(&self) -> SessionMode {
        match self {
            SessionSource::Live { .. } => SessionMode::Interactive,
            SessionSource::Replay { .. } => SessionMode::Replay,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub source: SessionSource,
    pub show_ce_trace: bool,
}

/// State shared between the handle and the session thread.
#[derive(Debug)]
struct Shared {
    slot: Arc<AnswerSlot>,
    status: Mutex<SessionStatus>,
    child: Mutex<Option<Child>>,
}

impl Shared {
    fn child(&self) -> MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_status(&self, status: SessionStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }

    fn status(&self) -> SessionStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Kills the verifier together with everything in its process group.
///
/// Only called while `child` is unreaped, so its pid still names the group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Ok(pgid) = i32::try_from(child.id()) {
            match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                Ok(()) | Err(Errno::ESRCH) => {}
                Err(e) => tracing::debug!(error = %e, pgid, "killpg failed"),
            }
        }
    }
    let _ = child.kill();
}

/// Reaps the verifier when dropped, killing it first if it is still running.
struct ChildGuard<'a> {
    shared: &'a Shared,
}

impl ChildGuard<'_> {
    /// Waits for the verifier to exit and returns its status.
    ///
    /// The child stays in [`Shared`] until it has exited, so a concurrent
    /// [`SessionHandle::terminate`] can still kill a verifier that closed its
    /// stdout but kept running.
    fn reap(self) -> io::Result<Option<ExitStatus>> {
        loop {
            {
                let mut child = self.shared.child();
                let Some(running) = child.as_mut() else {
                    return Ok(None);
                };
                if let Some(status) = running.try_wait()? {
                    *child = None;
                    return Ok(Some(status));
                }
                if self.shared.slot.is_cancelled() {
                    kill_tree(running);
                }
            }
            thread::sleep(REAP_POLL);
        }
    }
}

impl Drop for ChildGuard<'_> {
    fn drop(&mut self) {
        let child = self.shared.child().take();
        if let Some(mut child) = child {
            if !matches!(child.try_wait(), Ok(Some(_))) {
                kill_tree(&mut child);
            }
            match child.wait() {
                Ok(status) => tracing::debug!(%status, "verifier reaped"),
                Err(e) => tracing::warn!(error = %e, "failed to reap verifier"),
            }
        }
    }
}

/// Launcher-side handle to one running session.
#[derive(Debug)]
pub struct SessionHandle {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<SessionStatus>>,
}

impl SessionHandle {
    /// Starts the session thread.
    ///
    /// `slot` must be the slot of the surface that drains `marshal`, so that
    /// the operator's answers reach the waiting port.
    ///
    /// # Errors
    ///
    /// Fails only if the OS refuses to create the thread.
    pub fn spawn(config: SessionConfig, marshal: Marshal, slot: Arc<AnswerSlot>) -> io::Result<Self> {
        let shared = Arc::new(Shared {
            slot,
            status: Mutex::new(SessionStatus::Running),
            child: Mutex::new(None),
        });
        let thread = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("verifier-session".to_owned())
                .spawn(move || session_main(config, marshal, &shared))?
        };
        Ok(Self { shared, thread: Some(thread) })
    }

    pub fn status(&self) -> SessionStatus {
        self.shared.status()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Tears the session down without blocking.
    ///
    /// A parked question wakes with [`Answer::Cancelled`](crate::types::Answer)
    /// and the verifier is killed; the session thread then reaps it.
    pub fn terminate(&self) {
        tracing::info!("terminating verifier session");
        self.shared.slot.cancel();
        if let Some(child) = self.shared.child().as_mut() {
            kill_tree(child);
        }
    }

    /// Waits for the session thread to finish and returns the final status.
    pub fn join(mut self) -> SessionStatus {
        match self.thread.take().map(JoinHandle::join) {
            Some(Ok(status)) => status,
            Some(Err(_)) => {
                tracing::error!("session thread panicked");
                SessionStatus::Failed
            }
            None => self.shared.status(),
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.thread.as_ref().is_some_and(|t| !t.is_finished()) {
            self.terminate();
        }
    }
}

fn session_main(config: SessionConfig, marshal: Marshal, shared: &Shared) -> SessionStatus {
    let mode = config.source.mode();
    tracing::info!(?mode, "session started");
    let _ = marshal.post_and_wait(|s| s.set_status(STATUS_RUNNING));

    let port = Port::for_mode(mode, marshal.clone(), Arc::clone(&shared.slot), config.show_ce_trace);
    let result = match &config.source {
        SessionSource::Live { command, trace } => run_live(command, trace.as_deref(), port, shared),
        SessionSource::Replay { transcript } => run_replay(transcript, port),
    };

    let status = match result {
        Ok(()) => SessionStatus::Finished,
        Err(Reported(e)) => {
            tracing::warn!(error = %e, "session ended with error");
            SessionStatus::Failed
        }
    };
    shared.set_status(status);
    let line = if status == SessionStatus::Finished { STATUS_FINISHED } else { STATUS_FAILED };
    let _ = marshal.post_and_wait(move |s| {
        s.close_input();
        s.set_status(line);
    });
    tracing::info!(?status, "session ended");
    status
}

/// An error that has already been shown to the operator.
struct Reported(SessionError);

/// Shows a failure that happened outside the command loop.
fn report(port: &Port, error: SessionError) -> Reported {
    use crate::port::UserInteraction as _;
    tracing::error!(error = %error, "verifier session failed");
    let _ = port.show_message(&format!("Verifier session failed: {error}"));
    Reported(error)
}

fn run_live(
    command: &VerifierCommand,
    trace: Option<&Path>,
    port: Port,
    shared: &Shared,
) -> Result<(), Reported> {
    let transcript = match trace.map(Transcript::create).transpose() {
        Ok(t) => t,
        Err(e) => return Err(report(&port, e.into())),
    };

    let mut child = command.spawn().map_err(|e| report(&port, e))?;
    tracing::info!(program = %command.program, pid = child.id(), "verifier spawned");
    let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        kill_tree(&mut child);
        let _ = child.wait();
        let err = io::Error::new(io::ErrorKind::BrokenPipe, "verifier pipes unavailable");
        return Err(report(&port, err.into()));
    };
    if let Some(stderr) = child.stderr.take() {
        forward_stderr(stderr);
    }

    *shared.child() = Some(child);
    let guard = ChildGuard { shared };
    if shared.slot.is_cancelled() {
        // Terminated before the child was visible to `terminate`.
        return Err(report(&port, SessionError::Cancelled));
    }

    let mut controller = Controller::new(BufReader::new(stdout), stdin, &port)
        .with_transcript(transcript);
    let outcome = controller.run();
    // Closes the verifier's stdin and releases the transcript.
    drop(controller);
    outcome.map_err(Reported)?;

    let exit = guard.reap().map_err(|e| report(&port, e.into()))?;
    if shared.slot.is_cancelled() {
        return Err(report(&port, SessionError::Cancelled));
    }
    match exit {
        Some(status) if !status.success() => Err(report(&port, SessionError::ProcessExit(status))),
        _ => Ok(()),
    }
}

fn run_replay(path: &Path, port: Port) -> Result<(), Reported> {
    let file = File::open(path).map_err(|e| report(&port, e.into()))?;
    tracing::info!(path = %path.display(), "replaying transcript");
    let mut controller = Controller::new(BufReader::new(file), io::sink(), &port);
    controller.run().map_err(Reported)
}

/// Drains the verifier's stderr into the log file so the pipe never fills.
fn forward_stderr(stderr: std::process::ChildStderr) {
    let spawned = thread::Builder::new().name("verifier-stderr".to_owned()).spawn(move || {
        for line in BufReader::new(stderr).lines() {
            match line {
                Ok(line) => tracing::debug!(target: "verifier", "{line}"),
                Err(_) => break,
            }
        }
    });
    if let Err(e) = spawned {
        tracing::warn!(error = %e, "could not drain verifier stderr");
    }
}
