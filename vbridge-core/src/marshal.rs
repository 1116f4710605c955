//! Cross-thread marshaling onto the interface thread.
//!
//! The session thread never touches the [`Surface`] directly. It boxes the
//! mutation into a [`UiCall`] and sends it down a tokio unbounded channel that
//! the interface thread's event loop drains. [`Marshal::post_and_wait`] also
//! parks the sender on a rendezvous channel until the closure has run, which
//! gives visible-before ordering for everything the session thread logs next.
//!
//! If the interface thread drops its receiver, queued calls are dropped with
//! it, their completion senders disconnect, and any waiting session thread
//! gets [`SessionError::UiClosed`] instead of hanging.

use crossbeam_channel::{bounded, Sender};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::SessionError;
use crate::surface::Surface;

type UiTask = Box<dyn FnOnce(&mut Surface) + Send + 'static>;

/// A closure queued for the interface thread.
pub struct UiCall {
    task: UiTask,
    done: Option<Sender<()>>,
}

impl UiCall {
    /// Runs the closure against the surface and releases the poster, if it waits.
    pub fn run(self, surface: &mut Surface) {
        (self.task)(surface);
        if let Some(done) = self.done {
            let _ = done.send(());
        }
    }
}

impl std::fmt::Debug for UiCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiCall").field("blocking", &self.done.is_some()).finish()
    }
}

/// Sending half, cloned into every session-thread component that displays things.
#[derive(Debug, Clone)]
pub struct Marshal {
    tx: UnboundedSender<UiCall>,
}

impl Marshal {
    /// Creates the marshal and the receiver the interface thread must drain.
    pub fn channel() -> (Self, UnboundedReceiver<UiCall>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues `f` and returns immediately.
    pub fn post<F>(&self, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Surface) + Send + 'static,
    {
        self.tx
            .send(UiCall { task: Box::new(f), done: None })
            .map_err(|_| SessionError::UiClosed)
    }

    /// Queues `f` and blocks until the interface thread has run it.
    ///
    /// Must not be called from the interface thread itself.
    pub fn post_and_wait<F>(&self, f: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Surface) + Send + 'static,
    {
        let (done_tx, done_rx) = bounded(1);
        self.tx
            .send(UiCall { task: Box::new(f), done: Some(done_tx) })
            .map_err(|_| SessionError::UiClosed)?;
        done_rx.recv().map_err(|_| SessionError::UiClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Runs every call already queued, without blocking. Returns how many ran.
pub fn drain_pending(rx: &mut UnboundedReceiver<UiCall>, surface: &mut Surface) -> usize {
    let mut ran = 0;
    while let Ok(call) = rx.try_recv() {
        call.run(surface);
        ran += 1;
    }
    ran
}
