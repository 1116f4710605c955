//! The synchronized answer slot shared by the session and interface threads.
//!
//! This is the only lock in the session model. The session thread opens a
//! [`PendingAnswer`] and parks on the condition variable; the interface thread
//! fills the answer in and wakes it. Teardown can wake it too, through
//! [`AnswerSlot::cancel`], so a question nobody answers never strands the
//! session thread.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::SessionError;
use crate::types::Answer;

/// The single in-flight question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnswer {
    pub prompt: String,
    pub choices: Vec<String>,
    answer: Option<String>,
}

impl PendingAnswer {
    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}

#[derive(Debug, Default)]
struct SlotState {
    pending: Option<PendingAnswer>,
    cancelled: bool,
    waits: usize,
}

/// Answer slot plus the condition variable guarding it.
#[derive(Debug, Default)]
pub struct AnswerSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl AnswerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a new pending question.
    ///
    /// # Errors
    ///
    /// `InvariantViolation` when a question is already outstanding, `Cancelled`
    /// when the session is being torn down.
    pub fn open(&self, prompt: &str, choices: &[String]) -> Result<(), SessionError> {
        let mut state = self.lock();
        if state.cancelled {
            return Err(SessionError::Cancelled);
        }
        if let Some(existing) = &state.pending {
            return Err(SessionError::InvariantViolation(format!(
                "question {:?} asked while {:?} is still outstanding",
                prompt, existing.prompt
            )));
        }
        state.pending = Some(PendingAnswer {
            prompt: prompt.to_owned(),
            choices: choices.to_vec(),
            answer: None,
        });
        Ok(())
    }

    /// Stores the operator's answer and wakes the waiting session thread.
    ///
    /// Returns `false` (and stores nothing) when no question is open or the
    /// open one already has an answer.
    pub fn fulfil(&self, text: impl Into<String>) -> bool {
        let mut state = self.lock();
        match state.pending.as_mut() {
            Some(pending) if pending.answer.is_none() => {
                pending.answer = Some(text.into());
                drop(state);
                self.ready.notify_one();
                true
            }
            _ => false,
        }
    }

    /// Blocks until the open question is answered or the slot is cancelled.
    ///
    /// The pending question is cleared in the same critical section that
    /// reads the answer. Calling this with no open question returns
    /// `Cancelled` immediately rather than parking forever.
    pub fn wait(&self) -> Answer {
        let mut state = self.lock();
        loop {
            if state.cancelled {
                state.pending = None;
                return Answer::Cancelled;
            }
            let answered = match &state.pending {
                None => return Answer::Cancelled,
                Some(pending) => pending.is_answered(),
            };
            if answered {
                let answer = state.pending.take().and_then(|p| p.answer);
                return answer.map(Answer::Given).unwrap_or(Answer::Cancelled);
            }
            state.waits += 1;
            state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Withdraws the open question without an answer.
    ///
    /// Used when the prompt could not be shown, so the next question is not
    /// rejected as a duplicate.
    pub fn abandon(&self) {
        self.lock().pending = None;
    }

    /// Wakes every waiter with [`Answer::Cancelled`] and refuses new questions.
    pub fn cancel(&self) {
        self.lock().cancelled = true;
        self.ready.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Snapshot of the open question, if any.
    pub fn pending(&self) -> Option<PendingAnswer> {
        self.lock().pending.clone()
    }

    /// Number of times a caller of [`AnswerSlot::wait`] actually parked.
    pub fn wait_count(&self) -> usize {
        self.lock().waits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn choices() -> Vec<String> {
        vec!["X".to_owned(), "Y".to_owned()]
    }

    #[test]
    fn second_open_is_an_invariant_violation() {
        let slot = AnswerSlot::new();
        slot.open("first?", &choices()).unwrap();
        let err = slot.open("second?", &choices()).unwrap_err();
        assert!(matches!(err, SessionError::InvariantViolation(_)));
        // The first question is untouched.
        assert_eq!(slot.pending().unwrap().prompt, "first?");
    }

    #[test]
    fn fulfil_without_question_is_rejected() {
        let slot = AnswerSlot::new();
        assert!(!slot.fulfil("stray"));
        assert!(!slot.is_pending());
    }

    #[test]
    fn answer_clears_pending_and_allows_next_question() {
        let slot = AnswerSlot::new();
        slot.open("q1", &choices()).unwrap();
        assert!(slot.fulfil("X"));
        assert!(!slot.fulfil("Y"), "second answer must not overwrite the first");
        assert_eq!(slot.wait(), Answer::Given("X".to_owned()));
        assert!(!slot.is_pending());
        slot.open("q2", &choices()).unwrap();
    }

    #[test]
    fn waiter_is_woken_by_answer_from_other_thread() {
        let slot = Arc::new(AnswerSlot::new());
        slot.open("q", &choices()).unwrap();
        let waiter = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.wait())
        };
        while slot.wait_count() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(slot.fulfil("Y"));
        assert_eq!(waiter.join().unwrap(), Answer::Given("Y".to_owned()));
    }

    #[test]
    fn cancel_releases_parked_waiter() {
        let slot = Arc::new(AnswerSlot::new());
        slot.open("never answered", &choices()).unwrap();
        let waiter = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || slot.wait())
        };
        while slot.wait_count() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        slot.cancel();
        assert_eq!(waiter.join().unwrap(), Answer::Cancelled);
        assert!(!slot.is_pending());
        assert!(matches!(slot.open("late", &[]), Err(SessionError::Cancelled)));
    }
}
