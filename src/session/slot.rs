use crate::image_classifier::interface::ClassificationError;
use crate::library::logger::interface::Logger;
use crate::session::classification_session::ClassificationSession;
use crate::session::worker::{ClassificationJob, SubmitOutcome};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Uninitialized,
    Initializing,
    Ready,
    Destroyed,
}

enum SlotState {
    Uninitialized,
    Initializing,
    Ready(ClassificationSession),
    Destroyed,
}

/// Holds at most one session per screen. The session is created by the first
/// successful `initialize` call and released by `destroy`. The lock is never
/// held while a session is being built, so `destroy` returns immediately even
/// during a slow model load.
pub struct SessionSlot {
    state: Mutex<SlotState>,
    settled: Condvar,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl SessionSlot {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            state: Mutex::new(SlotState::Uninitialized),
            settled: Condvar::new(),
            logger: logger.with_namespace("session_slot"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn status(&self) -> SlotStatus {
        match *self.lock() {
            SlotState::Uninitialized => SlotStatus::Uninitialized,
            SlotState::Initializing => SlotStatus::Initializing,
            SlotState::Ready(_) => SlotStatus::Ready,
            SlotState::Destroyed => SlotStatus::Destroyed,
        }
    }

    /// Runs `start` only while the slot is uninitialized. Returns whether this
    /// call created the session. A call made while another one is building
    /// the session waits for that one to finish.
    pub fn initialize(
        &self,
        start: impl FnOnce() -> Result<ClassificationSession, ClassificationError>,
    ) -> Result<bool, ClassificationError> {
        {
            let mut state = self.lock();
            while matches!(*state, SlotState::Initializing) {
                state = self
                    .settled
                    .wait(state)
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
            }
            if matches!(*state, SlotState::Ready(_)) {
                return Ok(false);
            }
            if matches!(*state, SlotState::Destroyed) {
                return Err(ClassificationError::Cancelled);
            }
            *state = SlotState::Initializing;
        }

        let started = start();

        let mut state = self.lock();
        let still_initializing = matches!(*state, SlotState::Initializing);
        let outcome = match started {
            Ok(session) if still_initializing => {
                *state = SlotState::Ready(session);
                let _ = self.logger.info("Session ready");
                Ok(true)
            }
            Ok(session) => {
                drop(state);
                let _ = self
                    .logger
                    .info("Slot destroyed while the session was starting");
                session.shutdown();
                return Err(ClassificationError::Cancelled);
            }
            Err(error) => {
                if still_initializing {
                    *state = SlotState::Uninitialized;
                }
                Err(error)
            }
        };
        drop(state);
        self.settled.notify_all();
        outcome
    }

    pub fn submit(&self, job: ClassificationJob) -> SubmitOutcome {
        match &*self.lock() {
            SlotState::Ready(session) if !session.is_cancelled() => session.submit(job),
            _ => SubmitOutcome::Closed,
        }
    }

    /// Never waits for a session that is still being built; that session is
    /// shut down by its initializer instead.
    pub fn destroy(&self) {
        let previous = std::mem::replace(&mut *self.lock(), SlotState::Destroyed);
        self.settled.notify_all();

        // Joining happens outside the lock.
        if let SlotState::Ready(session) = previous {
            session.shutdown();
        }
        let _ = self.logger.info("Session destroyed");
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        if self.status() == SlotStatus::Ready {
            self.destroy();
        }
    }
}
