//! Typing activity state machine.
//!
//! Pure transition logic; the deferred idle and promotion tasks live in
//! [`crate::flying_cat`], which calls back into this type when they fire.

use crate::state::CatState;
use std::time::{Duration, Instant};

/// What an edit event did to the machine, beyond resetting the idle deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// State did not change.
    Unchanged,
    /// Idle -> Typing. The caller must arm the promotion timer.
    StartedTyping,
    /// Typing -> Bounce because the burst already outlasted the threshold.
    Promoted,
}

#[derive(Debug, Clone)]
pub struct ActivityMachine {
    state: CatState,
    typing_started: Option<Instant>,
    promote_after: Duration,
}

impl ActivityMachine {
    pub fn new(promote_after: Duration) -> Self {
        Self { state: CatState::Idle, typing_started: None, promote_after }
    }

    pub fn state(&self) -> CatState {
        self.state
    }

    pub fn typing_started(&self) -> Option<Instant> {
        self.typing_started
    }

    pub fn promote_after(&self) -> Duration {
        self.promote_after
    }

    pub fn on_edit(&mut self, now: Instant) -> EditOutcome {
        match self.state {
            CatState::Idle => {
                self.state = CatState::Typing;
                self.typing_started = Some(now);
                EditOutcome::StartedTyping
            }
            CatState::Typing => {
                // Bursty edits can outrun the promotion timer; promote on the edit itself.
                let started = self.typing_started.unwrap_or(now);
                if now.saturating_duration_since(started) >= self.promote_after {
                    self.state = CatState::Bounce;
                    EditOutcome::Promoted
                } else {
                    EditOutcome::Unchanged
                }
            }
            CatState::Bounce => EditOutcome::Unchanged,
        }
    }

    /// Promotion timer fired. Only promotes if still typing.
    pub fn on_promotion_due(&mut self) -> bool {
        if self.state == CatState::Typing {
            self.state = CatState::Bounce;
            true
        } else {
            false
        }
    }

    /// Idle deadline fired. Returns whether the state changed.
    pub fn on_idle_timeout(&mut self) -> bool {
        self.typing_started = None;
        if self.state == CatState::Idle {
            return false;
        }
        self.state = CatState::Idle;
        true
    }
}
