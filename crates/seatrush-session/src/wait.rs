// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The waiting room: countdown, unlock and the proceed gate.
//!
//! The proceed action is offered from the `ready` flag as it was when the
//! room was entered. A countdown that reaches zero persists `ready` but the
//! action only appears after the next load.

use seatrush_app_core::clock::Clock;
use seatrush_app_core::store::StoreError;
use seatrush_client::Identity;
use thiserror::Error;
use tracing::{debug, info};

use crate::countdown::Countdown;
use crate::page::PageLabel;
use crate::store::SessionStore;

/// Side effect requested by the waiting room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitEffect {
    /// Tell the backend the window opened (best-effort).
    NotifyWindowOpened {
        /// Student number.
        student_id: i64,
    },
}

/// Why the student cannot proceed yet.
#[derive(Debug, Error)]
pub enum ProceedError {
    /// The room was not unlocked when it was entered.
    #[error("registration is not open yet ({remaining}s left)")]
    NotReady {
        /// Seconds left on the countdown.
        remaining: u32,
    },
    /// Storage refused the transition.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One visit to the waiting room.
pub struct WaitRoom<'s> {
    store: &'s SessionStore,
    student_id: i64,
    countdown: Countdown,
    ready_at_entry: bool,
    announced: bool,
}

impl<'s> WaitRoom<'s> {
    /// Enter the room for a signed-in student. Reopens registration by
    /// clearing any completed round, then resumes or starts the
    /// wait-session.
    pub fn enter(
        store: &'s SessionStore,
        clock: &dyn Clock,
        identity: &Identity,
    ) -> Result<Self, StoreError> {
        store.clear_completion()?;
        let now = clock.now_ms();
        let entered_at = match store.wait_entered_at() {
            Some(ms) => ms,
            None => {
                store.set_wait_entered_at(now)?;
                now
            }
        };
        let ready_at_entry = store.wait_ready();
        let countdown = Countdown::new(entered_at, now);
        debug!(
            entered_at,
            remaining = countdown.remaining(),
            ready_at_entry,
            "entered waiting room"
        );
        Ok(Self {
            store,
            student_id: identity.student_id,
            countdown,
            ready_at_entry,
            announced: false,
        })
    }

    /// Persist the unlock and request the notification the first time the
    /// countdown is seen at zero in this wait-session.
    pub fn check_unlock(&mut self) -> Result<Option<WaitEffect>, StoreError> {
        if self.announced || !self.countdown.is_finished() || self.store.wait_ready() {
            return Ok(None);
        }
        self.store.set_wait_ready()?;
        self.announced = true;
        info!(student_id = self.student_id, "registration window opened");
        Ok(Some(WaitEffect::NotifyWindowOpened {
            student_id: self.student_id,
        }))
    }

    /// One-second tick.
    pub fn tick(&mut self) -> Result<Option<WaitEffect>, StoreError> {
        self.countdown.tick();
        self.check_unlock()
    }

    /// Seconds left.
    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Whether the proceed action is offered on this visit.
    pub fn proceed_available(&self) -> bool {
        self.ready_at_entry
    }

    /// Live value of the persisted unlock flag.
    pub fn ready_now(&self) -> bool {
        self.store.wait_ready()
    }

    /// Leave for the registration page, consuming the unlock.
    pub fn proceed(self) -> Result<PageLabel, ProceedError> {
        if !self.ready_at_entry {
            return Err(ProceedError::NotReady {
                remaining: self.remaining(),
            });
        }
        self.store.clear_wait_ready()?;
        self.store.set_page(PageLabel::Register)?;
        Ok(PageLabel::Register)
    }
}
