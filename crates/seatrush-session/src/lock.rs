// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Registration attempts and the completion lock.
//!
//! Attempts accumulate a selection of secured courses. The first response
//! carrying `isAllTried = true` freezes the round: the selection is written
//! as the completion snapshot, the lock flag follows, and every later attempt
//! is refused locally without touching the network.

use std::time::Duration;

use seatrush_app_core::store::StoreError;
use seatrush_client::{ApiError, ApplyOutcome, Backend, Identity};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::course::{palette_color, registration_key, CourseRef};
use crate::store::SessionStore;

/// Delay between locking and showing the "registration complete" notice.
pub const COMPLETION_NOTICE_DELAY: Duration = Duration::from_secs(2);

/// Attempt refused before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The round is over.
    #[error("registration is already complete")]
    AlreadyCompleted,
    /// This course is already in the selection.
    #[error("you already applied for this course")]
    AlreadyApplied,
}

/// What one backend response meant for the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Seat secured; the course was added with this color.
    Registered {
        /// Timetable color assigned to the course.
        color: String,
    },
    /// The section is full.
    CapacityExhausted,
    /// The response carried no `isRegistered` boolean.
    Unconfirmed,
}

/// Deferred effect requested by a completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEffect {
    /// Show the completion notice once `after` has elapsed.
    AnnounceCompletion {
        /// Delay before the notice appears.
        after: Duration,
    },
}

/// Result of an accepted attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReport {
    /// Effect on the selection.
    pub outcome: AttemptOutcome,
    /// Set when this response completed the round.
    pub effect: Option<LockEffect>,
}

/// Why an attempt did not produce a report.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Refused locally.
    #[error(transparent)]
    Rejected(#[from] Rejection),
    /// The backend no longer accepts this identity (401/403).
    #[error("not signed in: {0}")]
    Unauthorized(ApiError),
    /// Any other backend failure.
    #[error(transparent)]
    Api(ApiError),
    /// The completion could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ApiError> for AttemptError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            Self::Unauthorized(err)
        } else {
            Self::Api(err)
        }
    }
}

/// In-memory selection mirrored by the persisted completion state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionLock {
    locked: bool,
    selection: Vec<CourseRef>,
}

impl CompletionLock {
    /// Load the lock. When locked, the selection comes solely from the
    /// snapshot; otherwise it starts empty.
    pub fn restore(store: &SessionStore) -> Self {
        let locked = store.register_locked();
        let selection = if locked {
            store.completion_snapshot()
        } else {
            Vec::new()
        };
        Self { locked, selection }
    }

    /// True once the round is complete.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Courses secured so far, in order.
    pub fn selection(&self) -> &[CourseRef] {
        &self.selection
    }

    /// The recorded completion, if the round is over.
    pub fn snapshot(&self) -> Option<&[CourseRef]> {
        self.locked.then_some(self.selection.as_slice())
    }

    /// Whether a course with the same registration key is already selected.
    pub fn is_selected(&self, course: &CourseRef) -> bool {
        let key = registration_key(course);
        self.selection.iter().any(|c| registration_key(c) == key)
    }

    /// Local admission check for an attempt.
    pub fn check(&self, course: &CourseRef) -> Result<(), Rejection> {
        if self.locked {
            return Err(Rejection::AlreadyCompleted);
        }
        if self.is_selected(course) {
            return Err(Rejection::AlreadyApplied);
        }
        Ok(())
    }

    /// Apply for `course` on behalf of `who`.
    pub async fn attempt<B: Backend>(
        &mut self,
        store: &SessionStore,
        backend: &B,
        who: &Identity,
        course: &CourseRef,
    ) -> Result<AttemptReport, AttemptError> {
        self.check(course)?;
        debug!(course = %course.code, id = %course.id, "registering");
        let outcome = backend.register(&course.id, who).await?;
        self.record(store, course, outcome)
    }

    /// Fold one backend response into the selection. Responses arriving
    /// after the round locked are dropped.
    pub fn record(
        &mut self,
        store: &SessionStore,
        course: &CourseRef,
        response: ApplyOutcome,
    ) -> Result<AttemptReport, AttemptError> {
        if self.locked {
            debug!(course = %course.code, "response after completion ignored");
            return Err(Rejection::AlreadyCompleted.into());
        }
        let outcome = match response.is_registered {
            Some(true) => {
                let color = course
                    .color
                    .clone()
                    .unwrap_or_else(|| palette_color(self.selection.len()).to_owned());
                self.selection.push(CourseRef {
                    color: Some(color.clone()),
                    ..course.clone()
                });
                info!(course = %course.code, "seat secured");
                AttemptOutcome::Registered { color }
            }
            Some(false) => AttemptOutcome::CapacityExhausted,
            None => AttemptOutcome::Unconfirmed,
        };
        let effect = if response.all_tried() {
            let persisted = store.write_completion(&self.selection);
            self.locked = true;
            if let Err(err) = &persisted {
                warn!(%err, "completion snapshot not persisted");
            }
            persisted?;
            info!(secured = self.selection.len(), "registration complete");
            Some(LockEffect::AnnounceCompletion {
                after: COMPLETION_NOTICE_DELAY,
            })
        } else {
            None
        };
        Ok(AttemptReport { outcome, effect })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::course::tests::course;
    use crate::course::{HourMark, Slot, Weekday, PALETTE};
    use seatrush_dry_tests::{FakeBackend, InMemoryKvStore};

    fn kim() -> Identity {
        Identity {
            student_id: 3,
            name: "Kim".into(),
        }
    }

    fn mon() -> Vec<Slot> {
        vec![Slot::new(Weekday::Mon, HourMark::new(9, 0), HourMark::new(11, 0))]
    }

    #[tokio::test]
    async fn colors_follow_selection_length_and_keep_existing() {
        let store = SessionStore::new(InMemoryKvStore::new(), InMemoryKvStore::new());
        let backend = FakeBackend::new();
        let mut lock = CompletionLock::default();
        let first = lock
            .attempt(&store, &backend, &kim(), &course("V000001", "A", mon()))
            .await
            .unwrap();
        assert_eq!(
            first.outcome,
            AttemptOutcome::Registered {
                color: PALETTE[0].into()
            }
        );
        let mut tinted = course("V000002", "B", mon());
        tinted.color = Some("#000000".into());
        let second = lock.attempt(&store, &backend, &kim(), &tinted).await.unwrap();
        assert_eq!(
            second.outcome,
            AttemptOutcome::Registered {
                color: "#000000".into()
            }
        );
    }

    #[tokio::test]
    async fn full_section_and_unconfirmed_leave_selection_alone() {
        let store = SessionStore::new(InMemoryKvStore::new(), InMemoryKvStore::new());
        let backend = FakeBackend::new();
        backend.push_outcome(false, false);
        backend.push_register_malformed();
        let mut lock = CompletionLock::default();
        let c = course("V000001", "A", mon());
        let full = lock.attempt(&store, &backend, &kim(), &c).await.unwrap();
        assert_eq!(full.outcome, AttemptOutcome::CapacityExhausted);
        let err = lock.attempt(&store, &backend, &kim(), &c).await.unwrap_err();
        assert!(matches!(err, AttemptError::Api(ApiError::Malformed(_))));
        assert!(lock.selection().is_empty());
    }

    #[tokio::test]
    async fn forbidden_maps_to_unauthorized() {
        let store = SessionStore::new(InMemoryKvStore::new(), InMemoryKvStore::new());
        let backend = FakeBackend::new();
        backend.push_register_status(403, "expired");
        let mut lock = CompletionLock::default();
        let err = lock
            .attempt(&store, &backend, &kim(), &course("V000001", "A", mon()))
            .await
            .unwrap_err();
        assert!(matches!(err, AttemptError::Unauthorized(_)));
    }

    #[test]
    fn late_response_after_lock_is_dropped() {
        let store = SessionStore::new(InMemoryKvStore::new(), InMemoryKvStore::new());
        let mut lock = CompletionLock::default();
        let c = course("V000001", "A", mon());
        let done = ApplyOutcome {
            is_registered: Some(false),
            is_all_tried: Some(true),
        };
        let report = lock.record(&store, &c, done).unwrap();
        assert_eq!(
            report.effect,
            Some(LockEffect::AnnounceCompletion {
                after: COMPLETION_NOTICE_DELAY
            })
        );
        let late = ApplyOutcome {
            is_registered: Some(true),
            is_all_tried: Some(false),
        };
        assert!(matches!(
            lock.record(&store, &c, late),
            Err(AttemptError::Rejected(Rejection::AlreadyCompleted))
        ));
        assert!(lock.selection().is_empty());
    }

    #[test]
    fn failed_snapshot_write_still_locks_in_memory() {
        let local = InMemoryKvStore::new();
        let store = SessionStore::new(local.clone(), InMemoryKvStore::new());
        local.set_fail_on_save(true);
        let mut lock = CompletionLock::default();
        let done = ApplyOutcome {
            is_registered: Some(true),
            is_all_tried: Some(true),
        };
        let err = lock
            .record(&store, &course("V000001", "A", mon()), done)
            .unwrap_err();
        assert!(matches!(err, AttemptError::Store(_)));
        assert!(lock.is_locked());
    }
}
