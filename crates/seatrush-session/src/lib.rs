// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Session state machine for a SeatRush registration round.
//!
//! A round moves through `register_wait` (countdown) to `register` (apply for
//! seats) and ends when the backend reports every attempt resolved. All state
//! is mirrored into a [`SessionStore`] so a fresh process (a "reload") picks up
//! exactly where the previous one left off:
//!
//! - [`router`] selects the current top-level page;
//! - [`auth`] gates pages behind a signed-in [`Identity`](seatrush_client::Identity);
//! - [`countdown`] and [`wait`] run the unlock protocol;
//! - [`lock`] accumulates attempts and freezes the round once it is complete.
//!
//! Network effects are either performed through the
//! [`Backend`](seatrush_client::Backend) port or returned as effect values for
//! the caller to run, so every transition is testable without I/O.

pub mod auth;
pub mod catalog;
pub mod countdown;
pub mod course;
pub mod keys;
pub mod lock;
pub mod page;
pub mod route;
pub mod router;
pub mod store;
pub mod wait;

pub use auth::{AuthGate, GateDecision, LoginError, LogoutReport, ValidationError};
pub use countdown::{remaining_seconds, Countdown, WINDOW_SECS};
pub use course::{registration_key, CourseRef, HourMark, RegistrationKey, Slot, Weekday};
pub use lock::{AttemptError, AttemptOutcome, AttemptReport, CompletionLock, LockEffect, Rejection};
pub use page::PageLabel;
pub use route::Route;
pub use router::{NavError, PageRouter};
pub use store::SessionStore;
pub use wait::{ProceedError, WaitEffect, WaitRoom};
