// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for SeatRush (storage port, notices, clock, prefs).
//! Keeps the session state machine and the terminal client framework-agnostic.

pub mod clock;
pub mod notice;
pub mod prefs;
pub mod store;
