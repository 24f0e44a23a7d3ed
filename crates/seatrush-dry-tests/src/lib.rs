// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for SeatRush crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`store`] - In-memory key/value store fake for testing without filesystem
//! - [`backend`] - Scripted backend fake that records every call
//! - [`clock`] - Manually advanced clock

pub mod backend;
pub mod clock;
pub mod store;

pub use backend::{BackendCall, FakeBackend};
pub use clock::ManualClock;
pub use store::InMemoryKvStore;
