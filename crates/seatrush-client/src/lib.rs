// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Client for the SeatRush registration backend.
//!
//! The backend owns capacity accounting, registration ordering and ranking;
//! this crate only speaks its request/response contracts. Every JSON response
//! is an envelope `{ "data": ... }` and a missing or malformed `data` degrades
//! to an empty value instead of an error where the contract allows it.
//!
//! [`Backend`] is the port the session state machine talks to; [`HttpBackend`]
//! is the `reqwest` implementation.

mod backend;
mod error;
mod http;
pub mod models;

pub use backend::Backend;
pub use error::ApiError;
pub use http::{HttpBackend, DEFAULT_API_BASE};
pub use models::{
    AdminCourse, AdminCourseUpdate, ApplyOutcome, CatalogCourse, Identity, LoginRequest, MyRank,
    RankEntry,
};
