// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted key names. Only [`SessionStore`](crate::SessionStore) reads or writes them.

/// Current page label (local scope).
pub const PAGE: &str = "page";
/// Wait-session entry timestamp in epoch ms (local scope).
pub const WAIT_ENTERED_AT: &str = "wait.entered_at";
/// Wait-session unlock flag (local scope).
pub const WAIT_READY: &str = "wait.ready";
/// Signed-in identity record (local scope).
pub const AUTH: &str = "auth";
/// Completion lock flag (local scope).
pub const REGISTER_LOCKED: &str = "register.locked";
/// Completion snapshot: ordered list of secured courses (local scope).
pub const REGISTER_SNAPSHOT: &str = "register.snapshot";
/// Page to resume after the login redirect (session scope).
pub const NEXT_PAGE: &str = "next_page";
