// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved client preferences (backend location, request timeout).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Store key holding [`ClientPrefs`].
pub const PREFS_KEY: &str = "prefs";

/// Per-request timeout used when none is saved.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Preferences for talking to the registration backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientPrefs {
    /// Base URL of the backend API; `None` means the built-in default.
    pub api_base: Option<String>,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ClientPrefs {
    fn default() -> Self {
        Self {
            api_base: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ClientPrefs {
    /// Request timeout as a [`Duration`]; zero falls back to the default.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_ms {
            0 => Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            ms => Duration::from_millis(ms),
        }
    }
}
