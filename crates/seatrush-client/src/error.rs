// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error type for backend calls.

use thiserror::Error;

/// Failure talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response text, possibly empty.
        body: String,
    },
    /// The response did not have the expected shape or content type.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// True when the backend refused the caller's identity (401/403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// Short text fit for an inline message: the response body when there is
    /// one, otherwise the error itself.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { body, .. } if !body.trim().is_empty() => body.trim().to_owned(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
