// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Top-level page labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which top-level view is active. A closed set: anything else read from
/// storage normalizes to [`PageLabel::Intro`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLabel {
    /// How the game works.
    Intro,
    /// Course catalog.
    Courses,
    /// Countdown before the registration window opens.
    RegisterWait,
    /// Registration screen.
    Register,
    /// The student's own result.
    Signup,
    /// Leaderboard.
    Ranking,
    /// Sign-in form; reached only through the auth gate.
    Login,
}

/// Raw text that is not a page label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown page {0:?}")]
pub struct UnknownPage(pub String);

impl PageLabel {
    /// Every label.
    pub const ALL: [Self; 7] = [
        Self::Intro,
        Self::Courses,
        Self::RegisterWait,
        Self::Register,
        Self::Signup,
        Self::Ranking,
        Self::Login,
    ];

    /// Labels reachable from the navigation bar, in display order.
    pub const MENU: [Self; 6] = [
        Self::Intro,
        Self::Courses,
        Self::RegisterWait,
        Self::Register,
        Self::Signup,
        Self::Ranking,
    ];

    /// Stored/wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Courses => "courses",
            Self::RegisterWait => "register_wait",
            Self::Register => "register",
            Self::Signup => "signup",
            Self::Ranking => "ranking",
            Self::Login => "login",
        }
    }

    /// Menu caption.
    pub fn title(self) -> &'static str {
        match self {
            Self::Intro => "How it works",
            Self::Courses => "Course list",
            Self::RegisterWait => "Waiting room",
            Self::Register => "Registration",
            Self::Signup => "My result",
            Self::Ranking => "Leaderboard",
            Self::Login => "Sign in",
        }
    }

    /// Pages that render only for a signed-in student.
    pub fn requires_identity(self) -> bool {
        matches!(self, Self::RegisterWait | Self::Register | Self::Signup)
    }

    /// Strict parse of a label (surrounding whitespace ignored).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|p| p.as_str() == raw)
    }

    /// Lenient parse used for everything read back from storage.
    pub fn normalize(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or(Self::Intro)
    }
}

impl fmt::Display for PageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageLabel {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownPage(s.to_owned()))
    }
}
