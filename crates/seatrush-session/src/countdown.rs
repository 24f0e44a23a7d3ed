// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Waiting-room countdown arithmetic.

/// Length of the waiting window in seconds.
pub const WINDOW_SECS: u32 = 15;

/// Whole seconds left in the window entered at `entered_at_ms`, clamped to
/// `[0, WINDOW_SECS]`. A clock that reads earlier than the entry yields the
/// full window.
pub fn remaining_seconds(entered_at_ms: i64, now_ms: i64) -> u32 {
    let elapsed_secs = now_ms.saturating_sub(entered_at_ms).max(0) / 1000;
    let left = i64::from(WINDOW_SECS).saturating_sub(elapsed_secs);
    u32::try_from(left.clamp(0, i64::from(WINDOW_SECS))).unwrap_or(0)
}

/// Red backdrop intensity for `secs` remaining: zero above ten seconds, then
/// rising from 0.1 towards 1.0 as the window closes.
#[allow(clippy::cast_precision_loss)]
pub fn urgency(secs: u32) -> f32 {
    if secs > 10 {
        return 0.0;
    }
    let t = (10 - secs) as f32 / 10.0;
    (0.1 + 0.9 * t).clamp(0.0, 1.0)
}

/// Local one-second counter seeded from the persisted entry time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// Counter for a window entered at `entered_at_ms`.
    pub fn new(entered_at_ms: i64, now_ms: i64) -> Self {
        Self {
            remaining: remaining_seconds(entered_at_ms, now_ms),
        }
    }

    /// Seconds left.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// True once the counter is at zero.
    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    /// Advance one second. Returns `true` only on the tick that reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }
}
