// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Loading, saving and resolving [`ClientPrefs`].

use seatrush_app_core::prefs::{ClientPrefs, PREFS_KEY};
use seatrush_app_core::store::{KvStore, StoreError, StoreService};
use seatrush_client::DEFAULT_API_BASE;
use tracing::warn;

/// Where the effective API base came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// `--api-base` or `SEATRUSH_API_BASE`.
    Override,
    /// Saved with `config set-api-base`.
    Saved,
    /// Built-in default.
    Default,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Self::Override => "flag/env",
            Self::Saved => "saved",
            Self::Default => "default",
        }
    }
}

pub struct PrefsStore<S> {
    svc: StoreService<S>,
}

impl<S: KvStore> PrefsStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            svc: StoreService::new(store),
        }
    }

    /// Saved prefs; unreadable values fall back to defaults.
    pub fn load(&self) -> ClientPrefs {
        match self.svc.load::<ClientPrefs>(PREFS_KEY) {
            Ok(prefs) => prefs.unwrap_or_default(),
            Err(err) => {
                warn!(%err, "ignoring unreadable prefs");
                ClientPrefs::default()
            }
        }
    }

    pub fn save(&self, prefs: &ClientPrefs) -> Result<(), StoreError> {
        self.svc.save(PREFS_KEY, prefs)
    }
}

/// Effective API base: override > saved > default.
pub fn resolve_api_base(override_base: Option<&str>, prefs: &ClientPrefs) -> (String, Source) {
    let pick = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
    if let Some(base) = pick(override_base) {
        return (base, Source::Override);
    }
    if let Some(base) = pick(prefs.api_base.as_deref()) {
        return (base, Source::Saved);
    }
    (DEFAULT_API_BASE.to_owned(), Source::Default)
}
