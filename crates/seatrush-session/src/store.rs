// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed repository over the persisted keys.
//!
//! Every read validates and normalizes what it finds: an unreadable or
//! malformed value is "absent", never an error and never a partial record.
//! Writers always write whole records.

use seatrush_app_core::store::{KvStore, StoreError, StoreService};
use seatrush_client::Identity;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::course::CourseRef;
use crate::keys;
use crate::page::PageLabel;

type DynStore = Box<dyn KvStore + Send + Sync>;

/// Durable ("local") and sign-in-scoped ("session") state for one student seat.
pub struct SessionStore {
    local: StoreService<DynStore>,
    session: StoreService<DynStore>,
}

fn flag(value: Option<Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

impl SessionStore {
    /// Build a repository over a durable store and a session-scoped store.
    pub fn new<L, S>(local: L, session: S) -> Self
    where
        L: KvStore + Send + Sync + 'static,
        S: KvStore + Send + Sync + 'static,
    {
        Self {
            local: StoreService::new(Box::new(local)),
            session: StoreService::new(Box::new(session)),
        }
    }

    fn read<T: DeserializeOwned>(svc: &StoreService<DynStore>, key: &str) -> Option<T> {
        match svc.load(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "unreadable value treated as absent");
                None
            }
        }
    }

    fn read_text(svc: &StoreService<DynStore>, key: &str) -> Option<String> {
        match svc.load_text(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "unreadable value treated as absent");
                None
            }
        }
    }

    // ── page ───────────────────────────────────────────────────────────

    /// Current page label, normalized.
    pub fn page(&self) -> PageLabel {
        PageLabel::normalize(Self::read_text(&self.local, keys::PAGE).as_deref())
    }

    /// Persist the current page label.
    pub fn set_page(&self, page: PageLabel) -> Result<(), StoreError> {
        self.local.save(keys::PAGE, page.as_str())?;
        debug!(%page, "page persisted");
        Ok(())
    }

    /// Forget the current page (reads as `intro`).
    pub fn clear_page(&self) -> Result<(), StoreError> {
        self.local.remove(keys::PAGE)
    }

    // ── identity ───────────────────────────────────────────────────────

    /// Signed-in identity, or `None` when absent or malformed.
    pub fn identity(&self) -> Option<Identity> {
        Self::read::<Value>(&self.local, keys::AUTH).and_then(|v| Identity::from_value(&v))
    }

    /// Persist the signed-in identity.
    pub fn set_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        self.local.save(keys::AUTH, identity)
    }

    /// Forget the signed-in identity.
    pub fn clear_identity(&self) -> Result<(), StoreError> {
        self.local.remove(keys::AUTH)
    }

    // ── wait-session ───────────────────────────────────────────────────

    /// Entry timestamp of the current wait-session; non-positive values are absent.
    pub fn wait_entered_at(&self) -> Option<i64> {
        let value = Self::read::<Value>(&self.local, keys::WAIT_ENTERED_AT)?;
        let ms = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }?;
        (ms > 0).then_some(ms)
    }

    /// Stamp the wait-session entry time.
    pub fn set_wait_entered_at(&self, epoch_ms: i64) -> Result<(), StoreError> {
        self.local.save(keys::WAIT_ENTERED_AT, &epoch_ms)
    }

    /// True once the countdown of the current wait-session reached zero.
    pub fn wait_ready(&self) -> bool {
        flag(Self::read(&self.local, keys::WAIT_READY))
    }

    /// Mark the current wait-session unlocked.
    pub fn set_wait_ready(&self) -> Result<(), StoreError> {
        self.local.save(keys::WAIT_READY, &true)
    }

    /// Clear the unlock flag.
    pub fn clear_wait_ready(&self) -> Result<(), StoreError> {
        self.local.remove(keys::WAIT_READY)
    }

    /// Drop the whole wait-session (timestamp and flag).
    pub fn clear_wait_session(&self) -> Result<(), StoreError> {
        self.local.remove(keys::WAIT_READY)?;
        self.local.remove(keys::WAIT_ENTERED_AT)
    }

    // ── completion ─────────────────────────────────────────────────────

    /// True once the round is complete and no further attempts are allowed.
    pub fn register_locked(&self) -> bool {
        flag(Self::read(&self.local, keys::REGISTER_LOCKED))
    }

    /// Secured courses recorded when the round completed; empty when unreadable.
    pub fn completion_snapshot(&self) -> Vec<CourseRef> {
        Self::read(&self.local, keys::REGISTER_SNAPSHOT).unwrap_or_default()
    }

    /// Record the completed round: snapshot first, then the lock flag, so a
    /// lock is never observed without its snapshot.
    pub fn write_completion(&self, selected: &[CourseRef]) -> Result<(), StoreError> {
        self.local.save(keys::REGISTER_SNAPSHOT, selected)?;
        self.local.save(keys::REGISTER_LOCKED, &true)
    }

    /// Reopen registration: drop the lock flag and its snapshot.
    pub fn clear_completion(&self) -> Result<(), StoreError> {
        self.local.remove(keys::REGISTER_LOCKED)?;
        self.local.remove(keys::REGISTER_SNAPSHOT)
    }

    // ── session scope ──────────────────────────────────────────────────

    /// Remember where to resume after signing in.
    pub fn set_resume_target(&self, page: PageLabel) -> Result<(), StoreError> {
        self.session.save(keys::NEXT_PAGE, page.as_str())
    }

    /// Read and delete the resume target. A failed delete is logged; the
    /// target is still returned so sign-in can proceed.
    pub fn take_resume_target(&self) -> Option<PageLabel> {
        let raw = Self::read_text(&self.session, keys::NEXT_PAGE)?;
        if let Err(err) = self.session.remove(keys::NEXT_PAGE) {
            warn!(%err, "could not delete resume target");
        }
        Some(PageLabel::normalize(Some(&raw)))
    }

    /// Wipe everything in the session scope.
    pub fn clear_session_scope(&self) -> Result<(), StoreError> {
        self.session.clear()
    }
}
