// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Top-level page selection.

use seatrush_app_core::clock::Clock;
use seatrush_app_core::store::StoreError;
use thiserror::Error;
use tracing::{debug, info};

use crate::page::PageLabel;
use crate::store::SessionStore;

/// Why a menu navigation was refused.
#[derive(Debug, Error)]
pub enum NavError {
    /// The navigation bar is disabled while a countdown is running.
    #[error("navigation is locked on the waiting room")]
    Locked,
    /// The current page shows no navigation bar (the sign-in form).
    #[error("there is no menu on the {0} page")]
    Hidden(PageLabel),
    /// Only menu entries are navigation targets.
    #[error("{0} is not a menu entry")]
    NotInMenu(PageLabel),
    /// The new page could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reads and writes the current page, mirroring every change to storage.
pub struct PageRouter<'s> {
    store: &'s SessionStore,
    clock: &'s dyn Clock,
}

impl<'s> PageRouter<'s> {
    /// Router over `store`, stamping wait-sessions with `clock`.
    pub fn new(store: &'s SessionStore, clock: &'s dyn Clock) -> Self {
        Self { store, clock }
    }

    /// Page to show on this load; `intro` when nothing valid is stored.
    pub fn current(&self) -> PageLabel {
        self.store.page()
    }

    /// Switch pages. Entering `register_wait` always starts a fresh
    /// wait-session: the unlock flag is cleared and the entry time restamped
    /// before the page itself is written.
    pub fn set_page(&self, page: PageLabel) -> Result<(), StoreError> {
        if page == PageLabel::RegisterWait {
            self.store.clear_wait_ready()?;
            let now = self.clock.now_ms();
            self.store.set_wait_entered_at(now)?;
            info!(entered_at = now, "wait-session started");
        }
        self.store.set_page(page)
    }

    /// A click on a navigation entry.
    pub fn navigate(&self, target: PageLabel) -> Result<(), NavError> {
        if !PageLabel::MENU.contains(&target) {
            return Err(NavError::NotInMenu(target));
        }
        let current = self.current();
        if !Self::nav_visible(current) {
            debug!(%current, %target, "navigation ignored without a menu");
            return Err(NavError::Hidden(current));
        }
        if !Self::nav_enabled(current) {
            debug!(%current, %target, "navigation ignored while locked");
            return Err(NavError::Locked);
        }
        self.set_page(target)?;
        Ok(())
    }

    /// The bar is hidden on the sign-in form.
    pub fn nav_visible(page: PageLabel) -> bool {
        page != PageLabel::Login
    }

    /// The bar is shown but inert during the countdown.
    pub fn nav_enabled(page: PageLabel) -> bool {
        page != PageLabel::RegisterWait
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::keys;
    use seatrush_dry_tests::{InMemoryKvStore, ManualClock};

    fn fixture() -> (SessionStore, InMemoryKvStore) {
        let local = InMemoryKvStore::new();
        (SessionStore::new(local.clone(), InMemoryKvStore::new()), local)
    }

    #[test]
    fn entering_wait_room_resets_wait_session() {
        let (store, local) = fixture();
        let clock = ManualClock::at(1_000);
        store.set_wait_entered_at(10).unwrap();
        store.set_wait_ready().unwrap();

        let router = PageRouter::new(&store, &clock);
        router.set_page(PageLabel::RegisterWait).unwrap();

        assert_eq!(store.wait_entered_at(), Some(1_000));
        assert!(!store.wait_ready());
        assert_eq!(router.current(), PageLabel::RegisterWait);
        assert!(!local.contains_key(keys::WAIT_READY));
    }

    #[test]
    fn other_pages_leave_wait_session_alone() {
        let (store, _) = fixture();
        let clock = ManualClock::at(5_000);
        store.set_wait_entered_at(10).unwrap();
        let router = PageRouter::new(&store, &clock);
        router.set_page(PageLabel::Courses).unwrap();
        assert_eq!(store.wait_entered_at(), Some(10));
    }

    #[test]
    fn navigation_is_locked_during_countdown() {
        let (store, _) = fixture();
        let clock = ManualClock::at(1);
        let router = PageRouter::new(&store, &clock);
        router.set_page(PageLabel::RegisterWait).unwrap();
        assert!(matches!(
            router.navigate(PageLabel::Ranking),
            Err(NavError::Locked)
        ));
        assert_eq!(router.current(), PageLabel::RegisterWait);
    }

    #[test]
    fn login_is_not_a_menu_target() {
        let (store, _) = fixture();
        let clock = ManualClock::at(1);
        let router = PageRouter::new(&store, &clock);
        assert!(matches!(
            router.navigate(PageLabel::Login),
            Err(NavError::NotInMenu(PageLabel::Login))
        ));
        router.navigate(PageLabel::Courses).unwrap();
        assert_eq!(router.current(), PageLabel::Courses);
    }

    #[test]
    fn sign_in_form_cannot_be_left_through_the_menu() {
        let (store, _) = fixture();
        let clock = ManualClock::at(1);
        let router = PageRouter::new(&store, &clock);
        router.set_page(PageLabel::Login).unwrap();
        for target in PageLabel::MENU {
            assert!(matches!(
                router.navigate(target),
                Err(NavError::Hidden(PageLabel::Login))
            ));
        }
        assert_eq!(router.current(), PageLabel::Login);
    }

    #[test]
    fn bar_visibility_and_enablement() {
        assert!(!PageRouter::nav_visible(PageLabel::Login));
        assert!(PageRouter::nav_visible(PageLabel::RegisterWait));
        assert!(!PageRouter::nav_enabled(PageLabel::RegisterWait));
        assert!(PageRouter::nav_enabled(PageLabel::Register));
    }
}
