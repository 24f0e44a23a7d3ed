// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use seatrush_client::{CatalogCourse, Identity};
use seatrush_dry_tests::InMemoryKvStore;
use seatrush_session::catalog::normalize_catalog;
use seatrush_session::{CourseRef, SessionStore};

pub const T0: i64 = 1_700_000_000_000;

pub struct Seat {
    pub store: SessionStore,
    pub local: InMemoryKvStore,
    pub session: InMemoryKvStore,
}

/// Fresh store pair. Reopening the same handles simulates a reload.
pub fn seat() -> Seat {
    let local = InMemoryKvStore::new();
    let session = InMemoryKvStore::new();
    Seat {
        store: SessionStore::new(local.clone(), session.clone()),
        local,
        session,
    }
}

impl Seat {
    /// New repository over the same persisted state.
    pub fn reload(&self) -> SessionStore {
        SessionStore::new(self.local.clone(), self.session.clone())
    }
}

pub fn kim() -> Identity {
    Identity {
        student_id: 20_240_001,
        name: "Kim".into(),
    }
}

pub fn catalog(names: &[&str]) -> Vec<CourseRef> {
    let rows: Vec<CatalogCourse> = names
        .iter()
        .enumerate()
        .map(|(i, name)| CatalogCourse {
            id: Some((i + 100).to_string()),
            name: Some((*name).to_owned()),
            ..CatalogCourse::default()
        })
        .collect();
    normalize_catalog(&rows)
}
