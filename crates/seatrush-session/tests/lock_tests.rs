// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]
mod common;

use common::{catalog, kim, seat};
use seatrush_dry_tests::{BackendCall, FakeBackend};
use seatrush_session::keys;
use seatrush_session::lock::COMPLETION_NOTICE_DELAY;
use seatrush_session::{AttemptError, AttemptOutcome, CompletionLock, LockEffect, Rejection};

fn is_register(call: &BackendCall) -> bool {
    matches!(call, BackendCall::Register { .. })
}

#[tokio::test]
async fn nth_all_tried_response_writes_exactly_one_snapshot() {
    let seat = seat();
    let backend = FakeBackend::new();
    let courses = catalog(&["운영체제", "자료구조", "알고리즘"]);
    backend.push_outcome(true, false);
    backend.push_outcome(false, false);
    backend.push_outcome(true, true);

    let mut lock = CompletionLock::restore(&seat.store);
    let mut effects = Vec::new();
    for course in &courses {
        let report = lock
            .attempt(&seat.store, &backend, &kim(), course)
            .await
            .unwrap();
        effects.extend(report.effect);
    }

    assert_eq!(
        effects,
        vec![LockEffect::AnnounceCompletion {
            after: COMPLETION_NOTICE_DELAY
        }]
    );
    assert!(lock.is_locked());
    assert_eq!(seat.local.writes_to(keys::REGISTER_SNAPSHOT), 1);
    assert_eq!(seat.local.writes_to(keys::REGISTER_LOCKED), 1);

    let secured: Vec<_> = lock.selection().iter().map(|c| c.code.clone()).collect();
    assert_eq!(secured, vec!["V000001", "V000003"]);
    assert_eq!(seat.store.completion_snapshot(), lock.selection());

    let restored = CompletionLock::restore(&seat.reload());
    assert!(restored.is_locked());
    assert_eq!(restored.snapshot(), Some(lock.selection()));
}

#[tokio::test]
async fn locked_attempt_makes_no_call_and_no_mutation() {
    let seat = seat();
    let backend = FakeBackend::new();
    let courses = catalog(&["운영체제", "자료구조"]);
    backend.push_outcome(true, true);

    let mut lock = CompletionLock::restore(&seat.store);
    lock.attempt(&seat.store, &backend, &kim(), &courses[0])
        .await
        .unwrap();
    let before = lock.clone();
    let saves = seat.local.save_count();

    let err = lock
        .attempt(&seat.store, &backend, &kim(), &courses[1])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AttemptError::Rejected(Rejection::AlreadyCompleted)
    ));
    assert_eq!(lock, before);
    assert_eq!(backend.count(is_register), 1);
    assert_eq!(seat.local.save_count(), saves);
}

#[tokio::test]
async fn reload_while_locked_restores_without_network() {
    let seat = seat();
    let backend = FakeBackend::new();
    let courses = catalog(&["컴퓨터구조"]);
    seat.store.write_completion(&courses).unwrap();

    let mut lock = CompletionLock::restore(&seat.reload());
    assert_eq!(lock.selection(), courses.as_slice());
    assert!(matches!(
        lock.attempt(&seat.store, &backend, &kim(), &courses[0]).await,
        Err(AttemptError::Rejected(Rejection::AlreadyCompleted))
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn duplicate_key_is_rejected_locally() {
    let seat = seat();
    let backend = FakeBackend::new();
    let courses = catalog(&["데이터베이스"]);
    let mut lock = CompletionLock::restore(&seat.store);

    let first = lock
        .attempt(&seat.store, &backend, &kim(), &courses[0])
        .await
        .unwrap();
    assert!(matches!(first.outcome, AttemptOutcome::Registered { .. }));

    let mut again = courses[0].clone();
    again.remain = 0;
    again.color = None;
    assert!(matches!(
        lock.attempt(&seat.store, &backend, &kim(), &again).await,
        Err(AttemptError::Rejected(Rejection::AlreadyApplied))
    ));
    assert_eq!(backend.count(is_register), 1);
    assert_eq!(lock.selection().len(), 1);
}

#[tokio::test]
async fn transport_failure_changes_nothing() {
    let seat = seat();
    let backend = FakeBackend::new();
    backend.set_offline(true);
    let courses = catalog(&["운영체제"]);
    let mut lock = CompletionLock::restore(&seat.store);
    assert!(matches!(
        lock.attempt(&seat.store, &backend, &kim(), &courses[0]).await,
        Err(AttemptError::Api(_))
    ));
    assert!(lock.selection().is_empty());
    assert!(!seat.store.register_locked());
}
