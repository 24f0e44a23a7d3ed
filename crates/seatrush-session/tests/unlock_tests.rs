// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]
mod common;

use common::{kim, seat, T0};
use seatrush_client::Backend;
use seatrush_dry_tests::{BackendCall, FakeBackend, ManualClock};
use seatrush_session::{
    AuthGate, GateDecision, PageLabel, PageRouter, ProceedError, WaitEffect, WaitRoom,
};

async fn run_effect(backend: &FakeBackend, effect: WaitEffect) {
    match effect {
        WaitEffect::NotifyWindowOpened { student_id } => {
            backend.notify_window_opened(student_id).await;
        }
    }
}

#[tokio::test]
async fn countdown_unlocks_once_and_gate_appears_after_reload() {
    let seat = seat();
    let clock = ManualClock::at(T0);
    let backend = FakeBackend::new();
    seat.store.set_identity(&kim()).unwrap();

    PageRouter::new(&seat.store, &clock)
        .set_page(PageLabel::RegisterWait)
        .unwrap();
    let mut room = WaitRoom::enter(&seat.store, &clock, &kim()).unwrap();
    assert_eq!(room.check_unlock().unwrap(), None);

    for _ in 0..14 {
        clock.advance_ms(1_000);
        if let Some(effect) = room.tick().unwrap() {
            run_effect(&backend, effect).await;
        }
    }
    assert_eq!(room.remaining(), 1);
    assert!(!seat.store.wait_ready());
    assert!(!room.proceed_available());

    clock.advance_ms(1_000);
    let effect = room.tick().unwrap().unwrap();
    run_effect(&backend, effect).await;
    assert!(seat.store.wait_ready());
    assert!(room.ready_now());
    assert!(!room.proceed_available());

    for _ in 0..5 {
        clock.advance_ms(1_000);
        assert_eq!(room.tick().unwrap(), None);
    }
    assert_eq!(
        backend.count(|c| matches!(c, BackendCall::NotifyWindowOpened { .. })),
        1
    );

    let reloaded = seat.reload();
    let mut room = WaitRoom::enter(&reloaded, &clock, &kim()).unwrap();
    assert_eq!(room.check_unlock().unwrap(), None);
    assert!(room.proceed_available());
    assert_eq!(room.proceed().unwrap(), PageLabel::Register);
    assert_eq!(reloaded.page(), PageLabel::Register);
    assert!(!reloaded.wait_ready());
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn failed_notification_does_not_undo_unlock() {
    let seat = seat();
    let clock = ManualClock::at(T0);
    let backend = FakeBackend::new();
    backend.set_offline(true);
    seat.store.set_wait_entered_at(T0 - 20_000).unwrap();

    let mut room = WaitRoom::enter(&seat.store, &clock, &kim()).unwrap();
    let effect = room.check_unlock().unwrap().unwrap();
    run_effect(&backend, effect).await;
    assert!(seat.store.wait_ready());
}

#[test]
fn re_entering_the_wait_page_restarts_the_session() {
    let seat = seat();
    let clock = ManualClock::at(T0);
    seat.store.set_wait_entered_at(T0 - 60_000).unwrap();
    seat.store.set_wait_ready().unwrap();

    PageRouter::new(&seat.store, &clock)
        .set_page(PageLabel::RegisterWait)
        .unwrap();

    assert!(!seat.store.wait_ready());
    assert_eq!(seat.store.wait_entered_at(), Some(T0));
    let room = WaitRoom::enter(&seat.store, &clock, &kim()).unwrap();
    assert_eq!(room.remaining(), 15);
    assert!(matches!(
        room.proceed(),
        Err(ProceedError::NotReady { remaining: 15 })
    ));
}

#[tokio::test]
async fn redirect_then_login_resumes_the_requested_page() {
    let seat = seat();
    let backend = FakeBackend::new();
    let clock = ManualClock::at(T0);
    PageRouter::new(&seat.store, &clock)
        .set_page(PageLabel::Register)
        .unwrap();

    let gate = AuthGate::new(&seat.store);
    assert_eq!(
        gate.require_identity_or_redirect(seat.store.page()).unwrap(),
        GateDecision::Redirect
    );
    assert_eq!(seat.store.page(), PageLabel::Login);
    assert!(!PageRouter::nav_visible(seat.store.page()));

    let reloaded = seat.reload();
    let target = AuthGate::new(&reloaded)
        .login(&backend, "20240001", " Kim ")
        .await
        .unwrap();
    assert_eq!(target, PageLabel::Register);
    assert_eq!(reloaded.page(), PageLabel::Register);
    assert_eq!(reloaded.identity(), Some(kim()));
    assert_eq!(reloaded.take_resume_target(), None);
    assert_eq!(
        backend.calls(),
        vec![BackendCall::Login {
            student_id: 20_240_001,
            name: "Kim".into()
        }]
    );
}

#[test]
fn login_without_resume_target_lands_on_intro() {
    let seat = seat();
    let target = AuthGate::new(&seat.store).complete_login(&kim()).unwrap();
    assert_eq!(target, PageLabel::Intro);
    assert_eq!(seat.store.page(), PageLabel::Intro);
}
