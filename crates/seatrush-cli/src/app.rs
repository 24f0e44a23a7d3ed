// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One invocation of the client: a page load plus at most one user action.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use seatrush_app_core::clock::Clock;
use seatrush_app_core::notice::{NoticeService, NoticeTone};
use seatrush_client::{AdminCourseUpdate, Backend, Identity};
use seatrush_session::catalog::{find_course, normalize_catalog};
use seatrush_session::course::timetable;
use seatrush_session::{
    AttemptError, AttemptOutcome, AuthGate, CompletionLock, CourseRef, GateDecision, LockEffect,
    LoginError, NavError, PageLabel, PageRouter, ProceedError, Route, SessionStore, WaitEffect,
    WaitRoom,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::views;

/// Gate redirects and login resumes each count as one reload.
const MAX_RELOADS: usize = 4;
const INLINE_TTL: Duration = Duration::from_secs(5);
const MAX_NOTICES: usize = 16;

/// Bad command-line input, reported with exit status 2.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct Usage(pub String);

fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

pub struct App<B, C, W> {
    store: SessionStore,
    backend: B,
    clock: C,
    out: W,
    notices: NoticeService,
}

impl<B, C, W> App<B, C, W>
where
    B: Backend,
    C: Clock,
    W: Write,
{
    pub fn new(store: SessionStore, backend: B, clock: C, out: W) -> Self {
        Self {
            store,
            backend,
            clock,
            out,
            notices: NoticeService::new(MAX_NOTICES),
        }
    }

    #[cfg(test)]
    pub fn out(&self) -> &W {
        &self.out
    }

    // ── notices ────────────────────────────────────────────────────────

    fn inline(&mut self, tone: NoticeTone, title: &str, body: Option<String>) {
        self.notices
            .push_inline(tone, title, body, INLINE_TTL, now());
    }

    fn blocking(&mut self, tone: NoticeTone, title: &str, body: Option<String>) {
        self.notices.push_blocking(tone, title, body, now());
    }

    /// Print everything revealed so far; printed blocking notices count as acknowledged.
    fn flush_notices(&mut self) -> io::Result<()> {
        let at = now();
        let visible = self.notices.visible(at);
        views::notices(&mut self.out, &visible)?;
        for n in &visible {
            self.notices.dismiss(n.id);
        }
        self.notices.retain_visible(at);
        self.out.flush()
    }

    // ── page loads ─────────────────────────────────────────────────────

    /// Render whatever `path` selects.
    pub async fn open(&mut self, path: &str) -> Result<()> {
        match Route::resolve(path) {
            Route::Admin => self.admin_list().await,
            Route::App => self.render().await,
        }
    }

    async fn render(&mut self) -> Result<()> {
        for _ in 0..MAX_RELOADS {
            let page = self.store.page();
            debug!(%page, "page load");
            views::nav_bar(&mut self.out, page)?;
            let identity = if page.requires_identity() {
                let decision = AuthGate::new(&self.store).require_identity_or_redirect(page)?;
                match decision {
                    GateDecision::Allowed(who) => Some(who),
                    GateDecision::Redirect => {
                        writeln!(self.out, "Sign-in required.")?;
                        continue;
                    }
                }
            } else {
                None
            };
            let reload = match (page, identity.as_ref()) {
                (PageLabel::Intro, _) => {
                    views::intro(&mut self.out)?;
                    false
                }
                (PageLabel::Courses, _) => {
                    self.show_courses().await?;
                    false
                }
                (PageLabel::Ranking, _) => {
                    self.show_ranking().await?;
                    false
                }
                (PageLabel::RegisterWait, Some(who)) => {
                    self.wait_room(who).await?;
                    false
                }
                (PageLabel::Register, Some(who)) => {
                    self.show_register(who).await?;
                    false
                }
                (PageLabel::Signup, Some(who)) => {
                    self.show_result(who).await?;
                    false
                }
                (PageLabel::Login, _) => self.show_login()?,
                (_, None) => false,
            };
            self.flush_notices()?;
            if !reload {
                return Ok(());
            }
        }
        self.flush_notices()?;
        Ok(())
    }

    async fn load_courses(&mut self) -> Vec<CourseRef> {
        match self.backend.courses().await {
            Ok(rows) => normalize_catalog(&rows),
            Err(err) => {
                self.inline(NoticeTone::Error, "Could not load courses", Some(err.user_message()));
                Vec::new()
            }
        }
    }

    async fn show_courses(&mut self) -> Result<()> {
        let courses = self.load_courses().await;
        views::catalog(&mut self.out, &courses)?;
        writeln!(self.out, "Next: seatrush goto register_wait")?;
        Ok(())
    }

    async fn show_ranking(&mut self) -> Result<()> {
        let rows = match self.backend.ranking().await {
            Ok(rows) => rows,
            Err(err) => {
                self.inline(NoticeTone::Error, "Could not load the leaderboard", Some(err.user_message()));
                Vec::new()
            }
        };
        views::ranking(&mut self.out, &rows)?;
        Ok(())
    }

    async fn show_result(&mut self, who: &Identity) -> Result<()> {
        match self.backend.my_rank(who.student_id).await {
            Ok(me) => views::my_result(&mut self.out, me.as_ref(), who)?,
            Err(err) => {
                self.inline(NoticeTone::Error, "Could not load your result", Some(err.user_message()));
            }
        }
        Ok(())
    }

    fn show_login(&mut self) -> Result<bool> {
        let resumed = AuthGate::new(&self.store).resume_if_signed_in()?;
        match resumed {
            Some(target) => {
                writeln!(self.out, "Already signed in, resuming {}.", target.title())?;
                Ok(true)
            }
            None => {
                views::login_prompt(&mut self.out)?;
                Ok(false)
            }
        }
    }

    async fn run_wait_effect(&self, effect: WaitEffect) {
        match effect {
            WaitEffect::NotifyWindowOpened { student_id } => {
                self.backend.notify_window_opened(student_id).await;
            }
        }
    }

    async fn wait_room(&mut self, who: &Identity) -> Result<()> {
        let mut room = WaitRoom::enter(&self.store, &self.clock, who)?;
        if let Some(effect) = room.check_unlock()? {
            self.run_wait_effect(effect).await;
        }
        if room.proceed_available() {
            writeln!(self.out, "Registration is open. Press GO: seatrush go")?;
            return Ok(());
        }
        if room.remaining() > 0 {
            writeln!(self.out, "{}", views::countdown_line(room.remaining()))?;
            self.out.flush()?;
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            ticker.tick().await;
            while room.remaining() > 0 {
                tokio::select! {
                    _ = ticker.tick() => {
                        let effect = room.tick()?;
                        writeln!(self.out, "{}", views::countdown_line(room.remaining()))?;
                        self.out.flush()?;
                        if let Some(effect) = effect {
                            self.run_wait_effect(effect).await;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        writeln!(self.out, "Stopped. Run `seatrush open` to resume the countdown.")?;
                        return Ok(());
                    }
                }
            }
        }
        writeln!(
            self.out,
            "Waiting is over. Reload (seatrush open) to reveal the GO button."
        )?;
        Ok(())
    }

    async fn show_register(&mut self, who: &Identity) -> Result<()> {
        debug!(student_id = who.student_id, "registration page");
        let courses = self.load_courses().await;
        let lock = CompletionLock::restore(&self.store);
        views::register(&mut self.out, &courses, &lock)?;
        views::timetable(&mut self.out, &timetable(lock.selection()))?;
        if !lock.is_locked() {
            writeln!(self.out, "Apply: seatrush apply <CODE|#>")?;
        }
        Ok(())
    }

    // ── actions ────────────────────────────────────────────────────────

    /// Menu click.
    pub async fn goto(&mut self, page: PageLabel) -> Result<()> {
        let nav = PageRouter::new(&self.store, &self.clock).navigate(page);
        match nav {
            Ok(()) => self.render().await,
            Err(NavError::Locked) => {
                self.blocking(
                    NoticeTone::Warn,
                    "The menu is locked during the countdown.",
                    None,
                );
                Ok(self.flush_notices()?)
            }
            Err(NavError::Hidden(_)) => {
                self.blocking(NoticeTone::Warn, "Sign in first.", None);
                self.render().await
            }
            Err(NavError::NotInMenu(p)) => Err(Usage(format!("{p} is not a menu page")).into()),
            Err(NavError::Store(err)) => Err(err.into()),
        }
    }

    /// Submit the sign-in form.
    pub async fn login(&mut self, student_id: &str, name: &str) -> Result<()> {
        let result = AuthGate::new(&self.store)
            .login(&self.backend, student_id, name)
            .await;
        match result {
            Ok(target) => {
                writeln!(self.out, "Signed in. Resuming {}.", target.title())?;
                self.render().await
            }
            Err(LoginError::Validation(err)) => Err(Usage(err.to_string()).into()),
            Err(LoginError::Api(err)) => Err(anyhow::Error::new(err).context("sign-in failed")),
            Err(LoginError::Store(err)) => {
                Err(anyhow::Error::new(err).context("could not save the sign-in"))
            }
        }
    }

    /// Log out, then land on the result page (which asks for sign-in again).
    pub async fn logout(&mut self) -> Result<()> {
        let report = AuthGate::new(&self.store).logout(&self.backend).await;
        if let Some(Err(err)) = &report.remote {
            self.inline(NoticeTone::Error, "Logout request failed", Some(err.user_message()));
        }
        report.cleanup.context("could not clear local state")?;
        self.blocking(NoticeTone::Info, "You have been logged out.", None);
        self.render().await
    }

    /// Press GO in the waiting room.
    pub async fn go(&mut self) -> Result<()> {
        let page = self.store.page();
        if page != PageLabel::RegisterWait {
            self.blocking(
                NoticeTone::Warn,
                "GO is only available in the waiting room.",
                None,
            );
            return Ok(self.flush_notices()?);
        }
        let decision = AuthGate::new(&self.store).require_identity_or_redirect(page)?;
        let GateDecision::Allowed(who) = decision else {
            return self.render().await;
        };
        let proceeded = WaitRoom::enter(&self.store, &self.clock, &who)?.proceed();
        match proceeded {
            Ok(_) => self.render().await,
            Err(ProceedError::NotReady { remaining }) => {
                let hint = if remaining > 0 {
                    format!("{remaining}s left on the countdown.")
                } else {
                    "Reload the waiting room first: seatrush open".to_owned()
                };
                self.blocking(NoticeTone::Warn, "Registration is not open yet.", Some(hint));
                Ok(self.flush_notices()?)
            }
            Err(ProceedError::Store(err)) => Err(err.into()),
        }
    }

    /// Apply for each course in `needles` (code or 1-based position), in
    /// order, within one page load. The selection lives only as long as the
    /// load, so a round is normally raced in a single invocation.
    pub async fn apply(&mut self, needles: &[String]) -> Result<()> {
        let page = self.store.page();
        if page != PageLabel::Register {
            self.blocking(
                NoticeTone::Warn,
                "Open the registration page first.",
                Some("seatrush goto register".to_owned()),
            );
            return Ok(self.flush_notices()?);
        }
        let decision = AuthGate::new(&self.store).require_identity_or_redirect(page)?;
        let GateDecision::Allowed(who) = decision else {
            return self.render().await;
        };
        let courses = self.load_courses().await;
        let mut targets = Vec::with_capacity(needles.len());
        for needle in needles {
            let Some(course) = find_course(&courses, needle) else {
                self.flush_notices()?;
                return Err(Usage(format!("no course matches {needle:?}")).into());
            };
            targets.push(course.clone());
        }

        let mut lock = CompletionLock::restore(&self.store);
        for course in &targets {
            let attempt = lock.attempt(&self.store, &self.backend, &who, course).await;
            match attempt {
                Ok(report) => {
                    self.report_outcome(course, &report.outcome)?;
                    if let Some(LockEffect::AnnounceCompletion { after }) = report.effect {
                        views::timetable(&mut self.out, &timetable(lock.selection()))?;
                        return self.announce_completion(after).await;
                    }
                }
                Err(AttemptError::Rejected(rejection)) => {
                    self.blocking(
                        NoticeTone::Warn,
                        &format!("{}: {rejection}", course.code),
                        None,
                    );
                }
                Err(AttemptError::Unauthorized(err)) => {
                    self.inline(NoticeTone::Error, "Registration failed", Some(err.user_message()));
                    AuthGate::new(&self.store).expire(PageLabel::Register)?;
                    self.flush_notices()?;
                    return self.render().await;
                }
                Err(AttemptError::Api(err)) => {
                    warn!(course = %course.code, %err, "registration attempt failed");
                    self.inline(
                        NoticeTone::Error,
                        &format!("Registration for {} failed", course.code),
                        Some(err.user_message()),
                    );
                }
                Err(AttemptError::Store(err)) => {
                    return Err(anyhow::Error::new(err).context("could not record the completion"));
                }
            }
        }
        views::timetable(&mut self.out, &timetable(lock.selection()))?;
        Ok(self.flush_notices()?)
    }

    fn report_outcome(&mut self, course: &CourseRef, outcome: &AttemptOutcome) -> io::Result<()> {
        match outcome {
            AttemptOutcome::Registered { .. } => {
                writeln!(self.out, "Secured {} ({}).", course.name, course.code)?;
            }
            AttemptOutcome::CapacityExhausted => {
                self.blocking(
                    NoticeTone::Warn,
                    "This section is full.",
                    Some(course.code.clone()),
                );
            }
            AttemptOutcome::Unconfirmed => {
                self.inline(
                    NoticeTone::Info,
                    "The backend did not confirm the attempt",
                    Some(course.code.clone()),
                );
            }
        }
        Ok(())
    }

    async fn announce_completion(&mut self, after: Duration) -> Result<()> {
        self.notices.push_blocking(
            NoticeTone::Info,
            "Registration complete!",
            Some("Your timetable has been saved.".to_owned()),
            now() + after,
        );
        self.flush_notices()?;
        if let Some(wait) = self.notices.next_reveal(now()) {
            tokio::time::sleep(wait).await;
        }
        self.flush_notices()?;
        PageRouter::new(&self.store, &self.clock).set_page(PageLabel::Signup)?;
        writeln!(self.out, "See your result: seatrush open")?;
        Ok(())
    }

    // ── admin ──────────────────────────────────────────────────────────

    pub async fn admin_list(&mut self) -> Result<()> {
        let rows = self
            .backend
            .admin_courses()
            .await
            .context("could not load admin courses")?;
        views::admin(&mut self.out, &rows)?;
        Ok(())
    }

    pub async fn admin_update(&mut self, id: &str, patch: &AdminCourseUpdate) -> Result<()> {
        if patch.is_empty() {
            return Err(
                Usage("nothing to update; pass --name, --remain, --basket or --time".into()).into(),
            );
        }
        self.backend
            .update_admin_course(id, patch)
            .await
            .with_context(|| format!("could not update course {id}"))?;
        writeln!(self.out, "Updated {id}.")?;
        self.admin_list().await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use seatrush_client::{AdminCourse, CatalogCourse};
    use seatrush_dry_tests::{BackendCall, FakeBackend, InMemoryKvStore, ManualClock};

    const T0: i64 = 1_700_000_000_000;

    struct Harness {
        local: InMemoryKvStore,
        session: InMemoryKvStore,
        backend: FakeBackend,
        clock: ManualClock,
    }

    impl Harness {
        fn new() -> Self {
            let rows = ["운영체제", "자료구조"]
                .iter()
                .enumerate()
                .map(|(i, n)| CatalogCourse {
                    id: Some(format!("{}", i + 1)),
                    name: Some((*n).to_owned()),
                    ..CatalogCourse::default()
                })
                .collect();
            Self {
                local: InMemoryKvStore::new(),
                session: InMemoryKvStore::new(),
                backend: FakeBackend::new().with_courses(rows),
                clock: ManualClock::at(T0),
            }
        }

        /// A fresh process over the same persisted state.
        fn app(&self) -> App<FakeBackend, ManualClock, Vec<u8>> {
            App::new(
                SessionStore::new(self.local.clone(), self.session.clone()),
                self.backend.clone(),
                self.clock.clone(),
                Vec::new(),
            )
        }

        fn store(&self) -> SessionStore {
            SessionStore::new(self.local.clone(), self.session.clone())
        }
    }

    fn text(app: &App<FakeBackend, ManualClock, Vec<u8>>) -> String {
        String::from_utf8_lossy(app.out()).into_owned()
    }

    #[tokio::test(start_paused = true)]
    async fn full_round_from_login_to_result() {
        let h = Harness::new();
        h.backend.push_outcome(true, false);
        h.backend.push_outcome(true, true);

        let mut app = h.app();
        app.goto(PageLabel::RegisterWait).await.unwrap();
        assert!(text(&app).contains("Sign-in required."));
        assert!(text(&app).contains("seatrush login"));

        let mut app = h.app();
        app.login("20240001", "Kim").await.unwrap();
        let out = text(&app);
        assert!(out.contains("Waiting... (15s)"));
        assert!(out.contains("Waiting... (1s)"));
        assert!(out.contains("Reload (seatrush open)"));
        assert!(!out.contains("Press GO"));
        assert_eq!(
            h.backend
                .count(|c| matches!(c, BackendCall::NotifyWindowOpened { .. })),
            1
        );

        let mut app = h.app();
        app.open("/").await.unwrap();
        assert!(text(&app).contains("Press GO"));

        let mut app = h.app();
        app.go().await.unwrap();
        assert!(text(&app).contains("Apply: seatrush apply"));
        assert_eq!(h.store().page(), PageLabel::Register);

        let mut app = h.app();
        app.apply(&["1".to_owned(), "v000002".to_owned()]).await.unwrap();
        let out = text(&app);
        assert!(out.contains("Secured 운영체제 (V000001)."));
        assert!(out.contains("Secured 자료구조 (V000002)."));
        assert!(out.contains("[!] Registration complete!"));
        assert!(out.contains("See your result"));
        assert_eq!(h.store().page(), PageLabel::Signup);
        assert_eq!(h.store().completion_snapshot().len(), 2);

        let mut app = h.app();
        app.goto(PageLabel::Register).await.unwrap();
        assert!(text(&app).contains("Registration complete. Your timetable is final."));
        app.apply(&["1".to_owned()]).await.unwrap();
        assert!(text(&app).contains("already complete"));
        assert_eq!(
            h.backend
                .count(|c| matches!(c, BackendCall::NotifyWindowOpened { .. })),
            1
        );
        assert_eq!(
            h.backend.count(|c| matches!(c, BackendCall::Register { .. })),
            2
        );
    }

    #[tokio::test]
    async fn menu_is_locked_in_the_waiting_room() {
        let h = Harness::new();
        let store = h.store();
        store
            .set_identity(&Identity {
                student_id: 1,
                name: "Kim".into(),
            })
            .unwrap();
        store.set_page(PageLabel::RegisterWait).unwrap();

        let mut app = h.app();
        app.goto(PageLabel::Ranking).await.unwrap();
        assert!(text(&app).contains("menu is locked"));
        assert_eq!(h.store().page(), PageLabel::RegisterWait);
        assert!(h.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn go_before_reload_is_rejected() {
        let h = Harness::new();
        let store = h.store();
        store
            .set_identity(&Identity {
                student_id: 1,
                name: "Kim".into(),
            })
            .unwrap();
        store.set_page(PageLabel::RegisterWait).unwrap();
        store.set_wait_entered_at(T0 - 60_000).unwrap();

        let mut app = h.app();
        app.go().await.unwrap();
        assert!(text(&app).contains("Registration is not open yet."));
        assert_eq!(h.store().page(), PageLabel::RegisterWait);
    }

    #[tokio::test]
    async fn server_error_on_one_course_does_not_stop_the_rest() {
        let h = Harness::new();
        let store = h.store();
        store
            .set_identity(&Identity {
                student_id: 1,
                name: "Kim".into(),
            })
            .unwrap();
        store.set_page(PageLabel::Register).unwrap();
        h.backend.push_register_status(500, "boom");
        h.backend.push_outcome(true, false);

        let mut app = h.app();
        app.apply(&["1".to_owned(), "2".to_owned()]).await.unwrap();
        let out = text(&app);
        assert!(out.contains("Registration for V000001 failed"));
        assert!(out.contains("boom"));
        assert!(out.contains("Secured 자료구조 (V000002)."));
        assert_eq!(
            h.backend.count(|c| matches!(c, BackendCall::Register { .. })),
            2
        );
        assert_eq!(h.store().page(), PageLabel::Register);
    }

    #[tokio::test]
    async fn sign_in_form_has_no_menu_to_click() {
        let h = Harness::new();
        h.store().set_page(PageLabel::Login).unwrap();

        let mut app = h.app();
        app.goto(PageLabel::Intro).await.unwrap();
        let out = text(&app);
        assert!(out.contains("Sign in first."));
        assert!(out.contains("seatrush login"));
        assert_eq!(h.store().page(), PageLabel::Login);
    }

    #[tokio::test]
    async fn expired_identity_on_apply_returns_to_login() {
        let h = Harness::new();
        let store = h.store();
        store
            .set_identity(&Identity {
                student_id: 1,
                name: "Kim".into(),
            })
            .unwrap();
        store.set_page(PageLabel::Register).unwrap();
        h.backend.push_register_status(401, "session expired");

        let mut app = h.app();
        app.apply(&["1".to_owned()]).await.unwrap();
        let out = text(&app);
        assert!(out.contains("session expired"));
        assert!(out.contains("seatrush login"));
        assert!(h.store().identity().is_none());
    }

    #[tokio::test]
    async fn logout_reports_remote_failure_and_asks_for_sign_in() {
        let h = Harness::new();
        h.store()
            .set_identity(&Identity {
                student_id: 9,
                name: "Lee".into(),
            })
            .unwrap();
        h.backend.fail_logout(500, "down");

        let mut app = h.app();
        app.logout().await.unwrap();
        let out = text(&app);
        assert!(out.contains("Logout request failed: down"));
        assert!(out.contains("You have been logged out."));
        assert!(out.contains("seatrush login"));
        assert_eq!(h.store().page(), PageLabel::Login);
    }

    #[tokio::test]
    async fn unreachable_backend_renders_empty_catalog() {
        let h = Harness::new();
        h.backend.set_offline(true);
        let mut app = h.app();
        app.goto(PageLabel::Courses).await.unwrap();
        let out = text(&app);
        assert!(out.contains("No courses are listed."));
        assert!(out.contains("Could not load courses"));
    }

    #[tokio::test]
    async fn admin_route_and_update() {
        let h = Harness::new();
        let backend = FakeBackend::new().with_admin_courses(vec![AdminCourse {
            id: Some("7".into()),
            name: "DB".into(),
            remain: 3,
            basket: 1,
            status: None,
            time: Some(30),
        }]);
        let mut app = App::new(h.store(), backend.clone(), h.clock.clone(), Vec::new());
        app.open("/admin").await.unwrap();
        assert!(text(&app).contains("DB"));

        let err = app
            .admin_update("7", &AdminCourseUpdate::default())
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<Usage>().is_some());

        let patch = AdminCourseUpdate {
            remain: Some(10),
            ..AdminCourseUpdate::default()
        };
        app.admin_update("7", &patch).await.unwrap();
        assert!(backend.calls().contains(&BackendCall::UpdateAdminCourse {
            id: "7".into(),
            patch
        }));
    }
}
