// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scripted [`Backend`] fake that records every call.

use seatrush_client::{
    AdminCourse, AdminCourseUpdate, ApiError, ApplyOutcome, Backend, CatalogCourse, Identity,
    LoginRequest, MyRank, RankEntry,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `POST /apply/login`.
    Login {
        /// Requested student number.
        student_id: i64,
        /// Requested name.
        name: String,
    },
    /// `POST /apply/logout`.
    Logout {
        /// Student number.
        student_id: i64,
    },
    /// `GET /courses/all`.
    Courses,
    /// `POST /apply/start`.
    NotifyWindowOpened {
        /// Student number.
        student_id: i64,
    },
    /// `POST /apply/register/{id}`.
    Register {
        /// Backend course id.
        course_id: String,
        /// Student number.
        student_id: i64,
    },
    /// `GET /rank/all`.
    Ranking,
    /// `GET /rank/my`.
    MyRank {
        /// Student number.
        student_id: i64,
    },
    /// `GET /courses/admin/all`.
    AdminCourses,
    /// `PUT /courses/update/{id}`.
    UpdateAdminCourse {
        /// Course id.
        id: String,
        /// Fields sent.
        patch: AdminCourseUpdate,
    },
}

/// Scripted failure, materialized into an [`ApiError`] per call.
#[derive(Debug, Clone)]
enum Failure {
    Status(u16, String),
    Malformed,
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Self::Status(status, body) => ApiError::Status {
                status: *status,
                body: body.clone(),
            },
            Self::Malformed => ApiError::Malformed("scripted malformed response".into()),
        }
    }
}

#[derive(Default)]
struct State {
    calls: Vec<BackendCall>,
    outcomes: VecDeque<Result<ApplyOutcome, Failure>>,
    courses: Vec<CatalogCourse>,
    ranking: Vec<RankEntry>,
    my_rank: Option<MyRank>,
    admin: Vec<AdminCourse>,
    login_failure: Option<Failure>,
    logout_failure: Option<Failure>,
    offline: bool,
}

/// In-memory backend double. Clones share the script and the call log.
///
/// With an empty register script every attempt succeeds without finishing
/// the round (`isRegistered = true`, `isAllTried = false`).
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<State>>,
}

impl FakeBackend {
    /// Create a backend with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Serve this catalog from `GET /courses/all`.
    pub fn with_courses(self, courses: Vec<CatalogCourse>) -> Self {
        self.lock().courses = courses;
        self
    }

    /// Serve this leaderboard from `GET /rank/all`.
    pub fn with_ranking(self, ranking: Vec<RankEntry>) -> Self {
        self.lock().ranking = ranking;
        self
    }

    /// Serve this personal result from `GET /rank/my`.
    pub fn with_my_rank(self, my_rank: MyRank) -> Self {
        self.lock().my_rank = Some(my_rank);
        self
    }

    /// Serve this admin listing from `GET /courses/admin/all`.
    pub fn with_admin_courses(self, admin: Vec<AdminCourse>) -> Self {
        self.lock().admin = admin;
        self
    }

    /// Queue the response for the next register call.
    pub fn push_outcome(&self, is_registered: bool, is_all_tried: bool) {
        self.lock().outcomes.push_back(Ok(ApplyOutcome {
            is_registered: Some(is_registered),
            is_all_tried: Some(is_all_tried),
        }));
    }

    /// Queue a non-success status for the next register call.
    pub fn push_register_status(&self, status: u16, body: &str) {
        self.lock()
            .outcomes
            .push_back(Err(Failure::Status(status, body.to_owned())));
    }

    /// Queue a malformed response for the next register call.
    pub fn push_register_malformed(&self) {
        self.lock().outcomes.push_back(Err(Failure::Malformed));
    }

    /// Make login answer with a non-success status.
    pub fn fail_login(&self, status: u16, body: &str) {
        self.lock().login_failure = Some(Failure::Status(status, body.to_owned()));
    }

    /// Make logout answer with a non-success status.
    pub fn fail_logout(&self, status: u16, body: &str) {
        self.lock().logout_failure = Some(Failure::Status(status, body.to_owned()));
    }

    /// Simulate a dead network: every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: BackendCall) -> Result<(), ApiError> {
        let mut state = self.lock();
        state.calls.push(call);
        if state.offline {
            return Err(ApiError::Transport("simulated network failure".into()));
        }
        Ok(())
    }
}

impl Backend for FakeBackend {
    async fn login(&self, request: &LoginRequest) -> Result<Identity, ApiError> {
        self.record(BackendCall::Login {
            student_id: request.student_id,
            name: request.name.clone(),
        })?;
        if let Some(failure) = &self.lock().login_failure {
            return Err(failure.to_error());
        }
        Ok(Identity {
            student_id: request.student_id,
            name: request.name.clone(),
        })
    }

    async fn logout(&self, student_id: i64) -> Result<(), ApiError> {
        self.record(BackendCall::Logout { student_id })?;
        match &self.lock().logout_failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    async fn courses(&self) -> Result<Vec<CatalogCourse>, ApiError> {
        self.record(BackendCall::Courses)?;
        Ok(self.lock().courses.clone())
    }

    async fn notify_window_opened(&self, student_id: i64) {
        let _ = self.record(BackendCall::NotifyWindowOpened { student_id });
    }

    async fn register(&self, course_id: &str, who: &Identity) -> Result<ApplyOutcome, ApiError> {
        self.record(BackendCall::Register {
            course_id: course_id.to_owned(),
            student_id: who.student_id,
        })?;
        match self.lock().outcomes.pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Ok(ApplyOutcome {
                is_registered: Some(true),
                is_all_tried: Some(false),
            }),
        }
    }

    async fn ranking(&self) -> Result<Vec<RankEntry>, ApiError> {
        self.record(BackendCall::Ranking)?;
        Ok(self.lock().ranking.clone())
    }

    async fn my_rank(&self, student_id: i64) -> Result<Option<MyRank>, ApiError> {
        self.record(BackendCall::MyRank { student_id })?;
        Ok(self.lock().my_rank.clone())
    }

    async fn admin_courses(&self) -> Result<Vec<AdminCourse>, ApiError> {
        self.record(BackendCall::AdminCourses)?;
        Ok(self.lock().admin.clone())
    }

    async fn update_admin_course(&self, id: &str, patch: &AdminCourseUpdate) -> Result<(), ApiError> {
        self.record(BackendCall::UpdateAdminCourse {
            id: id.to_owned(),
            patch: patch.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn kim() -> Identity {
        Identity {
            student_id: 1,
            name: "Kim".into(),
        }
    }

    #[tokio::test]
    async fn register_script_is_consumed_in_order() {
        let backend = FakeBackend::new();
        backend.push_outcome(false, false);
        backend.push_register_status(403, "expired");

        let first = backend.register("a", &kim()).await.unwrap();
        assert_eq!(first.is_registered, Some(false));
        assert!(backend.register("a", &kim()).await.unwrap_err().is_unauthorized());
        let default = backend.register("a", &kim()).await.unwrap();
        assert_eq!(default.is_registered, Some(true));
        assert_eq!(
            backend.count(|c| matches!(c, BackendCall::Register { .. })),
            3
        );
    }

    #[tokio::test]
    async fn offline_backend_still_records_notifications() {
        let backend = FakeBackend::new();
        backend.set_offline(true);
        backend.notify_window_opened(9).await;
        assert!(backend.courses().await.is_err());
        assert_eq!(
            backend.calls(),
            vec![
                BackendCall::NotifyWindowOpened { student_id: 9 },
                BackendCall::Courses
            ]
        );
    }
}
