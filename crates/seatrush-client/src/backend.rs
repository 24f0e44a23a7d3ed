// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Backend port consumed by the session state machine and the views.

use std::future::Future;

use crate::error::ApiError;
use crate::models::{
    AdminCourse, AdminCourseUpdate, ApplyOutcome, CatalogCourse, Identity, LoginRequest, MyRank,
    RankEntry,
};

/// Request/response contracts of the registration backend.
///
/// Methods use RPITIT (`-> impl Future + Send`) so implementations can be
/// plain `async fn`s without an `async-trait` dependency.
pub trait Backend: Send + Sync {
    /// `POST /apply/login`; returns the identity echoed by the backend.
    fn login(&self, request: &LoginRequest)
        -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// `POST /apply/logout?studentId`; invalidates the server-side session.
    fn logout(&self, student_id: i64) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /courses/all`.
    fn courses(&self) -> impl Future<Output = Result<Vec<CatalogCourse>, ApiError>> + Send;

    /// `POST /apply/start?studentId`: the countdown reached zero.
    ///
    /// Best-effort: failures are logged by the implementation and never
    /// reach the caller. The backend tolerates this arriving late, twice or
    /// not at all.
    fn notify_window_opened(&self, student_id: i64) -> impl Future<Output = ()> + Send;

    /// `POST /apply/register/{courseId}?studentId&name`: one registration attempt.
    fn register(
        &self,
        course_id: &str,
        who: &Identity,
    ) -> impl Future<Output = Result<ApplyOutcome, ApiError>> + Send;

    /// `GET /rank/all`.
    fn ranking(&self) -> impl Future<Output = Result<Vec<RankEntry>, ApiError>> + Send;

    /// `GET /rank/my?studentId`; `Ok(None)` when there is no result yet.
    fn my_rank(&self, student_id: i64)
        -> impl Future<Output = Result<Option<MyRank>, ApiError>> + Send;

    /// `GET /courses/admin/all`.
    fn admin_courses(&self) -> impl Future<Output = Result<Vec<AdminCourse>, ApiError>> + Send;

    /// `PUT /courses/update/{id}` with only the provided fields.
    fn update_admin_course(
        &self,
        id: &str,
        patch: &AdminCourseUpdate,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
