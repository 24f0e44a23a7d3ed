// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sign-in gate and the login/logout flows.

use seatrush_app_core::store::StoreError;
use seatrush_client::{ApiError, Backend, Identity, LoginRequest};
use thiserror::Error;
use tracing::{info, warn};

use crate::page::PageLabel;
use crate::store::SessionStore;

/// Outcome of gating a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the page for this student.
    Allowed(Identity),
    /// The page was switched to `login`; render nothing and reload.
    Redirect,
}

/// Sign-in form input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Student number or name left blank.
    #[error("enter both your student number and your name")]
    MissingField,
    /// Student number is not an integer.
    #[error("student number must be a number, got {0:?}")]
    BadStudentId(String),
}

/// Why signing in failed.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The form was rejected locally.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The backend refused or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The identity could not be persisted.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What happened during logout. Local cleanup runs whatever the remote did.
#[derive(Debug)]
pub struct LogoutReport {
    /// Remote invalidation result; `None` when nobody was signed in.
    pub remote: Option<Result<(), ApiError>>,
    /// Local cleanup result.
    pub cleanup: Result<(), StoreError>,
}

impl LogoutReport {
    /// The remote call was attempted and failed.
    pub fn remote_failed(&self) -> bool {
        matches!(self.remote, Some(Err(_)))
    }
}

/// Check the sign-in form: both fields present, numeric student id, name
/// trimmed non-empty.
pub fn validate_login_form(student_id: &str, name: &str) -> Result<LoginRequest, ValidationError> {
    let raw_id = student_id.trim();
    let name = name.trim();
    if raw_id.is_empty() || name.is_empty() {
        return Err(ValidationError::MissingField);
    }
    let student_id = raw_id
        .parse::<i64>()
        .map_err(|_| ValidationError::BadStudentId(raw_id.to_owned()))?;
    Ok(LoginRequest {
        student_id,
        name: name.to_owned(),
    })
}

/// Gate over the persisted identity.
pub struct AuthGate<'s> {
    store: &'s SessionStore,
}

impl<'s> AuthGate<'s> {
    /// Gate over `store`.
    pub fn new(store: &'s SessionStore) -> Self {
        Self { store }
    }

    /// Signed-in identity; malformed records read as absent.
    pub fn identity(&self) -> Option<Identity> {
        self.store.identity()
    }

    /// Persist `identity`.
    pub fn set_identity(&self, identity: &Identity) -> Result<(), StoreError> {
        self.store.set_identity(identity)
    }

    /// Forget the identity.
    pub fn clear_identity(&self) -> Result<(), StoreError> {
        self.store.clear_identity()
    }

    /// Allow `current` for the signed-in student, or remember it as the
    /// resume target and switch to `login`.
    pub fn require_identity_or_redirect(
        &self,
        current: PageLabel,
    ) -> Result<GateDecision, StoreError> {
        if let Some(identity) = self.identity() {
            return Ok(GateDecision::Allowed(identity));
        }
        info!(%current, "not signed in, redirecting to login");
        self.redirect(current)?;
        Ok(GateDecision::Redirect)
    }

    /// The backend rejected the stored identity: drop it and send the
    /// student to `login`, resuming at `current` afterwards.
    pub fn expire(&self, current: PageLabel) -> Result<(), StoreError> {
        warn!(%current, "identity rejected by backend");
        self.store.clear_identity()?;
        self.redirect(current)
    }

    fn redirect(&self, current: PageLabel) -> Result<(), StoreError> {
        self.store.set_resume_target(current)?;
        self.store.set_page(PageLabel::Login)
    }

    /// Finish sign-in: consume the resume target (default `intro`), switch
    /// to it and persist the identity. Returns the page to reload into.
    pub fn complete_login(&self, identity: &Identity) -> Result<PageLabel, StoreError> {
        let target = match self.store.take_resume_target() {
            Some(PageLabel::Login) | None => PageLabel::Intro,
            Some(page) => page,
        };
        self.store.set_page(target)?;
        self.store.set_identity(identity)?;
        info!(student_id = identity.student_id, %target, "signed in");
        Ok(target)
    }

    /// On the login view with an identity already present, resume as if
    /// sign-in had just completed. `None` when nobody is signed in.
    pub fn resume_if_signed_in(&self) -> Result<Option<PageLabel>, StoreError> {
        match self.identity() {
            Some(identity) => self.complete_login(&identity).map(Some),
            None => Ok(None),
        }
    }

    /// Validate the form, sign in against the backend and complete the login.
    pub async fn login<B: Backend>(
        &self,
        backend: &B,
        student_id: &str,
        name: &str,
    ) -> Result<PageLabel, LoginError> {
        let request = validate_login_form(student_id, name)?;
        let identity = backend.login(&request).await?;
        Ok(self.complete_login(&identity)?)
    }

    /// Best-effort remote logout followed by unconditional local cleanup:
    /// identity, wait-session, page and the session scope are cleared, then
    /// the page is set to `signup`.
    pub async fn logout<B: Backend>(&self, backend: &B) -> LogoutReport {
        let remote = match self.identity() {
            Some(identity) => {
                let result = backend.logout(identity.student_id).await;
                if let Err(err) = &result {
                    warn!(%err, "remote logout failed");
                }
                Some(result)
            }
            None => None,
        };
        let cleanup = self.clear_local();
        if let Err(err) = &cleanup {
            warn!(%err, "local logout cleanup failed");
        }
        LogoutReport { remote, cleanup }
    }

    fn clear_local(&self) -> Result<(), StoreError> {
        self.store.clear_identity()?;
        self.store.clear_wait_session()?;
        self.store.clear_page()?;
        self.store.clear_session_scope()?;
        self.store.set_page(PageLabel::Signup)
    }
}
