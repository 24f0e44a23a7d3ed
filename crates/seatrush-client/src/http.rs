// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `reqwest` implementation of [`Backend`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::Backend;
use crate::error::ApiError;
use crate::models::{
    data_rows, payload, AdminCourse, AdminCourseUpdate, ApplyOutcome, CatalogCourse, Identity,
    LoginRequest, MyRank, RankEntry,
};

/// Base URL used when nothing else is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";

/// HTTP client for the registration backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base: Url,
}

impl HttpBackend {
    /// Build a client for `base` (e.g. `http://host/api`) with a per-request timeout.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base.trim_end_matches('/'))
            .map_err(|e| ApiError::Transport(format!("invalid api base {base:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::Transport(format!("invalid api base {base}")));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "backend response");
        if status.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }

    /// Read a JSON body; a declared non-JSON content type is a malformed response.
    async fn read_json(response: Response) -> Result<Value, ApiError> {
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let text = response.text().await?;
        match content_type {
            Some(ct) if ct.contains("json") => {}
            other => {
                let ct = other.as_deref().unwrap_or("no content type");
                let preview: String = text.chars().take(200).collect();
                return Err(ApiError::Malformed(format!("expected JSON, got {ct}: {preview}")));
            }
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Malformed(e.to_string()))
    }
}

impl Backend for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> Result<Identity, ApiError> {
        let url = self.endpoint(&["apply", "login"]);
        let response = self.send(self.http.post(url).json(request)).await?;
        let body = Self::read_json(response).await?;
        Identity::from_value(payload(&body))
            .ok_or_else(|| ApiError::Malformed("login response lacks studentId/name".into()))
    }

    async fn logout(&self, student_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&["apply", "logout"]);
        self.send(self.http.post(url).query(&[("studentId", student_id)]))
            .await?;
        Ok(())
    }

    async fn courses(&self) -> Result<Vec<CatalogCourse>, ApiError> {
        let url = self.endpoint(&["courses", "all"]);
        let body = Self::read_json(self.send(self.http.get(url)).await?).await?;
        Ok(data_rows(&body).iter().map(CatalogCourse::from_value).collect())
    }

    async fn notify_window_opened(&self, student_id: i64) {
        let url = self.endpoint(&["apply", "start"]);
        match self
            .send(self.http.post(url).query(&[("studentId", student_id)]))
            .await
        {
            Ok(_) => debug!(student_id, "window-opened notification delivered"),
            Err(err) => warn!(student_id, %err, "window-opened notification failed (ignored)"),
        }
    }

    async fn register(&self, course_id: &str, who: &Identity) -> Result<ApplyOutcome, ApiError> {
        let url = self.endpoint(&["apply", "register", course_id]);
        let request = self.http.post(url).query(&[
            ("studentId", who.student_id.to_string()),
            ("name", who.name.clone()),
        ]);
        let body = Self::read_json(self.send(request).await?).await?;
        Ok(ApplyOutcome::from_body(&body))
    }

    async fn ranking(&self) -> Result<Vec<RankEntry>, ApiError> {
        let url = self.endpoint(&["rank", "all"]);
        let body = Self::read_json(self.send(self.http.get(url)).await?).await?;
        Ok(data_rows(&body)
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect())
    }

    async fn my_rank(&self, student_id: i64) -> Result<Option<MyRank>, ApiError> {
        let url = self.endpoint(&["rank", "my"]);
        let response = self
            .http
            .get(url)
            .query(&[("studentId", student_id)])
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return match serde_json::from_str::<Value>(&text) {
                // Server error pages for this path mean "no result computed yet".
                Ok(err)
                    if status.is_server_error()
                        && err
                            .get("path")
                            .and_then(Value::as_str)
                            .is_some_and(|p| p.contains("/rank/my")) =>
                {
                    Ok(None)
                }
                Ok(err) => Err(ApiError::Status {
                    status: status.as_u16(),
                    body: err
                        .get("message")
                        .or_else(|| err.get("error"))
                        .and_then(Value::as_str)
                        .map_or(text.clone(), str::to_owned),
                }),
                Err(_) => Err(ApiError::Status {
                    status: status.as_u16(),
                    body: text,
                }),
            };
        }
        Ok(serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| MyRank::from_body(&body)))
    }

    async fn admin_courses(&self) -> Result<Vec<AdminCourse>, ApiError> {
        let url = self.endpoint(&["courses", "admin", "all"]);
        let body = Self::read_json(self.send(self.http.get(url)).await?).await?;
        Ok(data_rows(&body).iter().map(AdminCourse::from_value).collect())
    }

    async fn update_admin_course(&self, id: &str, patch: &AdminCourseUpdate) -> Result<(), ApiError> {
        let url = self.endpoint(&["courses", "update", id]);
        self.send(self.http.put(url).json(patch)).await?;
        Ok(())
    }
}
