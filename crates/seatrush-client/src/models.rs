// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire models for the backend contracts.
//!
//! Parsing is deliberately lenient and field-by-field: the backend is an
//! external collaborator and a single odd row must not blank a whole view.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of an envelope: `body.data` when present and non-null, else the body itself.
pub fn payload(body: &Value) -> &Value {
    match body.get("data") {
        Some(Value::Null) | None => body,
        Some(data) => data,
    }
}

/// Rows of a list envelope; anything but an array under `data` is an empty list.
pub fn data_rows(body: &Value) -> &[Value] {
    body.get("data")
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

#[allow(clippy::cast_possible_truncation)]
fn int_of(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

fn int_field(row: &Value, key: &str) -> Option<i64> {
    row.get(key).and_then(int_of)
}

fn text_field(row: &Value, key: &str) -> Option<String> {
    row.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Identifier that may arrive as a string or a number.
fn id_field(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A signed-in student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Student number.
    #[serde(rename = "studentId")]
    pub student_id: i64,
    /// Display name.
    pub name: String,
}

impl Identity {
    /// Structurally validate an identity record: integer `studentId` and a
    /// non-blank string `name`. Anything else is `None`, never a partial identity.
    pub fn from_value(value: &Value) -> Option<Self> {
        let student_id = value.get("studentId").and_then(int_of)?;
        let name = value.get("name")?.as_str()?;
        if name.trim().is_empty() {
            return None;
        }
        Some(Self {
            student_id,
            name: name.to_owned(),
        })
    }
}

/// Body of `POST /apply/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Student number.
    #[serde(rename = "studentId")]
    pub student_id: i64,
    /// Trimmed display name.
    pub name: String,
}

/// One row of `GET /courses/all`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogCourse {
    /// Backend identifier used in the register path.
    pub id: Option<String>,
    /// Course name.
    pub name: Option<String>,
    /// Seats left.
    pub remain: Option<i64>,
    /// Students who put the course in their basket.
    pub basket: Option<i64>,
    /// Free-form status (e.g. `OPEN`).
    pub status: Option<String>,
}

impl CatalogCourse {
    /// Lenient parse of a catalog row; non-object rows yield an all-empty course.
    pub fn from_value(row: &Value) -> Self {
        Self {
            id: id_field(row, "id"),
            name: text_field(row, "name"),
            remain: int_field(row, "remain"),
            basket: int_field(row, "basket"),
            status: text_field(row, "status"),
        }
    }
}

/// Response of one registration attempt. Only literal booleans count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// `Some(true)` when a seat was secured, `Some(false)` when the section is full.
    pub is_registered: Option<bool>,
    /// `Some(true)` once no further attempts are possible.
    pub is_all_tried: Option<bool>,
}

impl ApplyOutcome {
    /// Parse from a response body (enveloped or bare).
    pub fn from_body(body: &Value) -> Self {
        let data = payload(body);
        Self {
            is_registered: data.get("isRegistered").and_then(Value::as_bool),
            is_all_tried: data.get("isAllTried").and_then(Value::as_bool),
        }
    }

    /// True when the backend says no further attempts are possible.
    pub fn all_tried(&self) -> bool {
        self.is_all_tried == Some(true)
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    /// Number of courses secured.
    pub count: i64,
    /// Elapsed time record reported by the backend.
    pub record: i64,
    /// Position on the board.
    pub rank: i64,
    /// Student number.
    pub student_id: i64,
    /// Display name.
    pub name: String,
}

/// The caller's own result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyRank {
    /// Number of courses secured.
    pub count: i64,
    /// Elapsed time record reported by the backend.
    pub record: i64,
    /// Position on the board.
    pub rank: i64,
    /// Student number, when echoed back.
    pub student_id: Option<i64>,
    /// Display name, when echoed back.
    pub name: Option<String>,
}

impl MyRank {
    /// Parse from a response body; `None` unless `count`, `record` and `rank` are numbers.
    pub fn from_body(body: &Value) -> Option<Self> {
        let data = payload(body);
        Some(Self {
            count: int_field(data, "count")?,
            record: int_field(data, "record")?,
            rank: int_field(data, "rank")?,
            student_id: int_field(data, "studentId"),
            name: text_field(data, "name"),
        })
    }
}

/// One row of the administrative course listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCourse {
    /// Identifier taken from `id`, `courseId` or `code`, in that order.
    pub id: Option<String>,
    /// Course name.
    pub name: String,
    /// Seats left.
    pub remain: i64,
    /// Basket count.
    pub basket: i64,
    /// Status, when reported.
    pub status: Option<String>,
    /// Closing time in seconds, when configured.
    pub time: Option<i64>,
}

impl AdminCourse {
    /// Lenient parse of an admin row.
    pub fn from_value(row: &Value) -> Self {
        Self {
            id: id_field(row, "id")
                .or_else(|| id_field(row, "courseId"))
                .or_else(|| id_field(row, "code")),
            name: text_field(row, "name").unwrap_or_default(),
            remain: int_field(row, "remain").unwrap_or(0),
            basket: int_field(row, "basket").unwrap_or(0),
            status: text_field(row, "status"),
            time: int_field(row, "time"),
        }
    }
}

/// Body of `PUT /courses/update/{id}`; only provided fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdminCourseUpdate {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New seats-left value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remain: Option<i64>,
    /// New basket count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basket: Option<i64>,
    /// New closing time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
}

impl AdminCourseUpdate {
    /// True when no field would be sent.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.remain.is_none() && self.basket.is_none() && self.time.is_none()
    }
}
