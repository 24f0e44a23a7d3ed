// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Registration targets, meeting slots and the composite registration key.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Teaching day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    /// Monday.
    Mon,
    /// Tuesday.
    Tue,
    /// Wednesday.
    Wed,
    /// Thursday.
    Thu,
    /// Friday.
    Fri,
}

impl Weekday {
    /// Days shown on the timetable, in order.
    pub const ALL: [Self; 5] = [Self::Mon, Self::Tue, Self::Wed, Self::Thu, Self::Fri];

    /// Three-letter code used in keys and tables.
    pub fn code(self) -> &'static str {
        match self {
            Self::Mon => "Mon",
            Self::Tue => "Tue",
            Self::Wed => "Wed",
            Self::Thu => "Thu",
            Self::Fri => "Fri",
        }
    }
}

/// Time of day in minutes after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HourMark(u16);

impl HourMark {
    /// `hour:minute`.
    #[allow(clippy::cast_lossless)]
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self(hour as u16 * 60 + minute as u16)
    }

    /// Minutes after midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl fmt::Display for HourMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// One weekly meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    /// Day of the week.
    pub day: Weekday,
    /// Start time.
    pub start: HourMark,
    /// End time.
    pub end: HourMark,
}

impl Slot {
    /// Slot on `day` from `start` to `end`.
    pub const fn new(day: Weekday, start: HourMark, end: HourMark) -> Self {
        Self { day, start, end }
    }

    /// Order-independent signature fragment, e.g. `Mon-540-660`.
    pub fn signature(&self) -> String {
        format!("{}-{}-{}", self.day.code(), self.start.0, self.end.0)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}~{}", self.day.code(), self.start, self.end)
    }
}

/// A course as offered for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    /// Backend identifier used in the register call.
    pub id: String,
    /// Display code, e.g. `V000001`.
    pub code: String,
    /// Course name.
    pub name: String,
    /// Section.
    pub division: String,
    /// Completion type (major required/elective).
    pub completion: String,
    /// Credits.
    pub credit: u8,
    /// Day or evening track.
    pub day_night: String,
    /// Target year.
    pub grade: String,
    /// Instructor.
    pub instructor: String,
    /// Room.
    pub room: String,
    /// Free-form remark.
    #[serde(default)]
    pub remark: Option<String>,
    /// Seats left when listed.
    pub remain: i64,
    /// Basket count when listed.
    pub basket: i64,
    /// Listing status.
    pub status: String,
    /// Weekly meetings.
    pub slots: Vec<Slot>,
    /// Display color, assigned once the course is secured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Identity of a registration target: two courses are the same target iff
/// their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationKey(String);

impl RegistrationKey {
    /// Key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Composite key over code, section and the sorted set of meeting slots.
pub fn registration_key(course: &CourseRef) -> RegistrationKey {
    let mut sigs: Vec<String> = course.slots.iter().map(Slot::signature).collect();
    sigs.sort();
    sigs.dedup();
    RegistrationKey(format!("{}-{}-{}", course.code, course.division, sigs.join("|")))
}

/// Colors handed out to secured courses, cycling by selection length.
pub const PALETTE: [&str; 10] = [
    "#68b3f8", "#ffb54a", "#8ed08e", "#f58fb1", "#b79df2", "#f2c84b", "#6fd6c9", "#ffa09e",
    "#a6c85f", "#7db2ff",
];

/// Color used for a timetable block whose course has none.
pub const FALLBACK_COLOR: &str = "#4a90e2";

/// Palette entry for the `index`-th secured course.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// One block on the weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableEntry {
    /// Course name.
    pub title: String,
    /// Meeting.
    pub slot: Slot,
    /// Block color.
    pub color: String,
}

/// Group the selection's meetings by weekday, each day sorted by start time.
/// Every weekday is present, possibly empty.
pub fn timetable(selection: &[CourseRef]) -> BTreeMap<Weekday, Vec<TimetableEntry>> {
    let mut days: BTreeMap<Weekday, Vec<TimetableEntry>> =
        Weekday::ALL.iter().map(|d| (*d, Vec::new())).collect();
    for course in selection {
        for slot in &course.slots {
            days.entry(slot.day).or_default().push(TimetableEntry {
                title: course.name.clone(),
                slot: *slot,
                color: course
                    .color
                    .clone()
                    .unwrap_or_else(|| FALLBACK_COLOR.to_owned()),
            });
        }
    }
    for entries in days.values_mut() {
        entries.sort_by_key(|e| e.slot.start);
    }
    days
}
