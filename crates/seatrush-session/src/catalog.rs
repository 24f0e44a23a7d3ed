// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Turn backend catalog rows into registration targets.
//!
//! The backend only knows names and seat counts. Everything else a course
//! row shows (code, section, meetings, instructor, ...) is filled in here
//! from fixed tables so the same row always renders the same way.

use seatrush_client::CatalogCourse;

use crate::course::{CourseRef, HourMark, Slot, Weekday};

/// At most this many rows are offered for registration.
pub const CATALOG_LIMIT: usize = 10;

const DEFAULT_REMAIN: i64 = 100;
const DEFAULT_BASKET: i64 = 0;
const DEFAULT_STATUS: &str = "OPEN";
const CREDITS: u8 = 3;

const DIVISIONS: [&str; 4] = ["A", "B", "D", "7"];
const COMPLETIONS: [&str; 2] = ["전필", "전선"];
const DAY_NIGHT: [&str; 2] = ["주간", "야간"];
const GRADES: [&str; 4] = ["1학년", "2학년", "3학년", "4학년"];
const INSTRUCTORS: [&str; 4] = ["홍길동", "이몽룡", "성춘향", "임꺽정"];
const ROOMS: [&str; 4] = ["본관 101", "공학관 302", "IT관 B201", "신관 504"];
const REMARKS: [&str; 4] = ["비고 없음", "과제 많음", "퀴즈 있음", "팀프로젝트"];

const fn slot(day: Weekday, start: (u8, u8), end: (u8, u8)) -> Slot {
    Slot::new(day, HourMark::new(start.0, start.1), HourMark::new(end.0, end.1))
}

/// Meetings of courses without a fixed timetable entry.
pub const DEFAULT_SLOTS: [Slot; 1] = [slot(Weekday::Fri, (14, 0), (16, 0))];

/// Fixed meetings for known course names.
pub fn slots_for(name: &str) -> Vec<Slot> {
    use Weekday::{Fri, Mon, Thu, Tue, Wed};
    match name {
        "운영체제" => vec![slot(Mon, (9, 0), (11, 0)), slot(Wed, (9, 0), (11, 0))],
        "컴퓨터네트워크" => vec![slot(Tue, (13, 0), (15, 0)), slot(Thu, (13, 0), (15, 0))],
        "자료구조" => vec![slot(Mon, (11, 0), (13, 0))],
        "알고리즘" => vec![slot(Tue, (9, 30), (11, 0))],
        "컴퓨터구조" => vec![slot(Wed, (13, 0), (15, 0))],
        "데이터베이스" => vec![slot(Fri, (9, 0), (11, 0))],
        _ => DEFAULT_SLOTS.to_vec(),
    }
}

/// Display code for the `index`-th row: `V000001`, `V000002`, ...
pub fn course_code(index: usize) -> String {
    format!("V{:06}", index + 1)
}

fn cycle(table: &[&str], index: usize) -> String {
    table[index % table.len()].to_owned()
}

/// Normalize the first [`CATALOG_LIMIT`] rows into [`CourseRef`]s.
pub fn normalize_catalog(rows: &[CatalogCourse]) -> Vec<CourseRef> {
    rows.iter()
        .take(CATALOG_LIMIT)
        .enumerate()
        .map(|(idx, row)| {
            let code = course_code(idx);
            let name = row
                .name
                .clone()
                .unwrap_or_else(|| format!("과목{}", idx + 1));
            CourseRef {
                id: row.id.clone().unwrap_or_else(|| code.clone()),
                slots: slots_for(&name),
                division: cycle(&DIVISIONS, idx),
                completion: cycle(&COMPLETIONS, idx),
                credit: CREDITS,
                day_night: cycle(&DAY_NIGHT, idx),
                grade: cycle(&GRADES, idx),
                instructor: cycle(&INSTRUCTORS, idx),
                room: cycle(&ROOMS, idx),
                remark: Some(cycle(&REMARKS, idx)),
                remain: row.remain.unwrap_or(DEFAULT_REMAIN),
                basket: row.basket.unwrap_or(DEFAULT_BASKET),
                status: row
                    .status
                    .clone()
                    .unwrap_or_else(|| DEFAULT_STATUS.to_owned()),
                code,
                name,
                color: None,
            }
        })
        .collect()
}

/// Find a course by display code (case-insensitive) or by 1-based position.
pub fn find_course<'c>(courses: &'c [CourseRef], needle: &str) -> Option<&'c CourseRef> {
    let needle = needle.trim();
    if let Some(found) = courses
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(needle))
    {
        return Some(found);
    }
    needle
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| courses.get(i))
}
