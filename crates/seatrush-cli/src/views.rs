// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Text renderings of each page. Views only format; they never touch state.

use std::collections::BTreeMap;
use std::io::{self, Write};

use comfy_table::{presets, Table};
use seatrush_app_core::notice::{NoticeKind, NoticeRender, NoticeTone};
use seatrush_client::{AdminCourse, Identity, MyRank, RankEntry};
use seatrush_session::countdown::urgency;
use seatrush_session::course::TimetableEntry;
use seatrush_session::{CompletionLock, CourseRef, PageLabel, PageRouter, Weekday};

/// Rows shown on the leaderboard.
pub const LEADERBOARD_ROWS: usize = 20;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.set_header(header.to_vec());
    table
}

fn schedule(course: &CourseRef) -> String {
    course
        .slots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn nav_bar(out: &mut impl Write, current: PageLabel) -> io::Result<()> {
    if !PageRouter::nav_visible(current) {
        return Ok(());
    }
    let entries: Vec<String> = PageLabel::MENU
        .iter()
        .map(|p| {
            if *p == current {
                format!("[{}]", p.title())
            } else {
                p.title().to_owned()
            }
        })
        .collect();
    write!(out, "{} | Log out", entries.join(" | "))?;
    if !PageRouter::nav_enabled(current) {
        write!(out, "  (menu locked during the countdown)")?;
    }
    writeln!(out)?;
    writeln!(out)
}

pub fn intro(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "SeatRush: practice course registration")?;
    writeln!(out)?;
    writeln!(out, "1. Browse the course list:      seatrush goto courses")?;
    writeln!(out, "2. Enter the waiting room:      seatrush goto register_wait")?;
    writeln!(out, "3. When the countdown ends, reload (seatrush open) and press GO (seatrush go)")?;
    writeln!(out, "4. Apply as fast as you can:    seatrush apply <CODE|#>")?;
    writeln!(out, "5. Check your result and the leaderboard")
}

pub fn catalog(out: &mut impl Write, courses: &[CourseRef]) -> io::Result<()> {
    if courses.is_empty() {
        return writeln!(out, "No courses are listed.");
    }
    let mut t = table(&[
        "#", "Code", "Name", "Section", "Type", "Credits", "Schedule", "Instructor", "Room",
        "Remain", "Basket", "Status",
    ]);
    for (i, c) in courses.iter().enumerate() {
        t.add_row(vec![
            (i + 1).to_string(),
            c.code.clone(),
            c.name.clone(),
            c.division.clone(),
            c.completion.clone(),
            c.credit.to_string(),
            schedule(c),
            c.instructor.clone(),
            c.room.clone(),
            c.remain.to_string(),
            c.basket.to_string(),
            c.status.clone(),
        ]);
    }
    writeln!(out, "{t}")
}

pub fn register(out: &mut impl Write, courses: &[CourseRef], lock: &CompletionLock) -> io::Result<()> {
    if lock.is_locked() {
        writeln!(out, "Registration complete. Your timetable is final.")?;
    }
    if !courses.is_empty() {
        let mut t = table(&["#", "Code", "Name", "Section", "Schedule", "Remain", ""]);
        for (i, c) in courses.iter().enumerate() {
            let action = if lock.is_selected(c) {
                "applied"
            } else if lock.is_locked() {
                ""
            } else {
                "apply"
            };
            t.add_row(vec![
                (i + 1).to_string(),
                c.code.clone(),
                c.name.clone(),
                c.division.clone(),
                schedule(c),
                c.remain.to_string(),
                action.to_owned(),
            ]);
        }
        writeln!(out, "{t}")?;
    }
    writeln!(out, "Secured: {}", lock.selection().len())
}

pub fn timetable(
    out: &mut impl Write,
    days: &BTreeMap<Weekday, Vec<TimetableEntry>>,
) -> io::Result<()> {
    let rows = days.values().map(Vec::len).max().unwrap_or(0);
    if rows == 0 {
        return writeln!(out, "Timetable is empty.");
    }
    let header: Vec<&str> = Weekday::ALL.iter().map(|d| d.code()).collect();
    let mut t = table(&header);
    for row in 0..rows {
        t.add_row(
            Weekday::ALL
                .iter()
                .map(|d| {
                    days.get(d)
                        .and_then(|entries| entries.get(row))
                        .map(|e| {
                            format!("{}~{} {} {}", e.slot.start, e.slot.end, e.title, e.color)
                        })
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>(),
        );
    }
    writeln!(out, "{t}")
}

pub fn countdown_line(secs: u32) -> String {
    let level = urgency(secs);
    if level > 0.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let bars = (level * 10.0).ceil() as usize;
        format!("Waiting... ({secs}s) {}", "!".repeat(bars))
    } else {
        format!("Waiting... ({secs}s)")
    }
}

pub fn ranking(out: &mut impl Write, rows: &[RankEntry]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No results yet.");
    }
    let mut t = table(&["Rank", "Name", "Student", "Courses", "Record"]);
    for (i, r) in rows.iter().take(LEADERBOARD_ROWS).enumerate() {
        let rank = match MEDALS.get(i) {
            Some(medal) => format!("{medal} {}", r.rank),
            None => r.rank.to_string(),
        };
        t.add_row(vec![
            rank,
            r.name.clone(),
            r.student_id.to_string(),
            r.count.to_string(),
            r.record.to_string(),
        ]);
    }
    writeln!(out, "{t}")
}

pub fn my_result(out: &mut impl Write, me: Option<&MyRank>, who: &Identity) -> io::Result<()> {
    let Some(me) = me else {
        writeln!(out, "No result yet. Finish a registration round first.")?;
        return writeln!(out, "Leaderboard: seatrush goto ranking");
    };
    writeln!(out, "My registration result")?;
    writeln!(out, "  Name     {}", me.name.as_deref().unwrap_or(&who.name))?;
    writeln!(
        out,
        "  Student  {}",
        me.student_id.unwrap_or(who.student_id)
    )?;
    writeln!(out, "  Record   {}", me.record)?;
    writeln!(out, "  Courses  {}", me.count)?;
    writeln!(out, "  Rank     #{}", me.rank)?;
    writeln!(out, "Leaderboard: seatrush goto ranking")
}

pub fn login_prompt(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Sign in to continue:")?;
    writeln!(out, "  seatrush login --student-id <NUMBER> --name <NAME>")
}

pub fn admin(out: &mut impl Write, rows: &[AdminCourse]) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No courses.");
    }
    let mut t = table(&["ID", "Name", "Remain", "Basket", "Status", "Time"]);
    for r in rows {
        t.add_row(vec![
            r.id.clone().unwrap_or_else(|| "-".into()),
            r.name.clone(),
            r.remain.to_string(),
            r.basket.to_string(),
            r.status.clone().unwrap_or_default(),
            r.time.map(|t| t.to_string()).unwrap_or_default(),
        ]);
    }
    writeln!(out, "{t}")
}

pub fn notices(out: &mut impl Write, notices: &[NoticeRender]) -> io::Result<()> {
    for n in notices {
        let tag = match n.tone {
            NoticeTone::Info => "info",
            NoticeTone::Warn => "notice",
            NoticeTone::Error => "error",
        };
        match n.kind {
            NoticeKind::Blocking => {
                writeln!(out)?;
                writeln!(out, "[!] {}", n.title)?;
                if let Some(body) = &n.body {
                    writeln!(out, "    {body}")?;
                }
            }
            NoticeKind::Inline => match &n.body {
                Some(body) => writeln!(out, "{tag}: {}: {body}", n.title)?,
                None => writeln!(out, "{tag}: {}", n.title)?,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn nav_hidden_on_login_and_locked_on_wait() {
        assert!(render(|o| nav_bar(o, PageLabel::Login)).is_empty());
        let wait = render(|o| nav_bar(o, PageLabel::RegisterWait));
        assert!(wait.contains("[Waiting room]"));
        assert!(wait.contains("menu locked"));
        assert!(!render(|o| nav_bar(o, PageLabel::Intro)).contains("menu locked"));
    }

    #[test]
    fn leaderboard_is_capped_with_medals() {
        let rows: Vec<RankEntry> = (1..=25)
            .map(|i| RankEntry {
                count: 3,
                record: 1000 + i,
                rank: i,
                student_id: i,
                name: format!("S{i}"),
            })
            .collect();
        let text = render(|o| ranking(o, &rows));
        assert!(text.contains("🥇 1"));
        assert!(text.contains("🥉 3"));
        assert!(text.contains("S20"));
        assert!(!text.contains("S21"));
    }

    #[test]
    fn countdown_gets_louder() {
        assert_eq!(countdown_line(12), "Waiting... (12s)");
        assert!(countdown_line(10).ends_with('!'));
        assert!(countdown_line(1).matches('!').count() > countdown_line(9).matches('!').count());
    }

    #[test]
    fn empty_result_points_at_leaderboard() {
        let who = Identity {
            student_id: 1,
            name: "Kim".into(),
        };
        let text = render(|o| my_result(o, None, &who));
        assert!(text.contains("No result yet"));
    }
}
