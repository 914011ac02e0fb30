//! Rendering of request drafts into the text that is sent to the base.
//!
//! The output is copied verbatim into external communication, so the line
//! order and labels below are part of the contract.

use chrono::{Local, NaiveDate};

use crate::domain::{
    request::{ReplacedSoldier, RequestDraft, RequestKind},
    soldier::{Soldier, identity_line},
};

const TITLE_SINGLE_DAY: &str = "בקשה להצטרפות חד-יומית ללא לינה";
const TITLE_MULTI_DAY: &str = "בקשה להצטרפות עם לינה";
const TITLE_REPLACEMENT: &str = "בקשה להצטרפות עם החלפה";
const TITLE_DEPARTURE: &str = "בקשה לעזיבת בסיס";

/// Renders `draft` for `soldier`, stamped with today's local date.
///
/// For a replacement request the outgoing soldier comes from the snapshot
/// embedded in the draft.
#[must_use]
pub fn generate_message(draft: &RequestDraft, soldier: &Soldier) -> String {
    render_message(draft, soldier, Local::now().date_naive())
}

/// Renders `draft` for `soldier` with an explicit date stamp.
///
/// The output depends only on the arguments.
#[must_use]
pub fn render_message(draft: &RequestDraft, soldier: &Soldier, today: NaiveDate) -> String {
    let mut lines = Lines::default();
    let commander = draft.commander_name.trim();

    match &draft.kind {
        RequestKind::SingleDay {
            arrival_date,
            base_name,
            was_in_base_before,
            requires_approval,
        } => {
            lines.push(TITLE_SINGLE_DAY);
            lines.header(today, commander);
            lines.soldier("חייל", soldier);
            lines.field("תאריך הגעה", format_date(*arrival_date));
            lines.visit_details(base_name, *was_in_base_before, *requires_approval);
        }
        RequestKind::MultiDay {
            arrival_date,
            departure_date,
            base_name,
            was_in_base_before,
            requires_approval,
        } => {
            lines.push(TITLE_MULTI_DAY);
            lines.header(today, commander);
            lines.soldier("חייל", soldier);
            lines.field("תאריך הגעה", format_date(*arrival_date));
            lines.field("תאריך עזיבה", format_date(*departure_date));
            lines.visit_details(base_name, *was_in_base_before, *requires_approval);
        }
        RequestKind::Replacement {
            arrival_date,
            departure_date,
            base_name,
            was_in_base_before,
            requires_approval,
            replaced_soldier,
        } => {
            lines.push(TITLE_REPLACEMENT);
            lines.header(today, commander);
            lines.soldier("חייל נכנס", soldier);
            lines.field("תאריך הגעה", format_date(*arrival_date));
            lines.field("תאריך עזיבה", format_date(*departure_date));
            lines.replaced(replaced_soldier);
            lines.visit_details(base_name, *was_in_base_before, *requires_approval);
        }
        RequestKind::Departure { base_name } => {
            lines.push(TITLE_DEPARTURE);
            lines.soldier("חייל", soldier);
            lines.field("בסיס", base_name.trim());
            lines.field("מפקד מבקש", commander);
        }
    }

    lines.finish()
}

/// Formats a date the way the he-IL locale does: `D.M.YYYY`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%-d.%-m.%Y").to_string()
}

const fn yes_no(value: bool) -> &'static str {
    if value { "כן" } else { "לא" }
}

#[derive(Default)]
struct Lines(Vec<String>);

impl Lines {
    fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    fn field(&mut self, label: &str, value: impl AsRef<str>) {
        self.push(format!("{label}: {}", value.as_ref()));
    }

    fn header(&mut self, today: NaiveDate, commander: &str) {
        self.field("תאריך", format_date(today));
        self.field("מפקד מבקש", commander);
    }

    fn soldier(&mut self, label: &str, soldier: &Soldier) {
        self.field(label, soldier.identity());
        if let Some(team) = soldier.team() {
            self.field("צוות", team);
        }
    }

    fn replaced(&mut self, replaced: &ReplacedSoldier) {
        self.field(
            "חייל יוצא",
            identity_line(
                &replaced.rank,
                &replaced.full_name,
                &replaced.personal_number,
            ),
        );
        self.field(
            "תאריך עזיבת חייל יוצא",
            format_date(replaced.departure_date),
        );
    }

    fn visit_details(&mut self, base_name: &str, was_in_base_before: bool, requires_approval: bool) {
        self.field("בסיס", base_name.trim());
        self.field("היה בבסיס בעבר", yes_no(was_in_base_before));
        self.field("דורש אישור", yes_no(requires_approval));
    }

    fn finish(self) -> String {
        self.0.join("\n")
    }
}
