use chrono::{Local, NaiveDate};

use crate::validate::DATE_FORMAT;

/// Human-friendly due label relative to today's local date.
pub fn format_due_badge(date: &str) -> String {
    format_due_badge_on(date, Local::now().date_naive())
}

/// Due label relative to `today`. Returns an empty string when `date` is
/// not a YYYY-MM-DD date.
pub fn format_due_badge_on(date: &str, today: NaiveDate) -> String {
    let Ok(due) = NaiveDate::parse_from_str(date, DATE_FORMAT) else {
        return String::new();
    };
    match (due - today).num_days() {
        0 => "Due: Today".to_string(),
        1 => "Due: Tomorrow".to_string(),
        d if d < 0 => "Overdue".to_string(),
        _ => format!("Due: {date}"),
    }
}
