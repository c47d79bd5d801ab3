use serde::Serialize;

use crate::due::format_due_badge;
use crate::model::{Priority, Task};
use crate::view::Stats;

pub const EMPTY_VIEW: &str = "No tasks — add one with 'tm add'.";

/// JSON shape of `tm list --json`.
#[derive(Serialize)]
pub struct ListOutput<'a> {
    pub tasks: Vec<&'a Task>,
    pub stats: Stats,
}

pub fn format_task_detail(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("Id:          {}\n", task.id));
    out.push_str(&format!("Title:       {}\n", task.title));
    out.push_str(&format!(
        "Status:      {}\n",
        if task.done { "done" } else { "active" }
    ));
    out.push_str(&format!("Priority:    {}\n", task.priority.label()));
    if let Some(ref due) = task.due {
        let badge = format_due_badge(due);
        if badge.is_empty() {
            out.push_str(&format!("Due:         {due}\n"));
        } else {
            out.push_str(&format!("Due:         {due} ({badge})\n"));
        }
    }
    if !task.tags.is_empty() {
        out.push_str(&format!("Tags:        {}\n", task.tags.join(", ")));
    }
    if !task.description.is_empty() {
        out.push_str(&format!("Description: {}\n", task.description));
    }
    out
}

/// One line per task: icon, title, priority, tags, due badge and id. With
/// `details` the description follows on an indented line.
pub fn format_task_list(tasks: &[&Task], details: bool) -> String {
    if tasks.is_empty() {
        return format!("{EMPTY_VIEW}\n");
    }
    let mut out = String::new();
    for task in tasks {
        out.push_str(&format!("{} {}", task.icon(), task.title));
        if task.priority != Priority::Unset {
            out.push_str(&format!(" [{}]", task.priority.label()));
        }
        if !task.tags.is_empty() {
            out.push_str(&format!("  {}", task.tags.join(", ")));
        }
        if let Some(badge) = task.due.as_deref().map(format_due_badge) {
            if !badge.is_empty() {
                out.push_str(&format!("  {badge}"));
            }
        }
        out.push_str(&format!("  ({})\n", task.id));
        if details && !task.description.is_empty() {
            out.push_str(&format!("    {}\n", task.description));
        }
    }
    out
}

pub fn format_stats(stats: &Stats) -> String {
    format!(
        "Total: {}  Active: {}  Completed: {}  ({}%)\n",
        stats.total, stats.active, stats.completed, stats.percent
    )
}
