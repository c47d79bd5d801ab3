use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::Serialize;

use crate::model::Task;

/// Completion filter for the task view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.done,
            Self::Completed => task.done,
        }
    }
}

impl FromStr for Filter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => bail!("invalid filter '{s}': must be all, active, or completed"),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Collection order.
    #[default]
    Manual,
    DueAsc,
    DueDesc,
    PrioDesc,
    PrioAsc,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::DueAsc => "dueAsc",
            Self::DueDesc => "dueDesc",
            Self::PrioDesc => "prioDesc",
            Self::PrioAsc => "prioAsc",
        }
    }
}

impl FromStr for SortMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "manual" => Ok(Self::Manual),
            "dueAsc" | "due-asc" => Ok(Self::DueAsc),
            "dueDesc" | "due-desc" => Ok(Self::DueDesc),
            "prioDesc" | "prio-desc" => Ok(Self::PrioDesc),
            "prioAsc" | "prio-asc" => Ok(Self::PrioAsc),
            _ => bail!(
                "invalid sort '{s}': must be manual, due-asc, due-desc, prio-desc, or prio-asc"
            ),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
    pub filter: Filter,
    pub search: String,
    pub sort: SortMode,
}

impl ViewQuery {
    fn matches_search(needle: &str, task: &Task) -> bool {
        if needle.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {} {}",
            task.title,
            task.description,
            task.tags.join(" ")
        );
        haystack.to_lowercase().contains(needle)
    }
}

/// Search, filter and sort `tasks` for display. The source slice is never
/// reordered; the result borrows from it.
pub fn project<'a>(tasks: &'a [Task], query: &ViewQuery) -> Vec<&'a Task> {
    let needle = query.search.trim().to_lowercase();
    let mut list: Vec<&Task> = tasks
        .iter()
        .filter(|t| ViewQuery::matches_search(&needle, t))
        .filter(|t| query.filter.matches(t))
        .collect();

    // sort_by is stable, so ties keep collection order.
    match query.sort {
        SortMode::Manual => {}
        SortMode::DueAsc => list.sort_by(|a, b| a.due_key().cmp(b.due_key())),
        SortMode::DueDesc => list.sort_by(|a, b| b.due_key().cmp(a.due_key())),
        SortMode::PrioDesc => list.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        SortMode::PrioAsc => list.sort_by(|a, b| a.priority.rank().cmp(&b.priority.rank())),
    }
    list
}

/// Counts over the whole collection, independent of any view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub percent: u8,
}

impl Stats {
    pub fn of(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.done).count();
        // Round half up: floor((200c + t) / 2t).
        let percent = if total == 0 {
            0
        } else {
            ((200 * completed + total) / (2 * total)) as u8
        };
        Self {
            total,
            active: total - completed,
            completed,
            percent,
        }
    }
}
