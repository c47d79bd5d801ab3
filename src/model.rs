use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Task priority. Snapshot values outside low/medium/high read as `Unset`,
/// which ranks below `Low` and is written back as `""`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Unset,
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(StoreError::Validation(format!(
                "invalid priority '{s}': must be low, medium, or high"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Sort rank used by the priority sort modes.
    pub fn rank(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Unset => 0,
        }
    }

    /// Capitalized label for list output.
    pub fn label(self) -> &'static str {
        match self {
            Self::Unset => "Unset",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or(Self::Unset)
    }
}

impl From<Priority> for String {
    fn from(p: Priority) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single to-do item. Field order here is the field order of the JSON
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "due_field")]
    pub due: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub done: bool,
}

impl Task {
    /// Returns display icon: x=done, .=open
    pub fn icon(&self) -> &'static str {
        if self.done {
            "x"
        } else {
            "."
        }
    }

    /// Due date as the string used for sorting; absent compares as "".
    pub fn due_key(&self) -> &str {
        self.due.as_deref().unwrap_or("")
    }
}

/// Absent due dates are written as `""` and an empty string reads back as
/// absent, keeping snapshots compatible with exports that never omit the
/// field.
mod due_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(due: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(due.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|s| !s.is_empty()))
    }
}

/// Input for [`crate::store::TaskStore::add`].
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for [`crate::store::TaskStore::update`]. `None` leaves a
/// field untouched; `due: Some(None)` clears the due date.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
}

impl TaskPatch {
    /// Sets tags from comma-separated text.
    pub fn tags_text(mut self, text: &str) -> Self {
        self.tags = Some(parse_tags(text));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due.is_none()
            && self.priority.is_none()
            && self.tags.is_none()
    }
}

/// Split comma-separated tag text, trimming entries and dropping empties.
pub fn parse_tags(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Trim each tag and drop the ones left empty.
pub fn clean_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
