//! JSON export and import of the task collection.
//!
//! An import payload must be an array of objects; anything else is rejected
//! before a single task is appended. Within an item, missing or falsy fields
//! take their defaults and scalar values are coerced to the field's type.

use std::collections::HashSet;

use log::warn;
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};
use crate::model::{clean_tags, new_id, parse_tags, Priority, Task};

pub const UNTITLED: &str = "Untitled";
pub const EXPORT_FILENAME: &str = "tasks-export.json";

/// Serialize the collection as a pretty-printed JSON array.
pub fn export_snapshot(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(tasks).map_err(|e| StoreError::Storage(e.into()))
}

/// Parse import text into a JSON value, mapping syntax errors to
/// [`StoreError::Format`].
pub fn parse_import(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|e| StoreError::Format(format!("not valid JSON: {e}")))
}

/// Validate and normalize an import payload.
///
/// Ids already present in `taken`, or repeated within the payload, are
/// replaced with fresh ones so the collection keeps unique ids.
pub fn normalize_import(raw: &Value, taken: &HashSet<&str>) -> Result<Vec<Task>> {
    let Value::Array(items) = raw else {
        return Err(StoreError::Format(format!(
            "expected an array of tasks, got {}",
            kind(raw)
        )));
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut tasks = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Value::Object(fields) = item else {
            return Err(StoreError::Format(format!(
                "item {index}: expected an object, got {}",
                kind(item)
            )));
        };
        let mut task = normalize_item(index, fields);
        if task.id.is_empty() || taken.contains(task.id.as_str()) || seen.contains(&task.id) {
            task.id = new_id();
        }
        seen.insert(task.id.clone());
        tasks.push(task);
    }
    Ok(tasks)
}

fn normalize_item(index: usize, fields: &Map<String, Value>) -> Task {
    let field = |name: &str| {
        let value = fields.get(name).unwrap_or(&Value::Null);
        if matches!(value, Value::Array(_) | Value::Object(_)) && !matches!(name, "tags" | "done") {
            warn!("import item {index}: ignoring {} in field '{name}'", kind(value));
        }
        value
    };

    let id = match field("id") {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    };

    let title = match scalar_text(field("title")) {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => UNTITLED.to_string(),
    };

    let description = scalar_text(field("description")).unwrap_or_default();
    let due = scalar_text(field("due"));

    let priority = match scalar_text(field("priority")) {
        Some(p) => Priority::from(p),
        None => Priority::default(),
    };

    let tags = match field("tags") {
        Value::Array(values) => clean_tags(values.iter().filter_map(scalar_text)),
        other => scalar_text(other).map(|s| parse_tags(&s)).unwrap_or_default(),
    };

    Task {
        id,
        title,
        description,
        due,
        priority,
        tags,
        done: truthy(field("done")),
    }
}

/// Text of a truthy string, number or boolean. Falsy values and
/// arrays or objects give `None`.
fn scalar_text(value: &Value) -> Option<String> {
    if !truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// JSON truthiness: null, false, zero and "" are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(raw: Value) -> Result<Vec<Task>> {
        normalize_import(&raw, &HashSet::new())
    }

    #[test]
    fn rejects_non_array() {
        for raw in [json!({"title": "x"}), json!("tasks"), json!(3), json!(null)] {
            assert!(matches!(normalize(raw), Err(StoreError::Format(_))));
        }
    }

    #[test]
    fn rejects_non_object_items() {
        let err = normalize(json!([{"title": "ok"}, 7])).unwrap_err();
        match err {
            StoreError::Format(msg) => assert!(msg.contains("item 1"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fills_defaults() {
        let tasks = normalize(json!([{}])).unwrap();
        assert_eq!(tasks.len(), 1);
        let t = &tasks[0];
        assert!(!t.id.is_empty());
        assert_eq!(t.title, UNTITLED);
        assert_eq!(t.description, "");
        assert_eq!(t.due, None);
        assert_eq!(t.priority, Priority::Low);
        assert!(t.tags.is_empty());
        assert!(!t.done);
    }

    #[test]
    fn keeps_supplied_fields() {
        let tasks = normalize(json!([{
            "id": "abc",
            "title": "Ship it",
            "description": "today",
            "due": "2025-06-01",
            "priority": "high",
            "tags": ["work", " urgent "],
            "done": true
        }]))
        .unwrap();
        let t = &tasks[0];
        assert_eq!(t.id, "abc");
        assert_eq!(t.title, "Ship it");
        assert_eq!(t.description, "today");
        assert_eq!(t.due.as_deref(), Some("2025-06-01"));
        assert_eq!(t.priority, Priority::High);
        assert_eq!(t.tags, vec!["work", "urgent"]);
        assert!(t.done);
    }

    #[test]
    fn splits_scalar_tags() {
        let tasks = normalize(json!([{"title": "t", "tags": "a, b,,c"}])).unwrap();
        assert_eq!(tasks[0].tags, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_title_becomes_untitled() {
        let tasks = normalize(json!([{"title": "   "}])).unwrap();
        assert_eq!(tasks[0].title, UNTITLED);
    }

    #[test]
    fn numeric_id_is_kept_as_text() {
        let tasks = normalize(json!([{"id": 42, "title": "t"}])).unwrap();
        assert_eq!(tasks[0].id, "42");
    }

    #[test]
    fn unknown_priority_is_kept_as_unset() {
        let tasks = normalize(json!([
            {"title": "a", "priority": "urgent"},
            {"title": "b", "priority": ""},
            {"title": "c", "priority": 3}
        ]))
        .unwrap();
        assert_eq!(tasks[0].priority, Priority::Unset);
        assert_eq!(tasks[1].priority, Priority::Low);
        assert_eq!(tasks[2].priority, Priority::Unset);
    }

    #[test]
    fn done_follows_truthiness() {
        let raw = json!([
            {"done": 1}, {"done": "yes"}, {"done": {}},
            {"done": 0}, {"done": ""}, {"done": null}, {"done": false}
        ]);
        let done: Vec<bool> = normalize(raw).unwrap().iter().map(|t| t.done).collect();
        assert_eq!(done, vec![true, true, true, false, false, false, false]);
    }

    #[test]
    fn oddly_typed_fields_fall_back_or_coerce() {
        let tasks = normalize(json!([{
            "id": ["x"],
            "title": 5,
            "description": {"a": 1},
            "due": false,
            "tags": [1, "a", null, {}]
        }, {
            "tags": 7
        }]))
        .unwrap();
        assert_eq!(tasks[0].id.len(), 36);
        assert_eq!(tasks[0].title, "5");
        assert_eq!(tasks[0].description, "");
        assert_eq!(tasks[0].due, None);
        assert_eq!(tasks[0].tags, vec!["1", "a"]);
        assert_eq!(tasks[1].tags, vec!["7"]);
    }

    #[test]
    fn colliding_ids_are_regenerated() {
        let taken: HashSet<&str> = ["a"].into_iter().collect();
        let raw = json!([{"id": "a"}, {"id": "b"}, {"id": "b"}]);
        let tasks = normalize_import(&raw, &taken).unwrap();
        assert_ne!(tasks[0].id, "a");
        assert_eq!(tasks[1].id, "b");
        assert_ne!(tasks[2].id, "b");
        let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn parse_import_rejects_bad_json() {
        assert!(matches!(parse_import("[{"), Err(StoreError::Format(_))));
        assert!(parse_import("[]").is_ok());
    }

    #[test]
    fn export_is_pretty_array() {
        let tasks = normalize(json!([{"id": "x", "title": "t"}])).unwrap();
        let out = export_snapshot(&tasks).unwrap();
        assert!(out.starts_with("[\n"));
        let id_pos = out.find("\"id\"").unwrap();
        let done_pos = out.find("\"done\"").unwrap();
        assert!(id_pos < done_pos);
    }
}
