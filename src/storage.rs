//! Persistence port for the task collection.
//!
//! The collection is stored as one JSON array under a single key, the way a
//! browser key-value store would hold it. Backends only move that snapshot
//! in and out; they never interpret individual tasks.

use std::cell::{Cell, RefCell};

use log::warn;
use rusqlite::Connection;

use crate::db;
use crate::error::StorageError;
use crate::model::Task;

pub const STORAGE_KEY: &str = "tm_tasks_v1";

pub trait Persistence {
    /// Load the stored collection. `None` means nothing usable was ever
    /// stored: the key is missing or its value is malformed.
    fn load(&self) -> Result<Option<Vec<Task>>, StorageError>;

    /// Replace the stored collection with `tasks`.
    fn save(&self, tasks: &[Task]) -> Result<(), StorageError>;
}

/// Decode a stored snapshot. Malformed data is logged and treated as absent.
pub fn decode_snapshot(raw: Option<&str>) -> Option<Vec<Task>> {
    match serde_json::from_str::<Vec<Task>>(raw?) {
        Ok(tasks) => Some(tasks),
        Err(e) => {
            warn!("stored tasks under '{STORAGE_KEY}' are malformed, starting empty: {e}");
            None
        }
    }
}

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = db::open(path)?;
        db::init(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self, StorageError> {
        Ok(Self {
            conn: db::open_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Persistence for SqliteStorage {
    fn load(&self) -> Result<Option<Vec<Task>>, StorageError> {
        let raw = db::get_item(&self.conn, STORAGE_KEY)?;
        Ok(decode_snapshot(raw.as_deref()))
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(tasks)?;
        db::set_item(&self.conn, STORAGE_KEY, &raw)
    }
}

/// Keeps the serialized snapshot in memory. Saves can be made to fail to
/// exercise storage error handling.
#[derive(Default)]
pub struct MemoryStorage {
    raw: RefCell<Option<String>>,
    fail_saves: Cell<bool>,
    saves: Cell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(raw: impl Into<String>) -> Self {
        let storage = Self::default();
        *storage.raw.borrow_mut() = Some(raw.into());
        storage
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.borrow().clone()
    }

    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl Persistence for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<Task>>, StorageError> {
        Ok(decode_snapshot(self.raw.borrow().as_deref()))
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        if self.fail_saves.get() {
            return Err(StorageError::Unavailable("storage is full".into()));
        }
        *self.raw.borrow_mut() = Some(serde_json::to_string(tasks)?);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

impl<P: Persistence + ?Sized> Persistence for &P {
    fn load(&self) -> Result<Option<Vec<Task>>, StorageError> {
        (**self).load()
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StorageError> {
        (**self).save(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;

    fn task(id: &str) -> Task {
        Task {
            id: id.into(),
            title: format!("task {id}"),
            description: String::new(),
            due: None,
            priority: Priority::Low,
            tags: vec![],
            done: false,
        }
    }

    #[test]
    fn missing_snapshot_loads_none() {
        assert!(MemoryStorage::new().load().unwrap().is_none());
        assert!(SqliteStorage::open_memory().unwrap().load().unwrap().is_none());
    }

    #[test]
    fn empty_snapshot_is_distinct_from_missing() {
        let storage = SqliteStorage::open_memory().unwrap();
        storage.save(&[]).unwrap();
        assert_eq!(storage.load().unwrap(), Some(vec![]));
    }

    #[test]
    fn malformed_snapshot_loads_none() {
        for raw in ["not json", "{\"id\":\"a\"}", "[1, 2]", "[{\"title\":5}]"] {
            let storage = MemoryStorage::with_raw(raw);
            assert!(storage.load().unwrap().is_none(), "raw: {raw}");
        }
    }

    #[test]
    fn sqlite_save_then_load() {
        let storage = SqliteStorage::open_memory().unwrap();
        storage.save(&[task("a"), task("b")]).unwrap();
        let loaded = storage.load().unwrap();
        assert_eq!(loaded, Some(vec![task("a"), task("b")]));
    }

    #[test]
    fn sqlite_malformed_value_loads_none() {
        let storage = SqliteStorage::open_memory().unwrap();
        db::set_item(storage.connection(), STORAGE_KEY, "{{oops").unwrap();
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn memory_failing_save_keeps_previous_snapshot() {
        let storage = MemoryStorage::new();
        storage.save(&[task("a")]).unwrap();
        storage.set_fail_saves(true);
        assert!(storage.save(&[]).is_err());
        assert_eq!(storage.load().unwrap(), Some(vec![task("a")]));
        assert_eq!(storage.save_count(), 1);
    }
}
