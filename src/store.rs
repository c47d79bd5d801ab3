//! The task collection and its mutating operations.
//!
//! A [`TaskStore`] owns the ordered task list and writes the whole list
//! through its [`Persistence`] backend after every mutation. Validation and
//! lookup failures leave the list untouched. A failed save does not undo the
//! mutation: the in-memory list stays authoritative for the session and the
//! failure is kept in [`TaskStore::last_storage_error`].

use std::collections::HashSet;

use log::{debug, warn};
use serde_json::Value;

use crate::error::{Result, StorageError, StoreError};
use crate::model::{clean_tags, new_id, NewTask, Priority, Task, TaskPatch};
use crate::storage::Persistence;
use crate::transfer;
use crate::validate::{validate_due, validate_title};
use crate::view::{self, Stats, ViewQuery};

/// One-step move within the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    fn offset(self) -> isize {
        match self {
            Self::Up => -1,
            Self::Down => 1,
        }
    }
}

pub struct TaskStore<P> {
    tasks: Vec<Task>,
    storage: P,
    /// Whether the backend held no snapshot when loaded.
    fresh: bool,
    last_storage_error: Option<StorageError>,
}

impl<P: Persistence> TaskStore<P> {
    /// Load the collection from `storage`. Duplicate or empty ids found in
    /// stored data are replaced with fresh ones and the repair is saved.
    pub fn load(storage: P) -> Result<Self> {
        let snapshot = storage.load()?;
        let fresh = snapshot.is_none();
        let mut tasks = snapshot.unwrap_or_default();
        let mut seen = HashSet::new();
        let mut repaired = false;
        for task in &mut tasks {
            if task.id.is_empty() || !seen.insert(task.id.clone()) {
                let id = new_id();
                warn!("stored task '{}' has a duplicate id, reassigned to {id}", task.title);
                task.id = id.clone();
                seen.insert(id);
                repaired = true;
            }
        }
        debug!("loaded {} tasks", tasks.len());
        let mut store = Self {
            tasks,
            storage,
            fresh,
            last_storage_error: None,
        };
        if repaired {
            store.persist();
        }
        Ok(store)
    }

    /// Seed two example tasks into a store whose backend had never saved a
    /// collection. A collection emptied by the user stays empty. Returns
    /// whether anything was added.
    pub fn seed_if_new(&mut self) -> bool {
        if !self.fresh || !self.tasks.is_empty() {
            return false;
        }
        self.fresh = false;
        self.tasks = demo_tasks();
        debug!("seeded {} demo tasks", self.tasks.len());
        self.persist();
        true
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn storage(&self) -> &P {
        &self.storage
    }

    /// The error from the most recent save, cleared by the next successful
    /// save.
    pub fn last_storage_error(&self) -> Option<&StorageError> {
        self.last_storage_error.as_ref()
    }

    pub fn stats(&self) -> Stats {
        Stats::of(&self.tasks)
    }

    pub fn view(&self, query: &ViewQuery) -> Vec<&Task> {
        view::project(&self.tasks, query)
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn persist(&mut self) {
        match self.storage.save(&self.tasks) {
            Ok(()) => self.last_storage_error = None,
            Err(e) => {
                warn!("failed to save {} tasks: {e}", self.tasks.len());
                self.last_storage_error = Some(e);
            }
        }
    }

    pub fn add(&mut self, input: NewTask) -> Result<&Task> {
        let title = validate_title(&input.title)?;
        let due = validate_due(input.due.as_deref())?;
        let task = Task {
            id: self.fresh_id(),
            title,
            description: input.description.unwrap_or_default().trim().to_string(),
            due,
            priority: input.priority.unwrap_or_default(),
            tags: input.tags.map(clean_tags).unwrap_or_default(),
            done: false,
        };
        debug!("add task {} '{}'", task.id, task.title);
        self.tasks.push(task);
        self.persist();
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<&Task> {
        let idx = self.index_of(id)?;
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let due = match patch.due {
            Some(due) => Some(validate_due(due.as_deref())?),
            None => None,
        };

        let task = &mut self.tasks[idx];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description.trim().to_string();
        }
        if let Some(due) = due {
            task.due = due;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(tags) = patch.tags {
            task.tags = clean_tags(tags);
        }
        debug!("update task {id}");
        self.persist();
        Ok(&self.tasks[idx])
    }

    /// Flip the completion flag and return its new value.
    pub fn toggle_done(&mut self, id: &str) -> Result<bool> {
        let idx = self.index_of(id)?;
        let task = &mut self.tasks[idx];
        task.done = !task.done;
        let done = task.done;
        debug!("toggle task {id} done={done}");
        self.persist();
        Ok(done)
    }

    pub fn remove(&mut self, id: &str) -> Result<Task> {
        let idx = self.index_of(id)?;
        let removed = self.tasks.remove(idx);
        debug!("remove task {id}");
        self.persist();
        Ok(removed)
    }

    /// Move a task one step. Unknown ids and moves past either end are
    /// no-ops; returns whether the task moved.
    pub fn reorder(&mut self, id: &str, direction: Direction) -> bool {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            return false;
        };
        let last = self.tasks.len() as isize - 1;
        let target = (idx as isize + direction.offset()).clamp(0, last) as usize;
        if target == idx {
            return false;
        }
        let task = self.tasks.remove(idx);
        self.tasks.insert(target, task);
        debug!("move task {id} from {idx} to {target}");
        self.persist();
        true
    }

    /// Replace the collection order. `ids` must name every task exactly
    /// once.
    pub fn reorder_to<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<()> {
        if ids.len() != self.tasks.len() {
            return Err(StoreError::Validation(format!(
                "new order has {} ids but the collection has {} tasks",
                ids.len(),
                self.tasks.len()
            )));
        }
        let mut remaining: Vec<Option<Task>> = Vec::new();
        let mut order = Vec::with_capacity(ids.len());
        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            if !seen.insert(id) {
                return Err(StoreError::Validation(format!(
                    "task '{id}' appears more than once in the new order"
                )));
            }
            let idx = self
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| StoreError::Validation(format!("unknown task '{id}' in new order")))?;
            order.push(idx);
        }

        remaining.extend(self.tasks.drain(..).map(Some));
        self.tasks = order
            .into_iter()
            .filter_map(|idx| remaining[idx].take())
            .collect();
        debug!("reordered {} tasks", self.tasks.len());
        self.persist();
        Ok(())
    }

    /// Remove all completed tasks and return how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.done);
        let removed = before - self.tasks.len();
        debug!("cleared {removed} completed tasks");
        self.persist();
        removed
    }

    pub fn clear_all(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        debug!("cleared all {removed} tasks");
        self.persist();
        removed
    }

    /// Validate `raw`, normalize each item and append them. Returns the
    /// number of tasks imported.
    pub fn bulk_import(&mut self, raw: &Value) -> Result<usize> {
        let taken: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        let imported = transfer::normalize_import(raw, &taken)?;
        let count = imported.len();
        self.tasks.extend(imported);
        debug!("imported {count} tasks");
        self.persist();
        Ok(count)
    }

    pub fn import_json(&mut self, text: &str) -> Result<usize> {
        let raw = transfer::parse_import(text)?;
        self.bulk_import(&raw)
    }

    pub fn export_snapshot(&self) -> Result<String> {
        transfer::export_snapshot(&self.tasks)
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = new_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

fn demo_tasks() -> Vec<Task> {
    vec![
        Task {
            id: new_id(),
            title: "Finish project README".into(),
            description: "Write features & usage".into(),
            due: None,
            priority: Priority::Medium,
            tags: vec!["internship".into()],
            done: false,
        },
        Task {
            id: new_id(),
            title: "Create demo video".into(),
            description: "1–2 minute overview".into(),
            due: None,
            priority: Priority::High,
            tags: vec!["demo".into()],
            done: false,
        },
    ]
}
