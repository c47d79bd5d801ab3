pub mod config;
pub mod db;
pub mod due;
pub mod error;
pub mod model;
pub mod output;
pub mod storage;
pub mod store;
pub mod transfer;
pub mod validate;
pub mod view;

pub use error::{StorageError, StoreError};
pub use model::{NewTask, Priority, Task, TaskPatch};
pub use storage::{MemoryStorage, Persistence, SqliteStorage};
pub use store::{Direction, TaskStore};
pub use view::{Filter, SortMode, Stats, ViewQuery};
