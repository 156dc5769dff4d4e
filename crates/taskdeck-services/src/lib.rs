pub mod task;
pub mod task_store;

pub use task::{Priority, Task, TaskDraft, TaskGroups, ToggleOutcome};
pub use task_store::{TaskStore, TasksState};
