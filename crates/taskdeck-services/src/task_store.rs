//! Task store: the authoritative in-memory task list for this device.
//!
//! Every mutation that changes the list re-serializes it to local storage
//! before returning. Storage is best-effort: write failures are logged and
//! the in-memory list stays the source of truth.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use taskdeck_core::{
    simulate_latency, LatencyConfig, LocalStorage, Notifier, OpStatus, TaskError, TASKS_KEY,
};
use taskdeck_weather::{WeatherClient, WeatherSnapshot};

use crate::task::{Task, TaskDraft, TaskGroups, ToggleOutcome};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasksState {
    pub tasks: Vec<Task>,
    pub status: OpStatus,
    pub error: Option<String>,
}

pub struct TaskStore {
    state: Mutex<TasksState>,
    loaded: AtomicBool,
    storage: LocalStorage,
    weather: Option<Arc<WeatherClient>>,
    notifier: Notifier,
    latency: LatencyConfig,
}

impl TaskStore {
    /// Create a store. Without a weather client, locations are kept but no
    /// snapshot is attached.
    pub fn new(
        storage: LocalStorage,
        weather: Option<Arc<WeatherClient>>,
        notifier: Notifier,
        latency: LatencyConfig,
    ) -> Self {
        Self {
            state: Mutex::new(TasksState::default()),
            loaded: AtomicBool::new(false),
            storage,
            weather,
            notifier,
            latency,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> TasksState {
        self.state.lock().clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().tasks.clone()
    }

    pub fn status(&self) -> OpStatus {
        self.state.lock().status
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.state.lock().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn clear_error(&self) {
        self.state.lock().error = None;
    }

    /// All tasks. Loads from local storage on first use; unreadable or
    /// corrupt storage yields an empty list.
    pub async fn list_all(&self) -> Vec<Task> {
        self.begin();
        simulate_latency(self.latency.task()).await;

        let mut state = self.state.lock();
        self.ensure_loaded(&mut state);
        state.status = OpStatus::Succeeded;
        state.tasks.clone()
    }

    /// All tasks split for display: open ones by priority, completed last.
    pub async fn grouped(&self) -> TaskGroups {
        TaskGroups::from_tasks(self.list_all().await)
    }

    /// Create a task from `draft`, attaching weather when it has a location.
    ///
    /// # Errors
    /// `TaskError::Validation` if the title is empty. A failed weather lookup
    /// is not an error; the task is created without a snapshot.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task, TaskError> {
        self.begin();

        if let Err(e) = draft.validate() {
            return Err(self.fail(e, "Failed to add task"));
        }

        let weather = match draft.lookup_location() {
            Some(location) => self.lookup_weather(location).await,
            None => None,
        };

        simulate_latency(self.latency.task()).await;
        let task = draft.into_task(weather, Utc::now());

        {
            let mut state = self.state.lock();
            self.ensure_loaded(&mut state);
            state.tasks.push(task.clone());
            self.persist(&state.tasks);
            state.status = OpStatus::Succeeded;
        }

        tracing::info!("Created task {} ({})", task.id, task.title);
        self.notifier.success("Task added successfully");
        Ok(task)
    }

    /// Replace the editable fields of the task with the same id. The stored
    /// `created_at` and `weather` are kept. An unknown id is silently ignored.
    ///
    /// # Errors
    /// Currently infallible; the `Result` keeps the store's operations uniform.
    pub async fn update(&self, task: Task) -> Result<Task, TaskError> {
        self.begin();
        simulate_latency(self.latency.task()).await;

        let merged = {
            let mut state = self.state.lock();
            self.ensure_loaded(&mut state);
            let merged = state.tasks.iter_mut().find(|t| t.id == task.id).map(|slot| {
                let mut next = task.clone();
                next.created_at = slot.created_at;
                next.weather = slot.weather.take();
                *slot = next;
                slot.clone()
            });
            if merged.is_some() {
                self.persist(&state.tasks);
            }
            state.status = OpStatus::Succeeded;
            merged
        };

        match merged {
            Some(stored) => {
                tracing::info!("Updated task {}", stored.id);
                self.notifier.success("Task updated successfully");
                Ok(stored)
            }
            None => {
                tracing::debug!("Ignoring update for unknown task {}", task.id);
                Ok(task)
            }
        }
    }

    /// Remove the task with `id`. Storage is rewritten whether or not it existed.
    ///
    /// # Errors
    /// Currently infallible; the `Result` keeps the store's operations uniform.
    pub async fn remove(&self, id: &str) -> Result<String, TaskError> {
        self.begin();
        simulate_latency(self.latency.task()).await;

        {
            let mut state = self.state.lock();
            self.ensure_loaded(&mut state);
            state.tasks.retain(|t| t.id != id);
            self.persist(&state.tasks);
            state.status = OpStatus::Succeeded;
        }

        tracing::info!("Deleted task {}", id);
        self.notifier.success("Task deleted successfully");
        Ok(id.to_string())
    }

    /// Flip the completion flag of the task with `id`.
    ///
    /// The current value is read after the simulated latency, so of two racing
    /// toggles the last one applied wins.
    ///
    /// # Errors
    /// `TaskError::NotFound` if no task has that id; the list is unchanged.
    pub async fn toggle_completion(&self, id: &str) -> Result<ToggleOutcome, TaskError> {
        self.begin();
        simulate_latency(self.latency.toggle()).await;

        let outcome = {
            let mut state = self.state.lock();
            self.ensure_loaded(&mut state);
            let outcome = state.tasks.iter_mut().find(|t| t.id == id).map(|task| {
                task.completed = !task.completed;
                ToggleOutcome {
                    task_id: task.id.clone(),
                    completed: task.completed,
                }
            });
            if outcome.is_some() {
                self.persist(&state.tasks);
                state.status = OpStatus::Succeeded;
            }
            outcome
        };

        match outcome {
            Some(outcome) => {
                tracing::info!("Task {} completed = {}", id, outcome.completed);
                Ok(outcome)
            }
            None => Err(self.fail(TaskError::not_found(id), "Failed to update task")),
        }
    }

    async fn lookup_weather(&self, location: &str) -> Option<WeatherSnapshot> {
        let client = match &self.weather {
            Some(client) => client,
            None => {
                tracing::debug!("No weather client configured; skipping lookup for '{}'", location);
                return None;
            }
        };

        match client.fetch(location).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Weather lookup for '{}' failed: {}", location, e);
                self.notifier.error(e.user_message());
                None
            }
        }
    }

    fn begin(&self) {
        self.state.lock().status = OpStatus::Loading;
    }

    fn fail(&self, error: TaskError, notification: &str) -> TaskError {
        {
            let mut state = self.state.lock();
            state.status = OpStatus::Failed;
            state.error = Some(error.to_string());
        }
        tracing::warn!("Task operation failed: {}", error);
        self.notifier.error(notification);
        error
    }

    fn ensure_loaded(&self, state: &mut TasksState) {
        if !self.loaded.swap(true, Ordering::SeqCst) {
            state.tasks = self.load_from_storage();
        }
    }

    fn load_from_storage(&self) -> Vec<Task> {
        match self.storage.load_json::<Vec<Task>>(TASKS_KEY) {
            Ok(Some(tasks)) => {
                tracing::info!("Loaded {} tasks from local storage", tasks.len());
                tasks
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!("Failed to load tasks from local storage: {}", e);
                Vec::new()
            }
        }
    }

    fn persist(&self, tasks: &[Task]) {
        if let Err(e) = self.storage.save_json(TASKS_KEY, tasks) {
            tracing::error!("Failed to save tasks to local storage: {}", e);
        }
    }
}
