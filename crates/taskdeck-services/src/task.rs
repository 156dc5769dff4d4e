//! Task types shared by the task store and local storage.
//!
//! Stored as a camelCase JSON array under the `tasks` key.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_core::TaskError;
use taskdeck_weather::WeatherSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort position in task listings; high comes first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Captured once at creation; never refreshed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<WeatherSnapshot>,
}

/// Everything needed to create a task; id and timestamp are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Caller-side guard run before handing the draft to the store.
    ///
    /// # Errors
    /// `TaskError::Validation` if the title is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.title.trim().is_empty() {
            return Err(TaskError::validation("Title cannot be empty"));
        }
        Ok(())
    }

    /// Location worth looking up weather for, if any.
    pub fn lookup_location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Build the task with a fresh id.
    pub fn into_task(self, weather: Option<WeatherSnapshot>, created_at: DateTime<Utc>) -> Task {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: self.title,
            description: non_empty(self.description),
            priority: self.priority,
            completed: self.completed,
            created_at,
            due_date: self.due_date,
            location: non_empty(self.location),
            weather,
        }
    }
}

/// Result of flipping a task's completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub task_id: String,
    pub completed: bool,
}

/// Tasks as a list view shows them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskGroups {
    /// Open tasks, high priority first; insertion order within a priority.
    pub pending: Vec<Task>,
    /// Completed tasks in insertion order.
    pub completed: Vec<Task>,
}

impl TaskGroups {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let (mut pending, completed): (Vec<Task>, Vec<Task>) =
            tasks.into_iter().partition(|t| !t.completed);
        pending.sort_by_key(|t| t.priority.rank());
        Self { pending, completed }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty()
    }
}
