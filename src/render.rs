//! Plain-text rendering of tasks for the terminal.

use std::fmt::Write;

use taskdeck_core::{Notification, NotificationLevel};
use taskdeck_services::{Task, TaskGroups};

/// One line per task: `[x] <id> <title> (<priority>) ...`.
pub fn task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    let mut line = format!("[{}] {} {} ({})", mark, task.id, task.title, task.priority);
    if let Some(due) = task.due_date {
        let _ = write!(line, " due {}", due.format("%Y-%m-%d"));
    }
    if let Some(location) = &task.location {
        let _ = write!(line, " @ {}", location);
    }
    if let Some(weather) = &task.weather {
        let _ = write!(line, " {}°C {}", weather.temp, weather.condition);
    }
    line
}

/// Open tasks by priority under "Tasks (n)", then "Completed (m)".
pub fn task_list(groups: &TaskGroups) -> String {
    if groups.is_empty() {
        return "No tasks yet\n".to_string();
    }

    let mut out = format!("Tasks ({})\n", groups.pending.len());
    for task in &groups.pending {
        out.push_str(&task_line(task));
        out.push('\n');
    }
    if !groups.completed.is_empty() {
        let _ = writeln!(out, "\nCompleted ({})", groups.completed.len());
        for task in &groups.completed {
            out.push_str(&task_line(task));
            out.push('\n');
        }
    }
    out
}

/// `! message` for errors, `* message` otherwise.
pub fn notification_line(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Error => '!',
        NotificationLevel::Success | NotificationLevel::Info => '*',
    };
    format!("{} {}", marker, notification.message)
}
