use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use taskdeck_services::Priority;

/// Personal task manager with weather-aware tasks.
#[derive(Debug, Parser)]
#[command(name = "taskdeck", version, about = "Personal task manager")]
pub struct Cli {
    /// Skip the simulated network latency.
    #[arg(long, global = true)]
    pub fast: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session on this device.
    Login { email: String, password: String },

    /// Create an account and sign in with it.
    Signup {
        email: String,
        password: String,
        /// Display name.
        name: String,
    },

    /// End the session on this device.
    Logout,

    /// Show the current session and task count.
    Status,

    /// List all tasks.
    List,

    /// Add a task.
    Add {
        title: String,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum, default_value_t = PriorityArg::Medium)]
        priority: PriorityArg,
        /// Due date as YYYY-MM-DD.
        #[arg(long, value_parser = parse_due_date)]
        due: Option<DateTime<Utc>>,
        /// Location to attach current weather for.
        #[arg(long)]
        location: Option<String>,
    },

    /// Flip a task between open and done.
    Toggle { id: String },

    /// Delete a task.
    Remove { id: String },
}

impl Command {
    /// Task commands need a signed-in session.
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Self::List | Self::Add { .. } | Self::Toggle { .. } | Self::Remove { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    High,
    Medium,
    Low,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
        }
    }
}

fn parse_due_date(s: &str) -> Result<DateTime<Utc>, String> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))?;
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date: {}", s))
}
