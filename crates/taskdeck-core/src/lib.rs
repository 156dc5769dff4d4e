pub mod config;
pub mod error;
pub mod notify;
pub mod status;
pub mod storage;

pub use config::{simulate_latency, Config, LatencyConfig, ValidationResult, WeatherConfig};
pub use error::{AppError, AuthError, ConfigError, StorageError, TaskError};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use status::OpStatus;
pub use storage::{LocalStorage, AUTH_TOKEN_KEY, TASKS_KEY};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Taskdeck core initialized");
    Ok(())
}
