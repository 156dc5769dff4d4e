use std::sync::mpsc::Receiver;
use std::sync::Arc;

use anyhow::{Context, Result};
use taskdeck_auth::{AuthStore, User};
use taskdeck_core::{Config, LocalStorage, Notification, Notifier};
use taskdeck_services::TaskStore;
use taskdeck_weather::{WeatherClient, WeatherOptions};

/// Application root: owns the auth and task stores for one session.
pub struct App {
    config: Config,
    auth: AuthStore,
    tasks: TaskStore,
    notifier: Notifier,
    notifications: Receiver<Notification>,
}

impl App {
    /// Build the stores on top of the configured data directory.
    pub fn new(config: Config) -> Result<Self> {
        let storage = LocalStorage::open(&config.data_dir).with_context(|| {
            format!("Failed to open local storage at {}", config.data_dir.display())
        })?;
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: LocalStorage) -> Result<Self> {
        let weather = Self::weather_client(&config)?;
        let (notifier, notifications) = Notifier::channel();

        let auth =
            AuthStore::with_mock_backend(storage.clone(), notifier.clone(), config.latency);
        let tasks = TaskStore::new(storage, weather, notifier.clone(), config.latency);

        Ok(Self {
            config,
            auth,
            tasks,
            notifier,
            notifications,
        })
    }

    fn weather_client(config: &Config) -> Result<Option<Arc<WeatherClient>>> {
        let weather = &config.weather;
        let Some(api_key) = weather.resolved_api_key() else {
            tracing::warn!("No weather API key; tasks will be created without weather");
            return Ok(None);
        };

        let options = WeatherOptions {
            cache_ttl: weather.cache_ttl(),
            max_cache_entries: weather.max_cache_entries,
            request_timeout: weather.request_timeout(),
        };
        let client = WeatherClient::with_base_url(&weather.base_url, &api_key, options)
            .context("Failed to create weather client")?;
        Ok(Some(Arc::new(client)))
    }

    /// Restore any stored session. Returns the signed-in user, if any.
    pub async fn start(&self) -> Option<User> {
        tracing::info!("Starting taskdeck (data dir {})", self.config.data_dir.display());
        let user = self.auth.check_session().await.ok()?;
        self.notifier.info(format!("Welcome back, {}", user.name));
        Some(user)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    /// Notifications emitted since the last call.
    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.try_iter().collect()
    }
}
