//! OpenWeatherMap current-weather client with a per-location TTL cache.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;
use url::Url;

use crate::cache::{normalize_key, WeatherCache, DEFAULT_TTL};
use crate::types::{compass_direction, round_temperature, WeatherError, WeatherSnapshot, Wind};

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";
const CURRENT_WEATHER_PATH: &str = "data/2.5/weather";

/// Tunables for `WeatherClient`.
#[derive(Debug, Clone)]
pub struct WeatherOptions {
    pub cache_ttl: Duration,
    pub max_cache_entries: Option<usize>,
    pub request_timeout: Duration,
}

impl Default for WeatherOptions {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_TTL,
            max_cache_entries: None,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    name: Option<String>,
    main: ApiMain,
    weather: Vec<ApiCondition>,
    wind: Option<ApiWind>,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl ApiResponse {
    fn into_snapshot(self, fetched_at: DateTime<Utc>) -> Result<WeatherSnapshot, WeatherError> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Parse("response has no weather conditions".into()))?;

        let last_updated = self
            .dt
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .unwrap_or(fetched_at)
            .to_rfc3339();

        Ok(WeatherSnapshot {
            location: self.name.filter(|n| !n.is_empty()),
            temp: round_temperature(self.main.temp),
            condition: condition.main,
            icon: icon_url(&condition.icon),
            humidity: self.main.humidity,
            wind: self.wind.map(|w| Wind {
                speed: w.speed,
                direction: compass_direction(w.deg.unwrap_or(0.0)).to_string(),
            }),
            last_updated: Some(last_updated),
        })
    }
}

/// Turn a provider icon code (e.g. "01d") into an absolute URL.
fn icon_url(icon: &str) -> String {
    if icon.starts_with("http://") || icon.starts_with("https://") {
        icon.to_string()
    } else {
        format!("{}/{}@2x.png", ICON_BASE_URL, icon)
    }
}

#[derive(Debug)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    cache: Mutex<WeatherCache>,
}

impl WeatherClient {
    /// Client against an OpenWeatherMap-compatible API root.
    ///
    /// # Errors
    /// `InvalidUrl` if `base_url` does not parse; `Network` if the HTTP client
    /// cannot be built.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        options: WeatherOptions,
    ) -> Result<Self, WeatherError> {
        Url::parse(base_url)
            .map_err(|e| WeatherError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = Client::builder().timeout(options.request_timeout).build()?;
        let cache =
            WeatherCache::new(options.cache_ttl).with_max_entries(options.max_cache_entries);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cache: Mutex::new(cache),
        })
    }

    /// Current weather for `location`, served from cache while fresh.
    ///
    /// # Errors
    /// `EmptyLocation` for a blank location, `LocationNotFound` when the
    /// provider does not recognize it, otherwise `Api`/`Network`/`Parse`.
    /// Failed lookups never touch the cache.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, location: &str) -> Result<WeatherSnapshot, WeatherError> {
        let key = normalize_key(location);
        if key.is_empty() {
            return Err(WeatherError::EmptyLocation);
        }

        let now = Utc::now();
        if let Some(snapshot) = self.cache.lock().get(&key, now) {
            tracing::debug!("Weather cache hit for '{}'", key);
            return Ok(snapshot.clone());
        }

        tracing::debug!("Weather cache miss for '{}'", key);
        let snapshot = self.request(location.trim(), now).await?;
        {
            let mut cache = self.cache.lock();
            let purged = cache.purge_stale(now);
            if purged > 0 {
                tracing::debug!("Dropped {} stale weather entries", purged);
            }
            cache.insert(&key, snapshot.clone(), now);
        }

        tracing::info!(
            "Fetched weather for '{}': {}°C {}",
            key,
            snapshot.temp,
            snapshot.condition
        );
        Ok(snapshot)
    }

    /// Number of locations currently cached (fresh or stale).
    pub fn cached_locations(&self) -> usize {
        self.cache.lock().len()
    }

    async fn request(
        &self,
        location: &str,
        now: DateTime<Utc>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let url = format!("{}/{}", self.base_url, CURRENT_WEATHER_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", location),
                ("units", "metric"),
                ("appid", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::warn!("Weather provider does not know location '{}'", location);
            return Err(WeatherError::LocationNotFound(location.to_string()));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let parsed: ApiResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        parsed.into_snapshot(now)
    }
}
