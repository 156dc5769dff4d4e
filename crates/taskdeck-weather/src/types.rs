use serde::{Deserialize, Serialize};

/// Wind at observation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    /// Meters per second
    pub speed: f64,
    /// 16-point compass direction the wind blows from, e.g. "NNE"
    pub direction: String,
}

/// Point-in-time weather for a location, frozen into a task at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Place name as resolved by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Whole degrees Celsius
    pub temp: i32,
    pub condition: String,
    /// Absolute icon URL
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind: Option<Wind>,
    /// RFC 3339 observation time reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Convert a meteorological bearing in degrees to a 16-point compass label.
pub fn compass_direction(degrees: f64) -> &'static str {
    if !degrees.is_finite() {
        return "N";
    }
    let normalized = degrees.rem_euclid(360.0);
    let index = (normalized / 22.5).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Round to the nearest whole degree; halves round up.
pub fn round_temperature(celsius: f64) -> i32 {
    (celsius + 0.5).floor() as i32
}

/// Weather lookup errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Location is empty")]
    EmptyLocation,
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl WeatherError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::LocationNotFound(_))
    }

    /// Message for the transient notification shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::LocationNotFound(location) => {
                format!("Weather not available: location '{}' not found", location)
            }
            Self::EmptyLocation => "No location given for weather lookup".to_string(),
            _ => "Failed to fetch weather data".to_string(),
        }
    }
}
