//! Weather lookups for Taskdeck
//!
//! Resolves a free-text location to a current-conditions snapshot via the
//! OpenWeatherMap API, memoized per normalized location for a fixed TTL.

pub mod cache;
pub mod client;
pub mod types;

pub use cache::{normalize_key, WeatherCache, DEFAULT_TTL};
pub use client::{WeatherClient, WeatherOptions};
pub use types::*;
