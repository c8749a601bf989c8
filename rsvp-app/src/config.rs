use chrono::{Datelike, Utc};
use log::info;
use std::env;

/// Static configuration for the page. No CLI surface; both values come from
/// the environment with sensible defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Collection path the RSVP documents live under.
    pub collection_path: String,
    /// Year whose January 1 local midnight the countdown targets.
    pub event_year: i32,
}

impl AppConfig {
    pub fn new(collection_path: &str, event_year: i32) -> Self {
        Self {
            collection_path: collection_path.to_string(),
            event_year,
        }
    }

    /// Reads `RSVP_COLLECTION` and `RSVP_EVENT_YEAR`, defaulting to "rsvps"
    /// and the next calendar year.
    pub fn from_env() -> Self {
        let collection_path =
            env::var("RSVP_COLLECTION").unwrap_or_else(|_| "rsvps".to_string());
        let event_year = env::var("RSVP_EVENT_YEAR")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or_else(|| Utc::now().year() + 1);

        info!(
            "Configured RSVP page: collection='{}', event year {}",
            collection_path, event_year
        );

        Self {
            collection_path,
            event_year,
        }
    }
}
