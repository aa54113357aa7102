//! Dashboard configuration at ~/.config/wallcal/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};

use crate::constants::{
    DEFAULT_BIND, DEFAULT_CELL_EVENT_LIMIT, DEFAULT_REFRESH_INTERVAL, DEFAULT_UPCOMING_LIMIT,
};
use crate::error::{ConfigError, ConfigResult};
use crate::weather::Units;

fn default_refresh_interval() -> Duration {
    DEFAULT_REFRESH_INTERVAL
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_cell_event_limit() -> usize {
    DEFAULT_CELL_EVENT_LIMIT
}

fn default_upcoming_limit() -> usize {
    DEFAULT_UPCOMING_LIMIT
}

/// Accepts humantime strings such as "2m" or "90s".
fn humantime_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let raw = String::deserialize(deserializer)?;
    humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Public ICS feed (http, https or webcal)
    pub feed_url: String,

    /// IANA zone the dashboard displays in; the system zone when unset
    pub timezone: Option<String>,

    #[serde(
        default = "default_refresh_interval",
        deserialize_with = "humantime_duration"
    )]
    pub refresh_interval: Duration,

    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_cell_event_limit")]
    pub cell_event_limit: usize,

    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: usize,

    /// Weather panel; disabled when the section is missing
    pub weather: Option<WeatherConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub latitude: f64,
    pub longitude: f64,

    #[serde(default)]
    pub units: Units,

    #[serde(
        default = "default_refresh_interval",
        deserialize_with = "humantime_duration"
    )]
    pub refresh_interval: Duration,
}

impl DashboardConfig {
    pub fn config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".into()))?
            .join("wallcal");

        Ok(config_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        let config: DashboardConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        let scheme = self.feed_url.split("://").next().unwrap_or_default();
        if !matches!(scheme, "http" | "https" | "webcal") || !self.feed_url.contains("://") {
            return Err(ConfigError::Invalid(format!(
                "feed_url must be an http(s) or webcal URL, got '{}'",
                self.feed_url
            )));
        }

        if self.refresh_interval.is_zero() {
            return Err(ConfigError::Invalid("refresh_interval must be positive".into()));
        }

        if self.cell_event_limit == 0 || self.upcoming_limit == 0 {
            return Err(ConfigError::Invalid(
                "cell_event_limit and upcoming_limit must be at least 1".into(),
            ));
        }

        if let Some(weather) = &self.weather {
            if !(-90.0..=90.0).contains(&weather.latitude)
                || !(-180.0..=180.0).contains(&weather.longitude)
            {
                return Err(ConfigError::Invalid(format!(
                    "weather coordinates out of range: {}, {}",
                    weather.latitude, weather.longitude
                )));
            }
            if weather.refresh_interval.is_zero() {
                return Err(ConfigError::Invalid(
                    "weather.refresh_interval must be positive".into(),
                ));
            }
        }

        self.timezone()?;
        Ok(())
    }

    /// Configured display zone, `None` when the system zone should be used.
    pub fn timezone(&self) -> ConfigResult<Option<Tz>> {
        self.timezone
            .as_deref()
            .map(|name| {
                name.parse::<Tz>()
                    .map_err(|_| ConfigError::Invalid(format!("Unknown timezone '{name}'")))
            })
            .transpose()
    }

    /// Create a starter config file with the optional settings commented out.
    pub fn create_default_config(path: &Path) -> ConfigResult<()> {
        let contents = format!(
            "\
# wallcal configuration

# Public iCalendar feed shown on the dashboard:
feed_url = \"https://calendar.google.com/calendar/ical/you%40example.com/public/basic.ics\"

# Display timezone (defaults to the system timezone):
# timezone = \"America/Chicago\"

# How often the feed is re-fetched:
# refresh_interval = \"2m\"

# Address the dashboard API listens on:
# bind = \"{DEFAULT_BIND}\"

# Events per day cell before \"+N more\", and rows in the upcoming list:
# cell_event_limit = {DEFAULT_CELL_EVENT_LIMIT}
# upcoming_limit = {DEFAULT_UPCOMING_LIMIT}

# Weather panel (Open-Meteo, no API key needed):
# [weather]
# latitude = 32.8140
# longitude = -96.9489
# units = \"fahrenheit\"
# refresh_interval = \"2m\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;

        Ok(())
    }
}
