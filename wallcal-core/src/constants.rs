use std::time::Duration;

/// Events shown per month-grid cell before the "+N more" line.
pub const DEFAULT_CELL_EVENT_LIMIT: usize = 4;

/// Rows in the upcoming-events list.
pub const DEFAULT_UPCOMING_LIMIT: usize = 10;

/// Days shown in the weather forecast strip.
pub const FORECAST_DAYS: usize = 5;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2 * 60);

pub const DEFAULT_BIND: &str = "127.0.0.1:4096";

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";
