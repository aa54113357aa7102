//! Core logic for the wallcal kiosk dashboard.
//!
//! Everything in this crate is a pure function of its inputs:
//! - `ics` turns a raw iCalendar feed into a sorted list of [`Event`]s
//! - `grid` buckets those events into a Sunday-first month grid
//! - `labels` and `upcoming` produce the upcoming-events list and its labels
//! - `weather` shapes Open-Meteo forecasts for display
//!
//! Fetching, polling and serving live in the `wallcal` binary.

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod grid;
pub mod ics;
pub mod labels;
pub mod upcoming;
pub mod weather;

pub use error::{ConfigError, IcsError, IcsResult, WeatherError};
pub use event::Event;
pub use grid::{Cell, MonthGrid, Week, build_month_grid};
pub use ics::{IcsParser, parse_ics};
pub use labels::{RelativeDay, days_until};
pub use upcoming::{UpcomingEntry, upcoming};
