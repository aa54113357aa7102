//! Error types for wallcal.

use thiserror::Error;

/// Errors that abort parsing of a whole feed.
///
/// Individual broken VEVENTs never produce one of these; they are skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IcsError {
    #[error("Feed is empty")]
    Empty,

    #[error("Feed is not an iCalendar document (no VCALENDAR found)")]
    NotCalendar,

    #[error("ICS syntax error: {0}")]
    Syntax(String),
}

pub type IcsResult<T> = Result<T, IcsError>;

/// Errors raised while shaping a weather response.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    #[error("Malformed weather response: {0}")]
    Malformed(String),
}

pub type WeatherResult<T> = Result<T, WeatherError>;

/// Errors raised while loading the dashboard configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("Config file not found at {0}")]
    NotFound(String),

    #[error("Could not parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
