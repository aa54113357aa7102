//! Weather panel data: WMO condition codes, unit conversion and shaping of
//! Open-Meteo forecast responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::FORECAST_DAYS;
use crate::error::{WeatherError, WeatherResult};

/// Temperature unit shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Celsius,
    #[default]
    Fahrenheit,
}

impl Units {
    /// Convert a Celsius reading and round it for display.
    pub fn display(self, celsius: f64) -> i32 {
        match self {
            Units::Celsius => celsius.round() as i32,
            Units::Fahrenheit => celsius_to_fahrenheit(celsius),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Units::Celsius => "°C",
            Units::Fahrenheit => "°F",
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> i32 {
    (celsius * 9.0 / 5.0 + 32.0).round() as i32
}

/// Weather condition grouped from a WMO interpretation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl Condition {
    pub fn from_wmo_code(code: u8) -> Self {
        match code {
            0 => Condition::Clear,
            1..=3 => Condition::PartlyCloudy,
            45 | 48 => Condition::Fog,
            51..=57 => Condition::Drizzle,
            61..=67 | 80..=82 => Condition::Rain,
            71..=77 | 85 | 86 => Condition::Snow,
            95..=99 => Condition::Thunderstorm,
            _ => Condition::Unknown,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Condition::Clear => "☀️",
            Condition::PartlyCloudy => "⛅",
            Condition::Fog => "🌫️",
            Condition::Drizzle => "🌦️",
            Condition::Rain => "🌧️",
            Condition::Snow => "❄️",
            Condition::Thunderstorm => "⛈️",
            Condition::Unknown => "🌡️",
        }
    }
}

/// Subset of the Open-Meteo `/v1/forecast` JSON response we request.
///
/// Temperatures are always requested in Celsius; conversion happens in
/// [`WeatherReport::from_forecast`].
#[derive(Debug, Clone, Deserialize)]
pub struct OpenMeteoForecast {
    pub current: OpenMeteoCurrent,
    pub daily: OpenMeteoDaily,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenMeteoCurrent {
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub apparent_temperature: f64,
    pub weather_code: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenMeteoDaily {
    pub time: Vec<NaiveDate>,
    pub weather_code: Vec<u8>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: i32,
    pub feels_like: i32,
    /// Relative humidity in percent
    pub humidity: u8,
    pub condition: Condition,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    /// "Mon"
    pub weekday: String,
    pub condition: Condition,
    pub icon: &'static str,
    pub high: i32,
    pub low: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub units: Units,
    pub unit_symbol: &'static str,
    pub current: CurrentConditions,
    pub forecast: Vec<ForecastDay>,
}

impl WeatherReport {
    /// Shape a raw forecast into current conditions plus the first
    /// [`FORECAST_DAYS`] days.
    pub fn from_forecast(forecast: &OpenMeteoForecast, units: Units) -> WeatherResult<Self> {
        let current = &forecast.current;
        let condition = Condition::from_wmo_code(current.weather_code);

        let current = CurrentConditions {
            temperature: units.display(current.temperature_2m),
            feels_like: units.display(current.apparent_temperature),
            humidity: current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
            condition,
            icon: condition.icon(),
        };

        let daily = &forecast.daily;
        let days = daily.time.len();
        if daily.weather_code.len() != days
            || daily.temperature_2m_max.len() != days
            || daily.temperature_2m_min.len() != days
        {
            return Err(WeatherError::Malformed(format!(
                "daily arrays differ in length (time: {}, weather_code: {}, max: {}, min: {})",
                days,
                daily.weather_code.len(),
                daily.temperature_2m_max.len(),
                daily.temperature_2m_min.len()
            )));
        }

        let forecast = (0..days.min(FORECAST_DAYS))
            .map(|i| {
                let condition = Condition::from_wmo_code(daily.weather_code[i]);
                ForecastDay {
                    date: daily.time[i],
                    weekday: daily.time[i].format("%a").to_string(),
                    condition,
                    icon: condition.icon(),
                    high: units.display(daily.temperature_2m_max[i]),
                    low: units.display(daily.temperature_2m_min[i]),
                }
            })
            .collect();

        Ok(WeatherReport {
            units,
            unit_symbol: units.symbol(),
            current,
            forecast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "latitude": 32.81,
        "longitude": -96.95,
        "timezone": "America/Chicago",
        "utc_offset_seconds": -18000,
        "current": {
            "time": "2024-06-15T12:00",
            "interval": 900,
            "temperature_2m": 31.4,
            "relative_humidity_2m": 54,
            "apparent_temperature": 34.9,
            "weather_code": 2
        },
        "daily": {
            "time": ["2024-06-15", "2024-06-16", "2024-06-17", "2024-06-18", "2024-06-19", "2024-06-20", "2024-06-21"],
            "weather_code": [2, 61, 95, 0, 3, 45, 71],
            "temperature_2m_max": [33.0, 29.5, 27.1, 35.0, 34.2, 30.0, 31.0],
            "temperature_2m_min": [24.0, 22.3, 21.0, 25.5, 26.0, 23.0, 22.0]
        }
    }"#;

    #[test]
    fn test_celsius_to_fahrenheit_rounds() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32);
        assert_eq!(celsius_to_fahrenheit(100.0), 212);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40);
        assert_eq!(celsius_to_fahrenheit(31.4), 89);
    }

    #[test]
    fn test_wmo_code_groups() {
        assert_eq!(Condition::from_wmo_code(0), Condition::Clear);
        assert_eq!(Condition::from_wmo_code(3), Condition::PartlyCloudy);
        assert_eq!(Condition::from_wmo_code(48), Condition::Fog);
        assert_eq!(Condition::from_wmo_code(56), Condition::Drizzle);
        assert_eq!(Condition::from_wmo_code(81), Condition::Rain);
        assert_eq!(Condition::from_wmo_code(86), Condition::Snow);
        assert_eq!(Condition::from_wmo_code(99), Condition::Thunderstorm);
        assert_eq!(Condition::from_wmo_code(4), Condition::Unknown);
        assert_eq!(Condition::Unknown.icon(), "🌡️");
    }

    #[test]
    fn test_report_from_open_meteo_response() {
        let forecast: OpenMeteoForecast = serde_json::from_str(RESPONSE).expect("Should deserialize");
        let report = WeatherReport::from_forecast(&forecast, Units::Fahrenheit).expect("Should shape");

        assert_eq!(report.current.temperature, 89);
        assert_eq!(report.current.feels_like, 95);
        assert_eq!(report.current.humidity, 54);
        assert_eq!(report.current.condition, Condition::PartlyCloudy);

        assert_eq!(report.forecast.len(), FORECAST_DAYS);
        assert_eq!(report.forecast[0].weekday, "Sat");
        assert_eq!(report.forecast[1].condition, Condition::Rain);
        assert_eq!(report.forecast[2].condition, Condition::Thunderstorm);
        assert_eq!(report.forecast[3].high, 95);
        assert_eq!(report.forecast[3].low, 78);
    }

    #[test]
    fn test_report_in_celsius() {
        let forecast: OpenMeteoForecast = serde_json::from_str(RESPONSE).expect("Should deserialize");
        let report = WeatherReport::from_forecast(&forecast, Units::Celsius).expect("Should shape");

        assert_eq!(report.current.temperature, 31);
        assert_eq!(report.unit_symbol, "°C");
        assert_eq!(report.forecast[1].high, 30);
    }

    #[test]
    fn test_mismatched_daily_arrays_are_rejected() {
        let mut forecast: OpenMeteoForecast =
            serde_json::from_str(RESPONSE).expect("Should deserialize");
        forecast.daily.temperature_2m_min.pop();

        let result = WeatherReport::from_forecast(&forecast, Units::Fahrenheit);
        assert!(matches!(result, Err(WeatherError::Malformed(_))));
    }
}
