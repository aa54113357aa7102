//! Open-Meteo client feeding the weather panel.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use url::Url;
use wallcal_core::config::WeatherConfig;
use wallcal_core::constants::OPEN_METEO_URL;
use wallcal_core::weather::{OpenMeteoForecast, Units, WeatherReport};

use crate::feed::USER_AGENT;
use crate::state::AppState;

const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Forecast request for a location; temperatures always come back in Celsius.
pub fn forecast_url(latitude: f64, longitude: f64) -> Result<Url> {
    Url::parse_with_params(
        OPEN_METEO_URL,
        &[
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            (
                "current",
                "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code".to_string(),
            ),
            (
                "daily",
                "weather_code,temperature_2m_max,temperature_2m_min".to_string(),
            ),
            ("timezone", "auto".to_string()),
        ],
    )
    .context("Failed to build forecast URL")
}

#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    url: Url,
    units: Units,
    interval: Duration,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(WeatherClient {
            http,
            url: forecast_url(config.latitude, config.longitude)?,
            units: config.units,
            interval: config.refresh_interval,
        })
    }

    pub async fn fetch(&self) -> Result<WeatherReport> {
        let response = self
            .http
            .get(self.url.clone())
            .send()
            .await
            .context("Failed to reach Open-Meteo")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Open-Meteo responded with {status}");
        }

        let forecast: OpenMeteoForecast = response
            .json()
            .await
            .context("Failed to decode Open-Meteo response")?;

        Ok(WeatherReport::from_forecast(&forecast, self.units)?)
    }
}

pub async fn refresh_weather(state: &AppState, client: &WeatherClient) {
    let generation = state.weather.begin();
    let outcome = client.fetch().await.map_err(|e| format!("{e:#}"));

    match &outcome {
        Ok(report) => info!(generation, temperature = report.current.temperature, "Weather refreshed"),
        Err(error) => warn!(generation, %error, "Weather refresh failed"),
    }

    state.weather.publish(generation, outcome).await;
}

pub async fn poll_weather(state: AppState, client: WeatherClient) {
    let mut ticker = tokio::time::interval(client.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(every = ?client.interval, "Polling weather");
    loop {
        ticker.tick().await;
        let state = state.clone();
        let client = client.clone();
        tokio::spawn(async move { refresh_weather(&state, &client).await });
    }
}
