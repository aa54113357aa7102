use axum::{Json, Router, extract::State, routing::get};
use wallcal_core::weather::WeatherReport;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/weather", get(weather))
}

/// GET /api/weather - Current conditions and the short forecast
async fn weather(State(state): State<AppState>) -> Result<Json<WeatherReport>, AppError> {
    if state.config.weather.is_none() {
        return Err(AppError::unavailable("Weather is not configured"));
    }

    let snapshot = state.weather.snapshot().await;
    match snapshot.value {
        Some(report) => Ok(Json(report.as_ref().clone())),
        None => Err(AppError::unavailable(
            snapshot
                .last_error
                .unwrap_or_else(|| "Weather has not been fetched yet".to_string()),
        )),
    }
}
