use axum::{Json, Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::{AppState, Snapshot};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
}

async fn health() -> &'static str {
    "ok"
}

/// Refresh bookkeeping for one data source
#[derive(Serialize)]
pub struct SourceStatus {
    pub generation: u64,
    pub updated_at: Option<DateTime<Utc>>,
    pub attempted_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl<T> From<Snapshot<T>> for SourceStatus {
    fn from(snapshot: Snapshot<T>) -> Self {
        SourceStatus {
            generation: snapshot.generation,
            updated_at: snapshot.updated_at,
            attempted_at: snapshot.attempted_at,
            error: snapshot.last_error,
        }
    }
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub timezone: String,
    pub now: String,
    pub event_count: usize,
    pub calendar: SourceStatus,
    /// Missing when weather is not configured
    pub weather: Option<SourceStatus>,
}

/// GET /api/status - Display zone and refresh state of each source
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let calendar = state.calendar.snapshot().await;
    let event_count = calendar.value.as_ref().map_or(0, |feed| feed.events.len());

    let weather = match state.config.weather {
        Some(_) => Some(state.weather.snapshot().await.into()),
        None => None,
    };

    Json(StatusResponse {
        timezone: state.tz.name().to_string(),
        now: state.now().to_rfc3339(),
        event_count,
        calendar: calendar.into(),
        weather,
    })
}
