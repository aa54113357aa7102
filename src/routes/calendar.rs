//! Month grid, upcoming list and raw feed endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use wallcal_core::grid::WEEKDAY_LABELS;
use wallcal_core::labels::clock_label;
use wallcal_core::{Cell, Event, UpcomingEntry, build_month_grid};

use crate::routes::AppError;
use crate::state::AppState;

/// Years the month view accepts.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/month", get(month))
        .route("/api/upcoming", get(upcoming))
        .route("/ics", get(raw_feed))
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Serialize)]
pub struct MonthView {
    /// "June 2024"
    pub title: String,
    pub year: i32,
    pub month: u32,
    pub weekdays: [&'static str; 7],
    pub weeks: Vec<Vec<DayView>>,
    /// Set when the feed could not be refreshed; events may be stale or missing
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub day: u32,
    pub in_month: bool,
    pub is_today: bool,
    pub is_weekend: bool,
    /// At most `cell_event_limit` events
    pub events: Vec<CellEvent>,
    /// Count behind the "+N more" line
    pub more: usize,
}

#[derive(Serialize)]
pub struct CellEvent {
    pub key: String,
    /// "10:00 AM", or "All day"
    pub time: String,
    pub title: String,
}

impl CellEvent {
    fn new(event: &Event) -> Self {
        CellEvent {
            key: event.list_key(),
            time: if event.all_day {
                "All day".to_string()
            } else {
                clock_label(&event.start)
            },
            title: event.title.clone(),
        }
    }
}

impl DayView {
    fn new(cell: &Cell, limit: usize) -> Self {
        DayView {
            date: cell.date,
            day: cell.date.day(),
            in_month: cell.in_month,
            is_today: cell.is_today,
            is_weekend: cell.is_weekend(),
            events: cell.visible(limit).iter().map(|e| CellEvent::new(e)).collect(),
            more: cell.overflow(limit),
        }
    }
}

/// GET /api/month - Month grid, the current month unless year/month are given
async fn month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthView>, AppError> {
    let today = state.now().date_naive();

    let anchor = match (query.year, query.month) {
        (None, None) => today,
        (year, month) => {
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            NaiveDate::from_ymd_opt(year, month, 1)
                .filter(|_| YEARS.contains(&year))
                .ok_or_else(|| AppError::bad_request(format!("Invalid month {year}-{month}")))?
        }
    };

    let snapshot = state.calendar.snapshot().await;
    let events: &[Event] = snapshot
        .value
        .as_deref()
        .map(|feed| feed.events.as_slice())
        .unwrap_or_default();

    let grid = build_month_grid(events, anchor, today);
    let limit = state.config.cell_event_limit;

    Ok(Json(MonthView {
        title: grid.title(),
        year: grid.year,
        month: grid.month,
        weekdays: WEEKDAY_LABELS,
        weeks: grid
            .weeks
            .iter()
            .map(|week| week.days.iter().map(|cell| DayView::new(cell, limit)).collect())
            .collect(),
        error: snapshot.last_error.clone(),
    }))
}

#[derive(Serialize)]
pub struct UpcomingView {
    pub events: Vec<UpcomingEntry>,
    pub error: Option<String>,
}

/// GET /api/upcoming - Events that have not ended yet
async fn upcoming(State(state): State<AppState>) -> Json<UpcomingView> {
    let snapshot = state.calendar.snapshot().await;
    let events = match snapshot.value.as_deref() {
        Some(feed) => UpcomingEntry::list(&feed.events, &state.now(), state.config.upcoming_limit),
        None => Vec::new(),
    };

    Json(UpcomingView {
        events,
        error: snapshot.last_error,
    })
}

/// GET /ics - The latest fetched feed, verbatim
async fn raw_feed(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.calendar.snapshot().await;
    let feed = snapshot.value.ok_or_else(|| {
        AppError::unavailable(
            snapshot
                .last_error
                .unwrap_or_else(|| "Calendar has not been fetched yet".to_string()),
        )
    })?;

    Ok((
        [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
        feed.raw.clone(),
    ))
}
