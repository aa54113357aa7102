//! The "Upcoming Events" list.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::event::Event;
use crate::labels::{date_label, days_until, time_label};

/// Events that have not finished yet, at most `limit` of them.
///
/// `events` must already be sorted by start (the parser guarantees it), the
/// result keeps that order.
pub fn upcoming<'a>(events: &'a [Event], now: &DateTime<Tz>, limit: usize) -> Vec<&'a Event> {
    events.iter().filter(|e| e.end > *now).take(limit).collect()
}

/// One row of the upcoming list as the renderer consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingEntry {
    pub key: String,
    /// "Sat, Jun 1"
    pub date: String,
    /// "All day" or "10:00 AM–11:00 AM"
    pub time: String,
    pub title: String,
    pub location: String,
    /// "Today", "Tomorrow", "in 3 days"
    pub relative: String,
}

impl UpcomingEntry {
    pub fn new(event: &Event, now: &DateTime<Tz>) -> Self {
        UpcomingEntry {
            key: event.list_key(),
            date: date_label(event),
            time: time_label(event),
            title: event.title.clone(),
            location: event.location.clone(),
            relative: days_until(&event.start, now),
        }
    }

    /// Build the whole list in one go.
    pub fn list(events: &[Event], now: &DateTime<Tz>, limit: usize) -> Vec<Self> {
        upcoming(events, now, limit)
            .into_iter()
            .map(|event| UpcomingEntry::new(event, now))
            .collect()
    }
}
