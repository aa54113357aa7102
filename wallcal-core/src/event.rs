//! Normalized event records produced by the ICS parser.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

/// A calendar event resolved into the dashboard's reference zone.
///
/// Events are immutable once parsed. The whole list is rebuilt on every feed
/// refresh, so nothing downstream holds on to them across refreshes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// UID from the source entry (synthesized when the feed omits it)
    pub uid: String,
    /// SUMMARY, empty when missing
    pub title: String,
    pub start: DateTime<Tz>,
    /// Never before `start`
    pub end: DateTime<Tz>,
    /// DTSTART was a date without a time of day
    pub all_day: bool,
    /// LOCATION, empty when missing
    pub location: String,
}

impl Event {
    /// Calendar date the event starts on, in the reference zone.
    ///
    /// This is the only date used for grid membership; an event spanning
    /// several days still lands in a single cell.
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Whether the event runs past the end of its start date.
    ///
    /// All-day events end at midnight of the following day, so a single-day
    /// all-day event is not multi-day.
    pub fn is_multi_day(&self) -> bool {
        let span = self.end_date() - self.start_date();
        if self.all_day {
            span.num_days() > 1
        } else {
            span.num_days() > 0 && self.end.time() != chrono::NaiveTime::MIN
        }
    }

    /// Key used by list renderers; UIDs repeat across materialized
    /// occurrences of a recurring event, the start disambiguates them.
    pub fn list_key(&self) -> String {
        format!("{}@{}", self.uid, self.start.to_rfc3339())
    }
}
