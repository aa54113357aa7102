//! Human readable labels for the upcoming-events list.

use std::fmt;

use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::event::Event;

/// Distance in whole calendar days between "now" and a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelativeDay {
    Today,
    Tomorrow,
    /// Two or more days ahead
    InDays(i64),
    /// Any number of days in the past
    DaysAgo(i64),
}

impl RelativeDay {
    /// Classify `target` relative to `now`.
    ///
    /// Both sides are truncated to their calendar date in `now`'s zone before
    /// differencing, so the time of day never changes the count.
    pub fn between<Tz: TimeZone>(target: &DateTime<Tz>, now: &DateTime<Tz>) -> Self {
        let target_date = target.with_timezone(&now.timezone()).date_naive();
        let diff = (target_date - now.date_naive()).num_days();

        match diff {
            0 => RelativeDay::Today,
            1 => RelativeDay::Tomorrow,
            d if d > 1 => RelativeDay::InDays(d),
            d => RelativeDay::DaysAgo(d.abs()),
        }
    }
}

impl fmt::Display for RelativeDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelativeDay::Today => write!(f, "Today"),
            RelativeDay::Tomorrow => write!(f, "Tomorrow"),
            RelativeDay::InDays(days) => write!(f, "in {days} days"),
            RelativeDay::DaysAgo(days) => write!(f, "{days} days ago"),
        }
    }
}

/// "Today", "Tomorrow", "in 5 days" or "5 days ago".
pub fn days_until<Tz: TimeZone>(target: &DateTime<Tz>, now: &DateTime<Tz>) -> String {
    RelativeDay::between(target, now).to_string()
}

/// Start date as shown in the list, e.g. "Sat, Jun 1".
pub fn date_label(event: &Event) -> String {
    event.start.format("%a, %b %-d").to_string()
}

/// "All day", or the start and end clock times, e.g. "10:00 AM–11:00 AM".
pub fn time_label(event: &Event) -> String {
    if event.all_day {
        return "All day".to_string();
    }
    format!("{}–{}", clock_label(&event.start), clock_label(&event.end))
}

/// 12-hour clock time, e.g. "9:05 PM".
pub fn clock_label<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    time.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Chicago;
    use chrono_tz::Tz;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Chicago.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_days_until_boundary_table() {
        let now = local(2024, 6, 15, 0, 0);

        assert_eq!(days_until(&local(2024, 6, 15, 9, 0), &now), "Today");
        assert_eq!(days_until(&local(2024, 6, 16, 0, 0), &now), "Tomorrow");
        assert_eq!(days_until(&local(2024, 6, 20, 0, 0), &now), "in 5 days");
        assert_eq!(days_until(&local(2024, 6, 10, 0, 0), &now), "5 days ago");
    }

    #[test]
    fn test_time_of_day_does_not_change_the_count() {
        let late_now = local(2024, 6, 15, 23, 59);

        assert_eq!(days_until(&local(2024, 6, 16, 0, 1), &late_now), "Tomorrow");
        assert_eq!(days_until(&local(2024, 6, 15, 0, 0), &late_now), "Today");
        assert_eq!(days_until(&local(2024, 6, 14, 23, 59), &late_now), "1 days ago");
    }

    #[test]
    fn test_target_in_other_zone_is_compared_in_now_zone() {
        let now = local(2024, 6, 15, 12, 0);
        // 02:00 UTC on the 16th is still the 15th in Chicago
        let target = Tz::UTC.with_ymd_and_hms(2024, 6, 16, 2, 0, 0).unwrap();

        assert_eq!(RelativeDay::between(&target, &now), RelativeDay::Today);
    }

    #[test]
    fn test_row_labels() {
        let mut event = Event {
            uid: "standup".to_string(),
            title: "Standup".to_string(),
            start: local(2024, 6, 1, 10, 0),
            end: local(2024, 6, 1, 11, 0),
            all_day: false,
            location: String::new(),
        };

        assert_eq!(date_label(&event), "Sat, Jun 1");
        assert_eq!(time_label(&event), "10:00 AM–11:00 AM");

        event.all_day = true;
        assert_eq!(time_label(&event), "All day");

        assert_eq!(clock_label(&local(2024, 6, 1, 21, 5)), "9:05 PM");
    }
}
