//! ICS feed parsing using the icalendar crate's parser.

use chrono::{DateTime, Days, Duration, NaiveDateTime, NaiveTime, Offset, TimeZone};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};
use tracing::{debug, warn};

use crate::error::{IcsError, IcsResult};
use crate::event::Event;

/// Parse a feed, resolving every time into UTC.
pub fn parse_ics(content: &str) -> IcsResult<Vec<Event>> {
    IcsParser::default().parse(content)
}

/// Parses feeds into events expressed in a reference zone.
///
/// The reference zone is the "local" frame of the dashboard: floating and
/// date-only values are interpreted in it, and calendar-date truncation of
/// the resulting events happens in it.
#[derive(Debug, Clone, Copy)]
pub struct IcsParser {
    tz: Tz,
}

impl Default for IcsParser {
    fn default() -> Self {
        IcsParser { tz: Tz::UTC }
    }
}

impl IcsParser {
    pub fn new(tz: Tz) -> Self {
        IcsParser { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Parse every VEVENT of a feed.
    ///
    /// The result is sorted by start; events with equal starts keep their
    /// feed order.
    pub fn parse(&self, content: &str) -> IcsResult<Vec<Event>> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Err(IcsError::Empty);
        }

        let unfolded = drop_invalid_lines(&unfold(content));
        if !unfolded
            .lines()
            .any(|line| line.trim().eq_ignore_ascii_case("BEGIN:VCALENDAR"))
        {
            return Err(IcsError::NotCalendar);
        }

        let unfolded = drop_unterminated_components(&unfolded);
        let calendar = read_calendar(&unfolded).map_err(|e| IcsError::Syntax(e.to_string()))?;

        let mut vevents = Vec::new();
        collect_vevents(&calendar.components, &mut vevents);

        let mut events: Vec<Event> = vevents
            .into_iter()
            .enumerate()
            .filter_map(|(index, vevent)| match self.parse_vevent(vevent) {
                Ok(event) => Some(event),
                Err(reason) => {
                    let uid = vevent.find_prop("UID").map(|p| p.val.to_string());
                    warn!(index, ?uid, reason, "Skipping malformed VEVENT");
                    None
                }
            })
            .collect();

        // sort_by_key is stable, ties keep feed order
        events.sort_by_key(|event| event.start);

        debug!(count = events.len(), tz = %self.tz, "Parsed ICS feed");
        Ok(events)
    }

    fn parse_vevent(&self, vevent: &Component) -> Result<Event, &'static str> {
        let dtstart = vevent.find_prop("DTSTART").ok_or("missing DTSTART")?;
        let start_value = DatePerhapsTime::try_from(dtstart).map_err(|_| "unreadable DTSTART")?;
        let all_day = matches!(start_value, DatePerhapsTime::Date(_));
        let start = self.resolve(start_value);

        let end = vevent
            .find_prop("DTEND")
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .map(|value| self.resolve(value))
            .unwrap_or_else(|| self.default_end(vevent, start, all_day));

        let title = vevent
            .find_prop("SUMMARY")
            .map(|p| unescape_text(p.val.as_ref()))
            .unwrap_or_default();
        let location = vevent
            .find_prop("LOCATION")
            .map(|p| unescape_text(p.val.as_ref()))
            .unwrap_or_default();

        let uid = vevent
            .find_prop("UID")
            .map(|p| p.val.to_string())
            .filter(|uid| !uid.trim().is_empty())
            .unwrap_or_else(|| format!("{}-{}", dtstart.val.as_ref(), title));

        Ok(Event {
            uid,
            title,
            start,
            end: end.max(start),
            all_day,
            location,
        })
    }

    /// Convert icalendar's DatePerhapsTime into an instant in the reference zone
    fn resolve(&self, value: DatePerhapsTime) -> DateTime<Tz> {
        match value {
            DatePerhapsTime::Date(date) => wall_time(self.tz, date.and_time(NaiveTime::MIN)),
            DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
                CalendarDateTime::Utc(dt) => dt.with_timezone(&self.tz),
                CalendarDateTime::Floating(naive) => wall_time(self.tz, naive),
                CalendarDateTime::WithTimezone { date_time, tzid } => {
                    match tzid.parse::<Tz>() {
                        Ok(zone) => wall_time(zone, date_time).with_timezone(&self.tz),
                        Err(_) => {
                            debug!(%tzid, "Unknown TZID, treating time as floating");
                            wall_time(self.tz, date_time)
                        }
                    }
                }
            },
        }
    }

    /// End of an event without DTEND (RFC 5545 section 3.6.1).
    fn default_end(&self, vevent: &Component, start: DateTime<Tz>, all_day: bool) -> DateTime<Tz> {
        if let Some(duration) = vevent
            .find_prop("DURATION")
            .and_then(|p| parse_duration(p.val.as_ref()))
        {
            return start + duration;
        }

        if all_day {
            let next_day = start.date_naive() + Days::new(1);
            wall_time(self.tz, next_day.and_time(NaiveTime::MIN))
        } else {
            start
        }
    }
}

/// Resolve a wall-clock time in `zone`.
///
/// Ambiguous times (DST fold) take the earlier instant. Times inside a DST
/// gap use the offset in effect before the gap (RFC 5545 section 3.3.5),
/// which moves them forward by the gap's length and keeps them on the same
/// date: midnight of a day whose DST starts at 00:00 becomes 01:00.
fn wall_time(zone: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    zone.from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| skip_gap(zone, naive))
}

fn skip_gap(zone: Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let before = naive.checked_sub_signed(Duration::days(1)).unwrap_or(naive);
    let offset = zone.offset_from_utc_datetime(&before).fix().local_minus_utc();

    naive
        .checked_sub_signed(Duration::seconds(offset.into()))
        .map(|utc| zone.from_utc_datetime(&utc))
        .unwrap_or_else(|| zone.from_utc_datetime(&naive))
}

/// Gather VEVENTs from any nesting depth, without descending into them
/// (VALARMs live inside VEVENTs).
fn collect_vevents<'c, 'a>(components: &'c [Component<'a>], out: &mut Vec<&'c Component<'a>>) {
    for component in components {
        if component.name == "VEVENT" {
            out.push(component);
        } else {
            collect_vevents(&component.components, out);
        }
    }
}

/// Drop content lines that have no `name:value` shape.
///
/// One corrupt line would otherwise fail the parse of the whole feed.
fn drop_invalid_lines(unfolded: &str) -> String {
    let mut kept = String::with_capacity(unfolded.len());
    for line in unfolded.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if !line.contains(':') {
            warn!(line, "Dropping invalid content line");
            continue;
        }
        kept.push_str(line);
        kept.push_str("\r\n");
    }
    kept
}

/// Drop components cut off before their END line, as in a feed truncated
/// mid-download, and END lines that close nothing.
///
/// A component left open by a later END of an enclosing one is dropped
/// from its BEGIN onward. An unclosed VCALENDAR is closed.
fn drop_unterminated_components(content: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    // (component name, index of its BEGIN line in `kept`)
    let mut open: Vec<(String, usize)> = Vec::new();

    for line in content.lines() {
        if let Some(name) = component_marker(line, "BEGIN") {
            open.push((name, kept.len()));
        } else if let Some(name) = component_marker(line, "END") {
            let Some(depth) = open.iter().rposition(|(open_name, _)| *open_name == name) else {
                warn!(line, "Dropping END without matching BEGIN");
                continue;
            };
            if let Some((unclosed, start)) = open.get(depth + 1) {
                warn!(component = %unclosed, "Dropping unterminated component");
                kept.truncate(*start);
            }
            open.truncate(depth);
        }
        kept.push(line);
    }

    if let Some((unclosed, start)) = open.get(1) {
        warn!(component = %unclosed, "Dropping component cut off at end of feed");
        kept.truncate(*start);
    }

    let mut out = String::with_capacity(content.len());
    for line in kept {
        out.push_str(line);
        out.push_str("\r\n");
    }
    if let Some((calendar, _)) = open.first() {
        out.push_str("END:");
        out.push_str(calendar);
        out.push_str("\r\n");
    }
    out
}

/// Component name of a `BEGIN:`/`END:` line, upper-cased.
fn component_marker(line: &str, kind: &str) -> Option<String> {
    let (key, value) = line.split_once(':')?;
    key.trim()
        .eq_ignore_ascii_case(kind)
        .then(|| value.trim().to_ascii_uppercase())
}

/// Parse a DURATION value (P1D, PT1H30M, -PT15M, P2W)
fn parse_duration(value: &str) -> Option<Duration> {
    let is_negative = value.starts_with('-');
    let duration = iso8601::duration(value.trim_start_matches(['+', '-'])).ok()?;
    let std_duration: std::time::Duration = duration.into();
    let duration = Duration::from_std(std_duration).ok()?;

    Some(if is_negative { -duration } else { duration })
}

/// Decode RFC 5545 TEXT escapes (`\\`, `\;`, `\,`, `\n`)
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}
