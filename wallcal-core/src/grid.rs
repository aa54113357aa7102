//! Month grid bucketing.
//!
//! A month is shown as whole Sunday-first weeks: the grid starts on the
//! Sunday on or before the 1st and ends on the Saturday on or after the last
//! day, so it always holds 4, 5 or 6 weeks. Each day cell lists the events
//! that *start* on that date; a multi-day event is only listed once.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::Serialize;

use crate::event::Event;

/// Column headers, Sunday first.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One day of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell<'a> {
    pub date: NaiveDate,
    /// Date belongs to the target month (out-of-month days are dimmed)
    pub in_month: bool,
    pub is_today: bool,
    /// Events starting on `date`, in feed-sorted order
    pub events: Vec<&'a Event>,
}

impl<'a> Cell<'a> {
    /// Events to draw when at most `limit` fit in the cell.
    pub fn visible(&self, limit: usize) -> &[&'a Event] {
        &self.events[..self.events.len().min(limit)]
    }

    /// Count behind the "+N more" line when `limit` events are drawn.
    pub fn overflow(&self, limit: usize) -> usize {
        self.events.len().saturating_sub(limit)
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }
}

/// Seven consecutive cells, Sunday through Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Week<'a> {
    pub days: [Cell<'a>; 7],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid<'a> {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Week<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// Heading such as "June 2024".
    pub fn title(&self) -> String {
        first_of_month(self.year, self.month).format("%B %Y").to_string()
    }

    pub fn grid_start(&self) -> NaiveDate {
        self.weeks[0].days[0].date
    }

    pub fn grid_end(&self) -> NaiveDate {
        self.weeks[self.weeks.len() - 1].days[6].date
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell<'a>> {
        self.weeks.iter().flat_map(|week| week.days.iter())
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&Cell<'a>> {
        self.cells().find(|cell| cell.date == date)
    }
}

/// Bucket `events` into the month containing `anchor`.
///
/// Only the year and month of `anchor` matter. `today` drives the
/// `is_today` flag and is passed in rather than read from a clock, so the
/// same inputs always give the same grid.
pub fn build_month_grid(events: &[Event], anchor: NaiveDate, today: NaiveDate) -> MonthGrid<'_> {
    let (year, month) = (anchor.year(), anchor.month());
    let (grid_start, grid_end) = grid_bounds(anchor);

    let cells: Vec<Cell> = grid_start
        .iter_days()
        .take_while(|date| *date <= grid_end)
        .map(|date| Cell {
            date,
            in_month: date.year() == year && date.month() == month,
            is_today: date == today,
            events: events.iter().filter(|e| e.start_date() == date).collect(),
        })
        .collect();

    let mut weeks = Vec::with_capacity(cells.len() / 7);
    let mut days = cells.into_iter();
    while let Some(sunday) = days.next() {
        // Sunday/Saturday alignment makes the cell count a multiple of 7
        let rest: Vec<Cell> = days.by_ref().take(6).collect();
        let mut week = Vec::with_capacity(7);
        week.push(sunday);
        week.extend(rest);
        if let Ok(days) = <[Cell; 7]>::try_from(week) {
            weeks.push(Week { days });
        }
    }

    MonthGrid { year, month, weeks }
}

/// First and last date shown for the month containing `anchor`.
///
/// In the first and last months chrono can represent, the padding weeks
/// would leave the date range; there the grid shrinks to the whole weeks
/// that fit.
pub fn grid_bounds(anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = first_of_month(anchor.year(), anchor.month());
    let last = last_of_month(first);

    let lead = first.weekday().num_days_from_sunday() as u64;
    let trail = 6 - last.weekday().num_days_from_sunday() as u64;

    let start = first
        .checked_sub_days(Days::new(lead))
        .or_else(|| first.checked_add_days(Days::new((7 - lead) % 7)))
        .unwrap_or(first);
    let end = last
        .checked_add_days(Days::new(trail))
        .or_else(|| last.checked_sub_days(Days::new((7 - trail) % 7)))
        .unwrap_or(last);

    (start, end)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
