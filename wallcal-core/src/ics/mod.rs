//! iCalendar feed parsing.
//!
//! Turns the text of an RFC 5545 feed into a chronologically sorted list of
//! [`Event`](crate::Event)s. Broken entries are skipped; only a feed that is
//! not iCalendar at all is an error.

mod parse;

pub use parse::{IcsParser, parse_ics};
