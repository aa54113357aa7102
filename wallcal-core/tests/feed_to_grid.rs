use chrono::{NaiveDate, TimeZone};
use chrono_tz::America::{Chicago, Sao_Paulo};
use wallcal_core::constants::DEFAULT_CELL_EVENT_LIMIT;
use wallcal_core::{IcsParser, UpcomingEntry, build_month_grid, parse_ics};

const FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Google Inc//Google Calendar 70.9054//EN\r
X-WR-CALNAME:Family\r
BEGIN:VEVENT\r
UID:standup@example.com\r
SUMMARY:Standup\r
DTSTART:20240601T100000Z\r
DTEND:20240601T110000Z\r
LOCATION:Kitchen\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:broken@example.com\r
SUMMARY:Missing start\r
DTEND:20240603T110000Z\r
END:VEVENT\r
END:VCALENDAR\r
";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_feed_with_broken_entry_lands_in_june_grid() {
    let events = parse_ics(FEED).expect("Feed should parse");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title, "Standup");
    assert_eq!(events[0].location, "Kitchen");

    let grid = build_month_grid(&events, date(2024, 6, 15), date(2024, 6, 15));
    let cell = grid.cell(date(2024, 6, 1)).expect("June 1st should be in the grid");

    assert_eq!(cell.events.len(), 1);
    assert_eq!(cell.events[0].title, "Standup");
    assert!(cell.in_month);

    let occupied: Vec<NaiveDate> = grid
        .cells()
        .filter(|c| !c.events.is_empty())
        .map(|c| c.date)
        .collect();
    assert_eq!(occupied, vec![date(2024, 6, 1)]);
}

#[test]
fn test_busy_day_reports_overflow() {
    let mut feed = String::from("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:TEST\n");
    for hour in 8..15 {
        feed.push_str(&format!(
            "BEGIN:VEVENT\nUID:slot-{hour}\nSUMMARY:Slot {hour}\nDTSTART:20240612T{hour:02}0000\nEND:VEVENT\n"
        ));
    }
    feed.push_str("END:VCALENDAR\n");

    let events = IcsParser::new(Chicago).parse(&feed).expect("Feed should parse");
    let grid = build_month_grid(&events, date(2024, 6, 1), date(2024, 6, 12));
    let cell = grid.cell(date(2024, 6, 12)).unwrap();

    assert!(cell.is_today);
    assert_eq!(cell.events.len(), 7);
    assert_eq!(cell.overflow(DEFAULT_CELL_EVENT_LIMIT), 3);
    assert_eq!(cell.visible(DEFAULT_CELL_EVENT_LIMIT)[0].title, "Slot 8");
}

#[test]
fn test_all_day_event_on_dst_start_day_stays_in_its_cell() {
    let feed = "BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:TEST\nBEGIN:VEVENT\nUID:gap\nSUMMARY:Election day\nDTSTART;VALUE=DATE:20181104\nEND:VEVENT\nEND:VCALENDAR\n";

    let events = IcsParser::new(Sao_Paulo).parse(feed).expect("Feed should parse");
    let grid = build_month_grid(&events, date(2018, 11, 1), date(2018, 11, 1));

    assert_eq!(grid.cell(date(2018, 11, 4)).unwrap().events.len(), 1);
    assert!(grid.cell(date(2018, 11, 3)).unwrap().events.is_empty());
}

#[test]
fn test_empty_calendar_gives_full_empty_grid() {
    let events = parse_ics("BEGIN:VCALENDAR\nVERSION:2.0\nPRODID:TEST\nEND:VCALENDAR\n")
        .expect("Empty calendar should parse");
    let grid = build_month_grid(&events, date(2024, 2, 10), date(2024, 2, 10));

    assert_eq!(grid.cells().count() % 7, 0);
    assert!(grid.cells().all(|c| c.events.is_empty()));
}

#[test]
fn test_upcoming_from_parsed_feed() {
    let feed = "BEGIN:VCALENDAR
VERSION:2.0
PRODID:TEST
BEGIN:VEVENT
UID:past
SUMMARY:Past
DTSTART:20240610T090000
DTEND:20240610T100000
END:VEVENT
BEGIN:VEVENT
UID:picnic
SUMMARY:Picnic
DTSTART;VALUE=DATE:20240620
DTEND;VALUE=DATE:20240621
END:VEVENT
END:VCALENDAR
";
    let events = IcsParser::new(Chicago).parse(feed).expect("Feed should parse");
    let now = Chicago.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap();

    let entries = UpcomingEntry::list(&events, &now, 10);

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Picnic");
    assert_eq!(entries[0].time, "All day");
    assert_eq!(entries[0].date, "Thu, Jun 20");
    assert_eq!(entries[0].relative, "in 5 days");
}
