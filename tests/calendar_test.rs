//! Integration tests for trading calendars

use almanac::services::{NyseCalendar, TradingCalendar};
use chrono::{Datelike, NaiveDate, Weekday};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn test_schedule_is_weekdays_in_year() {
    let schedule = NyseCalendar::new().schedule(2024).unwrap();

    assert!(schedule.iter().all(|day| day.year() == 2024));
    assert!(schedule
        .iter()
        .all(|day| !matches!(day.weekday(), Weekday::Sat | Weekday::Sun)));
    assert!(schedule.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_fixed_holidays_2024() {
    let schedule = NyseCalendar::new().schedule(2024).unwrap();

    for holiday in [
        d(2024, 1, 1),
        d(2024, 1, 15),
        d(2024, 2, 19),
        d(2024, 3, 29),
        d(2024, 5, 27),
        d(2024, 6, 19),
        d(2024, 7, 4),
        d(2024, 9, 2),
        d(2024, 11, 28),
        d(2024, 12, 25),
    ] {
        assert!(!schedule.contains(&holiday), "{} should be closed", holiday);
    }
    assert_eq!(schedule.first(), Some(&d(2024, 1, 2)));
    assert!(schedule.contains(&d(2024, 12, 24)));
}

#[test]
fn test_juneteenth_starts_in_2022() {
    let cal = NyseCalendar::new();
    assert!(cal.schedule(2021).unwrap().contains(&d(2021, 6, 18)));
    // 2022-06-19 is a Sunday, observed Monday.
    assert!(!cal.schedule(2022).unwrap().contains(&d(2022, 6, 20)));
}

#[test]
fn test_saturday_new_year_keeps_prior_friday_open() {
    let schedule = NyseCalendar::new().schedule(2021).unwrap();
    assert_eq!(schedule.last(), Some(&d(2021, 12, 31)));
}

#[test]
fn test_special_closures() {
    let cal = NyseCalendar::new();

    let y2001 = cal.schedule(2001).unwrap();
    assert_eq!(y2001.len(), 248);
    assert!(!y2001.contains(&d(2001, 9, 11)));
    assert!(y2001.contains(&d(2001, 9, 17)));

    let y2012 = cal.schedule(2012).unwrap();
    assert!(!y2012.contains(&d(2012, 10, 29)));
    assert!(!y2012.contains(&d(2012, 10, 30)));

    assert!(!cal.schedule(2025).unwrap().contains(&d(2025, 1, 9)));
}

#[test]
fn test_supported_range() {
    let cal = NyseCalendar::new();
    assert!(cal.supports(1990));
    assert!(cal.supports(2099));
    assert!(!cal.supports(1989));
    assert_eq!(cal.schedule(2100).unwrap_err().kind(), "calendar_unavailable");
    assert_eq!(cal.name(), "nyse");
}
