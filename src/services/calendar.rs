//! Trading calendars.
//!
//! A calendar yields every open-market day of a year in ascending order.
//! [`NyseCalendar`] derives the schedule from the exchange's holiday rules;
//! [`FixedCalendar`] serves an explicit table.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashMap;

use crate::error::{AppError, Result};

/// Source of the ordered trading dates for a calendar year.
pub trait TradingCalendar: Send + Sync {
    fn name(&self) -> &str;

    /// Every trading day of `year`, ascending.
    fn schedule(&self, year: i32) -> Result<Vec<NaiveDate>>;
}

/// Reject schedules that are empty, out of order, or leak into other years.
pub fn validate_schedule(year: i32, dates: &[NaiveDate]) -> Result<()> {
    if dates.is_empty() {
        return Err(AppError::calendar_unavailable(year, "schedule is empty"));
    }
    if let Some(stray) = dates.iter().find(|d| d.year() != year) {
        return Err(AppError::calendar_unavailable(
            year,
            format!("schedule contains {} from another year", stray),
        ));
    }
    if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
        return Err(AppError::calendar_unavailable(
            year,
            format!("schedule is not strictly ascending at {}", pair[1]),
        ));
    }
    Ok(())
}

/// Unscheduled full-day closures (national days of mourning, storms, 9/11).
const SPECIAL_CLOSURES: &[(i32, u32, u32)] = &[
    (1994, 4, 27),
    (2001, 9, 11),
    (2001, 9, 12),
    (2001, 9, 13),
    (2001, 9, 14),
    (2004, 6, 11),
    (2007, 1, 2),
    (2012, 10, 29),
    (2012, 10, 30),
    (2018, 12, 5),
    (2025, 1, 9),
];

/// New York Stock Exchange calendar built from its holiday rules.
#[derive(Debug, Clone)]
pub struct NyseCalendar {
    first_year: i32,
    last_year: i32,
}

impl Default for NyseCalendar {
    fn default() -> Self {
        Self {
            first_year: 1990,
            last_year: 2099,
        }
    }
}

impl NyseCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supports(&self, year: i32) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }

    /// Full-day market holidays in `year`, as observed.
    pub fn holidays(&self, year: i32) -> Result<Vec<NaiveDate>> {
        let ymd = |m: u32, d: u32| {
            NaiveDate::from_ymd_opt(year, m, d)
                .ok_or_else(|| AppError::calendar_unavailable(year, format!("invalid date {}-{}", m, d)))
        };
        let nth = |m: u32, weekday: Weekday, n: u8| {
            NaiveDate::from_weekday_of_month_opt(year, m, weekday, n).ok_or_else(|| {
                AppError::calendar_unavailable(year, format!("no {:?} #{} in month {}", weekday, n, m))
            })
        };

        let mut days = Vec::with_capacity(12);

        // A Saturday New Year's Day is not moved back into the prior year.
        let new_year = ymd(1, 1)?;
        match new_year.weekday() {
            Weekday::Sat => {}
            Weekday::Sun => days.push(new_year + Duration::days(1)),
            _ => days.push(new_year),
        }

        if year >= 1998 {
            days.push(nth(1, Weekday::Mon, 3)?);
        }
        days.push(nth(2, Weekday::Mon, 3)?);
        days.push(easter_sunday(year)? - Duration::days(2));
        days.push(last_weekday_of_month(year, 5, Weekday::Mon)?);
        if year >= 2022 {
            days.push(observed(ymd(6, 19)?));
        }
        days.push(observed(ymd(7, 4)?));
        days.push(nth(9, Weekday::Mon, 1)?);
        days.push(nth(11, Weekday::Thu, 4)?);
        days.push(observed(ymd(12, 25)?));

        days.extend(
            SPECIAL_CLOSURES
                .iter()
                .filter(|(y, _, _)| *y == year)
                .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        );

        days.sort();
        days.dedup();
        Ok(days)
    }
}

impl TradingCalendar for NyseCalendar {
    fn name(&self) -> &str {
        "nyse"
    }

    fn schedule(&self, year: i32) -> Result<Vec<NaiveDate>> {
        if !self.supports(year) {
            return Err(AppError::calendar_unavailable(
                year,
                format!(
                    "NYSE calendar covers {}-{}",
                    self.first_year, self.last_year
                ),
            ));
        }

        let holidays = self.holidays(year)?;
        let first = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| AppError::calendar_unavailable(year, "year out of range"))?;

        Ok(first
            .iter_days()
            .take_while(|d| d.year() == year)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .filter(|d| holidays.binary_search(d).is_err())
            .collect())
    }
}

/// Saturday holidays are observed on Friday, Sunday holidays on Monday.
fn observed(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Result<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| AppError::calendar_unavailable(year, "year out of range"))?;

    let mut day = next_month - Duration::days(1);
    while day.weekday() != weekday {
        day = day - Duration::days(1);
    }
    Ok(day)
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Result<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| AppError::calendar_unavailable(year, "could not place Easter"))
}

/// Calendar backed by an explicit table of trading dates per year.
#[derive(Debug, Clone, Default)]
pub struct FixedCalendar {
    years: HashMap<i32, Vec<NaiveDate>>,
}

impl FixedCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32, mut dates: Vec<NaiveDate>) -> Self {
        dates.sort();
        self.years.insert(year, dates);
        self
    }
}

impl TradingCalendar for FixedCalendar {
    fn name(&self) -> &str {
        "fixed"
    }

    fn schedule(&self, year: i32) -> Result<Vec<NaiveDate>> {
        self.years
            .get(&year)
            .cloned()
            .ok_or_else(|| AppError::calendar_unavailable(year, "no schedule loaded"))
    }
}
