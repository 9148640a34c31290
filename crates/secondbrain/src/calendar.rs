//! Month grid generation for the schedule view.
//!
//! A grid is `first_weekday` blank cells followed by one cell per day of the
//! month, which is what a 7-column (Sunday first) month view needs. Events
//! are attached to day cells by exact `YYYY-MM-DD` string match.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// A month to render. `month` is zero-indexed (0 = January).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MonthRef {
    year: i32,
    month: u32,
}

impl MonthRef {
    /// Build a month, rolling out-of-range months into neighbouring years
    /// (`-1` is December of the previous year, `12` January of the next).
    pub fn new(year: i32, month: i32) -> Self {
        Self::from_total(i64::from(year) * 12 + i64::from(month))
    }

    /// Same as [`MonthRef::new`] with a one-indexed month (1 = January).
    pub fn from_month1(year: i32, month: i32) -> Self {
        Self::from_total(i64::from(year) * 12 + i64::from(month) - 1)
    }

    /// Months counted from January of year 0. Counts past the `i32` year
    /// range clamp to January `i32::MIN` or December `i32::MAX`.
    fn from_total(total: i64) -> Self {
        let first = i64::from(i32::MIN) * 12;
        let last = i64::from(i32::MAX) * 12 + 11;
        let total = total.clamp(first, last);

        Self {
            year: total.div_euclid(12) as i32,
            month: total.rem_euclid(12) as u32,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month0(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// Zero-indexed month.
    pub fn month0(self) -> u32 {
        self.month
    }

    /// One-indexed month, as used in dates and URLs.
    pub fn month1(self) -> u32 {
        self.month + 1
    }

    pub fn prev(self) -> Self {
        Self::new(self.year, self.month as i32 - 1)
    }

    pub fn next(self) -> Self {
        Self::new(self.year, self.month as i32 + 1)
    }

    pub fn days(self) -> u32 {
        match self.month {
            1 if is_leap_year(self.year) => 29,
            1 => 28,
            3 | 5 | 8 | 10 => 30,
            _ => 31,
        }
    }

    /// Weekday of the 1st, 0 = Sunday.
    pub fn first_weekday(self) -> u32 {
        // The Gregorian calendar repeats every 400 years (146097 days, a
        // whole number of weeks), so any year maps onto one chrono handles.
        let proxy = 2000 + self.year.rem_euclid(400);
        NaiveDate::from_ymd_opt(proxy, self.month1(), 1)
            .map(|d| d.weekday().num_days_from_sunday())
            .unwrap_or(0)
    }

    /// `YYYY-MM-DD` for a day of this month. The year is not padded.
    pub fn date_string(self, day: u32) -> String {
        format!("{}-{:02}-{:02}", self.year, self.month1(), day)
    }

    /// e.g. "December 2025".
    pub fn label(self) -> String {
        format!("{} {}", MONTH_NAMES[self.month as usize], self.year)
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Proleptic Gregorian leap year rule; year 0 is a leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in a (possibly out-of-range) zero-indexed month.
pub fn days_in_month(year: i32, month: i32) -> u32 {
    MonthRef::new(year, month).days()
}

/// Weekday (0 = Sunday) of the 1st of a zero-indexed month.
pub fn first_weekday_of_month(year: i32, month: i32) -> u32 {
    MonthRef::new(year, month).first_weekday()
}

/// What an event is. Declaration order is the order inside a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Task,
    Session,
}

/// A task or study session pinned to a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub id: i64,
    /// Task title or session subject
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Date in YYYY-MM-DD format
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i32>,
}

impl CalendarEvent {
    /// Key used to tell events apart in rendered output.
    pub fn key(&self) -> String {
        let kind = match self.kind {
            EventKind::Task => "task",
            EventKind::Session => "session",
        };
        format!("{}-{}", kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub date: String,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Cell {
    /// Placeholder before the 1st, aligning it to its weekday column
    Blank { index: u32 },
    Day(DayCell),
}

impl Cell {
    /// Unique key within a grid: `empty-{i}` or `day-{d}`.
    pub fn key(&self) -> String {
        match self {
            Cell::Blank { index } => format!("empty-{index}"),
            Cell::Day(day) => format!("day-{}", day.day),
        }
    }

    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            Cell::Day(day) => Some(day),
            Cell::Blank { .. } => None,
        }
    }
}

/// Lay out `month` as grid cells.
///
/// Each day cell gets the events whose `date` equals its date string; tasks
/// come before sessions and input order is kept within each kind. Events
/// whose dates match no cell are left out.
pub fn generate_grid(month: MonthRef, events: &[CalendarEvent], today: NaiveDate) -> Vec<Cell> {
    let blanks = first_weekday_of_month(month.year(), month.month0() as i32);
    let days = days_in_month(month.year(), month.month0() as i32);

    let mut by_date: BTreeMap<&str, Vec<&CalendarEvent>> = BTreeMap::new();
    for event in events {
        by_date.entry(event.date.as_str()).or_default().push(event);
    }

    let today = MonthRef::from_date(today).date_string(today.day());

    let mut cells = Vec::with_capacity((blanks + days) as usize);
    cells.extend((0..blanks).map(|index| Cell::Blank { index }));

    for day in 1..=days {
        let date = month.date_string(day);
        let mut day_events: Vec<CalendarEvent> = by_date
            .get(date.as_str())
            .map(|found| found.iter().map(|e| (*e).clone()).collect())
            .unwrap_or_default();
        day_events.sort_by_key(|e| e.kind);

        cells.push(Cell::Day(DayCell {
            day,
            is_today: date == today,
            date,
            events: day_events,
        }));
    }

    cells
}
