//! Month-by-month calendar layout of the working table.
//!
//! Grids are Sunday-first, 7 columns wide, with blank cells padding the days
//! before the 1st and after the last day of the month.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::parser::Appointment;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One booking as shown inside a day cell: the name with its time beneath
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub name: String,
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayCell {
    /// Outside the month
    Blank,
    Day { day: u32, entries: Vec<CalendarEntry> },
}

impl DayCell {
    pub fn day(&self) -> Option<u32> {
        match self {
            DayCell::Blank => None,
            DayCell::Day { day, .. } => Some(*day),
        }
    }

    pub fn entries(&self) -> &[CalendarEntry] {
        match self {
            DayCell::Blank => &[],
            DayCell::Day { entries, .. } => entries,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, DayCell::Blank)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekRow {
    pub days: [DayCell; 7],
    /// Largest number of entries in any day of this week; drives row height.
    pub max_entries: usize,
}

impl WeekRow {
    fn new(days: [DayCell; 7]) -> Self {
        let max_entries = days.iter().map(|d| d.entries().len()).max().unwrap_or(0);
        Self { days, max_entries }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<WeekRow>,
}

impl MonthGrid {
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Heading such as "June 2025"
    pub fn title(&self) -> String {
        self.first_day()
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }

    pub fn entry_count(&self) -> usize {
        self.weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .map(|d| d.entries().len())
            .sum()
    }
}

/// The instant a record is booked for, if its date and time combine into one.
pub fn appointment_instant(appointment: &Appointment) -> Option<NaiveDateTime> {
    let combined = format!("{} {}", appointment.date, appointment.time);
    NaiveDateTime::parse_from_str(&combined, "%Y-%m-%d %H:%M").ok()
}

/// Lays out every month that has at least one schedulable record, oldest first.
///
/// Records whose date and time do not combine into a valid instant are left
/// out of the report. The table itself is only read.
pub fn build_month_grids(table: &[Appointment]) -> Vec<MonthGrid> {
    let mut months: BTreeMap<(i32, u32), BTreeMap<u32, Vec<(NaiveDateTime, &Appointment)>>> =
        BTreeMap::new();

    for appointment in table {
        let Some(at) = appointment_instant(appointment) else {
            continue;
        };
        months
            .entry((at.year(), at.month()))
            .or_default()
            .entry(at.day())
            .or_default()
            .push((at, appointment));
    }

    months
        .into_iter()
        .filter_map(|((year, month), days)| month_grid(year, month, days))
        .collect()
}

fn days_in_month(first: NaiveDate) -> Option<u32> {
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
    };
    Some(next.pred_opt()?.day())
}

fn month_grid(
    year: i32,
    month: u32,
    mut days: BTreeMap<u32, Vec<(NaiveDateTime, &Appointment)>>,
) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let leading = first.weekday().num_days_from_sunday() as usize;
    let last_day = days_in_month(first)?;

    let mut cells: Vec<DayCell> = Vec::with_capacity(42);
    cells.extend((0..leading).map(|_| DayCell::Blank));
    for day in 1..=last_day {
        let mut booked = days.remove(&day).unwrap_or_default();
        // Stable: same-time bookings keep table order
        booked.sort_by_key(|(at, _)| *at);
        let entries = booked
            .into_iter()
            .map(|(_, a)| CalendarEntry {
                name: a.name.clone(),
                time: a.time.clone(),
            })
            .collect();
        cells.push(DayCell::Day { day, entries });
    }
    while cells.len() % 7 != 0 {
        cells.push(DayCell::Blank);
    }

    let mut weeks = Vec::with_capacity(cells.len() / 7);
    let mut cells = cells.into_iter();
    loop {
        let week: Vec<DayCell> = cells.by_ref().take(7).collect();
        if week.is_empty() {
            break;
        }
        let week: [DayCell; 7] = week.try_into().ok()?;
        weeks.push(WeekRow::new(week));
    }

    Some(MonthGrid { year, month, weeks })
}
