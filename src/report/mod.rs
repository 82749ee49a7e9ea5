pub mod calendar;
pub mod events;
pub mod pdf;

pub use calendar::{build_month_grids, CalendarEntry, DayCell, MonthGrid, WeekRow};
pub use events::{calendar_events, CalendarEvent};
pub use pdf::{render_pdf, write_pdf};

use crate::error::SchedulerResult;
use crate::parser::Appointment;

/// Builds the month grids for the table and renders them as a PDF calendar.
pub fn calendar_report(table: &[Appointment]) -> SchedulerResult<Vec<u8>> {
    render_pdf(&build_month_grids(table))
}
