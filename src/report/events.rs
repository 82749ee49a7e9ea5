use serde::Serialize;

use crate::parser::Appointment;

/// An event for an interactive month/list calendar view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    /// Row position in the working table
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DDTHH:MM`
    pub start: String,
    pub description: String,
}

/// Events for every record with a full date and time
pub fn calendar_events(table: &[Appointment]) -> Vec<CalendarEvent> {
    table
        .iter()
        .enumerate()
        .filter(|(_, a)| a.date.len() == 10 && a.time.len() == 5)
        .map(|(idx, a)| CalendarEvent {
            id: idx.to_string(),
            title: a.name.clone(),
            start: format!("{}T{}", a.date, a.time),
            description: format!("ID: {} | Notes: {}", a.identifier, a.notes),
        })
        .collect()
}
