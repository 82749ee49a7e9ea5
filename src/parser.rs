use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Header row of the store and of every exported table, in column order.
pub const COLUMNS: [&str; 5] = ["name", "identifier", "date", "time", "notes"];

/// Text the backing store writes into cells that hold no value.
const EMPTY_SENTINELS: [&str; 4] = ["NaT", "nan", "None", "<NA>"];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// One column of an appointment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Identifier,
    Date,
    Time,
    Notes,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Identifier,
        Field::Date,
        Field::Time,
        Field::Notes,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Field::Name => COLUMNS[0],
            Field::Identifier => COLUMNS[1],
            Field::Date => COLUMNS[2],
            Field::Time => COLUMNS[3],
            Field::Notes => COLUMNS[4],
        }
    }

    /// Matches a header cell case-insensitively. `ID` is accepted for the
    /// identifier column since older sheets were created with that label.
    pub fn from_header(header: &str) -> Option<Field> {
        match header.trim().to_lowercase().as_str() {
            "name" => Some(Field::Name),
            "identifier" | "id" => Some(Field::Identifier),
            "date" => Some(Field::Date),
            "time" => Some(Field::Time),
            "notes" => Some(Field::Notes),
            _ => None,
        }
    }
}

/// Canonical appointment record.
///
/// Every field is always present. A missing value is the empty string,
/// `date` is `YYYY-MM-DD` or empty and `time` is `HH:MM` or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appointment {
    pub name: String,
    pub identifier: String,
    pub date: String,
    pub time: String,
    pub notes: String,
}

impl Appointment {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Identifier => &self.identifier,
            Field::Date => &self.date,
            Field::Time => &self.time,
            Field::Notes => &self.notes,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Identifier => &mut self.identifier,
            Field::Date => &mut self.date,
            Field::Time => &mut self.time,
            Field::Notes => &mut self.notes,
        }
    }

    /// Cells in `COLUMNS` order, ready for a tabular writer
    pub fn to_record(&self) -> [&str; 5] {
        Field::ALL.map(|field| self.field(field))
    }

    /// Converts the record back into an untyped row, as the store would hand it out
    pub fn to_raw_row(&self) -> RawRow {
        Field::ALL
            .iter()
            .map(|field| {
                (
                    field.header().to_string(),
                    RawValue::Text(self.field(*field).to_string()),
                )
            })
            .collect()
    }
}

/// A single untyped cell as it arrives from a store or an imported file
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl RawValue {
    /// Textual form of the cell, before sentinel cleanup.
    pub fn to_text(&self) -> String {
        match self {
            RawValue::Null => "None".to_string(),
            RawValue::Bool(true) => "True".to_string(),
            RawValue::Bool(false) => "False".to_string(),
            RawValue::Int(i) => i.to_string(),
            RawValue::Float(f) if f.is_nan() => "nan".to_string(),
            // Whole numbers (typically numeric IDs) keep no trailing ".0".
            RawValue::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
            RawValue::Float(f) => f.to_string(),
            RawValue::Text(s) => s.clone(),
            RawValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            RawValue::Time(t) => t.format("%H:%M:%S").to_string(),
            RawValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

/// Header name -> cell. Keys may be missing and may use any header casing.
pub type RawRow = HashMap<String, RawValue>;

/// Coerces a cell to text and blanks the "no value" sentinels
fn clean_text(value: &RawValue) -> String {
    let text = value.to_text();
    if EMPTY_SENTINELS.contains(&text.as_str()) {
        String::new()
    } else {
        text
    }
}

/// Parses a calendar date permissively and renders it as `YYYY-MM-DD`.
/// Anything unparseable becomes the empty string.
pub fn normalize_date(text: &str) -> String {
    parse_date(text)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
    {
        return Some(dt.date());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local().date());
    }

    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
    {
        return Some(d);
    }

    // Compact YYYYMMDD, only when it is exactly eight digits
    if trimmed.len() == 8 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::parse_from_str(trimmed, "%Y%m%d").ok();
    }

    None
}

/// Parses `HH:MM:SS` (spreadsheet time cells) or `HH:MM` and renders `HH:MM`.
/// Anything unparseable becomes the empty string.
pub fn normalize_time(text: &str) -> String {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Normalizes one raw row. Columns that are not part of the record are ignored
/// and columns that are missing come out as empty strings.
pub fn normalize_row(row: &RawRow) -> Appointment {
    let mut appointment = Appointment::default();

    // Several headers can name one field (`ID` and `identifier`). The canonical
    // spelling goes first, the rest in header order; the first non-empty value wins.
    let mut cells: Vec<(Field, &str, &RawValue)> = row
        .iter()
        .filter_map(|(header, value)| {
            Field::from_header(header).map(|field| (field, header.as_str(), value))
        })
        .collect();
    cells.sort_by_key(|&(field, header, _)| (header != field.header(), header));

    for (field, _, value) in cells {
        let slot = appointment.field_mut(field);
        if !slot.is_empty() {
            continue;
        }
        let text = clean_text(value);
        *slot = match field {
            Field::Date => normalize_date(&text),
            Field::Time => normalize_time(&text),
            _ => text,
        };
    }

    appointment
}

/// Normalizes a batch of raw rows, preserving order.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<Appointment> {
    rows.iter().map(normalize_row).collect()
}

/// Re-normalizes records that already have the typed shape, e.g. an edited grid.
pub fn normalize_appointments(records: &[Appointment]) -> Vec<Appointment> {
    records
        .iter()
        .map(|record| normalize_row(&record.to_raw_row()))
        .collect()
}
