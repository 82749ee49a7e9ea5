use calamine::{Data, ExcelDateTime, Reader, Xlsx};
use csv::ReaderBuilder;
use log::debug;
use std::io::Cursor;
use std::path::Path;

use crate::error::{SchedulerError, SchedulerResult};
use crate::parser::{Field, RawRow, RawValue};

/// File formats accepted for import and produced for raw-data export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Xlsx,
    Csv,
}

impl TabularFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().trim_start_matches('.').to_lowercase().as_str() {
            "xlsx" => Some(TabularFormat::Xlsx),
            "csv" => Some(TabularFormat::Csv),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    pub fn content_type(self) -> &'static str {
        match self {
            TabularFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            TabularFormat::Csv => "text/csv",
        }
    }
}

/// Header row plus data rows of an uploaded file, cells still untyped
#[derive(Debug, Clone, Default)]
pub struct ImportTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ImportTable {
    pub fn has_column(&self, field: Field) -> bool {
        self.headers
            .iter()
            .any(|header| Field::from_header(header) == Some(field))
    }

    /// Rejects the whole file when a required column is absent
    pub fn require_column(&self, field: Field) -> SchedulerResult<()> {
        if self.has_column(field) {
            Ok(())
        } else {
            Err(SchedulerError::Validation(format!(
                "Missing '{}' column",
                field.header()
            )))
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn push_row(&mut self, cells: Vec<RawValue>) {
        if cells.iter().all(|cell| matches!(cell, RawValue::Null)) {
            return;
        }
        let row: RawRow = self
            .headers
            .iter()
            .zip(cells)
            .filter(|(header, _)| !header.is_empty())
            .map(|(header, cell)| (header.clone(), cell))
            .collect();
        self.rows.push(row);
    }
}

pub fn read_table(bytes: &[u8], format: TabularFormat) -> SchedulerResult<ImportTable> {
    let table = match format {
        TabularFormat::Xlsx => read_xlsx(bytes)?,
        TabularFormat::Csv => read_csv(bytes)?,
    };
    debug!("read {} rows with headers {:?}", table.len(), table.headers);
    Ok(table)
}

pub fn read_table_from_path(path: &Path) -> SchedulerResult<ImportTable> {
    let format = TabularFormat::from_path(path).ok_or_else(|| {
        SchedulerError::Import(format!("unsupported file type: {}", path.display()))
    })?;
    let bytes = std::fs::read(path)
        .map_err(|e| SchedulerError::Import(format!("{}: {}", path.display(), e)))?;
    read_table(&bytes, format)
}

/// Reads the first worksheet of an `.xlsx` workbook; its first row is the header
pub fn read_xlsx(bytes: &[u8]) -> SchedulerResult<ImportTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| SchedulerError::Import(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SchedulerError::Import("workbook has no worksheets".to_string()))?
        .map_err(|e| SchedulerError::Import(e.to_string()))?;

    let mut rows = range.rows();
    let mut table = ImportTable::default();
    let Some(header_row) = rows.next() else {
        return Ok(table);
    };
    table.headers = header_row
        .iter()
        .map(|cell| cell_value(cell).to_text())
        .map(|text| if text == "None" { String::new() } else { text.trim().to_string() })
        .collect();

    for row in rows {
        table.push_row(row.iter().map(cell_value).collect());
    }
    Ok(table)
}

pub fn read_csv(bytes: &[u8]) -> SchedulerResult<ImportTable> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);
    let mut table = ImportTable {
        headers: reader
            .headers()
            .map_err(|e| SchedulerError::Import(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        rows: Vec::new(),
    };

    for result in reader.records() {
        let record = result.map_err(|e| SchedulerError::Import(e.to_string()))?;
        let cells = record
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    RawValue::Null
                } else {
                    RawValue::from(cell)
                }
            })
            .collect();
        table.push_row(cells);
    }
    Ok(table)
}

fn cell_value(cell: &Data) -> RawValue {
    match cell {
        Data::Empty | Data::Error(_) => RawValue::Null,
        Data::String(s) => RawValue::Text(s.clone()),
        Data::Int(i) => RawValue::Int(*i),
        Data::Float(f) => RawValue::Float(*f),
        Data::Bool(b) => RawValue::Bool(*b),
        Data::DateTime(dt) => excel_date_time(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => RawValue::Text(s.clone()),
    }
}

/// Serial values below one day are time-of-day cells
fn excel_date_time(dt: &ExcelDateTime) -> RawValue {
    match dt.as_datetime() {
        Some(value) if dt.as_f64() < 1.0 => RawValue::Time(value.time()),
        Some(value) => RawValue::DateTime(value),
        None => RawValue::Float(dt.as_f64()),
    }
}
