use csv::WriterBuilder;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

use super::import::TabularFormat;
use crate::error::{SchedulerError, SchedulerResult};
use crate::parser::{Appointment, COLUMNS};

/// Name of the single worksheet in a raw-data export
pub const SHEET_NAME: &str = "Data";

/// Serializes the working table in the given format: header row, then one row
/// per record in table order.
pub fn export_table(table: &[Appointment], format: TabularFormat) -> SchedulerResult<Vec<u8>> {
    match format {
        TabularFormat::Xlsx => export_xlsx(table),
        TabularFormat::Csv => export_csv(table),
    }
}

pub fn export_xlsx(table: &[Appointment]) -> SchedulerResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }
    for (idx, appointment) in table.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, cell) in appointment.to_record().iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            // Cells stay text so IDs and dates round-trip unchanged
            worksheet.write_string(row, col as u16, *cell)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn export_csv(table: &[Appointment]) -> SchedulerResult<Vec<u8>> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(COLUMNS)
        .map_err(|e| SchedulerError::Export(e.to_string()))?;
    for appointment in table {
        wtr.write_record(appointment.to_record())
            .map_err(|e| SchedulerError::Export(e.to_string()))?;
    }
    wtr.into_inner()
        .map_err(|e| SchedulerError::Export(e.to_string()))
}

/// Writes the export next to wherever the caller wants it, picking the format
/// from the file extension.
pub fn export_table_to_path(table: &[Appointment], path: &Path) -> SchedulerResult<()> {
    let format = TabularFormat::from_path(path).ok_or_else(|| {
        SchedulerError::Export(format!("unsupported file type: {}", path.display()))
    })?;
    let bytes = export_table(table, format)?;
    std::fs::write(path, bytes)
        .map_err(|e| SchedulerError::Export(format!("{}: {}", path.display(), e)))
}
