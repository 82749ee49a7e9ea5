use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, info};
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use super::AppointmentStore;
use crate::error::{SchedulerError, SchedulerResult};
use crate::parser::{Appointment, Field, RawRow, RawValue, COLUMNS};

/// A spreadsheet kept as a CSV file: first line is the header row, every
/// following line one appointment. A missing or empty file is an empty store.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn has_content(&self) -> bool {
        fs::metadata(&self.path)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false)
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Field behind each column of the existing header row. Unknown columns map
    /// to `None` and are left empty on append.
    fn column_layout(&self) -> SchedulerResult<Vec<Option<Field>>> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.write_error(e))?;
        let headers = reader.headers().map_err(|e| self.write_error(e))?;
        Ok(headers.iter().map(Field::from_header).collect())
    }

    fn ends_with_newline(&self) -> SchedulerResult<bool> {
        let mut file = File::open(&self.path).map_err(|e| self.write_error(e))?;
        file.seek(SeekFrom::End(-1)).map_err(|e| self.write_error(e))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last).map_err(|e| self.write_error(e))?;
        Ok(last[0] == b'\n')
    }

    fn unavailable(&self, err: impl Display) -> SchedulerError {
        SchedulerError::StoreUnavailable(format!("{}: {}", self.path.display(), err))
    }

    fn write_error(&self, err: impl Display) -> SchedulerError {
        SchedulerError::StoreWrite(format!("{}: {}", self.path.display(), err))
    }
}

impl AppointmentStore for CsvStore {
    fn read_all(&mut self) -> SchedulerResult<Vec<RawRow>> {
        if !self.has_content() {
            debug!("store {} is empty", self.path.display());
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.unavailable(e))?;
        let headers = reader.headers().map_err(|e| self.unavailable(e))?.clone();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| self.unavailable(e))?;
            // Short records simply lack the trailing columns
            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(header, cell)| (header.to_string(), RawValue::from(cell)))
                .collect();
            rows.push(row);
        }

        debug!("read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn append_one(&mut self, appointment: &Appointment) -> SchedulerResult<()> {
        self.append_all(std::slice::from_ref(appointment))
    }

    fn append_all(&mut self, appointments: &[Appointment]) -> SchedulerResult<()> {
        let write_header = !self.has_content();
        let (layout, needs_terminator) = if write_header {
            fs::create_dir_all(self.parent_dir()).map_err(|e| self.write_error(e))?;
            (Field::ALL.map(Some).to_vec(), false)
        } else {
            (self.column_layout()?, !self.ends_with_newline()?)
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.write_error(e))?;
        // Hand-edited sheets may lack the final line break
        if needs_terminator {
            file.write_all(b"\n").map_err(|e| self.write_error(e))?;
        }
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);

        if write_header {
            wtr.write_record(COLUMNS).map_err(|e| self.write_error(e))?;
        }
        for appointment in appointments {
            let record = layout
                .iter()
                .map(|field| field.map_or("", |f| appointment.field(f)));
            wtr.write_record(record).map_err(|e| self.write_error(e))?;
        }
        wtr.flush().map_err(|e| self.write_error(e))?;

        info!("appended {} rows to {}", appointments.len(), self.path.display());
        Ok(())
    }

    fn replace_all(&mut self, appointments: &[Appointment]) -> SchedulerResult<()> {
        let dir = self.parent_dir().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| self.write_error(e))?;

        // Write the new snapshot beside the store, then swap it in.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| self.write_error(e))?;
        {
            let mut wtr = WriterBuilder::new().from_writer(tmp.as_file_mut());
            wtr.write_record(COLUMNS).map_err(|e| self.write_error(e))?;
            for appointment in appointments {
                wtr.write_record(appointment.to_record())
                    .map_err(|e| self.write_error(e))?;
            }
            wtr.flush().map_err(|e| self.write_error(e))?;
        }
        tmp.persist(&self.path).map_err(|e| self.write_error(e))?;

        info!("replaced {} with {} rows", self.path.display(), appointments.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::normalize_rows;

    fn appt(name: &str, date: &str, time: &str) -> Appointment {
        Appointment {
            name: name.to_string(),
            identifier: format!("id-{name}"),
            date: date.to_string(),
            time: time.to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(dir.path().join("nothing.csv"));
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("appointments.csv");
        let mut store = CsvStore::new(&path);

        store.append_one(&appt("Ann", "2025-06-01", "11:00")).unwrap();
        store.append_one(&appt("Ben", "2025-06-01", "11:30")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("name,identifier,date,time,notes").count(), 1);

        let table = normalize_rows(&store.read_all().unwrap());
        assert_eq!(
            table,
            vec![appt("Ann", "2025-06-01", "11:00"), appt("Ben", "2025-06-01", "11:30")]
        );
    }

    #[test]
    fn replace_overwrites_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CsvStore::new(dir.path().join("appointments.csv"));
        store.append_one(&appt("Old", "2025-01-01", "11:00")).unwrap();

        let fresh = vec![appt("New, Person", "2025-02-02", "12:00")];
        store.replace_all(&fresh).unwrap();

        assert_eq!(normalize_rows(&store.read_all().unwrap()), fresh);
    }

    #[test]
    fn short_rows_and_legacy_headers_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(&path, "Name,ID,Date,Time,Notes\nAnn,7,2025-06-01,14:00:00,hi\nBen\n").unwrap();

        let table = normalize_rows(&CsvStore::new(&path).read_all().unwrap());
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].identifier, "7");
        assert_eq!(table[0].time, "14:00");
        assert_eq!(table[1].name, "Ben");
        assert_eq!(table[1].date, "");
    }

    #[test]
    fn append_follows_the_existing_header_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reordered.csv");
        fs::write(&path, "Date,Time,Name,ID,Source,Notes\n2025-06-02,11:00,Ben,1,web,x\n").unwrap();

        let mut store = CsvStore::new(&path);
        let ann = Appointment {
            name: "Ann".to_string(),
            identifier: "7".to_string(),
            date: "2025-06-01".to_string(),
            time: "14:00".to_string(),
            notes: "hi".to_string(),
        };
        store.append_one(&ann).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("2025-06-01,14:00,Ann,7,,hi\n"));
        let table = normalize_rows(&store.read_all().unwrap());
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].name, "Ben");
        assert_eq!(table[1], ann);
    }

    #[test]
    fn append_after_a_missing_final_newline_starts_a_new_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edited.csv");
        fs::write(&path, "name,identifier,date,time,notes\nBen,1,2025-06-02,11:00,x").unwrap();

        let mut store = CsvStore::new(&path);
        store.append_one(&appt("Ann", "2025-06-01", "14:00")).unwrap();

        let table = normalize_rows(&store.read_all().unwrap());
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].notes, "x");
        assert_eq!(table[1], appt("Ann", "2025-06-01", "14:00"));
    }

    #[test]
    fn writing_into_a_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be
        let path = dir.path().join("store.csv");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("x"), "x").unwrap();

        let mut store = CsvStore::new(&path);
        let err = store.append_one(&appt("Ann", "2025-06-01", "11:00")).unwrap_err();
        assert!(matches!(err, SchedulerError::StoreWrite(_)));
    }
}
