//! The working table and the operations that change it.
//!
//! A `Session` owns the store for one interactive user. Every successful
//! operation leaves the table equal to what the store holds; a failed one
//! leaves it untouched.

use chrono::NaiveDate;
use log::{info, warn};

use crate::error::{SchedulerError, SchedulerResult};
use crate::form::{validate_submission, AppointmentRequest, ImportTable};
use crate::parser::{normalize_appointments, normalize_rows, Appointment, Field};
use crate::schedule::check_slot;
use crate::store::AppointmentStore;

pub struct Session {
    store: Box<dyn AppointmentStore + Send>,
    table: Vec<Appointment>,
    revision: u64,
}

impl Session {
    /// Starts with an empty table; call `reload` to fetch the store's contents.
    pub fn new(store: impl AppointmentStore + Send + 'static) -> Self {
        Self {
            store: Box::new(store),
            table: Vec::new(),
            revision: 0,
        }
    }

    /// Opens a session and performs the initial load. A failed load is logged
    /// and leaves the table empty; the error is returned alongside.
    pub fn open(store: impl AppointmentStore + Send + 'static) -> (Self, Option<SchedulerError>) {
        let mut session = Self::new(store);
        let err = session.reload().err();
        if let Some(ref e) = err {
            warn!("initial load failed: {}", e);
        }
        (session, err)
    }

    pub fn table(&self) -> &[Appointment] {
        &self.table
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Bumped whenever the table is replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn set_table(&mut self, table: Vec<Appointment>) {
        self.table = table;
        self.revision += 1;
    }

    /// Re-reads the whole store into the working table.
    pub fn reload(&mut self) -> SchedulerResult<&[Appointment]> {
        let rows = self.store.read_all()?;
        self.set_table(normalize_rows(&rows));
        info!("loaded {} appointments (revision {})", self.table.len(), self.revision);
        Ok(&self.table)
    }

    /// Books a new appointment.
    ///
    /// The request is validated and checked against `limit` bookings per slot
    /// (0 = unlimited) before anything is written; the table is re-read after
    /// the append.
    pub fn append(
        &mut self,
        request: &AppointmentRequest,
        limit: u32,
        today: NaiveDate,
    ) -> SchedulerResult<Appointment> {
        let appointment = validate_submission(request, today)?;
        check_slot(&self.table, &appointment.date, &appointment.time, limit).into_result()?;

        self.store.append_one(&appointment)?;
        info!(
            "booked {} at {} {}",
            appointment.name, appointment.date, appointment.time
        );
        self.reload()?;
        Ok(appointment)
    }

    /// Overwrites the store with an edited snapshot of the table.
    pub fn replace(&mut self, records: &[Appointment]) -> SchedulerResult<&[Appointment]> {
        let snapshot = normalize_appointments(records);
        self.store.replace_all(&snapshot)?;
        info!("saved {} appointments", snapshot.len());
        self.set_table(snapshot);
        Ok(&self.table)
    }

    /// Appends every row of an imported file, in file order, without merging.
    /// Returns how many rows were appended.
    pub fn import(&mut self, imported: &ImportTable) -> SchedulerResult<usize> {
        imported.require_column(Field::Name)?;

        let rows = normalize_rows(&imported.rows);
        self.store.append_all(&rows)?;
        info!("imported {} rows", rows.len());
        self.reload()?;
        Ok(rows.len())
    }
}
