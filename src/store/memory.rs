use log::debug;

use super::AppointmentStore;
use crate::error::{SchedulerError, SchedulerResult};
use crate::parser::{Appointment, RawRow};

/// In-process store for tests and throwaway sessions.
///
/// Reads and writes can be made to fail to exercise the session's error paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub(crate) rows: Vec<RawRow>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw rows, exactly as a spreadsheet might hold them
    pub fn with_rows(rows: Vec<RawRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_writable(&self) -> SchedulerResult<()> {
        if self.fail_writes {
            return Err(SchedulerError::StoreWrite("memory store rejected the write".to_string()));
        }
        Ok(())
    }
}

impl AppointmentStore for MemoryStore {
    fn read_all(&mut self) -> SchedulerResult<Vec<RawRow>> {
        if self.fail_reads {
            return Err(SchedulerError::StoreUnavailable("memory store is offline".to_string()));
        }
        Ok(self.rows.clone())
    }

    fn append_one(&mut self, appointment: &Appointment) -> SchedulerResult<()> {
        self.check_writable()?;
        self.rows.push(appointment.to_raw_row());
        debug!("memory store now holds {} rows", self.rows.len());
        Ok(())
    }

    fn append_all(&mut self, appointments: &[Appointment]) -> SchedulerResult<()> {
        // All or nothing, like a single batch request
        self.check_writable()?;
        self.rows.extend(appointments.iter().map(Appointment::to_raw_row));
        Ok(())
    }

    fn replace_all(&mut self, appointments: &[Appointment]) -> SchedulerResult<()> {
        self.check_writable()?;
        self.rows = appointments.iter().map(Appointment::to_raw_row).collect();
        Ok(())
    }
}
