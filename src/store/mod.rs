//! The appointment store: the single durable copy of every record.
//!
//! The core only relies on three operations. Implementations are blocking and
//! are never called concurrently; the session serializes access.

pub mod csv_store;
pub mod memory;

pub use csv_store::CsvStore;
pub use memory::MemoryStore;

use crate::error::SchedulerResult;
use crate::parser::{Appointment, RawRow};

pub trait AppointmentStore {
    /// Every data row in store order, keyed by the header row.
    /// Fails with `StoreUnavailable`.
    fn read_all(&mut self) -> SchedulerResult<Vec<RawRow>>;

    /// Appends one row in header order. Fails with `StoreWrite`.
    fn append_one(&mut self, appointment: &Appointment) -> SchedulerResult<()>;

    /// Clears the store and rewrites it, header row first. Fails with `StoreWrite`.
    fn replace_all(&mut self, appointments: &[Appointment]) -> SchedulerResult<()>;

    /// Appends several rows in order. Stores that can write a batch in one
    /// operation should override this.
    fn append_all(&mut self, appointments: &[Appointment]) -> SchedulerResult<()> {
        for appointment in appointments {
            self.append_one(appointment)?;
        }
        Ok(())
    }
}

impl<S: AppointmentStore + ?Sized> AppointmentStore for Box<S> {
    fn read_all(&mut self) -> SchedulerResult<Vec<RawRow>> {
        (**self).read_all()
    }

    fn append_one(&mut self, appointment: &Appointment) -> SchedulerResult<()> {
        (**self).append_one(appointment)
    }

    fn replace_all(&mut self, appointments: &[Appointment]) -> SchedulerResult<()> {
        (**self).replace_all(appointments)
    }

    fn append_all(&mut self, appointments: &[Appointment]) -> SchedulerResult<()> {
        (**self).append_all(appointments)
    }
}
