//! Interview scheduling over a spreadsheet-style appointment store.
//!
//! Raw rows are normalized into [`parser::Appointment`] records at the store
//! boundary; everything past that point works on the typed working table held
//! by a [`session::Session`].

pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod parser;
pub mod report;
pub mod schedule;
pub mod session;
pub mod store;
pub mod web;

pub use error::{SchedulerError, SchedulerResult};
pub use parser::Appointment;
pub use session::Session;
