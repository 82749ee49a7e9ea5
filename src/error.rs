//! Error types shared by the store, session and presentation layers.

use thiserror::Error;

/// Every failure a user action can end in.
///
/// None of these are fatal to the process: the session and its working table
/// stay usable after any single failure.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Connectivity or access failure while reading the store.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Append or replace against the store failed.
    #[error("store write failed: {0}")]
    StoreWrite(String),

    /// Required field or import column missing, rejected before any store call.
    #[error("{0}")]
    Validation(String),

    #[error("slot full ({count}/{limit})")]
    CapacityExceeded { count: usize, limit: u32 },

    /// The uploaded tabular file could not be read at all.
    #[error("import failed: {0}")]
    Import(String),

    #[error("report rendering failed: {0}")]
    Report(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// A blocking task was cancelled or panicked before returning.
    #[error("background task failed: {0}")]
    Worker(String),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;

impl From<rust_xlsxwriter::XlsxError> for SchedulerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        SchedulerError::Export(err.to_string())
    }
}

impl From<lopdf::Error> for SchedulerError {
    fn from(err: lopdf::Error) -> Self {
        SchedulerError::Report(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_shows_count_and_limit() {
        let err = SchedulerError::CapacityExceeded { count: 2, limit: 2 };
        assert_eq!(err.to_string(), "slot full (2/2)");
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = SchedulerError::Validation("Name is required".to_string());
        assert_eq!(err.to_string(), "Name is required");
    }
}
