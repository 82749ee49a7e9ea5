pub mod submission;
pub mod import;
pub mod export;

pub use submission::{validate_submission, AppointmentRequest};
pub use import::{read_table, read_table_from_path, ImportTable, TabularFormat};
pub use export::{export_table, export_table_to_path};
