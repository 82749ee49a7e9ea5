use clap::Args;
use std::path::PathBuf;

use crate::error::SchedulerResult;
use crate::schedule::calculate_time_slots;

/// Settings shared by every command. Each can also come from the environment.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// CSV file holding the appointment sheet
    #[arg(long, env = "SCHEDULER_STORE", default_value = "data/appointments.csv", global = true)]
    pub store: PathBuf,

    /// Max appointments per date/time slot (0 = unlimited)
    #[arg(long, env = "SCHEDULER_SLOT_LIMIT", default_value_t = 0, global = true)]
    pub slot_limit: u32,

    /// First bookable time of day
    #[arg(long, env = "SCHEDULER_SLOT_START", default_value = "11:00", global = true)]
    pub slot_start: String,

    /// Last bookable time of day (inclusive)
    #[arg(long, env = "SCHEDULER_SLOT_END", default_value = "21:00", global = true)]
    pub slot_end: String,

    /// Minutes between bookable times
    #[arg(long, env = "SCHEDULER_SLOT_INTERVAL", default_value_t = 30, global = true)]
    pub slot_interval: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: PathBuf::from("data/appointments.csv"),
            slot_limit: 0,
            slot_start: "11:00".to_string(),
            slot_end: "21:00".to_string(),
            slot_interval: 30,
        }
    }
}

impl Config {
    /// Times offered by the add form
    pub fn time_slots(&self) -> SchedulerResult<Vec<String>> {
        calculate_time_slots(&self.slot_start, &self.slot_end, self.slot_interval)
    }

    /// Rejects settings that would leave nothing bookable
    pub fn validate(&self) -> SchedulerResult<()> {
        self.time_slots().map(|_| ())
    }
}
