use serde::Serialize;

use crate::error::SchedulerError;

/// Outcome of checking a proposed (date, time) slot against its capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SlotDecision {
    Accept,
    /// Slot already holds `count` appointments out of `limit`
    Reject { count: usize, limit: u32 },
}

impl SlotDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SlotDecision::Accept)
    }

    pub fn into_result(self) -> Result<(), SchedulerError> {
        match self {
            SlotDecision::Accept => Ok(()),
            SlotDecision::Reject { count, limit } => {
                Err(SchedulerError::CapacityExceeded { count, limit })
            }
        }
    }
}
