pub mod types;
pub mod slot_utils;
pub mod capacity;

pub use types::SlotDecision;
pub use slot_utils::calculate_time_slots;
pub use capacity::{check_slot, count_in_slot};
