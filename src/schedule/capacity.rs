use crate::parser::Appointment;
use super::types::SlotDecision;

/// Decides whether one more appointment fits into the (`date`, `time`) slot.
///
/// `limit == 0` means unlimited. The count is taken from the working table as
/// last synced, not from a lock on the store, so two writers can both pass
/// the check before either appends.
pub fn check_slot(table: &[Appointment], date: &str, time: &str, limit: u32) -> SlotDecision {
    if limit == 0 {
        return SlotDecision::Accept;
    }

    let count = count_in_slot(table, date, time);
    if count < limit as usize {
        SlotDecision::Accept
    } else {
        SlotDecision::Reject { count, limit }
    }
}

/// Number of records booked at exactly this date and time (canonical strings)
pub fn count_in_slot(table: &[Appointment], date: &str, time: &str) -> usize {
    table
        .iter()
        .filter(|a| a.date == date && a.time == time)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booked(name: &str, date: &str, time: &str) -> Appointment {
        Appointment {
            name: name.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            ..Appointment::default()
        }
    }

    #[test]
    fn zero_limit_is_unlimited() {
        let table: Vec<_> = (0..50)
            .map(|i| booked(&format!("p{i}"), "2025-06-01", "14:00"))
            .collect();
        assert_eq!(check_slot(&table, "2025-06-01", "14:00", 0), SlotDecision::Accept);
    }

    #[test]
    fn full_slot_is_rejected_with_count() {
        let table = vec![
            booked("a", "2025-06-01", "14:00"),
            booked("b", "2025-06-01", "14:00"),
            booked("c", "2025-06-02", "14:00"),
        ];
        assert_eq!(
            check_slot(&table, "2025-06-01", "14:00", 2),
            SlotDecision::Reject { count: 2, limit: 2 }
        );
        assert_eq!(check_slot(&table, "2025-06-01", "14:30", 2), SlotDecision::Accept);
        assert_eq!(check_slot(&table, "2025-06-01", "14:00", 3), SlotDecision::Accept);
    }

    #[test]
    fn empty_table_accepts() {
        assert!(check_slot(&[], "2025-06-01", "11:00", 1).is_accepted());
    }

    #[test]
    fn reject_converts_to_capacity_error() {
        let err = SlotDecision::Reject { count: 3, limit: 3 }
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "slot full (3/3)");
    }
}
