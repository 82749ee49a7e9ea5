use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SchedulerError, SchedulerResult};
use crate::parser::{normalize_date, normalize_time, Appointment};

/// New appointment as entered in the add form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentRequest {
    pub name: String,
    pub identifier: String,
    pub date: String,
    pub time: String,
    pub notes: String,
}

/// Validates a new appointment and returns it in canonical form.
///
/// Appointments cannot be booked before `today`.
pub fn validate_submission(req: &AppointmentRequest, today: NaiveDate) -> SchedulerResult<Appointment> {
    if req.name.trim().is_empty() {
        return Err(SchedulerError::Validation("Name is required".to_string()));
    }

    let date = normalize_date(&req.date);
    if date.is_empty() {
        return Err(SchedulerError::Validation(format!("Invalid date: '{}'", req.date)));
    }
    if date < today.format("%Y-%m-%d").to_string() {
        return Err(SchedulerError::Validation(format!("Date {} is in the past", date)));
    }

    let time = normalize_time(&req.time);
    if time.is_empty() {
        return Err(SchedulerError::Validation(format!("Invalid time: '{}'", req.time)));
    }

    Ok(Appointment {
        name: req.name.clone(),
        identifier: req.identifier.clone(),
        date,
        time,
        notes: req.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn request(name: &str, date: &str, time: &str) -> AppointmentRequest {
        AppointmentRequest {
            name: name.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            ..AppointmentRequest::default()
        }
    }

    #[test]
    fn accepts_and_canonicalizes() {
        let appt = validate_submission(&request("Ann", "06/01/2025", "14:00:00"), today()).unwrap();
        assert_eq!(appt.date, "2025-06-01");
        assert_eq!(appt.time, "14:00");
    }

    #[test]
    fn name_is_required() {
        let err = validate_submission(&request("   ", "2025-06-01", "14:00"), today()).unwrap_err();
        assert!(matches!(err, SchedulerError::Validation(ref m) if m == "Name is required"));
    }

    #[test]
    fn rejects_bad_date_and_time() {
        assert!(validate_submission(&request("Ann", "soon", "14:00"), today()).is_err());
        assert!(validate_submission(&request("Ann", "2025-06-01", "late"), today()).is_err());
    }

    #[test]
    fn today_is_allowed_but_yesterday_is_not() {
        assert!(validate_submission(&request("Ann", "2025-05-20", "11:00"), today()).is_ok());
        assert!(validate_submission(&request("Ann", "2025-05-19", "11:00"), today()).is_err());
    }
}
