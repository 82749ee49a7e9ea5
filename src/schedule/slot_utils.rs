use crate::error::{SchedulerError, SchedulerResult};

/// Parses a time string (HH:MM) to minutes since midnight
pub fn parse_time_to_minutes(time_str: &str) -> Option<u32> {
    let (hours, minutes) = time_str.trim().split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours >= 24 || minutes >= 60 {
        return None;
    }
    Some(hours * 60 + minutes)
}

/// Formats minutes since midnight to time string (HH:MM)
pub fn minutes_to_time_string(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    format!("{:02}:{:02}", hours % 24, mins)
}

/// Bookable slots from `start_time` to `end_time` inclusive, every
/// `interval_minutes`. Both bounds must fall on the same day.
pub fn calculate_time_slots(
    start_time: &str,
    end_time: &str,
    interval_minutes: u32,
) -> SchedulerResult<Vec<String>> {
    let start = parse_time_to_minutes(start_time)
        .ok_or_else(|| SchedulerError::Config(format!("invalid slot start time '{start_time}'")))?;
    let end = parse_time_to_minutes(end_time)
        .ok_or_else(|| SchedulerError::Config(format!("invalid slot end time '{end_time}'")))?;

    if interval_minutes == 0 {
        return Err(SchedulerError::Config("slot interval must be positive".to_string()));
    }
    if end < start {
        return Err(SchedulerError::Config(format!(
            "slot end {end_time} is before slot start {start_time}"
        )));
    }

    Ok((start..=end)
        .step_by(interval_minutes as usize)
        .map(minutes_to_time_string)
        .collect())
}
