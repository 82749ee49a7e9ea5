use crate::parser::Appointment;
use crate::report::{MonthGrid, WeekRow};
use crate::report::calendar::WEEKDAY_LABELS;

const TEXT_COLUMN_WIDTH: usize = 14;

/// Formats an attendee with their identifier, if any
pub fn format_attendee(name: &str, identifier: &str) -> String {
    if identifier.is_empty() {
        name.to_string()
    } else {
        format!("{} (ID: {})", name, identifier)
    }
}

/// Prints the working table, one row per line, prefixed with the row number
pub fn print_table(table: &[Appointment]) {
    if table.is_empty() {
        println!("No data yet.");
        return;
    }
    for (idx, appt) in table.iter().enumerate() {
        let when = match (appt.date.is_empty(), appt.time.is_empty()) {
            (false, false) => format!("{} {}", appt.date, appt.time),
            (false, true) => appt.date.clone(),
            _ => "[NO DATE]".to_string(),
        };
        let notes = if appt.notes.is_empty() {
            String::new()
        } else {
            format!("  // {}", appt.notes)
        };
        println!("{:>4}  {:<16}  {}{}", idx, when, format_attendee(&appt.name, &appt.identifier), notes);
    }
}

fn clip(text: &str) -> String {
    let clipped: String = text.chars().take(TEXT_COLUMN_WIDTH).collect();
    format!("{:<width$}", clipped, width = TEXT_COLUMN_WIDTH)
}

fn week_lines(week: &WeekRow) -> Vec<String> {
    // day number, then a name line and a time line per entry
    let height = 1 + week.max_entries * 2;
    (0..height)
        .map(|line| {
            week.days
                .iter()
                .map(|cell| {
                    let text = match (line, cell.day()) {
                        (_, None) => String::new(),
                        (0, Some(day)) => day.to_string(),
                        (n, Some(_)) => cell
                            .entries()
                            .get((n - 1) / 2)
                            .map(|e| if n % 2 == 1 { e.name.clone() } else { e.time.clone() })
                            .unwrap_or_default(),
                    };
                    clip(&text)
                })
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect()
}

/// Plain-text rendering of a month grid for terminals
pub fn render_month_text(grid: &MonthGrid) -> String {
    let rule = vec!["-".repeat(TEXT_COLUMN_WIDTH); 7].join("+");
    let mut out = Vec::new();
    out.push(format!("** {} **", grid.title()));
    out.push(WEEKDAY_LABELS.iter().map(|l| clip(l)).collect::<Vec<_>>().join("|"));
    out.push(rule.clone());
    for week in &grid.weeks {
        out.extend(week_lines(week));
        out.push(rule.clone());
    }
    out.join("\n")
}

pub fn print_calendar(grids: &[MonthGrid]) {
    if grids.is_empty() {
        println!("No schedulable appointments.");
        return;
    }
    for grid in grids {
        println!("{}\n", render_month_text(grid));
    }
}
