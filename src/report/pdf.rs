//! PDF rendering of month grids.
//!
//! Landscape A4, one section per month starting on a fresh page. Week rows
//! grow with the busiest day of the week; a row that no longer fits moves to
//! a continuation page that repeats the weekday header.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

use super::calendar::{DayCell, MonthGrid, WeekRow, WEEKDAY_LABELS};
use crate::error::{SchedulerError, SchedulerResult};

pub const PAGE_WIDTH: f32 = 842.0;
pub const PAGE_HEIGHT: f32 = 595.0;
pub const COLUMN_WIDTH: f32 = 110.0;
pub const HEADER_ROW_HEIGHT: f32 = 20.0;

const MARGIN: f32 = 36.0;
const TITLE_FONT_SIZE: f32 = 16.0;
const TITLE_SPACING: f32 = 10.0;
const CELL_FONT_SIZE: f32 = 9.0;
const CELL_LEADING: f32 = 11.0;
const CELL_PADDING: f32 = 3.0;
const GRID_LINE_WIDTH: f32 = 0.5;
const HEADER_GREY: f32 = 0.827;

/// Height of a week row holding at most `max_entries` bookings in one day
pub fn row_height(max_entries: usize) -> f32 {
    40.0 + 25.0 * max_entries as f32
}

fn table_left() -> f32 {
    (PAGE_WIDTH - COLUMN_WIDTH * 7.0) / 2.0
}

/// Tallest row a continuation page can hold under its header
fn max_row_height() -> f32 {
    PAGE_HEIGHT - 2.0 * MARGIN - HEADER_ROW_HEIGHT
}

/// Helvetica is used with WinAnsi encoding; characters outside Latin-1 print as '?'
fn pdf_text(text: &str) -> Object {
    let bytes: Vec<u8> = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    Object::string_literal(bytes)
}

/// Cuts text that would not fit in one column, using an average glyph width
fn fit_to_column(text: &str) -> String {
    let max_chars = ((COLUMN_WIDTH - 2.0 * CELL_PADDING) / (CELL_FONT_SIZE * 0.5)) as usize;
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Lines printed inside a day cell, limited to what a row of `height` can show
fn cell_lines(cell: &DayCell, height: f32) -> Vec<(String, bool)> {
    let Some(day) = cell.day() else {
        return Vec::new();
    };
    let mut lines = vec![(day.to_string(), true)];
    let entries = cell.entries();
    if entries.is_empty() {
        return lines;
    }

    let capacity = ((height - 2.0 * CELL_PADDING) / CELL_LEADING) as usize;
    // day number and a blank line, then name/time pairs
    let pairs_that_fit = capacity.saturating_sub(2) / 2;
    let shown = if entries.len() <= pairs_that_fit {
        entries.len()
    } else {
        pairs_that_fit.saturating_sub(1)
    };

    lines.push((String::new(), false));
    for entry in &entries[..shown] {
        lines.push((fit_to_column(&entry.name), false));
        lines.push((entry.time.clone(), false));
    }
    if shown < entries.len() {
        lines.push((format!("+{} more", entries.len() - shown), true));
    }
    lines
}

/// Accumulates drawing operations page by page
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    cursor: f32,
    rows_on_page: usize,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            cursor: PAGE_HEIGHT - MARGIN,
            rows_on_page: 0,
        }
    }

    fn new_page(&mut self) {
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.cursor = PAGE_HEIGHT - MARGIN;
        self.rows_on_page = 0;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.new_page();
        self.pages
    }

    fn text(&mut self, x: f32, y: f32, size: f32, bold: bool, text: &str) {
        let font = if bold { "F2" } else { "F1" };
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![pdf_text(text)]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill_grey: Option<f32>) {
        if let Some(grey) = fill_grey {
            self.current.extend([
                Operation::new("g", vec![grey.into()]),
                Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
                Operation::new("f", vec![]),
                Operation::new("g", vec![0.0f32.into()]),
            ]);
        }
        self.current.extend([
            Operation::new("w", vec![GRID_LINE_WIDTH.into()]),
            Operation::new("re", vec![x.into(), y.into(), width.into(), height.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn title(&mut self, title: &str) {
        self.cursor -= TITLE_FONT_SIZE;
        self.text(table_left(), self.cursor, TITLE_FONT_SIZE, true, title);
        self.cursor -= TITLE_SPACING;
    }

    fn header_row(&mut self) {
        let top = self.cursor;
        for (col, label) in WEEKDAY_LABELS.iter().enumerate() {
            let x = table_left() + col as f32 * COLUMN_WIDTH;
            self.rect(x, top - HEADER_ROW_HEIGHT, COLUMN_WIDTH, HEADER_ROW_HEIGHT, Some(HEADER_GREY));
            self.text(
                x + CELL_PADDING,
                top - CELL_PADDING - CELL_FONT_SIZE,
                CELL_FONT_SIZE,
                true,
                label,
            );
        }
        self.cursor -= HEADER_ROW_HEIGHT;
    }

    fn week_row(&mut self, week: &WeekRow) {
        let height = row_height(week.max_entries).min(max_row_height());
        if self.cursor - height < MARGIN && self.rows_on_page > 0 {
            self.new_page();
            self.header_row();
        }
        // A lone oversized row is squeezed into what is left of the page
        let height = height.min(self.cursor - MARGIN);

        let top = self.cursor;
        for (col, cell) in week.days.iter().enumerate() {
            let x = table_left() + col as f32 * COLUMN_WIDTH;
            self.rect(x, top - height, COLUMN_WIDTH, height, None);
            let mut baseline = top - CELL_PADDING - CELL_FONT_SIZE;
            for (line, bold) in cell_lines(cell, height) {
                if !line.is_empty() {
                    self.text(x + CELL_PADDING, baseline, CELL_FONT_SIZE, bold, &line);
                }
                baseline -= CELL_LEADING;
            }
        }
        self.cursor -= height;
        self.rows_on_page += 1;
    }

    fn month(&mut self, grid: &MonthGrid) {
        self.new_page();
        self.title(&grid.title());
        self.header_row();
        for week in &grid.weeks {
            self.week_row(week);
        }
    }
}

/// Renders the grids into a complete PDF document.
pub fn render_pdf(grids: &[MonthGrid]) -> SchedulerResult<Vec<u8>> {
    let mut writer = PageWriter::new();
    if grids.is_empty() {
        writer.title("No appointments to report");
    }
    for grid in grids {
        writer.month(grid);
    }
    let pages = writer.finish();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| SchedulerError::Report(e.to_string()))?;
    Ok(buffer)
}

pub fn write_pdf(grids: &[MonthGrid], path: &Path) -> SchedulerResult<()> {
    let bytes = render_pdf(grids)?;
    std::fs::write(path, bytes)
        .map_err(|e| SchedulerError::Report(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Appointment;
    use crate::report::calendar::build_month_grids;

    fn appt(name: &str, date: &str, time: &str) -> Appointment {
        Appointment {
            name: name.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            ..Appointment::default()
        }
    }

    fn page_count(bytes: &[u8]) -> usize {
        Document::load_mem(bytes).unwrap().get_pages().len()
    }

    #[test]
    fn one_page_per_month() {
        let grids = build_month_grids(&[
            appt("Ann", "2025-06-02", "11:00"),
            appt("Ben", "2025-07-03", "12:30"),
        ]);
        let bytes = render_pdf(&grids).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(page_count(&bytes), 2);
    }

    #[test]
    fn busy_month_continues_on_another_page() {
        let mut table = Vec::new();
        for day in [2, 9, 16, 23, 30] {
            for slot in 0..6 {
                table.push(appt("x", &format!("2025-06-{day:02}"), &format!("1{slot}:00")));
            }
        }
        let grids = build_month_grids(&table);
        // five rows of 190pt cannot share one landscape page
        assert_eq!(grids[0].weeks[0].max_entries, 6);
        assert!(page_count(&render_pdf(&grids).unwrap()) > 1);
    }

    #[test]
    fn empty_report_still_renders_a_page() {
        assert_eq!(page_count(&render_pdf(&[]).unwrap()), 1);
    }

    #[test]
    fn row_heights_grow_with_entries() {
        assert_eq!(row_height(0), 40.0);
        assert_eq!(row_height(3), 115.0);
    }

    #[test]
    fn oversized_cells_are_summarized() {
        let grids = build_month_grids(
            &(0..40)
                .map(|i| appt(&format!("p{i}"), "2025-06-02", "11:00"))
                .collect::<Vec<_>>(),
        );
        let cell = &grids[0].weeks[0].days[1];
        let lines = cell_lines(cell, max_row_height());
        assert_eq!(lines[0].0, "2");
        assert!(lines.last().unwrap().0.starts_with('+'));
        assert!((lines.len() as f32) * CELL_LEADING <= max_row_height());
    }

    #[test]
    fn long_names_are_shortened() {
        let long = "A".repeat(80);
        let fitted = fit_to_column(&long);
        assert!(fitted.ends_with("..."));
        assert!(fitted.len() < long.len());
        assert_eq!(fit_to_column("Ann"), "Ann");
    }
}
