//! Workbook package assembly.
//!
//! Turns [`WorkbookData`] into the bytes of a complete `.xlsx` package: one
//! worksheet per table, a fixed three-entry style set, type-inferred body
//! cells, computed column widths, a frozen header row, and a header-row
//! autofilter. Output is deterministic for identical input; the document
//! properties carry a fixed creation timestamp so repeated exports of the
//! same document compare byte-identical.

use chrono::{NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatBorder, Workbook, Worksheet,
};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::model::{SheetTable, WorkbookData};

/// Upper bound on a computed column width.
const MAX_COLUMN_WIDTH: usize = 60;
/// Padding added to the longest cell before clamping.
const WIDTH_PADDING: usize = 4;
/// Light blue header fill.
const HEADER_FILL: Color = Color::RGB(0xDDEBF7);

/// Closed set of cell styles used by the writer. The workbook carries
/// exactly these three formats; styles are always addressed through this
/// enum, never by raw index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Default,
    Header,
    Body,
}

/// Fixed style-definition table built once per workbook.
struct StyleTable {
    default: Format,
    header: Format,
    body: Format,
}

impl StyleTable {
    fn new() -> Self {
        Self {
            default: Format::new(),
            header: Format::new()
                .set_bold()
                .set_background_color(HEADER_FILL)
                .set_border(FormatBorder::Thin),
            body: Format::new().set_border(FormatBorder::Thin),
        }
    }

    fn get(&self, style: CellStyle) -> &Format {
        match style {
            CellStyle::Default => &self.default,
            CellStyle::Header => &self.header,
            CellStyle::Body => &self.body,
        }
    }
}

/// A body cell after type inference.
#[derive(Debug, Clone, PartialEq)]
pub enum InferredCell {
    Text(String),
    Number(f64),
}

/// Builds the workbook package for the given tables, in their given order.
///
/// Every table must carry at least a header row; the width and autofilter
/// logic have nothing to work with otherwise and the table is rejected with
/// [`ExportError::EmptyTable`].
pub fn build_package(data: &WorkbookData) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    workbook.set_properties(
        &DocProperties::new().set_creation_datetime(&ExcelDateTime::from_ymd(2024, 1, 1)?),
    );

    let styles = StyleTable::new();
    for table in &data.tables {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;
        write_sheet(worksheet, table, &styles)?;
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_sheet(worksheet: &mut Worksheet, table: &SheetTable, styles: &StyleTable) -> Result<()> {
    let header = table
        .rows
        .first()
        .ok_or_else(|| ExportError::EmptyTable(table.name.clone()))?;

    for (col, text) in header.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, text, styles.get(CellStyle::Header))?;
    }

    let body = styles.get(CellStyle::Body);
    for (row_index, row) in table.rows.iter().enumerate().skip(1) {
        for (col, raw) in row.iter().enumerate() {
            match infer_cell(raw) {
                InferredCell::Text(text) => {
                    worksheet.write_string_with_format(row_index as u32, col as u16, &text, body)?;
                }
                InferredCell::Number(number) => {
                    worksheet.write_number_with_format(row_index as u32, col as u16, number, body)?;
                }
            }
        }
    }

    for col in 0..header.len() {
        worksheet.set_column_width(col as u16, column_width(table, col))?;
    }

    // Keep row 1 visible while scrolling; the active pane sits below the split.
    worksheet.set_freeze_panes(1, 0)?;

    apply_autofilter(worksheet, &table.name, header.len())?;

    Ok(())
}

/// Anchors the autofilter to the header row, `A1:{last}1`. A sheet without
/// columns gets no filter; that is skipped silently rather than treated as
/// an error.
fn apply_autofilter(worksheet: &mut Worksheet, sheet: &str, column_count: usize) -> Result<()> {
    let Some((last_column, range)) = filter_range(column_count) else {
        debug!(sheet, "no columns, skipping autofilter");
        return Ok(());
    };

    debug!(sheet, %range, "anchoring header autofilter");
    worksheet.autofilter(0, 0, 0, last_column)?;
    Ok(())
}

/// The header filter anchor for a column count: the zero-based last column
/// passed to the writer and the equivalent `A1`-style range, derived from
/// the same count so the two cannot disagree.
fn filter_range(column_count: usize) -> Option<(u16, String)> {
    let last_column = column_count.checked_sub(1)?;
    let range = format!("A1:{}1", column_letter(column_count as u32));
    Some((last_column as u16, range))
}

/// Uniform width for one column: the longest cell (header included) plus
/// padding, clamped to [`MAX_COLUMN_WIDTH`].
fn column_width(table: &SheetTable, column: usize) -> f64 {
    let longest = table
        .rows
        .iter()
        .map(|row| row[column].chars().count())
        .max()
        .unwrap_or(0);
    (longest + WIDTH_PADDING).min(MAX_COLUMN_WIDTH) as f64
}

/// Infers the cell representation of a raw string value.
///
/// Empty or whitespace-only input becomes an empty string cell. Date-like
/// values are normalised to `yyyy-MM-dd` but deliberately re-emitted as
/// string cells, not native date cells, so readers see text instead of a
/// date serial. Numeric values become number cells and everything else
/// falls back to a string cell unchanged.
pub fn infer_cell(raw: &str) -> InferredCell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return InferredCell::Text(String::new());
    }
    if let Some(date) = parse_date(trimmed) {
        return InferredCell::Text(date.format("%Y-%m-%d").to_string());
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return InferredCell::Number(number);
    }
    InferredCell::Text(raw.to_string())
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

fn parse_date(value: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// Spreadsheet column letter for a 1-based column number: 1 -> A, 26 -> Z,
/// 27 -> AA. Bijective base-26; zero is not a valid input.
pub fn column_letter(mut column: u32) -> String {
    let mut name = String::new();
    while column > 0 {
        column -= 1;
        name.insert(0, char::from(b'A' + (column % 26) as u8));
        column /= 26;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, rows: Vec<Vec<&str>>) -> SheetTable {
        SheetTable {
            name: name.to_string(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        }
    }

    #[test]
    fn column_letters_follow_bijective_base_26() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(702), "ZZ");
        assert_eq!(column_letter(703), "AAA");
    }

    #[test]
    fn filter_anchor_and_range_agree() {
        assert_eq!(filter_range(0), None);
        assert_eq!(filter_range(1), Some((0, "A1:A1".to_string())));
        assert_eq!(filter_range(9), Some((8, "A1:I1".to_string())));
        assert_eq!(filter_range(27), Some((26, "A1:AA1".to_string())));
    }

    #[test]
    fn width_is_longest_cell_plus_padding() {
        let table = table("T", vec![vec!["Header"], vec!["longer cell text"]]);
        assert_eq!(column_width(&table, 0), 20.0);
    }

    #[test]
    fn width_is_clamped_at_sixty() {
        let long = "x".repeat(100);
        let table = table("T", vec![vec!["H"], vec![long.as_str()]]);
        assert_eq!(column_width(&table, 0), 60.0);
    }

    #[test]
    fn infers_dates_as_formatted_strings() {
        assert_eq!(
            infer_cell("2024-01-15"),
            InferredCell::Text("2024-01-15".to_string())
        );
        assert_eq!(
            infer_cell("15.01.2024"),
            InferredCell::Text("2024-01-15".to_string())
        );
        assert_eq!(
            infer_cell("2024-01-15T08:30:00"),
            InferredCell::Text("2024-01-15".to_string())
        );
    }

    #[test]
    fn infers_numbers_and_falls_back_to_strings() {
        assert_eq!(infer_cell("42.5"), InferredCell::Number(42.5));
        assert_eq!(infer_cell("2024"), InferredCell::Number(2024.0));
        assert_eq!(infer_cell(""), InferredCell::Text(String::new()));
        assert_eq!(infer_cell("   "), InferredCell::Text(String::new()));
        assert_eq!(infer_cell("abc"), InferredCell::Text("abc".to_string()));
    }

    #[test]
    fn empty_table_is_rejected() {
        let data = WorkbookData {
            tables: vec![SheetTable {
                name: "Empty".to_string(),
                rows: Vec::new(),
            }],
        };
        let error = build_package(&data).unwrap_err();

        match error {
            ExportError::EmptyTable(name) => assert_eq!(name, "Empty"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn identical_input_produces_identical_bytes() {
        let data = WorkbookData {
            tables: vec![table(
                "Sheet1",
                vec![vec!["A", "B"], vec!["1", "2024-01-15"], vec!["x", ""]],
            )],
        };
        let first = build_package(&data).expect("first package");
        let second = build_package(&data).expect("second package");
        assert_eq!(first, second);
    }
}
