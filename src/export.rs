//! High-level orchestration: document in, export artifact out.
//!
//! These functions compose the XML reader, the flattener, the sheet builder
//! and the workbook writer. The file-based entry points are thin wrappers so
//! HTTP callers and tests can work with in-memory data directly.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use roxmltree::Document;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::flatten;
use crate::io::{excel_write, xml_read};
use crate::model::{StatEntry, Target, TimelinePoint};
use crate::sheets;

/// Exports a statistics XML file as a styled workbook file.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn xml_to_excel(input: &Path, output: &Path) -> Result<()> {
    let source = fs::read_to_string(input)?;
    let package = export_document(&source)?;
    fs::write(output, package)?;
    Ok(())
}

/// Builds the workbook package bytes for one statistics document.
pub fn export_document(xml: &str) -> Result<Vec<u8>> {
    let doc = Document::parse(xml)?;
    let summary = xml_read::document_summary(&doc)?;
    let total = xml_read::total_statistics(&doc)?;
    let entries = flatten::parse_statistics(total)?;
    info!(entry_count = entries.len(), "flattened statistics tree");

    let workbook = sheets::build_workbook(&summary, &entries);
    debug!(sheet_count = workbook.tables.len(), "workbook tables constructed");
    excel_write::build_package(&workbook)
}

/// Flattens one statistics document into its full record stream.
pub fn flatten_document(xml: &str) -> Result<Vec<StatEntry>> {
    let doc = Document::parse(xml)?;
    let total = xml_read::total_statistics(&doc)?;
    flatten::parse_statistics(total)
}

/// Dumps the flattened record stream of a statistics XML file as pretty JSON.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn records_to_json(input: &Path, output: &Path) -> Result<()> {
    let source = fs::read_to_string(input)?;
    let entries = flatten_document(&source)?;
    info!(entry_count = entries.len(), "flattened statistics tree");
    fs::write(output, serde_json::to_string_pretty(&entries)?)?;
    Ok(())
}

/// Extracts the dashboard time series from one statistics document: the
/// aggregate records at year and month level, pinned to calendar dates.
/// Records whose period fields do not form a valid date are skipped.
pub fn timeline(xml: &str) -> Result<Vec<TimelinePoint>> {
    let entries = flatten_document(xml)?;
    let points = entries
        .iter()
        .filter(|entry| entry.target == Target::Stats)
        .filter(|entry| entry.level == "YearStatistics" || entry.level == "MonthStatistics")
        .filter_map(|entry| {
            let date = NaiveDate::from_ymd_opt(
                entry.period.year?,
                entry.period.month.unwrap_or(1) as u32,
                entry.period.day.unwrap_or(1) as u32,
            )?;
            Some(TimelinePoint {
                date,
                count: entry.count,
                level: entry.level.clone(),
            })
        })
        .collect();
    Ok(points)
}

/// Writes the dashboard time series of a statistics XML file as JSON.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn timeline_to_json(input: &Path, output: &Path) -> Result<()> {
    let source = fs::read_to_string(input)?;
    let points = timeline(&source)?;
    info!(point_count = points.len(), "timeline extracted");
    fs::write(output, serde_json::to_string_pretty(&points)?)?;
    Ok(())
}
