//! Assembles the four named tables materialised in the export workbook.
//!
//! Each hierarchy table is an independent filter-and-project pass over the
//! single flattened record stream; nothing here aggregates or reorders, so
//! rows appear exactly in flattener emission order.

use crate::model::{DocumentSummary, EntityCount, SheetTable, StatEntry, Target, WorkbookData};

/// Key/value summary sheet.
pub const TOTAL_STATS_SHEET: &str = "TotalStats";
/// Per-user records across all recursive levels.
pub const USER_HIERARCHY_SHEET: &str = "UserHierarchy";
/// Per-user-group records across all recursive levels.
pub const USER_GROUP_HIERARCHY_SHEET: &str = "UserGroupHierarchy";
/// Aggregate records across all recursive levels.
pub const STATS_HIERARCHY_SHEET: &str = "StatsHierarchy";

const PERIOD_HEADERS: [&str; 6] = ["Year", "Half Year", "Quarter", "Month", "Week", "Day"];

/// Builds all export tables in sheet order from the flattened record stream
/// and the document's top-level summary fields.
pub fn build_workbook(summary: &DocumentSummary, entries: &[StatEntry]) -> WorkbookData {
    WorkbookData {
        tables: vec![
            total_stats_table(summary),
            hierarchy_table(USER_HIERARCHY_SHEET, Some("User ID"), Target::User, entries),
            hierarchy_table(
                USER_GROUP_HIERARCHY_SHEET,
                Some("User Group ID"),
                Target::UserGroup,
                entries,
            ),
            hierarchy_table(STATS_HIERARCHY_SHEET, None, Target::Stats, entries),
        ],
    }
}

/// Key/value rows for the document header, then the top-level aggregate
/// node's own user and user-group pairs, separated by blank rows.
fn total_stats_table(summary: &DocumentSummary) -> SheetTable {
    let mut rows = vec![
        string_row(&["Field", "Value"]),
        vec!["System Name".to_string(), summary.system_name.clone()],
        vec![
            "System Version".to_string(),
            format!("v_{}", summary.system_version),
        ],
        vec!["Start Date".to_string(), summary.start_date.clone()],
        vec![
            "Total Login Count".to_string(),
            summary.total_count.to_string(),
        ],
        blank_row(),
        string_row(&["User ID", "Total Login Count"]),
    ];
    rows.extend(summary.users.iter().map(entity_row));
    rows.push(blank_row());
    rows.push(string_row(&["User Group ID", "Total Login Count"]));
    rows.extend(summary.groups.iter().map(entity_row));

    SheetTable {
        name: TOTAL_STATS_SHEET.to_string(),
        rows,
    }
}

fn hierarchy_table(
    name: &str,
    id_header: Option<&str>,
    target: Target,
    entries: &[StatEntry],
) -> SheetTable {
    let mut header = vec!["Level".to_string()];
    header.extend(PERIOD_HEADERS.iter().map(|h| h.to_string()));
    if let Some(id) = id_header {
        header.push(id.to_string());
    }
    header.push("Login Count".to_string());

    let mut rows = vec![header];
    for entry in entries.iter().filter(|entry| entry.target == target) {
        let mut row = vec![entry.level.clone()];
        row.extend(entry.period.as_fields().iter().map(|field| period_cell(*field)));
        if id_header.is_some() {
            row.push(entry.id.clone());
        }
        row.push(entry.count.to_string());
        rows.push(row);
    }

    SheetTable {
        name: name.to_string(),
        rows,
    }
}

fn period_cell(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn entity_row(entity: &EntityCount) -> Vec<String> {
    vec![entity.id.clone(), entity.count.to_string()]
}

fn blank_row() -> Vec<String> {
    vec![String::new(), String::new()]
}

fn string_row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}
