use chrono::NaiveDate;
use serde::Serialize;

/// Logical table a flattened record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Target {
    /// Aggregate count of the period node itself.
    Stats,
    /// Per-user count attached to a period node.
    User,
    /// Per-user-group count attached to a period node.
    UserGroup,
}

/// The six optional time-period fields inherited down the statistics tree.
///
/// The context is passed by value into each recursive call: a node's own
/// attributes override the inherited values for that node and everything
/// below it, and nothing is ever passed back up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodContext {
    pub year: Option<i32>,
    pub half_year: Option<i32>,
    pub quarter: Option<i32>,
    pub month: Option<i32>,
    pub week: Option<i32>,
    pub day: Option<i32>,
}

impl PeriodContext {
    /// Returns the period fields in coarse-to-fine order, matching the
    /// hierarchy sheet column layout.
    pub fn as_fields(&self) -> [Option<i32>; 6] {
        [
            self.year,
            self.half_year,
            self.quarter,
            self.month,
            self.week,
            self.day,
        ]
    }
}

/// One flattened statistics record. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatEntry {
    /// Category name, the final dotted segment of the node's `type` attribute.
    pub level: String,
    /// Inherited or overridden time-period values in effect at the node.
    #[serde(flatten)]
    pub period: PeriodContext,
    /// Entity identifier; empty for aggregate records.
    pub id: String,
    /// Login count read from the node's required `Count` attribute.
    pub count: i64,
    /// Which logical table the record belongs to.
    pub target: Target,
}

/// An `(id, count)` pair listed directly under the top-level aggregate node.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCount {
    pub id: String,
    pub count: i64,
}

/// Top-level document fields consumed by the summary sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub system_name: String,
    pub system_version: String,
    pub start_date: String,
    pub total_count: i64,
    /// Per-user pairs from the top-level aggregate node only.
    pub users: Vec<EntityCount>,
    /// Per-user-group pairs from the top-level aggregate node only.
    pub groups: Vec<EntityCount>,
}

/// A table that will be materialised as an Excel sheet. `rows[0]` is the
/// header row; every other row must have the same cell count.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Number of columns, taken from the header row.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Represents all tables required to materialise the Excel workbook, in
/// sheet order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookData {
    pub tables: Vec<SheetTable>,
}

/// One point of the dashboard time series: an aggregate count pinned to a
/// calendar date derived from the record's period fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub count: i64,
    pub level: String,
}
