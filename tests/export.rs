use std::fs;
use std::io::{Cursor, Read};

use calamine::{DataType, Reader, Xlsx, open_workbook};
use loginstat_tools::export;
use loginstat_tools::io::excel_write::column_letter;
use loginstat_tools::sheets::{
    STATS_HIERARCHY_SHEET, TOTAL_STATS_SHEET, USER_GROUP_HIERARCHY_SHEET, USER_HIERARCHY_SHEET,
};
use tempfile::tempdir;
use zip::ZipArchive;

const DOCUMENT: &str = r#"
    <StatisticsExport SystemName="GOBENCH" SystemVersion="12.4.1">
      <LoginStatistics StartDate="2024-01-01">
        <TotalStatistics type="GOBENCH.Users.UserStatistics.YearStatistics" Year="2024" Count="100">
          <Users>
            <GOBENCH.Users.UserStatistics.UserInfo ID="u1" Count="40"/>
            <GOBENCH.Users.UserStatistics.UserInfo ID="u2" Count="60"/>
          </Users>
        </TotalStatistics>
      </LoginStatistics>
    </StatisticsExport>"#;

fn sheet_range(package: &[u8], name: &str) -> calamine::Range<DataType> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(package.to_vec())).expect("package opens as xlsx");
    workbook
        .worksheet_range(name)
        .expect("sheet exists")
        .expect("sheet range reads")
}

#[test]
fn single_year_node_exports_expected_package() {
    let package = export::export_document(DOCUMENT).expect("package built");

    // One Stats record at year level.
    let stats = sheet_range(&package, STATS_HIERARCHY_SHEET);
    let rows: Vec<_> = stats.rows().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0].get_string(), Some("Level"));
    assert_eq!(rows[1][0].get_string(), Some("YearStatistics"));
    assert_eq!(rows[1][1].get_float(), Some(2024.0));
    assert_eq!(rows[1][7].get_float(), Some(100.0));

    // Two user records, both inheriting Year=2024.
    let users = sheet_range(&package, USER_HIERARCHY_SHEET);
    let rows: Vec<_> = users.rows().collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][7].get_string(), Some("User ID"));
    for (row, id, count) in [(&rows[1], "u1", 40.0), (&rows[2], "u2", 60.0)] {
        assert_eq!(row[0].get_string(), Some("YearStatistics"));
        assert_eq!(row[1].get_float(), Some(2024.0));
        assert_eq!(row[7].get_string(), Some(id));
        assert_eq!(row[8].get_float(), Some(count));
    }

    // No user groups anywhere: header row only.
    let groups = sheet_range(&package, USER_GROUP_HIERARCHY_SHEET);
    assert_eq!(groups.rows().count(), 1);
}

#[test]
fn total_stats_sheet_carries_summary_and_sub_tables() {
    let package = export::export_document(DOCUMENT).expect("package built");
    let total = sheet_range(&package, TOTAL_STATS_SHEET);
    let rows: Vec<_> = total.rows().collect();

    assert_eq!(rows[0][0].get_string(), Some("Field"));
    assert_eq!(rows[1][1].get_string(), Some("GOBENCH"));
    assert_eq!(rows[2][1].get_string(), Some("v_12.4.1"));
    // The start date survives inference as an ISO-formatted string cell.
    assert_eq!(rows[3][1].get_string(), Some("2024-01-01"));
    assert_eq!(rows[4][1].get_float(), Some(100.0));
    assert_eq!(rows[6][0].get_string(), Some("User ID"));
    assert_eq!(rows[7][0].get_string(), Some("u1"));
    assert_eq!(rows[8][1].get_float(), Some(60.0));
}

#[test]
fn export_writes_workbook_with_sheets_in_fixed_order() {
    let temp_dir = tempdir().expect("temporary directory");
    let xml_path = temp_dir.path().join("stats.xml");
    let xlsx_path = temp_dir.path().join("stats.xlsx");
    fs::write(&xml_path, DOCUMENT).expect("XML input written");

    export::xml_to_excel(&xml_path, &xlsx_path).expect("workbook exported");

    let workbook: Xlsx<_> = open_workbook(&xlsx_path).expect("workbook opens");
    assert_eq!(
        workbook.sheet_names(),
        &[
            TOTAL_STATS_SHEET.to_string(),
            USER_HIERARCHY_SHEET.to_string(),
            USER_GROUP_HIERARCHY_SHEET.to_string(),
            STATS_HIERARCHY_SHEET.to_string(),
        ]
    );
}

#[test]
fn sheets_carry_frozen_header_row_and_header_autofilter() {
    let package = export::export_document(DOCUMENT).expect("package built");
    let mut archive = ZipArchive::new(Cursor::new(package)).expect("package opens as zip");

    // Second sheet part is UserHierarchy, nine columns wide.
    let mut sheet_xml = String::new();
    archive
        .by_name("xl/worksheets/sheet2.xml")
        .expect("sheet part exists")
        .read_to_string(&mut sheet_xml)
        .expect("sheet part reads");

    // Pane split directly below row 1, frozen, active pane underneath.
    assert!(sheet_xml.contains(r#"ySplit="1""#), "missing pane split: {sheet_xml}");
    assert!(sheet_xml.contains(r#"topLeftCell="A2""#), "missing pane anchor: {sheet_xml}");
    assert!(sheet_xml.contains(r#"state="frozen""#), "pane not frozen: {sheet_xml}");

    // Filter anchored to the full header row.
    let filter = format!(r#"<autoFilter ref="A1:{}1"/>"#, column_letter(9));
    assert!(sheet_xml.contains(&filter), "missing autofilter range: {sheet_xml}");
}

#[test]
fn identical_documents_export_identical_bytes() {
    let first = export::export_document(DOCUMENT).expect("first package");
    let second = export::export_document(DOCUMENT).expect("second package");
    assert_eq!(first, second);
}

#[test]
fn records_dump_serialises_the_full_stream() {
    let temp_dir = tempdir().expect("temporary directory");
    let xml_path = temp_dir.path().join("stats.xml");
    let json_path = temp_dir.path().join("records.json");
    fs::write(&xml_path, DOCUMENT).expect("XML input written");

    export::records_to_json(&xml_path, &json_path).expect("records dumped");

    let written = fs::read_to_string(&json_path).expect("JSON file read");
    let parsed: serde_json::Value = serde_json::from_str(&written).expect("JSON parsed");
    let records = parsed.as_array().expect("array of records");

    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["target"], "Stats");
    assert_eq!(records[0]["level"], "YearStatistics");
    assert_eq!(records[0]["year"], 2024);
    assert_eq!(records[1]["target"], "User");
    assert_eq!(records[1]["id"], "u1");
    assert_eq!(records[1]["count"], 40);
}

#[test]
fn structurally_broken_document_is_rejected() {
    let missing_count = r#"
        <StatisticsExport SystemName="s" SystemVersion="1">
          <LoginStatistics StartDate="2024-01-01">
            <TotalStatistics type="X.YearStatistics" Year="2024"/>
          </LoginStatistics>
        </StatisticsExport>"#;
    let error = export::export_document(missing_count).unwrap_err();
    assert!(error.to_string().contains("Count"));
}
