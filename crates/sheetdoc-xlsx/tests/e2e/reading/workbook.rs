//! Workbook-level facts: sheet order, active tab, date system

use crate::XlsxFixture;
use pretty_assertions::assert_eq;
use sheetdoc_xlsx::{XlsxError, XlsxReader};
use std::io::Write;

#[test]
fn test_sheet_order_and_active_tab() {
    let bytes = XlsxFixture::new()
        .sheet("Summary", r#"<row r="1"><c r="A1"><v>1</v></c></row>"#)
        .sheet("الميزانية", r#"<row r="2"><c r="B2"><v>2</v></c></row>"#)
        .active_tab(1)
        .build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();

    assert_eq!(wb.sheet_names(), vec!["Summary", "الميزانية"]);
    assert_eq!(wb.active_sheet(), 1);
    let active = wb.active_worksheet().unwrap();
    assert_eq!(active.get_value("B2").unwrap().as_number(), Some(2.0));
    assert!(!wb.settings().date_1904);
}

#[test]
fn test_active_tab_defaults_to_first_sheet() {
    let bytes = XlsxFixture::new()
        .sheet("One", "")
        .sheet("Two", "")
        .build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();
    assert_eq!(wb.active_sheet(), 0);
    assert!(wb.worksheet(1).unwrap().used_range().is_none());
}

#[test]
fn test_hidden_sheets_are_flagged() {
    let bytes = XlsxFixture::new()
        .sheet("Report", "")
        .hidden_sheet("Lookup", r#"<row r="1"><c r="A1"><v>3</v></c></row>"#)
        .build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();
    assert_eq!(wb.sheet_names(), vec!["Report", "Lookup"]);
    assert!(wb.worksheet(0).unwrap().is_visible());
    let lookup = wb.worksheet_by_name("Lookup").unwrap();
    assert!(!lookup.is_visible());
    assert_eq!(lookup.get_value("A1").unwrap().as_number(), Some(3.0));
}

#[test]
fn test_date_1904_flag() {
    let bytes = XlsxFixture::new().sheet("Data", "").date_1904().build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();
    assert!(wb.settings().date_1904);
}

#[test]
fn test_read_from_file() {
    let bytes = XlsxFixture::new()
        .sheet("Data", r#"<row r="1"><c r="A1"><v>42</v></c></row>"#)
        .build();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let wb = XlsxReader::read_file(file.path()).unwrap();
    assert_eq!(
        wb.worksheet(0).unwrap().get_value("A1").unwrap().as_number(),
        Some(42.0)
    );
}

#[test]
fn test_garbage_bytes_are_rejected() {
    let err = XlsxReader::read_bytes(b"definitely not a zip").unwrap_err();
    assert!(matches!(err, XlsxError::Zip(_)));
}
