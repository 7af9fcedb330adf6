//! Cell value types read from worksheet XML

use crate::XlsxFixture;
use pretty_assertions::assert_eq;
use sheetdoc_core::{CellError, CellValue};
use sheetdoc_xlsx::XlsxReader;

#[test]
fn test_shared_strings_and_numbers() {
    let bytes = XlsxFixture::new()
        .shared_strings(&["Item", "  padded  "])
        .sheet(
            "Data",
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>1234.5</v></c></row>
               <row r="2"><c r="A2" t="s"><v>1</v></c><c r="B2" t="n"><v>-7</v></c></row>"#,
        )
        .build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();
    let ws = wb.worksheet(0).unwrap();

    assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("Item"));
    assert_eq!(ws.get_value("A2").unwrap().as_string(), Some("  padded  "));
    assert_eq!(ws.get_value("B1").unwrap().as_number(), Some(1234.5));
    assert_eq!(ws.get_value("B2").unwrap().as_number(), Some(-7.0));
}

#[test]
fn test_booleans_errors_and_inline_strings() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Data",
            r#"<row r="1">
                 <c r="A1" t="b"><v>1</v></c>
                 <c r="B1" t="e"><v>#DIV/0!</v></c>
                 <c r="C1" t="inlineStr"><is><t>مرحبا</t></is></c>
               </row>"#,
        )
        .build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();
    let ws = wb.worksheet(0).unwrap();

    assert_eq!(ws.get_value("A1").unwrap(), CellValue::Boolean(true));
    assert_eq!(ws.get_value("B1").unwrap(), CellValue::Error(CellError::Div0));
    assert_eq!(ws.get_value("C1").unwrap().as_string(), Some("مرحبا"));
}

#[test]
fn test_formula_keeps_cached_value() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Data",
            r#"<row r="1"><c r="A1"><v>2</v></c><c r="B1"><v>3</v></c>
                 <c r="C1"><f>A1+B1</f><v>5</v></c>
                 <c r="D1" t="str"><f>"x"&amp;A1</f><v>x2</v></c>
                 <c r="E1"><f>A1*2</f></c></row>"#,
        )
        .build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();
    let ws = wb.worksheet(0).unwrap();

    let c1 = ws.get_value("C1").unwrap();
    assert!(matches!(&c1, CellValue::Formula { text, .. } if text == "=A1+B1"));
    assert_eq!(c1.effective_value().as_number(), Some(5.0));

    let d1 = ws.get_value("D1").unwrap();
    assert_eq!(d1.effective_value().as_string(), Some("x2"));

    // No cached result: the formula reads as empty
    assert!(ws.get_value("E1").unwrap().effective_value().is_empty());
}

#[test]
fn test_cells_without_references() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Data",
            r#"<row><c><v>1</v></c><c><v>2</v></c></row>
               <row><c><v>3</v></c><c r="D2"><v>4</v></c><c><v>5</v></c></row>"#,
        )
        .build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();
    let ws = wb.worksheet(0).unwrap();

    assert_eq!(ws.get_value("B1").unwrap().as_number(), Some(2.0));
    assert_eq!(ws.get_value("A2").unwrap().as_number(), Some(3.0));
    assert_eq!(ws.get_value("E2").unwrap().as_number(), Some(5.0));
}

#[test]
fn test_empty_cells_are_not_stored() {
    let bytes = XlsxFixture::new()
        .sheet(
            "Data",
            r#"<row r="1"><c r="A1"/><c r="B1"><v>1</v></c></row><row r="3"/>"#,
        )
        .build();

    let wb = XlsxReader::read_bytes(&bytes).unwrap();
    let ws = wb.worksheet(0).unwrap();

    assert!(ws.cell("A1").unwrap().is_none());
    assert_eq!(ws.max_row(), 1);
    assert_eq!(ws.used_range().unwrap().to_string(), "B1");
}

#[test]
fn test_bad_shared_string_index_is_an_error() {
    let bytes = XlsxFixture::new()
        .shared_strings(&["only"])
        .sheet("Data", r#"<row r="1"><c r="A1" t="s"><v>4</v></c></row>"#)
        .build();

    assert!(XlsxReader::read_bytes(&bytes).is_err());
}
