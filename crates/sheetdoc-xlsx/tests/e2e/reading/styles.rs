//! Cell formats resolved through styles.xml

use crate::XlsxFixture;
use sheetdoc_core::{DateTimeKind, HorizontalAlignment, NumberFormat};
use sheetdoc_xlsx::XlsxReader;

const STYLES: &str = r##"
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="d\-mmm\-yyyy"/>
    <numFmt numFmtId="165" formatCode="#,##0.00 &quot;EGP&quot;"/>
  </numFmts>
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="12"/><color rgb="FF1F4E79"/><name val="Arial"/></font>
  </fonts>
  <fills count="3">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFD9E1F2"/></patternFill></fill>
  </fills>
  <cellXfs count="5">
    <xf numFmtId="0" fontId="0" fillId="0"/>
    <xf numFmtId="165" fontId="1" fillId="2"><alignment horizontal="right"/></xf>
    <xf numFmtId="164" fontId="0" fillId="0"/>
    <xf numFmtId="10" fontId="0" fillId="0"/>
    <xf numFmtId="22" fontId="0" fillId="0"><alignment horizontal="center" wrapText="1"/></xf>
  </cellXfs>
"##;

fn read() -> sheetdoc_core::Workbook {
    let bytes = XlsxFixture::new()
        .styles(STYLES)
        .sheet(
            "Data",
            r#"<row r="1">
                 <c r="A1" s="1"><v>1234.5</v></c>
                 <c r="B1" s="2"><v>45838</v></c>
                 <c r="C1" s="3"><v>0.125</v></c>
                 <c r="D1" s="4"><v>45838.75</v></c>
                 <c r="E1"><v>9</v></c>
               </row>
               <row r="2"><c r="A2" s="1"/></row>"#,
        )
        .build();
    XlsxReader::read_bytes(&bytes).unwrap()
}

#[test]
fn test_font_fill_and_alignment() {
    let wb = read();
    let ws = wb.worksheet(0).unwrap();

    let style = ws.cell_style_at(0, 0);
    assert!(style.font.bold);
    assert_eq!(style.font.name, "Arial");
    assert_eq!(style.font.size, 12.0);
    assert_eq!(style.font.color.to_rgb_hex().as_deref(), Some("1F4E79"));
    assert_eq!(
        style.fill.solid_color().and_then(|c| c.to_rgb_hex()).as_deref(),
        Some("D9E1F2")
    );
    assert_eq!(style.alignment.horizontal, HorizontalAlignment::Right);

    let plain = ws.cell_style_at(0, 4);
    assert!(!plain.font.bold);
    assert!(plain.fill.is_none());
}

#[test]
fn test_number_formats() {
    let wb = read();
    let ws = wb.worksheet(0).unwrap();

    assert_eq!(
        ws.cell_style_at(0, 0).number_format,
        NumberFormat::Custom("#,##0.00 \"EGP\"".to_string())
    );
    assert_eq!(
        ws.cell_style_at(0, 1).number_format.date_time_kind(),
        Some(DateTimeKind::Date)
    );
    assert!(ws.cell_style_at(0, 2).number_format.is_percent());

    let date_time = ws.cell_style_at(0, 3);
    assert_eq!(
        date_time.number_format.date_time_kind(),
        Some(DateTimeKind::DateTime)
    );
    assert!(date_time.alignment.wrap_text);
    assert!(date_time.alignment.horizontal.is_centered());
}

#[test]
fn test_styled_empty_cell_is_kept() {
    let wb = read();
    let ws = wb.worksheet(0).unwrap();

    let cell = ws.cell("A2").unwrap().expect("styled cell is stored");
    assert!(cell.value.is_empty());
    assert!(ws.cell_style_at(1, 0).font.bold);
}
