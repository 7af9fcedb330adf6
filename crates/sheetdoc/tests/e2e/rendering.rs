//! Full renders from zipped inputs

use crate::{body_texts, docx, paragraph, text_cell, XlsxFixture};
use pretty_assertions::assert_eq;
use sheetdoc::{
    Block, DocumentAssembler, DocxPackage, EntryOutcome, MappingSet, RenderOptions, Table,
};
use sheetdoc_docx::{Border, ParagraphChild};

const STYLES: &str = r##"
  <numFmts count="1">
    <numFmt numFmtId="164" formatCode="#,##0.00"/>
  </numFmts>
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><name val="Calibri"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0"/>
    <xf numFmtId="164" fontId="1" fillId="0"/>
    <xf numFmtId="0" fontId="1" fillId="0"/>
  </cellXfs>
"##;

fn workbook() -> Vec<u8> {
    let data = format!(
        r#"<row r="1">{}{}</row>
           <row r="2">{}<c r="B2"><v>5</v></c></row>
           <row r="3">{}<c r="B3"><v>7</v></c></row>"#,
        text_cell("A1", "Item"),
        text_cell("B1", "Qty"),
        text_cell("A2", "Tea"),
        text_cell("A3", "Coffee"),
    );
    let totals = format!(
        r#"<row r="1">{}<c r="B1" s="1"><v>1234.5</v></c></row>"#,
        text_cell("A1", "Total"),
    );
    let rtl = format!(
        r#"<row r="1">{}{}</row>"#,
        text_cell("A1", "الإجمالي"),
        text_cell("C1", "100"),
    );
    XlsxFixture::new()
        .styles(STYLES)
        .sheet("Data", &data)
        .sheet("Totals", &totals)
        .sheet("Arabic", &rtl)
        .build()
}

fn render(template_body: &str, mapping: &str) -> (DocxPackage, Vec<(String, EntryOutcome)>) {
    let mapping = MappingSet::from_json(mapping).unwrap();
    let (bytes, report) = DocumentAssembler::new(RenderOptions::default().with_default_sheet("Data"))
        .render_with_report(&docx(template_body), &workbook(), &mapping)
        .unwrap();
    (DocxPackage::read_bytes(&bytes).unwrap(), report.outcomes)
}

fn only_table(package: &DocxPackage) -> &Table {
    let mut tables = package.document().tables();
    let table = tables.next().expect("one table");
    assert!(tables.next().is_none());
    table
}

fn row_texts(table: &Table) -> Vec<Vec<String>> {
    table
        .rows()
        .map(|r| r.cells().map(|c| c.text()).collect())
        .collect()
}

#[test]
fn test_text_and_table() {
    let body = format!(
        "{}{}{}",
        paragraph(&["Prepared for {{NA", "ME}}."]),
        paragraph(&["{{TABLE}}"]),
        paragraph(&["Thanks"]),
    );
    let (package, outcomes) = render(
        &body,
        r#"{ "NAME": "Acme Ltd", "TABLE": { "sheet": "Data", "range": "A1:B" } }"#,
    );

    assert_eq!(
        outcomes,
        vec![
            ("{{NAME}}".to_string(), EntryOutcome::Filled),
            ("{{TABLE}}".to_string(), EntryOutcome::Filled),
        ]
    );
    assert_eq!(
        body_texts(&package),
        vec!["Prepared for Acme Ltd.", "", "<table>", "Thanks"]
    );
    assert_eq!(
        row_texts(only_table(&package)),
        vec![vec!["Item", "Qty"], vec!["Tea", "5"], vec!["Coffee", "7"]]
    );
}

#[test]
fn test_cell_reference_text() {
    let (package, _) = render(
        &paragraph(&["Total: {{SUM}} / {{FIRST}}"]),
        r#"{ "SUM": { "sheet": "Totals", "value": "B1", "type": "text" }, "FIRST": "Data!A2" }"#,
    );
    assert_eq!(body_texts(&package), vec!["Total: 1,234.50 / Tea"]);
}

#[test]
fn test_rendering_is_deterministic() {
    let mapping =
        MappingSet::from_json(r#"{ "NAME": "A2", "TABLE": { "range": "A1:B3" } }"#).unwrap();
    let template = docx(&paragraph(&["{{NAME}} {{TABLE}}"]));
    let workbook = workbook();
    let assembler = DocumentAssembler::new(RenderOptions::default().with_default_sheet("Data"));

    let first = assembler.render(&template, &workbook, &mapping).unwrap();
    let second = assembler.render(&template, &workbook, &mapping).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_column_range() {
    let (package, outcomes) = render(
        &paragraph(&["Before {{T}} after"]),
        r#"{ "T": { "range": "Q:Q" } }"#,
    );
    assert_eq!(outcomes[0].1, EntryOutcome::Empty);
    assert_eq!(body_texts(&package), vec!["Before  after"]);
    assert!(package.document().tables().next().is_none());
}

#[test]
fn test_bold_totals_get_rules() {
    let (package, _) = render(
        &paragraph(&["{{T}}"]),
        r#"{ "T": { "sheet": "Totals", "range": "A1:B1" } }"#,
    );
    let table = only_table(&package);
    assert_eq!(row_texts(table), vec![vec!["Total", "1,234.50"]]);

    let cells: Vec<_> = table.rows().next().unwrap().cells().collect();
    let borders = cells[1].borders().unwrap();
    assert_eq!(borders.top, Some(Border::single(6, "000000")));
    assert_eq!(borders.bottom, Some(Border::single(6, "000000")));
    assert_eq!(cells[0].borders().unwrap().top, Some(Border::nil()));
}

#[test]
fn test_rtl_range_is_mirrored() {
    let (package, _) = render(
        &paragraph(&["{{T}}"]),
        r#"{ "T": { "sheet": "Arabic", "range": "A1:C1", "dropEmptyCells": false } }"#,
    );
    let table = only_table(&package);
    let cells: Vec<_> = table.rows().next().unwrap().cells().collect();

    assert_eq!(cells.len(), 2);
    assert_eq!(cells[0].text(), "100");
    assert_eq!(cells[1].text(), "الإجمالي");
    assert_eq!(cells[1].grid_span(), 2);
    assert!(cells[1].paragraphs().all(|p| p.is_bidi()));
}

#[test]
fn test_per_row_tables_and_plain_text() {
    let body = format!("{}{}", paragraph(&["{{ROWS}}"]), paragraph(&["{{LINES}}"]));
    let (package, _) = render(
        &body,
        r#"{
            "ROWS": { "range": "A2:B3", "mode": "perRowTable" },
            "LINES": { "range": "A2:B3", "type": "text", "style": { "bold": true } }
        }"#,
    );

    let blocks: Vec<&str> = package
        .document()
        .body
        .iter()
        .map(|b| match b {
            Block::Table(_) => "table",
            Block::Paragraph(_) => "p",
            Block::Other(_) => "other",
        })
        .collect();
    assert_eq!(blocks, vec!["p", "table", "p", "table", "p", "p", "p", "p"]);

    let texts = body_texts(&package);
    assert_eq!(texts[6], "Tea    5");
    assert_eq!(texts[7], "Coffee    7");
    let line = package.document().paragraphs().nth(4).unwrap();
    assert!(line.runs().all(|r| r.is_bold()));
}

#[test]
fn test_report_lists_failures() {
    let (package, outcomes) = render(
        &paragraph(&["{{BAD}}"]),
        r#"{ "BAD": { "range": "1A:B2" }, "GHOST": "x" }"#,
    );
    assert!(matches!(outcomes[0].1, EntryOutcome::Failed(_)));
    assert!(matches!(outcomes[1].1, EntryOutcome::Failed(_)));
    let texts = body_texts(&package);
    assert_eq!(
        texts[1..],
        [
            "⚠️ Invalid range '1A:B2' for {{BAD}}".to_string(),
            "⚠️ Tag {{GHOST}} not found in template.".to_string(),
        ]
    );
}

#[test]
fn test_tags_inside_wrappers_are_left_alone() {
    let body = concat!(
        r#"<w:p><w:r><w:t xml:space="preserve">See </w:t></w:r>"#,
        r#"<w:hyperlink w:anchor="top"><w:r><w:t>{{NAME}}</w:t></w:r></w:hyperlink>"#,
        r#"<w:ins w:id="1" w:author="x"><w:r><w:t>{{NAME}}</w:t></w:r></w:ins></w:p>"#,
    );
    let (package, outcomes) = render(body, r#"{ "NAME": "Acme" }"#);

    assert!(matches!(outcomes[0].1, EntryOutcome::Failed(_)));
    let first = package.document().paragraphs().next().unwrap();
    assert_eq!(first.text(), "See ");
    let wrapped: Vec<(String, String)> = first
        .children
        .iter()
        .filter_map(|c| match c {
            ParagraphChild::Other(e) => Some((e.local_name().to_string(), e.text())),
            ParagraphChild::Run(_) => None,
        })
        .collect();
    assert_eq!(
        wrapped,
        vec![
            ("hyperlink".to_string(), "{{NAME}}".to_string()),
            ("ins".to_string(), "{{NAME}}".to_string()),
        ]
    );
}
