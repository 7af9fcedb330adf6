//! Common utilities for E2E tests.

use std::io::{Cursor, Write};

use sheetdoc::{Block, DocxPackage};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn zip_parts(parts: &[(String, String)]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in parts {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buf
}

/// In-memory XLSX package builder.
///
/// Sheets are given as the inner XML of `<sheetData>`; strings are inline.
#[derive(Default)]
pub struct XlsxFixture {
    sheets: Vec<(String, String)>,
    styles: Option<String>,
}

impl XlsxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, name: &str, sheet_data: &str) -> Self {
        self.sheets.push((name.to_string(), sheet_data.to_string()));
        self
    }

    /// Inner XML of `<styleSheet>`
    pub fn styles(mut self, inner: &str) -> Self {
        self.styles = Some(inner.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut sheets = String::new();
        let mut rels = String::new();
        for (i, (name, _)) in self.sheets.iter().enumerate() {
            sheets.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                name,
                i + 1,
                i + 1
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i + 1,
                REL_NS,
                i + 1
            ));
        }

        let mut parts = vec![
            (
                "[Content_Types].xml".to_string(),
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#.to_string(),
            ),
            (
                "xl/workbook.xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{}" xmlns:r="{}"><sheets>{}</sheets></workbook>"#,
                    MAIN_NS, REL_NS, sheets
                ),
            ),
            (
                "xl/_rels/workbook.xml.rels".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                    rels
                ),
            ),
        ];
        if let Some(styles) = &self.styles {
            parts.push((
                "xl/styles.xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="{}">{}</styleSheet>"#,
                    MAIN_NS, styles
                ),
            ));
        }
        for (i, (_, data)) in self.sheets.iter().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", i + 1),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{}"><sheetData>{}</sheetData></worksheet>"#,
                    MAIN_NS, data
                ),
            ));
        }
        zip_parts(&parts)
    }
}

/// An inline string cell
pub fn text_cell(reference: &str, text: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        reference, text
    )
}

/// Minimal DOCX whose body is the given WordprocessingML
pub fn docx(body: &str) -> Vec<u8> {
    zip_parts(&[
        (
            "[Content_Types].xml".to_string(),
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="{}/officeDocument" Target="word/document.xml"/></Relationships>"#,
                REL_NS
            ),
        ),
        (
            "word/document.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
                W_NS, body
            ),
        ),
    ])
}

/// A paragraph with one run per fragment
pub fn paragraph(fragments: &[&str]) -> String {
    let runs: String = fragments
        .iter()
        .map(|f| format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, f))
        .collect();
    format!("<w:p>{}</w:p>", runs)
}

/// Body block summaries: paragraph text, or `<table>`
pub fn body_texts(package: &DocxPackage) -> Vec<String> {
    package
        .document()
        .body
        .iter()
        .filter_map(|b| match b {
            Block::Paragraph(p) => Some(p.text()),
            Block::Table(_) => Some("<table>".to_string()),
            Block::Other(_) => None,
        })
        .collect()
}
