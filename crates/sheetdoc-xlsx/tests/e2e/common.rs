//! Common utilities for E2E tests.

use std::io::{Cursor, Write};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// In-memory XLSX package builder.
///
/// Sheets are given as the inner XML of `<sheetData>`.
#[derive(Default)]
pub struct XlsxFixture {
    sheets: Vec<(String, String)>,
    shared_strings: Vec<String>,
    styles: Option<String>,
    hidden: Vec<usize>,
    active_tab: Option<usize>,
    date_1904: bool,
}

impl XlsxFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(mut self, name: &str, sheet_data: &str) -> Self {
        self.sheets.push((name.to_string(), sheet_data.to_string()));
        self
    }

    pub fn hidden_sheet(mut self, name: &str, sheet_data: &str) -> Self {
        self.hidden.push(self.sheets.len());
        self.sheet(name, sheet_data)
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = strings.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Inner XML of `<styleSheet>`
    pub fn styles(mut self, inner: &str) -> Self {
        self.styles = Some(inner.to_string());
        self
    }

    pub fn active_tab(mut self, index: usize) -> Self {
        self.active_tab = Some(index);
        self
    }

    pub fn date_1904(mut self) -> Self {
        self.date_1904 = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            let mut put = |name: &str, body: String| {
                zip.start_file(name, options).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            };

            put(
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#.to_string(),
            );

            let mut sheets = String::new();
            let mut rels = String::new();
            for (i, (name, _)) in self.sheets.iter().enumerate() {
                let state = if self.hidden.contains(&i) {
                    r#" state="hidden""#
                } else {
                    ""
                };
                sheets.push_str(&format!(
                    r#"<sheet name="{}" sheetId="{}"{} r:id="rId{}"/>"#,
                    name,
                    i + 1,
                    state,
                    i + 1
                ));
                rels.push_str(&format!(
                    r#"<Relationship Id="rId{}" Type="{}/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                    i + 1,
                    REL_NS,
                    i + 1
                ));
            }
            let pr = if self.date_1904 {
                r#"<workbookPr date1904="1"/>"#
            } else {
                ""
            };
            let views = match self.active_tab {
                Some(tab) => format!(
                    r#"<bookViews><workbookView activeTab="{}"/></bookViews>"#,
                    tab
                ),
                None => String::new(),
            };
            put(
                "xl/workbook.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{}" xmlns:r="{}">{}{}<sheets>{}</sheets></workbook>"#,
                    MAIN_NS, REL_NS, pr, views, sheets
                ),
            );
            put(
                "xl/_rels/workbook.xml.rels",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                    rels
                ),
            );

            if !self.shared_strings.is_empty() {
                let items: String = self
                    .shared_strings
                    .iter()
                    .map(|s| format!(r#"<si><t xml:space="preserve">{}</t></si>"#, s))
                    .collect();
                put(
                    "xl/sharedStrings.xml",
                    format!(r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="{}">{}</sst>"#, MAIN_NS, items),
                );
            }

            if let Some(styles) = &self.styles {
                put(
                    "xl/styles.xml",
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="{}">{}</styleSheet>"#,
                        MAIN_NS, styles
                    ),
                );
            }

            for (i, (_, data)) in self.sheets.iter().enumerate() {
                put(
                    &format!("xl/worksheets/sheet{}.xml", i + 1),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{}"><sheetData>{}</sheetData></worksheet>"#,
                        MAIN_NS, data
                    ),
                );
            }

            zip.finish().unwrap();
        }
        buf
    }
}
