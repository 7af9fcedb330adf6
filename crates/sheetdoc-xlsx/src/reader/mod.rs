//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use log::debug;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{attr_value, read_styles_xml};
use sheetdoc_core::style::Style;
use sheetdoc_core::{CellAddress, CellError, CellValue, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel uses this format to encode special characters in XML:
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Sheet entry from workbook.xml
#[derive(Debug)]
struct SheetEntry {
    name: String,
    r_id: String,
    hidden: bool,
}

/// Workbook-level facts from workbook.xml
#[derive(Debug, Default)]
struct WorkbookInfo {
    sheets: Vec<SheetEntry>,
    active_tab: usize,
    date_1904: bool,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from an in-memory byte buffer
    pub fn read_bytes(bytes: &[u8]) -> XlsxResult<Workbook> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an OOXML package
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_styles = Self::read_styles(&mut archive)?;
        let info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = info.date_1904;

        for entry in &info.sheets {
            let Some(path) = sheet_paths.get(&entry.r_id) else {
                debug!("sheet '{}' has no worksheet part, skipping", entry.name);
                continue;
            };
            let mut worksheet = Worksheet::new(entry.name.as_str());
            worksheet.set_visible(!entry.hidden);
            Self::read_worksheet(
                &mut archive,
                path,
                &mut worksheet,
                &shared_strings,
                &cell_styles,
            )?;
            workbook.add_existing_worksheet(worksheet)?;
        }

        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat("workbook has no sheets".into()));
        }
        if info.active_tab < workbook.sheet_count() {
            workbook.set_active_sheet(info.active_tab)?;
        }

        debug!(
            "read workbook with {} sheet(s), {} shared string(s), {} style(s)",
            workbook.sheet_count(),
            shared_strings.len(),
            cell_styles.len()
        );
        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        // Leading and trailing spaces of strings are significant
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        // Phonetic runs (<rPh>) hold reading hints, not cell text
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::CData(e)) if in_t => {
                    current_string.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Vec<Style>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(vec![Style::default()]),
        }
    }

    /// Read workbook.xml for sheet names, rIds, the active tab and the date system
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        if let (Some(name), Some(r_id)) =
                            (attr_value(&e, b"name"), attr_value(&e, b"r:id"))
                        {
                            let hidden = matches!(
                                attr_value(&e, b"state").as_deref(),
                                Some("hidden") | Some("veryHidden")
                            );
                            info.sheets.push(SheetEntry { name, r_id, hidden });
                        }
                    }
                    b"workbookView" => {
                        info.active_tab = attr_value(&e, b"activeTab")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0);
                    }
                    b"workbookPr" => {
                        info.date_1904 = matches!(
                            attr_value(&e, b"date1904").as_deref(),
                            Some("1") | Some("true")
                        );
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    // Only include worksheet relationships
                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            rels.insert(id, resolve_part_path(&target));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read a worksheet from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
        cell_styles: &[Style],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();

        // Position tracking for cells written without an `r` attribute
        let mut row_idx: u32 = 0;
        let mut next_col: u16 = 0;

        let mut cell = PendingCell::default();
        let mut in_cell = false;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_str = false;
        let mut in_inline_text = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(r) = attr_value(&e, b"r").and_then(|s| s.parse::<u32>().ok())
                        {
                            row_idx = r.saturating_sub(1);
                        }
                        next_col = 0;
                    }
                    b"c" => {
                        in_cell = true;
                        cell = PendingCell::from_attrs(&e, row_idx, next_col)?;
                    }
                    b"v" if in_cell => in_value = true,
                    b"f" if in_cell => {
                        in_formula = true;
                        cell.formula.get_or_insert_with(String::new);
                    }
                    b"is" if in_cell => in_inline_str = true,
                    b"rPh" if in_inline_str => in_phonetic = true,
                    b"t" if in_inline_str && !in_phonetic => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"c" => {
                        let empty = PendingCell::from_attrs(&e, row_idx, next_col)?;
                        next_col = empty.addr.col.saturating_add(1);
                        Self::process_cell(worksheet, empty, shared_strings, cell_styles)?;
                    }
                    b"f" if in_cell => {
                        // Shared formula reference; the cached value still follows in <v>
                        cell.formula.get_or_insert_with(String::new);
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        in_cell = false;
                        next_col = cell.addr.col.saturating_add(1);
                        let done = std::mem::take(&mut cell);
                        Self::process_cell(worksheet, done, shared_strings, cell_styles)?;
                    }
                    b"row" => row_idx = row_idx.saturating_add(1),
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"is" => in_inline_str = false,
                    b"rPh" => in_phonetic = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Text(e)) => {
                    if in_value || in_inline_text || in_formula {
                        let text = e.unescape()?;
                        if in_value {
                            cell.value.get_or_insert_with(String::new).push_str(&text);
                        } else if in_inline_text {
                            cell.inline.get_or_insert_with(String::new).push_str(&text);
                        } else if let Some(f) = cell.formula.as_mut() {
                            f.push_str(&text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Process a cell and add it to the worksheet
    fn process_cell(
        worksheet: &mut Worksheet,
        cell: PendingCell,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<()> {
        let PendingCell {
            addr,
            cell_type,
            style_idx,
            value,
            inline,
            formula,
        } = cell;
        let value = value.map(|v| v.trim().to_string());
        let cell_type = cell_type.as_deref();

        let parsed = match (cell_type, value.as_deref(), inline) {
            (Some("inlineStr"), _, Some(text)) => Some(CellValue::string(decode_excel_escapes(&text))),
            (_, Some(v), _) => Some(Self::parse_value(cell_type, v, shared_strings)?),
            _ => None,
        };

        let cell_value = match formula {
            Some(f) => {
                let text = if f.starts_with('=') { f } else { format!("={}", f) };
                CellValue::formula(text, parsed)
            }
            None => parsed.unwrap_or_default(),
        };

        // Cells without an `s` attribute use the first cell format
        let style = match style_idx {
            Some(s) => Some(
                styles
                    .get(s as usize)
                    .ok_or_else(|| XlsxError::Parse(format!("Style index {} out of bounds", s)))?,
            ),
            None => styles.first(),
        };

        if cell_value.is_empty() && style_idx.is_none() {
            return Ok(());
        }
        match style {
            Some(style) => worksheet.set_cell_at(addr.row, addr.col, cell_value, style)?,
            None => worksheet.set_cell_value_at(addr.row, addr.col, cell_value)?,
        }
        Ok(())
    }

    /// Convert the text of a `<v>` element according to the cell type
    fn parse_value(
        cell_type: Option<&str>,
        value: &str,
        shared_strings: &[String],
    ) -> XlsxResult<CellValue> {
        Ok(match cell_type {
            // Shared string
            Some("s") => {
                let idx: usize = value.parse().map_err(|_| {
                    XlsxError::Parse(format!("Invalid shared string index: {}", value))
                })?;
                let s = shared_strings.get(idx).ok_or_else(|| {
                    XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                })?;
                CellValue::string(s.as_str())
            }

            Some("b") => CellValue::Boolean(value == "1" || value.eq_ignore_ascii_case("true")),

            Some("e") => CellError::parse(value)
                .map(CellValue::Error)
                .unwrap_or_else(|| CellValue::string(value)),

            // Formula string result or inline string stored in <v>
            Some("str") | Some("inlineStr") => CellValue::string(decode_excel_escapes(value)),

            // ISO 8601 date cells are kept as text
            Some("d") => CellValue::string(value),

            // Number (default type or explicit "n")
            None | Some("n") => match value.parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::string(value),
            },

            Some(_) => CellValue::string(value),
        })
    }
}

/// A `<c>` element collected while its children are parsed
#[derive(Debug, Default)]
struct PendingCell {
    addr: CellAddress,
    cell_type: Option<String>,
    style_idx: Option<u32>,
    value: Option<String>,
    inline: Option<String>,
    formula: Option<String>,
}

impl PendingCell {
    fn from_attrs(
        e: &quick_xml::events::BytesStart<'_>,
        row_idx: u32,
        next_col: u16,
    ) -> XlsxResult<Self> {
        let addr = match attr_value(e, b"r") {
            Some(r) => CellAddress::parse(&r).map_err(|err| {
                XlsxError::Parse(format!("Invalid cell reference '{}': {}", r, err))
            })?,
            None => CellAddress::new(row_idx, next_col),
        };
        Ok(Self {
            addr,
            cell_type: attr_value(e, b"t"),
            style_idx: attr_value(e, b"s").and_then(|s| s.parse().ok()),
            ..Self::default()
        })
    }
}

/// Resolve a relationship target (relative to `xl/`, or absolute) to a part name
fn resolve_part_path(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut parts: Vec<&str> = vec!["xl"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes_control_chars() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("hello_x000a_world"), "hello\nworld");
        assert_eq!(decode_excel_escapes("col1_x0009_col2"), "col1\tcol2");
        assert_eq!(
            decode_excel_escapes("line1_x000D__x000A_line2"),
            "line1\r\nline2"
        );
    }

    #[test]
    fn test_decode_excel_escapes_underscore() {
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("a_xZZZZ_b"), "a_xZZZZ_b");
    }

    #[test]
    fn test_resolve_part_path() {
        assert_eq!(resolve_part_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_part_path("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(resolve_part_path("./worksheets/sheet3.xml"), "xl/worksheets/sheet3.xml");
    }

    #[test]
    fn test_read_empty_xlsx() {
        // Minimal valid XLSX structure
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options)
                .unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData></sheetData></worksheet>"#).unwrap();

            zip.finish().unwrap();
        }

        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();

        assert_eq!(workbook.sheet_count(), 1);
        assert_eq!(workbook.worksheet(0).unwrap().name(), "Sheet1");
        assert!(workbook.worksheet(0).unwrap().used_range().is_none());
    }

    #[test]
    fn test_not_a_package() {
        assert!(XlsxReader::read_bytes(b"definitely not a zip").is_err());
    }
}
