//! Mapping configuration: which tag receives which value or range
//!
//! A mapping is a JSON object keyed by tag. Its entries are validated into
//! [`MappingEntry`] values up front so rendering never sees malformed input:
//!
//! ```json
//! {
//!   "{{NAME}}": "B2",
//!   "{{TITLE}}": "Quarterly report",
//!   "{{DATE}}": { "value": "Summary!C1", "style": { "bold": true }, "align": "center" },
//!   "{{TABLE}}": { "sheet": "Data", "range": "A1:C", "mode": "singleTable" }
//! }
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};
use sheetdoc_core::{CellAddress, Workbook, Worksheet};
use sheetdoc_docx::Run;

use crate::accessor::WorkbookAccessor;
use crate::error::{EngineError, InvalidCellAddressError, MappingError};

/// How a table entry is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderMode {
    /// One table for the whole range
    #[default]
    SingleTable,
    /// One single-row table per spreadsheet row
    PerRowTable,
    /// One paragraph per row
    PlainText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Reading direction of a rendered range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Right-to-left when the range holds right-to-left script
    #[default]
    Auto,
    Rtl,
    Ltr,
}

/// Which cells of a rendered table get borders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum BorderRule {
    /// Top and bottom rules around bold numeric cells
    #[default]
    #[serde(rename = "boldNumeric")]
    BoldNumeric,
    /// A rule above every row (after the first) with bold text
    #[serde(rename = "boldRows")]
    BoldRows,
    #[serde(rename = "none")]
    None,
}

/// Legacy `type` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum RawKind {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "row_tables")]
    RowTables,
    #[serde(rename = "row_tables2")]
    RowTables2,
}

/// Run formatting forced by a mapping entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStyleOverride {
    pub font_name: Option<String>,
    /// Points
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    /// `RRGGBB`, with or without a leading `#`
    pub color: Option<String>,
    pub underline: Option<bool>,
    /// Carry solid spreadsheet fills over as cell shading
    #[serde(default)]
    pub apply_shading: bool,
}

impl RunStyleOverride {
    /// Whether applying the override changes a run at all
    pub fn is_empty(&self) -> bool {
        self.font_name.is_none()
            && self.font_size.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.color.is_none()
            && self.underline.is_none()
    }

    pub fn apply(&self, run: &mut Run) {
        if let Some(name) = self.font_name.as_deref().filter(|n| !n.is_empty()) {
            run.set_font_name(name);
        }
        if let Some(size) = self.font_size.filter(|s| *s > 0.0) {
            run.set_size_half_points((size * 2.0).round() as u32);
        }
        if let Some(bold) = self.bold {
            run.set_bold(bold);
        }
        if let Some(italic) = self.italic {
            run.set_italic(italic);
        }
        if let Some(color) = self.color.as_deref() {
            let color = color.trim_start_matches('#');
            if color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()) {
                run.set_color(&color.to_ascii_uppercase());
            }
        }
        match self.underline {
            Some(true) => run.set_underline(Some("single")),
            Some(false) => run.set_underline(Some("none")),
            None => {}
        }
    }
}

/// The value of a text entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextValue {
    Literal(String),
    /// `B2` or `Sheet!B2`
    CellRef(String),
}

impl TextValue {
    /// A value holding both an ASCII letter and a digit is a cell reference
    pub fn classify(value: &str) -> Self {
        let has_letter = value.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = value.chars().any(|c| c.is_ascii_digit());
        if has_letter && has_digit {
            TextValue::CellRef(value.trim().to_string())
        } else {
            TextValue::Literal(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextMapping {
    pub value: TextValue,
    pub sheet: Option<String>,
    pub style: Option<RunStyleOverride>,
    pub align: Option<Align>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableMapping {
    pub sheet: Option<String>,
    pub range: String,
    pub render_mode: RenderMode,
    pub align: Align,
    pub direction: Direction,
    pub style_override: Option<RunStyleOverride>,
    pub trim_empty_edges: bool,
    pub drop_empty_cells: bool,
    pub merge_backward: Option<bool>,
    pub border_rule: Option<BorderRule>,
    pub apply_shading: bool,
}

impl TableMapping {
    /// A single-table entry with default settings
    pub fn new(range: impl Into<String>) -> Self {
        Self {
            sheet: None,
            range: range.into(),
            render_mode: RenderMode::SingleTable,
            align: Align::Left,
            direction: Direction::Auto,
            style_override: None,
            trim_empty_edges: true,
            drop_empty_cells: true,
            merge_backward: None,
            border_rule: None,
            apply_shading: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MappingEntry {
    Text(TextMapping),
    Table(TableMapping),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntry {
    sheet: Option<String>,
    range: Option<String>,
    #[serde(rename = "type")]
    kind: Option<RawKind>,
    mode: Option<RenderMode>,
    align: Option<Align>,
    direction: Option<Direction>,
    style: Option<RunStyleOverride>,
    trim_empty: Option<bool>,
    drop_empty_cells: Option<bool>,
    merge_backward: Option<bool>,
    border_rule: Option<BorderRule>,
    value: Option<Value>,
}

impl RawEntry {
    fn into_entry(self, tag: &str) -> Result<MappingEntry, MappingError> {
        let range = self.range.filter(|r| !r.trim().is_empty());
        let is_table = (range.is_some() || self.sheet.is_some())
            && !(self.kind == Some(RawKind::Text) && range.is_none());

        if !is_table {
            let value = match self.value {
                Some(Value::String(s)) => s,
                Some(Value::Number(n)) => n.to_string(),
                Some(other) => {
                    return Err(MappingError::entry(
                        tag,
                        format!("value must be a string, found {}", other),
                    ))
                }
                None => return Err(MappingError::entry(tag, "text entry without a value")),
            };
            return Ok(MappingEntry::Text(TextMapping {
                value: TextValue::classify(&value),
                sheet: self.sheet,
                style: self.style,
                align: self.align,
            }));
        }

        let Some(range) = range else {
            return Err(MappingError::entry(tag, "table entry names a sheet but no range"));
        };
        let render_mode = match (self.mode, self.kind) {
            (Some(mode), _) => mode,
            (None, Some(RawKind::Text)) => RenderMode::PlainText,
            (None, Some(RawKind::RowTables)) => RenderMode::PerRowTable,
            (None, Some(RawKind::Table | RawKind::RowTables2) | None) => RenderMode::SingleTable,
        };
        let apply_shading = self.style.as_ref().is_some_and(|s| s.apply_shading);

        Ok(MappingEntry::Table(TableMapping {
            sheet: self.sheet,
            range,
            render_mode,
            align: self.align.unwrap_or_default(),
            direction: self.direction.unwrap_or_default(),
            style_override: self.style,
            trim_empty_edges: self.trim_empty.unwrap_or(true),
            drop_empty_cells: self.drop_empty_cells.unwrap_or(true),
            merge_backward: self.merge_backward,
            border_rule: self.border_rule,
            apply_shading,
        }))
    }
}

fn parse_entry(tag: &str, value: &Value) -> Result<MappingEntry, MappingError> {
    match value {
        Value::String(s) => Ok(MappingEntry::Text(TextMapping {
            value: TextValue::classify(s),
            sheet: None,
            style: None,
            align: None,
        })),
        Value::Object(_) => {
            let raw: RawEntry = serde_json::from_value(value.clone())
                .map_err(|e| MappingError::entry(tag, e.to_string()))?;
            raw.into_entry(tag)
        }
        other => Err(MappingError::entry(
            tag,
            format!("expected a string or an object, found {}", other),
        )),
    }
}

/// `NAME` becomes `{{NAME}}`; keys already holding `{{` are kept
pub fn wrap_tag(key: &str) -> String {
    if key.contains("{{") {
        key.to_string()
    } else {
        format!("{{{{{}}}}}", key.trim())
    }
}

/// A table tag supplied outside the JSON mapping (for example on the
/// command line)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableField {
    pub tag: String,
    pub range: String,
    pub sheet: Option<String>,
}

/// Parsed mapping entries, in input order
#[derive(Debug, Clone)]
pub struct MappingSet {
    raw: Map<String, Value>,
    entries: Vec<(String, MappingEntry)>,
    wrap_bare_tags: bool,
}

impl MappingSet {
    /// Parse a JSON mapping, wrapping bare tags
    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        Self::from_json_with(json, true)
    }

    pub fn from_json_with(json: &str, wrap_bare_tags: bool) -> Result<Self, MappingError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value, wrap_bare_tags)
    }

    pub fn from_value(value: Value, wrap_bare_tags: bool) -> Result<Self, MappingError> {
        let Value::Object(raw) = value else {
            return Err(MappingError::NotAnObject);
        };
        let entries = parse_entries(&raw, wrap_bare_tags)?;
        Ok(Self {
            raw,
            entries,
            wrap_bare_tags,
        })
    }

    pub fn entries(&self) -> &[(String, MappingEntry)] {
        &self.entries
    }

    pub fn get(&self, tag: &str) -> Option<&MappingEntry> {
        self.entries.iter().find(|(t, _)| t == tag).map(|(_, e)| e)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add table tags given as `(tag, range, sheet)` triples
    ///
    /// An object entry for the tag keeps its own keys and only gains the
    /// missing ones. Any other entry is replaced by a left-aligned single
    /// table. Fields with a blank range are ignored.
    pub fn merge_table_fields(
        &mut self,
        fields: &[TableField],
        default_sheet: Option<&str>,
    ) -> Result<(), MappingError> {
        for field in fields.iter().filter(|f| !f.range.trim().is_empty()) {
            let key = self.raw_key(&field.tag);
            let sheet = field
                .sheet
                .as_deref()
                .or(default_sheet)
                .map_or(Value::Null, |s| Value::String(s.to_string()));

            let mut payload = Map::new();
            payload.insert("sheet".into(), sheet);
            payload.insert("range".into(), Value::String(field.range.clone()));
            payload.insert("type".into(), Value::String("table".into()));
            payload.insert("align".into(), Value::String("left".into()));

            match self.raw.get_mut(&key) {
                Some(Value::Object(existing)) => {
                    for (k, v) in payload {
                        if !v.is_null() {
                            existing.entry(k).or_insert(v);
                        }
                    }
                }
                _ => {
                    payload.retain(|_, v| !v.is_null());
                    self.raw.insert(key, Value::Object(payload));
                }
            }
        }
        self.entries = parse_entries(&self.raw, self.wrap_bare_tags)?;
        Ok(())
    }

    /// The raw key an incoming tag refers to, bare or wrapped
    fn raw_key(&self, tag: &str) -> String {
        if self.raw.contains_key(tag) {
            return tag.to_string();
        }
        if self.wrap_bare_tags {
            let wrapped = wrap_tag(tag);
            if let Some(key) = self.raw.keys().find(|k| wrap_tag(k) == wrapped) {
                return key.clone();
            }
        }
        tag.to_string()
    }
}

fn parse_entries(
    raw: &Map<String, Value>,
    wrap_bare_tags: bool,
) -> Result<Vec<(String, MappingEntry)>, MappingError> {
    raw.iter()
        .map(|(key, value)| {
            let tag = if wrap_bare_tags {
                wrap_tag(key)
            } else {
                key.clone()
            };
            parse_entry(key, value).map(|entry| (tag, entry))
        })
        .collect()
}

/// Resolves sheets and text values against a workbook
#[derive(Debug, Clone, Copy)]
pub struct MappingResolver<'a> {
    workbook: &'a Workbook,
    default_sheet: Option<&'a str>,
}

impl<'a> MappingResolver<'a> {
    pub fn new(workbook: &'a Workbook, default_sheet: Option<&'a str>) -> Self {
        Self {
            workbook,
            default_sheet,
        }
    }

    /// The entry's own sheet, else the default sheet, else the active sheet
    ///
    /// A sheet named by the entry must exist.
    pub fn sheet_for(&self, requested: Option<&str>) -> Result<&'a Worksheet, EngineError> {
        if let Some(name) = requested {
            return self
                .workbook
                .worksheet_by_name(name)
                .ok_or_else(|| EngineError::SheetNotFound(name.to_string()));
        }
        self.default_sheet
            .and_then(|name| self.workbook.worksheet_by_name(name))
            .or_else(|| self.workbook.active_worksheet())
            .or_else(|| self.workbook.worksheet(0))
            .ok_or_else(|| EngineError::SheetNotFound("(active sheet)".to_string()))
    }

    pub fn accessor(&self, sheet: &'a Worksheet) -> WorkbookAccessor<'a> {
        WorkbookAccessor::for_sheet(self.workbook, sheet)
    }

    /// The text a text entry stands for
    pub fn resolve_text(&self, mapping: &TextMapping) -> Result<String, EngineError> {
        let reference = match &mapping.value {
            TextValue::Literal(text) => return Ok(text.clone()),
            TextValue::CellRef(reference) => reference,
        };

        let (sheet_name, address) = match reference.rsplit_once('!') {
            Some((sheet, address)) => (Some(sheet.trim_matches('\'')), address),
            None => (mapping.sheet.as_deref(), reference.as_str()),
        };
        let sheet = self.sheet_for(sheet_name).map_err(|e| InvalidCellAddressError {
            address: reference.clone(),
            reason: e.to_string(),
        })?;
        let cell = CellAddress::parse(address).map_err(|e| InvalidCellAddressError {
            address: reference.clone(),
            reason: e.to_string(),
        })?;

        Ok(self
            .accessor(sheet)
            .display_text(cell.row + 1, cell.col as u32 + 1))
    }
}
