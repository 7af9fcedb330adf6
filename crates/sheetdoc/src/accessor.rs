//! Cell display values and formatting facts
//!
//! Coordinates are 1-based throughout, matching [`RangeSpec`].

use log::trace;
use sheetdoc_core::{
    serial_to_datetime, CellValue, Color, DateTimeKind, HorizontalAlignment, NumberFormat,
    Style, Workbook, Worksheet, MAX_ROWS,
};

use crate::range::{RangeSpec, RowSpanSource};
use crate::render::numeric::is_numeric_text;

const DATE_FORMAT: &str = "%d/%b/%Y";
const DATE_TIME_FORMAT: &str = "%d/%b/%Y %H:%M";
const TIME_FORMAT: &str = "%H:%M:%S";

/// A cell as the renderer needs it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCell {
    pub display_text: String,
    pub is_bold: bool,
    /// The display text reads as a number
    pub is_numeric: bool,
    /// Solid background, `RRGGBB`
    pub fill_color: Option<String>,
    pub is_empty: bool,
    pub font_name: Option<String>,
    /// Points
    pub font_size: Option<f64>,
    pub is_italic: bool,
    /// Explicit font color, `RRGGBB`
    pub font_color: Option<String>,
    pub alignment: HorizontalAlignment,
}

impl ResolvedCell {
    /// A blank cell with no formatting
    pub fn blank() -> Self {
        Self {
            display_text: String::new(),
            is_bold: false,
            is_numeric: false,
            fill_color: None,
            is_empty: true,
            font_name: None,
            font_size: None,
            is_italic: false,
            font_color: None,
            alignment: HorizontalAlignment::General,
        }
    }
}

/// Read access to one worksheet
#[derive(Debug, Clone, Copy)]
pub struct WorkbookAccessor<'a> {
    sheet: &'a Worksheet,
    date_1904: bool,
}

impl<'a> WorkbookAccessor<'a> {
    pub fn new(sheet: &'a Worksheet, date_1904: bool) -> Self {
        Self { sheet, date_1904 }
    }

    /// Accessor for a sheet of `workbook`
    pub fn for_sheet(workbook: &Workbook, sheet: &'a Worksheet) -> Self {
        Self::new(sheet, workbook.settings().date_1904)
    }

    pub fn sheet(&self) -> &'a Worksheet {
        self.sheet
    }

    fn value(&self, row: u32, col: u32) -> Option<&'a CellValue> {
        let (row, col) = to_zero_based(row, col)?;
        self.sheet.cell_at(row, col).map(|c| &c.value)
    }

    fn style(&self, row: u32, col: u32) -> Option<&'a Style> {
        let (row, col) = to_zero_based(row, col)?;
        Some(self.sheet.cell_style_at(row, col))
    }

    /// The cell's value as the spreadsheet would display it
    pub fn display_text(&self, row: u32, col: u32) -> String {
        let Some(value) = self.value(row, col) else {
            return String::new();
        };
        match value.effective_value() {
            CellValue::Empty | CellValue::Formula { .. } => String::new(),
            CellValue::String(s) => s.as_str().to_string(),
            CellValue::Boolean(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            CellValue::Error(e) => e.as_str().to_string(),
            CellValue::Number(n) => {
                let format = self
                    .style(row, col)
                    .map(|s| &s.number_format)
                    .unwrap_or(&NumberFormat::General);
                format_number(*n, format, self.date_1904)
            }
        }
    }

    /// No value, or a value that displays as blank
    pub fn is_empty(&self, row: u32, col: u32) -> bool {
        match self.value(row, col) {
            None => true,
            Some(_) => self.display_text(row, col).trim().is_empty(),
        }
    }

    pub fn resolve(&self, row: u32, col: u32) -> ResolvedCell {
        let display_text = self.display_text(row, col);
        let Some(style) = self.style(row, col) else {
            return ResolvedCell::blank();
        };
        let font = &style.font;
        let is_empty = display_text.trim().is_empty();

        let cell = ResolvedCell {
            is_bold: font.bold,
            is_numeric: !is_empty && is_numeric_text(&display_text),
            fill_color: style.fill.solid_color().and_then(|c| fill_hex(&c)),
            is_empty,
            font_name: Some(font.name.clone()).filter(|n| !n.is_empty()),
            font_size: Some(font.size).filter(|s| *s > 0.0),
            is_italic: font.italic,
            font_color: font.color.to_rgb_hex(),
            alignment: style.alignment.horizontal,
            display_text,
        };
        trace!("resolved {}{}: {:?}", crate::range::idx_to_col(col), row, cell);
        cell
    }

    /// Whether any string cell in `spec` holds right-to-left script
    pub fn range_has_rtl(&self, spec: &RangeSpec) -> bool {
        let Some((r0, c0)) = to_zero_based(spec.start_row, spec.start_col) else {
            return false;
        };
        let Some((r1, c1)) = to_zero_based(spec.end_row, spec.end_col) else {
            return false;
        };
        self.sheet
            .iter_block(r0, r1, c0, c1)
            .any(|(_, _, data)| data.value.as_string().is_some_and(contains_rtl))
    }
}

impl RowSpanSource for WorkbookAccessor<'_> {
    fn used_row_span(&self, start_col: u32, end_col: u32, start_row_min: u32) -> Option<(u32, u32)> {
        let (r0, c0) = to_zero_based(start_row_min.max(1), start_col)?;
        let (_, c1) = to_zero_based(1, end_col)?;

        let mut span: Option<(u32, u32)> = None;
        for (row, col, _) in self.sheet.iter_block(r0, MAX_ROWS - 1, c0, c1) {
            let (row, col) = (row + 1, col as u32 + 1);
            if self.is_empty(row, col) {
                continue;
            }
            span = Some(match span {
                None => (row, row),
                Some((first, _)) => (first, row),
            });
        }
        span
    }

    fn max_row(&self) -> u32 {
        self.sheet.max_row()
    }
}

fn to_zero_based(row: u32, col: u32) -> Option<(u32, u16)> {
    if row == 0 || col == 0 || row > MAX_ROWS {
        return None;
    }
    let col = u16::try_from(col - 1).ok()?;
    Some((row - 1, col))
}

/// White and transparent fills leave the cell unshaded
fn fill_hex(color: &Color) -> Option<String> {
    if color.is_transparent() {
        return None;
    }
    color.to_rgb_hex().filter(|hex| hex != "FFFFFF")
}

/// Format a number the way its cell format asks for
pub fn format_number(n: f64, format: &NumberFormat, date_1904: bool) -> String {
    if let Some(kind) = format.date_time_kind() {
        if let Some(dt) = serial_to_datetime(n, date_1904) {
            let pattern = match kind {
                DateTimeKind::Date => DATE_FORMAT,
                DateTimeKind::DateTime => DATE_TIME_FORMAT,
                DateTimeKind::Time => TIME_FORMAT,
            };
            return dt.format(pattern).to_string();
        }
    }

    let code = format.format_string();
    if format.is_percent() {
        format!("{:.2}%", n * 100.0)
    } else if code.contains(".00") || code.contains(".0") || code.contains(".##") {
        group_thousands(n, 2)
    } else if code.contains(',') {
        group_thousands(n, 0)
    } else {
        natural(n)
    }
}

fn natural(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

fn group_thousands(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    let negative = n < 0.0 && fixed.bytes().any(|b| (b'1'..=b'9').contains(&b));
    if negative {
        grouped.push('-');
    }
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Arabic (including supplement and extended-A) or Hebrew characters
pub fn contains_rtl(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0590}'..='\u{05FF}'
            | '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetdoc_core::{CellError, FillStyle};

    fn sheet() -> Worksheet {
        let mut ws = Worksheet::new("Data");
        let bold = Style::new().bold(true).font_name("Arial").font_size(12.0);
        ws.set_cell_at(0, 0, "Item".into(), &bold).unwrap();
        ws.set_cell_at(0, 1, 1234.5.into(), &Style::new().number_format("#,##0.00").bold(true))
            .unwrap();
        ws.set_cell_at(1, 0, "صافي الربح".into(), &Style::new()).unwrap();
        ws.set_cell_at(1, 1, 0.125.into(), &Style::new().number_format("0.00%"))
            .unwrap();
        ws.set_cell_at(2, 0, 45838.0.into(), &Style::new().number_format_id(14))
            .unwrap();
        ws.set_cell_at(2, 1, "   ".into(), &Style::new()).unwrap();
        ws.set_cell_at(3, 2, CellValue::formula("=1/0", Some(CellError::Div0.into())), &Style::new())
            .unwrap();
        ws
    }

    #[test]
    fn test_display_text() {
        let ws = sheet();
        let acc = WorkbookAccessor::new(&ws, false);

        assert_eq!(acc.display_text(1, 1), "Item");
        assert_eq!(acc.display_text(1, 2), "1,234.50");
        assert_eq!(acc.display_text(2, 2), "12.50%");
        assert_eq!(acc.display_text(3, 1), "30/Jun/2025");
        assert_eq!(acc.display_text(4, 3), "#DIV/0!");
        assert_eq!(acc.display_text(9, 9), "");
    }

    #[test]
    fn test_number_formats() {
        let general = NumberFormat::General;
        assert_eq!(format_number(10.0, &general, false), "10");
        assert_eq!(format_number(10.5, &general, false), "10.5");
        assert_eq!(format_number(-3.0, &general, false), "-3");

        let thousands = NumberFormat::from_string("#,##0");
        assert_eq!(format_number(1234567.4, &thousands, false), "1,234,567");
        assert_eq!(format_number(-1234.5, &NumberFormat::from_id(4), false), "-1,234.50");
        assert_eq!(format_number(999.999, &NumberFormat::from_id(2), false), "1,000.00");
        assert_eq!(format_number(-0.001, &NumberFormat::from_id(2), false), "0.00");

        let date_time = NumberFormat::from_id(22);
        assert_eq!(format_number(45838.75, &date_time, false), "30/Jun/2025 18:00");
        assert_eq!(format_number(0.5, &NumberFormat::from_id(21), false), "12:00:00");
        assert_eq!(format_number(60.0, &NumberFormat::from_id(14), false), "28/Feb/1900");
        assert_eq!(format_number(0.0, &NumberFormat::from_id(14), true), "01/Jan/1904");
    }

    #[test]
    fn test_is_empty() {
        let ws = sheet();
        let acc = WorkbookAccessor::new(&ws, false);
        assert!(!acc.is_empty(1, 1));
        assert!(acc.is_empty(3, 2));
        assert!(acc.is_empty(50, 1));
    }

    #[test]
    fn test_resolve() {
        let mut ws = sheet();
        ws.set_cell_at(
            5,
            0,
            "x".into(),
            &Style {
                fill: FillStyle::solid(Color::from_hex("FFD9E1F2").unwrap()),
                ..Style::new().font_color(Color::from_hex("C00000").unwrap())
            },
        )
        .unwrap();
        ws.set_cell_at(
            5,
            1,
            "y".into(),
            &Style {
                fill: FillStyle::solid(Color::from_hex("FFFFFFFF").unwrap()),
                ..Style::new()
            },
        )
        .unwrap();
        ws.set_cell_at(
            5,
            2,
            "z".into(),
            &Style {
                fill: FillStyle::solid(Color::Indexed(5)),
                ..Style::new().font_color(Color::Theme { index: 4, tint: 0 })
            },
        )
        .unwrap();
        let acc = WorkbookAccessor::new(&ws, false);

        let amount = acc.resolve(1, 2);
        assert!(amount.is_bold);
        assert!(amount.is_numeric);
        assert!(!amount.is_empty);

        let label = acc.resolve(1, 1);
        assert_eq!(label.font_name.as_deref(), Some("Arial"));
        assert_eq!(label.font_size, Some(12.0));
        assert!(!label.is_numeric);

        let filled = acc.resolve(6, 1);
        assert_eq!(filled.fill_color.as_deref(), Some("D9E1F2"));
        assert_eq!(filled.font_color.as_deref(), Some("C00000"));
        assert_eq!(acc.resolve(6, 2).fill_color, None);
        assert_eq!(acc.resolve(6, 3).fill_color, None);
        assert_eq!(acc.resolve(6, 3).font_color, None);

        assert!(acc.resolve(40, 40).is_empty);
    }

    #[test]
    fn test_rtl_detection() {
        let ws = sheet();
        let acc = WorkbookAccessor::new(&ws, false);
        assert!(acc.range_has_rtl(&RangeSpec::new(1, 3, 1, 2)));
        assert!(!acc.range_has_rtl(&RangeSpec::new(1, 1, 1, 2)));
        assert!(contains_rtl("שלום"));
        assert!(!contains_rtl("Total 100"));
    }

    #[test]
    fn test_used_row_span() {
        let ws = sheet();
        let acc = WorkbookAccessor::new(&ws, false);
        assert_eq!(acc.used_row_span(1, 2, 1), Some((1, 3)));
        // Row 3 column B only holds spaces
        assert_eq!(acc.used_row_span(2, 2, 1), Some((1, 2)));
        assert_eq!(acc.used_row_span(3, 3, 1), Some((4, 4)));
        assert_eq!(acc.used_row_span(1, 2, 4), None);
        assert_eq!(acc.used_row_span(17, 17, 1), None);
        assert_eq!(acc.max_row(), 4);
    }

    #[test]
    fn test_explicit_start_row_is_kept() {
        let mut ws = Worksheet::new("Data");
        for row in 9..12 {
            ws.set_cell_at(row, 0, "x".into(), &Style::new()).unwrap();
        }
        let acc = WorkbookAccessor::new(&ws, false);

        assert_eq!(
            crate::range::parse_range("A5:B", &acc).unwrap(),
            RangeSpec::new(5, 12, 1, 2)
        );
        assert_eq!(
            crate::range::parse_range("A:B", &acc).unwrap(),
            RangeSpec::new(10, 12, 1, 2)
        );
    }
}
