//! XLSX styles (styles.xml) reading

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use sheetdoc_core::style::{
    Alignment, Color, FillStyle, FontStyle, HorizontalAlignment, NumberFormat, PatternType, Style,
    Underline,
};

/// Read the value of one attribute, unescaped
pub(crate) fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.to_string()))
}

fn attr_u32(e: &BytesStart<'_>, key: &[u8]) -> u32 {
    attr_value(e, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

/// Styles listed in `<cellXfs>`, in order. A cell's `s` attribute indexes
/// into this list.
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Style>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<FontStyle> = Vec::new();
    let mut fills: Vec<FillStyle> = Vec::new();
    let mut cell_xfs: Vec<Style> = Vec::new();

    let mut current_font: Option<FontStyle> = None;
    let mut current_fill_pattern: Option<PatternType> = None;
    let mut current_fill_fg = Color::Auto;
    let mut current_fill_bg = Color::Auto;
    let mut in_fill = false;

    // (numFmtId, fontId, fillId, alignment)
    let mut current_xf: Option<(u32, u32, u32, Alignment)> = None;
    let mut in_cell_xfs = false;
    // Differential formats reuse <font>/<fill>; they are skipped entirely
    let mut in_dxfs = false;

    loop {
        let event = xml_reader.read_event_into(&mut buf);
        let (e, is_empty) = match event {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(e)) => {
                match e.name().as_ref() {
                    b"dxfs" => in_dxfs = false,
                    _ if in_dxfs => {}
                    b"font" => {
                        if let Some(f) = current_font.take() {
                            fonts.push(f);
                        }
                    }
                    b"fill" if in_fill => {
                        fills.push(finalize_fill(
                            current_fill_pattern.take(),
                            current_fill_fg,
                            current_fill_bg,
                        ));
                        in_fill = false;
                    }
                    b"xf" => {
                        if let Some((num_fmt_id, font_id, fill_id, align)) = current_xf.take() {
                            cell_xfs.push(resolve_style(
                                num_fmt_id, font_id, fill_id, align, &numfmts, &fonts, &fills,
                            ));
                        }
                    }
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                }
                buf.clear();
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {
                buf.clear();
                continue;
            }
        };

        match e.name().as_ref() {
            b"dxfs" if !is_empty => in_dxfs = true,
            _ if in_dxfs => {}

            b"numFmt" => {
                if let (Some(id), Some(code)) = (
                    attr_value(&e, b"numFmtId").and_then(|s| s.parse().ok()),
                    attr_value(&e, b"formatCode"),
                ) {
                    numfmts.insert(id, code);
                }
            }

            b"cellXfs" => in_cell_xfs = !is_empty,

            b"font" => {
                if is_empty {
                    fonts.push(FontStyle::default());
                } else {
                    current_font = Some(FontStyle::default());
                }
            }

            b"fill" => {
                if is_empty {
                    fills.push(FillStyle::None);
                } else {
                    in_fill = true;
                    current_fill_pattern = None;
                    current_fill_fg = Color::Auto;
                    current_fill_bg = Color::Auto;
                }
            }

            b"patternFill" if in_fill => {
                current_fill_pattern =
                    attr_value(&e, b"patternType").map(|v| PatternType::from_xlsx(&v));
            }
            b"fgColor" if in_fill => current_fill_fg = parse_color_attrs(&e),
            b"bgColor" if in_fill => current_fill_bg = parse_color_attrs(&e),

            b"xf" if in_cell_xfs => {
                let ids = (
                    attr_u32(&e, b"numFmtId"),
                    attr_u32(&e, b"fontId"),
                    attr_u32(&e, b"fillId"),
                    Alignment::default(),
                );
                if is_empty {
                    let (num_fmt_id, font_id, fill_id, align) = ids;
                    cell_xfs.push(resolve_style(
                        num_fmt_id, font_id, fill_id, align, &numfmts, &fonts, &fills,
                    ));
                } else {
                    current_xf = Some(ids);
                }
            }

            b"alignment" => {
                if let Some((_, _, _, align)) = current_xf.as_mut() {
                    if let Some(h) = attr_value(&e, b"horizontal") {
                        align.horizontal = HorizontalAlignment::from_xlsx(&h);
                    }
                    if let Some(w) = attr_value(&e, b"wrapText") {
                        align.wrap_text = w == "1" || w == "true";
                    }
                }
            }

            // Font sub-elements
            b"sz" => {
                if let Some(font) = current_font.as_mut() {
                    if let Some(v) = attr_value(&e, b"val") {
                        font.size = v.parse::<f64>().unwrap_or(font.size);
                    }
                }
            }
            b"name" => {
                if let Some(font) = current_font.as_mut() {
                    if let Some(v) = attr_value(&e, b"val") {
                        font.name = v;
                    }
                }
            }
            b"b" => {
                if let Some(font) = current_font.as_mut() {
                    font.bold = is_on(&e);
                }
            }
            b"i" => {
                if let Some(font) = current_font.as_mut() {
                    font.italic = is_on(&e);
                }
            }
            b"u" => {
                if let Some(font) = current_font.as_mut() {
                    font.underline = attr_value(&e, b"val")
                        .map(|v| Underline::from_xlsx(&v))
                        .unwrap_or(Underline::Single);
                }
            }
            b"color" => {
                // Border edges also carry <color>; only fonts are tracked
                if let Some(font) = current_font.as_mut() {
                    font.color = parse_color_attrs(&e);
                }
            }
            _ => {}
        }

        buf.clear();
    }

    if cell_xfs.is_empty() {
        cell_xfs.push(Style::default());
    }
    Ok(cell_xfs)
}

/// Boolean font properties may carry `val="0"` to switch themselves off
fn is_on(e: &BytesStart<'_>) -> bool {
    !matches!(attr_value(e, b"val").as_deref(), Some("0") | Some("false"))
}

fn resolve_style(
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    alignment: Alignment,
    numfmts: &HashMap<u32, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
) -> Style {
    Style {
        font: fonts.get(font_id as usize).cloned().unwrap_or_default(),
        fill: fills.get(fill_id as usize).copied().unwrap_or_default(),
        alignment,
        number_format: match numfmts.get(&num_fmt_id) {
            Some(code) => NumberFormat::from_string(code.clone()),
            None => NumberFormat::from_id(num_fmt_id),
        },
    }
}

fn finalize_fill(pattern: Option<PatternType>, fg: Color, bg: Color) -> FillStyle {
    match pattern.unwrap_or(PatternType::None) {
        PatternType::None | PatternType::Gray125 => FillStyle::None,
        PatternType::Solid => FillStyle::Solid { color: fg },
        p => FillStyle::Pattern {
            pattern: p,
            foreground: fg,
            background: bg,
        },
    }
}

fn parse_color_attrs(e: &BytesStart<'_>) -> Color {
    // Priority: rgb > theme > indexed > auto
    if let Some(color) = attr_value(e, b"rgb").and_then(|rgb| Color::from_hex(&rgb)) {
        return color;
    }

    if let Some(index) = attr_value(e, b"theme").and_then(|s| s.parse::<u8>().ok()) {
        let tint = attr_value(e, b"tint")
            .and_then(|s| s.parse::<f64>().ok())
            .map(|t| (t * 100.0).round() as i8)
            .unwrap_or(0);
        return Color::Theme { index, tint };
    }

    if let Some(i) = attr_value(e, b"indexed").and_then(|s| s.parse::<u8>().ok()) {
        return Color::Indexed(i);
    }

    Color::Auto
}
