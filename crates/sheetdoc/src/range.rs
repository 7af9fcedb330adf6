//! Range expressions (`A1:G60`, `A5:G`, `A:G60`, `A:G`, `C7`)
//!
//! Rows left out of an expression are auto-detected from the data: the
//! first and last rows holding a non-blank cell in the column band.

use std::fmt;

use log::debug;
use sheetdoc_core::{CellAddress, MAX_COLS, MAX_ROWS};

use crate::error::RangeParseError;

/// A resolved cell block, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeSpec {
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl RangeSpec {
    pub fn new(start_row: u32, end_row: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start_row: start_row.min(end_row),
            end_row: start_row.max(end_row),
            start_col: start_col.min(end_col),
            end_col: start_col.max(end_col),
        }
    }

    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn col_count(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start_row..=self.end_row
    }

    pub fn cols(&self) -> std::ops::RangeInclusive<u32> {
        self.start_col..=self.end_col
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            idx_to_col(self.start_col),
            self.start_row,
            idx_to_col(self.end_col),
            self.end_row
        )
    }
}

/// Source of the row bounds used by auto-detection
pub trait RowSpanSource {
    /// First and last rows (1-based) at or below `start_row_min` with a
    /// non-blank cell in columns `start_col..=end_col`
    fn used_row_span(&self, start_col: u32, end_col: u32, start_row_min: u32) -> Option<(u32, u32)>;

    /// Number of rows up to the last stored cell
    fn max_row(&self) -> u32;
}

/// Column letters to a 1-based index (`A` -> 1, `AA` -> 27)
///
/// Returns `None` for an empty string, anything but ASCII letters, or a
/// column beyond `XFD`.
pub fn col_to_idx(letters: &str) -> Option<u32> {
    CellAddress::letters_to_column(letters)
        .ok()
        .map(|col| col as u32 + 1)
}

/// 1-based column index to letters (`1` -> `A`, `27` -> `AA`)
///
/// Indices outside `1..=16384` give an empty string.
pub fn idx_to_col(idx: u32) -> String {
    idx.checked_sub(1)
        .and_then(|col| u16::try_from(col).ok())
        .filter(|&col| col < MAX_COLS)
        .map(CellAddress::column_to_letters)
        .unwrap_or_default()
}

/// One side of a range expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Corner {
    col: Option<u32>,
    row: Option<u32>,
}

fn split_part(literal: &str, part: &str) -> Result<Corner, RangeParseError> {
    let mut letters = String::new();
    let mut digits = String::new();
    for c in part.chars() {
        match c {
            '$' => {}
            c if c.is_ascii_alphabetic() => {
                if !digits.is_empty() {
                    return Err(RangeParseError::new(
                        literal,
                        "column letters must precede the row number",
                    ));
                }
                letters.push(c);
            }
            c if c.is_ascii_digit() => digits.push(c),
            c if c.is_alphabetic() => {
                return Err(RangeParseError::new(
                    literal,
                    format!("non-ASCII column letter '{}'", c),
                ))
            }
            c => {
                return Err(RangeParseError::new(
                    literal,
                    format!("unexpected character '{}'", c),
                ))
            }
        }
    }

    let col = if letters.is_empty() {
        None
    } else {
        let col = col_to_idx(&letters).ok_or_else(|| {
            RangeParseError::new(literal, format!("column {} is beyond XFD", letters))
        })?;
        Some(col)
    };

    let row = if digits.is_empty() {
        None
    } else {
        let row: u32 = digits
            .parse()
            .ok()
            .filter(|&r| r <= MAX_ROWS)
            .ok_or_else(|| {
                RangeParseError::new(literal, format!("row {} is beyond {}", digits, MAX_ROWS))
            })?;
        if row == 0 {
            return Err(RangeParseError::new(literal, "row numbers start at 1"));
        }
        Some(row)
    };

    Ok(Corner { col, row })
}

/// Parse a range expression, auto-detecting omitted rows through `source`
///
/// # Example
///
/// ```
/// use sheetdoc::range::{parse_range, RangeSpec, RowSpanSource};
///
/// struct Rows(u32, u32);
/// impl RowSpanSource for Rows {
///     fn used_row_span(&self, _: u32, _: u32, min: u32) -> Option<(u32, u32)> {
///         (self.1 >= min).then(|| (self.0.max(min), self.1))
///     }
///     fn max_row(&self) -> u32 {
///         self.1
///     }
/// }
///
/// let spec = parse_range("B:D", &Rows(3, 12)).unwrap();
/// assert_eq!(spec, RangeSpec::new(3, 12, 2, 4));
/// ```
pub fn parse_range<P: RowSpanSource + ?Sized>(
    literal: &str,
    source: &P,
) -> Result<RangeSpec, RangeParseError> {
    let compact: String = literal.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Err(RangeParseError::new(literal, "empty range"));
    }

    let mut parts = compact.split(':');
    let first = parts.next().unwrap_or_default();
    let second = parts.next();
    if parts.next().is_some() {
        return Err(RangeParseError::new(literal, "more than one ':'"));
    }

    let start = split_part(literal, first)?;
    let Some(start_col) = start.col else {
        return Err(RangeParseError::new(literal, "missing column letters"));
    };

    let Some(second) = second else {
        // Single address
        let Some(row) = start.row else {
            return Err(RangeParseError::new(literal, "single cell without a row number"));
        };
        return Ok(RangeSpec::new(row, row, start_col, start_col));
    };

    let end = split_part(literal, second)?;
    let Some(end_col) = end.col else {
        return Err(RangeParseError::new(literal, "missing column letters"));
    };
    let (start_col, end_col) = (start_col.min(end_col), start_col.max(end_col));

    let (start_row, end_row) = match (start.row, end.row) {
        (Some(s), Some(e)) => (s.min(e), s.max(e)),
        // Only the end row is detected; the explicit start row stands
        (Some(s), None) => (s, detect(source, start_col, end_col, s).1),
        (None, Some(e)) => {
            let first_used = source
                .used_row_span(start_col, end_col, 1)
                .map(|(first, _)| first)
                .filter(|&first| first <= e);
            (first_used.unwrap_or(1), e)
        }
        (None, None) => detect(source, start_col, end_col, 1),
    };

    let spec = RangeSpec::new(start_row, end_row, start_col, end_col);
    debug!("range '{}' resolved to {}", literal, spec);
    Ok(spec)
}

fn detect<P: RowSpanSource + ?Sized>(
    source: &P,
    start_col: u32,
    end_col: u32,
    start_row_min: u32,
) -> (u32, u32) {
    source
        .used_row_span(start_col, end_col, start_row_min)
        .unwrap_or_else(|| (start_row_min, source.max_row().max(start_row_min)))
}
