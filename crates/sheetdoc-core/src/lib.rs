//! # sheetdoc-core
//!
//! Core workbook data structures for the sheetdoc template engine.
//!
//! This crate provides the in-memory spreadsheet model the engine reads from:
//! - [`CellValue`] - Cell values (numbers, strings, booleans, errors, cached formulas)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`Style`] - The cell formatting facts that drive document rendering
//!   (font, fill, horizontal alignment, number format)
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use sheetdoc_core::{Workbook, CellValue, Style};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "Total").unwrap();
//!
//! // Row/column indices are 0-based
//! let total = Style::new().bold(true).number_format("#,##0.00");
//! sheet.set_cell_at(0, 1, CellValue::from(1234.5), &total).unwrap();
//! sheet.set_cell_value_at(1, 0, CellValue::string("Pens")).unwrap();
//!
//! assert_eq!(sheet.used_range().unwrap().to_string(), "A1:B2");
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use date::serial_to_datetime;
pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

pub use style::{
    Alignment, Color, DateTimeKind, FillStyle, FontStyle, HorizontalAlignment, NumberFormat,
    PatternType, Style, StylePool, Underline,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
