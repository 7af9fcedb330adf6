//! # sheetdoc-xlsx
//!
//! XLSX (Office Open XML) reader for sheetdoc.
//!
//! Produces a [`sheetdoc_core::Workbook`] holding cell values (with cached
//! formula results), the cell formats that drive display text (number
//! formats, fonts, solid fills, horizontal alignment), the active sheet and
//! the workbook's date system.
//!
//! ```no_run
//! use sheetdoc_xlsx::XlsxReader;
//!
//! let workbook = XlsxReader::read_file("report.xlsx")?;
//! println!("{} sheet(s)", workbook.sheet_count());
//! # Ok::<(), sheetdoc_xlsx::XlsxError>(())
//! ```

pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
