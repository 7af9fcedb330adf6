//! End-to-end tests for sheetdoc-xlsx.
//!
//! Each test assembles the exact package it needs in memory (hand-written
//! part XML zipped with `zip::ZipWriter`), reads it back with `XlsxReader`
//! and asserts on the resulting workbook.

mod common;
mod reading;

pub use common::*;
