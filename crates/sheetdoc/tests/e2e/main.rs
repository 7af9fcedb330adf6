//! End-to-end tests for sheetdoc.
//!
//! Each test zips the workbook and template it needs in memory, renders
//! them through `DocumentAssembler` and reads the output package back.

mod common;
mod rendering;

pub use common::*;
