//! # sheetdoc
//!
//! Fill DOCX templates with values and tables taken from XLSX workbooks.
//!
//! A template carries placeholder tags such as `{{NAME}}`. A JSON mapping
//! says what each tag becomes: a literal, the display value of one cell, or
//! a rendered cell range (a table, one table per row, or plain text lines).
//! Everything else in the template is left as it was.
//!
//! ## Features
//!
//! - Range expressions with auto-detected rows (`A1:G60`, `A5:G`, `A:G`)
//! - Cell values shown as the spreadsheet displays them (dates, percents,
//!   thousands separators)
//! - Tags split across runs or sprinkled with invisible marks are still found
//! - Right-to-left ranges rendered mirrored, with bidi paragraphs
//! - Pluggable merge and border rules for rendered tables
//! - Failed entries reported inline in the output document
//!
//! ## Example
//!
//! ```no_run
//! use sheetdoc::prelude::*;
//!
//! let template = std::fs::read("template.docx")?;
//! let workbook = std::fs::read("report.xlsx")?;
//! let mapping = MappingSet::from_json(r#"{
//!     "NAME": "B2",
//!     "TABLE": { "sheet": "Data", "range": "A1:D" }
//! }"#)?;
//!
//! let assembler = DocumentAssembler::new(RenderOptions::default());
//! let output = assembler.render(&template, &workbook, &mapping)?;
//! std::fs::write("out.docx", output)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accessor;
pub mod assembler;
pub mod error;
pub mod locator;
pub mod mapping;
pub mod options;
pub mod prelude;
pub mod range;
pub mod render;
pub mod replace;

pub use accessor::{ResolvedCell, WorkbookAccessor};
pub use assembler::{DocumentAssembler, EntryOutcome, RenderReport};
pub use error::{
    EngineError, InvalidCellAddressError, MappingError, RangeParseError, Result,
    TagNotFoundError,
};
pub use locator::{
    find_all_placeholders, find_span, locate, locate_all, normalize, CellPath, DocumentAnchor,
    TextPos, TextSpan,
};
pub use mapping::{
    Align, BorderRule, Direction, MappingEntry, MappingResolver, MappingSet, RenderMode,
    RunStyleOverride, TableField, TableMapping, TextMapping, TextValue,
};
pub use options::{MissingTagPolicy, RenderOptions};
pub use range::{col_to_idx, idx_to_col, parse_range, RangeSpec, RowSpanSource};
pub use render::{
    BoldNumericBorders, BoldRowRules, BorderPolicy, CellGroup, MergeBackward, MergePolicy,
    NoBorders, NoMerge, RenderedBlock, TableRenderOptions, TableRenderer,
};
pub use replace::{remove_tag, replace_all, replace_in_paragraph, OverrideStyle, ReplaceStrategy};

// Re-export the document and workbook layers
pub use sheetdoc_core::{Workbook, Worksheet};
pub use sheetdoc_docx::{Block, Document, DocxError, DocxPackage, Paragraph, Table};
pub use sheetdoc_xlsx::{XlsxError, XlsxReader};
