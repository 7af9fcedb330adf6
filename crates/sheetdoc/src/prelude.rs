//! Prelude module - common imports for sheetdoc users
//!
//! ```rust
//! use sheetdoc::prelude::*;
//! ```

pub use crate::{
    // Engine
    DocumentAssembler,
    EngineError,
    EntryOutcome,
    MappingSet,
    MissingTagPolicy,
    RenderOptions,
    RenderReport,
    // Mapping types
    Align,
    Direction,
    MappingEntry,
    RenderMode,
    TableField,
    // Inputs
    DocxPackage,
    Workbook,
    XlsxReader,
};
