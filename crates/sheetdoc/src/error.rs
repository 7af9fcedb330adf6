//! Error types for the template engine

use sheetdoc_docx::DocxError;
use sheetdoc_xlsx::XlsxError;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// A range expression that cannot be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid range '{literal}': {reason}")]
pub struct RangeParseError {
    pub literal: String,
    pub reason: String,
}

impl RangeParseError {
    pub(crate) fn new(literal: &str, reason: impl Into<String>) -> Self {
        Self {
            literal: literal.to_string(),
            reason: reason.into(),
        }
    }
}

/// A tag with no occurrence in the template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tag {tag} not found in template")]
pub struct TagNotFoundError {
    pub tag: String,
}

/// A cell reference that does not name a cell
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid cell address '{address}': {reason}")]
pub struct InvalidCellAddressError {
    pub address: String,
    pub reason: String,
}

/// A mapping configuration rejected at parse time
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("mapping is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mapping must be a JSON object keyed by tag")]
    NotAnObject,

    #[error("mapping entry {tag}: {reason}")]
    InvalidEntry { tag: String, reason: String },
}

impl MappingError {
    pub(crate) fn entry(tag: &str, reason: impl Into<String>) -> Self {
        MappingError::InvalidEntry {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while rendering a template
///
/// `Template`, `Workbook` and `Mapping` abort a render. The others are
/// scoped to one mapping entry and reported inline in the output document.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot read template: {0}")]
    Template(#[from] DocxError),

    #[error("cannot read workbook: {0}")]
    Workbook(#[from] XlsxError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    RangeParse(#[from] RangeParseError),

    #[error(transparent)]
    TagNotFound(#[from] TagNotFoundError),

    #[error(transparent)]
    InvalidCellAddress(#[from] InvalidCellAddressError),

    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),
}

impl EngineError {
    /// Whether the error aborts the whole render
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::Template(_) | EngineError::Workbook(_) | EngineError::Mapping(_)
        )
    }
}
