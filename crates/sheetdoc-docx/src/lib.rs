//! # sheetdoc-docx
//!
//! DOCX (WordprocessingML) package reader and writer for sheetdoc.
//!
//! The main document part is parsed into an owned tree of [`Block`]s
//! (paragraphs, tables and opaque elements). Everything the model does not
//! interpret is kept as raw XML and written back unchanged, and every other
//! package part passes through byte-for-byte.
//!
//! ```no_run
//! use sheetdoc_docx::DocxPackage;
//!
//! let mut package = DocxPackage::read_file("template.docx")?;
//! for paragraph in package.document().paragraphs() {
//!     println!("{}", paragraph.text());
//! }
//! package.save("copy.docx")?;
//! # Ok::<(), sheetdoc_docx::DocxError>(())
//! ```

pub mod document;
pub mod error;
pub mod package;
pub mod paragraph;
pub mod properties;
pub mod table;
pub mod xml;

pub use document::{Block, Document};
pub use error::{DocxError, DocxResult};
pub use package::DocxPackage;
pub use paragraph::{Justification, Paragraph, ParagraphChild, Run, RunContent};
pub use properties::{Border, Borders, PropKind, Properties};
pub use table::{RowContent, Table, TableCell, TableContent, TableRow};
pub use xml::{XmlElement, XmlNode};

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Twips per inch (1 twip = 1/20 pt)
pub const TWIPS_PER_INCH: u32 = 1440;
