//! Running a whole mapping against one template

use std::fmt;
use std::path::Path;

use log::{debug, info, warn};
use sheetdoc_core::Workbook;
use sheetdoc_docx::{Block, Document, DocxPackage, Paragraph};
use sheetdoc_xlsx::XlsxReader;

use crate::error::{EngineError, RangeParseError, Result, TagNotFoundError};
use crate::locator::{locate, DocumentAnchor};
use crate::mapping::{MappingEntry, MappingResolver, MappingSet, TableMapping, TextMapping};
use crate::options::{MissingTagPolicy, RenderOptions};
use crate::range::parse_range;
use crate::render::{RenderedBlock, TableRenderOptions, TableRenderer};
use crate::replace::{remove_tag, replace_all, ReplaceStrategy};

/// What happened to one mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    Filled,
    /// The tag was found but its range held no data
    Empty,
    Failed(String),
}

impl fmt::Display for EntryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryOutcome::Filled => write!(f, "filled"),
            EntryOutcome::Empty => write!(f, "empty"),
            EntryOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Per-tag outcomes of a render, in mapping order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub outcomes: Vec<(String, EntryOutcome)>,
}

impl RenderReport {
    pub fn outcome(&self, tag: &str) -> Option<&EntryOutcome> {
        self.outcomes.iter().find(|(t, _)| t == tag).map(|(_, o)| o)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(tag, outcome)| match outcome {
            EntryOutcome::Failed(reason) => Some((tag.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Why an entry failed, with the text shown in the document for it
struct EntryFailure {
    error: EngineError,
    /// `None` suppresses the inline diagnostic
    diagnostic: Option<String>,
}

impl EntryFailure {
    fn new(error: EngineError, diagnostic: impl Into<String>) -> Self {
        Self {
            error,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Fills a template from a workbook according to a mapping
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    options: RenderOptions,
}

impl DocumentAssembler {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Parse a JSON mapping, wrapping bare keys when the options ask for it
    pub fn parse_mapping(&self, json: &str) -> Result<MappingSet> {
        Ok(MappingSet::from_json_with(json, self.options.wrap_bare_tags)?)
    }

    /// Render DOCX bytes from template and workbook bytes
    pub fn render(&self, template: &[u8], workbook: &[u8], mapping: &MappingSet) -> Result<Vec<u8>> {
        self.render_with_report(template, workbook, mapping)
            .map(|(bytes, _)| bytes)
    }

    /// Like [`render`](Self::render), also returning per-tag outcomes
    pub fn render_with_report(
        &self,
        template: &[u8],
        workbook: &[u8],
        mapping: &MappingSet,
    ) -> Result<(Vec<u8>, RenderReport)> {
        let mut package = DocxPackage::read_bytes(template)?;
        let workbook = XlsxReader::read_bytes(workbook)?;
        let report = self.render_documents(&mut package, &workbook, mapping);
        Ok((package.to_bytes()?, report))
    }

    /// Render from files; the filled package is returned for saving
    pub fn render_files<T: AsRef<Path>, W: AsRef<Path>>(
        &self,
        template: T,
        workbook: W,
        mapping: &MappingSet,
    ) -> Result<(DocxPackage, RenderReport)> {
        let mut package = DocxPackage::read_file(template)?;
        let workbook = XlsxReader::read_file(workbook)?;
        let report = self.render_documents(&mut package, &workbook, mapping);
        Ok((package, report))
    }

    /// Apply every mapping entry to an already loaded template
    pub fn render_documents(
        &self,
        package: &mut DocxPackage,
        workbook: &Workbook,
        mapping: &MappingSet,
    ) -> RenderReport {
        let resolver = MappingResolver::new(workbook, self.options.default_sheet.as_deref());
        let document = package.document_mut();
        let mut report = RenderReport::default();

        for (tag, entry) in mapping.entries() {
            let result = match entry {
                MappingEntry::Text(text) => self.apply_text(document, &resolver, tag, text),
                MappingEntry::Table(table) => self.apply_table(document, &resolver, tag, table),
            };
            let outcome = match result {
                Ok(outcome) => {
                    info!("{}: {}", tag, outcome);
                    outcome
                }
                Err(failure) => {
                    warn!("{}: {}", tag, failure.error);
                    if let Some(message) = failure.diagnostic {
                        append_diagnostic(document, &message);
                    }
                    EntryOutcome::Failed(failure.error.to_string())
                }
            };
            report.outcomes.push((tag.clone(), outcome));
        }
        report
    }

    fn not_found(&self, tag: &str) -> EntryFailure {
        let error = EngineError::from(TagNotFoundError {
            tag: tag.to_string(),
        });
        EntryFailure {
            error,
            diagnostic: match self.options.missing_tag {
                MissingTagPolicy::Warn => Some(format!("⚠️ Tag {} not found in template.", tag)),
                MissingTagPolicy::Skip => None,
            },
        }
    }

    fn apply_text(
        &self,
        document: &mut Document,
        resolver: &MappingResolver<'_>,
        tag: &str,
        mapping: &TextMapping,
    ) -> std::result::Result<EntryOutcome, EntryFailure> {
        let text = resolver.resolve_text(mapping).map_err(|e| {
            let diagnostic = format!("⚠️ {}: {}", tag, e);
            EntryFailure::new(e, diagnostic)
        })?;
        let strategy = ReplaceStrategy::for_entry(mapping.style.as_ref(), mapping.align);
        match replace_all(document, tag, &text, &strategy) {
            0 => Err(self.not_found(tag)),
            _ => Ok(EntryOutcome::Filled),
        }
    }

    fn apply_table(
        &self,
        document: &mut Document,
        resolver: &MappingResolver<'_>,
        tag: &str,
        mapping: &TableMapping,
    ) -> std::result::Result<EntryOutcome, EntryFailure> {
        let sheet = resolver.sheet_for(mapping.sheet.as_deref()).map_err(|e| {
            let diagnostic = format!("⚠️ {}: {}", tag, e);
            EntryFailure::new(e, diagnostic)
        })?;
        let accessor = resolver.accessor(sheet);

        let spec = parse_range(&mapping.range, &accessor).map_err(|e: RangeParseError| {
            let diagnostic = format!("⚠️ Invalid range '{}' for {}", mapping.range, tag);
            EntryFailure::new(e.into(), diagnostic)
        })?;

        let anchor = locate(document, tag).ok_or_else(|| self.not_found(tag))?;
        if let Some(paragraph) = anchor.paragraph_mut(document) {
            remove_tag(paragraph, tag);
        }

        let options = TableRenderOptions::from_mapping(mapping, &self.options);
        let rendered = TableRenderer::new(accessor, &options).render(&spec);
        if rendered.is_empty() {
            debug!("{}: {} on '{}' holds no data", tag, spec, sheet.name());
            return Ok(EntryOutcome::Empty);
        }
        insert_after(document, &anchor, rendered);
        Ok(EntryOutcome::Filled)
    }
}

/// Insert rendered blocks right after the anchor paragraph
fn insert_after(document: &mut Document, anchor: &DocumentAnchor, rendered: RenderedBlock) {
    let in_cell = anchor.is_in_table_cell();
    let Some((blocks, index)) = anchor.container_mut(document) else {
        return;
    };
    let at = (index + 1).min(blocks.len());
    let inserted = rendered.into_blocks();
    let count = inserted.len();
    blocks.splice(at..at, inserted);

    // A table cell must end with a paragraph
    if in_cell && at + count == blocks.len() && !matches!(blocks.last(), Some(Block::Paragraph(_)))
    {
        blocks.push(Block::Paragraph(Paragraph::new()));
    }
}

/// Diagnostic paragraph at the end of the body, ahead of the section
/// properties
fn append_diagnostic(document: &mut Document, message: &str) {
    document.push(Paragraph::with_text(message));
}
