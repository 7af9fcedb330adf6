//! DOCX package (ZIP container) reading and writing

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use log::debug;
use zip::write::SimpleFileOptions;

use crate::document::Document;
use crate::error::{DocxError, DocxResult};
use crate::xml;

const CONTENT_TYPES: &str = "[Content_Types].xml";
const ROOT_RELS: &str = "_rels/.rels";
const DEFAULT_DOCUMENT_PATH: &str = "word/document.xml";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// A DOCX package: the parsed main document plus every other part as bytes
#[derive(Debug, Clone)]
pub struct DocxPackage {
    /// All parts in archive order; the main document entry is rewritten on save
    parts: Vec<(String, Vec<u8>)>,
    document_path: String,
    document: Document,
}

impl DocxPackage {
    /// Read a package from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> DocxResult<Self> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a package from an in-memory byte buffer
    pub fn read_bytes(bytes: &[u8]) -> DocxResult<Self> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a package from a reader
    pub fn read<R: Read + Seek>(reader: R) -> DocxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push((file.name().to_string(), data));
        }

        if !parts.iter().any(|(name, _)| name == CONTENT_TYPES) {
            return Err(DocxError::InvalidFormat(format!("Missing {}", CONTENT_TYPES)));
        }

        let document_path = match find_part(&parts, ROOT_RELS) {
            Some(rels) => main_document_path(rels)?,
            None => DEFAULT_DOCUMENT_PATH.to_string(),
        };
        let document_xml = find_part(&parts, &document_path)
            .ok_or_else(|| DocxError::MissingPart(document_path.clone()))?;
        let document = Document::from_bytes(document_xml)?;

        debug!(
            "read docx package with {} part(s), main document {} ({} block(s))",
            parts.len(),
            document_path,
            document.body.len()
        );

        Ok(Self {
            parts,
            document_path,
            document,
        })
    }

    /// Wrap a document in a minimal package (content types, relationships,
    /// main part)
    pub fn from_document(document: Document) -> Self {
        let content_types = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
            r#"</Types>"#
        );
        let rels = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
            r#"</Relationships>"#
        );
        Self {
            parts: vec![
                (CONTENT_TYPES.to_string(), content_types.as_bytes().to_vec()),
                (ROOT_RELS.to_string(), rels.as_bytes().to_vec()),
                (DEFAULT_DOCUMENT_PATH.to_string(), Vec::new()),
            ],
            document_path: DEFAULT_DOCUMENT_PATH.to_string(),
            document,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Path of the main document part inside the archive
    pub fn document_path(&self) -> &str {
        &self.document_path
    }

    /// Raw bytes of a part as read (the main document part is stale once
    /// the document has been edited)
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        find_part(&self.parts, name)
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Write the package to a writer
    pub fn write<W: Write + Seek>(&self, writer: W) -> DocxResult<()> {
        let mut zip = zip::ZipWriter::new(writer);
        // Fixed entry timestamps keep output bytes reproducible
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());

        let document_xml = self.document.to_xml_string();
        for (name, data) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            if *name == self.document_path {
                zip.write_all(document_xml.as_bytes())?;
            } else {
                zip.write_all(data)?;
            }
        }
        zip.finish()?;
        Ok(())
    }

    /// Serialize the package to bytes
    pub fn to_bytes(&self) -> DocxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to a file path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> DocxResult<()> {
        let file = File::create(path)?;
        self.write(file)
    }
}

fn find_part<'a>(parts: &'a [(String, Vec<u8>)], name: &str) -> Option<&'a [u8]> {
    parts
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, data)| data.as_slice())
}

/// Target of the `officeDocument` relationship in `_rels/.rels`
fn main_document_path(rels: &[u8]) -> DocxResult<String> {
    let root = xml::parse(rels)?;
    let target = root
        .elements()
        .filter(|e| e.is("Relationship"))
        .find(|e| {
            e.attr("Type")
                .is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL))
        })
        .and_then(|e| e.attr("Target"));
    Ok(match target {
        Some(t) => t.trim_start_matches('/').to_string(),
        None => DEFAULT_DOCUMENT_PATH.to_string(),
    })
}
