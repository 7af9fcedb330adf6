//! The main document part (`word/document.xml`)

use crate::error::{DocxError, DocxResult};
use crate::paragraph::Paragraph;
use crate::table::Table;
use crate::xml::{self, XmlElement, XmlNode};
use crate::{R_NS, W_NS};

/// A body-level element
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
    /// Structured document tags, bookmarks and the like, kept verbatim
    Other(XmlElement),
}

impl Block {
    pub fn from_element(element: &XmlElement) -> Self {
        match element.local_name() {
            "p" => Block::Paragraph(Paragraph::from_element(element)),
            "tbl" => Block::Table(Table::from_element(element)),
            _ => Block::Other(element.clone()),
        }
    }

    pub fn to_element(&self) -> XmlElement {
        match self {
            Block::Paragraph(p) => p.to_element(),
            Block::Table(t) => t.to_element(),
            Block::Other(e) => e.clone(),
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl From<Paragraph> for Block {
    fn from(p: Paragraph) -> Self {
        Block::Paragraph(p)
    }
}

impl From<Table> for Block {
    fn from(t: Table) -> Self {
        Block::Table(t)
    }
}

/// A parsed `w:document`
///
/// The body is exposed as [`Block`]s; the final section properties are kept
/// apart so that content appended to the body stays in front of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element without its `w:body` child
    shell: XmlElement,
    /// Index of `w:body` among the root's children
    body_position: usize,
    pub body: Vec<Block>,
    pub sect_pr: Option<XmlElement>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document declaring the main and relationship namespaces
    pub fn new() -> Self {
        Self {
            shell: XmlElement::new("w:document")
                .with_attr("xmlns:w", W_NS)
                .with_attr("xmlns:r", R_NS),
            body_position: 0,
            body: Vec::new(),
            sect_pr: None,
        }
    }

    /// Parse `word/document.xml`
    pub fn from_bytes(bytes: &[u8]) -> DocxResult<Self> {
        let mut root = xml::parse(bytes)?;
        if !root.is("document") {
            return Err(DocxError::InvalidFormat(format!(
                "expected w:document, found {}",
                root.name
            )));
        }

        let body_position = root
            .children
            .iter()
            .position(|n| matches!(n, XmlNode::Element(e) if e.is("body")))
            .ok_or_else(|| DocxError::InvalidFormat("document has no w:body".into()))?;
        let XmlNode::Element(body) = root.children.remove(body_position) else {
            return Err(DocxError::InvalidFormat("document has no w:body".into()));
        };

        let mut blocks = Vec::new();
        let mut sect_pr = None;
        for child in body.elements() {
            if child.is("sectPr") {
                sect_pr = Some(child.clone());
            } else {
                blocks.push(Block::from_element(child));
            }
        }

        Ok(Self {
            shell: root,
            body_position,
            body: blocks,
            sect_pr,
        })
    }

    /// The root element with the body reassembled
    pub fn to_element(&self) -> XmlElement {
        let mut body = XmlElement::new(format!("{}body", self.prefix()));
        for block in &self.body {
            body = body.with_child(block.to_element());
        }
        if let Some(sect_pr) = &self.sect_pr {
            body = body.with_child(sect_pr.clone());
        }

        let mut root = self.shell.clone();
        let at = self.body_position.min(root.children.len());
        root.children.insert(at, XmlNode::Element(body));
        root
    }

    /// Serialize as a complete part
    pub fn to_xml_string(&self) -> String {
        xml::write_document(&self.to_element())
    }

    fn prefix(&self) -> &str {
        match self.shell.name.split_once(':') {
            Some((prefix, _)) => &self.shell.name[..prefix.len() + 1],
            None => "",
        }
    }

    /// Body-level paragraphs (not those nested in tables)
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(Block::as_paragraph)
    }

    /// Body-level tables
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(Block::as_table)
    }

    pub fn push(&mut self, block: impl Into<Block>) {
        self.body.push(block.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <w:background w:color="FFFFFF"/>
  <w:body>
    <w:p><w:r><w:t>Hello {{NAME}}</w:t></w:r></w:p>
    <w:tbl><w:tblPr/><w:tblGrid><w:gridCol w:w="100"/></w:tblGrid><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>
    <w:sdt><w:sdtContent/></w:sdt>
    <w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>
  </w:body>
</w:document>"#;

    #[test]
    fn test_read_document() {
        let doc = Document::from_bytes(DOC.as_bytes()).unwrap();

        assert_eq!(doc.body.len(), 3);
        assert_eq!(doc.paragraphs().next().unwrap().text(), "Hello {{NAME}}");
        assert_eq!(doc.tables().count(), 1);
        assert!(matches!(&doc.body[2], Block::Other(e) if e.is("sdt")));
        assert!(doc.sect_pr.is_some());
    }

    #[test]
    fn test_appended_content_precedes_sect_pr() {
        let mut doc = Document::from_bytes(DOC.as_bytes()).unwrap();
        doc.push(Paragraph::with_text("appended"));

        let xml = doc.to_xml_string();
        let appended = xml.find("appended").unwrap();
        let sect = xml.find("<w:sectPr>").unwrap();
        assert!(appended < sect);
        assert!(xml.contains(r#"<w:background w:color="FFFFFF"/>"#));
    }

    #[test]
    fn test_round_trip() {
        let doc = Document::from_bytes(DOC.as_bytes()).unwrap();
        let again = Document::from_bytes(doc.to_xml_string().as_bytes()).unwrap();
        assert_eq!(again.body, doc.body);
        assert_eq!(again.sect_pr, doc.sect_pr);
    }

    #[test]
    fn test_not_a_document() {
        assert!(Document::from_bytes(b"<w:styles xmlns:w=\"x\"/>").is_err());
        assert!(Document::from_bytes(b"<w:document xmlns:w=\"x\"/>").is_err());
    }
}
