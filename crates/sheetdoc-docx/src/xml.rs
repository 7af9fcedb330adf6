//! Owned XML tree for package parts
//!
//! Parts are parsed with `quick-xml` into [`XmlElement`]s that keep element
//! names as written (`w:p`), attribute order and every text node including
//! whitespace, so that anything the typed model does not understand can be
//! serialized back as it was read.

use crate::error::{DocxError, DocxResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// XML declaration written at the top of every serialized part
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A node in an element's content
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with its attributes and content
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    /// Qualified name as written, e.g. `w:tcPr`
    pub name: String,
    /// Attributes in document order (qualified name, unescaped value)
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Builder: append a text node
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    /// Check the local name
    pub fn is(&self, local_name: &str) -> bool {
        self.local_name() == local_name
    }

    /// Attribute value by exact qualified name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute value by local name, ignoring the prefix (`val` matches `w:val`)
    pub fn attr_local(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| local(k) == local_name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing one with the same name
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key.to_string(), value)),
        }
    }

    /// Child elements, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name
    pub fn child(&self, local_name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(local_name))
    }

    /// Concatenated text of all descendant text and CDATA nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize this element (without a declaration)
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }
}

fn local(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, l)| l)
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for node in &element.children {
        match node {
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
            XmlNode::Element(e) => collect_text(e, out),
            XmlNode::Comment(_) => {}
        }
    }
}

/// Parse a complete XML part and return its root element
pub fn parse(bytes: &[u8]) -> DocxResult<XmlElement> {
    let mut reader = Reader::from_reader(bytes);
    // Whitespace inside w:t is content
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => stack.push(start_element(&e)?),
            Event::Empty(e) => {
                let element = start_element(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DocxError::Parse("unbalanced end tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(e) => {
                // Text outside the root element is ignorable whitespace
                if let Some(parent) = stack.last_mut() {
                    let text = e.unescape()?;
                    parent.children.push(XmlNode::Text(text.into_owned()));
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    parent.children.push(XmlNode::CData(text));
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    parent.children.push(XmlNode::Comment(text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DocxError::Parse("unexpected end of document".into()));
    }
    root.ok_or_else(|| DocxError::Parse("document has no root element".into()))
}

fn start_element(e: &BytesStart<'_>) -> DocxResult<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(|err| DocxError::Parse(err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> DocxResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(DocxError::Parse("multiple root elements".into())),
    }
    Ok(())
}

/// Serialize a root element as a complete part, declaration included
pub fn write_document(root: &XmlElement) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    out.push_str("\r\n");
    write_element(root, &mut out);
    out
}

/// Append the serialized form of `element` to `out`
pub fn write_element(element: &XmlElement, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attributes {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }

    if element.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for node in &element.children {
        match node {
            XmlNode::Element(child) => write_element(child, out),
            XmlNode::Text(text) => out.push_str(&escape_text(text)),
            XmlNode::CData(text) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            XmlNode::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}

/// Escape character data
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value (always written double-quoted)
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_keeps_whitespace_and_names() {
        let xml = r#"<?xml version="1.0"?><w:p xmlns:w="urn:w"><w:r><w:t xml:space="preserve"> a &amp; b </w:t></w:r></w:p>"#;
        let root = parse(xml.as_bytes()).unwrap();

        assert_eq!(root.name, "w:p");
        assert_eq!(root.local_name(), "p");
        let t = root.child("r").and_then(|r| r.child("t")).unwrap();
        assert_eq!(t.attr("xml:space"), Some("preserve"));
        assert_eq!(t.text(), " a & b ");
    }

    #[test]
    fn test_round_trip_escapes() {
        let el = XmlElement::new("w:t")
            .with_attr("w:val", "say \"hi\" <now>")
            .with_text("1 < 2 & 3 > 2");
        let xml = el.to_xml_string();
        assert_eq!(
            xml,
            r#"<w:t w:val="say &quot;hi&quot; &lt;now&gt;">1 &lt; 2 &amp; 3 &gt; 2</w:t>"#
        );
        assert_eq!(parse(xml.as_bytes()).unwrap(), el);
    }

    #[test]
    fn test_attr_local_ignores_prefix() {
        let el = XmlElement::new("w:jc").with_attr("w:val", "center");
        assert_eq!(el.attr_local("val"), Some("center"));
        assert_eq!(el.attr("val"), None);
    }

    #[test]
    fn test_comments_and_cdata_survive() {
        let xml = "<a><!-- note --><![CDATA[x<y]]></a>";
        let root = parse(xml.as_bytes()).unwrap();
        assert_eq!(root.to_xml_string(), xml);
        assert_eq!(root.text(), "x<y");
    }

    #[test]
    fn test_malformed_input() {
        assert!(parse(b"").is_err());
        assert!(parse(b"<a><b></a>").is_err());
    }
}
