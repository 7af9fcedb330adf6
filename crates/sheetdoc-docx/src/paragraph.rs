//! Paragraphs (`w:p`) and runs (`w:r`)

use crate::properties::{PropKind, Properties};
use crate::xml::{XmlElement, XmlNode};

/// Paragraph justification (`w:jc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justification {
    Left,
    Center,
    Right,
    Both,
}

impl Justification {
    pub fn as_str(self) -> &'static str {
        match self {
            Justification::Left => "left",
            Justification::Center => "center",
            Justification::Right => "right",
            Justification::Both => "both",
        }
    }

    /// Parse a `w:jc` value; `start`/`end` are the bidi-aware spellings
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" | "start" => Some(Justification::Left),
            "center" => Some(Justification::Center),
            "right" | "end" => Some(Justification::Right),
            "both" | "distribute" => Some(Justification::Both),
            _ => None,
        }
    }
}

/// Content of a paragraph
#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphChild {
    Run(Run),
    /// Anything else (hyperlinks, bookmarks, fields...), kept verbatim
    ///
    /// Runs nested in wrappers such as `w:hyperlink`, `w:ins` or
    /// `w:smartTag` stay inside this element and are not part of
    /// [`Paragraph::text`].
    Other(XmlElement),
}

/// A paragraph
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    /// Attributes of the `w:p` element (rsid, paraId...)
    pub attributes: Vec<(String, String)>,
    pub properties: Properties,
    pub children: Vec<ParagraphChild>,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Paragraph {
    /// An empty paragraph
    pub fn new() -> Self {
        Self {
            attributes: Vec::new(),
            properties: Properties::new(PropKind::Paragraph),
            children: Vec::new(),
        }
    }

    /// A paragraph holding one plain run
    pub fn with_text(text: &str) -> Self {
        let mut paragraph = Self::new();
        paragraph.push_run(Run::new(text));
        paragraph
    }

    pub fn from_element(element: &XmlElement) -> Self {
        let mut paragraph = Self::new();
        paragraph.attributes = element.attributes.clone();
        for child in element.elements() {
            match child.local_name() {
                "pPr" => {
                    paragraph.properties = Properties::from_element(PropKind::Paragraph, child)
                }
                "r" => paragraph
                    .children
                    .push(ParagraphChild::Run(Run::from_element(child))),
                _ => paragraph.children.push(ParagraphChild::Other(child.clone())),
            }
        }
        paragraph
    }

    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:p");
        element.attributes = self.attributes.clone();
        if let Some(ppr) = self.properties.to_element() {
            element = element.with_child(ppr);
        }
        for child in &self.children {
            element = element.with_child(match child {
                ParagraphChild::Run(run) => run.to_element(),
                ParagraphChild::Other(other) => other.clone(),
            });
        }
        element
    }

    /// Text of the paragraph's own runs
    /// Text of the paragraph's direct runs
    pub fn text(&self) -> String {
        self.runs().map(|r| r.text()).collect()
    }

    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        self.children.iter().filter_map(|c| match c {
            ParagraphChild::Run(r) => Some(r),
            ParagraphChild::Other(_) => None,
        })
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.children.iter_mut().filter_map(|c| match c {
            ParagraphChild::Run(r) => Some(r),
            ParagraphChild::Other(_) => None,
        })
    }

    pub fn push_run(&mut self, run: Run) {
        self.children.push(ParagraphChild::Run(run));
    }

    /// Remove every run, keeping other content such as bookmarks
    pub fn clear_runs(&mut self) {
        self.children
            .retain(|c| matches!(c, ParagraphChild::Other(_)));
    }

    pub fn justification(&self) -> Option<Justification> {
        self.properties.val("jc").and_then(Justification::parse)
    }

    pub fn set_justification(&mut self, jc: Justification) {
        self.properties.set_val("jc", jc.as_str());
    }

    /// Right-to-left paragraph (`w:bidi`)
    pub fn is_bidi(&self) -> bool {
        self.properties.flag("bidi")
    }

    pub fn set_bidi(&mut self, bidi: bool) {
        self.properties.set_flag("bidi", bidi);
    }

    /// Whether the paragraph has no text at all
    pub fn is_blank(&self) -> bool {
        self.runs().all(|r| r.text().is_empty())
    }
}

/// Content of a run
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    /// `w:t`
    Text(String),
    /// `w:tab`
    Tab,
    /// `w:br` or `w:cr`, attributes kept
    Break(XmlElement),
    /// Anything else (drawings, field characters...), kept verbatim
    Other(XmlElement),
}

/// A run of text sharing one set of character properties
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub attributes: Vec<(String, String)>,
    pub properties: Properties,
    pub content: Vec<RunContent>,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            properties: Properties::new(PropKind::Run),
            content: Vec::new(),
        }
    }
}

impl Run {
    /// A run holding `text` and no properties
    pub fn new(text: &str) -> Self {
        let mut run = Self::default();
        run.content.push(RunContent::Text(text.to_string()));
        run
    }

    pub fn from_element(element: &XmlElement) -> Self {
        let mut run = Self {
            attributes: element.attributes.clone(),
            ..Self::default()
        };
        for child in element.elements() {
            match child.local_name() {
                "rPr" => run.properties = Properties::from_element(PropKind::Run, child),
                "t" => run.content.push(RunContent::Text(child.text())),
                "tab" => run.content.push(RunContent::Tab),
                "br" | "cr" => run.content.push(RunContent::Break(child.clone())),
                _ => run.content.push(RunContent::Other(child.clone())),
            }
        }
        run
    }

    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:r");
        element.attributes = self.attributes.clone();
        if let Some(rpr) = self.properties.to_element() {
            element = element.with_child(rpr);
        }
        for item in &self.content {
            element = element.with_child(match item {
                RunContent::Text(text) => {
                    let mut t = XmlElement::new("w:t").with_attr("xml:space", "preserve");
                    if !text.is_empty() {
                        t.children.push(XmlNode::Text(text.clone()));
                    }
                    t
                }
                RunContent::Tab => XmlElement::new("w:tab"),
                RunContent::Break(br) => br.clone(),
                RunContent::Other(other) => other.clone(),
            });
        }
        element
    }

    /// Visible text; tabs read as `\t` and breaks as `\n`
    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.content {
            match item {
                RunContent::Text(t) => out.push_str(t),
                RunContent::Tab => out.push('\t'),
                RunContent::Break(_) => out.push('\n'),
                RunContent::Other(_) => {}
            }
        }
        out
    }

    /// Replace all text content with `text`, keeping non-text content
    pub fn set_text(&mut self, text: &str) {
        let first = self
            .content
            .iter()
            .position(|c| matches!(c, RunContent::Text(_) | RunContent::Tab | RunContent::Break(_)));
        self.content
            .retain(|c| matches!(c, RunContent::Other(_)));
        let at = first.unwrap_or(self.content.len()).min(self.content.len());
        self.content.insert(at, RunContent::Text(text.to_string()));
    }

    pub fn is_bold(&self) -> bool {
        self.properties.flag("b")
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.properties.set_flag("b", bold);
        self.properties.set_flag("bCs", bold);
    }

    pub fn is_italic(&self) -> bool {
        self.properties.flag("i")
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.properties.set_flag("i", italic);
        self.properties.set_flag("iCs", italic);
    }

    /// Font family for every script slot
    pub fn set_font_name(&mut self, name: &str) {
        self.properties.set(
            XmlElement::new("w:rFonts")
                .with_attr("w:ascii", name)
                .with_attr("w:hAnsi", name)
                .with_attr("w:eastAsia", name)
                .with_attr("w:cs", name),
        );
    }

    pub fn font_name(&self) -> Option<&str> {
        self.properties
            .get("rFonts")
            .and_then(|f| f.attr_local("ascii").or_else(|| f.attr_local("cs")))
    }

    /// Font size in half-points (`w:sz` and `w:szCs`)
    pub fn set_size_half_points(&mut self, size: u32) {
        self.properties.set_val("sz", size.to_string());
        self.properties.set_val("szCs", size.to_string());
    }

    pub fn size_half_points(&self) -> Option<u32> {
        self.properties.val("sz").and_then(|v| v.parse().ok())
    }

    /// Text color as `RRGGBB`
    pub fn set_color(&mut self, rgb: &str) {
        self.properties.set_val("color", rgb);
    }

    pub fn color(&self) -> Option<&str> {
        self.properties.val("color")
    }

    /// Underline style (`single`, `double`...); `None` removes underlining
    pub fn set_underline(&mut self, style: Option<&str>) {
        match style {
            Some(style) => self.properties.set_val("u", style),
            None => {
                self.properties.remove("u");
            }
        }
    }

    pub fn underline(&self) -> Option<&str> {
        self.properties.val("u").filter(|v| *v != "none")
    }

    /// Right-to-left run (`w:rtl`)
    pub fn set_rtl(&mut self, rtl: bool) {
        self.properties.set_flag("rtl", rtl);
    }
}
