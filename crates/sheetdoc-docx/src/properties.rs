//! Property containers (`w:pPr`, `w:rPr`, `w:tblPr`, `w:trPr`, `w:tcPr`)
//!
//! WordprocessingML property elements are schema sequences: Word rejects a
//! `w:jc` that precedes `w:bidi`, for instance. [`Properties`] stores the
//! child elements as read and inserts new ones at their sequence position.

use crate::xml::XmlElement;

/// Which property element a [`Properties`] container represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Paragraph,
    Run,
    Table,
    TableRow,
    TableCell,
}

const PPR_ORDER: &[&str] = &[
    "pStyle", "keepNext", "keepLines", "pageBreakBefore", "framePr", "widowControl",
    "numPr", "suppressLineNumbers", "pBdr", "shd", "tabs", "suppressAutoHyphens",
    "kinsoku", "wordWrap", "overflowPunct", "topLinePunct", "autoSpaceDE",
    "autoSpaceDN", "bidi", "adjustRightInd", "snapToGrid", "spacing", "ind",
    "contextualSpacing", "mirrorIndents", "suppressOverlap", "jc", "textDirection",
    "textAlignment", "textboxTightWrap", "outlineLvl", "divId", "cnfStyle", "rPr",
    "sectPr", "pPrChange",
];

const RPR_ORDER: &[&str] = &[
    "rStyle", "rFonts", "b", "bCs", "i", "iCs", "caps", "smallCaps", "strike",
    "dstrike", "outline", "shadow", "emboss", "imprint", "noProof", "snapToGrid",
    "vanish", "webHidden", "color", "spacing", "w", "kern", "position", "sz", "szCs",
    "highlight", "u", "effect", "bdr", "shd", "fitText", "vertAlign", "rtl", "cs",
    "em", "lang", "eastAsianLayout", "specVanish", "oMath", "rPrChange",
];

const TBLPR_ORDER: &[&str] = &[
    "tblStyle", "tblpPr", "tblOverlap", "bidiVisual", "tblStyleRowBandSize",
    "tblStyleColBandSize", "tblW", "jc", "tblCellSpacing", "tblInd", "tblBorders",
    "shd", "tblLayout", "tblCellMar", "tblLook", "tblCaption", "tblDescription",
    "tblPrChange",
];

const TRPR_ORDER: &[&str] = &[
    "cnfStyle", "divId", "gridBefore", "gridAfter", "wBefore", "wAfter", "cantSplit",
    "trHeight", "tblHeader", "tblCellSpacing", "jc", "hidden", "ins", "del",
    "trPrChange",
];

const TCPR_ORDER: &[&str] = &[
    "cnfStyle", "tcW", "gridSpan", "hMerge", "vMerge", "tcBorders", "shd", "noWrap",
    "tcMar", "textDirection", "tcFitText", "vAlign", "hideMark", "headers",
    "cellIns", "cellDel", "cellMerge", "tcPrChange",
];

impl PropKind {
    /// Qualified element name of the container
    pub fn tag(self) -> &'static str {
        match self {
            PropKind::Paragraph => "w:pPr",
            PropKind::Run => "w:rPr",
            PropKind::Table => "w:tblPr",
            PropKind::TableRow => "w:trPr",
            PropKind::TableCell => "w:tcPr",
        }
    }

    fn order(self) -> &'static [&'static str] {
        match self {
            PropKind::Paragraph => PPR_ORDER,
            PropKind::Run => RPR_ORDER,
            PropKind::Table => TBLPR_ORDER,
            PropKind::TableRow => TRPR_ORDER,
            PropKind::TableCell => TCPR_ORDER,
        }
    }

    fn rank(self, local_name: &str) -> usize {
        let order = self.order();
        order
            .iter()
            .position(|n| *n == local_name)
            .unwrap_or(order.len())
    }
}

/// An ordered set of property elements
#[derive(Debug, Clone, PartialEq)]
pub struct Properties {
    kind: PropKind,
    items: Vec<XmlElement>,
}

impl Properties {
    pub fn new(kind: PropKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }

    /// Build from an existing container element (`w:pPr` etc.)
    pub fn from_element(kind: PropKind, element: &XmlElement) -> Self {
        Self {
            kind,
            items: element.elements().cloned().collect(),
        }
    }

    /// Container element, or `None` when there are no properties
    pub fn to_element(&self) -> Option<XmlElement> {
        if self.items.is_empty() {
            return None;
        }
        let mut element = XmlElement::new(self.kind.tag());
        for item in &self.items {
            element = element.with_child(item.clone());
        }
        Some(element)
    }

    pub fn kind(&self) -> PropKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[XmlElement] {
        &self.items
    }

    /// Property element by local name
    pub fn get(&self, local_name: &str) -> Option<&XmlElement> {
        self.items.iter().find(|e| e.is(local_name))
    }

    /// `w:val` of a property element
    pub fn val(&self, local_name: &str) -> Option<&str> {
        self.get(local_name).and_then(|e| e.attr_local("val"))
    }

    /// Insert or replace a property element, keeping schema order
    pub fn set(&mut self, element: XmlElement) {
        let name = element.local_name().to_string();
        if let Some(existing) = self.items.iter_mut().find(|e| e.is(&name)) {
            *existing = element;
            return;
        }
        let rank = self.kind.rank(&name);
        let pos = self
            .items
            .iter()
            .position(|e| self.kind.rank(e.local_name()) > rank)
            .unwrap_or(self.items.len());
        self.items.insert(pos, element);
    }

    /// Set a property element that carries only `w:val`
    pub fn set_val(&mut self, local_name: &str, value: impl Into<String>) {
        self.set(XmlElement::new(format!("w:{}", local_name)).with_attr("w:val", value));
    }

    pub fn remove(&mut self, local_name: &str) -> Option<XmlElement> {
        let pos = self.items.iter().position(|e| e.is(local_name))?;
        Some(self.items.remove(pos))
    }

    /// An on/off property (`w:b`, `w:bidi`...). Present without `w:val` means on.
    pub fn flag(&self, local_name: &str) -> bool {
        match self.get(local_name) {
            Some(e) => !matches!(e.attr_local("val"), Some("0" | "false" | "off")),
            None => false,
        }
    }

    /// Switch an on/off property; off removes the element
    pub fn set_flag(&mut self, local_name: &str, on: bool) {
        if on {
            self.set(XmlElement::new(format!("w:{}", local_name)));
        } else {
            self.remove(local_name);
        }
    }
}

/// One border edge (`w:top`, `w:left`...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    /// Line style, e.g. `single` or `nil`
    pub val: String,
    /// Width in eighths of a point
    pub size: u32,
    pub color: String,
}

impl Border {
    /// No border
    pub fn nil() -> Self {
        Self {
            val: "nil".to_string(),
            size: 0,
            color: "auto".to_string(),
        }
    }

    pub fn single(size: u32, color: &str) -> Self {
        Self {
            val: "single".to_string(),
            size,
            color: color.to_string(),
        }
    }

    fn to_element(&self, edge: &str) -> XmlElement {
        let element = XmlElement::new(format!("w:{}", edge)).with_attr("w:val", self.val.clone());
        if self.val == "nil" {
            return element;
        }
        element
            .with_attr("w:sz", self.size.to_string())
            .with_attr("w:space", "0")
            .with_attr("w:color", self.color.clone())
    }

    fn from_element(element: &XmlElement) -> Self {
        Self {
            val: element.attr_local("val").unwrap_or("nil").to_string(),
            size: element
                .attr_local("sz")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            color: element.attr_local("color").unwrap_or("auto").to_string(),
        }
    }
}

/// Edges of a `w:tblBorders` or `w:tcBorders` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Borders {
    pub top: Option<Border>,
    pub left: Option<Border>,
    pub bottom: Option<Border>,
    pub right: Option<Border>,
    pub inside_h: Option<Border>,
    pub inside_v: Option<Border>,
}

impl Borders {
    /// Every edge, inner ones included, set to `nil`
    pub fn all_nil() -> Self {
        Self {
            top: Some(Border::nil()),
            left: Some(Border::nil()),
            bottom: Some(Border::nil()),
            right: Some(Border::nil()),
            inside_h: Some(Border::nil()),
            inside_v: Some(Border::nil()),
        }
    }

    fn edges(&self) -> [(&'static str, &Option<Border>); 6] {
        [
            ("top", &self.top),
            ("left", &self.left),
            ("bottom", &self.bottom),
            ("right", &self.right),
            ("insideH", &self.inside_h),
            ("insideV", &self.inside_v),
        ]
    }

    pub(crate) fn to_element(&self, name: &str) -> XmlElement {
        let mut element = XmlElement::new(name);
        for (edge, border) in self.edges() {
            if let Some(border) = border {
                element = element.with_child(border.to_element(edge));
            }
        }
        element
    }

    pub(crate) fn from_element(element: &XmlElement) -> Self {
        let edge = |names: &[&str]| {
            element
                .elements()
                .find(|e| names.contains(&e.local_name()))
                .map(Border::from_element)
        };
        Self {
            top: edge(&["top"]),
            left: edge(&["left", "start"]),
            bottom: edge(&["bottom"]),
            right: edge(&["right", "end"]),
            inside_h: edge(&["insideH"]),
            inside_v: edge(&["insideV"]),
        }
    }
}
