//! Tables (`w:tbl`, `w:tr`, `w:tc`)

use crate::document::Block;
use crate::paragraph::{Justification, Paragraph};
use crate::properties::{Borders, PropKind, Properties};
use crate::xml::XmlElement;

/// Content of a table
#[derive(Debug, Clone, PartialEq)]
pub enum TableContent {
    Row(TableRow),
    Other(XmlElement),
}

/// A table
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub properties: Properties,
    /// Grid column widths in twips
    pub grid: Vec<u32>,
    pub content: Vec<TableContent>,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Table {
    /// An empty table with the given grid
    pub fn new(grid: Vec<u32>) -> Self {
        Self {
            properties: Properties::new(PropKind::Table),
            grid,
            content: Vec::new(),
        }
    }

    pub fn from_element(element: &XmlElement) -> Self {
        let mut table = Self::default();
        for child in element.elements() {
            match child.local_name() {
                "tblPr" => table.properties = Properties::from_element(PropKind::Table, child),
                "tblGrid" => {
                    table.grid = child
                        .elements()
                        .filter(|c| c.is("gridCol"))
                        .map(|c| c.attr_local("w").and_then(|w| w.parse().ok()).unwrap_or(0))
                        .collect()
                }
                "tr" => table
                    .content
                    .push(TableContent::Row(TableRow::from_element(child))),
                _ => table.content.push(TableContent::Other(child.clone())),
            }
        }
        table
    }

    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:tbl");
        element = element.with_child(
            self.properties
                .to_element()
                .unwrap_or_else(|| XmlElement::new("w:tblPr")),
        );
        let mut grid = XmlElement::new("w:tblGrid");
        for width in &self.grid {
            grid = grid.with_child(XmlElement::new("w:gridCol").with_attr("w:w", width.to_string()));
        }
        element = element.with_child(grid);
        for item in &self.content {
            element = element.with_child(match item {
                TableContent::Row(row) => row.to_element(),
                TableContent::Other(other) => other.clone(),
            });
        }
        element
    }

    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.content.iter().filter_map(|c| match c {
            TableContent::Row(r) => Some(r),
            TableContent::Other(_) => None,
        })
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut TableRow> {
        self.content.iter_mut().filter_map(|c| match c {
            TableContent::Row(r) => Some(r),
            TableContent::Other(_) => None,
        })
    }

    pub fn push_row(&mut self, row: TableRow) {
        self.content.push(TableContent::Row(row));
    }

    pub fn set_justification(&mut self, jc: Justification) {
        self.properties.set_val("jc", jc.as_str());
    }

    pub fn justification(&self) -> Option<Justification> {
        self.properties.val("jc").and_then(Justification::parse)
    }

    /// `w:tblW` with `w:type="auto"`
    pub fn set_auto_width(&mut self) {
        self.properties.set(
            XmlElement::new("w:tblW")
                .with_attr("w:w", "0")
                .with_attr("w:type", "auto"),
        );
    }

    pub fn set_borders(&mut self, borders: &Borders) {
        self.properties.set(borders.to_element("w:tblBorders"));
    }

    pub fn borders(&self) -> Option<Borders> {
        self.properties.get("tblBorders").map(Borders::from_element)
    }
}

/// Content of a table row
#[derive(Debug, Clone, PartialEq)]
pub enum RowContent {
    Cell(TableCell),
    Other(XmlElement),
}

/// A table row
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub attributes: Vec<(String, String)>,
    pub properties: Properties,
    pub content: Vec<RowContent>,
}

impl Default for TableRow {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRow {
    pub fn new() -> Self {
        Self {
            attributes: Vec::new(),
            properties: Properties::new(PropKind::TableRow),
            content: Vec::new(),
        }
    }

    pub fn from_element(element: &XmlElement) -> Self {
        let mut row = Self::new();
        row.attributes = element.attributes.clone();
        for child in element.elements() {
            match child.local_name() {
                "trPr" => row.properties = Properties::from_element(PropKind::TableRow, child),
                "tc" => row.content.push(RowContent::Cell(TableCell::from_element(child))),
                _ => row.content.push(RowContent::Other(child.clone())),
            }
        }
        row
    }

    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:tr");
        element.attributes = self.attributes.clone();
        // w:tblPrEx precedes w:trPr
        let (pre, rest): (Vec<_>, Vec<_>) = self
            .content
            .iter()
            .partition(|c| matches!(c, RowContent::Other(e) if e.is("tblPrEx")));
        for item in pre {
            if let RowContent::Other(e) = item {
                element = element.with_child(e.clone());
            }
        }
        if let Some(trpr) = self.properties.to_element() {
            element = element.with_child(trpr);
        }
        for item in rest {
            element = element.with_child(match item {
                RowContent::Cell(cell) => cell.to_element(),
                RowContent::Other(other) => other.clone(),
            });
        }
        element
    }

    pub fn cells(&self) -> impl Iterator<Item = &TableCell> {
        self.content.iter().filter_map(|c| match c {
            RowContent::Cell(cell) => Some(cell),
            RowContent::Other(_) => None,
        })
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut TableCell> {
        self.content.iter_mut().filter_map(|c| match c {
            RowContent::Cell(cell) => Some(cell),
            RowContent::Other(_) => None,
        })
    }

    pub fn push_cell(&mut self, cell: TableCell) {
        self.content.push(RowContent::Cell(cell));
    }
}

/// A table cell; its content is a sequence of blocks
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub properties: Properties,
    pub blocks: Vec<Block>,
}

impl Default for TableCell {
    fn default() -> Self {
        Self::new()
    }
}

impl TableCell {
    pub fn new() -> Self {
        Self {
            properties: Properties::new(PropKind::TableCell),
            blocks: Vec::new(),
        }
    }

    pub fn from_element(element: &XmlElement) -> Self {
        let mut cell = Self::new();
        for child in element.elements() {
            match child.local_name() {
                "tcPr" => cell.properties = Properties::from_element(PropKind::TableCell, child),
                _ => cell.blocks.push(Block::from_element(child)),
            }
        }
        cell
    }

    pub fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new("w:tc");
        if let Some(tcpr) = self.properties.to_element() {
            element = element.with_child(tcpr);
        }
        for block in &self.blocks {
            element = element.with_child(block.to_element());
        }
        // A cell must end with a paragraph
        if !matches!(self.blocks.last(), Some(Block::Paragraph(_))) {
            element = element.with_child(Paragraph::new().to_element());
        }
        element
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    pub fn paragraphs_mut(&mut self) -> impl Iterator<Item = &mut Paragraph> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Text of the cell's paragraphs joined by newlines
    pub fn text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Preferred width in twips (`w:tcW`, type `dxa`)
    pub fn set_width(&mut self, twips: u32) {
        self.properties.set(
            XmlElement::new("w:tcW")
                .with_attr("w:w", twips.to_string())
                .with_attr("w:type", "dxa"),
        );
    }

    /// Number of grid columns spanned (1 when not set)
    pub fn grid_span(&self) -> u32 {
        self.properties
            .val("gridSpan")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
    }

    pub fn set_grid_span(&mut self, span: u32) {
        if span <= 1 {
            self.properties.remove("gridSpan");
        } else {
            self.properties.set_val("gridSpan", span.to_string());
        }
    }

    pub fn set_borders(&mut self, borders: &Borders) {
        self.properties.set(borders.to_element("w:tcBorders"));
    }

    pub fn borders(&self) -> Option<Borders> {
        self.properties.get("tcBorders").map(Borders::from_element)
    }

    /// Solid background fill, `RRGGBB`
    pub fn set_shading(&mut self, fill: &str) {
        self.properties.set(
            XmlElement::new("w:shd")
                .with_attr("w:val", "clear")
                .with_attr("w:color", "auto")
                .with_attr("w:fill", fill),
        );
    }

    pub fn shading(&self) -> Option<&str> {
        self.properties.get("shd").and_then(|s| s.attr_local("fill"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::Border;
    use crate::xml::parse;
    use pretty_assertions::assert_eq;

    const TABLE: &str = r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid><w:gridCol w:w="4320"/><w:gridCol w:w="4320"/></w:tblGrid><w:tr><w:tc><w:tcPr><w:tcW w:w="4320" w:type="dxa"/></w:tcPr><w:p><w:r><w:t>a</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>{{TAG}}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#;

    #[test]
    fn test_read_table() {
        let table = Table::from_element(&parse(TABLE.as_bytes()).unwrap());
        assert_eq!(table.grid, vec![4320, 4320]);

        let row = table.rows().next().unwrap();
        let texts: Vec<_> = row.cells().map(|c| c.text()).collect();
        assert_eq!(texts, vec!["a", "{{TAG}}"]);
    }

    #[test]
    fn test_table_round_trip() {
        let table = Table::from_element(&parse(TABLE.as_bytes()).unwrap());
        let xml = table.to_element().to_xml_string();
        assert!(xml.starts_with(r#"<w:tbl><w:tblPr><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid>"#));
        assert_eq!(Table::from_element(&parse(xml.as_bytes()).unwrap()), table);
    }

    #[test]
    fn test_cell_properties() {
        let mut cell = TableCell::new();
        cell.set_shading("D9E1F2");
        cell.set_grid_span(2);
        cell.set_width(2880);
        cell.set_borders(&Borders {
            top: Some(Border::single(6, "000000")),
            ..Default::default()
        });

        let names: Vec<_> = cell
            .properties
            .items()
            .iter()
            .map(|e| e.local_name())
            .collect();
        assert_eq!(names, vec!["tcW", "gridSpan", "tcBorders", "shd"]);
        assert_eq!(cell.grid_span(), 2);
        assert_eq!(cell.shading(), Some("D9E1F2"));
    }

    #[test]
    fn test_empty_cell_gets_paragraph() {
        let xml = TableCell::new().to_element().to_xml_string();
        assert_eq!(xml, "<w:tc><w:p/></w:tc>");
    }
}
