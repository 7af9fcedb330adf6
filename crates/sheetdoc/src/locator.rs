//! Finding tags in a document
//!
//! Matching works on a normalized view of paragraph text: whitespace and
//! invisible formatting marks are ignored, so `{{ NAME }}` or a tag with a
//! stray bidi mark still matches `{{NAME}}`. Results are owned index paths,
//! never borrows into the document.
//!
//! Only a paragraph's direct runs are searched. A tag written inside a
//! `w:hyperlink`, `w:ins` or `w:smartTag` wrapper is not found and the
//! wrapper is left untouched.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use sheetdoc_docx::{Block, Document, Paragraph, ParagraphChild, RunContent, Table};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^}]+)\}\}").expect("valid regex"));

fn is_invisible(c: char) -> bool {
    matches!(c,
        '\u{200B}'..='\u{200F}'
        | '\u{202A}'..='\u{202E}'
        | '\u{2066}'..='\u{2069}'
        | '\u{FEFF}'
        | '\u{00AD}')
}

fn is_ignored(c: char) -> bool {
    c.is_whitespace() || is_invisible(c)
}

/// Strip whitespace and invisible formatting characters
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !is_ignored(*c)).collect()
}

/// One step into a table: row, cell, then block within the cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPath {
    pub row: usize,
    pub cell: usize,
    pub block: usize,
}

/// Location of a paragraph in the document body
///
/// `block` indexes the body. Each `nested` step descends into the table at
/// the current block, so an empty `nested` means a body paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentAnchor {
    pub block: usize,
    pub nested: Vec<CellPath>,
}

impl DocumentAnchor {
    pub fn body(block: usize) -> Self {
        Self {
            block,
            nested: Vec::new(),
        }
    }

    pub fn is_in_table_cell(&self) -> bool {
        !self.nested.is_empty()
    }

    pub fn paragraph<'d>(&self, document: &'d Document) -> Option<&'d Paragraph> {
        let (blocks, index) = container(&document.body, self.block, &self.nested)?;
        match blocks.get(index)? {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn paragraph_mut<'d>(&self, document: &'d mut Document) -> Option<&'d mut Paragraph> {
        let (blocks, index) = container_mut(&mut document.body, self.block, &self.nested)?;
        match blocks.get_mut(index)? {
            Block::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// The block list holding the anchor paragraph, and its index there
    pub fn container_mut<'d>(
        &self,
        document: &'d mut Document,
    ) -> Option<(&'d mut Vec<Block>, usize)> {
        container_mut(&mut document.body, self.block, &self.nested)
    }
}

fn container<'d>(
    blocks: &'d [Block],
    block: usize,
    nested: &[CellPath],
) -> Option<(&'d [Block], usize)> {
    let Some((step, rest)) = nested.split_first() else {
        return Some((blocks, block));
    };
    let Block::Table(table) = blocks.get(block)? else {
        return None;
    };
    let cell = table.rows().nth(step.row)?.cells().nth(step.cell)?;
    container(&cell.blocks, step.block, rest)
}

fn container_mut<'d>(
    blocks: &'d mut Vec<Block>,
    block: usize,
    nested: &[CellPath],
) -> Option<(&'d mut Vec<Block>, usize)> {
    let Some((step, rest)) = nested.split_first() else {
        return Some((blocks, block));
    };
    let Block::Table(table) = blocks.get_mut(block)? else {
        return None;
    };
    let cell = table.rows_mut().nth(step.row)?.cells_mut().nth(step.cell)?;
    container_mut(&mut cell.blocks, step.block, rest)
}

/// Visit every paragraph: body paragraphs first, then paragraphs in tables
/// (recursively, in document order)
pub fn visit_paragraphs<F>(document: &Document, mut visit: F)
where
    F: FnMut(DocumentAnchor, &Paragraph),
{
    for (i, block) in document.body.iter().enumerate() {
        if let Block::Paragraph(p) = block {
            visit(DocumentAnchor::body(i), p);
        }
    }
    for (i, block) in document.body.iter().enumerate() {
        if let Block::Table(table) = block {
            visit_table(table, &mut DocumentAnchor::body(i), &mut visit);
        }
    }
}

fn visit_table<F>(table: &Table, anchor: &mut DocumentAnchor, visit: &mut F)
where
    F: FnMut(DocumentAnchor, &Paragraph),
{
    for (r, row) in table.rows().enumerate() {
        for (c, cell) in row.cells().enumerate() {
            for (b, block) in cell.blocks.iter().enumerate() {
                anchor.nested.push(CellPath {
                    row: r,
                    cell: c,
                    block: b,
                });
                match block {
                    Block::Paragraph(p) => visit(anchor.clone(), p),
                    Block::Table(inner) => visit_table(inner, anchor, visit),
                    Block::Other(_) => {}
                }
                anchor.nested.pop();
            }
        }
    }
}

fn contains_tag(paragraph: &Paragraph, needle: &str) -> bool {
    !needle.is_empty() && normalize(&paragraph.text()).contains(needle)
}

/// First paragraph containing `tag`
pub fn locate(document: &Document, tag: &str) -> Option<DocumentAnchor> {
    let found = locate_all(document, tag).into_iter().next();
    if let Some(anchor) = &found {
        debug!("tag {} anchored at {:?}", tag, anchor);
    }
    found
}

/// Every paragraph containing `tag`
pub fn locate_all(document: &Document, tag: &str) -> Vec<DocumentAnchor> {
    let needle = normalize(tag);
    let mut anchors = Vec::new();
    visit_paragraphs(document, |anchor, p| {
        if contains_tag(p, &needle) {
            anchors.push(anchor);
        }
    });
    anchors
}

/// Every distinct `{{NAME}}` token, in order of first occurrence
pub fn find_all_placeholders(document: &Document) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    visit_paragraphs(document, |_, p| {
        let text = normalize(&p.text());
        for m in PLACEHOLDER.find_iter(&text) {
            if !found.iter().any(|f| f == m.as_str()) {
                found.push(m.as_str().to_string());
            }
        }
    });
    found
}

/// Position of a character inside a paragraph's run text
///
/// `child` indexes the paragraph children, `content` the run content, and
/// `offset` is a byte offset into that text item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextPos {
    pub child: usize,
    pub content: usize,
    pub offset: usize,
}

/// A matched tag; `end` is exclusive and lies in the same text item as the
/// tag's last character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSpan {
    pub start: TextPos,
    pub end: TextPos,
}

/// Find `tag` in the paragraph's own runs, at or after `from`
///
/// The match tolerates run boundaries, whitespace and invisible marks
/// anywhere inside the tag. Runs nested in other elements (hyperlinks,
/// tracked insertions) are not searched.
pub fn find_span(paragraph: &Paragraph, tag: &str, from: Option<TextPos>) -> Option<TextSpan> {
    let needle: Vec<char> = normalize(tag).chars().collect();
    if needle.is_empty() {
        return None;
    }

    let mut chars: Vec<(TextPos, char)> = Vec::new();
    for (child, item) in paragraph.children.iter().enumerate() {
        let ParagraphChild::Run(run) = item else {
            continue;
        };
        for (content, rc) in run.content.iter().enumerate() {
            let RunContent::Text(text) = rc else {
                continue;
            };
            for (offset, c) in text.char_indices() {
                let pos = TextPos {
                    child,
                    content,
                    offset,
                };
                if is_ignored(c) || from.is_some_and(|f| pos < f) {
                    continue;
                }
                chars.push((pos, c));
            }
        }
    }

    let start = chars
        .windows(needle.len())
        .position(|w| w.iter().map(|(_, c)| *c).eq(needle.iter().copied()))?;
    let (first, _) = chars[start];
    let (last, last_char) = chars[start + needle.len() - 1];
    Some(TextSpan {
        start: first,
        end: TextPos {
            offset: last.offset + last_char.len_utf8(),
            ..last
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetdoc_docx::{Run, TableCell, TableRow};

    fn split_paragraph(parts: &[&str]) -> Paragraph {
        let mut p = Paragraph::new();
        for part in parts {
            p.push_run(Run::new(part));
        }
        p
    }

    fn table_with(paragraph: Paragraph) -> Table {
        let mut cell = TableCell::new();
        cell.blocks.push(Block::Paragraph(Paragraph::with_text("label")));
        cell.blocks.push(Block::Paragraph(paragraph));
        let mut row = TableRow::new();
        row.push_cell(TableCell::new());
        row.push_cell(cell);
        let mut table = Table::new(vec![100, 100]);
        table.push_row(row);
        table
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(" {{ NA\u{200F}ME }}\u{FEFF}\n"), "{{NAME}}");
        assert_eq!(normalize("a\u{00AD}b\u{2067}c"), "abc");
    }

    #[test]
    fn test_locate_body_before_tables() {
        let mut doc = Document::new();
        doc.push(table_with(Paragraph::with_text("{{X}}")));
        doc.push(Paragraph::with_text("intro"));
        doc.push(split_paragraph(&["{{", "X", "}}"]));

        assert_eq!(locate(&doc, "{{X}}"), Some(DocumentAnchor::body(2)));

        let all = locate_all(&doc, "{{X}}");
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[1],
            DocumentAnchor {
                block: 0,
                nested: vec![CellPath {
                    row: 0,
                    cell: 1,
                    block: 1
                }],
            }
        );
        assert_eq!(all[1].paragraph(&doc).unwrap().text(), "{{X}}");
        assert!(locate(&doc, "{{Y}}").is_none());
    }

    #[test]
    fn test_nested_tables() {
        let inner = table_with(Paragraph::with_text("{{DEEP}}"));
        let mut cell = TableCell::new();
        cell.blocks.push(Block::Table(inner));
        let mut row = TableRow::new();
        row.push_cell(cell);
        let mut outer = Table::new(vec![200]);
        outer.push_row(row);

        let mut doc = Document::new();
        doc.push(outer);

        let anchor = locate(&doc, "{{DEEP}}").unwrap();
        assert_eq!(anchor.nested.len(), 2);
        assert!(anchor.is_in_table_cell());

        let p = anchor.paragraph_mut(&mut doc).unwrap();
        p.clear_runs();
        assert!(locate(&doc, "{{DEEP}}").is_none());
    }

    #[test]
    fn test_find_span_across_runs() {
        let p = split_paragraph(&["Total: {", "{AMO", "UNT}} EGP"]);
        let span = find_span(&p, "{{AMOUNT}}", None).unwrap();
        assert_eq!(span.start, TextPos { child: 0, content: 0, offset: 7 });
        assert_eq!(span.end, TextPos { child: 2, content: 0, offset: 5 });
    }

    #[test]
    fn test_find_span_with_marks_and_from() {
        let p = split_paragraph(&["\u{200F}{{A}} and {{ A }}"]);
        let first = find_span(&p, "{{A}}", None).unwrap();
        assert_eq!(first.start.offset, 3);
        assert_eq!(first.end.offset, 8);

        let second = find_span(&p, "{{A}}", Some(first.end)).unwrap();
        assert_eq!(second.start.offset, 13);
        assert_eq!(second.end.offset, 20);
        assert!(find_span(&p, "{{A}}", Some(second.end)).is_none());
    }

    #[test]
    fn test_find_all_placeholders() {
        let mut doc = Document::new();
        doc.push(split_paragraph(&["{{B}} and {{", "A}}"]));
        doc.push(table_with(Paragraph::with_text("{{C}} {{B}}")));
        doc.push(Paragraph::with_text("{{ D }} {single}"));

        assert_eq!(find_all_placeholders(&doc), vec!["{{B}}", "{{A}}", "{{D}}", "{{C}}"]);
    }
}
