//! Tag substitution inside paragraphs

use log::debug;
use sheetdoc_docx::{
    Block, Document, Justification, Paragraph, ParagraphChild, Run, RunContent, XmlElement,
};

use crate::locator::{find_span, TextPos, TextSpan};
use crate::mapping::{Align, RunStyleOverride};

/// Formatting forced onto a replaced paragraph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideStyle {
    pub style: Option<RunStyleOverride>,
    pub align: Option<Align>,
}

/// How replacement text is styled
#[derive(Debug, Clone, PartialEq)]
pub enum ReplaceStrategy {
    /// The replacement takes on the run where the tag starts
    Preserve,
    /// The paragraph becomes one run carrying the override
    Override(OverrideStyle),
}

impl ReplaceStrategy {
    /// `Override` when either a style or an alignment is given
    pub fn for_entry(style: Option<&RunStyleOverride>, align: Option<Align>) -> Self {
        if style.is_none() && align.is_none() {
            ReplaceStrategy::Preserve
        } else {
            ReplaceStrategy::Override(OverrideStyle {
                style: style.cloned(),
                align,
            })
        }
    }
}

pub(crate) fn justification(align: Align) -> Justification {
    match align {
        Align::Left => Justification::Left,
        Align::Center => Justification::Center,
        Align::Right => Justification::Right,
    }
}

/// Replace every occurrence of `tag` in `paragraph`
///
/// Returns whether the paragraph changed.
pub fn replace_in_paragraph(
    paragraph: &mut Paragraph,
    tag: &str,
    text: &str,
    strategy: &ReplaceStrategy,
) -> bool {
    let mut from = None;
    let mut replaced = false;
    while let Some(span) = find_span(paragraph, tag, from) {
        from = Some(splice(paragraph, span, text));
        replaced = true;
    }
    if !replaced {
        return false;
    }

    if let ReplaceStrategy::Override(over) = strategy {
        let full = paragraph.text();
        paragraph.clear_runs();
        let mut run = run_from_text(&full);
        if let Some(style) = &over.style {
            style.apply(&mut run);
        }
        paragraph.push_run(run);
        if let Some(align) = over.align {
            paragraph.set_justification(justification(align));
        }
    }
    true
}

/// Replace `tag` in every paragraph of the document, tables included
///
/// Returns the number of paragraphs changed.
pub fn replace_all(
    document: &mut Document,
    tag: &str,
    text: &str,
    strategy: &ReplaceStrategy,
) -> usize {
    let count = replace_in_blocks(&mut document.body, tag, text, strategy);
    debug!("replaced {} in {} paragraph(s)", tag, count);
    count
}

fn replace_in_blocks(
    blocks: &mut [Block],
    tag: &str,
    text: &str,
    strategy: &ReplaceStrategy,
) -> usize {
    let mut count = 0;
    for block in blocks {
        match block {
            Block::Paragraph(p) => {
                if replace_in_paragraph(p, tag, text, strategy) {
                    count += 1;
                }
            }
            Block::Table(table) => {
                for row in table.rows_mut() {
                    for cell in row.cells_mut() {
                        count += replace_in_blocks(&mut cell.blocks, tag, text, strategy);
                    }
                }
            }
            Block::Other(_) => {}
        }
    }
    count
}

/// Remove `tag` from the paragraph, keeping the text around it
pub fn remove_tag(paragraph: &mut Paragraph, tag: &str) -> bool {
    replace_in_paragraph(paragraph, tag, "", &ReplaceStrategy::Preserve)
}

/// A run for `text`, with tabs and line breaks as their own content
fn run_from_text(text: &str) -> Run {
    let mut run = Run::default();
    let mut current = String::new();
    for c in text.chars() {
        match c {
            '\t' | '\n' => {
                if !current.is_empty() {
                    run.content.push(RunContent::Text(std::mem::take(&mut current)));
                }
                run.content.push(if c == '\t' {
                    RunContent::Tab
                } else {
                    RunContent::Break(XmlElement::new("w:br"))
                });
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || run.content.is_empty() {
        run.content.push(RunContent::Text(current));
    }
    run
}

/// Put `replacement` where `span` was and return the position right after it
///
/// The start run keeps its properties. Text, tabs and breaks inside the span
/// are removed from later runs, and runs left with nothing are dropped.
fn splice(paragraph: &mut Paragraph, span: TextSpan, replacement: &str) -> TextPos {
    let TextSpan { start, end } = span;
    let after = TextPos {
        offset: start.offset + replacement.len(),
        ..start
    };

    if start.child == end.child && start.content == end.content {
        if let Some(ParagraphChild::Run(run)) = paragraph.children.get_mut(start.child) {
            if let Some(RunContent::Text(text)) = run.content.get_mut(start.content) {
                text.replace_range(start.offset..end.offset, replacement);
            }
        }
        return after;
    }

    for child in start.child..=end.child {
        let Some(ParagraphChild::Run(run)) = paragraph.children.get_mut(child) else {
            continue;
        };
        let first = if child == start.child { start.content } else { 0 };
        let last = if child == end.child {
            end.content
        } else {
            usize::MAX
        };

        let content = std::mem::take(&mut run.content);
        let mut kept = Vec::with_capacity(content.len());
        for (i, item) in content.into_iter().enumerate() {
            if i < first || i > last {
                kept.push(item);
                continue;
            }
            match item {
                RunContent::Text(mut text) => {
                    if child == start.child && i == start.content {
                        text.truncate(start.offset);
                        text.push_str(replacement);
                        kept.push(RunContent::Text(text));
                    } else if child == end.child && i == end.content {
                        let rest = text.split_off(end.offset);
                        if !rest.is_empty() {
                            kept.push(RunContent::Text(rest));
                        }
                    }
                }
                RunContent::Tab | RunContent::Break(_) => {}
                other => kept.push(other),
            }
        }
        run.content = kept;
    }

    for child in (start.child + 1..=end.child).rev() {
        if matches!(&paragraph.children[child], ParagraphChild::Run(r) if r.content.is_empty()) {
            paragraph.children.remove(child);
        }
    }
    after
}
