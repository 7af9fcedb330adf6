//! Rendering spreadsheet ranges as document content
//!
//! A range becomes one table ([`RenderMode::SingleTable`]), one table per
//! row ([`RenderMode::PerRowTable`]) or one paragraph per row
//! ([`RenderMode::PlainText`]). Right-to-left ranges are mirrored: the first
//! spreadsheet column ends up in the rightmost document column.

pub mod numeric;
pub mod policy;

use log::debug;
use sheetdoc_core::HorizontalAlignment;
use sheetdoc_docx::{Block, Borders, Justification, Paragraph, Run, Table, TableCell, TableRow};

use crate::accessor::{contains_rtl, ResolvedCell, WorkbookAccessor};
use crate::mapping::{Align, Direction, RenderMode, RunStyleOverride, TableMapping};
use crate::options::RenderOptions;
use crate::range::RangeSpec;
use crate::replace::justification;

pub use policy::{
    BoldNumericBorders, BoldRowRules, BorderPolicy, CellGroup, MergeBackward, MergePolicy,
    NoBorders, NoMerge,
};

/// Narrowest column of a per-row table (0.6in)
const MIN_ROW_TABLE_COLUMN_TWIPS: u32 = 864;

/// Output of rendering one range
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedBlock {
    Paragraphs(Vec<Paragraph>),
    Tables(Vec<Block>),
}

impl RenderedBlock {
    pub fn is_empty(&self) -> bool {
        match self {
            RenderedBlock::Paragraphs(p) => p.is_empty(),
            RenderedBlock::Tables(b) => b.is_empty(),
        }
    }

    pub fn into_blocks(self) -> Vec<Block> {
        match self {
            RenderedBlock::Paragraphs(p) => p.into_iter().map(Block::Paragraph).collect(),
            RenderedBlock::Tables(b) => b,
        }
    }
}

/// Settings for rendering one table entry
pub struct TableRenderOptions {
    pub mode: RenderMode,
    pub direction: Direction,
    pub align: Align,
    pub style: Option<RunStyleOverride>,
    pub trim_empty_edges: bool,
    pub drop_empty_cells: bool,
    pub apply_shading: bool,
    pub merge: Box<dyn MergePolicy>,
    pub borders: Box<dyn BorderPolicy>,
    /// Usable text width in twips
    pub text_width: u32,
    pub separator: String,
}

impl Default for TableRenderOptions {
    fn default() -> Self {
        Self::from_mapping(&TableMapping::new(""), &RenderOptions::default())
    }
}

impl TableRenderOptions {
    pub fn from_mapping(mapping: &TableMapping, options: &RenderOptions) -> Self {
        Self {
            mode: mapping.render_mode,
            direction: mapping.direction,
            align: mapping.align,
            style: mapping.style_override.clone(),
            trim_empty_edges: mapping.trim_empty_edges,
            drop_empty_cells: mapping.drop_empty_cells,
            apply_shading: mapping.apply_shading,
            merge: policy::merge_policy(mapping.merge_backward.unwrap_or(true)),
            borders: policy::border_policy(mapping.border_rule.unwrap_or_default()),
            text_width: options.text_width_twips,
            separator: options.plain_text_separator.clone(),
        }
    }
}

impl std::fmt::Debug for TableRenderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRenderOptions")
            .field("mode", &self.mode)
            .field("direction", &self.direction)
            .field("align", &self.align)
            .field("drop_empty_cells", &self.drop_empty_cells)
            .field("trim_empty_edges", &self.trim_empty_edges)
            .finish_non_exhaustive()
    }
}

/// Renders ranges of one worksheet
pub struct TableRenderer<'a> {
    accessor: WorkbookAccessor<'a>,
    options: &'a TableRenderOptions,
}

impl<'a> TableRenderer<'a> {
    pub fn new(accessor: WorkbookAccessor<'a>, options: &'a TableRenderOptions) -> Self {
        Self { accessor, options }
    }

    pub fn is_rtl(&self, spec: &RangeSpec) -> bool {
        match self.options.direction {
            Direction::Rtl => true,
            Direction::Ltr => false,
            Direction::Auto => self.accessor.range_has_rtl(spec),
        }
    }

    pub fn render(&self, spec: &RangeSpec) -> RenderedBlock {
        let rtl = self.is_rtl(spec);
        let rows: Vec<Vec<ResolvedCell>> = spec
            .rows()
            .map(|r| spec.cols().map(|c| self.accessor.resolve(r, c)).collect())
            .collect();
        debug!(
            "rendering {} as {:?} ({} row(s), rtl={})",
            spec,
            self.options.mode,
            rows.len(),
            rtl
        );

        match self.options.mode {
            RenderMode::PlainText => RenderedBlock::Paragraphs(self.plain_text(&rows, rtl)),
            RenderMode::SingleTable => RenderedBlock::Tables(self.single_table(&rows, rtl)),
            RenderMode::PerRowTable => RenderedBlock::Tables(self.per_row_tables(&rows, rtl)),
        }
    }

    fn plain_text(&self, rows: &[Vec<ResolvedCell>], rtl: bool) -> Vec<Paragraph> {
        let jc = if rtl {
            Justification::Right
        } else {
            justification(self.options.align)
        };
        rows.iter()
            .filter(|row| row.iter().any(|c| !c.is_empty))
            .map(|row| {
                let mut texts: Vec<&str> = row.iter().map(|c| c.display_text.as_str()).collect();
                if rtl {
                    texts.reverse();
                }
                let mut run = Run::new(&texts.join(self.options.separator.as_str()));
                if rtl {
                    run.set_rtl(true);
                }
                if let Some(style) = &self.options.style {
                    style.apply(&mut run);
                }
                let mut p = Paragraph::new();
                p.push_run(run);
                p.set_justification(jc);
                if rtl {
                    p.set_bidi(true);
                }
                p
            })
            .collect()
    }

    /// Cells of a row that make it into the document
    fn visible<'r>(&self, row: &'r [ResolvedCell]) -> Vec<&'r ResolvedCell> {
        if self.options.drop_empty_cells {
            return row.iter().filter(|c| !c.is_empty).collect();
        }
        if self.options.trim_empty_edges {
            let first = row.iter().position(|c| !c.is_empty);
            let last = row.iter().rposition(|c| !c.is_empty);
            return match (first, last) {
                (Some(first), Some(last)) => row[first..=last].iter().collect(),
                _ => Vec::new(),
            };
        }
        if row.iter().all(|c| c.is_empty) {
            return Vec::new();
        }
        row.iter().collect()
    }

    fn single_table(&self, rows: &[Vec<ResolvedCell>], rtl: bool) -> Vec<Block> {
        let visible: Vec<Vec<&ResolvedCell>> = rows
            .iter()
            .map(|r| self.visible(r))
            .filter(|v| !v.is_empty())
            .collect();
        let columns = visible.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return Vec::new();
        }

        let width = self.options.text_width / columns as u32;
        let mut table = self.new_table(columns, width, rtl);
        for cells in &visible {
            table.push_row(self.build_row(cells, columns, width, rtl));
        }
        self.options.borders.apply(&mut table);
        vec![Block::Table(table)]
    }

    fn per_row_tables(&self, rows: &[Vec<ResolvedCell>], rtl: bool) -> Vec<Block> {
        let mut blocks = Vec::new();
        for row in rows {
            let cells = self.visible(row);
            if cells.is_empty() {
                continue;
            }
            let columns = cells.len();
            let width = (self.options.text_width / columns as u32).max(MIN_ROW_TABLE_COLUMN_TWIPS);
            let mut table = self.new_table(columns, width, rtl);
            table.push_row(self.build_row(&cells, columns, width, rtl));
            self.options.borders.apply(&mut table);
            blocks.push(Block::Table(table));
            // Keeps consecutive tables from fusing into one
            blocks.push(Block::Paragraph(Paragraph::new()));
        }
        blocks
    }

    fn new_table(&self, columns: usize, width: u32, rtl: bool) -> Table {
        let mut table = Table::new(vec![width; columns]);
        table.set_auto_width();
        table.set_justification(if rtl {
            Justification::Right
        } else {
            justification(self.options.align)
        });
        table.set_borders(&Borders::all_nil());
        table
    }

    /// Lay the row out on `columns` grid columns, mirrored when `rtl`
    fn build_row(
        &self,
        cells: &[&ResolvedCell],
        columns: usize,
        width: u32,
        rtl: bool,
    ) -> TableRow {
        let owned: Vec<ResolvedCell> = cells.iter().map(|c| (*c).clone()).collect();
        let groups = self.options.merge.plan(&owned);

        // Target column -> group placed there
        let mut slots: Vec<Option<CellGroup>> = vec![None; columns];
        let mut covered = vec![false; columns];
        for group in &groups {
            let span = group.span as usize;
            let first = if rtl {
                columns - (group.source + span)
            } else {
                group.source
            };
            slots[first] = Some(*group);
            for c in covered.iter_mut().skip(first).take(span) {
                *c = true;
            }
        }

        let mut row = TableRow::new();
        for target in 0..columns {
            match slots[target] {
                Some(group) => {
                    row.push_cell(self.build_cell(cells[group.source], width, group.span, rtl))
                }
                None if !covered[target] => {
                    row.push_cell(self.build_cell(&ResolvedCell::blank(), width, 1, rtl))
                }
                None => {}
            }
        }
        row
    }

    fn build_cell(&self, source: &ResolvedCell, width: u32, span: u32, rtl: bool) -> TableCell {
        let text = source.display_text.as_str();
        let rtl_text = contains_rtl(text);

        let mut jc = match source.alignment {
            HorizontalAlignment::Right => Justification::Right,
            a if a.is_centered() => Justification::Center,
            _ => Justification::Left,
        };
        let mut paragraph = Paragraph::new();
        if rtl || rtl_text {
            paragraph.set_bidi(true);
            if jc == Justification::Left {
                jc = Justification::Right;
            }
        }
        paragraph.set_justification(jc);

        let mut run = Run::new(text);
        if let Some(name) = &source.font_name {
            run.set_font_name(name);
        }
        if let Some(size) = source.font_size {
            run.set_size_half_points((size * 2.0).round() as u32);
        }
        if source.is_bold {
            run.set_bold(true);
        }
        if source.is_italic {
            run.set_italic(true);
        }
        if let Some(color) = &source.font_color {
            run.set_color(color);
        }
        if rtl_text {
            run.set_rtl(true);
        }
        if let Some(style) = &self.options.style {
            style.apply(&mut run);
        }
        paragraph.push_run(run);

        let mut cell = TableCell::new();
        cell.set_width(width * span);
        cell.set_grid_span(span);
        cell.set_borders(&Borders::all_nil());
        if self.options.apply_shading {
            if let Some(fill) = &source.fill_color {
                cell.set_shading(fill);
            }
        }
        cell.blocks.push(Block::Paragraph(paragraph));
        cell
    }
}
