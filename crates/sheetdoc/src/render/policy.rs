//! Merge and border rules for rendered tables

use log::debug;
use sheetdoc_docx::{Border, Borders, Justification, Table, TableCell};

use crate::accessor::ResolvedCell;
use crate::mapping::BorderRule;
use crate::render::numeric::is_numeric_text;

/// A rendered cell: the visible cell it shows and how many columns it spans
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellGroup {
    pub source: usize,
    pub span: u32,
}

/// Decides which visible cells of a row are merged
pub trait MergePolicy {
    /// Groups covering every visible cell, in order
    fn plan(&self, cells: &[ResolvedCell]) -> Vec<CellGroup>;
}

/// An empty cell right after a non-empty one joins it
///
/// Merges never exceed two cells, so an absorbed cell is never a predecessor.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeBackward;

impl MergePolicy for MergeBackward {
    fn plan(&self, cells: &[ResolvedCell]) -> Vec<CellGroup> {
        let mut groups: Vec<CellGroup> = Vec::with_capacity(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            if cell.is_empty && i > 0 && !cells[i - 1].is_empty {
                if let Some(last) = groups.last_mut().filter(|g| g.span == 1) {
                    last.span = 2;
                    continue;
                }
            }
            groups.push(CellGroup { source: i, span: 1 });
        }
        groups
    }
}

/// Every visible cell stands alone
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMerge;

impl MergePolicy for NoMerge {
    fn plan(&self, cells: &[ResolvedCell]) -> Vec<CellGroup> {
        (0..cells.len())
            .map(|source| CellGroup { source, span: 1 })
            .collect()
    }
}

/// Adds borders to a rendered table whose borders were all cleared
pub trait BorderPolicy {
    fn apply(&self, table: &mut Table);
}

fn cell_is_bold(cell: &TableCell) -> bool {
    cell.paragraphs()
        .flat_map(|p| p.runs())
        .any(|r| r.is_bold() && !r.text().trim().is_empty())
}

/// Top and bottom rules around bold numeric cells, which are also centred
#[derive(Debug, Clone, Copy, Default)]
pub struct BoldNumericBorders;

impl BorderPolicy for BoldNumericBorders {
    fn apply(&self, table: &mut Table) {
        for row in table.rows_mut() {
            for cell in row.cells_mut() {
                let text = cell.text();
                let bold = cell_is_bold(cell);
                let numeric = is_numeric_text(text.trim());
                debug!("cell {:?}: bold={} numeric={}", text, bold, numeric);
                if !(bold && numeric) {
                    continue;
                }
                cell.set_borders(&Borders {
                    top: Some(Border::single(6, "000000")),
                    bottom: Some(Border::single(6, "000000")),
                    left: Some(Border::nil()),
                    right: Some(Border::nil()),
                    ..Borders::default()
                });
                for p in cell.paragraphs_mut() {
                    p.set_justification(Justification::Center);
                }
            }
        }
    }
}

/// A rule above each row after the first that contains bold text
#[derive(Debug, Clone, Copy, Default)]
pub struct BoldRowRules;

impl BorderPolicy for BoldRowRules {
    fn apply(&self, table: &mut Table) {
        for row in table.rows_mut().skip(1) {
            if !row.cells().any(cell_is_bold) {
                continue;
            }
            for cell in row.cells_mut() {
                let mut borders = cell.borders().unwrap_or_else(Borders::all_nil);
                borders.top = Some(Border::single(8, "000000"));
                cell.set_borders(&borders);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoBorders;

impl BorderPolicy for NoBorders {
    fn apply(&self, _table: &mut Table) {}
}

/// The border policy for a mapping's `borderRule`
pub fn border_policy(rule: BorderRule) -> Box<dyn BorderPolicy> {
    match rule {
        BorderRule::BoldNumeric => Box::new(BoldNumericBorders),
        BorderRule::BoldRows => Box::new(BoldRowRules),
        BorderRule::None => Box::new(NoBorders),
    }
}

/// The merge policy for a mapping's `mergeBackward`
pub fn merge_policy(merge_backward: bool) -> Box<dyn MergePolicy> {
    if merge_backward {
        Box::new(MergeBackward)
    } else {
        Box::new(NoMerge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetdoc_docx::{Paragraph, Run, TableRow};

    fn cells(texts: &[&str]) -> Vec<ResolvedCell> {
        texts
            .iter()
            .map(|t| ResolvedCell {
                display_text: t.to_string(),
                is_empty: t.trim().is_empty(),
                ..ResolvedCell::blank()
            })
            .collect()
    }

    fn group(source: usize, span: u32) -> CellGroup {
        CellGroup { source, span }
    }

    #[test]
    fn test_merge_backward() {
        assert_eq!(
            MergeBackward.plan(&cells(&["Total", "", "100"])),
            vec![group(0, 2), group(2, 1)]
        );
        assert_eq!(
            MergeBackward.plan(&cells(&["a", "", "", "b"])),
            vec![group(0, 2), group(2, 1), group(3, 1)]
        );
        assert_eq!(
            MergeBackward.plan(&cells(&["", "a", "b"])),
            vec![group(0, 1), group(1, 1), group(2, 1)]
        );
        assert_eq!(NoMerge.plan(&cells(&["Total", ""])), vec![group(0, 1), group(1, 1)]);
    }

    fn cell(text: &str, bold: bool) -> TableCell {
        let mut run = Run::new(text);
        run.set_bold(bold);
        let mut p = Paragraph::new();
        p.push_run(run);
        let mut cell = TableCell::new();
        cell.blocks.push(p.into());
        cell.set_borders(&Borders::all_nil());
        cell
    }

    fn table(rows: Vec<Vec<TableCell>>) -> Table {
        let mut table = Table::new(vec![1000; 2]);
        for cells in rows {
            let mut row = TableRow::new();
            for c in cells {
                row.push_cell(c);
            }
            table.push_row(row);
        }
        table
    }

    #[test]
    fn test_bold_numeric_borders() {
        let mut t = table(vec![vec![cell("1,234.50", true), cell("1,234.50", false)]]);
        BoldNumericBorders.apply(&mut t);

        let row = t.rows().next().unwrap();
        let cells: Vec<_> = row.cells().collect();

        let bordered = cells[0].borders().unwrap();
        assert_eq!(bordered.top, Some(Border::single(6, "000000")));
        assert_eq!(bordered.bottom, Some(Border::single(6, "000000")));
        assert_eq!(bordered.left, Some(Border::nil()));
        assert_eq!(
            cells[0].paragraphs().next().unwrap().justification(),
            Some(Justification::Center)
        );

        assert_eq!(cells[1].borders(), Some(Borders::all_nil()));
        assert_eq!(cells[1].paragraphs().next().unwrap().justification(), None);
    }

    #[test]
    fn test_bold_row_rules() {
        let mut t = table(vec![
            vec![cell("Head", true), cell("", false)],
            vec![cell("a", false), cell("1", false)],
            vec![cell("Total", true), cell("9", false)],
        ]);
        BoldRowRules.apply(&mut t);

        let tops: Vec<Vec<Option<Border>>> = t
            .rows()
            .map(|r| r.cells().map(|c| c.borders().unwrap().top).collect())
            .collect();
        let nil = Some(Border::nil());
        let rule = Some(Border::single(8, "000000"));
        assert_eq!(
            tops,
            vec![
                vec![nil.clone(), nil.clone()],
                vec![nil.clone(), nil],
                vec![rule.clone(), rule]
            ]
        );
    }
}
