//! Worksheet type

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::Style;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
    /// Sheet is visible
    visible: bool,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            visible: true,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hidden sheets are kept but flagged
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set sheet visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Get cell value (empty when nothing is stored)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        Ok(self
            .cell(address)?
            .map(|c| c.value.clone())
            .unwrap_or_default())
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get the style applied to a cell; cells without one get the default style.
    pub fn cell_style_at(&self, row: u32, col: u16) -> &Style {
        let idx = self.cells.get(row, col).map_or(0, |c| c.style_index);
        self.cells
            .style_pool()
            .get(idx)
            .unwrap_or_else(|| self.cells.style_pool().default_style())
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set value and style of a cell in one step
    pub fn set_cell_at(&mut self, row: u32, col: u16, value: CellValue, style: &Style) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells
            .set(row, col, CellData::with_style(value, style_index));
        Ok(())
    }

    // === Range Operations ===

    /// Get the used range (bounds of all stored cells)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    /// Number of rows up to the last stored cell (1-based row count, 0 if empty)
    pub fn max_row(&self) -> u32 {
        self.cells
            .used_bounds()
            .map_or(0, |(_, _, max_row, _)| max_row + 1)
    }

    /// Iterate over stored cells inside a block of rows and columns (0-based, inclusive)
    pub fn iter_block(
        &self,
        start_row: u32,
        end_row: u32,
        start_col: u16,
        end_col: u16,
    ) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter_block(start_row..=end_row, start_col..=end_col)
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::HorizontalAlignment;

    #[test]
    fn test_new_worksheet() {
        let ws = Worksheet::new("Data");
        assert_eq!(ws.name(), "Data");
        assert!(ws.is_visible());
        assert!(ws.used_range().is_none());
        assert_eq!(ws.max_row(), 0);
    }

    #[test]
    fn test_set_cell_values() {
        let mut ws = Worksheet::new("Sheet1");

        ws.set_cell_value("A1", "Item").unwrap();
        ws.set_cell_value("B2", 10.0).unwrap();

        assert_eq!(ws.get_value("A1").unwrap().as_string(), Some("Item"));
        assert_eq!(ws.cell_at(1, 1).unwrap().value.as_number(), Some(10.0));
        assert!(ws.get_value("C3").unwrap().is_empty());
        assert!(ws.get_value("3C").is_err());
        assert!(ws.set_cell_value_at(0, MAX_COLS, 1.0).is_err());
    }

    #[test]
    fn test_cell_styles() {
        let mut ws = Worksheet::new("Sheet1");
        let style = Style::new()
            .bold(true)
            .horizontal_alignment(HorizontalAlignment::Center);

        ws.set_cell_at(0, 0, CellValue::from(5.0), &style).unwrap();
        assert!(ws.cell_style_at(0, 0).font.bold);
        assert!(ws.cell_style_at(0, 0).alignment.horizontal.is_centered());
        assert!(!ws.cell_style_at(4, 4).font.bold);
    }

    #[test]
    fn test_used_range() {
        let mut ws = Worksheet::new("Sheet1");

        ws.set_cell_value("B2", 1.0).unwrap();
        ws.set_cell_value("D5", 2.0).unwrap();

        let range = ws.used_range().unwrap();
        assert_eq!(range.to_string(), "B2:D5");
        assert_eq!(ws.max_row(), 5);
    }
}
