//! Dense cell grid built from a worksheet's addressed cells.
//!
//! The worksheet part stores a flat list of addressed cells; downstream
//! matching wants a rectangular `[row][col]` view where unpopulated
//! coordinates read as empty. Merged regions are expanded afterwards so
//! every covered coordinate carries the anchor's value.

use serde::{Serialize, Serializer};

use crate::error::{ExtractError, Result};
use crate::xlsx::address::CellAddress;
use crate::xlsx::shared_strings::SharedStrings;
use crate::xlsx::worksheet::RawCell;

/// A typed scalar cell value.
///
/// The report format is treated as closed: a worksheet cell is either a
/// shared-string reference, a number, or empty. Any other type tag means
/// the schema changed in a way the catalogs do not know about, which is a
/// hard error rather than something to silently recover from.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Render the value the way it appears as a label.
    ///
    /// Integral numbers render without a decimal point so serial date
    /// numbers survive into the date search string unchanged.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(v) => v.clone(),
            CellValue::Number(v) => format_number(*v),
            CellValue::Empty => String::new(),
        }
    }
}

fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9e15 {
        #[allow(clippy::cast_possible_truncation)]
        let int = v as i64;
        return int.to_string();
    }
    v.to_string()
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(v) => serializer.serialize_str(v),
            CellValue::Number(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 9e15 => {
                #[allow(clippy::cast_possible_truncation)]
                serializer.serialize_i64(*v as i64)
            }
            CellValue::Number(v) => serializer.serialize_f64(*v),
            CellValue::Empty => serializer.serialize_none(),
        }
    }
}

/// An inclusive rectangular merge region, zero-based.
///
/// Regions come from the worksheet's own merge declarations and are
/// assumed non-overlapping; the anchor cell is `(row_min, col_min)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRegion {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

const EMPTY: CellValue = CellValue::Empty;

/// A rectangular (jagged-safe) table of cell values.
#[derive(Debug, Default)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Build a grid from the worksheet's addressed cells.
    ///
    /// Later entries for an already-populated coordinate overwrite earlier
    /// ones; document order is authoritative.
    pub fn build(cells: &[RawCell], strings: &SharedStrings) -> Result<Self> {
        let mut grid = Grid::default();
        for cell in cells {
            let addr = CellAddress::parse(&cell.reference)?;
            let value = decode_value(cell, strings)?;
            grid.set(addr.row, addr.col, value);
        }
        Ok(grid)
    }

    /// Propagate each region's anchor value to every covered coordinate.
    ///
    /// Regions are processed in declaration order; should regions overlap,
    /// the last write wins. An anchor that was never populated propagates
    /// as empty.
    pub fn expand_merges(&mut self, regions: &[MergeRegion]) -> Result<()> {
        for region in regions {
            if region.row_max < region.row_min || region.col_max < region.col_min {
                return Err(ExtractError::MalformedMergeRegion(format!(
                    "rows {}..={}, cols {}..={}",
                    region.row_min, region.row_max, region.col_min, region.col_max
                )));
            }
            let anchor = self.value(region.row_min, region.col_min).clone();
            for row in region.row_min..=region.row_max {
                for col in region.col_min..=region.col_max {
                    self.set(row, col, anchor.clone());
                }
            }
        }
        Ok(())
    }

    /// Value at `(row, col)`; unpopulated coordinates read as empty.
    pub fn value(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    /// The populated cells of one row, possibly shorter than other rows.
    pub fn row(&self, row: usize) -> &[CellValue] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// One column collected across all rows.
    pub fn column(&self, col: usize) -> Vec<CellValue> {
        self.rows
            .iter()
            .map(|cells| cells.get(col).cloned().unwrap_or(CellValue::Empty))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn set(&mut self, row: usize, col: usize, value: CellValue) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, CellValue::Empty);
        }
        cells[col] = value;
    }
}

fn decode_value(cell: &RawCell, strings: &SharedStrings) -> Result<CellValue> {
    match cell.cell_type.as_deref() {
        Some("s") => {
            let index: usize = cell.value.trim().parse()?;
            Ok(CellValue::Text(strings.resolve(index)?.to_string()))
        }
        None | Some("") => {
            if cell.value.is_empty() {
                Ok(CellValue::Empty)
            } else {
                Ok(CellValue::Number(cell.value.parse()?))
            }
        }
        Some(other) => Err(ExtractError::UnknownCellType {
            cell_type: other.to_string(),
            reference: cell.reference.clone(),
        }),
    }
}
