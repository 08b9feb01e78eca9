//! Minimal spreadsheet container decoding.
//!
//! Only the subset of the format needed to recover a rectangular table of
//! typed values plus merge geometry is implemented: cell addresses, the
//! shared strings table, worksheet cell lists and merge regions, and the
//! workbook manifest. Formulas, styles and charts are out of scope.

pub mod address;
pub mod grid;
pub mod shared_strings;
pub mod workbook;
pub mod worksheet;

pub use address::CellAddress;
pub use grid::{CellValue, Grid, MergeRegion};
pub use shared_strings::SharedStrings;
pub use workbook::WorkbookParts;
pub use worksheet::{RawCell, SheetData};
