//! Parser for RKI Impfquotenmonitoring Excel reports.
//!
//! The published report series changed its layout and labeling across
//! revisions: columns were inserted, footnote rows appeared and were
//! reworded, and the date stamp was formatted in several different ways.
//! This crate decodes the spreadsheet container, rebuilds each sheet as a
//! dense grid of typed values, matches the volatile row and column labels
//! against declarative catalogs of expected semantic fields, and emits one
//! stable record per report keyed by meaning rather than by position.
//!
//! # Example
//!
//! ```rust,no_run
//! use impfmonitor::xlsx::workbook::WorkbookParts;
//! use impfmonitor::record::extract_record;
//!
//! let parts = WorkbookParts::open("impfquotenmonitoring-20210107.xlsx".as_ref())?;
//! let record = extract_record(
//!     &parts.workbook_xml,
//!     &parts.data_sheet_xml,
//!     &parts.front_sheet_xml,
//!     &parts.shared_strings_xml,
//!     "impfquotenmonitoring-20210107.xlsx",
//! )?;
//! println!("{}", record.date);
//! # Ok::<(), impfmonitor::ExtractError>(())
//! ```

pub mod date;
pub mod error;
pub mod headers;
pub mod record;
pub mod xlsx;

pub use error::{ExtractError, Result};
pub use record::{Record, extract_record};
