//! Error types for report extraction.
//!
//! Every variant is fatal for the document being processed: a mislabeled
//! row or column would silently corrupt the extracted record, so the
//! pipeline surfaces the first error with enough context to diagnose a
//! schema drift by inspection instead of attempting partial recovery.

use thiserror::Error;

/// Errors raised while decoding a report workbook.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("invalid cell address: {0:?}")]
    InvalidAddress(String),

    #[error("shared string index {index} out of range (table has {len} entries)")]
    StringIndexOutOfRange { index: usize, len: usize },

    #[error("unknown cell type {cell_type:?} at {reference}")]
    UnknownCellType { cell_type: String, reference: String },

    #[error("malformed merge region: {0}")]
    MalformedMergeRegion(String),

    #[error("header label {value:?} not found in catalog [{catalog}]")]
    UnrecognizedHeader { value: String, catalog: String },

    #[error("header label {value:?} already in use")]
    DuplicateHeaderUsage { value: String },

    #[error("required header {entry:?} not present in sheet")]
    MissingRequiredHeader { entry: String },

    #[error("cannot resolve report date of {filename} (probed {search_string:?})")]
    DateUnresolved {
        filename: String,
        search_string: String,
    },

    #[error("required part not found in container: {0}")]
    MissingPart(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("integer parse error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("float parse error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
