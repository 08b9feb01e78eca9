//! Record assembly.
//!
//! Re-keys one report's data sheet by meaning: the volatile row and column
//! labels are resolved through the header catalogs, and every region's
//! values are collected under stable semantic field names. The nationwide
//! total (`DE`) is split out from the per-state entries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::date::resolve_report_date;
use crate::error::{ExtractError, Result};
use crate::headers::{COLUMN_HEADERS, STATE_HEADERS, match_headers};
use crate::xlsx::grid::CellValue;
use crate::xlsx::shared_strings::SharedStrings;
use crate::xlsx::workbook;
use crate::xlsx::worksheet::SheetData;

/// Reports on or after this date carry an extra leading column in the
/// data sheet.
const COLUMN_INSERTION_DATE: &str = "2021-01-07";

/// Relationship id of the data sheet in the workbook manifest.
const DATA_SHEET_REL: &str = "rId2";

/// Semantic values of one region (a Bundesland or the nationwide total).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    pub code: String,
    pub title: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, CellValue>,
}

/// The final keyed record of one report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Canonical report timestamp, `"YYYY-MM-DD HH:MM"`.
    pub date: String,
    /// Nationwide totals.
    pub germany: RegionReport,
    /// Per-state values, keyed by state code.
    pub states: BTreeMap<String, RegionReport>,
}

/// Extract the keyed record from one report's workbook parts.
///
/// `filename` is carried through for error context only.
pub fn extract_record(
    workbook_xml: &str,
    data_sheet_xml: &str,
    front_sheet_xml: &str,
    shared_strings_xml: &str,
    filename: &str,
) -> Result<Record> {
    let strings = SharedStrings::parse(shared_strings_xml)?;
    let front_sheet = SheetData::parse(front_sheet_xml)?.into_grid(&strings)?;
    let data_sheet = SheetData::parse(data_sheet_xml)?.into_grid(&strings)?;

    let sheet_name = workbook::sheet_name_for_rel(workbook_xml, DATA_SHEET_REL)?.unwrap_or_default();
    let date = resolve_report_date(filename, &sheet_name, &front_sheet)?;

    let col_offset = usize::from(date.as_str() >= COLUMN_INSERTION_DATE);
    let row_offset = 0;

    let columns = match_headers(COLUMN_HEADERS, data_sheet.row(row_offset), col_offset)?;
    let rows = match_headers(STATE_HEADERS, &data_sheet.column(col_offset), row_offset)?;

    let mut germany = None;
    let mut states = BTreeMap::new();
    for row in &rows {
        let mut values = BTreeMap::new();
        for column in &columns {
            values.insert(
                column.name.to_string(),
                data_sheet.value(row.index, column.index).clone(),
            );
        }
        let report = RegionReport {
            code: row.name.to_string(),
            title: row.title.to_string(),
            values,
        };
        if row.name == "DE" {
            germany = Some(report);
        } else {
            states.insert(row.name.to_string(), report);
        }
    }

    // The catalog marks "Gesamt" as required, so a validated pass always
    // yields it.
    let germany = germany.ok_or_else(|| ExtractError::MissingRequiredHeader {
        entry: "Gesamt".to_string(),
    })?;

    Ok(Record {
        date,
        germany,
        states,
    })
}
