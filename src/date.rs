//! Report date resolution.
//!
//! The series changed its date-stamp formatting several times without
//! notice, so resolution walks a closed, manually-curated list of narrow
//! literal patterns in order and stops at the first match. Each rule is
//! deliberately not a general date parser; a malformed stamp must fail
//! loudly instead of matching something almost right, because downstream
//! records are keyed by the resolved date. New stamp formats require a new
//! rule here.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ExtractError, Result};
use crate::xlsx::grid::{CellValue, Grid};

/// Front-sheet rows probed for the date stamp.
const PROBE_ROWS: [usize; 2] = [2, 5];

/// Offset between the spreadsheet serial-date epoch and the Unix epoch,
/// in days, shifted by half a day so truncation to the date part cannot
/// flip around midnight.
const SERIAL_EPOCH_OFFSET_DAYS: f64 = 25_568.5;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// `Datenstand: DD.MM.YYYY, HH:MM Uhr` preceded by an empty cell.
static STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\tDatenstand: (\d{2})\.(\d{2})\.(\d{4}), (\d{2}:\d{2}) Uhr\t")
        .expect("stamp pattern")
});

/// The 2020-12-28 stamp followed by a serial date number and a separate
/// time cell. That file's declared date text was wrong; the embedded
/// serial value overrides it.
static SERIAL_STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\tDatenstand: 28\.12\.2020, 08:00 Uhr\t(44\d{3})\t(\d{2}:\d{2}) Uhr")
        .expect("serial stamp pattern")
});

/// One known-bad file whose stamp is resolved by fiat.
const LITERAL_STAMP: &str = "Datenstand: 28.12.2020, 08:00 Uhr\t44200\t12:00 Uhr";
const LITERAL_STAMP_DATE: &str = "2021-01-04 12:00";

/// Stamp at column zero with numeric placeholder cells after it. The
/// original files carry `NaN` placeholders; empty cells are tolerated too.
static PLACEHOLDER_STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^Datenstand: (\d{2})\.(\d{2})\.(\d{4}), (\d{2}:\d{2}) Uhr\t(?:NaN)?\t(?:NaN)?\t(?:NaN)?\t",
    )
    .expect("placeholder stamp pattern")
});

/// Resolve the report's canonical timestamp (`"YYYY-MM-DD HH:MM"`).
///
/// Fixed probe rows of the front sheet are concatenated with the data
/// sheet's name into one search string, then the pattern rules are tried
/// in order. No match is fatal.
pub fn resolve_report_date(filename: &str, sheet_name: &str, front_sheet: &Grid) -> Result<String> {
    let mut segments: Vec<String> = PROBE_ROWS.iter().map(|&row| probe_row(front_sheet, row)).collect();
    segments.push(sheet_name.to_string());
    let search = segments.join("\t");

    // The serial override shares its literal prefix with the generic
    // stamp rule and must therefore be tried first.
    if let Some(m) = SERIAL_STAMP.captures(&search) {
        let serial: f64 = m[1].parse()?;
        if let Some(date) = serial_date(serial) {
            return Ok(format!("{date} {}", &m[2]));
        }
    }

    if let Some(m) = STAMP.captures(&search) {
        return Ok(format!("{}-{}-{} {}", &m[3], &m[2], &m[1], &m[4]));
    }

    if search.starts_with(LITERAL_STAMP) {
        return Ok(LITERAL_STAMP_DATE.to_string());
    }

    if let Some(m) = PLACEHOLDER_STAMP.captures(&search) {
        return Ok(format!("{}-{}-{} {}", &m[3], &m[2], &m[1], &m[4]));
    }

    Err(ExtractError::DateUnresolved {
        filename: filename.to_string(),
        search_string: search,
    })
}

/// Join one front-sheet row into a tab-separated probe segment.
fn probe_row(grid: &Grid, row: usize) -> String {
    grid.row(row)
        .iter()
        .map(CellValue::display_text)
        .collect::<Vec<_>>()
        .join("\t")
}

/// Convert a spreadsheet serial date to its `YYYY-MM-DD` date part.
fn serial_date(serial: f64) -> Option<String> {
    let millis = (serial - SERIAL_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY;
    if !millis.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let stamp = DateTime::<Utc>::from_timestamp_millis(millis.round() as i64)?;
    Some(stamp.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::shared_strings::SharedStrings;
    use crate::xlsx::worksheet::RawCell;

    fn front_sheet(rows: &[(usize, &[(usize, CellValue)])]) -> Grid {
        let mut cells = Vec::new();
        let mut labels = Vec::new();
        for (row, row_cells) in rows {
            for (col, value) in *row_cells {
                let reference = crate::xlsx::address::CellAddress { col: *col, row: *row }.to_a1();
                match value {
                    CellValue::Text(text) => {
                        cells.push(RawCell {
                            reference,
                            cell_type: Some("s".to_string()),
                            value: labels.len().to_string(),
                        });
                        labels.push(text.clone());
                    }
                    CellValue::Number(n) => cells.push(RawCell {
                        reference,
                        cell_type: None,
                        value: CellValue::Number(*n).display_text(),
                    }),
                    CellValue::Empty => {}
                }
            }
        }
        let items: String = labels
            .iter()
            .map(|label| format!("<si><t>{label}</t></si>"))
            .collect();
        let strings = SharedStrings::parse(&format!("<sst>{items}</sst>")).unwrap();
        Grid::build(&cells, &strings).unwrap()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn resolves_standard_stamp() {
        let grid = front_sheet(&[(2, &[(1, text("Datenstand: 07.01.2021, 08:00 Uhr"))])]);
        let date = resolve_report_date("f.xlsx", "Impfungen", &grid).unwrap();
        assert_eq!(date, "2021-01-07 08:00");
    }

    #[test]
    fn resolves_serial_override_stamp() {
        // The declared text says 28.12.2020 but the serial 44203 is
        // 2021-01-07; the serial wins.
        let grid = front_sheet(&[(2, &[
            (1, text("Datenstand: 28.12.2020, 08:00 Uhr")),
            (2, CellValue::Number(44203.0)),
            (3, text("12:00 Uhr")),
        ])]);
        let date = resolve_report_date("f.xlsx", "Impfungen", &grid).unwrap();
        assert_eq!(date, "2021-01-07 12:00");
    }

    #[test]
    fn resolves_hardcoded_literal_stamp() {
        let grid = front_sheet(&[(2, &[
            (0, text("Datenstand: 28.12.2020, 08:00 Uhr")),
            (1, CellValue::Number(44200.0)),
            (2, text("12:00 Uhr")),
        ])]);
        let date = resolve_report_date("f.xlsx", "Impfungen", &grid).unwrap();
        assert_eq!(date, "2021-01-04 12:00");
    }

    #[test]
    fn resolves_placeholder_stamp() {
        let grid = front_sheet(&[(2, &[
            (0, text("Datenstand: 09.01.2021, 11:00 Uhr")),
            (4, text("x")),
        ])]);
        let date = resolve_report_date("f.xlsx", "Impfungen", &grid).unwrap();
        assert_eq!(date, "2021-01-09 11:00");
    }

    #[test]
    fn rules_anchor_at_search_start() {
        // The stamp appears only in the sheet name, behind the two empty
        // probe rows; no rule may match mid-string.
        let grid = front_sheet(&[]);
        let date = resolve_report_date(
            "f.xlsx",
            "Datenstand: 03.01.2021, 10:30 Uhr\tNaN\tNaN\tNaN\tRest",
            &grid,
        );
        assert!(date.is_err());
    }

    #[test]
    fn unresolvable_stamp_is_fatal_with_context() {
        let grid = front_sheet(&[(2, &[(1, text("Stand: gestern"))])]);
        let result = resolve_report_date("report.xlsx", "Impfungen", &grid);
        assert!(matches!(
            result,
            Err(ExtractError::DateUnresolved { ref filename, ref search_string })
                if filename == "report.xlsx" && search_string.contains("Stand: gestern")
        ));
    }

    #[test]
    fn serial_epoch_conversion_matches_known_dates() {
        assert_eq!(serial_date(44203.0).unwrap(), "2021-01-07");
        assert_eq!(serial_date(44197.0).unwrap(), "2021-01-01");
        assert_eq!(serial_date(25569.0).unwrap(), "1970-01-01");
    }
}
