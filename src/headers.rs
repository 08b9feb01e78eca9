//! Semantic header matching.
//!
//! The report's row and column labels drift across revisions: optional
//! columns appear, footnote rows are added and reworded, and labels grow
//! asterisk markers. Each matching pass scans an observed row or column of
//! label text against a declarative catalog of expected entries and
//! produces a validated mapping from semantic field name to grid index.
//!
//! The scan and the completeness validation are separate passes on
//! purpose: the validator has to distinguish the benign absence of an
//! optional field from a schema change nobody told the catalog about,
//! which must halt processing rather than silently emit partial data.

use crate::error::{ExtractError, Result};
use crate::xlsx::grid::CellValue;

/// One expected header in a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderEntry {
    /// Semantic key exposed downstream; absent for entries that only
    /// exist to be recognized and dropped.
    pub name: Option<&'static str>,
    /// Expected label text after normalization.
    pub match_text: &'static str,
    /// Footnote or annotation labels that may recur and carry no data.
    pub ignore: bool,
    /// Fields that are legitimately absent in older revisions.
    pub optional: bool,
}

const fn field(name: &'static str, match_text: &'static str) -> HeaderEntry {
    HeaderEntry { name: Some(name), match_text, ignore: false, optional: false }
}

const fn optional_field(name: &'static str, match_text: &'static str) -> HeaderEntry {
    HeaderEntry { name: Some(name), match_text, ignore: false, optional: true }
}

const fn footnote(match_text: &'static str) -> HeaderEntry {
    HeaderEntry { name: None, match_text, ignore: true, optional: false }
}

/// A matched, non-ignored catalog entry with its grid index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedHeader {
    pub name: &'static str,
    pub title: &'static str,
    pub index: usize,
}

/// Column headers of the data sheet, per schema version 2020/2021.
pub const COLUMN_HEADERS: &[HeaderEntry] = &[
    field("impfungen_kumulativ", "Impfungen kumulativ"),
    field("differenz_zum_vortag", "Differenz zum Vortag"),
    optional_field("impfungen_pro_1000_einwohner", "Impfungen pro 1.000 Einwohner"),
    field("indikation_nach_alter", "Indikation nach Alter"),
    field("berufliche_indikation", "Berufliche Indikation"),
    field("medizinische_indikation", "Medizinische Indikation"),
    field("pflegeheimbewohnerin", "Pflegeheim-bewohnerIn"),
];

/// Row headers of the data sheet: the sixteen Bundesländer, the
/// nationwide total, and the footnote rows observed so far.
pub const STATE_HEADERS: &[HeaderEntry] = &[
    field("BW", "Baden-Württemberg"),
    field("BY", "Bayern"),
    field("BE", "Berlin"),
    field("BB", "Brandenburg"),
    field("HB", "Bremen"),
    field("HH", "Hamburg"),
    field("HE", "Hessen"),
    field("MV", "Mecklenburg-Vorpommern"),
    field("NI", "Niedersachsen"),
    field("NW", "Nordrhein-Westfalen"),
    field("RP", "Rheinland-Pfalz"),
    field("SL", "Saarland"),
    field("SN", "Sachsen"),
    field("ST", "Sachsen-Anhalt"),
    field("SH", "Schleswig-Holstein"),
    field("TH", "Thüringen"),
    field("DE", "Gesamt"),
    footnote(
        "Anmerkung zu den Indikationen: Es können mehrere Indikationen je geimpfter Person vorliegen.",
    ),
    footnote("einschl. Korrekturmeldung vom 27.12.20"),
    footnote(""),
    footnote("In Sachsen-Anhalt wurde bereits am 26.12.2020 mit den Impfungen begonnen."),
    footnote(
        "In einigen Bundesländern werden nicht alle der in der Tabelle aufgeführten Indikationen einzeln ausgewiesen.",
    ),
    footnote(
        "in einigen Bundesländern werden nicht alle der in der Tabelle aufgeführten Indikationen einzeln ausgewiesen",
    ),
    footnote(
        "Anmerkung zu den Indikationen: es können mehrere Indikationen je geimpfter Person vorliegen",
    ),
];

/// Match an observed row or column of labels against a catalog.
///
/// Index `0` is the label row/column's own identifying cell and is never
/// scanned; `start_offset` additionally shifts where matching begins, to
/// absorb the document-wide column insertion of January 2021. The offset
/// is supplied by the caller because it depends on the report date.
///
/// The returned mapping preserves catalog order, contains only matched
/// non-ignored entries, and omits unmatched-but-optional ones.
pub fn match_headers(
    catalog: &'static [HeaderEntry],
    observed: &[CellValue],
    start_offset: usize,
) -> Result<Vec<ResolvedHeader>> {
    let mut matched = vec![false; catalog.len()];
    let mut resolved = vec![0usize; catalog.len()];

    for (index, cell) in observed.iter().enumerate().skip(1 + start_offset) {
        let value = normalize_label(&cell.display_text());
        let Some(pos) = catalog.iter().position(|entry| entry.match_text == value) else {
            return Err(ExtractError::UnrecognizedHeader {
                value,
                catalog: catalog_snapshot(catalog),
            });
        };
        if matched[pos] && !catalog[pos].ignore {
            return Err(ExtractError::DuplicateHeaderUsage { value });
        }
        matched[pos] = true;
        resolved[pos] = index;
    }

    let mut headers = Vec::new();
    for (pos, entry) in catalog.iter().enumerate() {
        if entry.ignore {
            continue;
        }
        if matched[pos] {
            if let Some(name) = entry.name {
                headers.push(ResolvedHeader {
                    name,
                    title: entry.match_text,
                    index: resolved[pos],
                });
            }
            continue;
        }
        if entry.optional {
            continue;
        }
        return Err(ExtractError::MissingRequiredHeader {
            entry: entry.match_text.to_string(),
        });
    }
    Ok(headers)
}

/// Strip asterisk markers and surrounding whitespace from a label.
fn normalize_label(text: &str) -> String {
    text.replace('*', "").trim().to_string()
}

fn catalog_snapshot(catalog: &[HeaderEntry]) -> String {
    catalog
        .iter()
        .map(|entry| format!("{:?}", entry.match_text))
        .collect::<Vec<_>>()
        .join(", ")
}
