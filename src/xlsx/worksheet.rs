//! Worksheet part parsing.
//!
//! Extracts the flat list of addressed cells from `sheetData` and the
//! declared merge regions from `mergeCells`. Only the minimal subset of
//! the worksheet schema needed to recover a table of values is read;
//! formulas, styles and everything else are skipped over.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ExtractError, Result};
use crate::xlsx::address::CellAddress;
use crate::xlsx::grid::{Grid, MergeRegion};
use crate::xlsx::shared_strings::SharedStrings;

/// One addressed cell as it appears in the worksheet XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    /// `A1`-style address from the `r` attribute.
    pub reference: String,
    /// Raw type tag from the `t` attribute, absent for numeric cells.
    pub cell_type: Option<String>,
    /// Text of the `<v>` child, empty when there is none.
    pub value: String,
}

/// Cells and merge regions of one worksheet part.
#[derive(Debug, Default)]
pub struct SheetData {
    pub cells: Vec<RawCell>,
    pub merges: Vec<MergeRegion>,
}

impl SheetData {
    /// Parse a worksheet part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();

        let mut sheet = SheetData::default();
        let mut current: Option<RawCell> = None;
        let mut in_value = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"c" => current = Some(read_cell_start(&e)?),
                    b"v" => in_value = current.is_some(),
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"c" => sheet.cells.push(read_cell_start(&e)?),
                    b"mergeCell" => {
                        if let Some(reference) = attribute(&e, b"ref")? {
                            sheet.merges.push(parse_merge_ref(&reference)?);
                        }
                    }
                    _ => {}
                },
                Event::Text(t) => {
                    if in_value && let Some(cell) = current.as_mut() {
                        cell.value.push_str(&t.unescape()?);
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"c" => {
                        if let Some(cell) = current.take() {
                            sheet.cells.push(cell);
                        }
                    }
                    b"v" => in_value = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheet)
    }

    /// Build the dense grid and expand merge regions in one step.
    pub fn into_grid(self, strings: &SharedStrings) -> Result<Grid> {
        let mut grid = Grid::build(&self.cells, strings)?;
        grid.expand_merges(&self.merges)?;
        Ok(grid)
    }
}

fn read_cell_start(e: &BytesStart<'_>) -> Result<RawCell> {
    let reference = attribute(e, b"r")?
        .ok_or_else(|| ExtractError::InvalidAddress(String::new()))?;
    Ok(RawCell {
        reference,
        cell_type: attribute(e, b"t")?,
        value: String::new(),
    })
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        if attr.key.as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Parse a merge reference like `"A1:B2"` into a normalized region.
fn parse_merge_ref(reference: &str) -> Result<MergeRegion> {
    let (first, second) = reference
        .split_once(':')
        .ok_or_else(|| ExtractError::MalformedMergeRegion(reference.to_string()))?;
    let first = CellAddress::parse(first)?;
    let second = CellAddress::parse(second)?;
    Ok(MergeRegion {
        row_min: first.row.min(second.row),
        row_max: first.row.max(second.row),
        col_min: first.col.min(second.col),
        col_max: first.col.max(second.col),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::grid::CellValue;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>12.5</v></c></row>
<row r="3"><c r="B3"><v>42</v></c><c r="C3"/></row>
</sheetData>
<mergeCells count="1"><mergeCell ref="A1:B2"/></mergeCells>
</worksheet>"#;

    #[test]
    fn parses_cells_and_merges() {
        let sheet = SheetData::parse(SHEET).unwrap();
        assert_eq!(sheet.cells.len(), 4);
        assert_eq!(sheet.cells[0].reference, "A1");
        assert_eq!(sheet.cells[0].cell_type.as_deref(), Some("s"));
        assert_eq!(sheet.cells[0].value, "0");
        assert_eq!(sheet.cells[1].value, "12.5");
        assert_eq!(sheet.cells[3], RawCell {
            reference: "C3".to_string(),
            cell_type: None,
            value: String::new(),
        });
        assert_eq!(
            sheet.merges,
            vec![MergeRegion { row_min: 0, row_max: 1, col_min: 0, col_max: 1 }]
        );
    }

    #[test]
    fn grid_carries_expanded_merge_values() {
        let strings = SharedStrings::parse("<sst><si><t>Datenstand</t></si></sst>").unwrap();
        let grid = SheetData::parse(SHEET).unwrap().into_grid(&strings).unwrap();
        assert_eq!(*grid.value(1, 1), CellValue::Text("Datenstand".to_string()));
        assert_eq!(*grid.value(2, 1), CellValue::Number(42.0));
        assert_eq!(*grid.value(2, 2), CellValue::Empty);
    }

    #[test]
    fn merge_reference_normalizes_inverted_corners() {
        let region = parse_merge_ref("B2:A1").unwrap();
        assert_eq!(region, MergeRegion { row_min: 0, row_max: 1, col_min: 0, col_max: 1 });
    }

    #[test]
    fn merge_reference_without_colon_fails() {
        assert!(matches!(
            parse_merge_ref("A1B2"),
            Err(ExtractError::MalformedMergeRegion(_))
        ));
    }
}
