//! Container access for report workbooks.
//!
//! A report needs exactly four parts of the archive: the workbook
//! manifest, the front sheet (`sheet1.xml`, carrying the date stamp), the
//! data sheet (`sheet2.xml`, carrying the table), and the shared strings
//! table. Everything else in the container is ignored.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ExtractError, Result};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const FRONT_SHEET_PART: &str = "xl/worksheets/sheet1.xml";
const DATA_SHEET_PART: &str = "xl/worksheets/sheet2.xml";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Decoded text of the four workbook parts the extraction needs.
#[derive(Debug)]
pub struct WorkbookParts {
    pub workbook_xml: String,
    pub front_sheet_xml: String,
    pub data_sheet_xml: String,
    pub shared_strings_xml: String,
}

impl WorkbookParts {
    /// Open a workbook container on disk.
    pub fn open(path: &Path) -> Result<Self> {
        Self::read(BufReader::new(File::open(path)?))
    }

    /// Read the required parts out of a container archive.
    ///
    /// Entries are located by path suffix; some producers prefix entry
    /// names with a leading directory.
    pub fn read<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;

        let mut workbook_xml = None;
        let mut front_sheet_xml = None;
        let mut data_sheet_xml = None;
        let mut shared_strings_xml = None;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let slot = match entry.name() {
                name if name.ends_with(WORKBOOK_PART) => &mut workbook_xml,
                name if name.ends_with(FRONT_SHEET_PART) => &mut front_sheet_xml,
                name if name.ends_with(DATA_SHEET_PART) => &mut data_sheet_xml,
                name if name.ends_with(SHARED_STRINGS_PART) => &mut shared_strings_xml,
                _ => continue,
            };
            let mut text = String::new();
            entry.read_to_string(&mut text)?;
            *slot = Some(text);
        }

        let missing = |part: &str| ExtractError::MissingPart(part.to_string());
        Ok(WorkbookParts {
            workbook_xml: workbook_xml.ok_or_else(|| missing(WORKBOOK_PART))?,
            front_sheet_xml: front_sheet_xml.ok_or_else(|| missing(FRONT_SHEET_PART))?,
            data_sheet_xml: data_sheet_xml.ok_or_else(|| missing(DATA_SHEET_PART))?,
            shared_strings_xml: shared_strings_xml.ok_or_else(|| missing(SHARED_STRINGS_PART))?,
        })
    }
}

/// Look up a sheet's display name by its relationship id.
///
/// The data sheet is always the workbook's `rId2` entry; its name carries
/// part of the date stamp and feeds the date resolver.
pub fn sheet_name_for_rel(workbook_xml: &str, rel_id: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(workbook_xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) => {
                if e.local_name().as_ref() == b"sheet"
                    && let Some(name) = sheet_name_if_rel(&e, rel_id)?
                {
                    return Ok(Some(name));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(None)
}

fn sheet_name_if_rel(e: &BytesStart<'_>, rel_id: &str) -> Result<Option<String>> {
    let mut name = None;
    let mut id_matches = false;
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        match attr.key.as_ref() {
            b"name" => name = Some(attr.unescape_value()?.into_owned()),
            b"r:id" => id_matches = attr.unescape_value()? == rel_id,
            _ => {}
        }
    }
    Ok(id_matches.then_some(name).flatten())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKBOOK: &str = r#"<?xml version="1.0"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
 xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>
<sheet name="Erläuterung" sheetId="1" r:id="rId1"/>
<sheet name="Impfungen_proTag_07.01.21" sheetId="2" r:id="rId2"/>
</sheets>
</workbook>"#;

    #[test]
    fn finds_sheet_name_by_rel_id() {
        assert_eq!(
            sheet_name_for_rel(WORKBOOK, "rId2").unwrap().as_deref(),
            Some("Impfungen_proTag_07.01.21")
        );
        assert_eq!(
            sheet_name_for_rel(WORKBOOK, "rId1").unwrap().as_deref(),
            Some("Erläuterung")
        );
        assert_eq!(sheet_name_for_rel(WORKBOOK, "rId9").unwrap(), None);
    }
}
