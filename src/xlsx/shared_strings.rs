//! Shared strings table.
//!
//! String cells in a worksheet store an index into `xl/sharedStrings.xml`
//! instead of the text itself. Each `<si>` group concatenates the text of
//! its `<t>` runs, skipping runs nested under a phonetic hint (`<rPh>`)
//! annotation, in group order.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{ExtractError, Result};

/// Ordered table of shared strings, indexed by position.
#[derive(Debug, Default)]
pub struct SharedStrings {
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parse the table from the `xl/sharedStrings.xml` part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut buf = Vec::new();

        let mut strings = Vec::new();
        let mut current: Option<String> = None;
        let mut phonetic_depth = 0usize;
        let mut in_text = false;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => current = Some(String::new()),
                    b"rPh" => phonetic_depth += 1,
                    b"t" => in_text = current.is_some() && phonetic_depth == 0,
                    _ => {}
                },
                Event::Text(t) => {
                    if in_text && let Some(group) = current.as_mut() {
                        group.push_str(&t.unescape()?);
                    }
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        if let Some(group) = current.take() {
                            strings.push(group);
                        }
                    }
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(SharedStrings { strings })
    }

    /// Resolve an index recorded in a string-typed cell.
    pub fn resolve(&self, index: usize) -> Result<&str> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or(ExtractError::StringIndexOutOfRange {
                index,
                len: self.strings.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main""#;

    #[test]
    fn parses_plain_and_rich_text_groups() {
        let xml = format!(
            r#"<sst {NS}><si><t>Alpha</t></si><si><r><t>Be</t></r><r><t>ta</t></r></si></sst>"#
        );
        let table = SharedStrings::parse(&xml).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve(0).unwrap(), "Alpha");
        assert_eq!(table.resolve(1).unwrap(), "Beta");
    }

    #[test]
    fn skips_phonetic_hint_runs() {
        let xml = format!(
            r#"<sst {NS}><si><r><t>東京</t></r><rPh sb="0" eb="2"><t>トウキョウ</t></rPh></si></sst>"#
        );
        let table = SharedStrings::parse(&xml).unwrap();
        assert_eq!(table.resolve(0).unwrap(), "東京");
    }

    #[test]
    fn decodes_entities() {
        let xml = format!(r#"<sst {NS}><si><t>a &amp; b</t></si></sst>"#);
        let table = SharedStrings::parse(&xml).unwrap();
        assert_eq!(table.resolve(0).unwrap(), "a & b");
    }

    #[test]
    fn out_of_range_index_fails() {
        let xml = format!(r#"<sst {NS}><si><t>Alpha</t></si><si><t>Beta</t></si></sst>"#);
        let table = SharedStrings::parse(&xml).unwrap();
        assert!(matches!(
            table.resolve(5),
            Err(ExtractError::StringIndexOutOfRange { index: 5, len: 2 })
        ));
    }
}
