//! Cell address codec.
//!
//! Spreadsheet addresses combine a column letter run with a 1-based row
//! number (`"AB12"`). The letter run is a base-26 positional code with no
//! zero digit (`A`=1 … `Z`=26, `AA`=27). Both parts are decremented so the
//! rest of the crate works with zero-based coordinates.

use std::fmt;

use crate::error::{ExtractError, Result};

/// Zero-based cell coordinates decoded from an `A1`-style address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddress {
    pub col: usize,
    pub row: usize,
}

impl CellAddress {
    /// Decode an address like `"B3"` into zero-based coordinates.
    ///
    /// The text must split into exactly one run of uppercase ASCII letters
    /// followed by one run of ASCII digits; anything else is rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || ExtractError::InvalidAddress(text.to_string());

        let digits_at = text.find(|ch: char| ch.is_ascii_digit()).ok_or_else(invalid)?;
        let (letters, digits) = text.split_at(digits_at);
        if letters.is_empty()
            || !letters.bytes().all(|b| b.is_ascii_uppercase())
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let mut col: usize = 0;
        for b in letters.bytes() {
            col = col
                .checked_mul(26)
                .and_then(|n| n.checked_add(usize::from(b - b'A') + 1))
                .ok_or_else(invalid)?;
        }

        let row: usize = digits.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(CellAddress {
            col: col - 1,
            row: row - 1,
        })
    }

    /// Encode back into `A1` notation. Used for diagnostics only.
    pub fn to_a1(self) -> String {
        let mut letters = String::new();
        let mut col = self.col + 1;
        while col > 0 {
            col -= 1;
            let digit = u8::try_from(col % 26).unwrap_or_default();
            letters.insert(0, char::from(b'A' + digit));
            col /= 26;
        }
        format!("{}{}", letters, self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_single_letter_addresses() {
        assert_eq!(CellAddress::parse("A1").unwrap(), CellAddress { col: 0, row: 0 });
        assert_eq!(CellAddress::parse("B3").unwrap(), CellAddress { col: 1, row: 2 });
        assert_eq!(CellAddress::parse("Z10").unwrap(), CellAddress { col: 25, row: 9 });
    }

    #[test]
    fn decodes_multi_letter_columns() {
        assert_eq!(CellAddress::parse("AA1").unwrap().col, 26);
        assert_eq!(CellAddress::parse("AB12").unwrap(), CellAddress { col: 27, row: 11 });
        assert_eq!(CellAddress::parse("BA1").unwrap().col, 52);
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "A", "1", "12", "a1", "A1B", "A-1", "A0", "Ä1"] {
            assert!(
                matches!(CellAddress::parse(bad), Err(ExtractError::InvalidAddress(_))),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn encodes_back_to_a1() {
        assert_eq!(CellAddress { col: 0, row: 0 }.to_a1(), "A1");
        assert_eq!(CellAddress { col: 26, row: 99 }.to_a1(), "AA100");
        assert_eq!(CellAddress { col: 4, row: 9 }.to_a1(), "E10");
    }

    proptest! {
        #[test]
        fn round_trips_valid_addresses(addr in "[A-Z]{1,3}", row in 1usize..=1_000_000) {
            let text = format!("{addr}{row}");
            let decoded = CellAddress::parse(&text).unwrap();
            prop_assert_eq!(decoded.to_a1(), text);
        }
    }
}
