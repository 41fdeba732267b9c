// src/address.rs
// A1-style cell and range references
//
// Columns are bijective base-26 letters (A=0, Z=25, AA=26, ...), case-insensitive.
// Rows are 1-based in text and 0-based in the parsed value.

use crate::error::{OfficeError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Last addressable column (XFD)
pub const MAX_COLUMN: u32 = 16_383;
/// Last addressable row, zero-based (row 1048576 in A1 form)
pub const MAX_ROW: u32 = 1_048_575;

/// A single zero-based cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    pub column: u32,
    pub row: u32,
}

impl Address {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Parse a cell reference such as `B3` or `aa10`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || OfficeError::InvalidAddress(text.to_string());

        let letters_end = text
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(text.len());
        let (letters, digits) = text.split_at(letters_end);

        if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let column = column_index(letters).ok_or_else(invalid)?;

        let display_row: u32 = digits.parse().map_err(|_| invalid())?;
        if display_row == 0 {
            return Err(invalid());
        }
        let row = display_row - 1;
        if row > MAX_ROW {
            return Err(invalid());
        }

        Ok(Self { column, row })
    }

    pub fn to_a1(&self) -> String {
        format!("{}{}", column_letters(self.column), self.row + 1)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Normalized rectangular range on one sheet.
///
/// `start_column <= end_column` and `start_row <= end_row` always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RangeAddress {
    pub sheet_index: u32,
    pub start_column: u32,
    pub start_row: u32,
    pub end_column: u32,
    pub end_row: u32,
}

impl RangeAddress {
    /// Build a range from two corners given in any order.
    pub fn from_corners(sheet_index: u32, a: Address, b: Address) -> Self {
        Self {
            sheet_index,
            start_column: a.column.min(b.column),
            start_row: a.row.min(b.row),
            end_column: a.column.max(b.column),
            end_row: a.row.max(b.row),
        }
    }

    /// Parse `A1:C10` (either corner order) or a single cell `B3`.
    pub fn parse(text: &str, sheet_index: u32) -> Result<Self> {
        let mut parts = text.split(':');
        let first = parts.next().unwrap_or_default();
        let second = parts.next();
        if parts.next().is_some() {
            return Err(OfficeError::InvalidAddress(text.to_string()));
        }

        let start = Address::parse(first)?;
        let end = match second {
            Some(token) => Address::parse(token)?,
            None => start,
        };
        Ok(Self::from_corners(sheet_index, start, end))
    }

    pub fn start(&self) -> Address {
        Address::new(self.start_column, self.start_row)
    }

    pub fn end(&self) -> Address {
        Address::new(self.end_column, self.end_row)
    }

    pub fn width(&self) -> u32 {
        self.end_column - self.start_column + 1
    }

    pub fn height(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_column == self.end_column && self.start_row == self.end_row
    }

    pub fn contains(&self, addr: Address) -> bool {
        (self.start_column..=self.end_column).contains(&addr.column)
            && (self.start_row..=self.end_row).contains(&addr.row)
    }

    /// Render back to A1 notation (without the sheet)
    pub fn to_a1(&self) -> String {
        if self.is_single_cell() {
            self.start().to_a1()
        } else {
            format!("{}:{}", self.start().to_a1(), self.end().to_a1())
        }
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Letters to zero-based column index. `None` for non-letters or past [`MAX_COLUMN`].
fn column_index(letters: &str) -> Option<u32> {
    let mut col: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
        if col - 1 > MAX_COLUMN {
            return None;
        }
    }
    col.checked_sub(1)
}

/// Zero-based column index to letters (0 -> A, 26 -> AA)
pub fn column_letters(mut column: u32) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (column % 26) as u8);
        if column < 26 {
            break;
        }
        column = column / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
