//! Named mapping between booking fields and worksheet columns.
//!
//! The map is resolved once from the header row; every row written or read goes
//! through it, so nothing else in the workspace indexes columns by position.

use crate::booking::{Booking, BookingField, REQUIRED_HEADERS};
use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMap {
    /// 1-based column per field, indexed in `BookingField::ALL` order.
    columns: [usize; 9],
    width: usize,
}

impl ColumnMap {
    /// Build the map from the worksheet's first row.
    ///
    /// The header must equal [`REQUIRED_HEADERS`] exactly (order- and case-sensitive).
    pub fn resolve(header: &[String]) -> Result<Self, ModelError> {
        let matches = header.len() == REQUIRED_HEADERS.len()
            && header.iter().zip(REQUIRED_HEADERS).all(|(h, r)| h == r);
        if !matches {
            return Err(ModelError::HeaderMismatch {
                expected: REQUIRED_HEADERS.join(", "),
                found: header.join(", "),
            });
        }

        let mut columns = [0usize; 9];
        for (slot, field) in columns.iter_mut().zip(BookingField::ALL) {
            let pos = header
                .iter()
                .position(|h| BookingField::from_header(h) == Some(field))
                .ok_or_else(|| ModelError::Validation(format!("missing column {}", field.header())))?;
            *slot = pos + 1;
        }
        Ok(Self { columns, width: header.len() })
    }

    /// 1-based column holding `field`.
    pub fn column(&self, field: BookingField) -> usize {
        let idx = BookingField::ALL
            .iter()
            .position(|f| *f == field)
            .unwrap_or_default();
        self.columns[idx]
    }

    /// Number of columns a complete booking row spans.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn first_column(&self) -> usize {
        self.columns.iter().copied().min().unwrap_or(1)
    }

    pub fn last_column(&self) -> usize {
        self.columns.iter().copied().max().unwrap_or(self.width)
    }

    /// Lay a booking out as a full row, one cell per column.
    pub fn to_row(&self, booking: &Booking) -> Vec<String> {
        let mut row = vec![String::new(); self.width];
        for field in BookingField::ALL {
            row[self.column(field) - 1] = booking.get(field).to_string();
        }
        row
    }

    /// Read a booking back from a row. Rows narrower than the map are rejected.
    pub fn from_row(&self, row: &[String]) -> Option<Booking> {
        if row.len() < self.width {
            return None;
        }
        let mut booking = Booking::default();
        for field in BookingField::ALL {
            booking.set(field, row[self.column(field) - 1].clone());
        }
        Some(booking)
    }
}

/// Spreadsheet column letters for a 1-based index: 1 → `A`, 26 → `Z`, 27 → `AA`.
pub fn column_letter(mut col: usize) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Worksheet title quoted for A1 notation: `Sheet1` → `'Sheet1'`, `Bob's` → `'Bob''s'`.
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range covering columns `first..=last` of a single row, e.g. `'Sheet1'!A5:I5`.
pub fn row_range(title: &str, row: usize, first: usize, last: usize) -> String {
    format!(
        "{}!{}{row}:{}{row}",
        quote_sheet_title(title),
        column_letter(first),
        column_letter(last)
    )
}

/// A1 range covering one whole row, e.g. `'Sheet1'!1:1`.
pub fn whole_row(title: &str, row: usize) -> String {
    format!("{}!{row}:{row}", quote_sheet_title(title))
}

/// A1 range covering one whole column, e.g. `'Sheet1'!C:C`.
pub fn whole_column(title: &str, col: usize) -> String {
    let letter = column_letter(col);
    format!("{}!{letter}:{letter}", quote_sheet_title(title))
}
