//! Remote worksheet access.
//!
//! `SheetClient` is the seam between the bookings store and whatever holds the
//! rows: the Google Sheets API in production, an in-memory grid in tests.

use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod google;
pub mod memory;
pub mod token;

pub use google::GoogleSheetsClient;
pub use memory::InMemorySheet;

/// Row/column primitives over a single worksheet. Rows and columns are 1-based.
#[async_trait]
pub trait SheetClient: Send + Sync {
    /// Cells of one row, trailing empty cells omitted.
    async fn row_values(&self, row: usize) -> Result<Vec<String>, ServiceError>;

    /// Cells of one column from row 1 down, trailing empty cells omitted.
    async fn col_values(&self, col: usize) -> Result<Vec<String>, ServiceError>;

    /// Append a row after the last row of the table.
    async fn append_row(&self, values: Vec<String>) -> Result<(), ServiceError>;

    /// Overwrite `values.len()` cells of `row`, starting at column `first_col`.
    async fn update_row(&self, row: usize, first_col: usize, values: Vec<String>) -> Result<(), ServiceError>;

    /// Delete a row; later rows move up by one.
    async fn delete_row(&self, row: usize) -> Result<(), ServiceError>;

    /// Every row of the worksheet, header included.
    async fn all_values(&self) -> Result<Vec<Vec<String>>, ServiceError>;
}
