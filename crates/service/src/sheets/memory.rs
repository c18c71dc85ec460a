use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use models::REQUIRED_HEADERS;

use super::SheetClient;
use crate::errors::ServiceError;

/// In-memory worksheet for tests, doc examples and local runs without credentials.
///
/// Rows are returned exactly as stored: `all_values` does not pad short rows.
#[derive(Default)]
pub struct InMemorySheet {
    rows: Mutex<Vec<Vec<String>>>,
}

impl InMemorySheet {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows: Mutex::new(rows) }
    }

    /// A worksheet holding only the bookings header row.
    pub fn with_booking_header() -> Self {
        Self::new(vec![REQUIRED_HEADERS.iter().map(|h| h.to_string()).collect()])
    }

    /// Snapshot of every row, header included.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Insert a raw row as-is, bypassing the store.
    pub fn push_row<S: Into<String>>(&self, row: impl IntoIterator<Item = S>) {
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(row.into_iter().map(Into::into).collect());
    }

    fn guard(&self) -> Result<MutexGuard<'_, Vec<Vec<String>>>, ServiceError> {
        self.rows.lock().map_err(|_| ServiceError::Sheet("in-memory sheet lock poisoned".into()))
    }
}

fn trim_trailing_empty(mut cells: Vec<String>) -> Vec<String> {
    while cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

#[async_trait]
impl SheetClient for InMemorySheet {
    async fn row_values(&self, row: usize) -> Result<Vec<String>, ServiceError> {
        let rows = self.guard()?;
        let cells = row.checked_sub(1).and_then(|i| rows.get(i)).cloned().unwrap_or_default();
        Ok(trim_trailing_empty(cells))
    }

    async fn col_values(&self, col: usize) -> Result<Vec<String>, ServiceError> {
        let idx = col
            .checked_sub(1)
            .ok_or_else(|| ServiceError::Validation("column index is 1-based".into()))?;
        let rows = self.guard()?;
        let cells = rows.iter().map(|r| r.get(idx).cloned().unwrap_or_default()).collect();
        Ok(trim_trailing_empty(cells))
    }

    async fn append_row(&self, values: Vec<String>) -> Result<(), ServiceError> {
        self.guard()?.push(values);
        Ok(())
    }

    async fn update_row(&self, row: usize, first_col: usize, values: Vec<String>) -> Result<(), ServiceError> {
        let mut rows = self.guard()?;
        let len = rows.len();
        let target = row
            .checked_sub(1)
            .and_then(|i| rows.get_mut(i))
            .ok_or_else(|| ServiceError::Sheet(format!("row {row} out of range (sheet has {len} rows)")))?;
        let start = first_col.saturating_sub(1);
        if target.len() < start + values.len() {
            target.resize(start + values.len(), String::new());
        }
        for (offset, v) in values.into_iter().enumerate() {
            target[start + offset] = v;
        }
        Ok(())
    }

    async fn delete_row(&self, row: usize) -> Result<(), ServiceError> {
        let mut rows = self.guard()?;
        if row == 0 || row > rows.len() {
            return Err(ServiceError::Sheet(format!("row {row} out of range (sheet has {} rows)", rows.len())));
        }
        rows.remove(row - 1);
        Ok(())
    }

    async fn all_values(&self) -> Result<Vec<Vec<String>>, ServiceError> {
        Ok(self.guard()?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn primitives_follow_one_based_rows() -> Result<(), anyhow::Error> {
        let sheet = InMemorySheet::new(vec![
            vec!["a".into(), "b".into(), "c".into()],
            vec!["1".into(), "2".into(), "".into()],
        ]);

        assert_eq!(sheet.row_values(2).await?, vec!["1", "2"]);
        assert_eq!(sheet.col_values(3).await?, vec!["c"]);
        assert!(sheet.row_values(9).await?.is_empty());

        sheet.append_row(vec!["x".into()]).await?;
        sheet.update_row(3, 2, vec!["y".into(), "z".into()]).await?;
        assert_eq!(sheet.rows()[2], vec!["x", "y", "z"]);

        sheet.delete_row(2).await?;
        assert_eq!(sheet.rows().len(), 2);
        assert_eq!(sheet.rows()[1], vec!["x", "y", "z"]);
        assert!(sheet.delete_row(5).await.is_err());
        assert!(sheet.update_row(7, 1, vec!["q".into()]).await.is_err());
        Ok(())
    }
}
