use std::sync::Arc;

use models::{Booking, BookingField, ColumnMap};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::sheets::SheetClient;

/// Bookings kept as rows of a worksheet, addressed by phone number.
///
/// Every operation re-reads the sheet; nothing about row positions is cached.
/// The lookup-then-write sequences are not atomic: two concurrent `add`s for
/// the same phone number can both pass the duplicate check.
pub struct BookingStore {
    client: Arc<dyn SheetClient>,
    columns: ColumnMap,
}

impl BookingStore {
    /// Verify the header row and resolve the column map.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use models::Booking;
    /// use service::booking::BookingStore;
    /// use service::sheets::InMemorySheet;
    ///
    /// let sheet = Arc::new(InMemorySheet::with_booking_header());
    /// let store = tokio_test::block_on(BookingStore::initialize(sheet.clone())).unwrap();
    /// let b = Booking { phone_number: "555-1234".into(), room: "101".into(), ..Booking::default() };
    /// tokio_test::block_on(store.add(&b)).unwrap();
    /// assert_eq!(sheet.rows()[1], vec!["", "", "555-1234", "", "101", "", "", "", ""]);
    /// ```
    #[instrument(skip(client))]
    pub async fn initialize(client: Arc<dyn SheetClient>) -> Result<Self, ServiceError> {
        let header = client.row_values(1).await?;
        let columns = ColumnMap::resolve(&header).map_err(|e| ServiceError::Configuration(e.to_string()))?;
        info!(width = columns.width(), "sheet_header_verified");
        Ok(Self { client, columns })
    }

    /// 1-based row of the first data row whose phone cell equals `phone` exactly.
    ///
    /// Unlike a raw scan of the whole column, row 1 is skipped: the header is
    /// never returned, so `update` and `remove` cannot overwrite or delete it
    /// even when `phone` is literally `phone_number`.
    pub async fn find_row_by_phone(&self, phone: &str) -> Result<Option<usize>, ServiceError> {
        let col = self.columns.column(BookingField::PhoneNumber);
        let cells = self.client.col_values(col).await?;
        Ok(cells
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, cell)| cell.as_str() == phone)
            .map(|(idx, _)| idx + 1))
    }

    #[instrument(skip(self, booking), fields(phone_number = %booking.phone_number))]
    pub async fn add(&self, booking: &Booking) -> Result<(), ServiceError> {
        if let Some(row) = self.find_row_by_phone(&booking.phone_number).await? {
            info!(row, "booking_add_rejected_duplicate");
            return Err(ServiceError::Duplicate("Phone number already exists.".into()));
        }
        self.client.append_row(self.columns.to_row(booking)).await?;
        info!("booking_added");
        Ok(())
    }

    /// Replace every field of the existing row; returns the row index written.
    #[instrument(skip(self, booking), fields(phone_number = %booking.phone_number))]
    pub async fn update(&self, booking: &Booking) -> Result<usize, ServiceError> {
        let row = self
            .find_row_by_phone(&booking.phone_number)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;
        let cells = self.columns.to_row(booking);
        let first = self.columns.first_column();
        let span = self.columns.last_column() - first + 1;
        let values = cells.into_iter().skip(first - 1).take(span).collect();
        self.client.update_row(row, first, values).await?;
        info!(row, "booking_updated");
        Ok(row)
    }

    /// Delete the row for `phone`; returns the row index that was removed.
    #[instrument(skip(self))]
    pub async fn remove(&self, phone: &str) -> Result<usize, ServiceError> {
        let row = self
            .find_row_by_phone(phone)
            .await?
            .ok_or_else(|| ServiceError::not_found("Booking"))?;
        self.client.delete_row(row).await?;
        info!(row, "booking_removed");
        Ok(row)
    }

    /// All data rows as bookings. Rows narrower than the header are skipped.
    pub async fn list_all(&self) -> Result<Vec<Booking>, ServiceError> {
        let rows = self.client.all_values().await?;
        Ok(rows
            .iter()
            .skip(1)
            .filter_map(|row| self.columns.from_row(row))
            .collect())
    }
}
