//! Booking records and their mapping onto spreadsheet columns.

pub mod errors;
pub mod booking;
pub mod columns;

pub use booking::{Booking, BookingField, BookingInput, REQUIRED_HEADERS};
pub use columns::ColumnMap;
