//! Service layer: the bookings store and the spreadsheet clients behind it.
//! - `sheets` holds the remote-sheet abstraction and its implementations.
//! - `booking` holds the store and the webhook dispatcher built on top of it.

pub mod errors;
pub mod sheets;
pub mod booking;
