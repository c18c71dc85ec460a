//! Bookings kept in a worksheet: the store plus the webhook dispatcher.

pub mod store;
pub mod webhook;

pub use store::BookingStore;
pub use webhook::{dispatch, Action, WebhookPayload};
