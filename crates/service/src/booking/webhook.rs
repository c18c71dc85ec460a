use std::str::FromStr;

use models::booking::{validate_phone_number, Booking, BookingInput};
use serde::Deserialize;
use tracing::instrument;

use super::store::BookingStore;
use crate::errors::ServiceError;

pub const MSG_ADDED: &str = "Booking added.";
pub const MSG_UPDATED: &str = "Booking updated.";
pub const MSG_REMOVED: &str = "Booking removed.";
const MSG_INVALID_ACTION: &str = "Invalid action. Use add, update, or remove.";
const MSG_MISSING_BOOKING: &str = "Missing booking data.";
const MSG_MISSING_PHONE: &str = "Missing phone number.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
    Remove,
}

impl FromStr for Action {
    type Err = ServiceError;

    /// Case-insensitive; surrounding whitespace is not stripped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(Action::Add),
            "update" => Ok(Action::Update),
            "remove" => Ok(Action::Remove),
            _ => Err(ServiceError::Validation(MSG_INVALID_ACTION.into())),
        }
    }
}

/// Body of `POST /webhook`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub action: String,
    #[serde(default)]
    pub booking: Option<BookingInput>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

fn required_booking(input: Option<BookingInput>) -> Result<Booking, ServiceError> {
    let booking: Booking = input
        .ok_or_else(|| ServiceError::Validation(MSG_MISSING_BOOKING.into()))?
        .into();
    validate_phone_number(&booking.phone_number).map_err(|_| ServiceError::Validation(MSG_MISSING_PHONE.into()))?;
    Ok(booking)
}

/// Route a webhook call to the matching store operation; returns the success message.
#[instrument(skip(store, payload), fields(action = %payload.action))]
pub async fn dispatch(store: &BookingStore, payload: WebhookPayload) -> Result<&'static str, ServiceError> {
    match payload.action.parse::<Action>()? {
        Action::Add => {
            let booking = required_booking(payload.booking)?;
            store.add(&booking).await?;
            Ok(MSG_ADDED)
        }
        Action::Update => {
            let booking = required_booking(payload.booking)?;
            store.update(&booking).await?;
            Ok(MSG_UPDATED)
        }
        Action::Remove => {
            let phone = payload
                .phone_number
                .filter(|p| !p.is_empty())
                .ok_or_else(|| ServiceError::Validation(MSG_MISSING_PHONE.into()))?;
            store.remove(&phone).await?;
            Ok(MSG_REMOVED)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sheets::InMemorySheet;

    fn payload(v: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(v).expect("payload")
    }

    async fn store() -> Result<(Arc<InMemorySheet>, BookingStore), ServiceError> {
        let sheet = Arc::new(InMemorySheet::with_booking_header());
        let store = BookingStore::initialize(sheet.clone()).await?;
        Ok((sheet, store))
    }

    #[test]
    fn action_parsing_is_case_insensitive() {
        assert_eq!("ADD".parse::<Action>().unwrap(), Action::Add);
        assert_eq!("Update".parse::<Action>().unwrap(), Action::Update);
        assert_eq!("remove".parse::<Action>().unwrap(), Action::Remove);
        assert!(matches!("delete".parse::<Action>(), Err(ServiceError::Validation(_))));
        assert!(" add".parse::<Action>().is_err());
    }

    #[tokio::test]
    async fn add_update_remove_round() -> Result<(), anyhow::Error> {
        let (sheet, store) = store().await?;

        let msg = dispatch(&store, payload(serde_json::json!({
            "action": "Add",
            "booking": {"phone_number": "555-1234", "room": "101"}
        })))
        .await?;
        assert_eq!(msg, MSG_ADDED);
        assert_eq!(sheet.rows()[1], vec!["", "", "555-1234", "", "101", "", "", "", ""]);

        let msg = dispatch(&store, payload(serde_json::json!({
            "action": "update",
            "booking": {"phone_number": "555-1234", "guests": "3"}
        })))
        .await?;
        assert_eq!(msg, MSG_UPDATED);
        assert_eq!(sheet.rows()[1], vec!["", "", "555-1234", "", "", "", "", "3", ""]);

        let msg = dispatch(&store, payload(serde_json::json!({"action": "REMOVE", "phone_number": "555-1234"}))).await?;
        assert_eq!(msg, MSG_REMOVED);
        assert_eq!(sheet.rows().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn validation_failures() -> Result<(), anyhow::Error> {
        let (sheet, store) = store().await?;

        let err = dispatch(&store, payload(serde_json::json!({"action": "add"}))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == MSG_MISSING_BOOKING));

        let err = dispatch(&store, payload(serde_json::json!({"action": "add", "booking": {"phone_number": ""}})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == MSG_MISSING_PHONE));

        let err = dispatch(&store, payload(serde_json::json!({"action": "remove", "phone_number": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == MSG_MISSING_PHONE));

        let err = dispatch(&store, payload(serde_json::json!({"action": "purge"}))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == MSG_INVALID_ACTION));

        assert_eq!(sheet.rows().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn remove_uses_top_level_phone_number_only() -> Result<(), anyhow::Error> {
        let (_sheet, store) = store().await?;
        store.add(&Booking { phone_number: "1".into(), ..Booking::default() }).await?;
        let err = dispatch(&store, payload(serde_json::json!({
            "action": "remove",
            "booking": {"phone_number": "1"}
        })))
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        Ok(())
    }
}
