use axum::{extract::{rejection::JsonRejection, State}, Json};
use common::types::Message;
use models::Booking;
use service::booking::{self, WebhookPayload};
use tracing::warn;

use crate::errors::JsonApiError;
use crate::routes::AppState;

/// Add, update or remove a booking.
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "bookings",
    request_body = crate::openapi::WebhookRequestDoc,
    responses(
        (status = 200, description = "Applied", body = crate::openapi::MessageDoc),
        (status = 400, description = "Invalid payload, unknown action or duplicate phone number", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Booking not found", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn webhook(
    State(state): State<AppState>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> Result<Json<Message>, JsonApiError> {
    // Malformed bodies are a 400 here, not axum's default 422.
    let Json(payload) = payload.map_err(|rej| {
        warn!(reason = %rej.body_text(), "webhook payload rejected");
        JsonApiError::bad_request(rej.body_text())
    })?;
    let msg = booking::dispatch(&state.bookings, payload).await?;
    Ok(Json(Message::new(msg)))
}

/// Every well-formed booking row.
#[utoipa::path(
    get,
    path = "/all",
    tag = "bookings",
    responses((status = 200, description = "All bookings", body = [crate::openapi::BookingDoc]))
)]
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, JsonApiError> {
    let all = state.bookings.list_all().await?;
    Ok(Json(all))
}
