use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String, pub detail: Option<String> }

/// Booking row; every field is a string, empty when unset.
#[derive(ToSchema)]
pub struct BookingDoc {
    pub modality: String,
    pub call_time: String,
    pub phone_number: String,
    pub outcome: String,
    pub room: String,
    pub booking_date: String,
    pub booking_time: String,
    pub guests: String,
    pub summary: String,
}

#[derive(ToSchema)]
pub struct BookingInputDoc {
    pub modality: Option<String>,
    pub call_time: Option<String>,
    pub phone_number: String,
    pub outcome: Option<String>,
    pub room: Option<String>,
    pub booking_date: Option<String>,
    pub booking_time: Option<String>,
    pub guests: Option<String>,
    pub summary: Option<String>,
}

/// `action` is one of add, update, remove (any case). `booking` is required for
/// add/update, `phone_number` for remove.
#[derive(ToSchema)]
pub struct WebhookRequestDoc {
    pub action: String,
    pub booking: Option<BookingInputDoc>,
    pub phone_number: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::bookings::webhook,
        crate::routes::bookings::list_all
    ),
    components(
        schemas(
            HealthResponse,
            MessageDoc,
            ErrorDoc,
            BookingDoc,
            BookingInputDoc,
            WebhookRequestDoc
        )
    ),
    tags(
        (name = "health"),
        (name = "bookings", description = "Booking rows kept in a spreadsheet")
    )
)]
pub struct ApiDoc;
