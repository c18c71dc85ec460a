use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Header row every bookings worksheet must carry, in this exact order.
pub const REQUIRED_HEADERS: [&str; 9] = [
    "modality",
    "call_time",
    "phone_number",
    "outcome",
    "room",
    "booking_date",
    "booking_time",
    "guests",
    "summary",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BookingField {
    Modality,
    CallTime,
    PhoneNumber,
    Outcome,
    Room,
    BookingDate,
    BookingTime,
    Guests,
    Summary,
}

impl BookingField {
    pub const ALL: [BookingField; 9] = [
        BookingField::Modality,
        BookingField::CallTime,
        BookingField::PhoneNumber,
        BookingField::Outcome,
        BookingField::Room,
        BookingField::BookingDate,
        BookingField::BookingTime,
        BookingField::Guests,
        BookingField::Summary,
    ];

    /// Header cell text naming this field.
    pub fn header(self) -> &'static str {
        match self {
            BookingField::Modality => "modality",
            BookingField::CallTime => "call_time",
            BookingField::PhoneNumber => "phone_number",
            BookingField::Outcome => "outcome",
            BookingField::Room => "room",
            BookingField::BookingDate => "booking_date",
            BookingField::BookingTime => "booking_time",
            BookingField::Guests => "guests",
            BookingField::Summary => "summary",
        }
    }

    /// Exact, case-sensitive lookup by header text.
    pub fn from_header(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.header() == name)
    }
}

/// One reservation row. Serializes as an object keyed by the header names, in header order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
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

impl Booking {
    pub fn get(&self, field: BookingField) -> &str {
        match field {
            BookingField::Modality => &self.modality,
            BookingField::CallTime => &self.call_time,
            BookingField::PhoneNumber => &self.phone_number,
            BookingField::Outcome => &self.outcome,
            BookingField::Room => &self.room,
            BookingField::BookingDate => &self.booking_date,
            BookingField::BookingTime => &self.booking_time,
            BookingField::Guests => &self.guests,
            BookingField::Summary => &self.summary,
        }
    }

    pub fn set(&mut self, field: BookingField, value: String) {
        let slot = match field {
            BookingField::Modality => &mut self.modality,
            BookingField::CallTime => &mut self.call_time,
            BookingField::PhoneNumber => &mut self.phone_number,
            BookingField::Outcome => &mut self.outcome,
            BookingField::Room => &mut self.room,
            BookingField::BookingDate => &mut self.booking_date,
            BookingField::BookingTime => &mut self.booking_time,
            BookingField::Guests => &mut self.guests,
            BookingField::Summary => &mut self.summary,
        };
        *slot = value;
    }

    /// Rejects bookings that cannot be addressed by phone number.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_phone_number(&self.phone_number)
    }
}

/// Inbound booking as posted to the webhook. Only `phone_number` is required;
/// absent or `null` fields become empty strings.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookingInput {
    #[serde(default)]
    pub modality: Option<String>,
    #[serde(default)]
    pub call_time: Option<String>,
    pub phone_number: String,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub booking_date: Option<String>,
    #[serde(default)]
    pub booking_time: Option<String>,
    #[serde(default)]
    pub guests: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl From<BookingInput> for Booking {
    fn from(input: BookingInput) -> Self {
        Booking {
            modality: input.modality.unwrap_or_default(),
            call_time: input.call_time.unwrap_or_default(),
            phone_number: input.phone_number,
            outcome: input.outcome.unwrap_or_default(),
            room: input.room.unwrap_or_default(),
            booking_date: input.booking_date.unwrap_or_default(),
            booking_time: input.booking_time.unwrap_or_default(),
            guests: input.guests.unwrap_or_default(),
            summary: input.summary.unwrap_or_default(),
        }
    }
}

/// Phone numbers are matched verbatim, so the only rule is that one is present.
pub fn validate_phone_number(p: &str) -> Result<(), ModelError> {
    if p.is_empty() {
        return Err(ModelError::Validation("phone_number must not be empty".into()));
    }
    Ok(())
}
