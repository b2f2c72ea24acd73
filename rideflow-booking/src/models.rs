use rideflow_shared::Location;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Step of the booking funnel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStep {
    Pickup,
    Drop,
    Vehicle,
    Confirm,
    /// Terminal, holds the id of the booking that was created
    Submitted(Uuid),
    /// Terminal, nothing was booked
    Cancelled,
}

impl BookingStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStep::Submitted(_) | BookingStep::Cancelled)
    }

    /// Step that "back" returns to, if any
    pub fn previous(&self) -> Option<BookingStep> {
        match self {
            BookingStep::Drop => Some(BookingStep::Pickup),
            BookingStep::Vehicle => Some(BookingStep::Drop),
            BookingStep::Confirm => Some(BookingStep::Vehicle),
            BookingStep::Pickup | BookingStep::Submitted(_) | BookingStep::Cancelled => None,
        }
    }
}

/// In-progress booking owned by one flow. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub pickup: Option<Location>,
    pub drop: Option<Location>,
    pub vehicle_class_id: Option<String>,
    pub quoted_price: Option<u32>,
    pub distance_km: Option<f64>,
}

/// Read-only view shown on the confirm step
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub pickup: Location,
    pub drop: Location,
    pub vehicle_class_id: String,
    pub vehicle_name: String,
    pub eta_label: String,
    pub distance_km: f64,
    pub price: u32,
}
