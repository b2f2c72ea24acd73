use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What was booked
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Ride,
    Driver,
    Vehicle,
    Tour,
}

/// Booking status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

/// A submitted booking. Only the status ever changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Time-ordered (v7), so sorting by id follows creation order
    pub id: Uuid,
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub vehicle_name: String,
    pub pickup_address: String,
    pub drop_address: Option<String>,
    pub price: u32,
    pub distance_km: Option<f64>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        booking_type: BookingType,
        vehicle_name: String,
        pickup_address: String,
        drop_address: Option<String>,
        price: u32,
        distance_km: Option<f64>,
    ) -> Self {
        let now = Utc::now();
        let local = now.with_timezone(&Local);
        Self {
            id: Uuid::now_v7(),
            booking_type,
            status: BookingStatus::Active,
            vehicle_name,
            pickup_address,
            drop_address,
            price,
            distance_km,
            date: local.date_naive(),
            time: local.time(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Active
    }

    /// Transition: Active → Completed
    pub fn complete(&mut self) -> Result<(), BookingError> {
        self.transition(BookingStatus::Completed)
    }

    /// Transition: Active → Cancelled
    pub fn cancel(&mut self) -> Result<(), BookingError> {
        self.transition(BookingStatus::Cancelled)
    }

    fn transition(&mut self, to: BookingStatus) -> Result<(), BookingError> {
        if self.status != BookingStatus::Active {
            return Err(BookingError::InvalidTransition {
                from: self.status,
                to,
            });
        }

        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid booking transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },
}
