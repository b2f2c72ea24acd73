use async_trait::async_trait;
use rideflow_shared::Booking;

/// Durable key-value storage for session data (token, profile)
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Backend that accepts submitted bookings
#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn submit_booking(&self, booking: &Booking) -> Result<(), GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage read failed for {key}: {reason}")]
    ReadFailed { key: String, reason: String },

    #[error("Storage write failed for {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error("Stored value for {key} is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

impl StorageError {
    pub fn read(key: &str, reason: impl ToString) -> Self {
        Self::ReadFailed {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn write(key: &str, reason: impl ToString) -> Self {
        Self::WriteFailed {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Booking gateway unreachable: {0}")]
    Unavailable(String),

    #[error("Booking rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}
