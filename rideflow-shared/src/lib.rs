pub mod models;
pub mod pii;

pub use models::booking::{Booking, BookingError, BookingStatus, BookingType};
pub use models::location::Location;
pub use pii::Masked;
