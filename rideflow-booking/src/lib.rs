pub mod flow;
pub mod gateway;
pub mod models;

pub use flow::{BookingFlow, FlowError};
pub use gateway::{HttpBookingGateway, SimulatedBookingGateway};
pub use models::{BookingDraft, BookingStep, BookingSummary};
