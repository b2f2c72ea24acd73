pub mod booking;
pub mod location;
