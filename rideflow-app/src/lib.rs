pub mod demo;
pub mod error;
pub mod simulated;
pub mod state;

pub use error::SetupError;
pub use state::AppState;
