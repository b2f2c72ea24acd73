/// Wiring failures at start-up
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("Storage backend unavailable: {0}")]
    Storage(String),
}
