use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for session secrets (auth tokens, phone numbers).
///
/// `Debug` and `Display` never print the wrapped value, so a session snapshot can be
/// handed to `tracing::debug!("{:?}", ...)` without leaking credentials. Serialization
/// passes the real value through because the durable store needs it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(T);

impl<T> Masked<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the real value.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Masked<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Masked(********)")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_value() {
        let token = Masked::new("tok_live_123".to_string());
        let rendered = format!("{:?} {}", token, token);
        assert!(!rendered.contains("tok_live_123"));
        assert_eq!(token.expose(), "tok_live_123");
    }

    #[test]
    fn test_serializes_real_value() {
        let phone = Masked::new("+919876543210".to_string());
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"+919876543210\"");

        let back: Masked<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, phone);
    }
}
