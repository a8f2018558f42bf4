//! Replication timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the unix epoch.
///
/// Used only for delivery ordering of pending action batches, never for
/// conflict resolution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Current wall-clock time.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Self(millis)
    }

    /// Create from raw milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Raw milliseconds since the epoch.
    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_order_by_millis() {
        assert!(Timestamp::from_millis(1) < Timestamp::from_millis(3));
        assert!(Timestamp::from_millis(2) < Timestamp::from_millis(3));
    }

    #[test]
    fn timestamp_serializes_transparently() {
        let encoded = serde_json::to_string(&Timestamp::from_millis(42)).unwrap();
        assert_eq!(encoded, "42");
    }
}
