//! Request identifiers for envelope correlation.
//!
//! Uses UUID v7: time-ordered, and random enough that a page cannot predict
//! the id of a request it did not issue.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier carried by a Request Envelope and echoed by its response.
///
/// Serialized as the hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generate a new request ID (UUID v7)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse from string
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Get timestamp from UUID v7 (milliseconds since Unix epoch)
    pub fn timestamp_ms(&self) -> Option<u64> {
        // UUID v7 encodes timestamp in first 48 bits
        let bytes = self.0.as_bytes();
        if (bytes[6] >> 4) == 7 {
            let ts = bytes[..6]
                .iter()
                .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
            Some(ts)
        } else {
            None
        }
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RequestId> for Uuid {
    fn from(id: RequestId) -> Self {
        id.0
    }
}
