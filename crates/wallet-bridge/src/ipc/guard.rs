//! Boundary Guard.
//!
//! The page's message channel is shared with every other script on the page,
//! so each inbound message is screened before it can settle anything:
//!
//! 1. The sender identity must equal the configured signing origin exactly
//! 2. The body must parse as a Response Envelope
//!
//! Messages failing either check are dropped. The guard never panics and
//! never surfaces an error to callers; rejections are only logged and counted.

use crate::domain::envelope::{MalformedEnvelope, ResponseEnvelope};
use crate::ipc::transport::InboundMessage;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{trace, warn};

/// Why an inbound message was dropped
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("message from foreign origin '{origin}'")]
    ForeignOrigin { origin: String },
    #[error("malformed envelope: {0}")]
    Malformed(#[from] MalformedEnvelope),
}

/// Counters for screened messages
#[derive(Debug, Default)]
pub struct GuardStats {
    pub admitted: AtomicU64,
    pub foreign: AtomicU64,
    pub malformed: AtomicU64,
}

/// Screens inbound messages against the expected signing origin.
#[derive(Debug)]
pub struct BoundaryGuard {
    expected_origin: String,
    stats: GuardStats,
}

impl BoundaryGuard {
    pub fn new(expected_origin: impl Into<String>) -> Self {
        Self {
            expected_origin: expected_origin.into(),
            stats: GuardStats::default(),
        }
    }

    /// Screen one inbound message.
    ///
    /// Origin is checked before the body is looked at, so foreign traffic
    /// is never parsed.
    pub fn admit(&self, message: &InboundMessage) -> Result<ResponseEnvelope, Rejection> {
        if message.origin != self.expected_origin {
            self.stats.foreign.fetch_add(1, Ordering::Relaxed);
            trace!(origin = %message.origin, "Ignoring message from foreign origin");
            return Err(Rejection::ForeignOrigin {
                origin: message.origin.clone(),
            });
        }

        match ResponseEnvelope::parse(&message.body) {
            Ok(envelope) => {
                self.stats.admitted.fetch_add(1, Ordering::Relaxed);
                trace!(request_id = %envelope.id, "Admitted response envelope");
                Ok(envelope)
            }
            Err(reason) => {
                self.stats.malformed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    origin = %message.origin,
                    reason = %reason,
                    "Dropping malformed message from signing origin"
                );
                Err(Rejection::Malformed(reason))
            }
        }
    }

    pub fn expected_origin(&self) -> &str {
        &self.expected_origin
    }

    pub fn stats(&self) -> &GuardStats {
        &self.stats
    }
}
