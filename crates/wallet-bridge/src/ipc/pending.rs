//! Pending Operation Table.
//!
//! Maps request ids to the settlement handle of the caller waiting on them.
//! An id leaves the table exactly once: on response, on timeout, or when the
//! sweeper finds it expired.

use crate::domain::capabilities::Shape;
use crate::domain::correlation::RequestId;
use crate::domain::envelope::Outcome;
use crate::domain::error::BridgeError;
use crate::ipc::transport::TransportError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What a pending caller eventually receives
pub type CallResult = Result<Value, BridgeError>;

/// A request waiting for its response
struct PendingOperation {
    /// Settlement handle
    sender: oneshot::Sender<CallResult>,
    /// When request was created
    created_at: Instant,
    /// Capability name (for logging)
    capability: &'static str,
    /// Contract for a successful result
    output: Shape,
    /// Wait bound for this request
    timeout: Duration,
    /// Set when the transport refused the envelope
    delivery_failure: Option<TransportError>,
}

impl PendingOperation {
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) > self.timeout
    }

    /// Error reported when the wait bound elapses
    fn expiry_error(&self) -> BridgeError {
        match &self.delivery_failure {
            Some(failure) => BridgeError::Transport(failure.clone()),
            None => BridgeError::Timeout {
                capability: self.capability.to_string(),
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            },
        }
    }

    fn settle(&self, outcome: Outcome) -> CallResult {
        match outcome {
            Outcome::Success(value) if self.output.accepts(&value) => Ok(value),
            Outcome::Success(value) => Err(BridgeError::Protocol(format!(
                "'{}' returned {} where {} was expected",
                self.capability,
                Shape::describe(&value),
                self.output
            ))),
            Outcome::Failure(reason) => Err(BridgeError::Application(reason)),
        }
    }
}

/// Statistics for the pending table
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests settled by a response
    pub total_completed: AtomicU64,
    /// Total requests that ran out of time
    pub total_timeouts: AtomicU64,
    /// Responses whose caller had already stopped waiting
    pub total_abandoned: AtomicU64,
    /// Envelopes the transport refused
    pub total_undeliverable: AtomicU64,
}

/// Pending Operation Table.
///
/// Flow:
/// 1. The correlator calls `register()` and gets an id plus a receiver
/// 2. The correlator sends the Request Envelope carrying that id
/// 3. The inbound path calls `complete()` with the matched Response Envelope
/// 4. The caller's future resolves, or calls `expire()` once its bound elapses
pub struct PendingTable {
    pending: DashMap<RequestId, PendingOperation>,
    stats: Arc<PendingStats>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a pending operation under a fresh id.
    pub(crate) fn register(
        &self,
        capability: &'static str,
        output: Shape,
        timeout: Duration,
    ) -> (RequestId, oneshot::Receiver<CallResult>) {
        let (tx, rx) = oneshot::channel();
        let operation = PendingOperation {
            sender: tx,
            created_at: Instant::now(),
            capability,
            output,
            timeout,
            delivery_failure: None,
        };

        // Never hand out an id that is already pending
        let id = loop {
            let candidate = RequestId::new();
            if let Entry::Vacant(slot) = self.pending.entry(candidate) {
                slot.insert(operation);
                break candidate;
            }
        };
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            request_id = %id,
            capability = capability,
            timeout_ms = timeout.as_millis(),
            "Registered pending operation"
        );

        (id, rx)
    }

    /// Record that the envelope for `id` never left the page.
    ///
    /// The entry stays; its caller fails with a transport error once the
    /// wait bound elapses.
    pub(crate) fn mark_undeliverable(&self, id: &RequestId, failure: TransportError) {
        if let Some(mut operation) = self.pending.get_mut(id) {
            operation.delivery_failure = Some(failure);
            self.stats.total_undeliverable.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Settle the operation for `id`.
    ///
    /// Returns false if the id is unknown or already settled.
    pub fn complete(&self, id: RequestId, outcome: Outcome) -> bool {
        let Some((_, operation)) = self.pending.remove(&id) else {
            debug!(request_id = %id, "Response for unknown or settled request id");
            return false;
        };

        let response_time = operation.created_at.elapsed();
        let result = operation.settle(outcome);
        let capability = operation.capability;

        if let Err(BridgeError::Protocol(reason)) = &result {
            warn!(request_id = %id, capability, reason = %reason, "Response broke output contract");
        }

        match operation.sender.send(result) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    request_id = %id,
                    capability,
                    response_time_ms = response_time.as_millis(),
                    "Settled pending operation"
                );
            }
            Err(_) => {
                // Caller dropped its future; cancellation is local-only
                self.stats.total_abandoned.fetch_add(1, Ordering::Relaxed);
                debug!(request_id = %id, capability, "Caller no longer waiting");
            }
        }
        true
    }

    /// Remove `id` because its caller's wait bound elapsed.
    ///
    /// Returns the error the caller should see, or None if the entry was
    /// already settled.
    pub(crate) fn expire(&self, id: &RequestId) -> Option<BridgeError> {
        let (_, operation) = self.pending.remove(id)?;
        self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
        warn!(
            request_id = %id,
            capability = operation.capability,
            timeout_ms = operation.timeout.as_millis(),
            undelivered = operation.delivery_failure.is_some(),
            "Pending operation expired"
        );
        Some(operation.expiry_error())
    }

    /// Remove expired entries whose callers are no longer polling.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<RequestId> = self
            .pending
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for id in expired {
            if let Some((_, operation)) = self.pending.remove_if(&id, |_, op| op.is_expired(now)) {
                self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                let error = operation.expiry_error();
                let _ = operation.sender.send(Err(error));
                removed += 1;
            }
        }

        removed
    }

    /// Drop every entry; waiting callers observe a closed channel.
    pub fn clear(&self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Get number of currently pending operations
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Check if an id is pending
    pub fn contains(&self, id: &RequestId) -> bool {
        self.pending.contains_key(id)
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

impl Default for PendingTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task that sweeps expired entries
pub async fn cleanup_task(table: Arc<PendingTable>, interval: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        let removed = table.remove_expired();
        if removed > 0 {
            debug!(removed = removed, "Swept expired pending operations");
        }
    }
}
