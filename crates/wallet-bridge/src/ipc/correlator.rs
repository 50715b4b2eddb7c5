//! Request Correlator.
//!
//! Turns a capability call into a Request Envelope and hands the caller a
//! [`PendingCall`] that settles when the matching Response Envelope arrives
//! or the wait bound elapses, whichever happens first.

use crate::domain::capabilities::{CapabilityRegistry, Shape};
use crate::domain::correlation::RequestId;
use crate::domain::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::domain::error::BridgeError;
use crate::ipc::pending::{CallResult, PendingTable};
use crate::ipc::transport::{Transport, TransportError};
use pin_project_lite::pin_project;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Sleep;
use tracing::{debug, warn};

/// Correlates outbound requests with inbound responses
pub struct RequestCorrelator {
    /// Capabilities allowed across the boundary
    registry: Arc<CapabilityRegistry>,
    /// Outbound conduit
    transport: Arc<dyn Transport>,
    /// In-flight requests
    pending: Arc<PendingTable>,
    /// Bound for capabilities without their own
    default_timeout: Duration,
}

impl RequestCorrelator {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        transport: Arc<dyn Transport>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            transport,
            pending: Arc::new(PendingTable::new()),
            default_timeout,
        }
    }

    /// Issue a capability request.
    ///
    /// Unknown capabilities and payloads that break the input contract fail
    /// here, before anything is sent. Transport failures never fail here;
    /// they surface through the returned future once its bound elapses.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn issue(&self, capability: &str, payload: Value) -> Result<PendingCall, BridgeError> {
        let descriptor = self.registry.require(capability).inspect_err(|_| {
            warn!(capability = capability, "Rejected unsupported capability");
        })?;

        if !descriptor.input.accepts(&payload) {
            return Err(BridgeError::InvalidPayload {
                capability: descriptor.name.to_string(),
                expected: descriptor.input,
                actual: Shape::describe(&payload),
            });
        }

        let timeout = descriptor.timeout.unwrap_or(self.default_timeout);
        let (id, rx) = self
            .pending
            .register(descriptor.name, descriptor.output, timeout);

        let envelope = RequestEnvelope {
            id,
            capability: descriptor.name.to_string(),
            payload,
        };

        match self.transport.send(envelope) {
            Ok(()) => debug!(
                request_id = %id,
                capability = descriptor.name,
                "Sent request envelope"
            ),
            Err(e) => {
                warn!(
                    request_id = %id,
                    capability = descriptor.name,
                    error = %e,
                    "Request envelope undeliverable"
                );
                self.pending.mark_undeliverable(&id, e);
            }
        }

        Ok(PendingCall {
            id,
            table: Arc::clone(&self.pending),
            rx,
            deadline: tokio::time::sleep(timeout),
        })
    }

    /// Settle the pending operation matching `response`.
    ///
    /// Unknown or already-settled ids are ignored; returns whether an
    /// operation was settled.
    pub fn resolve(&self, response: ResponseEnvelope) -> bool {
        self.pending.complete(response.id, response.outcome)
    }

    /// Get pending operation count
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The pending table, for sweeping and statistics
    pub fn pending(&self) -> &Arc<PendingTable> {
        &self.pending
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }
}

pin_project! {
    /// Future for one in-flight capability request.
    ///
    /// Dropping it abandons interest locally; nothing is sent to the signing
    /// context and the entry stays until it is answered or swept.
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct PendingCall {
        id: RequestId,
        table: Arc<PendingTable>,
        rx: oneshot::Receiver<CallResult>,
        #[pin]
        deadline: Sleep,
    }
}

impl PendingCall {
    /// Id carried by the request envelope
    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl fmt::Debug for PendingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCall")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

fn closed(settled: Result<CallResult, oneshot::error::RecvError>) -> CallResult {
    settled.unwrap_or(Err(BridgeError::Transport(TransportError::ChannelClosed)))
}

impl Future for PendingCall {
    type Output = CallResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        if let Poll::Ready(settled) = Pin::new(&mut *this.rx).poll(cx) {
            return Poll::Ready(closed(settled));
        }

        if this.deadline.poll(cx).is_pending() {
            return Poll::Pending;
        }

        match this.table.expire(this.id) {
            Some(error) => Poll::Ready(Err(error)),
            // Settled between the two polls; the value is already on its way
            None => Pin::new(this.rx).poll(cx).map(closed),
        }
    }
}
