//! Messaging between the page and the signing context.
//!
//! - `transport`: duplex conduit, envelopes in and out
//! - `pending`: table of requests awaiting a response
//! - `correlator`: issues requests and settles them from responses
//! - `guard`: screens inbound traffic before it reaches the correlator

pub mod correlator;
pub mod guard;
pub mod pending;
pub mod transport;

pub use correlator::{PendingCall, RequestCorrelator};
pub use guard::{BoundaryGuard, GuardStats, Rejection};
pub use pending::{cleanup_task, CallResult, PendingStats, PendingTable};
pub use transport::{channel, InboundMessage, MessageHandler, Transport, TransportError};
