//! Domain types for the wallet bridge.
//!
//! Capabilities, envelopes, configuration and the error taxonomy.

pub mod capabilities;
pub mod config;
pub mod correlation;
pub mod envelope;
pub mod error;
pub mod transaction;

// Re-exports for convenience
pub use capabilities::{
    get_capability, is_capability_supported, names, CapabilityDescriptor, CapabilityKind,
    CapabilityRegistry, RegistryError, Shape,
};
pub use config::{BridgeConfig, ConfigError};
pub use correlation::RequestId;
pub use envelope::{MalformedEnvelope, Outcome, RequestEnvelope, ResponseEnvelope};
pub use error::{BridgeError, BridgeResult, ErrorKind};
pub use transaction::{
    MoveCallTransaction, Permission, PermissionRequest, SerializedTransaction,
    SignableTransaction, SignedTransaction,
};
