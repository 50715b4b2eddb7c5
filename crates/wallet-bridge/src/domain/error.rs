//! Bridge error taxonomy.
//!
//! Every failure a dApp can observe falls into one closed [`ErrorKind`].
//! Messages carry capability names and shape names only, never payloads,
//! key material or pending-table contents.

use crate::domain::capabilities::Shape;
use crate::ipc::transport::TransportError;
use serde::Serialize;

/// Stable numeric codes, one per error kind
pub mod codes {
    pub const PROTOCOL: i32 = -32600;
    pub const INVALID_PAYLOAD: i32 = -32602;
    pub const RESOURCE_UNAVAILABLE: i32 = -32002;
    pub const APPLICATION: i32 = -32003;
    pub const CHAIN_RPC: i32 = -32005;
    pub const CAPABILITY_NOT_SUPPORTED: i32 = -32004;
    pub const TIMEOUT: i32 = -32006;
    pub const COLLISION: i32 = -32011;
}

/// Closed set of error kinds surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Channel unavailable or envelope undeliverable
    Transport,
    /// No matching response within the wait bound
    Timeout,
    /// A matched response broke the capability's output contract
    Protocol,
    /// Unknown capability or payload that breaks the input contract
    Capability,
    /// The signing context or a chain collaborator reported failure
    Application,
    /// A global slot was already claimed by another provider
    Collision,
}

/// Errors returned by bridge operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("request for '{capability}' timed out after {timeout_ms}ms")]
    Timeout {
        capability: String,
        timeout_ms: u64,
    },

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("capability not supported: {0}")]
    CapabilityNotSupported(String),

    #[error("invalid payload for '{capability}': expected {expected}, got {actual}")]
    InvalidPayload {
        capability: String,
        expected: Shape,
        actual: &'static str,
    },

    #[error("request rejected by signing context: {0}")]
    Application(String),

    #[error("chain rpc request failed: {0}")]
    Rpc(String),

    #[error("global slot '{0}' is already occupied by another provider")]
    Collision(String),
}

impl BridgeError {
    /// The error's kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Transport(_) => ErrorKind::Transport,
            BridgeError::Timeout { .. } => ErrorKind::Timeout,
            BridgeError::Protocol(_) => ErrorKind::Protocol,
            BridgeError::CapabilityNotSupported(_) | BridgeError::InvalidPayload { .. } => {
                ErrorKind::Capability
            }
            BridgeError::Application(_) | BridgeError::Rpc(_) => ErrorKind::Application,
            BridgeError::Collision(_) => ErrorKind::Collision,
        }
    }

    /// Stable numeric code
    pub fn code(&self) -> i32 {
        match self {
            BridgeError::Transport(_) => codes::RESOURCE_UNAVAILABLE,
            BridgeError::Timeout { .. } => codes::TIMEOUT,
            BridgeError::Protocol(_) => codes::PROTOCOL,
            BridgeError::CapabilityNotSupported(_) => codes::CAPABILITY_NOT_SUPPORTED,
            BridgeError::InvalidPayload { .. } => codes::INVALID_PAYLOAD,
            BridgeError::Application(_) => codes::APPLICATION,
            BridgeError::Rpc(_) => codes::CHAIN_RPC,
            BridgeError::Collision(_) => codes::COLLISION,
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Timeout)
    }

    /// Page-facing error object: `{ code, kind, message }`.
    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject {
            code: self.code(),
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Serializable form of a [`BridgeError`] handed to page code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    pub code: i32,
    pub kind: ErrorKind,
    pub message: String,
}

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;
