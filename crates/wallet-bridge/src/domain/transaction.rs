//! Typed payloads for the signing capabilities.
//!
//! The bridge does not build transactions; these types only give the typed
//! provider methods a stable JSON shape to hand across the boundary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Permissions a page can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    ViewAccount,
    SuggestTransactions,
}

/// Payload of `has-permissions` and `request-permissions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub permissions: Vec<Permission>,
}

/// Move call description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCallTransaction {
    pub package_object_id: String,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<String>,
    pub arguments: Vec<Value>,
    /// Gas object id; filled from chain state when absent and an RPC client is configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_payment: Option<String>,
    pub gas_budget: u64,
}

/// Transaction handed to the signing capabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum SignableTransaction {
    MoveCall(MoveCallTransaction),
    /// Base64 transaction bytes
    Serialized(String),
}

/// Payload of `execute-serialized-move-call`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedTransaction {
    pub transaction_bytes: String,
}

/// Result of `sign-transaction`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// Base64 transaction bytes that were signed
    pub transaction_bytes: String,
    /// Base64 signature
    pub signature: String,
    /// Base64 public key of the signer
    pub public_key: String,
}
