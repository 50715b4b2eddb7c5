//! Outbound ports for the wallet bridge.

use crate::domain::transaction::MoveCallTransaction;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reference to an owned on-chain object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: String,
    pub version: u64,
    pub digest: String,
}

/// Chain RPC errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcError {
    #[error("rpc transport failed: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Remote { code: i64, message: String },
    #[error("unexpected rpc response: {0}")]
    Decode(String),
}

/// Read and submit access to a chain node.
///
/// Used for gas selection on move calls and by the localnet tooling; the
/// provider surfaces never require one.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Objects owned by `address` that can pay for gas
    async fn owned_gas_objects(&self, address: &str) -> Result<Vec<ObjectRef>, RpcError>;

    /// Build unsigned transaction bytes (base64) for a move call
    async fn move_call(
        &self,
        signer: &str,
        call: &MoveCallTransaction,
    ) -> Result<String, RpcError>;

    /// Submit signed transaction bytes
    async fn execute_transaction(
        &self,
        tx_bytes: &str,
        signature: &str,
        public_key: &str,
    ) -> Result<Value, RpcError>;
}
