//! JSON-RPC client for a local full node.

use crate::config::LocalnetConfig;
use crate::error::HarnessResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use wallet_bridge::domain::transaction::MoveCallTransaction;
use wallet_bridge::ports::{ObjectRef, RpcClient, RpcError};

/// Type tag of coins usable as gas
const GAS_COIN_TYPE: &str = "0x2::coin::Coin<0x2::sui::SUI>";

/// Signature scheme name sent with executed transactions
const SIGNATURE_SCHEME: &str = "ED25519";

/// JSON-RPC request structure.
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Value,
    id: u64,
}

/// JSON-RPC response structure.
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<Value>,
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// Entry of `sui_getObjectsOwnedByAddress`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnedObject {
    object_id: String,
    version: u64,
    digest: String,
    #[serde(rename = "type")]
    type_: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionBytes {
    tx_bytes: String,
}

/// RPC client for a local node.
#[derive(Debug)]
pub struct JsonRpcClient {
    http_client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(config: &LocalnetConfig) -> HarnessResult<Self> {
        Ok(Self {
            http_client: config.http_client()?,
            rpc_url: config.rpc_url.clone(),
            request_id: AtomicU64::new(1),
        })
    }

    /// Make a JSON-RPC call.
    async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(method = method, id = id, "Sending RPC request");
        let response: JsonRpcResponse = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| RpcError::Decode("response missing result".into()))?;
        serde_json::from_value(result).map_err(|e| RpcError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RpcClient for JsonRpcClient {
    async fn owned_gas_objects(&self, address: &str) -> Result<Vec<ObjectRef>, RpcError> {
        let objects: Vec<OwnedObject> = self
            .call("sui_getObjectsOwnedByAddress", json!([address]))
            .await?;

        Ok(objects
            .into_iter()
            .filter(|object| object.type_ == GAS_COIN_TYPE)
            .map(|object| ObjectRef {
                object_id: object.object_id,
                version: object.version,
                digest: object.digest,
            })
            .collect())
    }

    async fn move_call(
        &self,
        signer: &str,
        call: &MoveCallTransaction,
    ) -> Result<String, RpcError> {
        let params = json!([
            signer,
            call.package_object_id,
            call.module,
            call.function,
            call.type_arguments,
            call.arguments,
            call.gas_payment,
            call.gas_budget,
        ]);
        let bytes: TransactionBytes = self.call("sui_moveCall", params).await?;
        Ok(bytes.tx_bytes)
    }

    async fn execute_transaction(
        &self,
        tx_bytes: &str,
        signature: &str,
        public_key: &str,
    ) -> Result<Value, RpcError> {
        self.call(
            "sui_executeTransaction",
            json!([tx_bytes, SIGNATURE_SCHEME, signature, public_key]),
        )
        .await
    }
}
