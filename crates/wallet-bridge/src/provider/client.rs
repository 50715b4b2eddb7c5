//! Typed capability client shared by both provider surfaces.

use crate::domain::capabilities::names;
use crate::domain::error::{BridgeError, BridgeResult};
use crate::domain::transaction::{
    MoveCallTransaction, Permission, PermissionRequest, SerializedTransaction,
    SignableTransaction, SignedTransaction,
};
use crate::ipc::correlator::RequestCorrelator;
use crate::ports::outbound::RpcClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Capability calls over a shared correlator.
///
/// Cheap to clone; every clone issues through the same pending table.
#[derive(Clone)]
pub struct BridgeClient {
    correlator: Arc<RequestCorrelator>,
    rpc: Option<Arc<dyn RpcClient>>,
}

impl BridgeClient {
    pub fn new(correlator: Arc<RequestCorrelator>) -> Self {
        Self {
            correlator,
            rpc: None,
        }
    }

    /// Attach a chain RPC client used for gas selection.
    pub fn with_rpc(mut self, rpc: Arc<dyn RpcClient>) -> Self {
        self.set_rpc(rpc);
        self
    }

    pub(crate) fn set_rpc(&mut self, rpc: Arc<dyn RpcClient>) {
        self.rpc = Some(rpc);
    }

    /// Issue any registered capability and wait for its raw result.
    pub async fn request(&self, capability: &str, payload: Value) -> BridgeResult<Value> {
        self.correlator.issue(capability, payload)?.await
    }

    async fn call<T: DeserializeOwned>(
        &self,
        capability: &'static str,
        payload: Value,
    ) -> BridgeResult<T> {
        let value = self.request(capability, payload).await?;
        // Output contract already passed; this catches finer structure
        serde_json::from_value(value).map_err(|_| {
            BridgeError::Protocol(format!("unexpected result shape for '{capability}'"))
        })
    }

    /// Addresses the page may see
    pub async fn get_accounts(&self) -> BridgeResult<Vec<String>> {
        self.call(names::GET_ACCOUNTS, json!({})).await
    }

    pub async fn has_permissions(&self, permissions: &[Permission]) -> BridgeResult<bool> {
        self.call(names::HAS_PERMISSIONS, permission_payload(permissions)?)
            .await
    }

    /// Ask the user to grant `permissions` to the page
    pub async fn request_permissions(&self, permissions: &[Permission]) -> BridgeResult<bool> {
        self.call(names::REQUEST_PERMISSIONS, permission_payload(permissions)?)
            .await
    }

    /// Sign without submitting
    pub async fn sign_transaction(
        &self,
        transaction: &SignableTransaction,
    ) -> BridgeResult<SignedTransaction> {
        self.call(names::SIGN_TRANSACTION, to_payload(transaction)?)
            .await
    }

    /// Sign and submit; returns the execution effects as reported by the signing context
    pub async fn sign_and_execute_transaction(
        &self,
        transaction: &SignableTransaction,
    ) -> BridgeResult<Value> {
        self.request(names::SIGN_AND_EXECUTE_TRANSACTION, to_payload(transaction)?)
            .await
    }

    /// Execute a move call.
    ///
    /// A missing gas payment is filled with the first gas object owned by
    /// the active account when an RPC client is attached. An unsupported
    /// capability fails before gas selection sends anything.
    pub async fn execute_move_call(&self, mut call: MoveCallTransaction) -> BridgeResult<Value> {
        self.correlator
            .registry()
            .require(names::EXECUTE_MOVE_CALL)?;

        if call.gas_payment.is_none() {
            if let Some(rpc) = &self.rpc {
                call.gas_payment = Some(self.select_gas(rpc.as_ref()).await?);
            }
        }
        self.request(names::EXECUTE_MOVE_CALL, to_payload(&call)?)
            .await
    }

    /// Execute pre-serialized transaction bytes (base64)
    pub async fn execute_serialized_move_call(
        &self,
        transaction_bytes: impl Into<String>,
    ) -> BridgeResult<Value> {
        let payload = SerializedTransaction {
            transaction_bytes: transaction_bytes.into(),
        };
        self.request(names::EXECUTE_SERIALIZED_MOVE_CALL, to_payload(&payload)?)
            .await
    }

    async fn select_gas(&self, rpc: &dyn RpcClient) -> BridgeResult<String> {
        let accounts = self.get_accounts().await?;
        let owner = accounts
            .first()
            .ok_or_else(|| BridgeError::Application("no active account".into()))?;

        let objects = rpc.owned_gas_objects(owner).await.map_err(|e| {
            warn!(error = %e, "Gas object lookup failed");
            BridgeError::Rpc(e.to_string())
        })?;

        let gas = objects
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::Application("no gas objects for active account".into()))?;
        debug!(gas_object = %gas.object_id, "Selected gas payment");
        Ok(gas.object_id)
    }

    /// The correlator behind this client. Crate-internal: page code must
    /// not settle or inspect pending operations.
    pub(crate) fn correlator(&self) -> &Arc<RequestCorrelator> {
        &self.correlator
    }

    pub fn has_rpc(&self) -> bool {
        self.rpc.is_some()
    }
}

impl fmt::Debug for BridgeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeClient")
            .field("rpc", &self.rpc.is_some())
            .finish_non_exhaustive()
    }
}

fn permission_payload(permissions: &[Permission]) -> BridgeResult<Value> {
    to_payload(&PermissionRequest {
        permissions: permissions.to_vec(),
    })
}

fn to_payload<T: Serialize>(value: &T) -> BridgeResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| BridgeError::Protocol(format!("payload not serializable: {e}")))
}
