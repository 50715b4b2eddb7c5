//! Simulated signing context.
//!
//! Plays the privileged side of the channel: holds a real Ed25519 keypair,
//! tracks granted permissions, and answers every request envelope.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use localnet_harness::Keypair;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;
use wallet_bridge::domain::envelope::{RequestEnvelope, ResponseEnvelope};
use wallet_bridge::ipc::channel::SigningEndpoint;

const VIEW_ACCOUNT: &str = "viewAccount";

#[derive(Debug, Default)]
struct ContextState {
    granted: HashSet<String>,
    reject_approvals: bool,
    served: Vec<String>,
}

/// Handle to a running simulated signing context
pub struct SimulatedSigningContext {
    keypair: Arc<Keypair>,
    state: Arc<Mutex<ContextState>>,
    task: JoinHandle<()>,
}

impl SimulatedSigningContext {
    /// Start answering requests arriving at `endpoint`
    pub fn start(mut endpoint: SigningEndpoint, keypair: Keypair) -> Self {
        let keypair = Arc::new(keypair);
        let state = Arc::new(Mutex::new(ContextState::default()));

        let task = {
            let keypair = Arc::clone(&keypair);
            let state = Arc::clone(&state);
            tokio::spawn(async move {
                while let Some(request) = endpoint.recv().await {
                    let response = answer(&keypair, &state, &request);
                    endpoint.reply(&response);
                }
            })
        };

        Self {
            keypair,
            state,
            task,
        }
    }

    pub fn address(&self) -> &str {
        self.keypair.address()
    }

    /// Grant account visibility up front
    pub fn grant_view_account(&self) {
        self.state.lock().granted.insert(VIEW_ACCOUNT.to_string());
    }

    /// Make the user reject every approval prompt
    pub fn reject_approvals(&self) {
        self.state.lock().reject_approvals = true;
    }

    /// Capabilities served so far, in arrival order
    pub fn served(&self) -> Vec<String> {
        self.state.lock().served.clone()
    }

    pub fn public_key_base64(&self) -> String {
        self.keypair.public_key_base64()
    }
}

impl Drop for SimulatedSigningContext {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn answer(keypair: &Keypair, state: &Mutex<ContextState>, request: &RequestEnvelope) -> ResponseEnvelope {
    let mut state = state.lock();
    state.served.push(request.capability.clone());
    debug!(capability = %request.capability, "Signing context serving request");

    let id = request.id;
    match request.capability.as_str() {
        "get-accounts" => {
            if state.granted.contains(VIEW_ACCOUNT) {
                ResponseEnvelope::success(id, json!([keypair.address()]))
            } else {
                ResponseEnvelope::failure(id, "Permission denied")
            }
        }
        "has-permissions" => {
            let all_granted = requested_permissions(&request.payload)
                .iter()
                .all(|p| state.granted.contains(p));
            ResponseEnvelope::success(id, json!(all_granted))
        }
        "request-permissions" => {
            if state.reject_approvals {
                return ResponseEnvelope::failure(id, "User rejected the request");
            }
            state.granted.extend(requested_permissions(&request.payload));
            ResponseEnvelope::success(id, json!(true))
        }
        "sign-transaction" => {
            if state.reject_approvals {
                return ResponseEnvelope::failure(id, "User rejected the request");
            }
            match transaction_bytes(&request.payload) {
                Some(bytes) => ResponseEnvelope::success(
                    id,
                    json!({
                        "transactionBytes": BASE64.encode(&bytes),
                        "signature": keypair.sign_base64(&bytes),
                        "publicKey": keypair.public_key_base64(),
                    }),
                ),
                None => ResponseEnvelope::failure(id, "Invalid transaction"),
            }
        }
        "sign-and-execute-transaction" | "execute-move-call" | "execute-serialized-move-call" => {
            if state.reject_approvals {
                return ResponseEnvelope::failure(id, "User rejected the request");
            }
            match transaction_bytes(&request.payload) {
                Some(bytes) => ResponseEnvelope::success(
                    id,
                    json!({
                        "certificate": { "txSignature": keypair.sign_base64(&bytes) },
                        "effects": { "status": { "status": "success" } },
                    }),
                ),
                None => ResponseEnvelope::failure(id, "Invalid transaction"),
            }
        }
        other => ResponseEnvelope::failure(id, format!("Unsupported capability {other}")),
    }
}

fn requested_permissions(payload: &Value) -> Vec<String> {
    payload["permissions"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Bytes to sign for any transaction-bearing payload
fn transaction_bytes(payload: &Value) -> Option<Vec<u8>> {
    if let Some(bytes) = payload["transactionBytes"].as_str() {
        return BASE64.decode(bytes).ok();
    }
    match payload["kind"].as_str() {
        Some("serialized") => BASE64.decode(payload["data"].as_str()?).ok(),
        // Stands in for crafting the transaction on chain
        Some("moveCall") => serde_json::to_vec(&payload["data"]).ok(),
        _ if payload.get("packageObjectId").is_some() => serde_json::to_vec(payload).ok(),
        _ => None,
    }
}
