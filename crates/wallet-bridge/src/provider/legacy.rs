//! Legacy Provider Facade.
//!
//! The deprecated interface lives in a single well-known global slot. Only
//! one provider may occupy it; a second installer (usually a second copy of
//! the wallet) is refused and the first occupant stays.

use crate::domain::error::{BridgeError, BridgeResult};
use crate::domain::transaction::{
    MoveCallTransaction, Permission, SignableTransaction, SignedTransaction,
};
use crate::provider::client::BridgeClient;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

/// Notice emitted the first time the legacy interface in `slot` is used.
pub fn deprecation_notice(slot: &str) -> String {
    format!(
        "Using the injected legacy wallet interface ({slot}) is deprecated. \
         Use the standard wallet interface through wallet discovery instead."
    )
}

/// Members visible to page code
const MEMBERS: [&str; 7] = [
    "get_accounts",
    "has_permissions",
    "request_permissions",
    "sign_transaction",
    "sign_and_execute_transaction",
    "execute_move_call",
    "execute_serialized_move_call",
];

/// Deprecated direct-object provider.
pub struct LegacyProvider {
    client: BridgeClient,
    slot: String,
    notified: AtomicBool,
    notices: AtomicU64,
}

impl LegacyProvider {
    /// Provider meant for the global slot named `slot`
    pub fn new(client: BridgeClient, slot: impl Into<String>) -> Self {
        Self {
            client,
            slot: slot.into(),
            notified: AtomicBool::new(false),
            notices: AtomicU64::new(0),
        }
    }

    /// Gate every use of the legacy surface.
    ///
    /// Emits the deprecation notice on first access only, even under
    /// concurrent access. The returned client offers capability calls
    /// only; the correlator behind it stays out of reach of page code:
    ///
    /// ```compile_fail
    /// use wallet_bridge::domain::envelope::ResponseEnvelope;
    /// use wallet_bridge::LegacyProvider;
    ///
    /// fn forge(legacy: &LegacyProvider, response: ResponseEnvelope) -> bool {
    ///     legacy.access().correlator().resolve(response)
    /// }
    /// ```
    pub fn access(&self) -> &BridgeClient {
        if !self.notified.swap(true, Ordering::AcqRel) {
            self.notices.fetch_add(1, Ordering::Relaxed);
            warn!(
                slot = %self.slot,
                notice = %self.deprecation_notice(),
                "Legacy wallet interface accessed"
            );
        }
        &self.client
    }

    /// Deprecation text for this provider's slot
    pub fn deprecation_notice(&self) -> String {
        deprecation_notice(&self.slot)
    }

    /// Whether the deprecation notice has been emitted
    pub fn deprecation_notified(&self) -> bool {
        self.notified.load(Ordering::Acquire)
    }

    /// Number of deprecation notices emitted (0 or 1)
    pub fn notices_emitted(&self) -> u64 {
        self.notices.load(Ordering::Relaxed)
    }

    /// Public member names
    pub fn members(&self) -> &'static [&'static str] {
        &MEMBERS
    }

    pub async fn get_accounts(&self) -> BridgeResult<Vec<String>> {
        self.access().get_accounts().await
    }

    pub async fn has_permissions(&self, permissions: &[Permission]) -> BridgeResult<bool> {
        self.access().has_permissions(permissions).await
    }

    pub async fn request_permissions(&self, permissions: &[Permission]) -> BridgeResult<bool> {
        self.access().request_permissions(permissions).await
    }

    pub async fn sign_transaction(
        &self,
        transaction: &SignableTransaction,
    ) -> BridgeResult<SignedTransaction> {
        self.access().sign_transaction(transaction).await
    }

    pub async fn sign_and_execute_transaction(
        &self,
        transaction: &SignableTransaction,
    ) -> BridgeResult<Value> {
        self.access().sign_and_execute_transaction(transaction).await
    }

    pub async fn execute_move_call(&self, call: MoveCallTransaction) -> BridgeResult<Value> {
        self.access().execute_move_call(call).await
    }

    pub async fn execute_serialized_move_call(
        &self,
        transaction_bytes: impl Into<String>,
    ) -> BridgeResult<Value> {
        self.access()
            .execute_serialized_move_call(transaction_bytes)
            .await
    }
}

impl fmt::Debug for LegacyProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyProvider")
            .field("slot", &self.slot)
            .field("members", &MEMBERS)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of the legacy facade for one installer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyState {
    Uninitialized,
    Attached,
    /// Terminal; another provider owns the slot
    AttachFailed,
}

/// Named global slot holding at most one legacy provider.
pub struct GlobalSlot {
    name: String,
    occupant: OnceLock<Arc<LegacyProvider>>,
}

impl GlobalSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            occupant: OnceLock::new(),
        }
    }

    /// Install `provider` unless the slot is already taken.
    pub fn attach(&self, provider: Arc<LegacyProvider>) -> BridgeResult<Arc<LegacyProvider>> {
        let mut installed = false;
        let occupant = self.occupant.get_or_init(|| {
            installed = true;
            Arc::clone(&provider)
        });

        if installed {
            info!(slot = %self.name, "Attached legacy wallet provider");
            Ok(Arc::clone(occupant))
        } else {
            warn!(
                slot = %self.name,
                "Unable to attach to {}. There are likely multiple copies of the wallet installed.",
                self.name
            );
            Err(BridgeError::Collision(self.name.clone()))
        }
    }

    /// Current occupant
    pub fn get(&self) -> Option<&Arc<LegacyProvider>> {
        self.occupant.get()
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.get().is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for GlobalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalSlot")
            .field("name", &self.name)
            .field("occupied", &self.is_occupied())
            .finish()
    }
}
