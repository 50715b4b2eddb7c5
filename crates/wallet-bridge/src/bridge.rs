//! Bridge assembly.
//!
//! Wires the transport, guard, correlator and both provider surfaces
//! together and installs them into a page.

use crate::domain::capabilities::CapabilityRegistry;
use crate::domain::config::{BridgeConfig, ConfigError};
use crate::ipc::correlator::RequestCorrelator;
use crate::ipc::guard::BoundaryGuard;
use crate::ipc::pending::cleanup_task;
use crate::ipc::transport::{InboundMessage, Transport};
use crate::ports::outbound::RpcClient;
use crate::provider::client::BridgeClient;
use crate::provider::discovery::{DiscoveryError, RegistrationId, WalletRegistry};
use crate::provider::legacy::{GlobalSlot, LegacyProvider, LegacyState};
use crate::provider::standard::StandardWallet;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Globals shared by every script on one page.
///
/// Holds the wallet discovery registry and the named global slots; lives
/// until the page unloads.
pub struct PageContext {
    discovery: Arc<WalletRegistry>,
    slots: Mutex<HashMap<String, Arc<GlobalSlot>>>,
}

impl PageContext {
    pub fn new() -> Self {
        Self {
            discovery: Arc::new(WalletRegistry::new()),
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn discovery(&self) -> &Arc<WalletRegistry> {
        &self.discovery
    }

    /// Global slot named `name`, created empty on first use
    pub fn slot(&self, name: &str) -> Arc<GlobalSlot> {
        let mut slots = self.slots.lock();
        Arc::clone(
            slots
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(GlobalSlot::new(name))),
        )
    }

    /// Page unload
    pub fn unload(&self) {
        self.discovery.teardown();
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots: Vec<String> = self.slots.lock().keys().cloned().collect();
        f.debug_struct("PageContext")
            .field("discovery", &self.discovery)
            .field("slots", &slots)
            .finish()
    }
}

/// What `install` put into the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Standardized wallet registration
    pub registration: RegistrationId,
    /// Outcome for the legacy slot
    pub legacy: LegacyState,
}

/// One wallet bridge instance.
pub struct WalletBridge {
    config: BridgeConfig,
    correlator: Arc<RequestCorrelator>,
    guard: Arc<BoundaryGuard>,
    client: BridgeClient,
    legacy: Option<Arc<LegacyProvider>>,
    legacy_state: LegacyState,
    registration: Option<RegistrationId>,
    cleanup_handle: Option<JoinHandle<()>>,
}

impl WalletBridge {
    /// Create a bridge serving the built-in capabilities
    pub fn new(config: BridgeConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        Self::with_registry(config, CapabilityRegistry::standard(), transport)
    }

    /// Create a bridge serving `registry`.
    ///
    /// Registers the inbound listener on `transport` immediately; responses
    /// pass through the guard before they reach the correlator.
    pub fn with_registry(
        config: BridgeConfig,
        registry: CapabilityRegistry,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let correlator = Arc::new(RequestCorrelator::new(
            Arc::new(registry),
            Arc::clone(&transport),
            config.timeouts.default,
        ));
        let guard = Arc::new(BoundaryGuard::new(config.signing.origin.clone()));

        // Weak: the transport owns this listener and the correlator owns the transport
        let listener_guard = Arc::clone(&guard);
        let listener_correlator = Arc::downgrade(&correlator);
        transport.on_message(Arc::new(move |message: InboundMessage| {
            let Ok(response) = listener_guard.admit(&message) else {
                return;
            };
            if let Some(correlator) = listener_correlator.upgrade() {
                correlator.resolve(response);
            }
        }));

        let client = BridgeClient::new(Arc::clone(&correlator));

        debug!(
            signing_origin = %config.signing.origin,
            capabilities = correlator.registry().len(),
            "Wallet bridge created"
        );

        Ok(Self {
            config,
            correlator,
            guard,
            client,
            legacy: None,
            legacy_state: LegacyState::Uninitialized,
            registration: None,
            cleanup_handle: None,
        })
    }

    /// Attach a chain RPC client for gas selection. Call before `install`.
    pub fn with_rpc(mut self, rpc: Arc<dyn RpcClient>) -> Self {
        self.client.set_rpc(rpc);
        self
    }

    /// Register the standardized wallet and try to claim the legacy slot.
    ///
    /// A legacy slot collision is logged and reported in the result; the
    /// standardized wallet stays registered either way. Installing again
    /// returns the first report and registers nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn install(&mut self, page: &PageContext) -> Result<InstallReport, DiscoveryError> {
        if let Some(registration) = self.registration {
            debug!(registration = %registration, "Wallet bridge already installed");
            return Ok(InstallReport {
                registration,
                legacy: self.legacy_state,
            });
        }

        let wallet = StandardWallet::new(&self.config.wallet, self.client.clone());
        let registration = page.discovery().register(Arc::new(wallet))?.id();
        self.registration = Some(registration);

        if self.config.legacy.enabled {
            let slot = page.slot(&self.config.legacy.slot);
            let provider = Arc::new(LegacyProvider::new(
                self.client.clone(),
                self.config.legacy.slot.clone(),
            ));
            match slot.attach(provider) {
                Ok(provider) => {
                    self.legacy = Some(provider);
                    self.legacy_state = LegacyState::Attached;
                }
                // Already logged by the slot
                Err(_) => self.legacy_state = LegacyState::AttachFailed,
            }
        }

        self.start_cleanup_task();

        info!(
            wallet = %self.config.wallet.name,
            registration = %registration,
            legacy = ?self.legacy_state,
            "Wallet bridge installed"
        );

        Ok(InstallReport {
            registration,
            legacy: self.legacy_state,
        })
    }

    fn start_cleanup_task(&mut self) {
        if self.cleanup_handle.is_some() {
            return;
        }
        let pending = Arc::clone(self.correlator.pending());
        let interval = self.config.timeouts.cleanup_interval;
        self.cleanup_handle = Some(tokio::spawn(cleanup_task(pending, interval)));
    }

    /// Stop sweeping and drop all pending operations.
    ///
    /// Callers still waiting fail with a transport error.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
        }
        let dropped = self.correlator.pending().clear();
        info!(dropped = dropped, "Wallet bridge shut down");
    }

    /// Shared capability client
    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    pub fn correlator(&self) -> &Arc<RequestCorrelator> {
        &self.correlator
    }

    pub fn guard(&self) -> &Arc<BoundaryGuard> {
        &self.guard
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Legacy provider this bridge installed, if it won the slot
    pub fn legacy(&self) -> Option<&Arc<LegacyProvider>> {
        self.legacy.as_ref()
    }

    pub fn legacy_state(&self) -> LegacyState {
        self.legacy_state
    }

    pub fn registration(&self) -> Option<RegistrationId> {
        self.registration
    }
}

impl Drop for WalletBridge {
    fn drop(&mut self) {
        if let Some(handle) = self.cleanup_handle.take() {
            handle.abort();
        }
    }
}

impl fmt::Debug for WalletBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletBridge")
            .field("wallet", &self.config.wallet.name)
            .field("signing_origin", &self.config.signing.origin)
            .field("legacy_state", &self.legacy_state)
            .field("registration", &self.registration)
            .finish_non_exhaustive()
    }
}
