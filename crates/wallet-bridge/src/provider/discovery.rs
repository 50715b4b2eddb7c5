//! Wallet discovery registry.
//!
//! Wallets register additively for the page lifetime; page code lists them
//! or subscribes to registration events. Each record is keyed by its own
//! registration id, so two wallets never overwrite each other, even with
//! identical names.

use crate::provider::standard::Wallet;
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

/// Default event buffer per subscriber
const EVENT_CAPACITY: usize = 64;

/// Unique key of one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Registry change notifications
#[derive(Clone)]
pub enum DiscoveryEvent {
    Registered {
        id: RegistrationId,
        wallet: Arc<dyn Wallet>,
    },
    Unregistered {
        id: RegistrationId,
    },
    /// Page unloading; no further events follow
    TornDown,
}

impl fmt::Debug for DiscoveryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryEvent::Registered { id, wallet } => f
                .debug_struct("Registered")
                .field("id", id)
                .field("name", &wallet.metadata().name)
                .finish(),
            DiscoveryEvent::Unregistered { id } => {
                f.debug_struct("Unregistered").field("id", id).finish()
            }
            DiscoveryEvent::TornDown => f.write_str("TornDown"),
        }
    }
}

/// Errors from discovery operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("wallet registry has been torn down")]
    TornDown,
}

/// Process-wide wallet registry.
pub struct WalletRegistry {
    wallets: RwLock<Vec<(RegistrationId, Arc<dyn Wallet>)>>,
    sender: broadcast::Sender<DiscoveryEvent>,
    torn_down: AtomicBool,
}

impl WalletRegistry {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            wallets: RwLock::new(Vec::new()),
            sender,
            torn_down: AtomicBool::new(false),
        }
    }

    /// Add a wallet. Never replaces an existing registration.
    ///
    /// Events are sent under the write lock, so subscribers never see a
    /// registry event after `TornDown`.
    pub fn register(self: &Arc<Self>, wallet: Arc<dyn Wallet>) -> Result<Registration, DiscoveryError> {
        let id = RegistrationId::new();
        {
            let mut wallets = self.wallets.write();
            if self.torn_down.load(Ordering::Acquire) {
                return Err(DiscoveryError::TornDown);
            }
            wallets.push((id, Arc::clone(&wallet)));
            // No subscribers is fine
            let _ = self.sender.send(DiscoveryEvent::Registered {
                id,
                wallet: Arc::clone(&wallet),
            });
        }

        info!(
            registration = %id,
            wallet = %wallet.metadata().name,
            "Registered wallet"
        );

        Ok(Registration {
            id,
            registry: Arc::downgrade(self),
        })
    }

    /// Remove a registration; returns false if it is unknown.
    pub fn unregister(&self, id: RegistrationId) -> bool {
        let removed = {
            let mut wallets = self.wallets.write();
            let before = wallets.len();
            wallets.retain(|(existing, _)| *existing != id);
            let removed = wallets.len() != before;
            if removed {
                let _ = self.sender.send(DiscoveryEvent::Unregistered { id });
            }
            removed
        };

        if removed {
            debug!(registration = %id, "Unregistered wallet");
        }
        removed
    }

    /// Registered wallets in registration order
    pub fn wallets(&self) -> Vec<Arc<dyn Wallet>> {
        self.wallets
            .read()
            .iter()
            .map(|(_, wallet)| Arc::clone(wallet))
            .collect()
    }

    /// First wallet registered under `name`
    pub fn find(&self, name: &str) -> Option<Arc<dyn Wallet>> {
        self.wallets
            .read()
            .iter()
            .find(|(_, wallet)| wallet.metadata().name == name)
            .map(|(_, wallet)| Arc::clone(wallet))
    }

    /// Subscribe to registry changes from now on
    pub fn subscribe(&self) -> DiscoverySubscription {
        DiscoverySubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Drop every registration on page unload. Idempotent.
    pub fn teardown(&self) {
        let cleared = {
            let mut wallets = self.wallets.write();
            if self.torn_down.swap(true, Ordering::AcqRel) {
                return;
            }
            let cleared = wallets.len();
            wallets.clear();
            let _ = self.sender.send(DiscoveryEvent::TornDown);
            cleared
        };

        info!(cleared = cleared, "Wallet registry torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.wallets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.read().is_empty()
    }
}

impl Default for WalletRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WalletRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRegistry")
            .field("wallets", &self.len())
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

/// Handle to one registration.
///
/// Dropping it leaves the wallet registered.
#[derive(Debug)]
pub struct Registration {
    id: RegistrationId,
    registry: Weak<WalletRegistry>,
}

impl Registration {
    pub fn id(&self) -> RegistrationId {
        self.id
    }

    /// Remove this wallet from the registry
    pub fn unregister(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.unregister(self.id))
    }
}

/// Stream of discovery events for one subscriber.
pub struct DiscoverySubscription {
    receiver: broadcast::Receiver<DiscoveryEvent>,
}

impl DiscoverySubscription {
    /// Receive the next event; `None` once the registry is gone.
    pub async fn recv(&mut self) -> Option<DiscoveryEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "Discovery subscriber lagged, some events dropped");
                    continue;
                }
            }
        }
    }

    /// Receive without waiting
    pub fn try_recv(&mut self) -> Option<DiscoveryEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
