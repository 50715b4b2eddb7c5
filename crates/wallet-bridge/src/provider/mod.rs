//! Provider surfaces exposed to page code.
//!
//! Both surfaces share one [`BridgeClient`], so they issue through the same
//! correlator and registry.

pub mod client;
pub mod discovery;
pub mod legacy;
pub mod standard;

pub use client::BridgeClient;
pub use discovery::{
    DiscoveryError, DiscoveryEvent, DiscoverySubscription, Registration, RegistrationId,
    WalletRegistry,
};
pub use legacy::{deprecation_notice, GlobalSlot, LegacyProvider, LegacyState};
pub use standard::{StandardWallet, Wallet, WalletMetadata};
