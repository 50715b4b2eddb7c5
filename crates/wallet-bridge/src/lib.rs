//! Wallet Bridge - in-page wallet provider for untrusted dApp code.
//!
//! Exposes a capability-negotiated API to page scripts and forwards every
//! sensitive operation (address disclosure, signing, submission) to an
//! isolated signing context over a correlated message channel.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                              PAGE                                    │
//! │                                                                      │
//! │   dApp code                                                          │
//! │      │                                                               │
//! │  ┌───┴──────────────┐          ┌──────────────────────┐              │
//! │  │  Legacy Facade   │          │ Standardized Wallet  │              │
//! │  │  (global slot)   │          │ (discovery registry) │              │
//! │  └───┬──────────────┘          └──────────┬───────────┘              │
//! │      └───────────────┬────────────────────┘                          │
//! │                      │                                               │
//! │  ┌───────────────────┴────────────────────┐                          │
//! │  │      BridgeClient (typed calls)        │                          │
//! │  └───────────────────┬────────────────────┘                          │
//! │                      │                                               │
//! │  ┌───────────────────┴────────────────────┐   ┌──────────────────┐   │
//! │  │  Request Correlator + Pending Table    │◄──┤  Boundary Guard  │   │
//! │  │  (capability registry checked first)   │   │  (origin, shape) │   │
//! │  └───────────────────┬────────────────────┘   └────────▲─────────┘   │
//! │                      │                                 │             │
//! │  ┌───────────────────┴─────────────────────────────────┴─────────┐   │
//! │  │                     Transport Channel                         │   │
//! │  └───────────────────────────────┬───────────────────────────────┘   │
//! └──────────────────────────────────┼───────────────────────────────────┘
//!                                    │
//!                           Signing context
//!                        (holds key material)
//! ```
//!
//! # Error kinds
//!
//! - **Transport**: channel unavailable; surfaces once the wait bound elapses
//! - **Timeout**: no response within the capability's bound
//! - **Protocol**: response broke the capability's output contract
//! - **Capability**: unknown capability or bad payload; fails before sending
//! - **Application**: the signing context refused or failed
//! - **Collision**: the legacy slot is already taken
//!
//! # Usage
//!
//! ```ignore
//! use wallet_bridge::{BridgeConfig, PageContext, WalletBridge};
//!
//! let page = PageContext::new();
//! let mut bridge = WalletBridge::new(BridgeConfig::load("bridge.toml")?, transport)?;
//! bridge.install(&page)?;
//!
//! let wallet = page.discovery().find("Sui Wallet").unwrap();
//! let accounts = wallet.get_accounts().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bridge;
pub mod domain;
pub mod ipc;
pub mod ports;
pub mod provider;
pub mod telemetry;

// Re-exports for public API
pub use bridge::{InstallReport, PageContext, WalletBridge};
pub use domain::config::BridgeConfig;
pub use domain::error::{BridgeError, BridgeResult, ErrorKind};
pub use domain::{
    get_capability, is_capability_supported, CapabilityDescriptor, CapabilityRegistry, Shape,
};
pub use ipc::{BoundaryGuard, InboundMessage, PendingCall, RequestCorrelator, Transport};
pub use ports::{RpcClient, RpcError};
pub use provider::{BridgeClient, GlobalSlot, LegacyProvider, StandardWallet, Wallet, WalletRegistry};
pub use telemetry::init_tracing;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
