//! Standardized Provider.
//!
//! A wallet that announces itself through the discovery registry, exposing
//! metadata plus typed methods. Each method is exactly one capability
//! request.

use crate::domain::capabilities::names;
use crate::domain::config::WalletConfig;
use crate::domain::error::BridgeResult;
use crate::domain::transaction::{SignableTransaction, SignedTransaction};
use crate::provider::client::BridgeClient;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Wallet Registration Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletMetadata {
    pub name: String,
    /// Data URL
    pub icon: String,
    pub chains: Vec<String>,
    /// Capability names this wallet serves
    pub features: Vec<String>,
    pub version: String,
}

/// A wallet discoverable by page code.
#[async_trait]
pub trait Wallet: Send + Sync {
    fn metadata(&self) -> &WalletMetadata;

    fn supports_chain(&self, chain: &str) -> bool {
        self.metadata().chains.iter().any(|c| c == chain)
    }

    fn supports_feature(&self, feature: &str) -> bool {
        self.metadata().features.iter().any(|f| f == feature)
    }

    async fn get_accounts(&self) -> BridgeResult<Vec<String>>;

    async fn sign_transaction(
        &self,
        transaction: &SignableTransaction,
    ) -> BridgeResult<SignedTransaction>;

    async fn sign_and_execute_transaction(
        &self,
        transaction: &SignableTransaction,
    ) -> BridgeResult<Value>;
}

/// Features the standard surface exposes, when the registry carries them
const STANDARD_FEATURES: [&str; 3] = [
    names::GET_ACCOUNTS,
    names::SIGN_TRANSACTION,
    names::SIGN_AND_EXECUTE_TRANSACTION,
];

/// Wallet backed by the bridge's capability client.
#[derive(Debug, Clone)]
pub struct StandardWallet {
    metadata: WalletMetadata,
    client: BridgeClient,
}

impl StandardWallet {
    pub fn new(config: &WalletConfig, client: BridgeClient) -> Self {
        let registry = client.correlator().registry();
        let features = STANDARD_FEATURES
            .iter()
            .filter(|name| registry.has(name))
            .map(|name| name.to_string())
            .collect();

        Self {
            metadata: WalletMetadata {
                name: config.name.clone(),
                icon: config.icon.clone(),
                chains: config.chains.clone(),
                features,
                version: config.version.clone(),
            },
            client,
        }
    }
}

#[async_trait]
impl Wallet for StandardWallet {
    fn metadata(&self) -> &WalletMetadata {
        &self.metadata
    }

    async fn get_accounts(&self) -> BridgeResult<Vec<String>> {
        self.client.get_accounts().await
    }

    async fn sign_transaction(
        &self,
        transaction: &SignableTransaction,
    ) -> BridgeResult<SignedTransaction> {
        self.client.sign_transaction(transaction).await
    }

    async fn sign_and_execute_transaction(
        &self,
        transaction: &SignableTransaction,
    ) -> BridgeResult<Value> {
        self.client.sign_and_execute_transaction(transaction).await
    }
}
