//! Localnet tasks used by browser-side test suites.
//!
//! `faucet` creates and funds a fresh account; `mint` uses a previously
//! funded account to mint an example NFT.

use crate::config::LocalnetConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::faucet::FaucetClient;
use crate::keystore::Keystore;
use crate::rpc::JsonRpcClient;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use wallet_bridge::domain::transaction::MoveCallTransaction;
use wallet_bridge::ports::{RpcClient, RpcError};

const MINT_GAS_BUDGET: u64 = 30_000;

/// Move call minting the example NFT
pub fn example_nft_mint(gas_payment: String) -> MoveCallTransaction {
    MoveCallTransaction {
        package_object_id: "0x2".into(),
        module: "devnet_nft".into(),
        function: "mint".into(),
        type_arguments: vec![],
        arguments: vec![
            json!("Example NFT"),
            json!("An example NFT."),
            json!("ipfs://bafkreibngqhl3gaa7daob4i2vccziay2jjlp435cf66vhono7nrvww53ty"),
        ],
        gas_payment: Some(gas_payment),
        gas_budget: MINT_GAS_BUDGET,
    }
}

/// Funded accounts plus the clients to use them
pub struct LocalnetTasks {
    keystore: Keystore,
    faucet: FaucetClient,
    rpc: Arc<dyn RpcClient>,
}

impl LocalnetTasks {
    /// Tasks against the node and faucet in `config`
    pub fn new(config: &LocalnetConfig) -> HarnessResult<Self> {
        let rpc = Arc::new(JsonRpcClient::new(config)?);
        Self::with_rpc(config, rpc)
    }

    /// Tasks using a caller-supplied RPC client
    pub fn with_rpc(config: &LocalnetConfig, rpc: Arc<dyn RpcClient>) -> HarnessResult<Self> {
        Ok(Self {
            keystore: Keystore::new(),
            faucet: FaucetClient::new(config)?,
            rpc,
        })
    }

    /// Create a fresh account and fund it from the faucet.
    ///
    /// The keypair is kept even if funding fails.
    pub async fn faucet(&self) -> HarnessResult<String> {
        let keypair = self.keystore.generate();
        let address = keypair.address().to_string();

        self.faucet.request_gas(&address).await?;

        info!(address = %address, "Funded localnet account");
        Ok(address)
    }

    /// Mint the example NFT from `address`.
    pub async fn mint(&self, address: &str) -> HarnessResult<Value> {
        let keypair = self
            .keystore
            .get(address)
            .ok_or_else(|| HarnessError::MissingKeypair(address.to_string()))?;

        let gas = self
            .rpc
            .owned_gas_objects(address)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::NoGasObjects(address.to_string()))?;

        let call = example_nft_mint(gas.object_id);
        let tx_bytes = self.rpc.move_call(address, &call).await?;
        let raw = BASE64
            .decode(&tx_bytes)
            .map_err(|e| RpcError::Decode(format!("transaction bytes are not base64: {e}")))?;

        let effects = self
            .rpc
            .execute_transaction(&tx_bytes, &keypair.sign_base64(&raw), &keypair.public_key_base64())
            .await?;

        info!(address = %address, "Minted example NFT");
        Ok(effects)
    }

    pub fn keystore(&self) -> &Keystore {
        &self.keystore
    }
}
