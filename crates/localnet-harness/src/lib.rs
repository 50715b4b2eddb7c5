//! Localnet harness for wallet bridge test suites.
//!
//! Creates funded accounts through the local faucet and drives the example
//! mint flow against a local full node:
//!
//! ```text
//! faucet()          -> new Ed25519 keypair -> POST {faucet}/gas -> address
//! mint(address)     -> keypair lookup -> gas object -> sui_moveCall
//!                   -> sign -> sui_executeTransaction -> effects
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod faucet;
pub mod keystore;
pub mod rpc;
pub mod tasks;

pub use config::LocalnetConfig;
pub use error::{HarnessError, HarnessResult};
pub use faucet::FaucetClient;
pub use keystore::{address_of, Keypair, Keystore};
pub use rpc::JsonRpcClient;
pub use tasks::{example_nft_mint, LocalnetTasks};
