//! Localnet endpoints.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the local node and faucet listen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalnetConfig {
    /// Full node JSON-RPC endpoint
    pub rpc_url: String,
    /// Faucet base URL; requests go to `{faucet_url}/gas`
    pub faucet_url: String,
    /// Per-request HTTP timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for LocalnetConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:9000".to_string(),
            faucet_url: "http://127.0.0.1:9123".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl LocalnetConfig {
    /// Config for a node and faucet on non-default addresses
    pub fn with_urls(rpc_url: impl Into<String>, faucet_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            faucet_url: faucet_url.into(),
            ..Self::default()
        }
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
    }
}
