use thiserror::Error;
use wallet_bridge::RpcError;

/// Errors from localnet tasks
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("missing keypair for {0}")]
    MissingKeypair(String),

    #[error("unable to invoke local faucet (status {status}): {error}")]
    Faucet { status: u16, error: String },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("no gas objects owned by {0}")]
    NoGasObjects(String),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
