//! Local faucet client.

use crate::config::LocalnetConfig;
use crate::error::{HarnessError, HarnessResult};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
enum FaucetRequest<'a> {
    FixedAmountRequest { recipient: &'a str },
}

/// Requests gas coins for an address.
#[derive(Debug, Clone)]
pub struct FaucetClient {
    http_client: reqwest::Client,
    gas_url: String,
}

impl FaucetClient {
    pub fn new(config: &LocalnetConfig) -> HarnessResult<Self> {
        Ok(Self {
            http_client: config.http_client()?,
            gas_url: format!("{}/gas", config.faucet_url.trim_end_matches('/')),
        })
    }

    /// Ask the faucet to fund `recipient`.
    ///
    /// A non-success status, a present `error` field, or a body that is not
    /// JSON all count as faucet failures.
    pub async fn request_gas(&self, recipient: &str) -> HarnessResult<Value> {
        let response = self
            .http_client
            .post(&self.gas_url)
            .json(&FaucetRequest::FixedAmountRequest { recipient })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let data: Value = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(_) => {
                warn!(status = status.as_u16(), "Faucet returned a non-JSON body");
                return Err(HarnessError::Faucet {
                    status: status.as_u16(),
                    error: "response is not JSON".into(),
                });
            }
        };

        let error = data.get("error").filter(|e| !e.is_null());
        if !status.is_success() || error.is_some() {
            let error = match error {
                Some(Value::String(message)) => message.clone(),
                Some(other) => other.to_string(),
                None => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            warn!(status = status.as_u16(), error = %error, "Unable to invoke local faucet");
            return Err(HarnessError::Faucet {
                status: status.as_u16(),
                error,
            });
        }

        debug!(recipient = recipient, "Faucet funded account");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(FaucetRequest::FixedAmountRequest { recipient: "0xabc" })
            .unwrap();
        assert_eq!(body, json!({ "FixedAmountRequest": { "recipient": "0xabc" } }));
    }

    #[test]
    fn test_gas_url() {
        let config = LocalnetConfig::with_urls("http://node", "http://faucet:9123/");
        let faucet = FaucetClient::new(&config).unwrap();
        assert_eq!(faucet.gas_url, "http://faucet:9123/gas");
    }
}
