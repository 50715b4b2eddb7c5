//! # Legacy Global Abuse
//!
//! The legacy provider sits in a page global that every script can read.
//! Holding it must not let a script touch anyone else's request:
//!
//! 1. **Forged settlement**: no path from the slot reaches the correlator
//! 2. **Capability smuggling**: internal operations are not capabilities
//! 3. **State disclosure**: formatting the provider reveals no pending state

#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wallet_bridge::domain::config::DEFAULT_SIGNING_ORIGIN;
    use wallet_bridge::domain::envelope::ResponseEnvelope;
    use wallet_bridge::ipc::channel::{pair, PageChannel, SigningEndpoint};
    use wallet_bridge::{
        BridgeConfig, BridgeError, InboundMessage, PageContext, Transport, WalletBridge,
    };

    // =============================================================================
    // TEST HELPERS
    // =============================================================================

    const DAPP_ORIGIN: &str = "https://dapp.example";

    fn installed(page: &PageContext) -> (WalletBridge, Arc<PageChannel>, SigningEndpoint) {
        let (channel, endpoint) = pair(DEFAULT_SIGNING_ORIGIN);
        let channel = Arc::new(channel);
        let transport: Arc<dyn Transport> = channel.clone();
        let mut bridge = WalletBridge::new(BridgeConfig::default(), transport).unwrap();
        bridge.install(page).unwrap();
        (bridge, channel, endpoint)
    }

    // =============================================================================
    // ATTACK: FORGED SETTLEMENT THROUGH THE LEGACY GLOBAL
    // =============================================================================

    #[tokio::test]
    async fn test_legacy_holder_cannot_settle_victim_request() {
        let page = PageContext::new();
        let (bridge, channel, mut endpoint) = installed(&page);

        let wallet = page.discovery().find("Sui Wallet").unwrap();
        let victim = tokio::spawn(async move { wallet.get_accounts().await });
        let request = endpoint.recv().await.unwrap();

        // Everything the attacker can reach from the global
        let legacy = page.slot("suiWallet").get().cloned().unwrap();
        for name in ["resolve", "clear", "pending", "settle"] {
            let forged = ResponseEnvelope::success(request.id, json!(["0xattacker"])).to_json();
            let err = legacy.access().request(name, forged).await.unwrap_err();
            assert_eq!(err, BridgeError::CapabilityNotSupported(name.into()));
        }
        channel.deliver(InboundMessage::new(
            DAPP_ORIGIN,
            ResponseEnvelope::success(request.id, json!(["0xattacker"])).to_json(),
        ));

        assert_eq!(bridge.correlator().pending_count(), 1);
        assert!(endpoint.try_recv().is_none());

        endpoint.reply(&ResponseEnvelope::success(request.id, json!(["0xabc"])));
        let accounts = tokio::time::timeout(Duration::from_secs(1), victim)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(accounts.unwrap(), vec!["0xabc".to_string()]);
    }

    // =============================================================================
    // ATTACK: STATE DISCLOSURE
    // =============================================================================

    #[tokio::test]
    async fn test_legacy_global_reveals_no_pending_state() {
        let page = PageContext::new();
        let (bridge, _channel, _endpoint) = installed(&page);
        let inflight = bridge.correlator().issue("get-accounts", json!({})).unwrap();

        let legacy = page.slot("suiWallet").get().cloned().unwrap();
        let rendered = format!("{legacy:?} {:?}", legacy.access());

        assert!(!rendered.contains("pending"));
        assert!(!rendered.contains("correlator"));
        assert!(!rendered.contains(&inflight.id().to_string()));
        assert!(!legacy.members().iter().any(|m| m.contains("resolve")));
    }
}
