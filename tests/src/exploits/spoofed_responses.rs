//! # Spoofed Response Attacks
//!
//! Any script on the page can post messages onto the channel the bridge
//! listens on. None of these may settle a pending request:
//!
//! 1. **Origin spoofing**: a valid envelope with a guessed id from the page origin
//! 2. **Malformed envelopes**: extra fields, wrong types, garbage ids
//! 3. **Replay**: re-posting a genuine response after it settled
//! 4. **Flooding**: many bogus responses while a genuine one is pending

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use wallet_bridge::domain::config::DEFAULT_SIGNING_ORIGIN;
    use wallet_bridge::domain::correlation::RequestId;
    use wallet_bridge::domain::envelope::ResponseEnvelope;
    use wallet_bridge::ipc::channel::{pair, PageChannel, SigningEndpoint};
    use wallet_bridge::{BridgeConfig, InboundMessage, Transport, WalletBridge};

    // =============================================================================
    // TEST HELPERS
    // =============================================================================

    const DAPP_ORIGIN: &str = "https://dapp.example";

    fn setup() -> (WalletBridge, Arc<PageChannel>, SigningEndpoint) {
        let (channel, endpoint) = pair(DEFAULT_SIGNING_ORIGIN);
        let channel = Arc::new(channel);
        let transport: Arc<dyn Transport> = channel.clone();
        let bridge = WalletBridge::new(BridgeConfig::default(), transport).unwrap();
        (bridge, channel, endpoint)
    }

    fn hostile(channel: &PageChannel, origin: &str, body: Value) {
        channel.deliver(InboundMessage::new(origin, body));
    }

    // =============================================================================
    // ATTACK: ORIGIN SPOOFING
    // =============================================================================

    #[tokio::test]
    async fn test_spoofed_origin_with_correct_id_rejected() {
        let (bridge, channel, mut endpoint) = setup();
        let call = bridge.correlator().issue("get-accounts", json!({})).unwrap();
        let request = endpoint.recv().await.unwrap();

        // Attacker somehow learned the id
        for origin in [DAPP_ORIGIN, "chrome-extension://evil-wallet", "null"] {
            hostile(
                &channel,
                origin,
                ResponseEnvelope::success(request.id, json!(["0xattacker"])).to_json(),
            );
        }
        assert_eq!(bridge.correlator().pending_count(), 1);
        assert_eq!(bridge.guard().stats().foreign.load(Ordering::Relaxed), 3);

        endpoint.reply(&ResponseEnvelope::success(request.id, json!(["0xabc"])));
        assert_eq!(call.await.unwrap(), json!(["0xabc"]));
    }

    // =============================================================================
    // ATTACK: MALFORMED ENVELOPES FROM THE SIGNING ORIGIN
    // =============================================================================

    #[tokio::test]
    async fn test_malformed_bodies_never_settle() {
        let (bridge, _channel, mut endpoint) = setup();
        let call = bridge.correlator().issue("get-accounts", json!({})).unwrap();
        let request = endpoint.recv().await.unwrap();
        let id = request.id.to_string();

        let bodies = [
            json!({ "id": id, "outcome": { "ok": true, "value": ["0x1"] }, "extra": 1 }),
            json!({ "id": id, "outcome": { "ok": true, "value": ["0x1"], "error": "x" } }),
            json!({ "id": id, "outcome": { "ok": 1, "value": ["0x1"] } }),
            json!({ "id": id, "outcome": { "ok": false, "error": 42 } }),
            json!({ "id": id, "result": ["0x1"] }),
            json!({ "id": 7, "outcome": { "ok": true, "value": ["0x1"] } }),
            json!([id, ["0x1"]]),
            json!(null),
        ];
        let count = bodies.len() as u64;
        for body in bodies {
            endpoint.post(body);
        }

        assert_eq!(bridge.correlator().pending_count(), 1);
        assert_eq!(bridge.guard().stats().malformed.load(Ordering::Relaxed), count);

        endpoint.reply(&ResponseEnvelope::success(request.id, json!(["0xabc"])));
        assert_eq!(call.await.unwrap(), json!(["0xabc"]));
    }

    #[tokio::test]
    async fn test_contract_violation_fails_only_that_caller() {
        let (bridge, _channel, mut endpoint) = setup();
        let accounts = bridge.correlator().issue("get-accounts", json!({})).unwrap();
        let other = bridge.correlator().issue("get-accounts", json!({})).unwrap();
        let first = endpoint.recv().await.unwrap();
        let second = endpoint.recv().await.unwrap();

        // Numbers where addresses are expected
        endpoint.reply(&ResponseEnvelope::success(first.id, json!([1, 2, 3])));
        endpoint.reply(&ResponseEnvelope::success(second.id, json!(["0xabc"])));

        let err = accounts.await.unwrap_err();
        assert_eq!(err.kind(), wallet_bridge::ErrorKind::Protocol);
        assert_eq!(other.await.unwrap(), json!(["0xabc"]));
    }

    // =============================================================================
    // ATTACK: REPLAY
    // =============================================================================

    #[tokio::test]
    async fn test_replayed_response_is_ignored() {
        let (bridge, channel, mut endpoint) = setup();

        let first = bridge.correlator().issue("get-accounts", json!({})).unwrap();
        let request = endpoint.recv().await.unwrap();
        let genuine = ResponseEnvelope::success(request.id, json!(["0xabc"]));
        endpoint.reply(&genuine);
        assert_eq!(first.await.unwrap(), json!(["0xabc"]));

        let second = bridge.correlator().issue("get-accounts", json!({})).unwrap();
        let _ = endpoint.recv().await.unwrap();

        // Replay through both the signing origin and a page script
        endpoint.reply(&genuine);
        hostile(&channel, DAPP_ORIGIN, genuine.to_json());

        assert_eq!(bridge.correlator().pending_count(), 1);
        drop(second);
    }

    // =============================================================================
    // ATTACK: FLOODING
    // =============================================================================

    #[tokio::test]
    async fn test_flood_of_guessed_ids() {
        let (bridge, channel, mut endpoint) = setup();
        let call = bridge.correlator().issue("get-accounts", json!({})).unwrap();
        let request = endpoint.recv().await.unwrap();

        for _ in 0..1_000 {
            let guess = ResponseEnvelope::success(RequestId::new(), json!(["0xattacker"]));
            hostile(&channel, DAPP_ORIGIN, guess.to_json());
            endpoint.reply(&guess);
        }
        assert_eq!(bridge.correlator().pending_count(), 1);

        endpoint.reply(&ResponseEnvelope::success(request.id, json!(["0xabc"])));
        let result = tokio::time::timeout(Duration::from_secs(1), call)
            .await
            .unwrap();
        assert_eq!(result.unwrap(), json!(["0xabc"]));
    }
}
