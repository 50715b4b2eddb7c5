//! # Integration Test Flows
//!
//! Drives an installed bridge end to end against the simulated signing
//! context:
//!
//! 1. **Permission flow**: accounts are hidden until the page is granted access
//! 2. **Signing flow**: signatures verify under the signing context's key
//! 3. **Concurrency**: responses settle the right callers in any order
//! 4. **Page lifecycle**: two wallets, legacy collision, unload

#[cfg(test)]
mod tests {
    use crate::signing_context::SimulatedSigningContext;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};
    use futures::future::join_all;
    use localnet_harness::Keypair;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use wallet_bridge::domain::config::DEFAULT_SIGNING_ORIGIN;
    use wallet_bridge::domain::envelope::ResponseEnvelope;
    use wallet_bridge::domain::transaction::{
        MoveCallTransaction, Permission, SignableTransaction,
    };
    use wallet_bridge::ipc::channel::{pair, SigningEndpoint};
    use wallet_bridge::provider::{DiscoveryEvent, LegacyState};
    use wallet_bridge::{BridgeConfig, BridgeError, ErrorKind, PageContext, WalletBridge};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn bridge_with(config: BridgeConfig) -> (WalletBridge, SigningEndpoint) {
        let (channel, endpoint) = pair(DEFAULT_SIGNING_ORIGIN);
        let bridge = WalletBridge::new(config, Arc::new(channel)).unwrap();
        (bridge, endpoint)
    }

    fn installed(page: &PageContext) -> (WalletBridge, SimulatedSigningContext) {
        let (mut bridge, endpoint) = bridge_with(BridgeConfig::default());
        bridge.install(page).unwrap();
        let context = SimulatedSigningContext::start(endpoint, Keypair::from_seed([42u8; 32]));
        (bridge, context)
    }

    fn verifying_key(public_key_base64: &str) -> VerifyingKey {
        let bytes = BASE64.decode(public_key_base64).unwrap();
        VerifyingKey::from_bytes(&bytes.try_into().unwrap()).unwrap()
    }

    // =============================================================================
    // PERMISSION AND SIGNING FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_accounts_hidden_until_permission_granted() {
        let page = PageContext::new();
        let (_bridge, context) = installed(&page);
        let wallet = page.discovery().find("Sui Wallet").unwrap();

        let err = wallet.get_accounts().await.unwrap_err();
        assert_eq!(err, BridgeError::Application("Permission denied".into()));

        let legacy = page.slot("suiWallet").get().cloned().unwrap();
        assert!(!legacy.has_permissions(&[Permission::ViewAccount]).await.unwrap());
        assert!(legacy
            .request_permissions(&[Permission::ViewAccount])
            .await
            .unwrap());
        assert!(legacy.has_permissions(&[Permission::ViewAccount]).await.unwrap());

        assert_eq!(
            wallet.get_accounts().await.unwrap(),
            vec![context.address().to_string()]
        );
    }

    #[tokio::test]
    async fn test_signature_verifies_under_signing_key() {
        let page = PageContext::new();
        let (_bridge, context) = installed(&page);
        let wallet = page.discovery().find("Sui Wallet").unwrap();

        let tx_bytes = b"transfer 10 SUI".to_vec();
        let signed = wallet
            .sign_transaction(&SignableTransaction::Serialized(BASE64.encode(&tx_bytes)))
            .await
            .unwrap();

        assert_eq!(signed.public_key, context.public_key_base64());
        let signature = BASE64.decode(&signed.signature).unwrap();
        let signature = Signature::from_bytes(&signature.try_into().unwrap());
        assert!(verifying_key(&signed.public_key)
            .verify(&tx_bytes, &signature)
            .is_ok());
    }

    #[tokio::test]
    async fn test_user_rejection_is_application_error() {
        let page = PageContext::new();
        let (_bridge, context) = installed(&page);
        context.reject_approvals();

        let legacy = page.slot("suiWallet").get().cloned().unwrap();
        let err = legacy
            .execute_serialized_move_call(BASE64.encode(b"tx"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Application);
        assert!(err.to_string().contains("User rejected"));
    }

    #[tokio::test]
    async fn test_legacy_move_call_executes() {
        let page = PageContext::new();
        let (_bridge, context) = installed(&page);
        let legacy = page.slot("suiWallet").get().cloned().unwrap();

        let effects = legacy
            .execute_move_call(MoveCallTransaction {
                package_object_id: "0x2".into(),
                module: "devnet_nft".into(),
                function: "mint".into(),
                type_arguments: vec![],
                arguments: vec![json!("Example NFT")],
                gas_payment: Some("0xgas".into()),
                gas_budget: 30_000,
            })
            .await
            .unwrap();

        assert_eq!(effects["effects"]["status"]["status"], "success");
        assert_eq!(context.served(), vec!["execute-move-call"]);
        assert!(legacy.deprecation_notified());
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test]
    async fn test_concurrent_callers_receive_their_own_results() {
        let page = PageContext::new();
        let (bridge, context) = installed(&page);
        context.grant_view_account();
        let client = bridge.client().clone();

        let calls = (0..20u8).map(|i| {
            let client = client.clone();
            async move {
                let bytes = vec![i; 8];
                let signed = client
                    .sign_transaction(&SignableTransaction::Serialized(BASE64.encode(&bytes)))
                    .await
                    .unwrap();
                (bytes, signed)
            }
        });

        for (bytes, signed) in join_all(calls).await {
            assert_eq!(BASE64.decode(&signed.transaction_bytes).unwrap(), bytes);
        }
        assert_eq!(bridge.correlator().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_out_of_order_responses() {
        let (bridge, mut endpoint) = bridge_with(BridgeConfig::default());
        let correlator = Arc::clone(bridge.correlator());

        let accounts = correlator.issue("get-accounts", json!({})).unwrap();
        let permitted = correlator
            .issue("has-permissions", json!({ "permissions": ["viewAccount"] }))
            .unwrap();

        let first = endpoint.recv().await.unwrap();
        let second = endpoint.recv().await.unwrap();
        endpoint.reply(&ResponseEnvelope::success(second.id, json!(false)));
        endpoint.reply(&ResponseEnvelope::success(first.id, json!(["0x1"])));

        assert_eq!(permitted.await.unwrap(), json!(false));
        assert_eq!(accounts.await.unwrap(), json!(["0x1"]));
    }

    #[tokio::test]
    async fn test_silent_signing_context_times_out() {
        let mut config = BridgeConfig::default();
        config.timeouts.default = Duration::from_millis(25);
        let (bridge, _endpoint) = bridge_with(config);

        let err = bridge.client().get_accounts().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(err.is_retryable());
        assert_eq!(bridge.correlator().pending_count(), 0);
    }

    // =============================================================================
    // PAGE LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_two_wallets_discoverable_and_legacy_collision() {
        let page = PageContext::new();
        let mut events = page.discovery().subscribe();

        let (first, _c1) = installed(&page);

        let mut config = BridgeConfig::default();
        config.wallet.name = "Second Wallet".into();
        let (mut second, endpoint) = bridge_with(config);
        let report = second.install(&page).unwrap();
        let _c2 = SimulatedSigningContext::start(endpoint, Keypair::from_seed([7u8; 32]));

        assert_eq!(first.legacy_state(), LegacyState::Attached);
        assert_eq!(report.legacy, LegacyState::AttachFailed);

        let names: Vec<String> = page
            .discovery()
            .wallets()
            .iter()
            .map(|w| w.metadata().name.clone())
            .collect();
        assert_eq!(names, vec!["Sui Wallet", "Second Wallet"]);

        for _ in 0..2 {
            let event = timeout(Duration::from_millis(100), events.recv())
                .await
                .unwrap();
            assert!(matches!(event, Some(DiscoveryEvent::Registered { .. })));
        }
    }

    #[tokio::test]
    async fn test_unload_tears_down_discovery() {
        let page = PageContext::new();
        let (_bridge, _context) = installed(&page);
        let mut events = page.discovery().subscribe();

        page.unload();

        assert!(page.discovery().is_empty());
        assert!(matches!(events.recv().await, Some(DiscoveryEvent::TornDown)));

        let (mut late, _endpoint) = bridge_with(BridgeConfig::default());
        assert!(late.install(&page).is_err());
    }
}
