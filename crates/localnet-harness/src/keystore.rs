//! Keypair bindings for localnet accounts.
//!
//! Address -> Ed25519 signing key, held in memory for the lifetime of the
//! harness and never serialized.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dashmap::DashMap;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::sync::Arc;

/// Signature scheme flag prefixed to the public key before hashing
const ED25519_FLAG: u8 = 0x00;

/// Address length in bytes
const ADDRESS_LENGTH: usize = 20;

/// Derive the `0x`-prefixed account address for a public key.
pub fn address_of(public_key: &VerifyingKey) -> String {
    let mut hasher = Sha3_256::new();
    hasher.update([ED25519_FLAG]);
    hasher.update(public_key.as_bytes());
    let digest = hasher.finalize();
    format!("0x{}", hex::encode(&digest[..ADDRESS_LENGTH]))
}

/// Signing key bound to one address
pub struct Keypair {
    address: String,
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a random keypair
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Keypair from a 32-byte secret seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(&seed))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        Self {
            address: address_of(&signing_key.verifying_key()),
            signing_key,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Base64 public key
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.signing_key.verifying_key().as_bytes())
    }

    /// Sign `message`, returning the base64 signature
    pub fn sign_base64(&self, message: &[u8]) -> String {
        BASE64.encode(self.signing_key.sign(message).to_bytes())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Address -> keypair table
#[derive(Default)]
pub struct Keystore {
    keys: DashMap<String, Arc<Keypair>>,
}

impl Keystore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate, store and return a fresh keypair
    pub fn generate(&self) -> Arc<Keypair> {
        let keypair = Arc::new(Keypair::generate());
        self.keys
            .insert(keypair.address().to_string(), Arc::clone(&keypair));
        keypair
    }

    /// Store an existing keypair, replacing any binding for its address
    pub fn insert(&self, keypair: Keypair) -> Arc<Keypair> {
        let keypair = Arc::new(keypair);
        self.keys
            .insert(keypair.address().to_string(), Arc::clone(&keypair));
        keypair
    }

    pub fn get(&self, address: &str) -> Option<Arc<Keypair>> {
        self.keys.get(address).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, address: &str) -> bool {
        self.keys.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for Keystore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keystore")
            .field("accounts", &self.keys.len())
            .finish()
    }
}
