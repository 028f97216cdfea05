// Cryptographic signing module
// This file handles transaction signing, key management, and address derivation
// for Sui Ed25519 accounts
//
// Numan Thabit 2025 Nov

use crate::errors::SwapError;
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use blake2::{digest::consts::U32, Blake2b, Digest};
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use hex::FromHex;
use sui_sdk::types::base_types::SuiAddress;

type Blake2b256 = Blake2b<U32>;

const INTENT_SCOPE_TRANSACTION_DATA: u8 = 0x00;
const INTENT_VERSION: u8 = 0x00;
const INTENT_APP_ID_SUI: u8 = 0x00;
const ED25519_FLAG: u8 = 0x00;

/// Ed25519 key bound to a Sui address.
pub struct Ed25519Key {
    signing_key: SigningKey,
    address: SuiAddress,
}

impl Ed25519Key {
    pub fn from_hex(secret_hex: &str) -> Result<Self, SwapError> {
        let trimmed = secret_hex.trim().trim_start_matches("0x");
        let sk_bytes = <[u8; 32]>::from_hex(trimmed)
            .map_err(|e| SwapError::SigningRejected(format!("bad hex key: {e}")))?;
        let signing_key = SigningKey::from_bytes(&sk_bytes);
        let address = derive_address(&signing_key.verifying_key())?;
        Ok(Self {
            signing_key,
            address,
        })
    }

    pub fn address(&self) -> SuiAddress {
        self.address
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign BCS `TransactionData` bytes. Output is the serialized Sui signature
    /// `flag || signature || pubkey` with flag=0x00 for Ed25519.
    pub fn sign_transaction(&self, tx_bcs: &[u8]) -> Vec<u8> {
        let digest = intent_digest(tx_bcs);
        let sig_bytes: [u8; 64] = self.signing_key.sign(&digest).to_bytes();

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&sig_bytes);
        serialized.extend_from_slice(&self.public_key());
        serialized
    }
}

/// Blake2b-256 over the 3-byte transaction intent header followed by the BCS bytes.
pub fn intent_digest(tx_bcs: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update([
        INTENT_SCOPE_TRANSACTION_DATA,
        INTENT_VERSION,
        INTENT_APP_ID_SUI,
    ]);
    hasher.update(tx_bcs);
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Sui address = Blake2b-256(flag || pubkey).
pub fn derive_address(vk: &VerifyingKey) -> Result<SuiAddress, SwapError> {
    let mut hasher = Blake2b256::new();
    hasher.update([ED25519_FLAG]);
    hasher.update(vk.to_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    SuiAddress::from_bytes(digest).map_err(|e| SwapError::SigningRejected(e.to_string()))
}

/// Base64 for JSON-RPC submit.
pub fn serialize_signature_b64(sig_ser: &[u8]) -> String {
    B64.encode(sig_ser)
}
