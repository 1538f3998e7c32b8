//! # Local secp256k1 Signer
//!
//! Signs 32-byte digests with recoverable ECDSA signatures.
//!
//! - RFC 6979 deterministic nonces
//! - Low-S signatures (libsecp256k1 always normalizes)
//! - Address = last 20 bytes of keccak256 of the uncompressed public key
//!   without its `0x04` prefix

use std::fmt;

use glif_primitives::Address;
use rand::RngCore;
use secp256k1::ecdsa::{RecoverableSignature as SecpRecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

use crate::WalletError;

/// ECDSA signature with the y-parity needed for public key recovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// 0 or 1
    pub y_parity: u8,
}

impl RecoverableSignature {
    /// `r || s || v` with `v` = y-parity.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.y_parity;
        out
    }
}

/// secp256k1 key held in memory.
pub struct LocalSigner {
    secret: SecretKey,
    address: Address,
}

impl LocalSigner {
    /// Generate a random key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];
        loop {
            rng.fill_bytes(&mut bytes);
            if let Ok(secret) = SecretKey::from_slice(&bytes) {
                bytes.zeroize();
                return Self::from_secret(secret);
            }
        }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        if bytes.len() != 32 {
            return Err(WalletError::InvalidPrivateKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self::from_secret(secret))
    }

    /// Create from a hex private key, with or without `0x`.
    pub fn from_hex(input: &str) -> Result<Self, WalletError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let mut bytes =
            hex::decode(digits).map_err(|e| WalletError::InvalidPrivateKey(e.to_string()))?;
        let signer = Self::from_bytes(&bytes);
        bytes.zeroize();
        signer
    }

    fn from_secret(secret: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public = PublicKey::from_secret_key(&secp, &secret);
        Self {
            secret,
            address: public_key_address(&public),
        }
    }

    /// Ethereum address of this key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> RecoverableSignature {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(*hash);
        let signature = secp.sign_ecdsa_recoverable(&message, &self.secret);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        RecoverableSignature {
            r,
            s,
            y_parity: recovery_id.to_i32() as u8,
        }
    }

    /// Secret key bytes (for encryption into a key file).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.secret.secret_bytes()
    }

    /// Secret key as `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        let mut bytes = self.to_bytes();
        let out = format!("0x{}", hex::encode(bytes));
        bytes.zeroize();
        out
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Drop for LocalSigner {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

/// Recover the signer address of `hash` from `signature`.
pub fn recover_address(
    hash: &[u8; 32],
    signature: &RecoverableSignature,
) -> Result<Address, WalletError> {
    let secp = Secp256k1::verification_only();

    let recovery_id = RecoveryId::from_i32(i32::from(signature.y_parity))
        .map_err(|e| WalletError::Signature(e.to_string()))?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r);
    compact[32..].copy_from_slice(&signature.s);

    let recoverable = SecpRecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|e| WalletError::Signature(e.to_string()))?;

    let public = secp
        .recover_ecdsa(&Message::from_digest(*hash), &recoverable)
        .map_err(|e| WalletError::Signature(e.to_string()))?;

    Ok(public_key_address(&public))
}

fn public_key_address(public: &PublicKey) -> Address {
    let uncompressed = public.serialize_uncompressed();
    let digest = Keccak256::digest(&uncompressed[1..]);
    Address::from_slice(&digest[12..])
}
