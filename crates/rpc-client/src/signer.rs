use std::fmt;

use faster_hex::{hex_decode, hex_string};
use lazy_static::lazy_static;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use sr_types::Transaction;

use crate::error::{ChainError, Result};

lazy_static! {
    static ref SECP256K1: Secp256k1<All> = Secp256k1::new();
}

/// Secret key of a committee account.
#[derive(Clone)]
pub struct PrivateKey(SecretKey);

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl PrivateKey {
    /// Parse a 32 bytes hex key, `0x` prefix optional.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim().trim_start_matches("0x");
        if hex.len() != 64 {
            return Err(ChainError::SigningFailed(format!(
                "invalid private key length {}",
                hex.len()
            )));
        }
        let mut decoded = [0u8; 32];
        hex_decode(hex.as_bytes(), &mut decoded)
            .map_err(|err| ChainError::SigningFailed(format!("invalid private key: {}", err)))?;
        let key = SecretKey::from_slice(&decoded)
            .map_err(|err| ChainError::SigningFailed(format!("invalid private key: {}", err)))?;
        Ok(PrivateKey(key))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&SECP256K1, &self.0)
    }

    /// Recoverable signature, `r || s || recovery id`.
    pub fn sign_message(&self, digest: [u8; 32]) -> Result<[u8; 65]> {
        let message = Message::from_slice(&digest)
            .map_err(|err| ChainError::SigningFailed(err.to_string()))?;
        let signature = SECP256K1.sign_ecdsa_recoverable(&message, &self.0);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut buf = [0u8; 65];
        buf[..64].copy_from_slice(&compact);
        buf[64] = recovery_id.to_i32() as u8;
        Ok(buf)
    }
}

/// Digest signed by committee accounts: `sha256(chain id || transaction json)`.
pub fn signing_digest(transaction: &Transaction, chain_id: &str) -> Result<[u8; 32]> {
    let chain_id = chain_id.trim_start_matches("0x");
    let mut chain_id_bytes = vec![0u8; chain_id.len() / 2];
    hex_decode(chain_id.as_bytes(), &mut chain_id_bytes)
        .map_err(|err| ChainError::SigningFailed(format!("invalid chain id {}: {}", chain_id, err)))?;
    let body = serde_json::to_vec(transaction)
        .map_err(|err| ChainError::SigningFailed(err.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&chain_id_bytes);
    hasher.update(&body);
    Ok(hasher.finalize().into())
}

pub fn sign_transaction(
    transaction: &Transaction,
    key: &PrivateKey,
    chain_id: &str,
) -> Result<String> {
    let digest = signing_digest(transaction, chain_id)?;
    let signature = key.sign_message(digest)?;
    Ok(format!("0x{}", hex_string(&signature)))
}
