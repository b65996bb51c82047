//! AES-256-GCM encryption/decryption
//!
//! The whole database payload is sealed with AES-256-GCM under a fresh
//! nonce on every commit. A failed tag check is reported as an
//! authentication error: either the passphrase is wrong or the file was
//! altered.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

use super::DerivedKey;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Encrypted data with associated metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedData {
    /// The nonce used for this encryption (base64 encoded)
    pub nonce: String,
    /// The ciphertext with authentication tag (base64 encoded)
    pub ciphertext: String,
    /// Version for future algorithm upgrades
    #[serde(default = "default_version")]
    pub version: u8,
}

fn default_version() -> u8 {
    1
}

impl EncryptedData {
    fn new(nonce: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
            version: 1,
        }
    }

    fn decode_nonce(&self) -> LedgerResult<Vec<u8>> {
        STANDARD
            .decode(&self.nonce)
            .map_err(|e| LedgerError::Encryption(format!("Invalid nonce encoding: {}", e)))
    }

    fn decode_ciphertext(&self) -> LedgerResult<Vec<u8>> {
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| LedgerError::Encryption(format!("Invalid ciphertext encoding: {}", e)))
    }
}

/// Encrypt plaintext with a random nonce
pub fn encrypt(plaintext: &[u8], key: &DerivedKey) -> LedgerResult<EncryptedData> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LedgerError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| LedgerError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedData::new(&nonce_bytes, &ciphertext))
}

/// Decrypt and authenticate ciphertext
pub fn decrypt(encrypted: &EncryptedData, key: &DerivedKey) -> LedgerResult<Vec<u8>> {
    if encrypted.version != 1 {
        return Err(LedgerError::Encryption(format!(
            "Unsupported encryption version: {}",
            encrypted.version
        )));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| LedgerError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let nonce_bytes = encrypted.decode_nonce()?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(LedgerError::Encryption(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = encrypted.decode_ciphertext()?;

    cipher.decrypt(nonce, ciphertext.as_ref()).map_err(|_| {
        LedgerError::Auth("wrong passphrase or corrupted database".to_string())
    })
}
