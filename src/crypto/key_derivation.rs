//! Key derivation using Argon2id
//!
//! Derives the database key from the user's passphrase. The salt and cost
//! parameters travel in the database header so any later open reproduces
//! the same key.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2, Params,
};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::KdfSettings;
use crate::error::{LedgerError, LedgerResult};

/// Parameters for key derivation, stored alongside the ciphertext
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Salt for key derivation (base64 encoded)
    pub salt: String,
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism degree
    pub parallelism: u32,
}

impl KeyDerivationParams {
    /// Create params with a fresh random salt and the given costs
    pub fn generate(costs: &KdfSettings) -> Self {
        let salt = SaltString::generate(&mut OsRng);
        Self {
            salt: salt.to_string(),
            memory_cost: costs.memory_cost,
            time_cost: costs.time_cost,
            parallelism: costs.parallelism,
        }
    }
}

/// A derived AES-256 key, wiped from memory on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; 32],
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

/// Derive an encryption key from a passphrase
pub fn derive_key(passphrase: &str, params: &KeyDerivationParams) -> LedgerResult<DerivedKey> {
    let salt = SaltString::from_b64(&params.salt)
        .map_err(|e| LedgerError::Encryption(format!("Invalid salt: {}", e)))?;

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| LedgerError::Encryption(format!("Invalid Argon2 parameters: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| LedgerError::Encryption(format!("Key derivation failed: {}", e)))?;

    let hash_output = hash
        .hash
        .ok_or_else(|| LedgerError::Encryption("No hash output generated".to_string()))?;

    let hash_bytes = hash_output.as_bytes();
    if hash_bytes.len() < 32 {
        return Err(LedgerError::Encryption(
            "Hash output too short for AES-256 key".to_string(),
        ));
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&hash_bytes[..32]);

    Ok(DerivedKey { key })
}

#[cfg(test)]
pub(crate) fn test_kdf() -> KdfSettings {
    KdfSettings {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_passphrase_same_key() {
        let params = KeyDerivationParams::generate(&test_kdf());
        let key1 = derive_key("correct horse", &params).unwrap();
        let key2 = derive_key("correct horse", &params).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_passphrase_different_key() {
        let params = KeyDerivationParams::generate(&test_kdf());
        let key1 = derive_key("passphrase1", &params).unwrap();
        let key2 = derive_key("passphrase2", &params).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salt_different_key() {
        let params1 = KeyDerivationParams::generate(&test_kdf());
        let params2 = KeyDerivationParams::generate(&test_kdf());
        assert_ne!(params1.salt, params2.salt);

        let key1 = derive_key("same", &params1).unwrap();
        let key2 = derive_key("same", &params2).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_invalid_salt_rejected() {
        let mut params = KeyDerivationParams::generate(&test_kdf());
        params.salt = "!!".into();
        assert!(matches!(
            derive_key("x", &params),
            Err(LedgerError::Encryption(_))
        ));
    }
}
