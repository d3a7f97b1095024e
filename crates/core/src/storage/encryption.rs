use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;

/// Argon2id parameters for key derivation.
/// Stored in the file header so a file can always be reopened with the
/// parameters it was created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Number of iterations
    pub time_cost: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536, // 64 MB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Reject parameters that would exhaust memory or CPU if read from a
    /// crafted file.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(8..=1_048_576).contains(&self.memory_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF memory_cost out of safe range: {} KiB (expected 8..1048576)",
                self.memory_cost
            )));
        }
        if !(1..=20).contains(&self.time_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF time_cost out of safe range: {} (expected 1..20)",
                self.time_cost
            )));
        }
        if !(1..=16).contains(&self.parallelism) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF parallelism out of safe range: {} (expected 1..16)",
                self.parallelism
            )));
        }
        Ok(())
    }
}

/// AES-256-GCM cipher bound to one Argon2id-derived key.
///
/// The key is derived once, when the storage is opened; every seal after
/// that only costs a fresh nonce.
pub struct SnapshotCipher {
    cipher: Aes256Gcm,
}

impl SnapshotCipher {
    pub fn derive(password: &str, salt: &[u8; SALT_LEN], params: &KdfParams) -> Result<Self, CoreError> {
        let argon2_params = Params::new(
            params.memory_cost,
            params.time_cost,
            params.parallelism,
            Some(32),
        )
        .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;

        let mut key = [0u8; 32];
        Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        Ok(Self { cipher })
    }

    /// Encrypt under a fresh random nonce. The 16-byte tag is appended.
    pub fn seal(&self, plaintext: &[u8]) -> Result<([u8; NONCE_LEN], Vec<u8>), CoreError> {
        let nonce = random_bytes::<NONCE_LEN>()?;
        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;
        Ok((nonce, ciphertext))
    }

    /// Decrypt and authenticate. A wrong key or tampered bytes both
    /// surface as `CoreError::Decryption`.
    pub fn open(&self, nonce: &[u8; NONCE_LEN], ciphertext: &[u8]) -> Result<Vec<u8>, CoreError> {
        Ok(self.cipher.decrypt(Nonce::from_slice(nonce), ciphertext)?)
    }
}

/// Cryptographically secure random bytes, used for salts and nonces.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| CoreError::Encryption(format!("Failed to gather randomness: {e}")))?;
    Ok(bytes)
}
