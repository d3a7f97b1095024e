use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::errors::CoreError;

use super::encryption::{random_bytes, KdfParams, SnapshotCipher, SALT_LEN};
use super::format::{FileHeader, CURRENT_VERSION};
use super::traits::KeyValueStorage;

struct FileState {
    cipher: SnapshotCipher,
    kdf_params: KdfParams,
    salt: [u8; SALT_LEN],
    values: BTreeMap<String, String>,
}

/// Durable key-value storage kept in a single encrypted file (native only).
///
/// Flow on every write: map → bincode → AES-256-GCM(Argon2id(password)) →
/// header + ciphertext → temp file → rename over the target.
/// The key is derived once in `open`, so writes stay cheap.
/// Offers no change feed: it has a single view.
pub struct EncryptedFileStorage {
    path: PathBuf,
    state: Mutex<FileState>,
}

impl EncryptedFileStorage {
    /// Open with default Argon2id parameters.
    pub fn open(path: impl AsRef<Path>, password: &str) -> Result<Self, CoreError> {
        Self::open_with_params(path, password, KdfParams::default())
    }

    /// Open an existing file, or start an empty one that is created on the
    /// first write. `params` only applies to new files; an existing file is
    /// always reopened with the parameters recorded in its header.
    pub fn open_with_params(
        path: impl AsRef<Path>,
        password: &str,
        params: KdfParams,
    ) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();

        let state = if path.exists() {
            let bytes = std::fs::read(&path)?;
            let (header, ciphertext) = FileHeader::decode(&bytes)?;
            let cipher = SnapshotCipher::derive(password, &header.salt, &header.kdf_params)?;
            let plaintext = cipher.open(&header.nonce, ciphertext)?;
            let values: BTreeMap<String, String> = bincode::deserialize(&plaintext)
                .map_err(|e| CoreError::Deserialization(format!("Failed to decode storage file: {e}")))?;
            FileState {
                cipher,
                kdf_params: header.kdf_params,
                salt: header.salt,
                values,
            }
        } else {
            params.validate()?;
            let salt = random_bytes::<SALT_LEN>()?;
            FileState {
                cipher: SnapshotCipher::derive(password, &salt, &params)?,
                kdf_params: params,
                salt,
                values: BTreeMap::new(),
            }
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn flush(&self, state: &FileState) -> Result<(), CoreError> {
        let plaintext = bincode::serialize(&state.values)?;
        let (nonce, ciphertext) = state.cipher.seal(&plaintext)?;
        let header = FileHeader {
            version: CURRENT_VERSION,
            kdf_params: state.kdf_params,
            salt: state.salt,
            nonce,
        };

        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, header.encode(&ciphertext))?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Apply `change` to the map and flush; roll the map back if the flush fails.
    fn write_through(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> Option<String>,
        key: &str,
    ) -> Result<(), CoreError> {
        let mut state = self.lock();
        let previous = change(&mut state.values);
        if let Err(e) = self.flush(&state) {
            match previous {
                Some(old) => state.values.insert(key.to_string(), old),
                None => state.values.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

impl KeyValueStorage for EncryptedFileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock().values.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.write_through(|values| values.insert(key.to_string(), value.to_string()), key)
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        if !self.lock().values.contains_key(key) {
            return Ok(());
        }
        self.write_through(|values| values.remove(key), key)
    }
}

impl std::fmt::Debug for EncryptedFileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedFileStorage")
            .field("path", &self.path)
            .field("keys", &self.lock().values.len())
            .finish()
    }
}
