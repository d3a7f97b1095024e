use thiserror::Error;

/// Unified error type for the entire finance-tracker-core library.
/// Every public fallible function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    // ── Snapshot encoding ───────────────────────────────────────────
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Key-value storage ───────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Storage is unavailable")]
    StorageUnavailable,

    // ── Encrypted file backend ──────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: wrong password or corrupted file")]
    Decryption,

    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}
