use crate::errors::CoreError;

use super::encryption::{KdfParams, NONCE_LEN, SALT_LEN};

/// Magic bytes identifying an encrypted storage file.
pub const MAGIC: &[u8; 4] = b"SMFK";

/// Current file format version.
pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) + ciphertext_len(8)
pub const HEADER_SIZE: usize = 54;

/// Parsed header of an encrypted storage file.
///
/// Layout:
/// ```text
/// [SMFK: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext_len: 8B LE]
/// [ciphertext: variable]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
}

impl FileHeader {
    /// Assemble header and ciphertext into one file image.
    #[must_use]
    pub fn encode(&self, ciphertext: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + ciphertext.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.memory_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.time_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.parallelism.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
        buf.extend_from_slice(ciphertext);
        buf
    }

    /// Split a file image into its header and ciphertext.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), CoreError> {
        if data.len() < HEADER_SIZE {
            return Err(CoreError::InvalidFileFormat(
                "File too small to hold a storage header".into(),
            ));
        }
        if &data[0..4] != MAGIC {
            return Err(CoreError::InvalidFileFormat(
                "Invalid magic bytes: not a finance storage file".into(),
            ));
        }

        let mut reader = HeaderReader { data, offset: 4 };

        let version = u16::from_le_bytes(reader.take::<2>());
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf_params = KdfParams {
            memory_cost: u32::from_le_bytes(reader.take::<4>()),
            time_cost: u32::from_le_bytes(reader.take::<4>()),
            parallelism: u32::from_le_bytes(reader.take::<4>()),
        };
        kdf_params.validate()?;

        let salt = reader.take::<SALT_LEN>();
        let nonce = reader.take::<NONCE_LEN>();
        let ciphertext_len = u64::from_le_bytes(reader.take::<8>());

        let available = (data.len() - HEADER_SIZE) as u64;
        if ciphertext_len > available {
            return Err(CoreError::InvalidFileFormat(format!(
                "File truncated: expected {ciphertext_len} bytes of ciphertext, got {available}"
            )));
        }
        let end = HEADER_SIZE + ciphertext_len as usize;

        Ok((
            Self {
                version,
                kdf_params,
                salt,
                nonce,
            },
            &data[HEADER_SIZE..end],
        ))
    }
}

// Only used after the length check against HEADER_SIZE, so every take is in bounds.
struct HeaderReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl HeaderReader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.offset..self.offset + N]);
        self.offset += N;
        out
    }
}
