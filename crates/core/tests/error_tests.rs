// ═══════════════════════════════════════════════════════════════════
// Error Tests: CoreError variants, Display formatting, From impls
// ═══════════════════════════════════════════════════════════════════

use finance_tracker_core::errors::CoreError;

// ── Display formatting ──────────────────────────────────────────────

mod display {
    use super::*;

    #[test]
    fn validation() {
        let err = CoreError::Validation("amount must be positive".into());
        assert_eq!(err.to_string(), "Validation failed: amount must be positive");
    }

    #[test]
    fn serialization() {
        let err = CoreError::Serialization("boom".into());
        assert_eq!(err.to_string(), "Serialization error: boom");
    }

    #[test]
    fn deserialization() {
        let err = CoreError::Deserialization("eof".into());
        assert_eq!(err.to_string(), "Deserialization error: eof");
    }

    #[test]
    fn storage() {
        let err = CoreError::Storage("quota".into());
        assert_eq!(err.to_string(), "Storage error: quota");
    }

    #[test]
    fn storage_unavailable() {
        assert_eq!(CoreError::StorageUnavailable.to_string(), "Storage is unavailable");
    }

    #[test]
    fn invalid_file_format() {
        let err = CoreError::InvalidFileFormat("bad header".into());
        assert_eq!(err.to_string(), "Invalid file format: bad header");
    }

    #[test]
    fn unsupported_version() {
        let err = CoreError::UnsupportedVersion(99);
        assert_eq!(err.to_string(), "Unsupported file version: 99");
    }

    #[test]
    fn encryption() {
        let err = CoreError::Encryption("no entropy".into());
        assert_eq!(err.to_string(), "Encryption failed: no entropy");
    }

    #[test]
    fn decryption_mentions_password() {
        let msg = CoreError::Decryption.to_string();
        assert!(msg.starts_with("Decryption failed"));
        assert!(msg.contains("wrong password"));
    }

    #[test]
    fn file_io() {
        let err = CoreError::FileIO("denied".into());
        assert_eq!(err.to_string(), "File I/O error: denied");
    }
}

// ── From conversions ────────────────────────────────────────────────

mod conversions {
    use super::*;

    #[test]
    fn from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing file");
        let err: CoreError = io.into();
        match err {
            CoreError::FileIO(msg) => assert!(msg.contains("missing file")),
            other => panic!("expected FileIO, got {other:?}"),
        }
    }

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn from_aes_gcm_error() {
        let err: CoreError = aes_gcm::Error.into();
        assert!(matches!(err, CoreError::Decryption));
    }

    #[test]
    fn question_mark_propagates_io() {
        fn read_missing() -> Result<Vec<u8>, CoreError> {
            Ok(std::fs::read("/definitely/not/here/finance.smf")?)
        }
        assert!(matches!(read_missing(), Err(CoreError::FileIO(_))));
    }
}

// ── Trait bounds ────────────────────────────────────────────────────

#[test]
fn core_error_is_std_error_send_sync() {
    fn assert_bounds<T: std::error::Error + Send + Sync + 'static>() {}
    assert_bounds::<CoreError>();
}

#[test]
fn debug_names_the_variant() {
    let debug = format!("{:?}", CoreError::UnsupportedVersion(2));
    assert!(debug.contains("UnsupportedVersion"));
}
