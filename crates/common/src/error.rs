//! Common error type shared across crates.

use thiserror::Error;

/// The single error type returned by every cipherkit operation.
///
/// Each variant is one error kind; its payload is a human-readable detail
/// that never contains key material. Kinds map to stable numeric codes
/// for callers that marshal errors across a foreign-function boundary:
/// - [`CryptoError::Format`] → 1
/// - [`CryptoError::UnsupportedCipher`] → 2
/// - [`CryptoError::InvalidKeyMaterial`] → 3
/// - [`CryptoError::Padding`] → 4
/// - [`CryptoError::UseAfterRelease`] → 5
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Malformed hex or base64 input, or decoded bytes that are not UTF-8
    /// where text was requested.
    #[error("format error: {0}")]
    Format(String),

    /// The cipher spec string (or digest mode ordinal) is not recognised.
    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    /// Key or IV length does not match what the resolved cipher requires.
    #[error("invalid {material} length for {cipher}: expected {expected} bytes, got {actual}")]
    InvalidKeyMaterial {
        /// Either `"key"` or `"IV"`.
        material: &'static str,
        /// Name of the cipher spec being constructed.
        cipher: String,
        /// Length required by the cipher spec.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// Input is not block aligned, or padding could not be removed after
    /// decryption.
    #[error("padding error: {0}")]
    Padding(String),

    /// The cipher engine was already released.
    #[error("cipher engine used after release")]
    UseAfterRelease,
}

/// Fieldless discriminant of [`CryptoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Format,
    UnsupportedCipher,
    InvalidKeyMaterial,
    Padding,
    UseAfterRelease,
}

impl ErrorKind {
    /// Stable numeric code for this kind.
    pub fn code(self) -> u8 {
        match self {
            ErrorKind::Format => 1,
            ErrorKind::UnsupportedCipher => 2,
            ErrorKind::InvalidKeyMaterial => 3,
            ErrorKind::Padding => 4,
            ErrorKind::UseAfterRelease => 5,
        }
    }
}

impl CryptoError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::Format(_) => ErrorKind::Format,
            CryptoError::UnsupportedCipher(_) => ErrorKind::UnsupportedCipher,
            CryptoError::InvalidKeyMaterial { .. } => ErrorKind::InvalidKeyMaterial,
            CryptoError::Padding(_) => ErrorKind::Padding,
            CryptoError::UseAfterRelease => ErrorKind::UseAfterRelease,
        }
    }
}
