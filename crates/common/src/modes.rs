//! Closed mode enumerations consumed by the digest and cipher layers.
//!
//! Ordinal positions are a stable contract: a boundary layer that transports
//! modes as integers must use [`DigestMode::ordinal`] /
//! [`DigestMode::from_ordinal`] (and the padding equivalents) rather than
//! relying on Rust discriminants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

// ---------------------------------------------------------------------------
// Digest modes
// ---------------------------------------------------------------------------

/// The supported digest algorithms, in ordinal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DigestMode {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
    Shake128,
    Shake256,
    Md5,
    Sm3,
}

impl DigestMode {
    /// Every mode, indexed by ordinal.
    pub const ALL: [DigestMode; 15] = [
        DigestMode::Sha1,
        DigestMode::Sha224,
        DigestMode::Sha256,
        DigestMode::Sha384,
        DigestMode::Sha512,
        DigestMode::Sha512_224,
        DigestMode::Sha512_256,
        DigestMode::Sha3_224,
        DigestMode::Sha3_256,
        DigestMode::Sha3_384,
        DigestMode::Sha3_512,
        DigestMode::Shake128,
        DigestMode::Shake256,
        DigestMode::Md5,
        DigestMode::Sm3,
    ];

    /// Position of this mode in [`DigestMode::ALL`].
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Inverse of [`DigestMode::ordinal`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnsupportedCipher`] for an ordinal outside `0..15`.
    pub fn from_ordinal(ordinal: u32) -> Result<Self, CryptoError> {
        Self::ALL
            .get(ordinal as usize)
            .copied()
            .ok_or_else(|| {
                CryptoError::UnsupportedCipher(format!("unknown digest mode ordinal {ordinal}"))
            })
    }

    /// Canonical lowercase name, e.g. `"sha512_224"`.
    pub fn name(self) -> &'static str {
        match self {
            DigestMode::Sha1 => "sha1",
            DigestMode::Sha224 => "sha224",
            DigestMode::Sha256 => "sha256",
            DigestMode::Sha384 => "sha384",
            DigestMode::Sha512 => "sha512",
            DigestMode::Sha512_224 => "sha512_224",
            DigestMode::Sha512_256 => "sha512_256",
            DigestMode::Sha3_224 => "sha3_224",
            DigestMode::Sha3_256 => "sha3_256",
            DigestMode::Sha3_384 => "sha3_384",
            DigestMode::Sha3_512 => "sha3_512",
            DigestMode::Shake128 => "shake128",
            DigestMode::Shake256 => "shake256",
            DigestMode::Md5 => "md5",
            DigestMode::Sm3 => "sm3",
        }
    }

    /// Digest length in bytes.
    ///
    /// SHAKE128 and SHAKE256 are extendable-output functions; they are
    /// fixed here at 16 and 32 bytes respectively.
    pub fn output_size(self) -> usize {
        match self {
            DigestMode::Md5 | DigestMode::Shake128 => 16,
            DigestMode::Sha1 => 20,
            DigestMode::Sha224 | DigestMode::Sha512_224 | DigestMode::Sha3_224 => 28,
            DigestMode::Sha256
            | DigestMode::Sha512_256
            | DigestMode::Sha3_256
            | DigestMode::Shake256
            | DigestMode::Sm3 => 32,
            DigestMode::Sha384 | DigestMode::Sha3_384 => 48,
            DigestMode::Sha512 | DigestMode::Sha3_512 => 64,
        }
    }

    /// Input block size in bytes, used to normalise HMAC keys.
    ///
    /// For the Keccak family this is the sponge rate.
    pub fn block_size(self) -> usize {
        match self {
            DigestMode::Sha1
            | DigestMode::Sha224
            | DigestMode::Sha256
            | DigestMode::Md5
            | DigestMode::Sm3 => 64,
            DigestMode::Sha384
            | DigestMode::Sha512
            | DigestMode::Sha512_224
            | DigestMode::Sha512_256 => 128,
            DigestMode::Sha3_224 => 144,
            DigestMode::Sha3_256 | DigestMode::Shake256 => 136,
            DigestMode::Sha3_384 => 104,
            DigestMode::Sha3_512 => 72,
            DigestMode::Shake128 => 168,
        }
    }

    /// Returns `true` for the extendable-output modes.
    pub fn is_xof(self) -> bool {
        matches!(self, DigestMode::Shake128 | DigestMode::Shake256)
    }
}

impl fmt::Display for DigestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestMode {
    type Err = CryptoError;

    /// Parses a mode name case-insensitively; `-` is accepted in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == normalised)
            .ok_or_else(|| CryptoError::UnsupportedCipher(format!("unknown digest mode: {s}")))
    }
}

impl TryFrom<String> for DigestMode {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DigestMode> for String {
    fn from(mode: DigestMode) -> Self {
        mode.name().to_owned()
    }
}

// ---------------------------------------------------------------------------
// Padding modes
// ---------------------------------------------------------------------------

/// Block padding schemes for symmetric ciphers.
///
/// Ordinals are a stable contract: `None` is 0 and `Pkcs7` is 1. Every
/// padding scheme is unambiguous on removal, so decrypting always recovers
/// the exact plaintext length. With `None`, block modes accept only
/// block-aligned input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CipherPaddingMode {
    /// No padding; input must already be a whole number of blocks.
    None,
    /// `N` bytes of value `N`.
    #[default]
    Pkcs7,
    /// A single `0x80` followed by zeros (ISO/IEC 7816-4).
    Iso7816,
    /// Zeros followed by a final length byte (ANSI X9.23).
    AnsiX923,
}

impl CipherPaddingMode {
    /// Every padding mode, indexed by ordinal.
    pub const ALL: [CipherPaddingMode; 4] = [
        CipherPaddingMode::None,
        CipherPaddingMode::Pkcs7,
        CipherPaddingMode::Iso7816,
        CipherPaddingMode::AnsiX923,
    ];

    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// # Errors
    ///
    /// Returns [`CryptoError::UnsupportedCipher`] for an unknown ordinal.
    pub fn from_ordinal(ordinal: u32) -> Result<Self, CryptoError> {
        Self::ALL
            .get(ordinal as usize)
            .copied()
            .ok_or_else(|| {
                CryptoError::UnsupportedCipher(format!("unknown padding mode ordinal {ordinal}"))
            })
    }

    pub fn name(self) -> &'static str {
        match self {
            CipherPaddingMode::None => "none",
            CipherPaddingMode::Pkcs7 => "pkcs7",
            CipherPaddingMode::Iso7816 => "iso7816",
            CipherPaddingMode::AnsiX923 => "ansix923",
        }
    }
}

impl fmt::Display for CipherPaddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CipherPaddingMode {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace(['-', '_', '.'], "");
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == normalised)
            .ok_or_else(|| CryptoError::UnsupportedCipher(format!("unknown padding mode: {s}")))
    }
}

impl TryFrom<String> for CipherPaddingMode {
    type Error = CryptoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CipherPaddingMode> for String {
    fn from(mode: CipherPaddingMode) -> Self {
        mode.name().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_stable() {
        assert_eq!(DigestMode::Sha1.ordinal(), 0);
        assert_eq!(DigestMode::Sha512_256.ordinal(), 6);
        assert_eq!(DigestMode::Shake128.ordinal(), 11);
        assert_eq!(DigestMode::Md5.ordinal(), 13);
        assert_eq!(DigestMode::Sm3.ordinal(), 14);
        for (i, mode) in DigestMode::ALL.iter().enumerate() {
            assert_eq!(mode.ordinal() as usize, i);
            assert_eq!(DigestMode::from_ordinal(i as u32).unwrap(), *mode);
        }
    }

    #[test]
    fn unknown_ordinal_is_unsupported() {
        let err = DigestMode::from_ordinal(15).unwrap_err();
        assert!(matches!(err, CryptoError::UnsupportedCipher(_)));
        assert!(CipherPaddingMode::from_ordinal(4).is_err());
    }

    #[test]
    fn padding_ordinals_keep_pkcs7_at_one() {
        assert_eq!(CipherPaddingMode::None.ordinal(), 0);
        assert_eq!(CipherPaddingMode::Pkcs7.ordinal(), 1);
        assert_eq!(CipherPaddingMode::from_ordinal(0).unwrap(), CipherPaddingMode::None);
        assert_eq!(CipherPaddingMode::from_ordinal(1).unwrap(), CipherPaddingMode::Pkcs7);
        assert_eq!(CipherPaddingMode::from_ordinal(2).unwrap(), CipherPaddingMode::Iso7816);
        assert_eq!(CipherPaddingMode::from_ordinal(3).unwrap(), CipherPaddingMode::AnsiX923);
        assert_eq!(CipherPaddingMode::default(), CipherPaddingMode::Pkcs7);
        assert_eq!("NONE".parse::<CipherPaddingMode>().unwrap(), CipherPaddingMode::None);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("SHA3-256".parse::<DigestMode>().unwrap(), DigestMode::Sha3_256);
        assert_eq!("sha512_224".parse::<DigestMode>().unwrap(), DigestMode::Sha512_224);
        assert_eq!("Sm3".parse::<DigestMode>().unwrap(), DigestMode::Sm3);
        assert!("sha999".parse::<DigestMode>().is_err());
        assert_eq!("PKCS7".parse::<CipherPaddingMode>().unwrap(), CipherPaddingMode::Pkcs7);
        assert_eq!("ansi-x923".parse::<CipherPaddingMode>().unwrap(), CipherPaddingMode::AnsiX923);
    }

    #[test]
    fn names_round_trip_through_display() {
        for mode in DigestMode::ALL {
            assert_eq!(mode.to_string().parse::<DigestMode>().unwrap(), mode);
        }
        for mode in CipherPaddingMode::ALL {
            assert_eq!(mode.to_string().parse::<CipherPaddingMode>().unwrap(), mode);
        }
    }

    #[test]
    fn serde_uses_names() {
        let json = serde_json::to_string(&DigestMode::Sha3_384).unwrap();
        assert_eq!(json, "\"sha3_384\"");
        let mode: DigestMode = serde_json::from_str("\"SHAKE256\"").unwrap();
        assert_eq!(mode, DigestMode::Shake256);
        assert!(serde_json::from_str::<CipherPaddingMode>("\"zero\"").is_err());
    }

    #[test]
    fn xof_sizes_are_fixed() {
        assert!(DigestMode::Shake128.is_xof());
        assert_eq!(DigestMode::Shake128.output_size(), 16);
        assert_eq!(DigestMode::Shake256.output_size(), 32);
        assert!(!DigestMode::Sha256.is_xof());
    }
}
