//! Static registry of supported cipher specs, keyed by `<algorithm>-<mode>`.
//!
//! The map is built on first use and never mutated afterwards, so lookups
//! are lock-free and safe from any thread.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use common::CryptoError;
use serde::Serialize;

/// Block cipher algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CipherAlgorithm {
    #[serde(rename = "aes-128")]
    Aes128,
    #[serde(rename = "aes-192")]
    Aes192,
    #[serde(rename = "aes-256")]
    Aes256,
    #[serde(rename = "sm4")]
    Sm4,
}

impl CipherAlgorithm {
    pub const ALL: [CipherAlgorithm; 4] = [
        CipherAlgorithm::Aes128,
        CipherAlgorithm::Aes192,
        CipherAlgorithm::Aes256,
        CipherAlgorithm::Sm4,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CipherAlgorithm::Aes128 => "aes-128",
            CipherAlgorithm::Aes192 => "aes-192",
            CipherAlgorithm::Aes256 => "aes-256",
            CipherAlgorithm::Sm4 => "sm4",
        }
    }

    /// Key length in bytes.
    pub fn key_size(self) -> usize {
        match self {
            CipherAlgorithm::Aes128 | CipherAlgorithm::Sm4 => 16,
            CipherAlgorithm::Aes192 => 24,
            CipherAlgorithm::Aes256 => 32,
        }
    }

    /// Width of one cipher block in bytes. Every registered algorithm is a
    /// 128-bit block cipher.
    pub const CIPHER_BLOCK_SIZE: usize = 16;
}

/// Mode of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockMode {
    Ecb,
    Cbc,
    Ctr,
    /// Full-block (128-bit) cipher feedback.
    Cfb,
    Ofb,
}

impl BlockMode {
    pub const ALL: [BlockMode; 5] = [
        BlockMode::Ecb,
        BlockMode::Cbc,
        BlockMode::Ctr,
        BlockMode::Cfb,
        BlockMode::Ofb,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BlockMode::Ecb => "ecb",
            BlockMode::Cbc => "cbc",
            BlockMode::Ctr => "ctr",
            BlockMode::Cfb => "cfb",
            BlockMode::Ofb => "ofb",
        }
    }

    /// Stream-like modes accept any input length and are never padded.
    pub fn is_stream(self) -> bool {
        matches!(self, BlockMode::Ctr | BlockMode::Cfb | BlockMode::Ofb)
    }
}

/// A resolved cipher spec: everything needed to validate key material and
/// drive the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CipherSpec {
    /// Canonical lowercase name, e.g. `"sm4-cbc"`.
    pub name: String,
    pub algorithm: CipherAlgorithm,
    pub mode: BlockMode,
    /// Padding granularity in bytes: the cipher block for ECB/CBC, 1 for
    /// stream-like modes.
    pub block_size: usize,
    pub key_size: usize,
    /// Zero for ECB.
    pub iv_size: usize,
}

impl CipherSpec {
    fn new(algorithm: CipherAlgorithm, mode: BlockMode) -> Self {
        let block = CipherAlgorithm::CIPHER_BLOCK_SIZE;
        Self {
            name: format!("{}-{}", algorithm.name(), mode.name()),
            algorithm,
            mode,
            block_size: if mode.is_stream() { 1 } else { block },
            key_size: algorithm.key_size(),
            iv_size: if mode == BlockMode::Ecb { 0 } else { block },
        }
    }

    /// Returns `true` when plaintext must be padded to `block_size`.
    pub fn is_padded(&self) -> bool {
        self.block_size > 1
    }
}

impl fmt::Display for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

static REGISTRY: LazyLock<HashMap<String, CipherSpec>> = LazyLock::new(|| {
    CipherAlgorithm::ALL
        .into_iter()
        .flat_map(|algorithm| {
            BlockMode::ALL
                .into_iter()
                .map(move |mode| CipherSpec::new(algorithm, mode))
        })
        .map(|spec| (spec.name.clone(), spec))
        .collect()
});

/// Resolve a cipher spec string, ignoring ASCII case.
///
/// # Errors
///
/// Returns [`CryptoError::UnsupportedCipher`] if no spec has that name.
pub fn resolve(spec: &str) -> Result<&'static CipherSpec, CryptoError> {
    if spec.is_empty() {
        return Err(CryptoError::UnsupportedCipher("cipher spec must be non-empty".into()));
    }
    REGISTRY
        .get(&spec.to_ascii_lowercase())
        .ok_or_else(|| CryptoError::UnsupportedCipher(spec.to_owned()))
}

/// Every supported spec name, sorted.
pub fn cipher_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

/// Every supported spec, sorted by name.
pub fn cipher_specs() -> Vec<&'static CipherSpec> {
    let mut specs: Vec<&'static CipherSpec> = REGISTRY.values().collect();
    specs.sort_unstable_by(|a, b| a.name.cmp(&b.name));
    specs
}
