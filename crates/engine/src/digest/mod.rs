//! One-shot and incremental hashing over every [`DigestMode`].
//!
//! All functions here are pure and hold no shared state; they are safe to
//! call from any number of threads.
//!
//! # Output length
//!
//! SHAKE128 and SHAKE256 are read to 16 and 32 bytes respectively (see
//! [`DigestMode::output_size`]). Every other mode produces its native
//! digest length.

pub mod hmac;

pub use self::hmac::{hmac_bytes, hmac_hash};

use ::digest::{DynDigest, ExtendableOutput, Update, XofReader};
use common::DigestMode;
use sha3::{Shake128, Shake256};

/// Incremental digest state.
///
/// Feeding the same bytes through any sequence of [`DigestContext::update`]
/// calls yields the same digest as [`make_digest`] over their concatenation.
pub struct DigestContext {
    mode: DigestMode,
    state: State,
}

enum State {
    Fixed(Box<dyn DynDigest + Send + Sync>),
    Shake128(Shake128),
    Shake256(Shake256),
}

impl DigestContext {
    /// Start a new digest computation.
    pub fn new(mode: DigestMode) -> Self {
        let state = match mode {
            DigestMode::Sha1 => State::Fixed(Box::new(sha1::Sha1::default())),
            DigestMode::Sha224 => State::Fixed(Box::new(sha2::Sha224::default())),
            DigestMode::Sha256 => State::Fixed(Box::new(sha2::Sha256::default())),
            DigestMode::Sha384 => State::Fixed(Box::new(sha2::Sha384::default())),
            DigestMode::Sha512 => State::Fixed(Box::new(sha2::Sha512::default())),
            DigestMode::Sha512_224 => State::Fixed(Box::new(sha2::Sha512_224::default())),
            DigestMode::Sha512_256 => State::Fixed(Box::new(sha2::Sha512_256::default())),
            DigestMode::Sha3_224 => State::Fixed(Box::new(sha3::Sha3_224::default())),
            DigestMode::Sha3_256 => State::Fixed(Box::new(sha3::Sha3_256::default())),
            DigestMode::Sha3_384 => State::Fixed(Box::new(sha3::Sha3_384::default())),
            DigestMode::Sha3_512 => State::Fixed(Box::new(sha3::Sha3_512::default())),
            DigestMode::Shake128 => State::Shake128(Shake128::default()),
            DigestMode::Shake256 => State::Shake256(Shake256::default()),
            DigestMode::Md5 => State::Fixed(Box::new(md5::Md5::default())),
            DigestMode::Sm3 => State::Fixed(Box::new(sm3::Sm3::default())),
        };
        Self { mode, state }
    }

    pub fn mode(&self) -> DigestMode {
        self.mode
    }

    /// Absorb more input.
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> &mut Self {
        let data = data.as_ref();
        match &mut self.state {
            State::Fixed(hasher) => DynDigest::update(&mut **hasher, data),
            State::Shake128(hasher) => Update::update(hasher, data),
            State::Shake256(hasher) => Update::update(hasher, data),
        }
        self
    }

    /// Consume the context and return the raw digest.
    pub fn finalize(self) -> Vec<u8> {
        match self.state {
            State::Fixed(hasher) => hasher.finalize().into_vec(),
            State::Shake128(hasher) => read_xof(hasher, self.mode.output_size()),
            State::Shake256(hasher) => read_xof(hasher, self.mode.output_size()),
        }
    }

    /// Consume the context and return the digest as lowercase hex.
    pub fn finalize_hex(self) -> String {
        hex::encode(self.finalize())
    }
}

impl std::fmt::Debug for DigestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DigestContext")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn read_xof<X: ExtendableOutput>(hasher: X, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    hasher.finalize_xof().read(&mut out);
    out
}

/// Hash `data` and return the raw digest bytes.
pub fn digest_bytes(mode: DigestMode, data: impl AsRef<[u8]>) -> Vec<u8> {
    let mut ctx = DigestContext::new(mode);
    ctx.update(data);
    ctx.finalize()
}

/// Hash `data` and return the digest as lowercase hex.
///
/// Text and bytes with identical content hash identically:
///
/// ```
/// use cipherkit::digest::make_digest;
/// use common::DigestMode;
///
/// assert_eq!(make_digest(DigestMode::Sm3, "Hello"), make_digest(DigestMode::Sm3, b"Hello"));
/// ```
pub fn make_digest(mode: DigestMode, data: impl AsRef<[u8]>) -> String {
    hex::encode(digest_bytes(mode, data))
}
