//! Stateful encryptor and decryptor bound to one cipher spec, key and IV.
//!
//! # Lifecycle
//!
//! 1. [`Encryptor::new`] / [`Decryptor::new`] resolve the cipher spec, validate key
//!    and IV lengths, and only then build the keyed cipher context.
//! 2. `transform` may be called any number of times. Every call starts from
//!    the construction IV, so each message is processed independently.
//!    `stream` does the same for a message that arrives in pieces.
//! 3. [`Encryptor::release`] / [`Decryptor::release`] drop the context, which
//!    wipes the key schedule and the IV copy. Releasing twice is a no-op.
//!    Dropping an engine releases it if that has not happened yet.
//!
//! Any transform after release fails with [`CryptoError::UseAfterRelease`].
//!
//! # Concurrency
//!
//! An engine is one logical stream of calls; `release` needs `&mut self`, so
//! it can never race a transform or an open [`CipherStream`].

use common::{CipherPaddingMode, CryptoError};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::keyed::{ChunkCipher, Direction, KeyedCipher};
use super::padding;
use super::registry::{self, CipherSpec};
use crate::codec;

// ---------------------------------------------------------------------------
// Encryptor
// ---------------------------------------------------------------------------

/// Pads then encrypts.
///
/// ```
/// use cipherkit::symmetric::{Decryptor, Encryptor};
/// use common::CipherPaddingMode;
///
/// let (key, iv) = ("0123456789ABCDEF", "0000000000000000");
/// let mut enc = Encryptor::new("sm4-cbc", CipherPaddingMode::Pkcs7, key, iv)?;
/// let mut dec = Decryptor::new("sm4-cbc", CipherPaddingMode::Pkcs7, key, iv)?;
///
/// let ciphertext = enc.to_base64("我是中国人。")?;
/// assert_eq!(dec.string_from_base64(&ciphertext)?, "我是中国人。");
///
/// enc.release();
/// dec.release();
/// # Ok::<(), common::CryptoError>(())
/// ```
#[derive(Debug)]
pub struct Encryptor {
    engine: CipherEngine,
}

impl Encryptor {
    /// Build an encryptor for `cipher_spec`.
    ///
    /// `key` and `iv` are used verbatim as bytes; text is never hex or
    /// base64 decoded.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnsupportedCipher`] for an unknown spec and
    /// [`CryptoError::InvalidKeyMaterial`] for a key or IV of the wrong length.
    pub fn new(
        cipher_spec: &str,
        padding: CipherPaddingMode,
        key: impl AsRef<[u8]>,
        iv: impl AsRef<[u8]>,
    ) -> Result<Self, CryptoError> {
        let engine = CipherEngine::new(
            Direction::Encrypt,
            cipher_spec,
            padding,
            key.as_ref(),
            iv.as_ref(),
        )?;
        Ok(Self { engine })
    }

    /// Encrypt `plaintext`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Padding`] when padding is
    /// [`CipherPaddingMode::None`] and a block mode gets unaligned input, and
    /// [`CryptoError::UseAfterRelease`] once released.
    pub fn transform(&self, plaintext: impl AsRef<[u8]>) -> Result<Vec<u8>, CryptoError> {
        self.engine.transform(plaintext.as_ref())
    }

    /// Start encrypting a message that arrives in pieces.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UseAfterRelease`] once released.
    pub fn stream(&self) -> Result<CipherStream<'_>, CryptoError> {
        self.engine.stream()
    }

    /// Encrypt `plaintext` and base64-encode the ciphertext.
    ///
    /// # Errors
    ///
    /// As [`Encryptor::transform`].
    pub fn to_base64(&self, plaintext: impl AsRef<[u8]>) -> Result<String, CryptoError> {
        self.transform(plaintext).map(codec::base64_encode)
    }

    /// # Errors
    ///
    /// Returns [`CryptoError::UseAfterRelease`] once released.
    pub fn cipher_name(&self) -> Result<&str, CryptoError> {
        self.engine.cipher_name()
    }

    pub fn padding(&self) -> CipherPaddingMode {
        self.engine.padding
    }

    pub fn is_released(&self) -> bool {
        self.engine.context.is_none()
    }

    /// Free the cipher context. Calling this again does nothing.
    pub fn release(&mut self) {
        self.engine.release();
    }
}

// ---------------------------------------------------------------------------
// Decryptor
// ---------------------------------------------------------------------------

/// Decrypts then strips and validates padding.
#[derive(Debug)]
pub struct Decryptor {
    engine: CipherEngine,
}

impl Decryptor {
    /// Build a decryptor for `cipher_spec`. See [`Encryptor::new`].
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UnsupportedCipher`] for an unknown spec and
    /// [`CryptoError::InvalidKeyMaterial`] for a key or IV of the wrong length.
    pub fn new(
        cipher_spec: &str,
        padding: CipherPaddingMode,
        key: impl AsRef<[u8]>,
        iv: impl AsRef<[u8]>,
    ) -> Result<Self, CryptoError> {
        let engine = CipherEngine::new(
            Direction::Decrypt,
            cipher_spec,
            padding,
            key.as_ref(),
            iv.as_ref(),
        )?;
        Ok(Self { engine })
    }

    /// Decrypt `ciphertext` and remove its padding.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Padding`] when the ciphertext is misaligned or
    /// its padding is malformed, and [`CryptoError::UseAfterRelease`] once
    /// released.
    pub fn transform(&self, ciphertext: impl AsRef<[u8]>) -> Result<Vec<u8>, CryptoError> {
        self.engine.transform(ciphertext.as_ref())
    }

    /// Start decrypting a message that arrives in pieces.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::UseAfterRelease`] once released.
    pub fn stream(&self) -> Result<CipherStream<'_>, CryptoError> {
        self.engine.stream()
    }

    /// Base64-decode then decrypt.
    ///
    /// # Errors
    ///
    /// As [`Decryptor::transform`], plus [`CryptoError::Format`] for invalid base64.
    pub fn from_base64(&self, ciphertext: &str) -> Result<Vec<u8>, CryptoError> {
        self.engine.context()?;
        self.transform(codec::base64_decode(ciphertext)?)
    }

    /// Base64-decode, decrypt, and interpret the plaintext as UTF-8.
    ///
    /// # Errors
    ///
    /// As [`Decryptor::from_base64`], plus [`CryptoError::Format`] when the
    /// plaintext is not UTF-8.
    pub fn string_from_base64(&self, ciphertext: &str) -> Result<String, CryptoError> {
        codec::bytes_to_string(self.from_base64(ciphertext)?)
    }

    /// # Errors
    ///
    /// Returns [`CryptoError::UseAfterRelease`] once released.
    pub fn cipher_name(&self) -> Result<&str, CryptoError> {
        self.engine.cipher_name()
    }

    pub fn padding(&self) -> CipherPaddingMode {
        self.engine.padding
    }

    pub fn is_released(&self) -> bool {
        self.engine.context.is_none()
    }

    /// Free the cipher context. Calling this again does nothing.
    pub fn release(&mut self) {
        self.engine.release();
    }
}

// ---------------------------------------------------------------------------
// Incremental transforms
// ---------------------------------------------------------------------------

/// One message encrypted or decrypted piece by piece.
///
/// Feed input of any size to [`CipherStream::update`]; each call returns the
/// output that is ready so far. [`CipherStream::finalize`] applies or strips
/// the padding and returns the rest. The concatenated output always equals a
/// single `transform` over the concatenated input.
///
/// ```
/// use cipherkit::symmetric::Encryptor;
/// use common::CipherPaddingMode;
///
/// let enc = Encryptor::new("aes-128-cbc", CipherPaddingMode::Pkcs7, [7u8; 16], [0u8; 16])?;
/// let mut stream = enc.stream()?;
/// let mut ciphertext = stream.update("Hello ")?;
/// ciphertext.extend(stream.update("world!")?);
/// ciphertext.extend(stream.finalize()?);
/// assert_eq!(ciphertext, enc.transform("Hello world!")?);
/// # Ok::<(), common::CryptoError>(())
/// ```
pub struct CipherStream<'a> {
    engine: &'a CipherEngine,
    cipher: Box<dyn ChunkCipher>,
    pending: Zeroizing<Vec<u8>>,
    consumed: usize,
}

impl CipherStream<'_> {
    /// Process the next piece of input.
    ///
    /// Block modes hold back a partial block, and a decrypting block mode
    /// also holds back the final whole block until [`CipherStream::finalize`],
    /// since it may carry padding.
    ///
    /// # Errors
    ///
    /// None for the registry's modes at present.
    pub fn update(&mut self, input: impl AsRef<[u8]>) -> Result<Vec<u8>, CryptoError> {
        let input = input.as_ref();
        self.consumed += input.len();
        let spec = self.engine.spec;
        if !spec.is_padded() {
            let mut out = input.to_vec();
            self.cipher.apply(&mut out);
            return Ok(out);
        }

        self.pending.extend_from_slice(input);
        let ready = match self.engine.direction {
            Direction::Encrypt => self.pending.len() - self.pending.len() % spec.block_size,
            Direction::Decrypt => {
                self.pending.len().saturating_sub(1) / spec.block_size * spec.block_size
            }
        };
        let mut out: Vec<u8> = self.pending.drain(..ready).collect();
        self.cipher.apply(&mut out);
        Ok(out)
    }

    /// Finish the message and return the remaining output.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Padding`] when the total input does not suit
    /// the padding mode, or when decrypted padding is malformed.
    pub fn finalize(mut self) -> Result<Vec<u8>, CryptoError> {
        let spec = self.engine.spec;
        if !spec.is_padded() {
            return Ok(Vec::new());
        }

        let mode = self.engine.padding;
        let out = match self.engine.direction {
            Direction::Encrypt => {
                let mut out = padding::pad(mode, &self.pending, spec.block_size)?;
                self.cipher.apply(&mut out);
                out
            }
            Direction::Decrypt => {
                padding::ensure_aligned(self.consumed, spec.block_size)?;
                let mut out = std::mem::take(&mut *self.pending);
                self.cipher.apply(&mut out);
                let len = padding::unpadded_len(mode, &out, spec.block_size)?;
                out.truncate(len);
                out
            }
        };
        Ok(out)
    }
}

impl std::fmt::Debug for CipherStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CipherStream")
            .field("cipher", &self.engine.spec.name)
            .field("direction", &self.engine.direction)
            .field("consumed", &self.consumed)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Shared engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CipherEngine {
    direction: Direction,
    spec: &'static CipherSpec,
    padding: CipherPaddingMode,
    context: Option<CipherContext>,
}

/// The live, keyed state. Owned by exactly one engine.
struct CipherContext {
    cipher: KeyedCipher,
    iv: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for CipherContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.write_str("CipherContext([REDACTED])")
    }
}

impl CipherEngine {
    fn new(
        direction: Direction,
        cipher_spec: &str,
        padding: CipherPaddingMode,
        key: &[u8],
        iv: &[u8],
    ) -> Result<Self, CryptoError> {
        let spec = registry::resolve(cipher_spec)?;
        check_length("key", spec, spec.key_size, key.len())?;
        check_length("IV", spec, spec.iv_size, iv.len())?;

        let context = CipherContext {
            cipher: KeyedCipher::new(spec, key)?,
            iv: Zeroizing::new(iv.to_vec()),
        };
        debug!(cipher = %spec, ?direction, %padding, "cipher engine created");

        Ok(Self {
            direction,
            spec,
            padding,
            context: Some(context),
        })
    }

    fn context(&self) -> Result<&CipherContext, CryptoError> {
        self.context.as_ref().ok_or(CryptoError::UseAfterRelease)
    }

    fn cipher_name(&self) -> Result<&str, CryptoError> {
        self.context()?;
        Ok(&self.spec.name)
    }

    fn stream(&self) -> Result<CipherStream<'_>, CryptoError> {
        let ctx = self.context()?;
        let cipher = ctx.cipher.start(self.direction, self.spec.mode, &ctx.iv)?;
        Ok(CipherStream {
            engine: self,
            cipher,
            pending: Zeroizing::new(Vec::new()),
            consumed: 0,
        })
    }

    fn transform(&self, input: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut stream = self.stream()?;
        let mut output = stream.update(input)?;
        output.extend(stream.finalize()?);
        trace!(
            cipher = %self.spec,
            direction = ?self.direction,
            input_len = input.len(),
            output_len = output.len(),
            "transformed"
        );
        Ok(output)
    }

    fn release(&mut self) {
        if let Some(ctx) = self.context.take() {
            drop(ctx);
            debug!(cipher = %self.spec, direction = ?self.direction, "cipher engine released");
        }
    }
}

impl Drop for CipherEngine {
    fn drop(&mut self) {
        self.release();
    }
}

fn check_length(
    material: &'static str,
    spec: &CipherSpec,
    expected: usize,
    actual: usize,
) -> Result<(), CryptoError> {
    if expected != actual {
        return Err(CryptoError::InvalidKeyMaterial {
            material,
            cipher: spec.name.clone(),
            expected,
            actual,
        });
    }
    Ok(())
}
