//! Byte codecs, digests, HMAC and a symmetric cipher engine.
//!
//! - [`codec`]: hex (with an optional delimiter) and base64.
//! - [`digest`]: fifteen digest modes behind one [`DigestMode`] switch, plus HMAC.
//! - [`symmetric`]: the cipher spec registry, padding, and the
//!   [`Encryptor`]/[`Decryptor`] engines.
//!
//! Every fallible operation returns [`CryptoError`]; use
//! [`CryptoError::kind`] to branch on the failure class.

pub mod codec;
pub mod digest;
pub mod symmetric;

pub use common::{CipherPaddingMode, CryptoError, DigestMode, ErrorKind};
pub use self::digest::{hmac_hash, make_digest, DigestContext};
pub use symmetric::{CipherStream, Decryptor, Encryptor};
