//! HMAC composed on top of [`DigestContext`].
//!
//! `HMAC(K, M) = H((K' ^ opad) || H((K' ^ ipad) || M))`, where `K'` is the
//! key hashed when longer than the mode's block size and then zero-padded to
//! exactly one block. Every hash call goes through [`DigestContext`], so the
//! construction covers all fifteen modes, SHAKE included.

use common::DigestMode;
use zeroize::Zeroizing;

use super::{digest_bytes, DigestContext};

const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5c;

/// Compute an HMAC and return the raw tag.
pub fn hmac_bytes(mode: DigestMode, key: impl AsRef<[u8]>, data: impl AsRef<[u8]>) -> Vec<u8> {
    let key = key.as_ref();
    let block_size = mode.block_size();

    let mut normalised = Zeroizing::new(vec![0u8; block_size]);
    if key.len() > block_size {
        let hashed = Zeroizing::new(digest_bytes(mode, key));
        normalised[..hashed.len()].copy_from_slice(&hashed);
    } else {
        normalised[..key.len()].copy_from_slice(key);
    }

    let xor_pad = |pad: u8| -> Zeroizing<Vec<u8>> {
        Zeroizing::new(normalised.iter().map(|k| k ^ pad).collect())
    };

    let mut inner = DigestContext::new(mode);
    inner.update(xor_pad(IPAD).as_slice()).update(data);
    let inner = inner.finalize();

    let mut outer = DigestContext::new(mode);
    outer.update(xor_pad(OPAD).as_slice()).update(&inner);
    outer.finalize()
}

/// Compute an HMAC and return it as lowercase hex.
///
/// The key and message are taken as raw bytes; text arguments are used
/// verbatim as their UTF-8 encoding.
pub fn hmac_hash(mode: DigestMode, key: impl AsRef<[u8]>, data: impl AsRef<[u8]>) -> String {
    hex::encode(hmac_bytes(mode, key, data))
}
