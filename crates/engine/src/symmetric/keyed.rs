//! Key schedules and mode state behind one object-safe trait.
//!
//! A [`KeyedCipher`] is built once per engine. Every message then gets a
//! fresh [`ChunkCipher`] from [`KeyedCipher::start`], positioned at the
//! construction IV and carrying the chaining state between chunks.

use aes::{Aes128, Aes192, Aes256};
use cipher::consts::U16;
use cipher::generic_array::GenericArray;
use cipher::{
    BlockCipher, BlockDecrypt, BlockDecryptMut, BlockEncrypt, BlockEncryptMut, BlockSizeUser,
    InnerIvInit, KeyInit, StreamCipher, StreamCipherCoreWrapper,
};
use cipher::crypto_common::InnerInit;
use common::CryptoError;
use sm4::Sm4;

use super::registry::{BlockMode, CipherAlgorithm, CipherSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Encrypt,
    Decrypt,
}

/// One direction of one mode, part way through a message.
pub(crate) trait ChunkCipher: Send {
    /// Process `buf` in place, continuing where the previous call stopped.
    /// Block modes are only ever handed whole blocks.
    fn apply(&mut self, buf: &mut [u8]);
}

struct BlockEncrypting<M>(M);

impl<M: BlockEncryptMut + Send> ChunkCipher for BlockEncrypting<M> {
    fn apply(&mut self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(M::block_size()) {
            self.0.encrypt_block_mut(GenericArray::from_mut_slice(block));
        }
    }
}

struct BlockDecrypting<M>(M);

impl<M: BlockDecryptMut + Send> ChunkCipher for BlockDecrypting<M> {
    fn apply(&mut self, buf: &mut [u8]) {
        for block in buf.chunks_exact_mut(M::block_size()) {
            self.0.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
    }
}

struct Keystream<S>(S);

impl<S: StreamCipher + Send> ChunkCipher for Keystream<S> {
    fn apply(&mut self, buf: &mut [u8]) {
        self.0.apply_keystream(buf);
    }
}

struct CfbEncrypting<C: BlockEncryptMut + BlockCipher>(cfb_mode::BufEncryptor<C>);

impl<C: BlockEncryptMut + BlockCipher + Send> ChunkCipher for CfbEncrypting<C> {
    fn apply(&mut self, buf: &mut [u8]) {
        self.0.encrypt(buf);
    }
}

struct CfbDecrypting<C: BlockEncryptMut + BlockCipher>(cfb_mode::BufDecryptor<C>);

impl<C: BlockEncryptMut + BlockCipher + Send> ChunkCipher for CfbDecrypting<C> {
    fn apply(&mut self, buf: &mut [u8]) {
        self.0.decrypt(buf);
    }
}

/// Key schedule for one of the registry algorithms. Round keys are wiped on
/// drop (`zeroize` feature of `aes` and `sm4`).
pub(crate) enum KeyedCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
    Sm4(Sm4),
}

impl KeyedCipher {
    pub(crate) fn new(spec: &CipherSpec, key: &[u8]) -> Result<Self, CryptoError> {
        let invalid = |_| CryptoError::InvalidKeyMaterial {
            material: "key",
            cipher: spec.name.clone(),
            expected: spec.key_size,
            actual: key.len(),
        };
        Ok(match spec.algorithm {
            CipherAlgorithm::Aes128 => {
                KeyedCipher::Aes128(Aes128::new_from_slice(key).map_err(invalid)?)
            }
            CipherAlgorithm::Aes192 => {
                KeyedCipher::Aes192(Aes192::new_from_slice(key).map_err(invalid)?)
            }
            CipherAlgorithm::Aes256 => {
                KeyedCipher::Aes256(Aes256::new_from_slice(key).map_err(invalid)?)
            }
            CipherAlgorithm::Sm4 => KeyedCipher::Sm4(Sm4::new_from_slice(key).map_err(invalid)?),
        })
    }

    /// Begin a message in `mode`, chaining from `iv`.
    pub(crate) fn start(
        &self,
        direction: Direction,
        mode: BlockMode,
        iv: &[u8],
    ) -> Result<Box<dyn ChunkCipher>, CryptoError> {
        match self {
            KeyedCipher::Aes128(c) => start(c.clone(), direction, mode, iv),
            KeyedCipher::Aes192(c) => start(c.clone(), direction, mode, iv),
            KeyedCipher::Aes256(c) => start(c.clone(), direction, mode, iv),
            KeyedCipher::Sm4(c) => start(c.clone(), direction, mode, iv),
        }
    }
}

fn start<C>(
    cipher: C,
    direction: Direction,
    mode: BlockMode,
    iv: &[u8],
) -> Result<Box<dyn ChunkCipher>, CryptoError>
where
    C: BlockCipher
        + BlockEncrypt
        + BlockDecrypt
        + BlockSizeUser<BlockSize = U16>
        + Clone
        + Send
        + 'static,
{
    let bad_iv = |_: cipher::InvalidLength| CryptoError::InvalidKeyMaterial {
        material: "IV",
        cipher: mode.name().into(),
        expected: 16,
        actual: iv.len(),
    };

    let chunk: Box<dyn ChunkCipher> = match (mode, direction) {
        (BlockMode::Ecb, Direction::Encrypt) => {
            Box::new(BlockEncrypting(ecb::Encryptor::<C>::inner_init(cipher)))
        }
        (BlockMode::Ecb, Direction::Decrypt) => {
            Box::new(BlockDecrypting(ecb::Decryptor::<C>::inner_init(cipher)))
        }
        (BlockMode::Cbc, Direction::Encrypt) => Box::new(BlockEncrypting(
            cbc::Encryptor::<C>::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?,
        )),
        (BlockMode::Cbc, Direction::Decrypt) => Box::new(BlockDecrypting(
            cbc::Decryptor::<C>::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?,
        )),
        (BlockMode::Ctr, _) => Box::new(Keystream(
            StreamCipherCoreWrapper::from_core(
                ctr::CtrCore::<C, ctr::flavors::Ctr128BE>::inner_iv_slice_init(cipher, iv)
                    .map_err(bad_iv)?,
            ) as ctr::Ctr128BE<C>,
        )),
        (BlockMode::Ofb, _) => Box::new(Keystream(
            StreamCipherCoreWrapper::from_core(
                ofb::OfbCore::<C>::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?,
            ) as ofb::Ofb<C>,
        )),
        (BlockMode::Cfb, Direction::Encrypt) => Box::new(CfbEncrypting(
            cfb_mode::BufEncryptor::<C>::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?,
        )),
        (BlockMode::Cfb, Direction::Decrypt) => Box::new(CfbDecrypting(
            cfb_mode::BufDecryptor::<C>::inner_iv_slice_init(cipher, iv).map_err(bad_iv)?,
        )),
    };
    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symmetric::registry;

    fn keyed(name: &str) -> (KeyedCipher, &'static CipherSpec) {
        let spec = registry::resolve(name).unwrap();
        (KeyedCipher::new(spec, &vec![7u8; spec.key_size]).unwrap(), spec)
    }

    #[test]
    fn cfb_keeps_its_position_across_partial_chunks() {
        let (cipher, spec) = keyed("sm4-cfb");
        let iv = [1u8; 16];
        let message = b"twenty-three byte input".to_vec();

        let mut whole = message.clone();
        let mut stream = cipher.start(Direction::Encrypt, spec.mode, &iv).unwrap();
        stream.apply(&mut whole);

        let mut chunked = message.clone();
        let mut stream = cipher.start(Direction::Encrypt, spec.mode, &iv).unwrap();
        let (head, tail) = chunked.split_at_mut(5);
        stream.apply(head);
        stream.apply(tail);
        assert_eq!(chunked, whole);

        let mut back = whole;
        let mut stream = cipher.start(Direction::Decrypt, spec.mode, &iv).unwrap();
        let (head, tail) = back.split_at_mut(17);
        stream.apply(head);
        stream.apply(tail);
        assert_eq!(back, message);
    }

    #[test]
    fn cbc_chains_between_calls() {
        let (cipher, spec) = keyed("aes-128-cbc");
        let iv = [0u8; 16];
        let mut whole = [0x42u8; 32];
        let mut stream = cipher.start(Direction::Encrypt, spec.mode, &iv).unwrap();
        stream.apply(&mut whole);

        let mut split = [0x42u8; 32];
        let mut stream = cipher.start(Direction::Encrypt, spec.mode, &iv).unwrap();
        stream.apply(&mut split[..16]);
        stream.apply(&mut split[16..]);
        assert_eq!(split, whole);
        assert_ne!(whole[..16], whole[16..], "identical blocks must chain");
    }

    #[test]
    fn ecb_ignores_the_iv() {
        let (cipher, spec) = keyed("sm4-ecb");
        let mut a = [9u8; 16];
        let mut b = [9u8; 16];
        let mut without_iv = cipher.start(Direction::Encrypt, spec.mode, &[]).unwrap();
        let mut with_iv = cipher.start(Direction::Encrypt, spec.mode, &[3u8; 16]).unwrap();
        without_iv.apply(&mut a);
        with_iv.apply(&mut b);
        assert_eq!(a, b);
    }
}
