//! Registry-driven symmetric encryption.
//!
//! A cipher spec string such as `"sm4-cbc"` is resolved through [`registry`]
//! to its key, IV and block sizes. [`Encryptor`] and [`Decryptor`] are built
//! against one resolved spec, a [`CipherPaddingMode`](common::CipherPaddingMode),
//! a key and an IV.
//!
//! # Key material
//!
//! - Keys and IVs are taken verbatim as bytes and must match the sizes
//!   registered for the cipher exactly.
//! - Key schedules are zeroised when an engine is released or dropped.
//! - Key bytes never appear in `Debug` output or log fields.

pub mod engine;
mod keyed;
mod padding;
pub mod registry;

pub use engine::{CipherStream, Decryptor, Encryptor};
pub use registry::{cipher_names, cipher_specs, resolve, BlockMode, CipherAlgorithm, CipherSpec};
