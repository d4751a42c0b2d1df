//! Mode enumerations and the error type shared across `cipherkit` crates.

pub mod error;
pub mod modes;

pub use error::{CryptoError, ErrorKind};
pub use modes::{CipherPaddingMode, DigestMode};
