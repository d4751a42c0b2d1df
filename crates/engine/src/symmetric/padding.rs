//! Block padding applied before encryption and validated after decryption.
//!
//! Each padding [`CipherPaddingMode`] is backed by a `block-padding` scheme.
//! Padding always adds between 1 and `block_size` bytes, so an aligned
//! plaintext gains one full block. [`CipherPaddingMode::None`] adds nothing
//! and requires aligned input in both directions.

use cipher::block_padding::{AnsiX923, Iso7816, Pkcs7, RawPadding};
use common::{CipherPaddingMode, CryptoError};

/// Return `data` followed by padding up to the next multiple of `block_size`.
///
/// # Errors
///
/// Returns [`CryptoError::Padding`] for unaligned input under
/// [`CipherPaddingMode::None`].
pub(crate) fn pad(
    mode: CipherPaddingMode,
    data: &[u8],
    block_size: usize,
) -> Result<Vec<u8>, CryptoError> {
    Ok(match mode {
        CipherPaddingMode::None => {
            ensure_aligned(data.len(), block_size)?;
            data.to_vec()
        }
        CipherPaddingMode::Pkcs7 => pad_with::<Pkcs7>(data, block_size),
        CipherPaddingMode::Iso7816 => pad_with::<Iso7816>(data, block_size),
        CipherPaddingMode::AnsiX923 => pad_with::<AnsiX923>(data, block_size),
    })
}

/// Validate the padding on `data` and return the unpadded length.
///
/// # Errors
///
/// Returns [`CryptoError::Padding`] if `data` is not block aligned, or if a
/// padding mode finds it empty or its final block malformed.
pub(crate) fn unpadded_len(
    mode: CipherPaddingMode,
    data: &[u8],
    block_size: usize,
) -> Result<usize, CryptoError> {
    ensure_aligned(data.len(), block_size)?;
    if mode == CipherPaddingMode::None {
        return Ok(data.len());
    }
    if data.is_empty() {
        return Err(CryptoError::Padding("padded input must contain at least one block".into()));
    }

    let last_block = &data[data.len() - block_size..];
    let kept = match mode {
        CipherPaddingMode::None => Ok(last_block),
        CipherPaddingMode::Pkcs7 => Pkcs7::raw_unpad(last_block),
        CipherPaddingMode::Iso7816 => Iso7816::raw_unpad(last_block),
        CipherPaddingMode::AnsiX923 => AnsiX923::raw_unpad(last_block),
    }
    .map_err(|_| CryptoError::Padding(format!("malformed {mode} padding")))?
    .len();

    Ok(data.len() - block_size + kept)
}

/// Reject input whose length is not a multiple of `block_size`.
pub(crate) fn ensure_aligned(len: usize, block_size: usize) -> Result<(), CryptoError> {
    if len % block_size != 0 {
        return Err(CryptoError::Padding(format!(
            "input length {len} is not a multiple of the {block_size}-byte block size"
        )));
    }
    Ok(())
}

fn pad_with<P: RawPadding>(data: &[u8], block_size: usize) -> Vec<u8> {
    let full = data.len() - data.len() % block_size;
    let mut out = Vec::with_capacity(full + block_size);
    out.extend_from_slice(data);
    out.resize(full + block_size, 0);
    P::raw_pad(&mut out[full..], data.len() - full);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkcs7_pads_partial_block() {
        let padded = pad(CipherPaddingMode::Pkcs7, b"Hello world!", 16).unwrap();
        assert_eq!(padded.len(), 16);
        assert_eq!(&padded[12..], &[4, 4, 4, 4]);
        assert_eq!(unpadded_len(CipherPaddingMode::Pkcs7, &padded, 16).unwrap(), 12);
    }

    #[test]
    fn aligned_input_gains_full_block() {
        for mode in CipherPaddingMode::ALL {
            if mode == CipherPaddingMode::None {
                continue;
            }
            let padded = pad(mode, &[0xAA; 16], 16).unwrap();
            assert_eq!(padded.len(), 32, "{mode}");
            assert_eq!(unpadded_len(mode, &padded, 16).unwrap(), 16, "{mode}");
        }
        let empty = pad(CipherPaddingMode::Pkcs7, b"", 16).unwrap();
        assert_eq!(empty, vec![16u8; 16]);
    }

    #[test]
    fn none_passes_aligned_input_through() {
        let data = [0x11u8; 32];
        assert_eq!(pad(CipherPaddingMode::None, &data, 16).unwrap(), data);
        assert_eq!(unpadded_len(CipherPaddingMode::None, &data, 16).unwrap(), 32);
        assert_eq!(unpadded_len(CipherPaddingMode::None, &[], 16).unwrap(), 0);
        assert!(pad(CipherPaddingMode::None, b"", 16).unwrap().is_empty());

        assert!(matches!(
            pad(CipherPaddingMode::None, b"Hello world!", 16),
            Err(CryptoError::Padding(_))
        ));
        assert!(unpadded_len(CipherPaddingMode::None, &[0u8; 12], 16).is_err());
    }

    #[test]
    fn iso7816_and_ansix923_layouts() {
        let iso = pad(CipherPaddingMode::Iso7816, b"abc", 8).unwrap();
        assert_eq!(iso, b"abc\x80\0\0\0\0");
        let ansi = pad(CipherPaddingMode::AnsiX923, b"abc", 8).unwrap();
        assert_eq!(ansi, b"abc\0\0\0\0\x05");
        assert_eq!(unpadded_len(CipherPaddingMode::Iso7816, &iso, 8).unwrap(), 3);
        assert_eq!(unpadded_len(CipherPaddingMode::AnsiX923, &ansi, 8).unwrap(), 3);
    }

    #[test]
    fn corrupt_padding_is_rejected() {
        let mut padded = pad(CipherPaddingMode::Pkcs7, b"Hello world!", 16).unwrap();
        padded[13] = 9;
        assert!(matches!(
            unpadded_len(CipherPaddingMode::Pkcs7, &padded, 16),
            Err(CryptoError::Padding(_))
        ));

        let zero_tail = [0u8; 16];
        assert!(unpadded_len(CipherPaddingMode::Pkcs7, &zero_tail, 16).is_err());
        assert!(unpadded_len(CipherPaddingMode::Iso7816, &zero_tail, 16).is_err());

        let mut too_long = [0u8; 16];
        too_long[15] = 17;
        assert!(unpadded_len(CipherPaddingMode::Pkcs7, &too_long, 16).is_err());
        assert!(unpadded_len(CipherPaddingMode::AnsiX923, &too_long, 16).is_err());
    }

    #[test]
    fn misaligned_or_empty_input_is_rejected() {
        assert!(matches!(
            unpadded_len(CipherPaddingMode::Pkcs7, &[1u8; 15], 16),
            Err(CryptoError::Padding(_))
        ));
        assert!(unpadded_len(CipherPaddingMode::Pkcs7, &[], 16).is_err());
        assert!(ensure_aligned(32, 16).is_ok());
    }
}
