//! Hex and base64 codecs.
//!
//! Hex output is lowercase and may carry a delimiter between consecutive
//! two-digit groups (never leading or trailing). Base64 uses the standard
//! alphabet with canonical `=` padding.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::CryptoError;

/// Encode `data` as lowercase hex, optionally separating byte groups with `delimiter`.
///
/// ```
/// let mac = [0xE4, 0x54, 0xE8, 0x81, 0xFC, 0xFD];
/// assert_eq!(cipherkit::codec::hex_encode(mac, Some(':')), "e4:54:e8:81:fc:fd");
/// ```
pub fn hex_encode(data: impl AsRef<[u8]>, delimiter: Option<char>) -> String {
    let encoded = hex::encode(data.as_ref());
    let Some(delimiter) = delimiter else {
        return encoded;
    };

    let groups = encoded.len() / 2;
    let separators = groups.saturating_sub(1) * delimiter.len_utf8();
    let mut out = String::with_capacity(encoded.len() + separators);
    for (i, pair) in encoded.as_bytes().chunks(2).enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        out.extend(pair.iter().copied().map(char::from));
    }
    out
}

/// Decode a hex string, accepting either case.
///
/// With a delimiter, decoding is positional: the delimiter must appear
/// exactly once between every pair of two-digit groups, and nowhere else.
///
/// # Errors
///
/// Returns [`CryptoError::Format`] on an odd digit count, a non-hex
/// character, or a misplaced, missing or trailing delimiter.
pub fn hex_decode(text: &str, delimiter: Option<char>) -> Result<Vec<u8>, CryptoError> {
    let Some(delimiter) = delimiter else {
        return hex::decode(text)
            .map_err(|e| CryptoError::Format(format!("invalid hex string: {e}")));
    };

    let mut out = Vec::with_capacity(text.len() / 3 + 1);
    if text.is_empty() {
        return Ok(out);
    }

    let mut chars = text.chars();
    loop {
        let (Some(hi), Some(lo)) = (chars.next(), chars.next()) else {
            return Err(CryptoError::Format("odd number of hex digits".into()));
        };
        out.push((hex_digit(hi)? << 4) | hex_digit(lo)?);

        match chars.next() {
            None => return Ok(out),
            Some(c) if c == delimiter => {
                if chars.as_str().is_empty() {
                    return Err(CryptoError::Format("trailing delimiter".into()));
                }
            }
            Some(c) => {
                return Err(CryptoError::Format(format!(
                    "expected delimiter {delimiter:?} after byte {}, found {c:?}",
                    out.len() - 1
                )));
            }
        }
    }
}

fn hex_digit(c: char) -> Result<u8, CryptoError> {
    c.to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| CryptoError::Format(format!("invalid hex character {c:?}")))
}

/// Decode hex and interpret the result as UTF-8 text.
///
/// # Errors
///
/// As [`hex_decode`], plus [`CryptoError::Format`] when the bytes are not UTF-8.
pub fn hex_decode_to_string(text: &str, delimiter: Option<char>) -> Result<String, CryptoError> {
    bytes_to_string(hex_decode(text, delimiter)?)
}

/// Encode `data` as standard, padded base64.
pub fn base64_encode(data: impl AsRef<[u8]>) -> String {
    STANDARD.encode(data)
}

/// Decode standard, padded base64.
///
/// # Errors
///
/// Returns [`CryptoError::Format`] on characters outside the alphabet or
/// missing / non-canonical padding.
pub fn base64_decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(text)
        .map_err(|e| CryptoError::Format(format!("invalid base64 string: {e}")))
}

/// Decode base64 and interpret the result as UTF-8 text.
///
/// # Errors
///
/// As [`base64_decode`], plus [`CryptoError::Format`] when the bytes are not UTF-8.
pub fn base64_decode_to_string(text: &str) -> Result<String, CryptoError> {
    bytes_to_string(base64_decode(text)?)
}

pub(crate) fn bytes_to_string(bytes: Vec<u8>) -> Result<String, CryptoError> {
    String::from_utf8(bytes)
        .map_err(|e| CryptoError::Format(format!("decoded bytes are not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_sixteen() -> Vec<u8> {
        (1u8..=16).collect()
    }

    #[test]
    fn hex_without_delimiter() {
        assert_eq!(hex_encode(one_to_sixteen(), None), "0102030405060708090a0b0c0d0e0f10");
        assert_eq!(hex_decode("0102030405060708090a0b0c0d0e0f10", None).unwrap(), one_to_sixteen());
    }

    #[test]
    fn hex_with_delimiter() {
        let encoded = hex_encode(one_to_sixteen(), Some(':'));
        assert_eq!(encoded, "01:02:03:04:05:06:07:08:09:0a:0b:0c:0d:0e:0f:10");
        assert_eq!(hex_decode(&encoded, Some(':')).unwrap(), one_to_sixteen());
    }

    #[test]
    fn hex_single_byte_has_no_delimiter() {
        assert_eq!(hex_encode([0xAB], Some('-')), "ab");
        assert_eq!(hex_encode(b"", Some('-')), "");
        assert_eq!(hex_decode("", Some('-')).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn hex_decode_accepts_uppercase() {
        assert_eq!(
            hex_decode("536F6D657468696E67", None).unwrap(),
            b"Something".to_vec()
        );
        assert_eq!(hex_decode("E4:54", Some(':')).unwrap(), vec![0xE4, 0x54]);
    }

    #[test]
    fn hex_decode_rejects_odd_length() {
        assert!(matches!(hex_decode("abc", None), Err(CryptoError::Format(_))));
        assert!(matches!(hex_decode("ab:c", Some(':')), Err(CryptoError::Format(_))));
    }

    #[test]
    fn hex_decode_rejects_non_hex() {
        assert!(matches!(hex_decode("zz", None), Err(CryptoError::Format(_))));
        assert!(matches!(hex_decode("0g:01", Some(':')), Err(CryptoError::Format(_))));
    }

    #[test]
    fn hex_decode_rejects_misplaced_delimiters() {
        assert!(hex_decode(":01:02", Some(':')).is_err());
        assert!(hex_decode("01:02:", Some(':')).is_err());
        assert!(hex_decode("01::02", Some(':')).is_err());
        assert!(hex_decode("0102", Some(':')).is_err());
        assert!(hex_decode("01-02", Some(':')).is_err());
        // A delimited string is not valid undelimited input.
        assert!(hex_decode("01:02", None).is_err());
    }

    #[test]
    fn hex_delimiter_may_be_a_hex_digit() {
        let encoded = hex_encode([0x12, 0x34], Some('f'));
        assert_eq!(encoded, "12f34");
        assert_eq!(hex_decode(&encoded, Some('f')).unwrap(), vec![0x12, 0x34]);
    }

    #[test]
    fn hex_string_helpers() {
        let hex = "536f6d657468696e67206c696b652074686174212121";
        assert_eq!(hex_decode_to_string(hex, None).unwrap(), "Something like that!!!");
        assert!(matches!(hex_decode_to_string("ff", None), Err(CryptoError::Format(_))));
    }

    #[test]
    fn base64_known_answers() {
        assert_eq!(base64_encode(one_to_sixteen()), "AQIDBAUGBwgJCgsMDQ4PEA==");
        assert_eq!(base64_encode([0u8, 1, 2, 3]), "AAECAw==");
        assert_eq!(base64_encode("Something like that!!!"), "U29tZXRoaW5nIGxpa2UgdGhhdCEhIQ==");
        assert_eq!(base64_encode(b""), "");
        assert_eq!(base64_decode("AQIDBAUGBwgJCgsMDQ4PEA==").unwrap(), one_to_sixteen());
        assert_eq!(
            base64_decode_to_string("U29tZXRoaW5nIGxpa2UgdGhhdCEhIQ==").unwrap(),
            "Something like that!!!"
        );
    }

    #[test]
    fn base64_rejects_bad_alphabet() {
        assert!(matches!(base64_decode("AA!B"), Err(CryptoError::Format(_))));
        assert!(base64_decode("AA-_").is_err());
    }

    #[test]
    fn base64_rejects_malformed_padding() {
        assert!(base64_decode("AAECAw").is_err());
        assert!(base64_decode("AAECAw=").is_err());
        assert!(base64_decode("AAEC=Aw=").is_err());
        assert!(base64_decode("AAECAw===").is_err());
    }
}
