//! URL-safe base64 (RFC 4648 §5) codec.
//!
//! Encoding never emits padding. Decoding accepts input with or without
//! trailing `=`, so `"AQ"`, `"AQ="` and `"AQ=="` all decode to `[0x01]`.
//! It also accepts the standard alphabet: `-` and `+` both mean 62, `_` and
//! `/` both mean 63, and the two may be mixed in one string.
//! Both directions write into a caller-provided slice and return the number
//! of bytes written; the allocating helpers are thin wrappers.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{DecodeError, DecodeSliceError, Engine};
use zeroize::Zeroizing;

use crate::{Result, WebPushError};

/// URL-safe alphabet, unpadded output.
const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_encode_padding(false),
);

/// Standard alphabet; input reaches it translated and with padding stripped.
const DECODE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// Symbols translated per step; a multiple of 4 so every step but the last
/// decodes whole quanta.
const DECODE_CHUNK: usize = 256;

/// Exact unpadded encoded length of `len` input bytes.
pub const fn encoded_len(len: usize) -> usize {
    (len / 3) * 4
        + match len % 3 {
            0 => 0,
            1 => 2,
            _ => 3,
        }
}

/// Encode `src` into `dst`, returning the number of bytes written.
pub fn encode(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    ENGINE
        .encode_slice(src, dst)
        .map_err(|_| WebPushError::OutputTooSmall)
}

/// Decode `src` into `dst`, returning the number of bytes written.
///
/// `dst` must be large enough for the conservative estimate of
/// `ceil(src.len() / 4) * 3` bytes.
pub fn decode(src: impl AsRef<[u8]>, dst: &mut [u8]) -> Result<usize> {
    let src = strip_padding(src.as_ref());
    // Wiped on return; may hold private key text
    let mut scratch = Zeroizing::new([0u8; DECODE_CHUNK]);
    let mut written = 0;

    for (index, chunk) in src.chunks(DECODE_CHUNK).enumerate() {
        let translated = &mut scratch[..chunk.len()];
        for (out, &symbol) in translated.iter_mut().zip(chunk) {
            *out = match symbol {
                b'-' => b'+',
                b'_' => b'/',
                other => other,
            };
        }

        let offset = index * DECODE_CHUNK;
        written += DECODE_ENGINE
            .decode_slice(&*translated, &mut dst[written..])
            .map_err(|e| match e {
                DecodeSliceError::DecodeError(e) => {
                    WebPushError::Base64(shift_error_offset(e, offset))
                }
                DecodeSliceError::OutputSliceTooSmall => WebPushError::OutputTooSmall,
            })?;
    }

    Ok(written)
}

/// Drop up to two trailing `=`.
fn strip_padding(src: &[u8]) -> &[u8] {
    let mut end = src.len();
    while end > 0 && src.len() - end < 2 && src[end - 1] == b'=' {
        end -= 1;
    }
    &src[..end]
}

/// Report positions relative to the whole input rather than the chunk.
fn shift_error_offset(error: DecodeError, offset: usize) -> DecodeError {
    match error {
        DecodeError::InvalidByte(at, byte) => DecodeError::InvalidByte(at + offset, byte),
        DecodeError::InvalidLength(len) => DecodeError::InvalidLength(len + offset),
        DecodeError::InvalidLastSymbol(at, byte) => {
            DecodeError::InvalidLastSymbol(at + offset, byte)
        }
        DecodeError::InvalidPadding => DecodeError::InvalidPadding,
    }
}

/// Encode to an owned string.
pub fn encode_string(src: &[u8]) -> String {
    ENGINE.encode(src)
}

/// Decode to an owned vector.
pub fn decode_vec(src: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    let src = src.as_ref();
    let mut out = vec![0u8; src.len().div_ceil(4) * 3];
    let written = decode(src, &mut out)?;
    out.truncate(written);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_len_matches_engine() {
        for len in 0..64 {
            let data = vec![0xA5u8; len];
            assert_eq!(encode_string(&data).len(), encoded_len(len), "len {len}");
        }
    }

    #[test]
    fn test_roundtrip_all_lengths() {
        for len in 0..=256usize {
            let data: Vec<u8> = (0..len).map(|i| (i * 31 + 7) as u8).collect();

            let mut encoded = vec![0u8; encoded_len(len)];
            let written = encode(&data, &mut encoded).unwrap();
            assert_eq!(written, encoded.len());

            let mut decoded = vec![0u8; len + 3];
            let n = decode(&encoded, &mut decoded).unwrap();
            assert_eq!(&decoded[..n], &data[..], "len {len}");
        }
    }

    #[test]
    fn test_encode_uses_url_alphabet_without_padding() {
        // 0xFB 0xFF encodes to "+/8=" in the standard alphabet
        assert_eq!(encode_string(&[0xFB, 0xFF]), "-_8");
        assert_eq!(encode_string(&[0x01]), "AQ");
    }

    #[test]
    fn test_decode_tolerates_missing_padding() {
        for padded in ["AQ==", "AQI=", "AQID"] {
            let expected = decode_vec(padded).unwrap();
            let trimmed = padded.trim_end_matches('=');
            for strip in 0..=(padded.len() - trimmed.len()) {
                let input = &padded[..padded.len() - strip];
                assert_eq!(decode_vec(input).unwrap(), expected, "input {input:?}");
            }
        }
    }

    #[test]
    fn test_decode_rejects_invalid_characters() {
        assert!(matches!(decode_vec("ab$d"), Err(WebPushError::Base64(_))));
        assert!(matches!(decode_vec("A"), Err(WebPushError::Base64(_))));
    }

    #[test]
    fn test_decode_accepts_standard_alphabet() {
        assert_eq!(decode_vec("+/8").unwrap(), decode_vec("-_8").unwrap());
        assert_eq!(decode_vec("+_8=").unwrap(), vec![0xFB, 0xFF]);
        assert_eq!(decode_vec("-/8").unwrap(), vec![0xFB, 0xFF]);
    }

    #[test]
    fn test_decode_standard_encoded_key() {
        // Leading bytes encode to "++++" and "////"
        let mut key = vec![0xFB, 0xEF, 0xBE, 0xFF, 0xFF, 0xFF];
        key.extend(0..59u8);
        let standard = base64::engine::general_purpose::STANDARD.encode(&key);
        assert!(standard.starts_with("++++////"));
        assert_eq!(decode_vec(&standard).unwrap(), key);
    }

    #[test]
    fn test_decode_across_chunks() {
        let data: Vec<u8> = (0..1000usize).map(|i| (i * 7 + 3) as u8).collect();
        assert_eq!(decode_vec(encode_string(&data)).unwrap(), data);
    }

    #[test]
    fn test_decode_rejects_interior_padding() {
        assert!(matches!(decode_vec("AQ==AQ=="), Err(WebPushError::Base64(_))));
    }

    #[test]
    fn test_decode_error_offset_is_absolute() {
        let mut input = "A".repeat(DECODE_CHUNK + 4);
        input.replace_range(DECODE_CHUNK + 1..DECODE_CHUNK + 2, "$");
        assert!(matches!(
            decode_vec(&input),
            Err(WebPushError::Base64(DecodeError::InvalidByte(at, b'$'))) if at == DECODE_CHUNK + 1
        ));
    }

    #[test]
    fn test_decode_reports_small_destination() {
        let mut dst = [0u8; 2];
        assert!(matches!(
            decode("AQIDBA", &mut dst),
            Err(WebPushError::OutputTooSmall)
        ));
    }

    #[test]
    fn test_encode_reports_small_destination() {
        let mut dst = [0u8; 3];
        assert!(matches!(
            encode(&[1, 2, 3, 4], &mut dst),
            Err(WebPushError::OutputTooSmall)
        ));
    }

    #[test]
    fn test_reencode_reproduces_input() {
        let s = "BLMaF9ffKBiWQLCKvTHb6LO8Nb6dcUh6TItC455vu2kElga6PQvUmaFyCdykxY2nOSSL3yKgfbmFLRTUaGv4yV8";
        let bytes = decode_vec(s).unwrap();
        assert_eq!(bytes.len(), 65);
        assert_eq!(encode_string(&bytes), s);
    }
}
