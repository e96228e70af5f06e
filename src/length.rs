//! Xapian's native length prefix.
//!
//! Lengths below 255 take a single byte holding the value itself. Anything larger is written as
//! an `0xFF` escape byte followed by `length - 255` in little-endian groups of 7 bits. Every group
//! but the last has its high bit clear, and the last group has it set, so the encoding is
//! self-delimiting:
//!
//! ```text
//! 42   => 2a
//! 254  => fe
//! 255  => ff 80
//! 300  => ff ad
//! 1000 => ff 69 85
//! ```

use crate::error::{Error, Result};

/// Lengths below this fit in a single byte. It doubles as the escape byte.
pub const LENGTH_THRESHOLD: u8 = 0xFF;

const GROUP_BITS: u32 = 7;
const GROUP_MASK: u8 = 0x7F;
const TERMINAL: u8 = 0x80;

/// Encode a length into a new byte vector. For extending an existing vector, see
/// [`encode_length_into`].
pub fn encode_length(length: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_length_size(length));
    encode_length_into(&mut buf, length);
    buf
}

/// Append the encoded form of `length` onto a byte vector.
pub fn encode_length_into(buf: &mut Vec<u8>, length: u64) {
    if length < LENGTH_THRESHOLD as u64 {
        buf.push(length as u8);
        return;
    }
    buf.push(LENGTH_THRESHOLD);
    let mut rest = length - LENGTH_THRESHOLD as u64;
    loop {
        let group = (rest as u8) & GROUP_MASK;
        rest >>= GROUP_BITS;
        if rest == 0 {
            buf.push(group | TERMINAL);
            break;
        }
        buf.push(group);
    }
}

/// Number of bytes [`encode_length`] will produce for `length`.
pub fn encoded_length_size(length: u64) -> usize {
    if length < LENGTH_THRESHOLD as u64 {
        return 1;
    }
    let rest = length - LENGTH_THRESHOLD as u64;
    let bits = (64 - rest.leading_zeros()).max(1);
    1 + ((bits + GROUP_BITS - 1) / GROUP_BITS) as usize
}

/// Decode a length from the front of `buf`, returning it along with the unread remainder.
///
/// # Errors
///
/// Fails if `buf` is empty, if it ends before the terminal group of a multi-byte length, or if
/// the encoded value does not fit in a `u64`.
pub fn decode_length(buf: &[u8]) -> Result<(u64, &[u8])> {
    let (&first, mut rest) = buf.split_first().ok_or(Error::NoData)?;
    if first != LENGTH_THRESHOLD {
        return Ok((first as u64, rest));
    }

    let mut length = 0u64;
    let mut shift = 0u32;
    loop {
        let (&byte, tail) = rest.split_first().ok_or(Error::Unterminated)?;
        rest = tail;
        let group = (byte & GROUP_MASK) as u64;
        if shift >= u64::BITS || (group << shift) >> shift != group {
            return Err(Error::Overflow);
        }
        length |= group << shift;
        shift += GROUP_BITS;
        if byte & TERMINAL != 0 {
            break;
        }
    }

    let length = length
        .checked_add(LENGTH_THRESHOLD as u64)
        .ok_or(Error::Overflow)?;
    Ok((length, rest))
}

/// Like [`decode_length`], but also fails if the decoded length is greater than the number of
/// bytes left after it. Use this when the length prefixes a payload in the same buffer.
pub fn decode_length_checked(buf: &[u8]) -> Result<(u64, &[u8])> {
    let (length, rest) = decode_length(buf)?;
    if length > rest.len() as u64 {
        return Err(Error::LengthTooShort {
            step: "length prefix",
            actual: rest.len(),
            expected: length,
        });
    }
    Ok((length, rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn edge_cases() -> Vec<u64> {
        let mut cases = vec![0, 1, 42, 127, 128, 253, 254, 255, 256, 300, 382, 383, 500, 1000];
        for bits in [14u32, 21, 28, 35, 42, 49, 56, 63] {
            let base = (1u64 << bits) + LENGTH_THRESHOLD as u64;
            cases.extend_from_slice(&[base - 1, base, base + 1]);
        }
        cases.extend_from_slice(&[u32::MAX as u64, u64::MAX - 255, u64::MAX - 1, u64::MAX]);
        cases
    }

    #[test]
    fn known_encodings() {
        let test_cases: Vec<(u64, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (42, vec![0x2a]),
            (254, vec![0xfe]),
            (255, vec![0xff, 0x80]),
            (256, vec![0xff, 0x81]),
            (300, vec![0xff, 0xad]),
            (382, vec![0xff, 0xff]),
            (383, vec![0xff, 0x00, 0x81]),
            (1000, vec![0xff, 0x69, 0x85]),
        ];
        for (index, (length, expected)) in test_cases.iter().enumerate() {
            assert_eq!(&encode_length(*length), expected, "Failed test #{}", index);
        }
    }

    #[test]
    fn roundtrip() {
        for case in edge_cases() {
            let enc = encode_length(case);
            assert_eq!(enc.len(), encoded_length_size(case), "size of {}", case);
            let (length, rest) = decode_length(&enc).unwrap();
            assert_eq!(length, case);
            assert!(rest.is_empty());
        }
    }

    #[test]
    fn keeps_remainder() {
        let mut enc = encode_length(300);
        enc.extend_from_slice(b"tail");
        let (length, rest) = decode_length(&enc).unwrap();
        assert_eq!(length, 300);
        assert_eq!(rest, b"tail");

        let (length, rest) = decode_length(b"*extra").unwrap();
        assert_eq!(length, 42);
        assert_eq!(rest, b"extra");
    }

    #[test]
    fn no_data() {
        assert_eq!(decode_length(&[]), Err(Error::NoData));
    }

    #[test]
    fn not_enough_bytes() {
        let test_cases: Vec<Vec<u8>> = vec![
            vec![0xff],
            vec![0xff, 0x00],
            vec![0xff, 0x7f, 0x7f, 0x7f],
        ];
        for (index, case) in test_cases.iter().enumerate() {
            let err = decode_length(case).unwrap_err();
            assert_eq!(err, Error::Unterminated, "Failed test #{}", index);
            assert!(err.is_format());
        }
    }

    #[test]
    fn overflow() {
        // Eleven groups can never fit.
        let mut too_many = vec![0xff];
        too_many.extend_from_slice(&[0x00; 10]);
        too_many.push(0x81);
        assert_eq!(decode_length(&too_many), Err(Error::Overflow));

        // The tenth group may only carry one bit.
        let mut wide_top = vec![0xff];
        wide_top.extend_from_slice(&[0x7f; 9]);
        wide_top.push(0x83);
        assert_eq!(decode_length(&wide_top), Err(Error::Overflow));

        // All 64 bits set, plus the 255 offset, wraps.
        let mut wraps = vec![0xff];
        wraps.extend_from_slice(&[0x7f; 9]);
        wraps.push(0x81);
        assert_eq!(decode_length(&wraps), Err(Error::Overflow));
    }

    #[test]
    fn checked_remaining() {
        let mut enc = encode_length(10);
        enc.extend_from_slice(b"ab");
        let err = decode_length_checked(&enc).unwrap_err();
        assert_eq!(
            err,
            Error::LengthTooShort {
                step: "length prefix",
                actual: 2,
                expected: 10
            }
        );
        assert!(err.to_string().contains("length greater than data"));

        let mut enc = encode_length(3);
        enc.extend_from_slice(b"abc");
        let (length, rest) = decode_length_checked(&enc).unwrap();
        assert_eq!(length, 3);
        assert_eq!(rest, b"abc");
    }

    proptest! {
        #[test]
        fn roundtrip_u32(n in any::<u32>()) {
            let enc = encode_length(n as u64);
            prop_assert_eq!(decode_length(&enc).unwrap(), (n as u64, &[][..]));
        }

        #[test]
        fn roundtrip_u64_with_tail(
            n in any::<u64>(),
            tail in prop::collection::vec(any::<u8>(), 0..16),
        ) {
            let mut enc = encode_length(n);
            enc.extend_from_slice(&tail);
            let (length, rest) = decode_length(&enc).unwrap();
            prop_assert_eq!(length, n);
            prop_assert_eq!(rest, &tail[..]);
        }
    }
}
