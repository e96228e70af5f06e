//! Length-prefixed strings and single chars, as Xapian writes them into terms and values.

use crate::error::{Error, Result};
use crate::length::{decode_length_checked, encode_length_into, encoded_length_size};

/// Encode a byte string as its length prefix followed by the bytes themselves.
pub fn encode_string(s: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_length_size(s.len() as u64) + s.len());
    encode_string_into(&mut buf, s);
    buf
}

/// Append a length-prefixed byte string onto a byte vector.
pub fn encode_string_into(buf: &mut Vec<u8>, s: &[u8]) {
    encode_length_into(buf, s.len() as u64);
    buf.extend_from_slice(s);
}

/// Split a length-prefixed byte string off the front of `buf`, returning it along with the
/// unread remainder.
///
/// # Errors
///
/// Fails with the same errors as [`decode_length`](crate::decode_length), and if the buffer is
/// shorter than the decoded length.
pub fn decode_string(buf: &[u8]) -> Result<(&[u8], &[u8])> {
    let (length, rest) = decode_length_checked(buf)?;
    // decode_length_checked guarantees length <= rest.len()
    Ok(rest.split_at(length as usize))
}

/// Append a single char. Chars are written verbatim, with no prefix.
pub fn encode_char_into(buf: &mut Vec<u8>, c: u8) {
    buf.push(c);
}

/// Split a single char off the front of `buf`.
pub fn decode_char(buf: &[u8]) -> Result<(u8, &[u8])> {
    buf.split_first()
        .map(|(&c, rest)| (c, rest))
        .ok_or(Error::Unterminated)
}
