//! Stateless helpers for inspecting encoded RLP without a [`Stream`].

use crate::{
    decode::{RlpDecodable, Stream},
    encode::{EncodeBuffer, RlpEncodable},
    header::{be_size, head_size, read_kind, to_be_bytes_trimmed},
    ErrorKind, Kind, Result, EMPTY_STRING_CODE,
};
use bytes::Bytes;
use core::ops::Deref;

/// Splits the first item off `buf`.
///
/// Returns the item's kind, its content and the bytes after it. The content of
/// a [`Kind::Byte`] item is the byte itself.
///
/// # Errors
///
/// Returns an error if the head is not canonical or announces more bytes than
/// `buf` holds.
pub fn split(buf: &[u8]) -> Result<(Kind, &[u8], &[u8])> {
    let (kind, head_len, content_len) = read_kind(buf)?;
    let (content, rest) = buf[head_len..].split_at(content_len);
    Ok((kind, content, rest))
}

/// Splits the first item off `buf`, which must be a string or byte.
pub fn split_string(buf: &[u8]) -> Result<(&[u8], &[u8])> {
    match split(buf)? {
        (Kind::List, ..) => Err(ErrorKind::ExpectedString.into()),
        (_, content, rest) => Ok((content, rest)),
    }
}

/// Splits the first item off `buf`, which must be a list.
pub fn split_list(buf: &[u8]) -> Result<(&[u8], &[u8])> {
    match split(buf)? {
        (Kind::List, content, rest) => Ok((content, rest)),
        _ => Err(ErrorKind::ExpectedList.into()),
    }
}

/// Splits an integer of at most 64 bits off `buf`.
pub fn split_uint64(buf: &[u8]) -> Result<(u64, &[u8])> {
    let (content, rest) = split_string(buf)?;
    match content {
        [] => Ok((0, rest)),
        [0, ..] => Err(ErrorKind::NonCanonicalInt.into()),
        _ if content.len() > 8 => Err(ErrorKind::Overflow.into()),
        _ => Ok((content.iter().fold(0u64, |acc, &b| acc << 8 | b as u64), rest)),
    }
}

/// Counts the items concatenated in `buf`.
///
/// # Errors
///
/// Returns an error if any item is malformed or truncated.
pub fn count_values(mut buf: &[u8]) -> Result<usize> {
    let mut n = 0;
    while !buf.is_empty() {
        let (_, _, rest) = split(buf)?;
        buf = rest;
        n += 1;
    }
    Ok(n)
}

/// Returns the encoded size of a list with `content_len` bytes of content.
#[inline]
pub const fn list_size(content_len: usize) -> usize {
    head_size(content_len) + content_len
}

/// Returns the encoded size of the integer `value`.
#[inline]
pub const fn int_size(value: u64) -> usize {
    if value < EMPTY_STRING_CODE as u64 {
        1
    } else {
        1 + be_size(value)
    }
}

/// Appends the encoding of `value` to `buf`.
pub fn append_uint64(buf: &mut Vec<u8>, value: u64) {
    match value {
        0 => buf.push(EMPTY_STRING_CODE),
        1..=0x7F => buf.push(value as u8),
        _ => {
            let be;
            let be = to_be_bytes_trimmed!(be, value);
            buf.push(EMPTY_STRING_CODE + be.len() as u8);
            buf.extend_from_slice(be);
        }
    }
}

/// An already encoded RLP item.
///
/// Encoding writes the bytes verbatim. Decoding captures the next item,
/// head included, without interpreting its content.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RawValue(pub Bytes);

impl RawValue {
    /// Wraps pre-encoded bytes. They are not validated.
    pub fn new(encoded: impl Into<Bytes>) -> Self {
        Self(encoded.into())
    }

    /// Returns the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Deref for RawValue {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl RlpEncodable for RawValue {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        out.write_raw(&self.0);
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        self.0.is_empty()
    }
}

impl RlpDecodable for RawValue {
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        s.raw().map(|raw| Self(raw.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn split_list_item() {
        let input = [204, 131, 97, 97, 97, 8, 198, 133, 72, 101, 102, 101, 105];
        let (kind, content, rest) = split(&input).unwrap();
        assert_eq!(kind, Kind::List);
        assert_eq!(content, &input[1..]);
        assert!(rest.is_empty());
    }

    #[test]
    fn split_kinds() {
        assert_eq!(split(&hex!("0102")).unwrap(), (Kind::Byte, &[1u8][..], &[2u8][..]));
        assert_eq!(split(&hex!("8180ff")).unwrap(), (Kind::String, &[0x80u8][..], &[0xffu8][..]));
        assert_eq!(split_string(&hex!("c0")).unwrap_err().kind, ErrorKind::ExpectedString);
        assert_eq!(split_list(&hex!("80")).unwrap_err().kind, ErrorKind::ExpectedList);
        assert_eq!(split(&hex!("")).unwrap_err().kind, ErrorKind::InputTooShort);
        assert_eq!(split(&hex!("8105")).unwrap_err().kind, ErrorKind::NonCanonicalSize);
        assert_eq!(split(&hex!("83aa")).unwrap_err().kind, ErrorKind::ValueTooLarge);
    }

    #[test]
    fn split_uint64s() {
        assert_eq!(split_uint64(&hex!("80")).unwrap(), (0, &[][..]));
        assert_eq!(split_uint64(&hex!("7f01")).unwrap(), (0x7f, &[1u8][..]));
        assert_eq!(split_uint64(&hex!("820400")).unwrap(), (1024, &[][..]));
        assert_eq!(split_uint64(&hex!("00")).unwrap_err().kind, ErrorKind::NonCanonicalInt);
        assert_eq!(split_uint64(&hex!("820004")).unwrap_err().kind, ErrorKind::NonCanonicalInt);
        assert_eq!(
            split_uint64(&hex!("89010203040506070809")).unwrap_err().kind,
            ErrorKind::Overflow
        );
        assert_eq!(split_uint64(&hex!("c0")).unwrap_err().kind, ErrorKind::ExpectedString);
    }

    #[test]
    fn counts() {
        assert_eq!(count_values(&[]).unwrap(), 0);
        assert_eq!(count_values(&hex!("0180c3010203c0")).unwrap(), 4);
        assert_eq!(count_values(&hex!("01c5")).unwrap_err().kind, ErrorKind::ValueTooLarge);
    }

    #[test]
    fn sizes_match_encoding() {
        for value in [0u64, 1, 0x7f, 0x80, 0xff, 0x100, 1 << 40, u64::MAX] {
            let mut buf = Vec::new();
            append_uint64(&mut buf, value);
            assert_eq!(buf, crate::encode(value).unwrap(), "{value}");
            assert_eq!(int_size(value), buf.len(), "{value}");
        }
        assert_eq!(list_size(0), 1);
        assert_eq!(list_size(55), 56);
        assert_eq!(list_size(56), 58);
    }

    #[test]
    fn raw_values_pass_through() {
        let input = hex!("c4c3010203");
        let items: Vec<RawValue> = crate::decode(input).unwrap();
        assert_eq!(items, [RawValue::new(hex!("c3010203").to_vec())]);
        assert_eq!(crate::encode(&items).unwrap(), input);
    }
}
