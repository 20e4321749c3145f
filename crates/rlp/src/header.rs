use crate::{Error, ErrorKind, Result, EMPTY_LIST_CODE, EMPTY_STRING_CODE};
use bytes::{Buf, BufMut};
use core::fmt;

/// Long-form tag base for strings: `0xB7 + len(len)`.
pub(crate) const LONG_STRING_OFFSET: u8 = 0xB7;
/// Long-form tag base for lists: `0xF7 + len(len)`.
pub(crate) const LONG_LIST_OFFSET: u8 = 0xF7;

/// The kind of an encoded RLP item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A single byte below `0x80`, encoded without a head.
    Byte,
    /// A byte string.
    String,
    /// A list of items.
    List,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Byte => "Byte",
            Self::String => "String",
            Self::List => "List",
        })
    }
}

/// Which empty value stands in for an absent field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NilKind {
    /// `0x80`
    #[default]
    String,
    /// `0xC0`
    List,
}

impl NilKind {
    /// Returns the single byte encoding of this empty value.
    #[inline]
    pub const fn code(self) -> u8 {
        match self {
            Self::String => EMPTY_STRING_CODE,
            Self::List => EMPTY_LIST_CODE,
        }
    }

    /// Returns the item kind this empty value decodes as.
    #[inline]
    pub const fn kind(self) -> Kind {
        match self {
            Self::String => Kind::String,
            Self::List => Kind::List,
        }
    }
}

impl fmt::Display for NilKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}

/// The header of an RLP item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// True if list, false otherwise.
    pub list: bool,
    /// Length of the payload in bytes.
    pub payload_length: usize,
}

impl Header {
    /// Decodes an RLP header from the given buffer, advancing past it.
    ///
    /// A single byte below `0x80` decodes as a one byte string whose payload
    /// is the byte itself; the buffer is not advanced in that case.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is too short or the header is not canonical.
    pub fn decode(buf: &mut &[u8]) -> Result<Self> {
        let (kind, head_len, payload_length) = read_kind(buf)?;
        match kind {
            Kind::Byte => Ok(Self { list: false, payload_length: 1 }),
            Kind::String | Kind::List => {
                buf.advance(head_len);
                Ok(Self { list: kind == Kind::List, payload_length })
            }
        }
    }

    /// Decodes the next payload from the given buffer, advancing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is invalid or its kind does not match `is_list`.
    pub fn decode_bytes<'a>(buf: &mut &'a [u8], is_list: bool) -> Result<&'a [u8]> {
        let Self { list, payload_length } = Self::decode(buf)?;
        if list != is_list {
            let kind = if is_list { ErrorKind::ExpectedList } else { ErrorKind::ExpectedString };
            return Err(kind.into());
        }
        let (payload, rest) = buf.split_at(payload_length);
        *buf = rest;
        Ok(payload)
    }

    /// Decodes the next item, returning a view of its payload.
    ///
    /// List payloads are split into their encoded items without decoding them.
    ///
    /// # Errors
    ///
    /// Returns an error if the header or any list item header is invalid.
    pub fn decode_raw<'a>(buf: &mut &'a [u8]) -> Result<PayloadView<'a>> {
        let Self { list, payload_length } = Self::decode(buf)?;
        let (payload, rest) = buf.split_at(payload_length);
        *buf = rest;

        if !list {
            return Ok(PayloadView::String(payload));
        }

        let mut items = Vec::new();
        let mut remaining = payload;
        while !remaining.is_empty() {
            let (_, head_len, content_len) = read_kind(remaining)?;
            let (item, rest) = remaining.split_at(head_len + content_len);
            items.push(item);
            remaining = rest;
        }
        Ok(PayloadView::List(items))
    }

    /// Encodes the header into the `out` buffer.
    #[inline]
    pub fn encode(&self, out: &mut dyn BufMut) {
        let mut head = [0u8; 9];
        let small = if self.list { EMPTY_LIST_CODE } else { EMPTY_STRING_CODE };
        let n = put_head(&mut head, small, self.payload_length as u64);
        out.put_slice(&head[..n]);
    }

    /// Returns the length of the encoded header.
    #[inline]
    pub const fn length(&self) -> usize {
        head_size(self.payload_length)
    }

    /// Returns the total length of the encoded header and payload.
    #[inline]
    pub const fn length_with_payload(&self) -> usize {
        self.length() + self.payload_length
    }
}

/// Structured representation of an RLP payload.
#[derive(Debug)]
pub enum PayloadView<'a> {
    /// Payload is a byte string.
    String(&'a [u8]),
    /// Payload is a list of RLP encoded data.
    List(Vec<&'a [u8]>),
}

/// Reads the head at the start of `buf` without consuming it.
///
/// Returns the item kind, the size of the head and the size of the content.
/// For [`Kind::Byte`] the head size is 0 and the content size is 1.
///
/// # Errors
///
/// Returns an error if the head is not canonical, or if `buf` is shorter than
/// the item it announces.
pub fn read_kind(buf: &[u8]) -> Result<(Kind, usize, usize)> {
    let Some(&b) = buf.first() else {
        return Err(ErrorKind::InputTooShort.into());
    };
    let (kind, head_len, content_len) = match b {
        0x00..=0x7F => (Kind::Byte, 0, 1),
        EMPTY_STRING_CODE..=LONG_STRING_OFFSET => {
            let len = (b - EMPTY_STRING_CODE) as usize;
            if len == 1 && buf.get(1).map_or(false, |&next| next < EMPTY_STRING_CODE) {
                return Err(ErrorKind::NonCanonicalSize.into());
            }
            (Kind::String, 1, len)
        }
        0xB8..=0xBF => {
            let len_of_len = (b - LONG_STRING_OFFSET) as usize;
            (Kind::String, 1 + len_of_len, read_long_size(&buf[1..], len_of_len)?)
        }
        EMPTY_LIST_CODE..=LONG_LIST_OFFSET => (Kind::List, 1, (b - EMPTY_LIST_CODE) as usize),
        0xF8..=0xFF => {
            let len_of_len = (b - LONG_LIST_OFFSET) as usize;
            (Kind::List, 1 + len_of_len, read_long_size(&buf[1..], len_of_len)?)
        }
    };
    if buf.len() - head_len < content_len {
        return Err(ErrorKind::ValueTooLarge.into());
    }
    Ok((kind, head_len, content_len))
}

/// Reads a long-form size of `len_of_len` bytes, checking minimality.
fn read_long_size(buf: &[u8], len_of_len: usize) -> Result<usize> {
    if buf.len() < len_of_len {
        return Err(ErrorKind::InputTooShort.into());
    }
    let size = decode_size(&buf[..len_of_len])?;
    usize::try_from(size).map_err(|_| Error::new(ErrorKind::ValueTooLarge))
}

/// Decodes a big-endian long-form size, rejecting leading zeros and sizes below 56.
pub(crate) fn decode_size(be: &[u8]) -> Result<u64> {
    if be.first() == Some(&0) {
        return Err(ErrorKind::NonCanonicalSize.into());
    }
    let size = be.iter().fold(0u64, |acc, &b| acc << 8 | b as u64);
    if size < 56 {
        return Err(ErrorKind::NonCanonicalSize.into());
    }
    Ok(size)
}

macro_rules! to_be_bytes_trimmed {
    ($be:ident, $x:expr) => {{
        $be = $x.to_be_bytes();
        &$be[($x.leading_zeros() / 8) as usize..]
    }};
}
pub(crate) use to_be_bytes_trimmed;

/// Returns the number of bytes needed to encode `value` without leading zeros.
#[inline]
pub(crate) const fn be_size(value: u64) -> usize {
    (u64::BITS as usize - value.leading_zeros() as usize + 7) / 8
}

/// Returns the size of the head for an item with `content_len` bytes of content.
#[inline]
pub const fn head_size(content_len: usize) -> usize {
    if content_len < 56 {
        1
    } else {
        1 + be_size(content_len as u64)
    }
}

/// Writes `value` big-endian into the start of `buf` without leading zeros.
///
/// Returns the number of bytes written.
#[inline]
pub(crate) fn put_int(buf: &mut [u8], value: u64) -> usize {
    let be;
    let be = to_be_bytes_trimmed!(be, value);
    buf[..be.len()].copy_from_slice(be);
    be.len()
}

/// Writes the head for `size` bytes of content into the start of `buf`.
///
/// `small_tag` is [`EMPTY_STRING_CODE`] or [`EMPTY_LIST_CODE`]; the long-form
/// tag is derived from it. Returns the number of bytes written.
#[inline]
pub(crate) fn put_head(buf: &mut [u8], small_tag: u8, size: u64) -> usize {
    if size < 56 {
        buf[0] = small_tag + size as u8;
        1
    } else {
        let n = put_int(&mut buf[1..], size);
        buf[0] = small_tag + 55 + n as u8;
        n + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn head_boundary_at_56() {
        let mut buf = [0u8; 9];
        assert_eq!(put_head(&mut buf, EMPTY_STRING_CODE, 55), 1);
        assert_eq!(buf[0], 0xB7);
        assert_eq!(put_head(&mut buf, EMPTY_STRING_CODE, 56), 2);
        assert_eq!(buf[..2], hex!("b838"));
        assert_eq!(put_head(&mut buf, EMPTY_LIST_CODE, 55), 1);
        assert_eq!(buf[0], 0xF7);
        assert_eq!(put_head(&mut buf, EMPTY_LIST_CODE, 1024), 3);
        assert_eq!(buf[..3], hex!("f90400"));
        assert_eq!(head_size(55), 1);
        assert_eq!(head_size(56), 2);
        assert_eq!(head_size(0x1_0000), 4);
    }

    #[test]
    fn be_sizes() {
        assert_eq!(be_size(0), 0);
        assert_eq!(be_size(1), 1);
        assert_eq!(be_size(0xFF), 1);
        assert_eq!(be_size(0x100), 2);
        assert_eq!(be_size(u64::MAX), 8);
    }

    #[test]
    fn read_kind_classifies() {
        assert_eq!(read_kind(&hex!("00")), Ok((Kind::Byte, 0, 1)));
        assert_eq!(read_kind(&hex!("7f")), Ok((Kind::Byte, 0, 1)));
        assert_eq!(read_kind(&hex!("80")), Ok((Kind::String, 1, 0)));
        assert_eq!(read_kind(&hex!("8180")), Ok((Kind::String, 1, 1)));
        assert_eq!(read_kind(&hex!("c0")), Ok((Kind::List, 1, 0)));
        let mut long = vec![0xB8, 56];
        long.extend([0u8; 56]);
        assert_eq!(read_kind(&long), Ok((Kind::String, 2, 56)));
    }

    #[test]
    fn read_kind_rejects_non_canonical() {
        let err = |b: &[u8]| read_kind(b).unwrap_err().kind;
        // single byte below 0x80 with a head
        assert_eq!(err(&hex!("8105")), ErrorKind::NonCanonicalSize);
        // long form for a size below 56
        assert_eq!(err(&hex!("b80102")), ErrorKind::NonCanonicalSize);
        assert_eq!(err(&hex!("f80100")), ErrorKind::NonCanonicalSize);
        // leading zero in the size
        assert_eq!(err(&hex!("b90038")), ErrorKind::NonCanonicalSize);
        // announced content is missing
        assert_eq!(err(&hex!("83aabb")), ErrorKind::ValueTooLarge);
        assert_eq!(err(&hex!("b9")), ErrorKind::InputTooShort);
        assert_eq!(err(&[]), ErrorKind::InputTooShort);
    }

    #[test]
    fn header_encode_matches_length() {
        for payload_length in [0, 1, 55, 56, 255, 256, 0xFFFF, 0x10000] {
            for list in [false, true] {
                let h = Header { list, payload_length };
                let mut out = Vec::new();
                h.encode(&mut out);
                assert_eq!(out.len(), h.length(), "{h:?}");
            }
        }
    }

    #[test]
    fn decode_raw() {
        let input = hex!("c88363617483646f67");
        let mut buf = &input[..];
        match Header::decode_raw(&mut buf).unwrap() {
            PayloadView::List(items) => {
                assert_eq!(items, vec![&hex!("83636174")[..], &hex!("83646f67")[..]]);
            }
            other => panic!("unexpected payload {other:?}"),
        }
        assert!(buf.is_empty(), "buffer was not advanced");

        let input = hex!("83646f67");
        let mut buf = &input[..];
        assert!(matches!(Header::decode_raw(&mut buf), Ok(PayloadView::String(b"dog"))));
    }

    #[test]
    fn decode_bytes_checks_kind() {
        let input = hex!("c0");
        assert_eq!(
            Header::decode_bytes(&mut &input[..], false).unwrap_err().kind,
            ErrorKind::ExpectedString
        );
        let input = hex!("83646f67");
        assert_eq!(Header::decode_bytes(&mut &input[..], false), Ok(&b"dog"[..]));
    }

    #[test]
    fn to_be_bytes_trimmed() {
        macro_rules! test_to_be_bytes_trimmed {
            ($($x:expr => $expected:expr),+ $(,)?) => {$(
                let be;
                assert_eq!(to_be_bytes_trimmed!(be, $x), $expected);
            )+};
        }

        test_to_be_bytes_trimmed! {
            0u8 => [],
            0u64 => [],
            0u128 => [],
            1u32 => [1],
            u16::MAX => [0xff, 0xff],
            256u16 => [1, 0],
            65536u64 => [1, 0, 0],
        }
    }
}
