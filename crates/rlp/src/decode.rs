use crate::{
    header::{decode_size, put_head},
    Error, ErrorKind, FieldTag, Kind, Result, EMPTY_LIST_CODE, EMPTY_STRING_CODE,
};
use arrayvec::ArrayVec;
use bytes::{Buf, Bytes, BytesMut};
use core::marker::{PhantomData, PhantomPinned};
use num_bigint::{BigInt, BigUint};
use std::{borrow::Cow, io, rc::Rc, sync::Arc};

/// Default size ceiling, in bytes, for big integers read by a [`Stream`].
///
/// 32 bytes is 256 bits. Adjust per stream with
/// [`Stream::set_max_big_int_bytes`].
pub const DEFAULT_MAX_BIG_INT_BYTES: usize = 32;

/// Step by which the content of a reader-backed item is buffered.
const READ_CHUNK: usize = 8 * 1024;

/// A type that can be decoded from an RLP stream.
pub trait RlpDecodable: Sized {
    /// Decodes one value from the stream.
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self>;

    /// Decodes one value as a struct field carrying `tag`.
    ///
    /// Only containers whose decoding depends on the annotation override this.
    #[inline]
    fn rlp_decode_tagged(s: &mut Stream<'_>, tag: &FieldTag) -> Result<Self> {
        let _ = tag;
        Self::rlp_decode(s)
    }
}

trait Source {
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()>;

    /// Number of bytes that can still be read, if known.
    fn len_hint(&self) -> Option<usize>;
}

struct BufSource<B>(B);

impl<B: Buf> Source for BufSource<B> {
    #[inline]
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        if self.0.remaining() < dst.len() {
            return Err(ErrorKind::InputTooShort.into());
        }
        self.0.copy_to_slice(dst);
        Ok(())
    }

    #[inline]
    fn len_hint(&self) -> Option<usize> {
        Some(self.0.remaining())
    }
}

struct ReadSource<R>(R);

impl<R: io::Read> Source for ReadSource<R> {
    #[inline]
    fn read_exact(&mut self, dst: &mut [u8]) -> Result<()> {
        self.0.read_exact(dst).map_err(Error::from)
    }

    #[inline]
    fn len_hint(&self) -> Option<usize> {
        None
    }
}

/// A pull-based RLP decoder.
///
/// The stream hands out one item at a time. [`kind`](Self::kind) peeks at the
/// next item; reading methods consume it. Inside a list the stream tracks how
/// many content bytes remain at every nesting level, and reports
/// [`ErrorKind::EndOfList`] once the innermost list is exhausted.
pub struct Stream<'a> {
    src: Box<dyn Source + 'a>,
    /// Bytes left in the input, if its length is known.
    remaining: Option<u64>,
    /// Content bytes left in each open list, innermost last.
    stack: Vec<u64>,
    /// Result of peeking at the next item's head.
    lookahead: Option<Result<(Kind, u64)>>,
    /// Value of a [`Kind::Byte`] lookahead.
    byte_val: u8,
    pos: usize,
    max_big_int_bytes: usize,
}

impl core::fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Stream")
            .field("remaining", &self.remaining)
            .field("stack", &self.stack)
            .field("lookahead", &self.lookahead)
            .field("pos", &self.pos)
            .finish_non_exhaustive()
    }
}

impl<'a> Stream<'a> {
    /// Creates a stream over a byte slice.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self::from_buf(input)
    }

    /// Creates a stream over any [`Buf`]. The input length is its remaining size.
    pub fn from_buf<B: Buf + 'a>(buf: B) -> Self {
        let remaining = Some(buf.remaining() as u64);
        Self::with_source(Box::new(BufSource(buf)), remaining)
    }

    /// Creates a stream over a reader of unknown length.
    pub fn from_reader<R: io::Read + 'a>(reader: R) -> Self {
        Self::with_source(Box::new(ReadSource(reader)), None)
    }

    /// Creates a stream over a reader that yields at most `limit` bytes.
    ///
    /// Items claiming more than the bytes left are rejected with
    /// [`ErrorKind::ValueTooLarge`] before they are read.
    pub fn from_reader_with_limit<R: io::Read + 'a>(reader: R, limit: u64) -> Self {
        Self::with_source(Box::new(ReadSource(reader)), Some(limit))
    }

    /// Creates a stream positioned at a list with `content_len` bytes of
    /// content, without a head in `input`.
    ///
    /// Call [`list_start`](Self::list_start) to enter it.
    pub fn new_list(input: &'a [u8], content_len: u64) -> Self {
        let mut s = Self::with_source(Box::new(BufSource(input)), Some(content_len));
        s.lookahead = Some(Ok((Kind::List, content_len)));
        s
    }

    fn with_source(src: Box<dyn Source + 'a>, remaining: Option<u64>) -> Self {
        Self {
            src,
            remaining,
            stack: Vec::new(),
            lookahead: None,
            byte_val: 0,
            pos: 0,
            max_big_int_bytes: DEFAULT_MAX_BIG_INT_BYTES,
        }
    }

    /// Points the stream at new input, keeping its allocations and settings.
    ///
    /// Any list left open on the previous input is abandoned.
    #[inline]
    pub fn reset(&mut self, input: &'a [u8]) {
        self.reset_buf(input);
    }

    /// Points the stream at a [`Buf`], as [`reset`](Self::reset) does for slices.
    pub fn reset_buf<B: Buf + 'a>(&mut self, buf: B) {
        let remaining = Some(buf.remaining() as u64);
        self.reset_source(Box::new(BufSource(buf)), remaining);
    }

    /// Points the stream at a reader, optionally limited to `limit` bytes.
    pub fn reset_reader<R: io::Read + 'a>(&mut self, reader: R, limit: Option<u64>) {
        self.reset_source(Box::new(ReadSource(reader)), limit);
    }

    fn reset_source(&mut self, src: Box<dyn Source + 'a>, remaining: Option<u64>) {
        self.src = src;
        self.remaining = remaining;
        self.stack.clear();
        self.lookahead = None;
        self.byte_val = 0;
        self.pos = 0;
    }

    /// Sets the size ceiling for big integers.
    pub fn set_max_big_int_bytes(&mut self, max: usize) {
        self.max_big_int_bytes = max;
    }

    /// Returns the size ceiling for big integers.
    pub const fn max_big_int_bytes(&self) -> usize {
        self.max_big_int_bytes
    }

    /// Returns the number of bytes consumed so far.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread input bytes, if the input length is known.
    #[inline]
    pub const fn remaining(&self) -> Option<u64> {
        self.remaining
    }

    /// Returns the nesting depth of open lists.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the kind and content size of the next item without consuming it.
    ///
    /// For [`Kind::Byte`] the size is 0.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::EndOfList`] once the innermost list is exhausted,
    /// or the error found in the item's head.
    pub fn kind(&mut self) -> Result<(Kind, u64)> {
        if let Some(cached) = self.lookahead {
            return cached;
        }
        if self.stack.last() == Some(&0) {
            return Err(self.error(ErrorKind::EndOfList));
        }
        let result = match self.read_kind() {
            Ok((kind, size)) => self.check_fits(size).map(|()| (kind, size)),
            Err(e) => Err(e),
        };
        self.lookahead = Some(result);
        result
    }

    /// Enters the next item, which must be a list. Returns its content size.
    pub fn list_start(&mut self) -> Result<u64> {
        let (kind, size) = self.kind()?;
        if kind != Kind::List {
            return Err(self.error(ErrorKind::ExpectedList));
        }
        if let Some(parent) = self.stack.last_mut() {
            *parent -= size;
        }
        self.stack.push(size);
        self.lookahead = None;
        Ok(size)
    }

    /// Leaves the innermost list, which must be fully consumed.
    pub fn list_end(&mut self) -> Result<()> {
        match self.stack.last() {
            None => Err(self.error(ErrorKind::NotInList)),
            Some(0) => {
                self.stack.pop();
                self.lookahead = None;
                Ok(())
            }
            Some(_) => Err(self.error(ErrorKind::ListNotExhausted)),
        }
    }

    /// Reads the content of the next item, which must be a string or byte.
    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        let (kind, size) = self.kind()?;
        match kind {
            Kind::Byte => {
                self.lookahead = None;
                Ok(vec![self.byte_val])
            }
            Kind::String => {
                let mut b = Vec::new();
                self.read_content(size, &mut b)?;
                if let [single] = b[..] {
                    if single < EMPTY_STRING_CODE {
                        return Err(self.error(ErrorKind::NonCanonicalSize));
                    }
                }
                Ok(b)
            }
            Kind::List => Err(self.error(ErrorKind::ExpectedString)),
        }
    }

    /// Reads the content of the next item into `dst`, which must match its size exactly.
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> Result<()> {
        let (kind, size) = self.kind()?;
        match kind {
            Kind::Byte => {
                if dst.len() != 1 {
                    let kind = ErrorKind::UnexpectedLength { expected: dst.len(), got: 1 };
                    return Err(self.error(kind));
                }
                dst[0] = self.byte_val;
                self.lookahead = None;
                Ok(())
            }
            Kind::String => {
                if size != dst.len() as u64 {
                    let got = usize::try_from(size).unwrap_or(usize::MAX);
                    let kind = ErrorKind::UnexpectedLength { expected: dst.len(), got };
                    return Err(self.error(kind));
                }
                self.read_full(dst)?;
                if let [single] = dst {
                    if *single < EMPTY_STRING_CODE {
                        return Err(self.error(ErrorKind::NonCanonicalSize));
                    }
                }
                Ok(())
            }
            Kind::List => Err(self.error(ErrorKind::ExpectedString)),
        }
    }

    /// Reads the next item with its head, without decoding list content.
    pub fn raw(&mut self) -> Result<Vec<u8>> {
        let (kind, size) = self.kind()?;
        let small_tag = match kind {
            Kind::Byte => {
                self.lookahead = None;
                return Ok(vec![self.byte_val]);
            }
            Kind::String => EMPTY_STRING_CODE,
            Kind::List => EMPTY_LIST_CODE,
        };

        let mut head = [0u8; 9];
        let head_len = put_head(&mut head, small_tag, size);
        let mut out = head[..head_len].to_vec();
        self.read_content(size, &mut out)?;
        if kind == Kind::String && size == 1 && out[head_len] < EMPTY_STRING_CODE {
            return Err(self.error(ErrorKind::NonCanonicalSize));
        }
        Ok(out)
    }

    /// Reads an unsigned integer of at most `max_bits` bits (up to 128).
    pub fn uint(&mut self, max_bits: u32) -> Result<u128> {
        let (kind, size) = self.kind()?;
        match kind {
            Kind::Byte => {
                if self.byte_val == 0 {
                    return Err(self.error(ErrorKind::NonCanonicalInt));
                }
                self.lookahead = None;
                Ok(self.byte_val as u128)
            }
            Kind::String => {
                if size > (max_bits.min(128) / 8) as u64 {
                    return Err(self.error(ErrorKind::Overflow));
                }
                let mut buf = [0u8; 16];
                let buf = &mut buf[..size as usize];
                self.read_full(buf)?;
                match *buf {
                    [] => Ok(0),
                    [b] if b < EMPTY_STRING_CODE => Err(self.error(ErrorKind::NonCanonicalSize)),
                    [0, ..] => Err(self.error(ErrorKind::NonCanonicalInt)),
                    _ => Ok(buf.iter().fold(0u128, |acc, &b| acc << 8 | b as u128)),
                }
            }
            Kind::List => Err(self.error(ErrorKind::ExpectedString)),
        }
    }

    /// Reads a `u64`.
    #[inline]
    pub fn uint64(&mut self) -> Result<u64> {
        self.uint(64).map(|v| v as u64)
    }

    /// Reads a boolean, encoded as the integer 0 or 1.
    pub fn bool(&mut self) -> Result<bool> {
        match self.uint(8)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(self.error(ErrorKind::InvalidBool)),
        }
    }

    /// Reads an unsigned big integer of at most
    /// [`max_big_int_bytes`](Self::max_big_int_bytes) bytes.
    pub fn big_uint(&mut self) -> Result<BigUint> {
        let (kind, size) = self.kind()?;
        let buf = match kind {
            Kind::Byte => {
                self.lookahead = None;
                vec![self.byte_val]
            }
            Kind::String => {
                if size > self.max_big_int_bytes as u64 {
                    return Err(self.error(ErrorKind::Overflow));
                }
                let mut buf = vec![0; size as usize];
                self.read_full(&mut buf)?;
                if let [single] = buf[..] {
                    if single < EMPTY_STRING_CODE {
                        return Err(self.error(ErrorKind::NonCanonicalSize));
                    }
                }
                buf
            }
            Kind::List => return Err(self.error(ErrorKind::ExpectedString)),
        };
        if buf.first() == Some(&0) {
            return Err(self.error(ErrorKind::NonCanonicalInt));
        }
        Ok(BigUint::from_bytes_be(&buf))
    }

    /// Reads a big integer. Encoded big integers are never negative.
    #[inline]
    pub fn big_int(&mut self) -> Result<BigInt> {
        self.big_uint().map(BigInt::from)
    }

    /// Decodes the next value.
    #[inline]
    pub fn decode<T: RlpDecodable>(&mut self) -> Result<T> {
        T::rlp_decode(self)
    }

    /// Creates an error of `kind` at the current position.
    #[inline]
    pub(crate) fn error(&self, kind: ErrorKind) -> Error {
        Error::with_bytepos(kind, self.pos)
    }

    /// Consumes a peeked item that has no content left to read.
    #[inline]
    pub(crate) fn skip_empty(&mut self) {
        self.lookahead = None;
    }

    fn read_kind(&mut self) -> Result<(Kind, u64)> {
        if self.stack.is_empty() && self.remaining == Some(0) {
            return Err(self.error(ErrorKind::InputTooShort));
        }
        let b = self.read_byte()?;
        match b {
            0x00..=0x7F => {
                self.byte_val = b;
                Ok((Kind::Byte, 0))
            }
            EMPTY_STRING_CODE..=0xB7 => Ok((Kind::String, (b - EMPTY_STRING_CODE) as u64)),
            0xB8..=0xBF => Ok((Kind::String, self.read_size(b - 0xB7)?)),
            EMPTY_LIST_CODE..=0xF7 => Ok((Kind::List, (b - EMPTY_LIST_CODE) as u64)),
            0xF8..=0xFF => Ok((Kind::List, self.read_size(b - 0xF7)?)),
        }
    }

    fn read_size(&mut self, len_of_len: u8) -> Result<u64> {
        let mut buf = [0u8; 8];
        let buf = &mut buf[..len_of_len as usize];
        self.read_full(buf)?;
        decode_size(buf).map_err(|e| self.error(e.kind))
    }

    fn check_fits(&self, size: u64) -> Result<()> {
        if let Some(&budget) = self.stack.last() {
            if size > budget {
                return Err(self.error(ErrorKind::ElementTooLarge));
            }
        } else if let Some(remaining) = self.remaining {
            if size > remaining {
                return Err(self.error(ErrorKind::ValueTooLarge));
            }
        }
        Ok(())
    }

    fn content_len(&self, size: u64) -> Result<usize> {
        usize::try_from(size).map_err(|_| self.error(ErrorKind::ValueTooLarge))
    }

    /// Appends `size` content bytes to `out`.
    ///
    /// Memory grows with the bytes actually read, so a head claiming more
    /// than a reader delivers fails with [`ErrorKind::InputTooShort`] instead
    /// of allocating the claimed size up front.
    fn read_content(&mut self, size: u64, out: &mut Vec<u8>) -> Result<()> {
        let size = self.content_len(size)?;
        let step = self.src.len_hint().map_or(READ_CHUNK, |n| n.max(READ_CHUNK));
        let end =
            out.len().checked_add(size).ok_or_else(|| self.error(ErrorKind::ValueTooLarge))?;
        while out.len() < end {
            let start = out.len();
            out.resize(start + (end - start).min(step), 0);
            self.read_full(&mut out[start..])?;
        }
        Ok(())
    }

    #[inline]
    fn read_byte(&mut self) -> Result<u8> {
        let mut b = [0u8];
        self.read_full(&mut b)?;
        Ok(b[0])
    }

    fn read_full(&mut self, dst: &mut [u8]) -> Result<()> {
        self.will_read(dst.len() as u64)?;
        self.src.read_exact(dst).map_err(|e| Error { bytepos: self.pos, ..e })?;
        self.pos += dst.len();
        Ok(())
    }

    /// Debits `n` bytes from the innermost list and the input, and drops the lookahead.
    fn will_read(&mut self, n: u64) -> Result<()> {
        self.lookahead = None;
        if let Some(budget) = self.stack.last_mut() {
            if n > *budget {
                return Err(Error::with_bytepos(ErrorKind::ElementTooLarge, self.pos));
            }
            *budget -= n;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            if n > *remaining {
                return Err(Error::with_bytepos(ErrorKind::ValueTooLarge, self.pos));
            }
            *remaining -= n;
        }
        Ok(())
    }
}

impl<T: ?Sized> RlpDecodable for PhantomData<T> {
    #[inline]
    fn rlp_decode(_s: &mut Stream<'_>) -> Result<Self> {
        Ok(Self)
    }
}

impl RlpDecodable for PhantomPinned {
    #[inline]
    fn rlp_decode(_s: &mut Stream<'_>) -> Result<Self> {
        Ok(Self)
    }
}

impl RlpDecodable for bool {
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        s.bool()
    }
}

impl<const N: usize> RlpDecodable for [u8; N] {
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        let mut arr = [0; N];
        s.read_bytes(&mut arr)?;
        Ok(arr)
    }
}

macro_rules! uint_impl {
    ($($t:ty),+ $(,)?) => {$(
        impl RlpDecodable for $t {
            #[inline]
            fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
                s.uint(<$t>::BITS).map(|v| v as $t)
            }
        }
    )+};
}

uint_impl!(u8, u16, u32, u64, usize, u128);

impl RlpDecodable for Bytes {
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        s.bytes().map(Self::from)
    }
}

impl RlpDecodable for BytesMut {
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        s.bytes().map(|b| Self::from(&b[..]))
    }
}

impl<const N: usize> RlpDecodable for ArrayVec<u8, N> {
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        let b = s.bytes()?;
        Self::try_from(&b[..]).map_err(|_| {
            s.error(ErrorKind::UnexpectedLength { expected: N, got: b.len() })
        })
    }
}

impl RlpDecodable for String {
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        let b = s.bytes()?;
        Self::from_utf8(b).map_err(|_| s.error(ErrorKind::InvalidUtf8))
    }
}

impl<T: RlpDecodable> RlpDecodable for Vec<T> {
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        s.list_start()?;
        let items = decode_elements(s)?;
        s.list_end()?;
        Ok(items)
    }

    fn rlp_decode_tagged(s: &mut Stream<'_>, tag: &FieldTag) -> Result<Self> {
        if tag.tail {
            decode_elements(s)
        } else {
            Self::rlp_decode(s)
        }
    }
}

/// Decodes items until the end of the innermost list.
fn decode_elements<T: RlpDecodable>(s: &mut Stream<'_>) -> Result<Vec<T>> {
    let mut items = Vec::new();
    loop {
        match T::rlp_decode(s) {
            Ok(item) => items.push(item),
            Err(e) if e.is_end_of_list() => return Ok(items),
            Err(e) => return Err(e),
        }
    }
}

impl<T: RlpDecodable> RlpDecodable for Option<T> {
    /// Without a `nil` annotation, the value is always present.
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        T::rlp_decode(s).map(Some)
    }

    fn rlp_decode_tagged(s: &mut Stream<'_>, tag: &FieldTag) -> Result<Self> {
        let Some(nil) = tag.nil else {
            return Self::rlp_decode(s);
        };
        let (kind, size) = s.kind()?;
        if size == 0 && kind != Kind::Byte {
            if kind != nil.kind() {
                return Err(s.error(ErrorKind::WrongNilKind { expected: nil, got: kind }));
            }
            s.skip_empty();
            return Ok(None);
        }
        T::rlp_decode(s).map(Some)
    }
}

macro_rules! wrap_impl {
    ($($t:ident),+ $(,)?) => {$(
        impl<T: RlpDecodable> RlpDecodable for $t<T> {
            #[inline]
            fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
                T::rlp_decode(s).map($t::new)
            }

            #[inline]
            fn rlp_decode_tagged(s: &mut Stream<'_>, tag: &FieldTag) -> Result<Self> {
                T::rlp_decode_tagged(s, tag).map($t::new)
            }
        }
    )+};
}

wrap_impl!(Box, Rc, Arc);

impl<T: ?Sized + ToOwned> RlpDecodable for Cow<'_, T>
where
    T::Owned: RlpDecodable,
{
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        <T::Owned as RlpDecodable>::rlp_decode(s).map(Cow::Owned)
    }
}

mod std_impl {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    impl RlpDecodable for IpAddr {
        fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
            let b = s.bytes()?;
            if let Ok(v4) = <[u8; 4]>::try_from(&b[..]) {
                Ok(Self::V4(v4.into()))
            } else if let Ok(v6) = <[u8; 16]>::try_from(&b[..]) {
                Ok(Self::V6(v6.into()))
            } else {
                Err(s.error(ErrorKind::UnexpectedLength { expected: 16, got: b.len() }))
            }
        }
    }

    impl RlpDecodable for Ipv4Addr {
        #[inline]
        fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
            <[u8; 4]>::rlp_decode(s).map(Self::from)
        }
    }

    impl RlpDecodable for Ipv6Addr {
        #[inline]
        fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
            <[u8; 16]>::rlp_decode(s).map(Self::from)
        }
    }
}

/// Decodes a value that must span the entire input.
///
/// # Errors
///
/// Returns an error if the encoding is invalid or not canonical, or
/// [`ErrorKind::MoreThanOneValue`] if data remains after the value.
#[inline]
pub fn decode<T: RlpDecodable>(bytes: impl AsRef<[u8]>) -> Result<T> {
    let mut s = Stream::new(bytes.as_ref());
    let value = T::rlp_decode(&mut s)?;
    if s.remaining != Some(0) {
        return Err(s.error(ErrorKind::MoreThanOneValue));
    }
    Ok(value)
}

/// Decodes one value from the front of `buf`, advancing past it.
///
/// Unlike [`decode`], trailing data is left in `buf`.
///
/// # Errors
///
/// Returns an error if the encoding is invalid or not canonical.
pub fn decode_buf<T: RlpDecodable>(buf: &mut &[u8]) -> Result<T> {
    let mut s = Stream::new(*buf);
    let value = T::rlp_decode(&mut s)?;
    *buf = &buf[s.position()..];
    Ok(value)
}

/// Decodes one value from a reader, reading no further than its end.
///
/// Sizes in heads are only checked against the bytes the reader actually
/// delivers, so an untrusted reader can make the decoder buffer as much as it
/// sends. Use [`decode_from_reader_with_limit`] to reject oversized items up
/// front.
///
/// # Errors
///
/// Returns an error if the encoding is invalid or not canonical, or if the
/// reader fails.
pub fn decode_from_reader<T: RlpDecodable, R: io::Read>(reader: R) -> Result<T> {
    T::rlp_decode(&mut Stream::from_reader(reader))
}

/// Decodes one value from a reader that may yield at most `limit` bytes.
///
/// # Errors
///
/// As [`decode_from_reader`]; items claiming more than the bytes left under
/// `limit` fail with [`ErrorKind::ValueTooLarge`] before they are read.
pub fn decode_from_reader_with_limit<T: RlpDecodable, R: io::Read>(
    reader: R,
    limit: u64,
) -> Result<T> {
    T::rlp_decode(&mut Stream::from_reader_with_limit(reader, limit))
}
