use crate::{
    header::{put_head, to_be_bytes_trimmed},
    pool::{BufferPool, PooledBuffer},
    ErrorKind, FieldTag, Result, Shape, EMPTY_LIST_CODE, EMPTY_STRING_CODE,
};
use arrayvec::ArrayVec;
use bytes::{BufMut, Bytes, BytesMut};
use core::{
    borrow::Borrow,
    marker::{PhantomData, PhantomPinned},
};
use num_bigint::{BigInt, BigUint, Sign};
use std::{borrow::Cow, io, rc::Rc, sync::Arc};

/// A list whose head is synthesized when the buffer is materialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListHead {
    /// Index into the content where the list's elements begin.
    pub offset: usize,
    /// Size of the list's content. Holds the head total at `list_start` until the list is closed.
    pub size: usize,
}

impl ListHead {
    /// Encodes this head.
    #[inline]
    pub fn encode(&self) -> ArrayVec<u8, 9> {
        let mut head = [0u8; 9];
        let n = put_head(&mut head, EMPTY_LIST_CODE, self.size as u64);
        head[..n].iter().copied().collect()
    }
}

/// Handle to an open list, returned by [`EncodeBuffer::list_start`].
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an open list must be closed with `list_end`"]
pub struct ListToken(usize);

/// Accumulates the encoding of a value.
///
/// List heads are not written when a list starts: their size is only known
/// once the list ends. Instead each list records a [`ListHead`] and the head
/// bytes are interleaved with the content when the buffer is materialized.
#[derive(Clone, Debug, Default)]
pub struct EncodeBuffer {
    content: Vec<u8>,
    heads: Vec<ListHead>,
    heads_size: usize,
}

impl EncodeBuffer {
    /// Creates an empty buffer.
    #[inline]
    pub const fn new() -> Self {
        Self { content: Vec::new(), heads: Vec::new(), heads_size: 0 }
    }

    /// Returns the size of the encoding written so far, heads included.
    #[inline]
    pub fn len(&self) -> usize {
        self.content.len() + self.heads_size
    }

    /// Returns `true` if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.heads.is_empty()
    }

    /// Clears the buffer, keeping its allocations.
    #[inline]
    pub fn reset(&mut self) {
        self.content.clear();
        self.heads.clear();
        self.heads_size = 0;
    }

    /// Returns the finalized list heads in start order.
    #[inline]
    pub fn heads(&self) -> &[ListHead] {
        &self.heads
    }

    /// Writes a boolean.
    #[inline]
    pub fn write_bool(&mut self, b: bool) {
        self.content.push(if b { 0x01 } else { EMPTY_STRING_CODE });
    }

    /// Writes an unsigned integer.
    #[inline]
    pub fn write_uint64(&mut self, i: u64) {
        if i == 0 {
            self.content.push(EMPTY_STRING_CODE);
        } else if i < EMPTY_STRING_CODE as u64 {
            self.content.push(i as u8);
        } else {
            let be;
            let be = to_be_bytes_trimmed!(be, i);
            self.content.push(EMPTY_STRING_CODE + be.len() as u8);
            self.content.extend_from_slice(be);
        }
    }

    /// Writes a 128-bit unsigned integer.
    #[inline]
    pub fn write_u128(&mut self, i: u128) {
        match u64::try_from(i) {
            Ok(small) => self.write_uint64(small),
            Err(_) => {
                let be;
                let be = to_be_bytes_trimmed!(be, i);
                self.content.push(EMPTY_STRING_CODE + be.len() as u8);
                self.content.extend_from_slice(be);
            }
        }
    }

    /// Writes a byte string.
    #[inline]
    pub fn write_bytes(&mut self, b: &[u8]) {
        if let [single] = b {
            if *single < EMPTY_STRING_CODE {
                self.content.push(*single);
                return;
            }
        }
        self.write_string_head(b.len());
        self.content.extend_from_slice(b);
    }

    /// Writes a text string.
    #[inline]
    pub fn write_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes())
    }

    /// Writes a non-negative big integer.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NegativeBigInteger`] if `i` is negative.
    pub fn write_big_int(&mut self, i: &BigInt) -> Result<()> {
        if i.sign() == Sign::Minus {
            return Err(ErrorKind::NegativeBigInteger.into());
        }
        self.write_big_uint(i.magnitude());
        Ok(())
    }

    /// Writes an unsigned big integer.
    pub fn write_big_uint(&mut self, i: &BigUint) {
        match u64::try_from(i) {
            Ok(small) => self.write_uint64(small),
            Err(_) => self.write_bytes(&i.to_bytes_be()),
        }
    }

    /// Appends an already encoded item verbatim.
    #[inline]
    pub fn write_raw(&mut self, encoded: &[u8]) {
        self.content.extend_from_slice(encoded);
    }

    /// Starts a list. Everything written until the matching
    /// [`list_end`](Self::list_end) becomes the list's content.
    #[inline]
    pub fn list_start(&mut self) -> ListToken {
        self.heads.push(ListHead { offset: self.content.len(), size: self.heads_size });
        ListToken(self.heads.len() - 1)
    }

    /// Closes the list opened by `token`.
    #[inline]
    pub fn list_end(&mut self, token: ListToken) {
        let len = self.len();
        let head = &mut self.heads[token.0];
        head.size = len - head.offset - head.size;
        self.heads_size += crate::header::head_size(head.size);
    }

    /// Materializes the encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        self.write_to(&mut out);
        out
    }

    /// Materializes the encoding into `out`.
    pub fn write_to(&self, out: &mut dyn BufMut) {
        let mut pos = 0;
        for head in &self.heads {
            out.put_slice(&self.content[pos..head.offset]);
            out.put_slice(&head.encode());
            pos = head.offset;
        }
        out.put_slice(&self.content[pos..]);
    }

    /// Materializes the encoding into an I/O writer.
    ///
    /// # Errors
    ///
    /// Returns any error of the writer.
    pub fn write_to_io<W: io::Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        let mut pos = 0;
        for head in &self.heads {
            w.write_all(&self.content[pos..head.offset])?;
            w.write_all(&head.encode())?;
            pos = head.offset;
        }
        w.write_all(&self.content[pos..])
    }

    #[inline]
    fn write_string_head(&mut self, size: usize) {
        let mut head = [0u8; 9];
        let n = put_head(&mut head, EMPTY_STRING_CODE, size as u64);
        self.content.extend_from_slice(&head[..n]);
    }
}

/// A type that can be encoded via RLP.
pub trait RlpEncodable {
    /// Encodes the type into the `out` buffer.
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()>;

    /// Encodes the type as a struct field carrying `tag`.
    ///
    /// Only containers whose encoding depends on the annotation override this.
    #[inline]
    fn rlp_encode_tagged(&self, tag: &FieldTag, out: &mut EncodeBuffer) -> Result<()> {
        let _ = tag;
        self.rlp_encode(out)
    }

    /// Returns `true` if this is the zero value of its type.
    ///
    /// Trailing optional struct fields holding their zero value are omitted.
    #[inline]
    fn rlp_is_zero(&self) -> bool {
        false
    }

    /// Returns the structural shape of the type.
    #[inline]
    fn rlp_shape() -> Shape
    where
        Self: Sized,
    {
        Shape::List
    }
}

// The existence of this function makes the compiler catch if the RlpEncodable
// trait is "object-safe" or not.
fn _assert_trait_object(_b: &dyn RlpEncodable) {}

impl RlpEncodable for [u8] {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        out.write_bytes(self);
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: ?Sized> RlpEncodable for PhantomData<T> {
    #[inline]
    fn rlp_encode(&self, _out: &mut EncodeBuffer) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        true
    }
}

impl RlpEncodable for PhantomPinned {
    #[inline]
    fn rlp_encode(&self, _out: &mut EncodeBuffer) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        true
    }
}

impl<const N: usize> RlpEncodable for [u8; N] {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        out.write_bytes(self);
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        self.iter().all(|&b| b == 0)
    }

    #[inline]
    fn rlp_shape() -> Shape {
        Shape::String
    }
}

impl RlpEncodable for str {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        out.write_string(self);
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl RlpEncodable for bool {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        out.write_bool(*self);
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        !*self
    }

    #[inline]
    fn rlp_shape() -> Shape {
        Shape::String
    }
}

macro_rules! uint_impl {
    ($($t:ty),+ $(,)?) => {$(
        impl RlpEncodable for $t {
            #[inline]
            fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
                out.write_uint64(*self as u64);
                Ok(())
            }

            #[inline]
            fn rlp_is_zero(&self) -> bool {
                *self == 0
            }

            #[inline]
            fn rlp_shape() -> Shape {
                Shape::String
            }
        }
    )+};
}

uint_impl!(u8, u16, u32, u64, usize);

impl RlpEncodable for u128 {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        out.write_u128(*self);
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        *self == 0
    }

    #[inline]
    fn rlp_shape() -> Shape {
        Shape::String
    }
}

macro_rules! bytes_impl {
    ($($(#[$attr:meta])* [$($gen:tt)*] $t:ty),+ $(,)?) => {$(
        $(#[$attr])*
        impl<$($gen)*> RlpEncodable for $t {
            #[inline]
            fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
                out.write_bytes(<Self as AsRef<[u8]>>::as_ref(self));
                Ok(())
            }

            #[inline]
            fn rlp_is_zero(&self) -> bool {
                self.is_empty()
            }

            #[inline]
            fn rlp_shape() -> Shape {
                Shape::String
            }
        }
    )+};
}

bytes_impl! {
    [] String,
    [] Bytes,
    [] BytesMut,
    [const N: usize] ArrayVec<u8, N>,
}

impl<T: RlpEncodable> RlpEncodable for Vec<T> {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        encode_list(self, out)
    }

    fn rlp_encode_tagged(&self, tag: &FieldTag, out: &mut EncodeBuffer) -> Result<()> {
        if !tag.tail {
            return self.rlp_encode(out);
        }
        self.iter().try_for_each(|value| value.rlp_encode(out))
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        self.is_empty()
    }

    #[inline]
    fn rlp_shape() -> Shape {
        Shape::Sequence
    }
}

impl<T: RlpEncodable> RlpEncodable for Option<T> {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        self.rlp_encode_tagged(&FieldTag::NONE, out)
    }

    fn rlp_encode_tagged(&self, tag: &FieldTag, out: &mut EncodeBuffer) -> Result<()> {
        match self {
            Some(value) => value.rlp_encode(out),
            None => {
                let nil = tag.nil.unwrap_or_else(|| T::rlp_shape().default_nil());
                out.content.push(nil.code());
                Ok(())
            }
        }
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        self.is_none()
    }

    #[inline]
    fn rlp_shape() -> Shape {
        Shape::Optional(T::rlp_shape().default_nil())
    }
}

macro_rules! deref_impl {
    ($($(#[$attr:meta])* [$($gen:tt)*] $t:ty => $shape:expr),+ $(,)?) => {$(
        $(#[$attr])*
        impl<$($gen)*> RlpEncodable for $t {
            #[inline]
            fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
                (**self).rlp_encode(out)
            }

            #[inline]
            fn rlp_encode_tagged(&self, tag: &FieldTag, out: &mut EncodeBuffer) -> Result<()> {
                (**self).rlp_encode_tagged(tag, out)
            }

            #[inline]
            fn rlp_is_zero(&self) -> bool {
                (**self).rlp_is_zero()
            }

            #[inline]
            fn rlp_shape() -> Shape {
                $shape
            }
        }
    )+};
}

deref_impl! {
    [T: RlpEncodable] &T => T::rlp_shape(),
    [T: RlpEncodable] &mut T => T::rlp_shape(),
    [T: RlpEncodable] Box<T> => T::rlp_shape(),
    [T: ToOwned + RlpEncodable] Cow<'_, T> => T::rlp_shape(),
    [T: RlpEncodable] Rc<T> => T::rlp_shape(),
    [T: RlpEncodable] Arc<T> => T::rlp_shape(),
}

// Unsized targets are always byte strings.
deref_impl! {
    [] &str => Shape::String,
    [] &mut str => Shape::String,
    [] Box<str> => Shape::String,
    [] Cow<'_, str> => Shape::String,
    [] Rc<str> => Shape::String,
    [] Arc<str> => Shape::String,
    [] &[u8] => Shape::String,
    [] &mut [u8] => Shape::String,
    [] Box<[u8]> => Shape::String,
    [] Cow<'_, [u8]> => Shape::String,
    [] Rc<[u8]> => Shape::String,
    [] Arc<[u8]> => Shape::String,
}

mod std_support {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    impl RlpEncodable for IpAddr {
        #[inline]
        fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
            match self {
                Self::V4(ip) => ip.rlp_encode(out),
                Self::V6(ip) => ip.rlp_encode(out),
            }
        }

        #[inline]
        fn rlp_is_zero(&self) -> bool {
            self.is_unspecified()
        }

        #[inline]
        fn rlp_shape() -> Shape {
            Shape::String
        }
    }

    impl RlpEncodable for Ipv4Addr {
        #[inline]
        fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
            self.octets().rlp_encode(out)
        }

        #[inline]
        fn rlp_is_zero(&self) -> bool {
            self.is_unspecified()
        }

        #[inline]
        fn rlp_shape() -> Shape {
            Shape::String
        }
    }

    impl RlpEncodable for Ipv6Addr {
        #[inline]
        fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
            self.octets().rlp_encode(out)
        }

        #[inline]
        fn rlp_is_zero(&self) -> bool {
            self.is_unspecified()
        }

        #[inline]
        fn rlp_shape() -> Shape {
            Shape::String
        }
    }
}

/// Encode a value.
///
/// The scratch buffer is taken from the global [`BufferPool`].
///
/// # Errors
///
/// Returns an error if the value cannot be encoded, e.g. a negative big
/// integer or a struct with invalid field annotations.
#[inline]
pub fn encode<T: RlpEncodable>(value: T) -> Result<Vec<u8>> {
    let mut buf = BufferPool::global().acquire();
    value.rlp_encode(&mut buf)?;
    Ok(buf.to_bytes())
}

/// Encode a value into `out`.
///
/// # Errors
///
/// See [`encode`].
#[inline]
pub fn encode_to<T: RlpEncodable>(value: T, out: &mut dyn BufMut) -> Result<()> {
    let mut buf = BufferPool::global().acquire();
    value.rlp_encode(&mut buf)?;
    buf.write_to(out);
    Ok(())
}

/// Encode a value into an I/O writer.
///
/// # Errors
///
/// See [`encode`]. Writer failures are reported as [`ErrorKind::Io`].
pub fn encode_to_writer<T: RlpEncodable, W: io::Write>(value: T, mut w: W) -> Result<()> {
    let mut buf = BufferPool::global().acquire();
    value.rlp_encode(&mut buf)?;
    buf.write_to_io(&mut w)?;
    Ok(())
}

/// Encode a value, returning its size and a reader over the encoding.
///
/// The reader streams the encoding without materializing it and returns the
/// scratch buffer to the pool once exhausted or dropped.
///
/// # Errors
///
/// See [`encode`].
pub fn encode_to_reader<T: RlpEncodable>(value: T) -> Result<(usize, EncodeReader)> {
    let mut buf = BufferPool::global().acquire();
    value.rlp_encode(&mut buf)?;
    Ok((buf.len(), EncodeReader::new(buf)))
}

/// Encode a value that is known to be encodable.
///
/// # Panics
///
/// Panics if encoding fails.
#[track_caller]
pub fn must_encode<T: RlpEncodable>(value: T) -> Vec<u8> {
    match encode(value) {
        Ok(bytes) => bytes,
        Err(err) => panic!("rlp: {err}"),
    }
}

/// Encode a list of items.
#[inline]
pub fn encode_list<B, T>(values: &[B], out: &mut EncodeBuffer) -> Result<()>
where
    B: Borrow<T>,
    T: ?Sized + RlpEncodable,
{
    let list = out.list_start();
    for value in values {
        value.borrow().rlp_encode(out)?;
    }
    out.list_end(list);
    Ok(())
}

/// Encode all items from an iterator as a list.
#[inline]
pub fn encode_iter<I, B, T>(values: I, out: &mut EncodeBuffer) -> Result<()>
where
    I: IntoIterator<Item = B>,
    B: Borrow<T>,
    T: ?Sized + RlpEncodable,
{
    let list = out.list_start();
    for value in values {
        value.borrow().rlp_encode(out)?;
    }
    out.list_end(list);
    Ok(())
}

/// An [`io::Read`] over the encoding held by a pooled buffer.
pub struct EncodeReader {
    buf: Option<PooledBuffer<'static>>,
    piece: ArrayVec<u8, 9>,
    piece_pos: usize,
    head_pos: usize,
    content_pos: usize,
}

impl core::fmt::Debug for EncodeReader {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EncodeReader").field("exhausted", &self.buf.is_none()).finish()
    }
}

impl EncodeReader {
    fn new(buf: PooledBuffer<'static>) -> Self {
        Self { buf: Some(buf), piece: ArrayVec::new(), piece_pos: 0, head_pos: 0, content_pos: 0 }
    }
}

impl io::Read for EncodeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let Some(buf) = self.buf.as_deref() else {
            return Ok(0);
        };

        let mut written = 0;
        let mut exhausted = false;
        while written < out.len() {
            if self.piece_pos < self.piece.len() {
                let n = copy_prefix(&self.piece[self.piece_pos..], &mut out[written..]);
                self.piece_pos += n;
                written += n;
                continue;
            }

            let next_head = buf.heads.get(self.head_pos);
            let end = next_head.map_or(buf.content.len(), |h| h.offset);
            if self.content_pos < end {
                let n = copy_prefix(&buf.content[self.content_pos..end], &mut out[written..]);
                self.content_pos += n;
                written += n;
                continue;
            }

            match next_head {
                Some(head) => {
                    self.piece = head.encode();
                    self.piece_pos = 0;
                    self.head_pos += 1;
                }
                None => {
                    exhausted = true;
                    break;
                }
            }
        }

        if exhausted {
            self.buf = None;
        }
        Ok(written)
    }
}

fn copy_prefix(src: &[u8], dst: &mut [u8]) -> usize {
    let n = src.len().min(dst.len());
    dst[..n].copy_from_slice(&src[..n]);
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use std::io::Read;

    fn encoded_list<T: RlpEncodable + Clone>(t: &[T]) -> Vec<u8> {
        let mut out1 = EncodeBuffer::new();
        encode_list(t, &mut out1).unwrap();

        let v = t.to_vec();
        let out2 = encode(&v).unwrap();
        assert_eq!(out1.to_bytes(), out2);
        assert_eq!(out1.len(), out2.len());

        out2
    }

    #[test]
    fn rlp_str() {
        assert_eq!(encode("").unwrap()[..], hex!("80")[..]);
        assert_eq!(encode("{").unwrap()[..], hex!("7b")[..]);
        assert_eq!(encode("test str").unwrap()[..], hex!("887465737420737472")[..]);
    }

    #[test]
    fn rlp_strings() {
        assert_eq!(encode(hex!("")).unwrap()[..], hex!("80")[..]);
        assert_eq!(encode(hex!("01")).unwrap()[..], hex!("01")[..]);
        assert_eq!(encode(hex!("7B")).unwrap()[..], hex!("7b")[..]);
        assert_eq!(encode(hex!("80")).unwrap()[..], hex!("8180")[..]);
        assert_eq!(encode(hex!("ABBA")).unwrap()[..], hex!("82abba")[..]);
    }

    #[test]
    fn string_boundary_at_56() {
        let short = encode([0xAA_u8; 55]).unwrap();
        assert_eq!(short.len(), 56);
        assert_eq!(short[0], 0xB7);

        let long = encode([0xAA_u8; 56]).unwrap();
        assert_eq!(long.len(), 58);
        assert_eq!(long[..2], hex!("b838"));
    }

    #[test]
    fn rlp_bool() {
        assert_eq!(encode(true).unwrap(), hex!("01"));
        assert_eq!(encode(false).unwrap(), hex!("80"));
    }

    fn c<T, U: From<T>>(
        it: impl IntoIterator<Item = (T, &'static [u8])>,
    ) -> impl Iterator<Item = (U, &'static [u8])> {
        it.into_iter().map(|(k, v)| (k.into(), v))
    }

    fn u8_fixtures() -> impl IntoIterator<Item = (u8, &'static [u8])> {
        vec![
            (0, &hex!("80")[..]),
            (1, &hex!("01")[..]),
            (0x7F, &hex!("7F")[..]),
            (0x80, &hex!("8180")[..]),
        ]
    }

    fn u16_fixtures() -> impl IntoIterator<Item = (u16, &'static [u8])> {
        c(u8_fixtures()).chain(vec![(0x400, &hex!("820400")[..])])
    }

    fn u32_fixtures() -> impl IntoIterator<Item = (u32, &'static [u8])> {
        c(u16_fixtures())
            .chain(vec![(0xFFCCB5, &hex!("83ffccb5")[..]), (0xFFCCB5DD, &hex!("84ffccb5dd")[..])])
    }

    fn u64_fixtures() -> impl IntoIterator<Item = (u64, &'static [u8])> {
        c(u32_fixtures()).chain(vec![
            (0xFFCCB5DDFF, &hex!("85ffccb5ddff")[..]),
            (0xFFCCB5DDFFEE1483, &hex!("88ffccb5ddffee1483")[..]),
        ])
    }

    fn u128_fixtures() -> impl IntoIterator<Item = (u128, &'static [u8])> {
        c(u64_fixtures()).chain(vec![(
            0x10203E405060708090A0B0C0D0E0F2,
            &hex!("8f10203e405060708090a0b0c0d0e0f2")[..],
        )])
    }

    macro_rules! uint_rlp_test {
        ($fixtures:expr) => {
            for (input, output) in $fixtures {
                assert_eq!(encode(input).unwrap(), output, "encode({input})");
            }
        };
    }

    #[test]
    fn rlp_uints() {
        uint_rlp_test!(u8_fixtures());
        uint_rlp_test!(u16_fixtures());
        uint_rlp_test!(u32_fixtures());
        uint_rlp_test!(u64_fixtures());
        uint_rlp_test!(u128_fixtures());
    }

    #[test]
    fn rlp_list() {
        assert_eq!(encoded_list::<u64>(&[]), hex!("c0"));
        assert_eq!(encoded_list::<u8>(&[0x00u8]), hex!("c180"));
        assert_eq!(encoded_list(&[0xFFCCB5_u64, 0xFFC0B5_u64]), hex!("c883ffccb583ffc0b5"));
        assert_eq!(encoded_list(&[1u32, 2, 3, 4, 5, 6, 7, 8]), hex!("c80102030405060708"));
    }

    #[test]
    fn rlp_list_of_borrowed() {
        let (a, b) = (0xFFCCB5_u64, 0xFFC0B5_u64);
        let mut out = EncodeBuffer::new();
        encode_list::<&u64, u64>(&[&a, &b], &mut out).unwrap();
        assert_eq!(out.to_bytes(), hex!("c883ffccb583ffc0b5"));

        let words = [String::from("cat"), String::from("dog")];
        let mut out = EncodeBuffer::new();
        encode_list::<String, str>(&words, &mut out).unwrap();
        assert_eq!(out.to_bytes(), hex!("c88363617483646f67"));
    }

    #[test]
    fn rlp_iter() {
        let mut out = EncodeBuffer::new();
        encode_iter::<_, _, u64>([0xFFCCB5_u64, 0xFFC0B5_u64].iter(), &mut out).unwrap();
        assert_eq!(out.to_bytes(), hex!("c883ffccb583ffc0b5"));
    }

    #[test]
    fn nested_lists() {
        // [ [], [[]], [ [], [[]] ] ]
        let mut buf = EncodeBuffer::new();
        let outer = buf.list_start();
        let a = buf.list_start();
        buf.list_end(a);
        let b = buf.list_start();
        let b1 = buf.list_start();
        buf.list_end(b1);
        buf.list_end(b);
        let c = buf.list_start();
        let c1 = buf.list_start();
        buf.list_end(c1);
        let c2 = buf.list_start();
        let c21 = buf.list_start();
        buf.list_end(c21);
        buf.list_end(c2);
        buf.list_end(c);
        buf.list_end(outer);
        assert_eq!(buf.to_bytes(), hex!("c7c0c1c0c3c0c1c0"));
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn long_list_head() {
        let strings = vec!["a".repeat(54); 2];
        let out = encode(&strings).unwrap();
        // two 55 byte items
        assert_eq!(out[..2], hex!("f86e"));
        assert_eq!(out.len(), 2 + 110);
    }

    #[test]
    fn list_boundary_at_56() {
        // 55 single byte items
        let short = encode(vec![1u8; 55]).unwrap();
        assert_eq!(short[0], 0xF7);
        assert_eq!(short.len(), 56);

        let long = encode(vec![1u8; 56]).unwrap();
        assert_eq!(long[..2], hex!("f838"));
        assert_eq!(long.len(), 58);
    }

    #[test]
    fn big_ints() {
        assert_eq!(encode(BigUint::from(0u8)).unwrap(), hex!("80"));
        assert_eq!(encode(BigInt::from(0)).unwrap(), hex!("80"));
        assert_eq!(encode(BigUint::from(1024u32)).unwrap(), hex!("820400"));
        let big = BigUint::from_bytes_be(&hex!("0102030405060708090a"));
        assert_eq!(encode(&big).unwrap(), hex!("8a0102030405060708090a"));
        assert_eq!(
            encode(BigInt::from(-1)).unwrap_err().kind,
            ErrorKind::NegativeBigInteger
        );
    }

    #[test]
    fn options_use_nil_kind() {
        assert_eq!(encode(None::<u64>).unwrap(), hex!("80"));
        assert_eq!(encode(None::<Vec<u64>>).unwrap(), hex!("c0"));
        assert_eq!(encode(Some(5u64)).unwrap(), hex!("05"));

        let mut buf = EncodeBuffer::new();
        let tag = FieldTag { nil: Some(crate::NilKind::List), ..FieldTag::NONE };
        None::<u64>.rlp_encode_tagged(&tag, &mut buf).unwrap();
        assert_eq!(buf.to_bytes(), hex!("c0"));
    }

    #[test]
    fn pointers_keep_the_inner_shape() {
        assert_eq!(<Box<u64> as RlpEncodable>::rlp_shape(), Shape::String);
        assert_eq!(<Arc<Vec<u64>> as RlpEncodable>::rlp_shape(), Shape::Sequence);
        assert_eq!(<Rc<str> as RlpEncodable>::rlp_shape(), Shape::String);
        assert_eq!(<&[u8] as RlpEncodable>::rlp_shape(), Shape::String);

        assert_eq!(encode(None::<Box<u64>>).unwrap(), hex!("80"));
        assert_eq!(encode(None::<Rc<Vec<u64>>>).unwrap(), hex!("c0"));
        assert_eq!(encode(Some(Box::new(5u64))).unwrap(), hex!("05"));
        assert_eq!(encode(Box::<str>::from("dog")).unwrap(), hex!("83646f67"));
        assert_eq!(encode(Cow::Borrowed(&b"dog"[..])).unwrap(), hex!("83646f67"));
    }

    #[test]
    fn tail_flattens() {
        let tag = FieldTag { tail: true, ..FieldTag::NONE };
        let mut buf = EncodeBuffer::new();
        vec![1u8, 2, 3].rlp_encode_tagged(&tag, &mut buf).unwrap();
        assert_eq!(buf.to_bytes(), hex!("010203"));
    }

    #[test]
    fn reader_streams_heads_and_content() {
        let value = vec![vec!["cat"], vec!["dog", "emu"]];
        let expected = encode(&value).unwrap();

        let (size, mut reader) = encode_to_reader(&value).unwrap();
        assert_eq!(size, expected.len());

        // read in small chunks to cross head and content boundaries
        let mut got = Vec::new();
        let mut chunk = [0u8; 3];
        loop {
            let n = reader.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            got.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn writer_output_matches() {
        let value = vec![0xFFCCB5_u64, 0xFFC0B5_u64];
        let mut out = Vec::new();
        encode_to_writer(&value, &mut out).unwrap();
        assert_eq!(out, hex!("c883ffccb583ffc0b5"));

        let mut out = BytesMut::new();
        encode_to(&value, &mut out).unwrap();
        assert_eq!(&out[..], hex!("c883ffccb583ffc0b5"));
    }

    #[test]
    #[should_panic(expected = "negative")]
    fn must_encode_panics() {
        must_encode(BigInt::from(-5));
    }

    #[test]
    fn ip_addrs() {
        use std::net::{IpAddr, Ipv4Addr};
        let ip = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(encode(ip).unwrap(), hex!("847f000001"));
    }
}
