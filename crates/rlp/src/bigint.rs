//! Codec impls for arbitrary-precision integers from `num-bigint`.
//!
//! Big integers encode like the fixed-width ones: big-endian, without leading
//! zeros, with zero as the empty string. Negative values cannot be encoded.
//! Decoding is bounded by [`Stream::max_big_int_bytes`].

use crate::{EncodeBuffer, Result, RlpDecodable, RlpEncodable, Shape, Stream};
use num_bigint::{BigInt, BigUint, Sign};

impl RlpEncodable for BigUint {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        out.write_big_uint(self);
        Ok(())
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        self.bits() == 0
    }

    #[inline]
    fn rlp_shape() -> Shape {
        Shape::String
    }
}

impl RlpEncodable for BigInt {
    #[inline]
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        out.write_big_int(self)
    }

    #[inline]
    fn rlp_is_zero(&self) -> bool {
        self.sign() == Sign::NoSign
    }

    #[inline]
    fn rlp_shape() -> Shape {
        Shape::String
    }
}

impl RlpDecodable for BigUint {
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        s.big_uint()
    }
}

impl RlpDecodable for BigInt {
    #[inline]
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        s.big_int()
    }
}
