#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Lets derive output name `::rlpkit` from inside this crate's own tests.
extern crate self as rlpkit;

mod bigint;

mod decode;
pub use decode::{
    decode, decode_buf, decode_from_reader, decode_from_reader_with_limit, RlpDecodable, Stream,
    DEFAULT_MAX_BIG_INT_BYTES,
};

mod error;
pub use error::{AnnotationError, AnnotationReason, Error, ErrorKind, FieldContext, Result};

mod encode;
pub use encode::{
    encode, encode_iter, encode_list, encode_to, encode_to_reader, encode_to_writer, must_encode,
    EncodeBuffer, EncodeReader, ListHead, ListToken, RlpEncodable,
};

mod header;
pub use header::{head_size, read_kind, Header, Kind, NilKind, PayloadView};

mod plan;
pub use plan::{plan_fields, FieldDesc, FieldPlan, FieldTag, PlannedField, RlpStruct, Shape};

mod pool;
pub use pool::{BufferPool, PooledBuffer};

mod raw;
pub use raw::{
    append_uint64, count_values, int_size, list_size, split, split_list, split_string,
    split_uint64, RawValue,
};

mod registry;
pub use registry::{struct_plan, Generator, RlpType, TypeInfo, TypeKey, TypeRegistry};

mod value;
pub use value::Value;

#[doc(no_inline)]
pub use bytes::{self, Buf, BufMut, Bytes, BytesMut};

#[doc(no_inline)]
pub use num_bigint::{self, BigInt, BigUint};

#[cfg(feature = "derive")]
#[doc(inline)]
pub use rlpkit_derive::{Rlp, RlpWrapper};

/// RLP prefix byte for 0-length string.
pub const EMPTY_STRING_CODE: u8 = 0x80;

/// RLP prefix byte for a 0-length array.
pub const EMPTY_LIST_CODE: u8 = 0xC0;

// Not public API.
#[doc(hidden)]
pub mod private {
    pub use core::{
        default::Default,
        option::Option::{self, None, Some},
        result::Result::{self, Err, Ok},
    };
    pub use std::{sync::Arc, vec::Vec};
}
