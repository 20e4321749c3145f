use crate::{EncodeBuffer, Kind, Result, RlpDecodable, RlpEncodable, Stream};
use bytes::Bytes;
use core::fmt;

/// An RLP item of unknown type.
///
/// Decoding into a `Value` accepts any canonical encoding and keeps its tree
/// structure. Single bytes below `0x80` become one-byte strings.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A byte string.
    Bytes(Bytes),
    /// A list of items.
    List(Vec<Value>),
}

impl Value {
    /// Returns the string content, or `None` for a list.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::List(_) => None,
        }
    }

    /// Returns the list items, or `None` for a string.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::Bytes(_) => None,
            Self::List(items) => Some(items),
        }
    }

    /// Returns `true` if this is a list.
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Bytes(Bytes::new())
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(b) => {
                f.write_str("0x")?;
                b.iter().try_for_each(|b| write!(f, "{b:02x}"))
            }
            Self::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl RlpEncodable for Value {
    fn rlp_encode(&self, out: &mut EncodeBuffer) -> Result<()> {
        match self {
            Self::Bytes(b) => {
                out.write_bytes(b);
                Ok(())
            }
            Self::List(items) => crate::encode_list::<_, Self>(items, out),
        }
    }

    fn rlp_is_zero(&self) -> bool {
        matches!(self, Self::Bytes(b) if b.is_empty())
    }
}

impl RlpDecodable for Value {
    fn rlp_decode(s: &mut Stream<'_>) -> Result<Self> {
        match s.kind()?.0 {
            Kind::Byte | Kind::String => s.bytes().map(|b| Self::Bytes(b.into())),
            Kind::List => Vec::rlp_decode(s).map(Self::List),
        }
    }
}
