use crate::header::{Kind, NilKind};
use core::fmt;

/// RLP result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// RLP error with byte position and field context.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Error {
    /// The byte position in the input where the error occurred.
    pub bytepos: usize,
    /// The kind of error.
    pub kind: ErrorKind,
    /// The innermost struct field being processed when the error occurred.
    pub context: Option<FieldContext>,
}

/// Names the struct field an [`Error`] was raised in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldContext {
    /// Fully qualified name of the struct type.
    pub type_name: &'static str,
    /// Name of the field (or its index for tuple structs).
    pub field: &'static str,
}

impl Error {
    /// Creates a new error with the given kind and byte position 0.
    #[inline]
    pub const fn new(kind: ErrorKind) -> Self {
        Self { bytepos: 0, kind, context: None }
    }

    /// Creates a new error with the given kind and byte position.
    #[inline]
    pub const fn with_bytepos(kind: ErrorKind, bytepos: usize) -> Self {
        Self { bytepos, kind, context: None }
    }

    /// Attaches field context, unless a more specific one is already present.
    #[inline]
    pub const fn with_field(mut self, type_name: &'static str, field: &'static str) -> Self {
        if self.context.is_none() {
            self.context = Some(FieldContext { type_name, field });
        }
        self
    }

    /// Returns `true` if this is the end-of-list signal rather than a failure.
    #[inline]
    pub const fn is_end_of_list(&self) -> bool {
        matches!(self.kind, ErrorKind::EndOfList)
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<AnnotationError> for Error {
    #[inline]
    fn from(err: AnnotationError) -> Self {
        Self::new(ErrorKind::Annotation(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Self::new(ErrorKind::InputTooShort),
            kind => Self::new(ErrorKind::Io(kind)),
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)?;
        if let Some(ctx) = &self.context {
            write!(f, ", in {}.{}", ctx.type_name, ctx.field)?;
        }
        write!(f, " (at byte {})", self.bytepos)
    }
}

/// RLP error type.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Size information is not minimal, or a single byte below `0x80` carries a head.
    NonCanonicalSize,
    /// Integer content has a leading zero, or zero was given as the byte `0x00`.
    NonCanonicalInt,
    /// Expected a string or byte, got a list.
    ExpectedString,
    /// Expected a list, got a string or byte.
    ExpectedList,
    /// An element claims more bytes than its enclosing list has left.
    ElementTooLarge,
    /// A value claims more bytes than the input has left.
    ValueTooLarge,
    /// Integer does not fit the target type.
    Overflow,
    /// The innermost list has no more elements.
    EndOfList,
    /// The input list has fewer elements than the struct requires.
    TooFewElements,
    /// The input list has more elements than the struct accepts.
    TooManyElements,
    /// `list_end` was called with unread bytes left in the list.
    ListNotExhausted,
    /// `list_end` was called outside of any list.
    NotInList,
    /// Big integers must not be negative.
    NegativeBigInteger,
    /// Overran input while decoding.
    InputTooShort,
    /// Input contains trailing data after the value.
    MoreThanOneValue,
    /// Expected a payload of a specific size, got an unexpected size.
    UnexpectedLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },
    /// An empty value of the wrong kind was given for an absent field.
    WrongNilKind {
        /// The kind that encodes an absent value for the field.
        expected: NilKind,
        /// The kind found in the input.
        got: Kind,
    },
    /// Boolean content was neither 0 nor 1.
    InvalidBool,
    /// String content is not valid UTF-8.
    InvalidUtf8,
    /// A struct field annotation is invalid.
    Annotation(AnnotationError),
    /// No codec is registered for a dynamically typed value.
    UnregisteredType,
    /// A dynamically typed value does not match its registry entry.
    TypeMismatch,
    /// The underlying reader failed.
    Io(std::io::ErrorKind),
    /// Custom error.
    Custom(&'static str),
}

impl std::error::Error for ErrorKind {}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonCanonicalSize => f.write_str("non-canonical size information"),
            Self::NonCanonicalInt => f.write_str("non-canonical integer format"),
            Self::ExpectedString => f.write_str("expected string or byte"),
            Self::ExpectedList => f.write_str("expected list"),
            Self::ElementTooLarge => f.write_str("element is larger than containing list"),
            Self::ValueTooLarge => f.write_str("value size exceeds available input length"),
            Self::Overflow => f.write_str("integer overflow"),
            Self::EndOfList => f.write_str("end of list"),
            Self::TooFewElements => f.write_str("too few elements"),
            Self::TooManyElements => f.write_str("input list has too many elements"),
            Self::ListNotExhausted => f.write_str("list end called with unread elements"),
            Self::NotInList => f.write_str("list end called outside of any list"),
            Self::NegativeBigInteger => f.write_str("cannot encode negative big integer"),
            Self::InputTooShort => f.write_str("input too short"),
            Self::MoreThanOneValue => f.write_str("input contains more than one value"),
            Self::UnexpectedLength { expected, got } => {
                write!(f, "input value has wrong size {got}, want {expected}")
            }
            Self::WrongNilKind { expected, got } => {
                write!(f, "wrong kind of empty value (got {got}, want {expected})")
            }
            Self::InvalidBool => f.write_str("invalid boolean value"),
            Self::InvalidUtf8 => f.write_str("invalid utf8 string"),
            Self::Annotation(err) => fmt::Display::fmt(err, f),
            Self::UnregisteredType => f.write_str("type is not registered"),
            Self::TypeMismatch => f.write_str("value does not match registered type"),
            Self::Io(kind) => write!(f, "read failed: {kind}"),
            Self::Custom(err) => f.write_str(err),
        }
    }
}

/// An invalid `#[rlp(...)]` field annotation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnnotationError {
    /// Struct the field belongs to.
    pub type_name: &'static str,
    /// Offending field.
    pub field: &'static str,
    /// Offending annotation token.
    pub tag: &'static str,
    /// What is wrong with it.
    pub reason: AnnotationReason,
}

/// Why a field annotation was rejected.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnnotationReason {
    /// The token is not a known annotation.
    UnknownTag,
    /// `nil` annotations need an `Option` field.
    NilOnNonOptional,
    /// `optional` and `tail` are mutually exclusive.
    OptionalWithTail,
    /// `tail` must be on the last field.
    TailNotLast,
    /// `tail` needs a sequence field.
    TailNotSequence,
    /// A field after an optional field must also be optional.
    MustBeOptional {
        /// The earlier optional field.
        preceding: &'static str,
    },
}

impl std::error::Error for AnnotationError {}

impl fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid struct tag {:?} for {}.{}", self.tag, self.type_name, self.field)?;
        match self.reason {
            AnnotationReason::UnknownTag => f.write_str(" (unknown tag)"),
            AnnotationReason::NilOnNonOptional => {
                f.write_str(" (field is not an Option, nil tags are not allowed)")
            }
            AnnotationReason::OptionalWithTail => {
                f.write_str(" (optional and tail cannot be combined)")
            }
            AnnotationReason::TailNotLast => f.write_str(" (must be on last field)"),
            AnnotationReason::TailNotSequence => f.write_str(" (field type is not a sequence)"),
            AnnotationReason::MustBeOptional { preceding } => {
                write!(f, " (field must be optional because preceding field {preceding:?} is)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_new() {
        let e = Error::new(ErrorKind::Overflow);
        assert_eq!(e.bytepos, 0);
        assert_eq!(e.kind, ErrorKind::Overflow);
        assert_eq!(e.context, None);
    }

    #[test]
    fn error_display() {
        let e = Error::with_bytepos(ErrorKind::Overflow, 10);
        assert_eq!(e.to_string(), "integer overflow (at byte 10)");
    }

    #[test]
    fn error_display_field_context() {
        let e = Error::with_bytepos(ErrorKind::TooFewElements, 3).with_field("Header", "number");
        assert_eq!(e.to_string(), "too few elements, in Header.number (at byte 3)");
    }

    #[test]
    fn innermost_field_context_wins() {
        let e = Error::new(ErrorKind::ExpectedList).with_field("Inner", "a").with_field("Outer", "b");
        assert_eq!(e.context, Some(FieldContext { type_name: "Inner", field: "a" }));
    }

    #[test]
    fn error_display_wrong_nil_kind() {
        let e = Error::new(ErrorKind::WrongNilKind { expected: NilKind::List, got: Kind::String });
        assert_eq!(e.to_string(), "wrong kind of empty value (got String, want List) (at byte 0)");
    }

    #[test]
    fn annotation_display() {
        let e = AnnotationError {
            type_name: "Tx",
            field: "data",
            tag: "tail",
            reason: AnnotationReason::TailNotLast,
        };
        assert_eq!(e.to_string(), r#"invalid struct tag "tail" for Tx.data (must be on last field)"#);
    }

    #[test]
    fn io_errors_map_to_input_too_short() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert_eq!(Error::from(eof).kind, ErrorKind::InputTooShort);
        let other = std::io::Error::from(std::io::ErrorKind::BrokenPipe);
        assert_eq!(Error::from(other).kind, ErrorKind::Io(std::io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn end_of_list_is_a_signal() {
        assert!(Error::new(ErrorKind::EndOfList).is_end_of_list());
        assert!(!Error::new(ErrorKind::TooFewElements).is_end_of_list());
    }
}
