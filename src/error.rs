use thiserror::Error;

use crate::{Atom, FieldId};

/// Specific kinds of errors that can occur when decoding Voxa data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("input truncated: need {needed} bytes, have {available}")]
    TruncatedInput { needed: usize, available: usize },

    #[error("invalid atom: {0:#02x}")]
    InvalidAtom(u8),

    #[error("atom mismatch: expected {expected}, got {actual}")]
    AtomMismatch { expected: &'static str, actual: Atom },

    #[error("destination {destination} cannot hold a value of atom {actual}")]
    DestinationMismatch {
        destination: &'static str,
        actual: Atom,
    },

    #[error("invalid frame length {0} (must be at least 2)")]
    InvalidLength(u64),

    #[error("varint does not terminate within 10 bytes")]
    InvalidVarint,

    #[error("invalid boolean value: {0:#02x}")]
    InvalidBool(u8),

    #[error("invalid UTF-8 in text")]
    InvalidUtf8,

    #[error("invalid RFC 3339 timestamp")]
    InvalidTimestamp,

    #[error("malformed textual {0}")]
    InvalidTextual(&'static str),

    #[error("value does not fit in {0}")]
    IntegerOverflow(Atom),

    #[error("extra data after decoding: {bytes_remaining} bytes remaining")]
    ExtraData { bytes_remaining: usize },

    #[error("nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("frame of {size} bytes exceeds the block size limit of {limit}")]
    BlockTooLarge { size: u64, limit: usize },

    #[error("container holds {count} items, more than the limit of {limit}")]
    TooManyItems { count: usize, limit: usize },

    #[error("operation not supported")]
    NotSupported,
}

/// Error type returned when decoding Voxa binary or textual data fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("decode error: {kind}")]
pub struct DecodeError {
    kind: DecodeErrorKind,
}

impl DecodeError {
    /// Creates a new DecodeError with the given kind.
    pub const fn new(kind: DecodeErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the specific kind of decode error that occurred.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// True for every error caused by input ending early.
    pub fn is_truncation(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::TruncatedInput { .. })
    }
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Problems with the tag annotations of an aggregate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("field {field:?} requires an id tag")]
    MissingTag { field: &'static str },

    #[error("id tag {tag:?} of field {field:?} must contain only digits")]
    TagNotNumeric {
        field: &'static str,
        tag: &'static str,
    },

    #[error("id tag {tag:?} of field {field:?} exceeds 255")]
    TagOutOfRange {
        field: &'static str,
        tag: &'static str,
    },

    #[error("id tag {0} is used by more than one field")]
    DuplicateTag(FieldId),

    #[error("map has {0} entries, at most 255 fit in a record")]
    TooManyEntries(usize),

    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("the invalid atom cannot describe a field")]
    InvalidAtom,
}

/// Specific kinds of errors that can occur when encoding Voxa data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeErrorKind {
    #[error("{codec} codec cannot encode a value of atom {actual}")]
    UnsupportedType { codec: &'static str, actual: Atom },

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },

    #[error("year {year} cannot be written as an RFC 3339 timestamp")]
    TimeOutOfRange { year: i32 },

    #[error("operation not supported")]
    NotSupported,
}

/// Error type returned when encoding to Voxa binary or textual form fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("encode error: {kind}")]
pub struct EncodeError {
    kind: EncodeErrorKind,
}

impl EncodeError {
    /// Creates a new EncodeError with the given kind.
    pub const fn new(kind: EncodeErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the specific kind of encode error that occurred.
    pub fn kind(&self) -> &EncodeErrorKind {
        &self.kind
    }
}

impl From<SchemaError> for EncodeError {
    fn from(err: SchemaError) -> Self {
        Self::new(EncodeErrorKind::Schema(err))
    }
}

/// Result type for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;
