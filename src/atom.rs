use std::fmt;

use crate::{DecodeError, DecodeErrorKind, DecodeResult};

/// Identifies a field's or element's position within an aggregate.
///
/// Struct fields take it from their `#[voxa(id = N)]` tag, list elements
/// from their index and map entries from their sorted position.
pub type FieldId = u8;

/// Wire type identifiers used in the Voxa binary format.
///
/// Byte `2` is reserved and never produced or accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Atom {
    Invalid = 0x00,
    Text = 0x01,
    Int = 0x03,
    Int8 = 0x04,
    Int16 = 0x05,
    Int32 = 0x06,
    Int64 = 0x07,
    UInt = 0x08,
    UInt8 = 0x09,
    UInt16 = 0x0A,
    UInt32 = 0x0B,
    UInt64 = 0x0C,
    Boolean = 0x0D,
    Float32 = 0x0E,
    Float64 = 0x0F,
    Bytes = 0x10,
    List = 0x11,
    Record = 0x12,
    Time = 0x13,
}

impl Atom {
    /// Maps a wire byte to its atom. Returns `None` for the invalid sentinel,
    /// the reserved byte and anything out of range.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Atom::Text),
            0x03 => Some(Atom::Int),
            0x04 => Some(Atom::Int8),
            0x05 => Some(Atom::Int16),
            0x06 => Some(Atom::Int32),
            0x07 => Some(Atom::Int64),
            0x08 => Some(Atom::UInt),
            0x09 => Some(Atom::UInt8),
            0x0A => Some(Atom::UInt16),
            0x0B => Some(Atom::UInt32),
            0x0C => Some(Atom::UInt64),
            0x0D => Some(Atom::Boolean),
            0x0E => Some(Atom::Float32),
            0x0F => Some(Atom::Float64),
            0x10 => Some(Atom::Bytes),
            0x11 => Some(Atom::List),
            0x12 => Some(Atom::Record),
            0x13 => Some(Atom::Time),
            _ => None,
        }
    }

    pub(crate) fn decode(byte: u8) -> DecodeResult<Self> {
        Atom::from_byte(byte).ok_or_else(|| DecodeError::new(DecodeErrorKind::InvalidAtom(byte)))
    }

    /// True for the two atoms whose frames always carry a length prefix.
    pub fn is_container(self) -> bool {
        matches!(self, Atom::List | Atom::Record)
    }

    pub fn name(self) -> &'static str {
        match self {
            Atom::Invalid => "invalid",
            Atom::Text => "text",
            Atom::Int => "int",
            Atom::Int8 => "int8",
            Atom::Int16 => "int16",
            Atom::Int32 => "int32",
            Atom::Int64 => "int64",
            Atom::UInt => "uint",
            Atom::UInt8 => "uint8",
            Atom::UInt16 => "uint16",
            Atom::UInt32 => "uint32",
            Atom::UInt64 => "uint64",
            Atom::Boolean => "bool",
            Atom::Float32 => "float32",
            Atom::Float64 => "float64",
            Atom::Bytes => "bytes",
            Atom::List => "list",
            Atom::Record => "record",
            Atom::Time => "time",
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<Atom> for u8 {
    fn from(atom: Atom) -> u8 {
        atom as u8
    }
}
