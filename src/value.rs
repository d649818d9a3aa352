use bytes::Bytes;
use chrono::{DateTime, FixedOffset};

use crate::{Atom, FieldId};

/// Any value the Voxa format can carry.
///
/// Every codec reads and writes this type; the `Voxa` trait converts
/// native Rust types to and from it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),

    /// Platform-width signed integer (`isize`).
    Int(i64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),

    /// Platform-width unsigned integer (`usize`).
    UInt(u64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),

    Float32(f32),
    Float64(f64),

    /// Raw bytes.
    Bytes(Bytes),

    /// UTF-8 text.
    Text(String),

    /// Timestamp, carried on the wire as RFC 3339 text at second precision.
    Time(DateTime<FixedOffset>),

    /// Ordered sequence; element `i` is written with field id `i`.
    List(Vec<Value>),

    /// Fields in wire order, keyed by field id.
    Record(Vec<(FieldId, Value)>),
}

impl Value {
    /// The wire atom this value is written with.
    pub fn atom(&self) -> Atom {
        match self {
            Value::Boolean(_) => Atom::Boolean,
            Value::Int(_) => Atom::Int,
            Value::Int8(_) => Atom::Int8,
            Value::Int16(_) => Atom::Int16,
            Value::Int32(_) => Atom::Int32,
            Value::Int64(_) => Atom::Int64,
            Value::UInt(_) => Atom::UInt,
            Value::UInt8(_) => Atom::UInt8,
            Value::UInt16(_) => Atom::UInt16,
            Value::UInt32(_) => Atom::UInt32,
            Value::UInt64(_) => Atom::UInt64,
            Value::Float32(_) => Atom::Float32,
            Value::Float64(_) => Atom::Float64,
            Value::Bytes(_) => Atom::Bytes,
            Value::Text(_) => Atom::Text,
            Value::Time(_) => Atom::Time,
            Value::List(_) => Atom::List,
            Value::Record(_) => Atom::Record,
        }
    }

    /// Looks up a record field by id. Returns `None` for non-records.
    pub fn field(&self, id: FieldId) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields
                .iter()
                .find(|(field_id, _)| *field_id == id)
                .map(|(_, value)| value),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}
