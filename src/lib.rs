//! Voxa is a self-describing binary serialization format: a compact
//! tag-length-value encoding for booleans, integers of every width, floats,
//! byte strings, text, timestamps, and arbitrarily nested lists and records.
//!
//! Every value on the wire carries a one-byte atom naming its type and a
//! one-byte field id. Containers are length-prefixed, so a reader can skip
//! record fields it does not know about, which is how old readers stay
//! compatible with data from newer writers.
//!
//! # Examples
//!
//! ```
//! use voxa::{from_bytes, to_vec};
//! use bytes::Bytes;
//!
//! // Serialize a value to bytes
//! let value = 42u32;
//! let bytes = to_vec(&value).unwrap();
//! assert_eq!(bytes, [0x0B, 0x00, 0x2A]);
//!
//! // Deserialize bytes back to a value
//! let parsed: u32 = from_bytes(Bytes::from(bytes)).unwrap();
//! assert_eq!(parsed, 42);
//! ```
//!
//! Values whose type is not known ahead of time decode into [`Value`]:
//!
//! ```
//! use voxa::{Atom, ListCodec, Value};
//! use bytes::Bytes;
//!
//! let data = Bytes::from_static(&[0x06, 0x11, 0x00, 0x03, 0x0D, 0x00, 0x01]);
//! let (value, _) = ListCodec::default().decode_value(data).unwrap();
//! assert_eq!(value, Value::List(vec![Value::Boolean(true)]));
//! ```

mod atom;
mod buf;
mod codec;
mod error;
mod header;
mod limits;
mod list;
mod parse;
mod record;
mod scalar;
mod traits;
mod types;
mod value;
mod varint;
mod write;

pub use crate::atom::{Atom, FieldId};
pub use crate::buf::BytesRef;
pub use crate::codec::{
    BinaryCodec, Frame, TextualCodec, decode_value, encode_value, scalar_codec,
};
pub use crate::error::{
    DecodeError, DecodeErrorKind, DecodeResult, EncodeError, EncodeErrorKind, EncodeResult,
    SchemaError,
};
pub use crate::header::HeaderCodec;
pub use crate::limits::Limits;
pub use crate::list::ListCodec;
pub use crate::parse::{from_bytes, from_bytes_with};
pub use crate::record::{
    FieldDef, RecordCodec, RecordEncoder, assign_field, assign_record, read_field,
};
pub use crate::scalar::{BooleanCodec, BytesCodec, FloatCodec, IntCodec, TextCodec, TimeCodec};
pub use crate::traits::{Aggregate, FieldValue, Schema, Voxa};
pub use crate::value::Value;
pub use crate::varint::{
    MAX_VARINT_LEN, decode_u16_be, decode_u32_be, decode_u64_be, decode_varint, encode_u16_be,
    encode_u32_be, encode_u64_be, encode_varint, float32_to_wire, float64_to_wire, varint_len,
    wire_to_float32, wire_to_float64,
};
pub use crate::write::{to_vec, to_vec_with};

/// Re-export of the derive macro for implementing the Voxa trait on structs.
///
/// # Example
///
/// ```
/// use voxa::Voxa;
///
/// #[derive(Voxa)]
/// struct MyStruct {
///     #[voxa(id = 1)]
///     name: String,
///     #[voxa(id = 2)]
///     age: u32,
///     #[voxa(skip)]
///     cached: Option<u64>,
/// }
/// ```
pub use voxa_derive::Voxa;
