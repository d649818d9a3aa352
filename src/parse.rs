use bytes::Bytes;

use crate::codec::{Frame, decode_value_with};
use crate::{DecodeResult, Limits, Voxa};

/// Decode a value from Voxa binary format.
///
/// `T::ATOM` decides how the data is read: lists and records start with a
/// length prefix, scalars directly with their atom.
pub fn from_bytes<T: Voxa>(data: Bytes) -> DecodeResult<T> {
    from_bytes_with(data, &Limits::default())
}

/// Like [`from_bytes`], with explicit nesting and size limits.
pub fn from_bytes_with<T: Voxa>(data: Bytes, limits: &Limits) -> DecodeResult<T> {
    if T::ATOM.is_container() {
        return T::from_frame(&Frame::top_level(&data, limits)?);
    }
    let (value, _) = decode_value_with(data, T::ATOM, limits)?;
    T::from_value(value)
}
