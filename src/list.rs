use bytes::Bytes;

use crate::buf::BytesRef;
use crate::codec::{
    Frame, check_block_count, check_decode_depth, decode_element, decode_value_with,
    read_element, rollback_on_error, write_container,
};
use crate::{
    Atom, DecodeResult, EncodeError, EncodeErrorKind, EncodeResult, FieldId, Limits, Value, Voxa,
};

/// Encodes `Value::List` and decodes lists, typed or schemaless.
///
/// Element `i` is written with field id `i`, wrapping past 255.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCodec {
    limits: Limits,
}

impl ListCodec {
    pub const fn new(limits: Limits) -> Self {
        ListCodec { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Writes `[varint L][List][id][elements...]`.
    pub fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let Value::List(items) = value else {
            return Err(EncodeError::new(EncodeErrorKind::UnsupportedType {
                codec: "list",
                actual: value.atom(),
            }));
        };
        rollback_on_error(buffer, |buffer| {
            write_list(items, id, buffer, &self.limits, 1)
        })
    }

    /// Decodes a list whose elements convert to `T`.
    pub fn decode<T: Voxa>(&self, data: Bytes) -> DecodeResult<Vec<T>> {
        Frame::top_level(&data, &self.limits)?.read_list()
    }

    /// Decodes a list without an element type.
    pub fn decode_value(&self, data: Bytes) -> DecodeResult<(Value, FieldId)> {
        decode_value_with(data, Atom::List, &self.limits)
    }
}

pub(crate) fn write_list(
    items: &[Value],
    id: FieldId,
    buffer: &mut Vec<u8>,
    limits: &Limits,
    depth: usize,
) -> EncodeResult<()> {
    let children = items
        .iter()
        .enumerate()
        .map(|(index, item)| (index as FieldId, item));
    write_container(Atom::List, id, children, buffer, limits, depth)
}

pub(crate) fn read_list_body(
    mut body: BytesRef<'_>,
    limits: &Limits,
    depth: usize,
) -> DecodeResult<Value> {
    check_decode_depth(depth, limits)?;
    let count = check_block_count(&body, limits)?;
    let mut items = Vec::with_capacity(count);
    while !body.is_empty() {
        let element = read_element(&mut body, limits)?;
        tracing::trace!(index = items.len(), atom = %element.atom, "list element");
        items.push(decode_element(&element, limits, depth)?);
    }
    Ok(Value::List(items))
}

pub(crate) fn read_list_typed<T: Voxa>(
    mut body: BytesRef<'_>,
    limits: &Limits,
    depth: usize,
) -> DecodeResult<Vec<T>> {
    check_decode_depth(depth, limits)?;
    let count = check_block_count(&body, limits)?;
    let mut items = Vec::with_capacity(count);
    while !body.is_empty() {
        let element = read_element(&mut body, limits)?;
        items.push(T::from_frame(&Frame::new(element, limits, depth))?);
    }
    Ok(items)
}
