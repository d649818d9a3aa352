//! Codec capability traits and the element framing shared by the list and
//! record codecs.
//!
//! A container body is a run of length-prefixed elements:
//!
//! ```text
//! [varint L][atom][field id][payload ...]    L = 2 + len(payload)
//! ```
//!
//! Scalars inside a body are the scalar codec's unframed output behind the
//! length prefix; nested lists and records are written exactly as they are at
//! top level, since containers always carry their own prefix.

use bytes::Bytes;

use crate::buf::BytesRef;
use crate::scalar::{BooleanCodec, BytesCodec, FloatCodec, IntCodec, TextCodec, TimeCodec};
use crate::varint::{decode_varint, encode_varint, varint_len};
use crate::{
    Aggregate, Atom, DecodeError, DecodeErrorKind, DecodeResult, EncodeError, EncodeErrorKind,
    EncodeResult, FieldId, Limits, Value, Voxa, list, record,
};

/// Converts single values to and from their unframed binary form,
/// `[atom][field id][payload]`.
pub trait BinaryCodec {
    /// Decodes one unframed value, returning it with its field id.
    fn decode(&self, data: Bytes) -> DecodeResult<(Value, FieldId)>;

    /// Appends the unframed encoding of `value` to `buffer`.
    ///
    /// Fails with `UnsupportedType` if `value` is not a variant this codec
    /// handles; nothing is written in that case.
    fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()>;

    /// Number of bytes `encode` writes for `value`, or 0 for a value the
    /// codec does not handle.
    fn encoded_len(&self, value: &Value) -> usize;
}

/// A codec that also has a human-readable form.
pub trait TextualCodec: BinaryCodec {
    fn text_decode(&self, _data: &[u8]) -> DecodeResult<Value> {
        Err(DecodeError::new(DecodeErrorKind::NotSupported))
    }

    fn text_encode(&self, _value: &Value, _buffer: &mut Vec<u8>) -> EncodeResult<()> {
        Err(EncodeError::new(EncodeErrorKind::NotSupported))
    }
}

/// Returns the codec responsible for a scalar atom, or `None` for the
/// container atoms and the invalid sentinel.
pub fn scalar_codec(atom: Atom) -> Option<&'static dyn TextualCodec> {
    match atom {
        Atom::Boolean => Some(&BooleanCodec),
        Atom::Int
        | Atom::Int8
        | Atom::Int16
        | Atom::Int32
        | Atom::Int64
        | Atom::UInt
        | Atom::UInt8
        | Atom::UInt16
        | Atom::UInt32
        | Atom::UInt64 => Some(&IntCodec),
        Atom::Float32 | Atom::Float64 => Some(&FloatCodec),
        Atom::Bytes => Some(&BytesCodec),
        Atom::Text => Some(&TextCodec),
        Atom::Time => Some(&TimeCodec),
        Atom::List | Atom::Record | Atom::Invalid => None,
    }
}

/// Encodes `value` in its top-level form: containers length-prefixed,
/// scalars unframed.
pub fn encode_value(value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
    encode_value_with(value, id, buffer, &Limits::default())
}

pub(crate) fn encode_value_with(
    value: &Value,
    id: FieldId,
    buffer: &mut Vec<u8>,
    limits: &Limits,
) -> EncodeResult<()> {
    rollback_on_error(buffer, |buffer| match value {
        Value::List(items) => list::write_list(items, id, buffer, limits, 1),
        Value::Record(fields) => record::write_record(fields, id, buffer, limits, 1),
        scalar => scalar_codec_for(scalar)?.encode(scalar, id, buffer),
    })
}

/// Decodes a top-level value the caller expects to be of atom `expected`.
///
/// The format has no magic number, so whether the data starts with a
/// length prefix (lists and records) or directly with an atom (scalars) has
/// to be known out of band. Trailing bytes after a container are an error.
pub fn decode_value(data: Bytes, expected: Atom) -> DecodeResult<(Value, FieldId)> {
    decode_value_with(data, expected, &Limits::default())
}

pub(crate) fn decode_value_with(
    data: Bytes,
    expected: Atom,
    limits: &Limits,
) -> DecodeResult<(Value, FieldId)> {
    if !expected.is_container() {
        let codec = scalar_codec(expected)
            .ok_or_else(|| DecodeError::new(DecodeErrorKind::InvalidAtom(expected.into())))?;
        let (value, id) = codec.decode(data)?;
        if value.atom() != expected {
            return Err(DecodeError::new(DecodeErrorKind::AtomMismatch {
                expected: expected.name(),
                actual: value.atom(),
            }));
        }
        return Ok((value, id));
    }

    let frame = Frame::top_level(&data, limits)?;
    if frame.atom() != expected {
        return Err(DecodeError::new(DecodeErrorKind::DestinationMismatch {
            destination: expected.name(),
            actual: frame.atom(),
        }));
    }
    Ok((frame.to_value()?, frame.field_id()))
}

/// A length-prefixed element that has been located but not yet decoded.
///
/// Typed destinations decode straight from frames, so a record read into a
/// struct only ever decodes the fields the struct declares.
pub struct Frame<'a> {
    element: Element<'a>,
    limits: &'a Limits,
    depth: usize,
}

impl<'a> Frame<'a> {
    /// `depth` is that of the enclosing container, 0 at top level.
    pub(crate) fn new(element: Element<'a>, limits: &'a Limits, depth: usize) -> Self {
        Frame {
            element,
            limits,
            depth,
        }
    }

    /// Reads the single framed value `data` must consist of.
    pub(crate) fn top_level(data: &'a Bytes, limits: &'a Limits) -> DecodeResult<Self> {
        let mut reader = BytesRef::new(data);
        let element = read_element(&mut reader, limits)?;
        reader.finish()?;
        Ok(Frame::new(element, limits, 0))
    }

    pub fn atom(&self) -> Atom {
        self.element.atom
    }

    pub fn field_id(&self) -> FieldId {
        self.element.field_id
    }

    /// Decodes the whole element without a destination type.
    pub fn to_value(&self) -> DecodeResult<Value> {
        decode_element(&self.element, self.limits, self.depth)
    }

    /// Walks a record body into `dest`, skipping fields it does not accept.
    pub fn read_record_into<T: Aggregate>(&self, dest: &mut T) -> DecodeResult<()> {
        self.expect_container(Atom::Record)?;
        record::read_record_into(self.element.payload_ref()?, dest, self.limits, self.depth + 1)
    }

    /// Decodes a list body one typed element at a time.
    pub fn read_list<T: Voxa>(&self) -> DecodeResult<Vec<T>> {
        self.expect_container(Atom::List)?;
        list::read_list_typed(self.element.payload_ref()?, self.limits, self.depth + 1)
    }

    fn expect_container(&self, atom: Atom) -> DecodeResult<()> {
        if self.element.atom != atom {
            return Err(DecodeError::new(DecodeErrorKind::DestinationMismatch {
                destination: atom.name(),
                actual: self.element.atom,
            }));
        }
        Ok(())
    }
}

/// One length-prefixed element split off a container body.
pub(crate) struct Element<'a> {
    pub atom: Atom,
    pub field_id: FieldId,
    /// `[atom][field id][payload]`, exactly the unframed scalar form.
    pub frame: BytesRef<'a>,
}

impl<'a> Element<'a> {
    /// The payload after the atom and field id bytes.
    pub fn payload_ref(&self) -> DecodeResult<BytesRef<'a>> {
        let mut frame = self.frame;
        frame.read(2)?;
        Ok(frame)
    }
}

/// Reads the next element off the front of a container body.
pub(crate) fn read_element<'a>(
    body: &mut BytesRef<'a>,
    limits: &Limits,
) -> DecodeResult<Element<'a>> {
    let length = body.read_varint()?;
    if length < 2 {
        return Err(DecodeError::new(DecodeErrorKind::InvalidLength(length)));
    }
    if length > limits.max_block_size as u64 {
        tracing::debug!(length, limit = limits.max_block_size, "frame exceeds block size");
        return Err(DecodeError::new(DecodeErrorKind::BlockTooLarge {
            size: length,
            limit: limits.max_block_size,
        }));
    }
    let frame = body.read(length as usize)?;
    let atom = Atom::decode(frame[0])?;
    Ok(Element {
        atom,
        field_id: frame[1],
        frame,
    })
}

/// Counts the complete elements in a body without decoding them, to size
/// the destination up front. Stops at the first malformed prefix.
pub(crate) fn count_elements(mut body: &[u8]) -> usize {
    let mut seen = 0;
    while let Some((length, read)) = decode_varint(body) {
        let rest = usize::try_from(length)
            .ok()
            .and_then(|length| length.checked_add(read))
            .and_then(|end| body.get(end..));
        match rest {
            Some(rest) => body = rest,
            None => break,
        }
        seen += 1;
    }
    seen
}

/// Fails once a container at `depth` would exceed the configured ceiling.
pub(crate) fn check_decode_depth(depth: usize, limits: &Limits) -> DecodeResult<()> {
    if depth > limits.max_depth {
        tracing::debug!(depth, limit = limits.max_depth, "nesting too deep");
        return Err(DecodeError::new(DecodeErrorKind::NestingTooDeep {
            limit: limits.max_depth,
        }));
    }
    Ok(())
}

pub(crate) fn check_encode_depth(depth: usize, limits: &Limits) -> EncodeResult<()> {
    if depth > limits.max_depth {
        return Err(EncodeError::new(EncodeErrorKind::NestingTooDeep {
            limit: limits.max_depth,
        }));
    }
    Ok(())
}

/// Fails once a container body holds more elements than allowed.
pub(crate) fn check_block_count(body: &[u8], limits: &Limits) -> DecodeResult<usize> {
    let count = count_elements(body);
    if count > limits.max_block_count {
        tracing::debug!(count, limit = limits.max_block_count, "too many items");
        return Err(DecodeError::new(DecodeErrorKind::TooManyItems {
            count,
            limit: limits.max_block_count,
        }));
    }
    Ok(count)
}

/// Decodes an element found inside a container at `depth`.
pub(crate) fn decode_element(
    element: &Element<'_>,
    limits: &Limits,
    depth: usize,
) -> DecodeResult<Value> {
    match element.atom {
        Atom::List => list::read_list_body(element.payload_ref()?, limits, depth + 1),
        Atom::Record => record::read_record_body(element.payload_ref()?, limits, depth + 1),
        atom => {
            let codec = scalar_codec(atom)
                .ok_or_else(|| DecodeError::new(DecodeErrorKind::InvalidAtom(atom.into())))?;
            let (value, _) = codec.decode(element.frame.to_bytes())?;
            Ok(value)
        }
    }
}

/// Writes `value` as a length-prefixed element of a container at `depth`.
pub(crate) fn write_element(
    value: &Value,
    id: FieldId,
    buffer: &mut Vec<u8>,
    limits: &Limits,
    depth: usize,
) -> EncodeResult<()> {
    match value {
        Value::List(items) => list::write_list(items, id, buffer, limits, depth + 1),
        Value::Record(fields) => record::write_record(fields, id, buffer, limits, depth + 1),
        scalar => {
            let codec = scalar_codec_for(scalar)?;
            encode_varint(codec.encoded_len(scalar) as u64, buffer);
            codec.encode(scalar, id, buffer)
        }
    }
}

/// Writes `[varint L][atom][id]` followed by every child as an element.
/// `children` is walked twice: once to size the frame, once to write it.
pub(crate) fn write_container<'v, I>(
    atom: Atom,
    id: FieldId,
    children: I,
    buffer: &mut Vec<u8>,
    limits: &Limits,
    depth: usize,
) -> EncodeResult<()>
where
    I: Iterator<Item = (FieldId, &'v Value)> + Clone,
{
    check_encode_depth(depth, limits)?;

    let mut frame_len = 2;
    for (_, child) in children.clone() {
        frame_len += element_len(child, limits, depth)?;
    }

    buffer.reserve(varint_len(frame_len as u64) + frame_len);
    encode_varint(frame_len as u64, buffer);
    buffer.push(atom.into());
    buffer.push(id);

    for (child_id, child) in children {
        write_element(child, child_id, buffer, limits, depth)?;
    }
    Ok(())
}

/// Total bytes `write_element` produces for `value` inside a container at
/// `depth`, prefix included.
fn element_len(value: &Value, limits: &Limits, depth: usize) -> EncodeResult<usize> {
    let frame = match value {
        Value::List(items) => {
            check_encode_depth(depth + 1, limits)?;
            let mut len = 2;
            for item in items {
                len += element_len(item, limits, depth + 1)?;
            }
            len
        }
        Value::Record(fields) => {
            check_encode_depth(depth + 1, limits)?;
            let mut len = 2;
            for (_, field) in fields {
                len += element_len(field, limits, depth + 1)?;
            }
            len
        }
        scalar => scalar_codec_for(scalar)?.encoded_len(scalar),
    };
    Ok(varint_len(frame as u64) + frame)
}

fn scalar_codec_for(value: &Value) -> EncodeResult<&'static dyn TextualCodec> {
    scalar_codec(value.atom()).ok_or_else(|| {
        EncodeError::new(EncodeErrorKind::UnsupportedType {
            codec: "scalar",
            actual: value.atom(),
        })
    })
}

/// Runs `write`, truncating `buffer` back to its starting length if it fails.
pub(crate) fn rollback_on_error<F>(buffer: &mut Vec<u8>, write: F) -> EncodeResult<()>
where
    F: FnOnce(&mut Vec<u8>) -> EncodeResult<()>,
{
    let start = buffer.len();
    let result = write(buffer);
    if result.is_err() {
        buffer.truncate(start);
    }
    result
}
