//! The record codec and the struct-to-record adapters used by
//! `#[derive(Voxa)]`.
//!
//! A record is a length-prefixed frame whose body holds one element per
//! field, each carrying the field's id. Decoding into an [`Aggregate`] skips
//! ids the destination does not know, which is what lets old readers accept
//! data written by newer schemas.

use std::collections::HashSet;

use bytes::Bytes;

use crate::buf::BytesRef;
use crate::codec::{
    Frame, check_block_count, check_decode_depth, decode_element, decode_value_with,
    read_element, rollback_on_error, write_container,
};
use crate::{
    Aggregate, Atom, DecodeError, DecodeErrorKind, DecodeResult, EncodeError, EncodeErrorKind,
    EncodeResult, FieldId, FieldValue, Limits, SchemaError, Value, Voxa,
};

/// Encodes `Value::Record` and decodes records into values or aggregates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCodec {
    limits: Limits,
}

impl RecordCodec {
    pub const fn new(limits: Limits) -> Self {
        RecordCodec { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Writes `[varint L][Record][id][fields...]`.
    ///
    /// Field ids must be unique within each record; on a duplicate nothing
    /// is left in `buffer`.
    pub fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let Value::Record(fields) = value else {
            return Err(EncodeError::new(EncodeErrorKind::UnsupportedType {
                codec: "record",
                actual: value.atom(),
            }));
        };
        rollback_on_error(buffer, |buffer| {
            write_record(fields, id, buffer, &self.limits, 1)
        })
    }

    /// Decodes a record into `dest`, returning the record's own field id.
    ///
    /// Fields `dest` does not accept are skipped without being decoded.
    /// Fields it accepts but that are absent from the data keep whatever
    /// value `dest` already holds.
    pub fn decode<T: Aggregate>(&self, data: Bytes, dest: &mut T) -> DecodeResult<FieldId> {
        let frame = Frame::top_level(&data, &self.limits)?;
        frame.read_record_into(dest)?;
        Ok(frame.field_id())
    }

    /// Decodes a record without a destination type.
    pub fn decode_value(&self, data: Bytes) -> DecodeResult<(Value, FieldId)> {
        decode_value_with(data, Atom::Record, &self.limits)
    }
}

pub(crate) fn write_record(
    fields: &[(FieldId, Value)],
    id: FieldId,
    buffer: &mut Vec<u8>,
    limits: &Limits,
    depth: usize,
) -> EncodeResult<()> {
    let mut seen = HashSet::with_capacity(fields.len());
    for (field_id, _) in fields {
        if !seen.insert(*field_id) {
            return Err(SchemaError::DuplicateTag(*field_id).into());
        }
    }
    let children = fields.iter().map(|(field_id, value)| (*field_id, value));
    write_container(Atom::Record, id, children, buffer, limits, depth)
}

pub(crate) fn read_record_body(
    mut body: BytesRef<'_>,
    limits: &Limits,
    depth: usize,
) -> DecodeResult<Value> {
    check_decode_depth(depth, limits)?;
    let count = check_block_count(&body, limits)?;
    let mut fields = Vec::with_capacity(count);
    while !body.is_empty() {
        let element = read_element(&mut body, limits)?;
        let value = decode_element(&element, limits, depth)?;
        fields.push((element.field_id, value));
    }
    Ok(Value::Record(fields))
}

pub(crate) fn read_record_into<T: Aggregate>(
    mut body: BytesRef<'_>,
    dest: &mut T,
    limits: &Limits,
    depth: usize,
) -> DecodeResult<()> {
    check_decode_depth(depth, limits)?;
    check_block_count(&body, limits)?;
    while !body.is_empty() {
        let element = read_element(&mut body, limits)?;
        if !dest.accepts(element.field_id) {
            tracing::trace!(
                field_id = element.field_id,
                atom = %element.atom,
                "skipping unknown record field"
            );
            continue;
        }
        dest.assign_frame(&Frame::new(element, limits, depth))?;
    }
    Ok(())
}

/// One declared field of a derived struct.
///
/// The tag is kept as written in the annotation and only parsed when the
/// struct is encoded, so a bad tag surfaces as a [`SchemaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub tag: Option<&'static str>,
    pub atom: Atom,
}

impl FieldDef {
    pub const fn new(name: &'static str, tag: Option<&'static str>, atom: Atom) -> Self {
        FieldDef { name, tag, atom }
    }

    /// Parses the tag as a decimal field id in `0..=255`.
    pub fn field_id(&self) -> Result<FieldId, SchemaError> {
        let field = self.name;
        let tag = self.tag.ok_or(SchemaError::MissingTag { field })?;
        if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SchemaError::TagNotNumeric { field, tag });
        }
        tag.parse::<u64>()
            .ok()
            .and_then(|id| FieldId::try_from(id).ok())
            .ok_or(SchemaError::TagOutOfRange { field, tag })
    }

    /// Whether a wire field id belongs to this field. Fields with a bad tag
    /// never match.
    pub fn matches(&self, id: FieldId) -> bool {
        self.field_id() == Ok(id)
    }
}

/// Builds a `Value::Record` from struct fields, validating their tags.
pub struct RecordEncoder {
    fields: Vec<(FieldId, Value)>,
    seen: HashSet<FieldId>,
}

impl RecordEncoder {
    pub fn new(capacity: usize) -> Self {
        RecordEncoder {
            fields: Vec::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Adds one field. A `None` optional field still has its tag checked
    /// but is not written.
    pub fn field<F: FieldValue>(&mut self, def: &FieldDef, value: &F) -> EncodeResult<()> {
        let id = def.field_id()?;
        if !self.seen.insert(id) {
            return Err(SchemaError::DuplicateTag(id).into());
        }
        if let Some(inner) = value.as_voxa() {
            self.fields.push((id, inner.to_value()?));
        }
        Ok(())
    }

    pub fn finish(self) -> Value {
        Value::Record(self.fields)
    }
}

/// Converts a decoded value and stores it in a struct field.
pub fn assign_field<F: FieldValue>(slot: &mut F, value: Value) -> DecodeResult<()> {
    *slot = F::from_voxa(F::T::from_value(value)?);
    Ok(())
}

/// Decodes a field straight from its frame and stores it in a struct field.
pub fn read_field<F: FieldValue>(slot: &mut F, frame: &Frame<'_>) -> DecodeResult<()> {
    *slot = F::from_voxa(F::T::from_frame(frame)?);
    Ok(())
}

/// Feeds every field of a decoded record into `dest`.
pub fn assign_record<T: Aggregate>(dest: &mut T, value: Value) -> DecodeResult<()> {
    let Value::Record(fields) = value else {
        return Err(DecodeError::new(DecodeErrorKind::DestinationMismatch {
            destination: "record",
            actual: value.atom(),
        }));
    };
    for (id, field) in fields {
        if dest.accepts(id) {
            dest.assign(id, field)?;
        } else {
            tracing::trace!(field_id = id, "skipping unknown record field");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use bytes::Bytes;

    use super::{FieldDef, RecordCodec, RecordEncoder};
    use crate::{
        Aggregate, Atom, DecodeError, DecodeErrorKind, DecodeResult, EncodeError,
        EncodeErrorKind, FieldId, Limits, SchemaError, Value,
    };

    fn person() -> Value {
        Value::Record(vec![
            (1, Value::from("bob")),
            (2, Value::Int32(26)),
            (4, Value::Boolean(true)),
        ])
    }

    const PERSON_BYTES: &[u8] = &[
        0x10, 0x12, 0x00, // frame
        0x05, 0x01, 0x01, b'b', b'o', b'b', // name
        0x03, 0x06, 0x02, 0x1A, // age
        0x03, 0x0D, 0x04, 0x01, // active
    ];

    #[derive(Debug, Default, PartialEq)]
    struct Partial {
        name: String,
        active: bool,
    }

    impl Aggregate for Partial {
        fn accepts(&self, id: FieldId) -> bool {
            id == 1 || id == 4
        }

        fn assign(&mut self, id: FieldId, value: Value) -> DecodeResult<()> {
            match (id, value) {
                (1, Value::Text(name)) => self.name = name,
                (4, Value::Boolean(active)) => self.active = active,
                (_, other) => {
                    return Err(DecodeError::new(DecodeErrorKind::AtomMismatch {
                        expected: "text or bool",
                        actual: other.atom(),
                    }));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_encode_record() {
        let mut buffer = Vec::new();
        RecordCodec::default().encode(&person(), 0, &mut buffer).unwrap();
        assert_eq!(buffer, PERSON_BYTES);
    }

    #[test]
    fn test_decode_value() {
        let codec = RecordCodec::default();
        let decoded = codec.decode_value(Bytes::from_static(PERSON_BYTES)).unwrap();
        assert_eq!(decoded, (person(), 0));
    }

    #[test]
    fn test_decode_into_aggregate_skips_unknown() {
        let mut dest = Partial::default();
        let id = RecordCodec::default()
            .decode(Bytes::from_static(PERSON_BYTES), &mut dest)
            .unwrap();
        assert_eq!(id, 0);
        assert_eq!(
            dest,
            Partial {
                name: "bob".to_string(),
                active: true
            }
        );
    }

    #[test]
    fn test_skipped_field_is_not_decoded() {
        // field 2 holds a boolean byte of 0x07, which would fail to decode
        let data = Bytes::from_static(&[
            0x0A, 0x12, 0x00, 0x03, 0x0D, 0x02, 0x07, 0x03, 0x0D, 0x04, 0x01,
        ]);
        let mut dest = Partial::default();
        RecordCodec::default().decode(data, &mut dest).unwrap();
        assert!(dest.active);
    }

    #[test]
    fn test_decode_into_map() {
        let mut dest: BTreeMap<u8, bool> = BTreeMap::new();
        let data = Bytes::from_static(&[
            0x0A, 0x12, 0x07, 0x03, 0x0D, 0x01, 0x01, 0x03, 0x0D, 0x09, 0x00,
        ]);
        assert_eq!(RecordCodec::default().decode(data, &mut dest), Ok(7));
        assert_eq!(dest.get(&1), Some(&true));
        assert_eq!(dest.get(&9), Some(&false));
    }

    #[test]
    fn test_duplicate_field_id() {
        let value = Value::Record(vec![(4, Value::Boolean(true)), (4, Value::Int8(1))]);
        let mut buffer = vec![0xAA];
        assert_eq!(
            RecordCodec::default().encode(&value, 0, &mut buffer),
            Err(EncodeError::from(SchemaError::DuplicateTag(4)))
        );
        assert_eq!(buffer, [0xAA]);
    }

    #[test]
    fn test_nested_duplicate_rolls_back() {
        let inner = Value::Record(vec![(1, Value::Int8(1)), (1, Value::Int8(2))]);
        let value = Value::Record(vec![(1, Value::from("ok")), (2, Value::List(vec![inner]))]);
        let mut buffer = Vec::new();
        assert!(RecordCodec::default().encode(&value, 0, &mut buffer).is_err());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_encode_rejects_non_record() {
        let mut buffer = Vec::new();
        assert_eq!(
            RecordCodec::default().encode(&Value::List(vec![]), 0, &mut buffer),
            Err(EncodeError::new(EncodeErrorKind::UnsupportedType {
                codec: "record",
                actual: Atom::List,
            }))
        );
    }

    #[test]
    fn test_decode_rejects_list() {
        let mut dest = Partial::default();
        assert_eq!(
            RecordCodec::default().decode(Bytes::from_static(&[0x02, 0x11, 0x00]), &mut dest),
            Err(DecodeError::new(DecodeErrorKind::DestinationMismatch {
                destination: "record",
                actual: Atom::List,
            }))
        );
    }

    #[test]
    fn test_truncated_record() {
        let codec = RecordCodec::default();
        for cut in 1..=3 {
            let data = Bytes::copy_from_slice(&PERSON_BYTES[..PERSON_BYTES.len() - cut]);
            let err = codec.decode_value(data).unwrap_err();
            assert!(err.is_truncation(), "cut {cut}: {err}");
        }
    }

    #[test]
    fn test_depth_limit() {
        let mut value = Value::Record(vec![]);
        for _ in 0..3 {
            value = Value::Record(vec![(1, value)]);
        }

        let shallow = RecordCodec::new(Limits::default().with_max_depth(3));
        let mut buffer = Vec::new();
        assert_eq!(
            shallow.encode(&value, 0, &mut buffer),
            Err(EncodeError::new(EncodeErrorKind::NestingTooDeep { limit: 3 }))
        );
        assert!(buffer.is_empty());

        RecordCodec::default().encode(&value, 0, &mut buffer).unwrap();
        assert_eq!(
            shallow.decode_value(Bytes::from(buffer.clone())),
            Err(DecodeError::new(DecodeErrorKind::NestingTooDeep { limit: 3 }))
        );
        let roomy = RecordCodec::new(Limits::default().with_max_depth(4));
        assert_eq!(roomy.decode_value(Bytes::from(buffer)), Ok((value, 0)));
    }

    #[test]
    fn test_block_limits() {
        let limits = Limits::default().with_max_block_count(2);
        assert_eq!(
            RecordCodec::new(limits).decode_value(Bytes::from_static(PERSON_BYTES)),
            Err(DecodeError::new(DecodeErrorKind::TooManyItems { count: 3, limit: 2 }))
        );

        let limits = Limits::default().with_max_block_size(8);
        assert_eq!(
            RecordCodec::new(limits).decode_value(Bytes::from_static(PERSON_BYTES)),
            Err(DecodeError::new(DecodeErrorKind::BlockTooLarge { size: 16, limit: 8 }))
        );
    }

    #[test]
    fn test_field_def_tags() {
        let def = |tag| FieldDef::new("age", tag, Atom::Int32);
        assert_eq!(def(Some("4")).field_id(), Ok(4));
        assert_eq!(def(Some("255")).field_id(), Ok(255));
        assert_eq!(def(Some("007")).field_id(), Ok(7));
        assert_eq!(
            def(None).field_id(),
            Err(SchemaError::MissingTag { field: "age" })
        );
        for tag in ["", "x", "-1", "+1", " 1", "1.0"] {
            assert_eq!(
                def(Some(tag)).field_id(),
                Err(SchemaError::TagNotNumeric { field: "age", tag })
            );
        }
        for tag in ["256", "99999999999999999999999"] {
            assert_eq!(
                def(Some(tag)).field_id(),
                Err(SchemaError::TagOutOfRange { field: "age", tag })
            );
        }
        assert!(def(Some("4")).matches(4));
        assert!(!def(Some("4")).matches(5));
        assert!(!def(Some("x")).matches(0));
    }

    #[test]
    fn test_record_encoder() {
        let name = FieldDef::new("name", Some("1"), Atom::Text);
        let nick = FieldDef::new("nick", Some("2"), Atom::Text);
        let age = FieldDef::new("age", Some("1"), Atom::Int32);

        let mut encoder = RecordEncoder::new(2);
        encoder.field(&name, &"bob".to_string()).unwrap();
        encoder.field(&nick, &None::<String>).unwrap();
        assert_eq!(encoder.finish(), Value::Record(vec![(1, Value::from("bob"))]));

        let mut encoder = RecordEncoder::new(2);
        encoder.field(&name, &"bob".to_string()).unwrap();
        assert_eq!(
            encoder.field(&age, &26i32),
            Err(EncodeError::from(SchemaError::DuplicateTag(1)))
        );
    }
}
