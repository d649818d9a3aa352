use bytes::Bytes;

use crate::buf::BytesRef;
use crate::codec::rollback_on_error;
use crate::varint::encode_varint;
use crate::{
    Atom, DecodeError, DecodeErrorKind, DecodeResult, EncodeResult, FieldId, Schema, SchemaError,
};

/// Describes record fields by name, for readers that want to label the
/// ids they find on the wire.
///
/// A header is `[field id][atom][name bytes]`; a schema is a run of
/// varint-length-prefixed headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderCodec;

impl HeaderCodec {
    pub fn field_to_binary(
        &self,
        name: &str,
        id: FieldId,
        atom: Atom,
        buffer: &mut Vec<u8>,
    ) -> EncodeResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::EmptyFieldName.into());
        }
        if atom == Atom::Invalid {
            return Err(SchemaError::InvalidAtom.into());
        }
        buffer.reserve(2 + name.len());
        buffer.push(id);
        buffer.push(atom.into());
        buffer.extend_from_slice(name.as_bytes());
        Ok(())
    }

    pub fn binary_to_field(&self, data: &[u8]) -> DecodeResult<(String, FieldId, Atom)> {
        if data.len() < 3 {
            return Err(DecodeError::new(DecodeErrorKind::TruncatedInput {
                needed: 3,
                available: data.len(),
            }));
        }
        let atom = Atom::decode(data[1])?;
        let name = std::str::from_utf8(&data[2..])
            .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidUtf8))?;
        Ok((name.to_string(), data[0], atom))
    }

    /// Writes a header for every declared field of `T`.
    pub fn describe<T: Schema>(&self, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        rollback_on_error(buffer, |buffer| {
            let mut header = Vec::new();
            for def in T::FIELDS {
                header.clear();
                self.field_to_binary(def.name, def.field_id()?, def.atom, &mut header)?;
                encode_varint(header.len() as u64, buffer);
                buffer.extend_from_slice(&header);
            }
            Ok(())
        })
    }

    /// Reads back what [`describe`](Self::describe) wrote.
    pub fn read_schema(&self, data: Bytes) -> DecodeResult<Vec<(String, FieldId, Atom)>> {
        let mut reader = BytesRef::new(&data);
        let mut fields = Vec::new();
        while !reader.is_empty() {
            let length = reader.read_varint()?;
            let length = usize::try_from(length)
                .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidLength(length)))?;
            let header = reader.read(length)?;
            fields.push(self.binary_to_field(&header)?);
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::HeaderCodec;
    use crate::record::FieldDef;
    use crate::{
        Atom, DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind, Schema, SchemaError,
    };

    struct Person;

    impl Schema for Person {
        const FIELDS: &'static [FieldDef] = &[
            FieldDef::new("name", Some("1"), Atom::Text),
            FieldDef::new("born", Some("3"), Atom::Time),
        ];
    }

    struct Broken;

    impl Schema for Broken {
        const FIELDS: &'static [FieldDef] = &[
            FieldDef::new("name", Some("1"), Atom::Text),
            FieldDef::new("age", Some("x"), Atom::Int32),
        ];
    }

    #[test]
    fn test_field_roundtrip() {
        let codec = HeaderCodec;
        let mut buffer = Vec::new();
        codec
            .field_to_binary("  age ", 4, Atom::UInt8, &mut buffer)
            .unwrap();
        assert_eq!(buffer, [0x04, 0x09, b'a', b'g', b'e']);
        assert_eq!(
            codec.binary_to_field(&buffer),
            Ok(("age".to_string(), 4, Atom::UInt8))
        );
    }

    #[test]
    fn test_field_to_binary_errors() {
        let codec = HeaderCodec;
        let mut buffer = Vec::new();
        assert_eq!(
            codec.field_to_binary("   ", 1, Atom::Text, &mut buffer),
            Err(EncodeError::new(EncodeErrorKind::Schema(
                SchemaError::EmptyFieldName
            )))
        );
        assert_eq!(
            codec.field_to_binary("x", 1, Atom::Invalid, &mut buffer),
            Err(EncodeError::new(EncodeErrorKind::Schema(SchemaError::InvalidAtom)))
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_binary_to_field_errors() {
        let codec = HeaderCodec;
        assert_eq!(
            codec.binary_to_field(&[0x01, 0x01]),
            Err(DecodeError::new(DecodeErrorKind::TruncatedInput {
                needed: 3,
                available: 2
            }))
        );
        assert_eq!(
            codec.binary_to_field(&[0x01, 0x02, b'a']),
            Err(DecodeError::new(DecodeErrorKind::InvalidAtom(0x02)))
        );
        assert_eq!(
            codec.binary_to_field(&[0x01, 0x01, 0xFF]),
            Err(DecodeError::new(DecodeErrorKind::InvalidUtf8))
        );
    }

    #[test]
    fn test_describe_schema() {
        let codec = HeaderCodec;
        let mut buffer = Vec::new();
        codec.describe::<Person>(&mut buffer).unwrap();
        assert_eq!(
            buffer,
            [
                0x06, 0x01, 0x01, b'n', b'a', b'm', b'e', 0x06, 0x03, 0x13, b'b', b'o', b'r', b'n',
            ]
        );
        assert_eq!(
            codec.read_schema(Bytes::from(buffer)),
            Ok(vec![
                ("name".to_string(), 1, Atom::Text),
                ("born".to_string(), 3, Atom::Time),
            ])
        );
    }

    #[test]
    fn test_describe_rolls_back_on_bad_tag() {
        let mut buffer = vec![0xAA];
        assert_eq!(
            HeaderCodec.describe::<Broken>(&mut buffer),
            Err(EncodeError::from(SchemaError::TagNotNumeric {
                field: "age",
                tag: "x"
            }))
        );
        assert_eq!(buffer, [0xAA]);
    }

    #[test]
    fn test_read_schema_truncated() {
        let data = Bytes::from_static(&[0x06, 0x01, 0x01, b'n']);
        assert!(HeaderCodec.read_schema(data).unwrap_err().is_truncation());
    }
}
