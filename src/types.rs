use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};

use crate::codec::Frame;
use crate::record::assign_record;
use crate::{
    Aggregate, Atom, DecodeError, DecodeErrorKind, DecodeResult, EncodeResult, FieldId,
    SchemaError, Value, Voxa,
};

fn mismatch(expected: Atom, actual: &Value) -> DecodeError {
    DecodeError::new(DecodeErrorKind::AtomMismatch {
        expected: expected.name(),
        actual: actual.atom(),
    })
}

macro_rules! impl_voxa_scalar {
    ($ty:ty, $variant:ident) => {
        impl Voxa for $ty {
            const ATOM: Atom = Atom::$variant;

            fn to_value(&self) -> EncodeResult<Value> {
                Ok(Value::$variant(*self))
            }

            fn from_value(value: Value) -> DecodeResult<Self> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(mismatch(Self::ATOM, &other)),
                }
            }
        }
    };
}

impl_voxa_scalar!(bool, Boolean);
impl_voxa_scalar!(i8, Int8);
impl_voxa_scalar!(i16, Int16);
impl_voxa_scalar!(i32, Int32);
impl_voxa_scalar!(i64, Int64);
impl_voxa_scalar!(u8, UInt8);
impl_voxa_scalar!(u16, UInt16);
impl_voxa_scalar!(u32, UInt32);
impl_voxa_scalar!(u64, UInt64);
impl_voxa_scalar!(f32, Float32);
impl_voxa_scalar!(f64, Float64);

macro_rules! impl_voxa_platform_int {
    ($ty:ty, $variant:ident, $wide:ty) => {
        impl Voxa for $ty {
            const ATOM: Atom = Atom::$variant;

            fn to_value(&self) -> EncodeResult<Value> {
                Ok(Value::$variant(*self as $wide))
            }

            fn from_value(value: Value) -> DecodeResult<Self> {
                match value {
                    Value::$variant(v) => <$ty>::try_from(v).map_err(|_| {
                        DecodeError::new(DecodeErrorKind::IntegerOverflow(Self::ATOM))
                    }),
                    other => Err(mismatch(Self::ATOM, &other)),
                }
            }
        }
    };
}

impl_voxa_platform_int!(isize, Int, i64);
impl_voxa_platform_int!(usize, UInt, u64);

impl Voxa for String {
    const ATOM: Atom = Atom::Text;

    fn to_value(&self) -> EncodeResult<Value> {
        Ok(Value::Text(self.clone()))
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(mismatch(Self::ATOM, &other)),
        }
    }
}

impl Voxa for Arc<str> {
    const ATOM: Atom = Atom::Text;

    fn to_value(&self) -> EncodeResult<Value> {
        Ok(Value::Text(self.to_string()))
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        String::from_value(value).map(Arc::from)
    }
}

impl Voxa for bytes::Bytes {
    const ATOM: Atom = Atom::Bytes;

    fn to_value(&self) -> EncodeResult<Value> {
        Ok(Value::Bytes(self.clone()))
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        match value {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(mismatch(Self::ATOM, &other)),
        }
    }
}

impl Voxa for DateTime<FixedOffset> {
    const ATOM: Atom = Atom::Time;

    fn to_value(&self) -> EncodeResult<Value> {
        Ok(Value::Time(*self))
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        match value {
            Value::Time(time) => Ok(time),
            other => Err(mismatch(Self::ATOM, &other)),
        }
    }
}

impl Voxa for DateTime<Utc> {
    const ATOM: Atom = Atom::Time;

    fn to_value(&self) -> EncodeResult<Value> {
        Ok(Value::Time(self.fixed_offset()))
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        DateTime::<FixedOffset>::from_value(value).map(|time| time.with_timezone(&Utc))
    }
}

impl<T: Voxa> Voxa for Vec<T> {
    const ATOM: Atom = Atom::List;

    fn to_value(&self) -> EncodeResult<Value> {
        self.iter()
            .map(Voxa::to_value)
            .collect::<EncodeResult<Vec<_>>>()
            .map(Value::List)
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(DecodeError::new(DecodeErrorKind::DestinationMismatch {
                destination: "list",
                actual: other.atom(),
            })),
        }
    }

    fn from_frame(frame: &Frame<'_>) -> DecodeResult<Self> {
        frame.read_list()
    }
}

/// Numbers sorted entries `1..=n`; keys themselves are not written.
fn map_entries<'a, V: Voxa + 'a>(
    values: impl ExactSizeIterator<Item = &'a V>,
) -> EncodeResult<Value> {
    if values.len() > usize::from(u8::MAX) {
        return Err(SchemaError::TooManyEntries(values.len()).into());
    }
    let mut fields = Vec::with_capacity(values.len());
    for (position, value) in values.enumerate() {
        fields.push((position as FieldId + 1, value.to_value()?));
    }
    Ok(Value::Record(fields))
}

impl<K, V> Voxa for BTreeMap<K, V>
where
    K: From<FieldId> + Ord,
    V: Voxa,
{
    const ATOM: Atom = Atom::Record;

    fn to_value(&self) -> EncodeResult<Value> {
        map_entries(self.values())
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut map = BTreeMap::new();
        assign_record(&mut map, value)?;
        Ok(map)
    }

    fn from_frame(frame: &Frame<'_>) -> DecodeResult<Self> {
        let mut map = BTreeMap::new();
        frame.read_record_into(&mut map)?;
        Ok(map)
    }
}

impl<K, V> Aggregate for BTreeMap<K, V>
where
    K: From<FieldId> + Ord,
    V: Voxa,
{
    fn accepts(&self, _id: FieldId) -> bool {
        true
    }

    fn assign(&mut self, id: FieldId, value: Value) -> DecodeResult<()> {
        self.insert(K::from(id), V::from_value(value)?);
        Ok(())
    }

    fn assign_frame(&mut self, frame: &Frame<'_>) -> DecodeResult<()> {
        self.insert(K::from(frame.field_id()), V::from_frame(frame)?);
        Ok(())
    }
}

impl<K, V, S> Voxa for HashMap<K, V, S>
where
    K: From<FieldId> + Ord + Eq + Hash,
    V: Voxa,
    S: BuildHasher + Default,
{
    const ATOM: Atom = Atom::Record;

    fn to_value(&self) -> EncodeResult<Value> {
        let mut entries: Vec<(&K, &V)> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        map_entries(entries.into_iter().map(|(_, value)| value))
    }

    fn from_value(value: Value) -> DecodeResult<Self> {
        let mut map = HashMap::default();
        assign_record(&mut map, value)?;
        Ok(map)
    }

    fn from_frame(frame: &Frame<'_>) -> DecodeResult<Self> {
        let mut map = HashMap::default();
        frame.read_record_into(&mut map)?;
        Ok(map)
    }
}

impl<K, V, S> Aggregate for HashMap<K, V, S>
where
    K: From<FieldId> + Eq + Hash,
    V: Voxa,
    S: BuildHasher,
{
    fn accepts(&self, _id: FieldId) -> bool {
        true
    }

    fn assign(&mut self, id: FieldId, value: Value) -> DecodeResult<()> {
        self.insert(K::from(id), V::from_value(value)?);
        Ok(())
    }

    fn assign_frame(&mut self, frame: &Frame<'_>) -> DecodeResult<()> {
        self.insert(K::from(frame.field_id()), V::from_frame(frame)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Arc;

    use bytes::Bytes;
    use chrono::{DateTime, Utc};

    use crate::{
        Atom, DecodeError, DecodeErrorKind, DecodeResult, EncodeErrorKind, SchemaError, Voxa,
        from_bytes, to_vec,
    };

    fn assert_roundtrips<T: Voxa + PartialEq + std::fmt::Debug>(
        cases: &[(DecodeResult<T>, &[u8])],
    ) {
        for (expected, bytes) in cases {
            let parse_result = from_bytes::<T>(Bytes::from(bytes.to_vec()));
            assert_eq!(expected, &parse_result);
            if let Ok(val) = expected {
                assert_eq!(to_vec(val).as_deref(), Ok(*bytes));
            }
        }
    }

    fn mismatch<T>(expected: &'static str, actual: Atom) -> DecodeResult<T> {
        Err(DecodeError::new(DecodeErrorKind::AtomMismatch {
            expected,
            actual,
        }))
    }

    #[test]
    fn test_bool() {
        assert_roundtrips(&[
            (Ok(true), &[0x0Du8, 0x00, 0x01]),
            (Ok(false), &[0x0D, 0x00, 0x00]),
            (
                Err(DecodeError::new(DecodeErrorKind::InvalidBool(0x42))),
                &[0x0D, 0x00, 0x42],
            ),
            (mismatch("bool", Atom::Int8), &[0x04, 0x00, 0x01]),
        ]);
    }

    #[test]
    fn test_integers_u32() {
        assert_roundtrips(&[
            (Ok(42u32), &[0x0Bu8, 0x00, 0x2A]),
            (Ok(u32::MAX), &[0x0B, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x0F]),
            (mismatch("uint32", Atom::Int32), &[0x06, 0x00, 0x2A]),
        ]);
    }

    #[test]
    fn test_integers_i32() {
        assert_roundtrips(&[(Ok(-42i32), &[0x06u8, 0x00, 0xD6, 0xFF, 0xFF, 0xFF, 0x0F])]);
    }

    #[test]
    fn test_integers_small() {
        assert_roundtrips(&[(Ok(-2i16), &[0x05u8, 0x00, 0xFF, 0xFE])]);
        assert_roundtrips(&[(Ok(7u8), &[0x09u8, 0x00, 0x07])]);
    }

    #[test]
    fn test_platform_integers() {
        assert_roundtrips(&[(Ok(1337isize), &[0x03u8, 0x00, 0xB9, 0x0A])]);
        assert_roundtrips(&[(Ok(26usize), &[0x08u8, 0x00, 0x1A])]);
        assert_roundtrips(&[(
            Ok(-1isize),
            &[
                0x03u8, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01,
            ],
        )]);
    }

    #[test]
    fn test_floats() {
        assert_roundtrips(&[(Ok(1.0f64), &[0x0Fu8, 0x00, 0xBF, 0xE0, 0x03])]);
        assert_roundtrips(&[(Ok(1.0f32), &[0x0Eu8, 0x00, 0xBF, 0x80, 0x02])]);
    }

    #[test]
    fn test_chrono_timestamp() {
        let time = DateTime::<Utc>::from_timestamp(1234567890, 0).unwrap();
        let mut expected = vec![0x13u8, 0x00];
        expected.extend_from_slice(b"2009-02-13T23:31:30Z");
        assert_roundtrips(&[(Ok(time), &expected[..])]);

        let epoch = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        assert_eq!(from_bytes::<DateTime<Utc>>(Bytes::from(to_vec(&epoch).unwrap())), Ok(epoch));
    }

    #[test]
    fn test_string() {
        assert_roundtrips(&[
            (Ok("Hello, Voxa!".to_string()), b"\x01\x00Hello, Voxa!"),
            (Ok(String::new()), &[0x01, 0x00]),
            (
                Err(DecodeError::new(DecodeErrorKind::InvalidUtf8)),
                &[0x01, 0x00, 0xFF, 0xFE, 0xFD, 0xFC],
            ),
        ]);
    }

    #[test]
    fn test_arc_str() {
        assert_roundtrips(&[(Ok(Arc::<str>::from("Hello, Voxa!")), b"\x01\x00Hello, Voxa!")]);

        // Verify roundtrip with String produces identical bytes
        let arc_str: Arc<str> = Arc::from("test string");
        let string_data = "test string".to_string();
        assert_eq!(to_vec(&arc_str).unwrap(), to_vec(&string_data).unwrap());
    }

    #[test]
    fn test_vec() {
        assert_roundtrips(&[
            (
                Ok(vec![1u32, 2, 3, 4]),
                &[
                    0x12u8, 0x11, 0x00, 0x03, 0x0B, 0x00, 0x01, 0x03, 0x0B, 0x01, 0x02, 0x03,
                    0x0B, 0x02, 0x03, 0x03, 0x0B, 0x03, 0x04,
                ],
            ),
            (Ok(vec![]), &[0x02, 0x11, 0x00]),
            (
                mismatch("uint32", Atom::Int32),
                &[0x06, 0x11, 0x00, 0x03, 0x06, 0x00, 0x01],
            ),
            (
                Err(DecodeError::new(DecodeErrorKind::DestinationMismatch {
                    destination: "list",
                    actual: Atom::Record,
                })),
                &[0x02, 0x12, 0x00],
            ),
        ]);
    }

    #[test]
    fn test_vec_string() {
        assert_roundtrips(&[(
            Ok(vec!["foo".to_string(), "bar".to_string()]),
            &[
                0x0Eu8, 0x11, 0x00, 0x05, 0x01, 0x00, b'f', b'o', b'o', 0x05, 0x01, 0x01, b'b',
                b'a', b'r',
            ],
        )]);
    }

    #[test]
    fn test_bytes() {
        assert_roundtrips(&[
            (Ok(Bytes::from(vec![1u8, 2, 3, 4])), &[0x10u8, 0x00, 0x01, 0x02, 0x03, 0x04]),
            (Ok(Bytes::new()), &[0x10, 0x00]),
        ]);

        // Vec<u8> is a list of bytes, not a byte string
        assert_roundtrips(&[(Ok(vec![0xDEu8]), &[0x06u8, 0x11, 0x00, 0x03, 0x09, 0x00, 0xDE])]);
    }

    #[test]
    fn test_map() {
        let mut map = BTreeMap::new();
        map.insert(1u32, 10u32);
        assert_roundtrips(&[
            (Ok(map), &[0x06u8, 0x12, 0x00, 0x03, 0x0B, 0x01, 0x0A]),
            (Ok(BTreeMap::new()), &[0x02, 0x12, 0x00]),
        ]);
    }

    #[test]
    fn test_map_entries_numbered_in_key_order() {
        let mut map: HashMap<u8, String> = HashMap::new();
        map.insert(5, "five".to_string());
        map.insert(2, "two".to_string());

        let bytes = to_vec(&map).unwrap();
        let decoded: HashMap<u8, String> = from_bytes(Bytes::from(bytes)).unwrap();

        let mut expected = HashMap::new();
        expected.insert(1, "two".to_string());
        expected.insert(2, "five".to_string());
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_map_too_many_entries() {
        let map: BTreeMap<u16, bool> = (0..256u16).map(|k| (k, true)).collect();
        assert_eq!(
            to_vec(&map).unwrap_err().kind(),
            &EncodeErrorKind::Schema(SchemaError::TooManyEntries(256))
        );

        let map: BTreeMap<u16, bool> = (0..255u16).map(|k| (k, true)).collect();
        assert!(to_vec(&map).is_ok());
    }
}
