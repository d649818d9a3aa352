//! One codec per scalar wire type.
//!
//! Every codec reads and writes the unframed form `[atom][field id][payload]`.
//! Fixed-width and varint payloads must fill the slice exactly; bytes, text
//! and time payloads take whatever the enclosing frame leaves them.

use std::fmt::Write as _;

use bytes::Bytes;
use chrono::{DateTime, Datelike, SecondsFormat};

use crate::buf::BytesRef;
use crate::codec::{BinaryCodec, TextualCodec};
use crate::varint::{
    decode_u16_be, encode_u16_be, encode_varint, float32_to_wire, float64_to_wire, varint_len,
    wire_to_float32, wire_to_float64,
};
use crate::{
    Atom, DecodeError, DecodeErrorKind, DecodeResult, EncodeError, EncodeErrorKind, EncodeResult,
    FieldId, Value,
};

/// Splits `[atom][field id]` off the front of an unframed scalar.
fn open(data: &Bytes) -> DecodeResult<(Atom, FieldId, BytesRef<'_>)> {
    let mut reader = BytesRef::new(data);
    let header = reader.read(2)?;
    let atom = Atom::decode(header[0])?;
    Ok((atom, header[1], reader))
}

fn mismatch(expected: &'static str, actual: Atom) -> DecodeError {
    DecodeError::new(DecodeErrorKind::AtomMismatch { expected, actual })
}

fn unsupported(codec: &'static str, value: &Value) -> EncodeError {
    EncodeError::new(EncodeErrorKind::UnsupportedType {
        codec,
        actual: value.atom(),
    })
}

fn read_exact_varint(payload: &mut BytesRef) -> DecodeResult<u64> {
    let value = payload.read_varint()?;
    payload.finish()?;
    Ok(value)
}

fn narrow<T: TryFrom<u64>>(value: u64, atom: Atom) -> DecodeResult<T> {
    T::try_from(value).map_err(|_| DecodeError::new(DecodeErrorKind::IntegerOverflow(atom)))
}

fn write_header(buffer: &mut Vec<u8>, atom: Atom, id: FieldId) {
    buffer.push(atom.into());
    buffer.push(id);
}

/// Codec for `Atom::Boolean`: a single `0x00` or `0x01` byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanCodec;

impl BinaryCodec for BooleanCodec {
    fn decode(&self, data: Bytes) -> DecodeResult<(Value, FieldId)> {
        let (atom, id, mut payload) = open(&data)?;
        if atom != Atom::Boolean {
            return Err(mismatch("bool", atom));
        }
        let byte = payload.read_byte()?;
        payload.finish()?;
        match byte {
            0x00 => Ok((Value::Boolean(false), id)),
            0x01 => Ok((Value::Boolean(true), id)),
            b => Err(DecodeError::new(DecodeErrorKind::InvalidBool(b))),
        }
    }

    fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let Value::Boolean(flag) = value else {
            return Err(unsupported("bool", value));
        };
        write_header(buffer, Atom::Boolean, id);
        buffer.push(u8::from(*flag));
        Ok(())
    }

    fn encoded_len(&self, value: &Value) -> usize {
        match value {
            Value::Boolean(_) => 3,
            _ => 0,
        }
    }
}

impl TextualCodec for BooleanCodec {
    fn text_decode(&self, data: &[u8]) -> DecodeResult<Value> {
        match data {
            b"true" => Ok(Value::Boolean(true)),
            b"false" => Ok(Value::Boolean(false)),
            _ => Err(DecodeError::new(DecodeErrorKind::InvalidTextual("bool"))),
        }
    }

    fn text_encode(&self, value: &Value, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        match value {
            Value::Boolean(true) => buffer.extend_from_slice(b"true"),
            Value::Boolean(false) => buffer.extend_from_slice(b"false"),
            other => return Err(unsupported("bool", other)),
        }
        Ok(())
    }
}

/// Codec for every signed and unsigned integer atom.
///
/// 8-bit values are one raw byte and 16-bit values two big-endian bytes;
/// everything wider is a varint of the two's complement bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntCodec;

impl IntCodec {
    /// Payload as a varint source, for the varint-encoded atoms.
    fn varint_payload(value: &Value) -> Option<u64> {
        // A platform-width value below 2^31 (2^32 unsigned) produces the same
        // bytes as a 32-bit varint; larger or negative ones use all 64 bits.
        match *value {
            Value::Int(v) => Some(v as u64),
            Value::Int32(v) => Some(u64::from(v as u32)),
            Value::Int64(v) => Some(v as u64),
            Value::UInt(v) => Some(v),
            Value::UInt32(v) => Some(u64::from(v)),
            Value::UInt64(v) => Some(v),
            _ => None,
        }
    }
}

impl BinaryCodec for IntCodec {
    fn decode(&self, data: Bytes) -> DecodeResult<(Value, FieldId)> {
        let (atom, id, mut payload) = open(&data)?;
        let value = match atom {
            Atom::Int8 | Atom::UInt8 => {
                let byte = payload.read_byte()?;
                payload.finish()?;
                if atom == Atom::Int8 {
                    Value::Int8(byte as i8)
                } else {
                    Value::UInt8(byte)
                }
            }
            Atom::Int16 | Atom::UInt16 => {
                let raw = decode_u16_be(&payload.read(2)?).unwrap_or_default();
                payload.finish()?;
                if atom == Atom::Int16 {
                    Value::Int16(raw as i16)
                } else {
                    Value::UInt16(raw)
                }
            }
            Atom::Int32 => Value::Int32(narrow::<u32>(read_exact_varint(&mut payload)?, atom)? as i32),
            Atom::UInt32 => Value::UInt32(narrow(read_exact_varint(&mut payload)?, atom)?),
            Atom::Int64 => Value::Int64(read_exact_varint(&mut payload)? as i64),
            Atom::UInt64 => Value::UInt64(read_exact_varint(&mut payload)?),
            Atom::Int => Value::Int(read_exact_varint(&mut payload)? as i64),
            Atom::UInt => Value::UInt(read_exact_varint(&mut payload)?),
            other => return Err(mismatch("integer", other)),
        };
        Ok((value, id))
    }

    fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        match *value {
            Value::Int8(v) => {
                write_header(buffer, Atom::Int8, id);
                buffer.push(v as u8);
            }
            Value::UInt8(v) => {
                write_header(buffer, Atom::UInt8, id);
                buffer.push(v);
            }
            Value::Int16(v) => {
                write_header(buffer, Atom::Int16, id);
                encode_u16_be(v as u16, buffer);
            }
            Value::UInt16(v) => {
                write_header(buffer, Atom::UInt16, id);
                encode_u16_be(v, buffer);
            }
            _ => {
                let raw = Self::varint_payload(value).ok_or_else(|| unsupported("integer", value))?;
                write_header(buffer, value.atom(), id);
                encode_varint(raw, buffer);
            }
        }
        Ok(())
    }

    fn encoded_len(&self, value: &Value) -> usize {
        match value {
            Value::Int8(_) | Value::UInt8(_) => 3,
            Value::Int16(_) | Value::UInt16(_) => 4,
            _ => Self::varint_payload(value).map_or(0, |raw| 2 + varint_len(raw)),
        }
    }
}

impl TextualCodec for IntCodec {
    /// Parses a decimal integer into `Int64`.
    fn text_decode(&self, data: &[u8]) -> DecodeResult<Value> {
        std::str::from_utf8(data)
            .ok()
            .and_then(|text| text.parse::<i64>().ok())
            .map(Value::Int64)
            .ok_or_else(|| DecodeError::new(DecodeErrorKind::InvalidTextual("integer")))
    }

    fn text_encode(&self, value: &Value, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let text = match *value {
            Value::Int(v) | Value::Int64(v) => v.to_string(),
            Value::Int8(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::UInt(v) | Value::UInt64(v) => v.to_string(),
            Value::UInt8(v) => v.to_string(),
            Value::UInt16(v) => v.to_string(),
            Value::UInt32(v) => v.to_string(),
            _ => return Err(unsupported("integer", value)),
        };
        buffer.extend_from_slice(text.as_bytes());
        Ok(())
    }
}

/// Codec for `Float32`/`Float64`: a varint of the byte-reversed IEEE-754
/// bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCodec;

impl FloatCodec {
    fn wire(value: &Value) -> Option<u64> {
        match *value {
            Value::Float32(v) => Some(u64::from(float32_to_wire(v))),
            Value::Float64(v) => Some(float64_to_wire(v)),
            _ => None,
        }
    }
}

impl BinaryCodec for FloatCodec {
    fn decode(&self, data: Bytes) -> DecodeResult<(Value, FieldId)> {
        let (atom, id, mut payload) = open(&data)?;
        let value = match atom {
            Atom::Float32 => {
                let wire = narrow::<u32>(read_exact_varint(&mut payload)?, atom)?;
                Value::Float32(wire_to_float32(wire))
            }
            Atom::Float64 => Value::Float64(wire_to_float64(read_exact_varint(&mut payload)?)),
            other => return Err(mismatch("float", other)),
        };
        Ok((value, id))
    }

    fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let wire = Self::wire(value).ok_or_else(|| unsupported("float", value))?;
        write_header(buffer, value.atom(), id);
        encode_varint(wire, buffer);
        Ok(())
    }

    fn encoded_len(&self, value: &Value) -> usize {
        Self::wire(value).map_or(0, |wire| 2 + varint_len(wire))
    }
}

impl TextualCodec for FloatCodec {
    /// Parses a decimal number into `Float64`.
    fn text_decode(&self, data: &[u8]) -> DecodeResult<Value> {
        std::str::from_utf8(data)
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .map(Value::Float64)
            .ok_or_else(|| DecodeError::new(DecodeErrorKind::InvalidTextual("float")))
    }

    /// Fixed-point with ten fractional digits.
    fn text_encode(&self, value: &Value, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let text = match *value {
            Value::Float32(v) => format!("{v:.10}"),
            Value::Float64(v) => format!("{v:.10}"),
            _ => return Err(unsupported("float", value)),
        };
        buffer.extend_from_slice(text.as_bytes());
        Ok(())
    }
}

/// Codec for `Atom::Bytes`. The payload runs to the end of the slice.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl BinaryCodec for BytesCodec {
    fn decode(&self, data: Bytes) -> DecodeResult<(Value, FieldId)> {
        let (atom, id, payload) = open(&data)?;
        if atom != Atom::Bytes {
            return Err(mismatch("bytes", atom));
        }
        Ok((Value::Bytes(payload.to_bytes()), id))
    }

    fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let Value::Bytes(bytes) = value else {
            return Err(unsupported("bytes", value));
        };
        write_header(buffer, Atom::Bytes, id);
        buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn encoded_len(&self, value: &Value) -> usize {
        match value {
            Value::Bytes(bytes) => 2 + bytes.len(),
            _ => 0,
        }
    }
}

impl TextualCodec for BytesCodec {
    fn text_decode(&self, data: &[u8]) -> DecodeResult<Value> {
        Ok(Value::Bytes(Bytes::copy_from_slice(data)))
    }

    fn text_encode(&self, value: &Value, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let Value::Bytes(bytes) = value else {
            return Err(unsupported("bytes", value));
        };
        buffer.extend_from_slice(bytes);
        Ok(())
    }
}

/// Codec for `Atom::Text`. The payload is UTF-8 running to the end of the
/// slice; the textual form is a double-quoted, escaped string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl BinaryCodec for TextCodec {
    fn decode(&self, data: Bytes) -> DecodeResult<(Value, FieldId)> {
        let (atom, id, payload) = open(&data)?;
        if atom != Atom::Text {
            return Err(mismatch("text", atom));
        }
        let text = std::str::from_utf8(&payload)
            .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidUtf8))?;
        Ok((Value::Text(text.to_string()), id))
    }

    fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let Value::Text(text) = value else {
            return Err(unsupported("text", value));
        };
        write_header(buffer, Atom::Text, id);
        buffer.extend_from_slice(text.as_bytes());
        Ok(())
    }

    fn encoded_len(&self, value: &Value) -> usize {
        match value {
            Value::Text(text) => 2 + text.len(),
            _ => 0,
        }
    }
}

impl TextualCodec for TextCodec {
    fn text_decode(&self, data: &[u8]) -> DecodeResult<Value> {
        unquote(data).map(Value::Text)
    }

    fn text_encode(&self, value: &Value, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let Value::Text(text) = value else {
            return Err(unsupported("text", value));
        };
        buffer.extend_from_slice(quote(text).as_bytes());
        Ok(())
    }
}

/// Codec for `Atom::Time`: RFC 3339 text at second precision, `Z` for UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeCodec;

impl TimeCodec {
    /// RFC 3339 only has four-digit years.
    fn format(value: &Value) -> EncodeResult<String> {
        match value {
            Value::Time(time) if (0..=9999).contains(&time.year()) => {
                Ok(time.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            Value::Time(time) => Err(EncodeError::new(EncodeErrorKind::TimeOutOfRange {
                year: time.year(),
            })),
            _ => Err(unsupported("time", value)),
        }
    }

    fn parse(text: &str) -> DecodeResult<Value> {
        DateTime::parse_from_rfc3339(text)
            .map(Value::Time)
            .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidTimestamp))
    }
}

impl BinaryCodec for TimeCodec {
    fn decode(&self, data: Bytes) -> DecodeResult<(Value, FieldId)> {
        let (atom, id, payload) = open(&data)?;
        if atom != Atom::Time {
            return Err(mismatch("time", atom));
        }
        if payload.is_empty() {
            return Err(DecodeError::new(DecodeErrorKind::TruncatedInput {
                needed: 3,
                available: 2,
            }));
        }
        let parsed = std::str::from_utf8(&payload)
            .map_err(|_| DecodeError::new(DecodeErrorKind::InvalidTimestamp))
            .and_then(Self::parse);
        match parsed {
            Ok(value) => Ok((value, id)),
            Err(err) => match cut_short_timestamp(&payload) {
                Some(full) => Err(DecodeError::new(DecodeErrorKind::TruncatedInput {
                    needed: 2 + full,
                    available: data.len(),
                })),
                None => Err(err),
            },
        }
    }

    fn encode(&self, value: &Value, id: FieldId, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let text = Self::format(value)?;
        write_header(buffer, Atom::Time, id);
        buffer.extend_from_slice(text.as_bytes());
        Ok(())
    }

    fn encoded_len(&self, value: &Value) -> usize {
        Self::format(value).map_or(0, |text| 2 + text.len())
    }
}

impl TextualCodec for TimeCodec {
    fn text_decode(&self, data: &[u8]) -> DecodeResult<Value> {
        Self::parse(&unquote(data)?)
    }

    fn text_encode(&self, value: &Value, buffer: &mut Vec<u8>) -> EncodeResult<()> {
        let text = Self::format(value)?;
        buffer.extend_from_slice(quote(&text).as_bytes());
        Ok(())
    }
}

/// If `text` is the start of a well-formed timestamp that ends early, returns
/// the length the complete timestamp would have.
fn cut_short_timestamp(text: &[u8]) -> Option<usize> {
    const SHAPE: &[u8] = b"0000-00-00T00:00:00+00:00";
    let full = match text.get(19) {
        Some(b'+' | b'-') => 25,
        _ => 20,
    };
    let shaped = text.iter().zip(SHAPE).all(|(&b, &s)| match s {
        b'0' => b.is_ascii_digit(),
        b'+' => b == b'+' || b == b'-',
        s => b == s,
    });
    (text.len() < full && shaped).then_some(full)
}

/// Formats a string as a quoted literal with escapes.
fn quote(s: &str) -> String {
    let mut output = String::with_capacity(s.len() + 2);
    output.push('"');
    for c in s.chars() {
        match c {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            c if c.is_ascii_control() => {
                write!(output, "\\x{:02x}", c as u32).unwrap();
            }
            c => output.push(c),
        }
    }
    output.push('"');
    output
}

/// Inverse of `quote`.
fn unquote(data: &[u8]) -> DecodeResult<String> {
    let invalid = || DecodeError::new(DecodeErrorKind::InvalidTextual("quoted string"));

    let text = std::str::from_utf8(data).map_err(|_| invalid())?;
    let inner = text
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(invalid)?;

    let mut output = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next().ok_or_else(invalid)? {
                '"' => output.push('"'),
                '\\' => output.push('\\'),
                'n' => output.push('\n'),
                'r' => output.push('\r'),
                't' => output.push('\t'),
                'x' => {
                    let hex: String = chars.by_ref().take(2).collect();
                    let code = u8::from_str_radix(&hex, 16).map_err(|_| invalid())?;
                    if hex.len() != 2 || !code.is_ascii() {
                        return Err(invalid());
                    }
                    output.push(char::from(code));
                }
                _ => return Err(invalid()),
            },
            '"' => return Err(invalid()),
            c => output.push(c),
        }
    }
    Ok(output)
}
