//! Variable-length integers, fixed-width big-endian integers and the float
//! byte-order transform shared by the scalar codecs.

/// Longest varint a `u64` can produce.
pub const MAX_VARINT_LEN: usize = 10;

/// Appends the varint encoding of `value`: 7 data bits per byte, least
/// significant group first, high bit set on every byte but the last.
pub fn encode_varint(mut value: u64, buffer: &mut Vec<u8>) {
    while value > 0x7F {
        buffer.push(0x80 | (value & 0x7F) as u8);
        value >>= 7;
    }
    buffer.push(value as u8);
}

/// Number of bytes `encode_varint` writes for `value`.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Reads a varint from the front of `buf`, returning the value and the number
/// of bytes consumed.
///
/// Returns `None` when `buf` ends before a terminating byte, or when ten
/// groups are read without one.
pub fn decode_varint(buf: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    for (n, byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * n);
        if byte & 0x80 == 0 {
            return Some((value, n + 1));
        }
    }
    None
}

pub fn encode_u16_be(value: u16, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

pub fn encode_u32_be(value: u32, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

pub fn encode_u64_be(value: u64, buffer: &mut Vec<u8>) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

pub fn decode_u16_be(buf: &[u8]) -> Option<u16> {
    let bytes = buf.get(..2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

pub fn decode_u32_be(buf: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = buf.get(..4)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

pub fn decode_u64_be(buf: &[u8]) -> Option<u64> {
    let bytes: [u8; 8] = buf.get(..8)?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

/// IEEE-754 bits with their byte order reversed, so the sign and exponent
/// land in the low varint groups.
pub fn float32_to_wire(value: f32) -> u32 {
    value.to_bits().swap_bytes()
}

pub fn wire_to_float32(wire: u32) -> f32 {
    f32::from_bits(wire.swap_bytes())
}

pub fn float64_to_wire(value: f64) -> u64 {
    value.to_bits().swap_bytes()
}

pub fn wire_to_float64(wire: u64) -> f64 {
    f64::from_bits(wire.swap_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_known_encodings() {
        let cases: &[(u64, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7F]),
            (128, &[0x80, 0x01]),
            (300, &[0xAC, 0x02]),
            (
                u64::MAX,
                &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01],
            ),
        ];
        for (value, bytes) in cases {
            let mut buffer = Vec::new();
            encode_varint(*value, &mut buffer);
            assert_eq!(&buffer, bytes);
            assert_eq!(varint_len(*value), bytes.len());
            assert_eq!(decode_varint(bytes), Some((*value, bytes.len())));
        }
    }

    #[test]
    fn test_varint_len_boundaries() {
        for shift in 0..64 {
            let value = 1u64 << shift;
            let mut buffer = Vec::new();
            encode_varint(value, &mut buffer);
            assert_eq!(varint_len(value), buffer.len(), "value {value}");

            let mut below = Vec::new();
            encode_varint(value - 1, &mut below);
            assert_eq!(varint_len(value - 1), below.len(), "value {}", value - 1);
        }
    }

    #[test]
    fn test_varint_truncated() {
        assert_eq!(decode_varint(&[]), None);
        assert_eq!(decode_varint(&[0x80]), None);
        assert_eq!(decode_varint(&[0xAC]), None);
        assert_eq!(decode_varint(&[0xFF; 10]), None);
        assert_eq!(decode_varint(&[0xFF; 12]), None);
    }

    #[test]
    fn test_varint_ignores_trailing_bytes() {
        assert_eq!(decode_varint(&[0xAC, 0x02, 0x99, 0x98]), Some((300, 2)));
    }

    #[test]
    fn test_fixed_width_big_endian() {
        let mut buffer = Vec::new();
        encode_u16_be(0x0102, &mut buffer);
        encode_u32_be(0x03040506, &mut buffer);
        encode_u64_be(0x0708090A0B0C0D0E, &mut buffer);
        assert_eq!(
            buffer,
            [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14]
        );
        assert_eq!(decode_u16_be(&buffer), Some(0x0102));
        assert_eq!(decode_u32_be(&buffer[2..]), Some(0x03040506));
        assert_eq!(decode_u64_be(&buffer[6..]), Some(0x0708090A0B0C0D0E));
        assert_eq!(decode_u16_be(&[1]), None);
        assert_eq!(decode_u32_be(&[1, 2, 3]), None);
        assert_eq!(decode_u64_be(&[0; 7]), None);
    }

    #[test]
    fn test_float_transform() {
        // 1.0f64 is 0x3FF0000000000000; reversed, the exponent is the low byte.
        assert_eq!(float64_to_wire(1.0), 0x000000000000F03F);
        assert_eq!(float32_to_wire(1.0), 0x0000803F);
        assert_eq!(varint_len(float64_to_wire(1.0)), 3);

        for value in [0.0f64, -0.0, 32.545, -32.545, f64::MAX, f64::MIN_POSITIVE] {
            assert_eq!(wire_to_float64(float64_to_wire(value)).to_bits(), value.to_bits());
        }
        for value in [0.0f32, 32.5454, -32.5454, f32::MAX, f32::EPSILON] {
            assert_eq!(wire_to_float32(float32_to_wire(value)).to_bits(), value.to_bits());
        }
    }
}
