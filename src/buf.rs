use crate::varint::{MAX_VARINT_LEN, decode_varint};
use crate::{DecodeError, DecodeErrorKind, DecodeResult};

/// A checked read cursor over a shared `Bytes` buffer.
///
/// Every read either returns exactly the requested bytes or a
/// `TruncatedInput` error; slices handed out keep pointing into the
/// original buffer so payloads can be turned back into `Bytes` without
/// copying.
#[derive(Clone, Copy)]
pub struct BytesRef<'a> {
    b: &'a bytes::Bytes,
    data: &'a [u8],
}

impl<'a> BytesRef<'a> {
    pub fn new(b: &'a bytes::Bytes) -> Self {
        BytesRef { b, data: b }
    }

    pub fn read(&mut self, amt: usize) -> DecodeResult<Self> {
        if amt > self.len() {
            return Err(DecodeError::new(DecodeErrorKind::TruncatedInput {
                needed: amt,
                available: self.len(),
            }));
        }
        let (result, data) = self.data.split_at(amt);
        self.data = data;
        Ok(BytesRef {
            b: self.b,
            data: result,
        })
    }

    pub fn read_byte(&mut self) -> DecodeResult<u8> {
        let bytes = self.read(1)?;
        Ok(bytes[0])
    }

    pub fn read_varint(&mut self) -> DecodeResult<u64> {
        match decode_varint(self.data) {
            Some((value, consumed)) => {
                self.data = &self.data[consumed..];
                Ok(value)
            }
            None if self.len() < MAX_VARINT_LEN => {
                Err(DecodeError::new(DecodeErrorKind::TruncatedInput {
                    needed: self.len() + 1,
                    available: self.len(),
                }))
            }
            None => Err(DecodeError::new(DecodeErrorKind::InvalidVarint)),
        }
    }

    /// Fails with `ExtraData` unless every byte has been consumed.
    pub fn finish(&self) -> DecodeResult<()> {
        if !self.is_empty() {
            return Err(DecodeError::new(DecodeErrorKind::ExtraData {
                bytes_remaining: self.len(),
            }));
        }
        Ok(())
    }

    /// Returns the remaining data as a zero-copy `Bytes` slice.
    pub fn to_bytes(&self) -> bytes::Bytes {
        self.b.slice_ref(self.data)
    }
}

impl std::ops::Deref for BytesRef<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data
    }
}
