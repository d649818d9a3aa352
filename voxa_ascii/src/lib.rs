//! voxa_ascii provides a human-readable ASCII format for voxa binary data.
//!
//! Any encoded value can be pretty-printed without its schema: record
//! fields show up by field id, and every scalar carries a type suffix.
//!
//! This is inspired by Google's der-ascii project for DER/BER encodings.

mod format;

pub use crate::format::to_ascii;

use voxa::{Atom, DecodeError};

/// Decodes binary voxa data and formats it as ASCII.
///
/// The format has no magic number, so the caller names the top-level atom.
pub fn voxa2ascii(data: &[u8], atom: Atom) -> Result<String, DecodeError> {
    let bytes = bytes::Bytes::copy_from_slice(data);
    let (value, _) = voxa::decode_value(bytes, atom)?;
    Ok(to_ascii(&value))
}
