use crate::codec::Frame;
use crate::record::FieldDef;
use crate::{Atom, DecodeResult, EncodeResult, FieldId, Value};

/// Core trait for types that can be serialized and deserialized in the Voxa format.
pub trait Voxa: Sized {
    /// The atom this type is written with.
    const ATOM: Atom;

    /// Converts the value into the shared value model.
    ///
    /// Fails only for aggregates whose annotations are invalid or whose
    /// contents do not fit the format (for example maps over 255 entries).
    fn to_value(&self) -> EncodeResult<Value>;

    /// Builds the value back from a decoded tree.
    ///
    /// A scalar destination that receives another atom fails with
    /// `AtomMismatch`; a list or record destination fails with
    /// `DestinationMismatch`.
    fn from_value(value: Value) -> DecodeResult<Self>;

    /// Decodes the value from a frame inside a container.
    ///
    /// Lists, maps and derived structs walk the frame's body themselves, so
    /// record fields they have no slot for are never decoded.
    fn from_frame(frame: &Frame<'_>) -> DecodeResult<Self> {
        Self::from_value(frame.to_value()?)
    }
}

/// A struct field: either a plain value or an `Option` that is left out of
/// the record when `None`.
pub trait FieldValue: Sized {
    type T: Voxa;

    fn as_voxa(&self) -> Option<&Self::T>;
    fn from_voxa(value: Self::T) -> Self;
}

impl<T: Voxa> FieldValue for T {
    type T = T;

    fn as_voxa(&self) -> Option<&Self::T> {
        Some(self)
    }

    fn from_voxa(value: Self::T) -> Self {
        value
    }
}

impl<T: Voxa> FieldValue for Option<T> {
    type T = T;

    fn as_voxa(&self) -> Option<&Self::T> {
        self.as_ref()
    }

    fn from_voxa(value: Self::T) -> Self {
        Some(value)
    }
}

/// A destination that record fields can be decoded into one at a time.
pub trait Aggregate {
    /// Whether a wire field with this id has somewhere to go. Fields that
    /// are not accepted are skipped without being decoded.
    fn accepts(&self, id: FieldId) -> bool;

    /// Stores a decoded field.
    fn assign(&mut self, id: FieldId, value: Value) -> DecodeResult<()>;

    /// Stores a field decoded from its frame. Only called for accepted ids.
    fn assign_frame(&mut self, frame: &Frame<'_>) -> DecodeResult<()> {
        self.assign(frame.field_id(), frame.to_value()?)
    }
}

/// Declared fields of a derived struct, in declaration order, with skipped
/// fields left out.
pub trait Schema {
    const FIELDS: &'static [FieldDef];
}
