use crate::codec::encode_value_with;
use crate::{EncodeResult, Limits, Voxa};

/// Serialize a value to Voxa binary format as a Vec<u8>.
///
/// The top-level value is written with field id 0.
pub fn to_vec<T: Voxa>(value: &T) -> EncodeResult<Vec<u8>> {
    to_vec_with(value, &Limits::default())
}

/// Like [`to_vec`], with an explicit nesting limit.
pub fn to_vec_with<T: Voxa>(value: &T, limits: &Limits) -> EncodeResult<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_value_with(&value.to_value()?, 0, &mut buffer, limits)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::{to_vec, to_vec_with};
    use crate::{EncodeError, EncodeErrorKind, Limits};

    #[test]
    fn test_top_level_id_is_zero() {
        assert_eq!(to_vec(&26i32), Ok(vec![0x06, 0x00, 0x1A]));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = vec![vec![vec![1u8]]];
        assert!(to_vec_with(&nested, &Limits::default().with_max_depth(3)).is_ok());
        assert_eq!(
            to_vec_with(&nested, &Limits::default().with_max_depth(2)),
            Err(EncodeError::new(EncodeErrorKind::NestingTooDeep { limit: 2 }))
        );
    }
}
