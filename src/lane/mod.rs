//! Element kinds, lane types, vectors and masks.
//!
//! A vector shape is an element kind plus a lane count. Every valid shape
//! spans a positive multiple of [`MIN_VECTOR_BYTES`] bytes; the lane count is
//! otherwise unconstrained, so a `u8` vector may have 16, 48 or 4096 lanes.

mod kind;
mod mask;
mod vector;
mod width;

pub use kind::{ElementKind, Lane};
pub use mask::Mask;
pub use vector::Vector;
pub use width::Width;

pub(crate) use kind::bits_from_ne_bytes;

use crate::common::{Error, Result};

/// Smallest vector size in bytes; every shape is a multiple of it.
pub const MIN_VECTOR_BYTES: usize = 16;

/// Check that `lanes` lanes of `kind` form a valid shape.
pub fn validate_lanes(kind: ElementKind, lanes: usize) -> Result<()> {
    let bytes = lanes * kind.size();
    if lanes == 0 || bytes % MIN_VECTOR_BYTES != 0 {
        return Err(Error::LaneCount { kind, lanes });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_lanes() {
        assert!(validate_lanes(ElementKind::U8, 16).is_ok());
        assert!(validate_lanes(ElementKind::U8, 48).is_ok());
        assert!(validate_lanes(ElementKind::F64, 2).is_ok());
        assert!(validate_lanes(ElementKind::U32, 12).is_ok());

        assert!(matches!(
            validate_lanes(ElementKind::U8, 0),
            Err(Error::LaneCount { lanes: 0, .. })
        ));
        assert!(validate_lanes(ElementKind::U8, 15).is_err());
        assert!(validate_lanes(ElementKind::U64, 1).is_err());
        assert!(validate_lanes(ElementKind::I16, 12).is_err());
    }
}
