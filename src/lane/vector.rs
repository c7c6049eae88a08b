use super::{ElementKind, Lane, Width, validate_lanes};
use crate::common::{Error, Result};
use std::fmt;
use zerocopy::IntoBytes;

/// A vector of `T` lanes with a valid shape.
///
/// The lane count is fixed at construction and always spans a positive
/// multiple of 16 bytes.
#[derive(Clone, PartialEq)]
pub struct Vector<T: Lane> {
    lanes: Vec<T>,
}

impl<T: Lane> Vector<T> {
    /// Wrap `lanes`, validating the shape.
    pub fn from_lanes(lanes: Vec<T>) -> Result<Self> {
        validate_lanes(T::KIND, lanes.len())?;
        Ok(Self { lanes })
    }

    /// `len` copies of `value`.
    pub fn splat(value: T, len: usize) -> Result<Self> {
        validate_lanes(T::KIND, len)?;
        Ok(Self {
            lanes: vec![value; len],
        })
    }

    /// All-zero vector of `len` lanes.
    pub fn zeroed(len: usize) -> Result<Self> {
        Self::splat(T::ZERO, len)
    }

    /// Lane `i` is `f(i)`.
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> T) -> Result<Self> {
        validate_lanes(T::KIND, len)?;
        Ok(Self {
            lanes: (0..len).map(f).collect(),
        })
    }

    /// Copy lanes out of native-endian bytes.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let size = T::KIND.size();
        let lanes = bytes.len() / size;
        if bytes.len() % size != 0 {
            return Err(Error::LaneCount {
                kind: T::KIND,
                lanes,
            });
        }

        let mut vector = Self::zeroed(lanes)?;
        vector.lanes.as_mut_bytes().copy_from_slice(bytes);
        Ok(vector)
    }

    /// Copy lanes into native-endian bytes; `out` must be exactly [`Self::byte_len`] long.
    pub fn store(&self, out: &mut [u8]) -> Result<()> {
        if out.len() != self.byte_len() {
            return Err(Error::ShapeMismatch {
                left: self.len(),
                right: out.len() / T::KIND.size(),
            });
        }
        out.copy_from_slice(self.as_bytes());
        Ok(())
    }

    /// Concatenate vectors lane-wise, in order.
    pub fn concat(parts: &[Vector<T>]) -> Result<Self> {
        let lanes: Vec<T> = parts
            .iter()
            .flat_map(|part| part.lanes.iter().copied())
            .collect();
        Self::from_lanes(lanes)
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Always `false`; a valid shape has at least one lane.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    pub fn lanes(&self) -> &[T] {
        &self.lanes
    }

    pub fn into_lanes(self) -> Vec<T> {
        self.lanes
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.lanes.get(index).copied()
    }

    pub fn byte_len(&self) -> usize {
        self.lanes.len() * T::KIND.size()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.lanes.as_bytes()
    }

    /// Register-width segments in ascending lane order.
    ///
    /// Lanes past the last whole segment are not yielded.
    pub fn segments(&self, width: Width) -> impl ExactSizeIterator<Item = &[T]> {
        self.lanes.chunks_exact(width.lanes(T::KIND))
    }

    /// Zeroed vector whose shape the caller has already validated.
    pub(crate) fn from_validated(len: usize) -> Self {
        debug_assert!(validate_lanes(T::KIND, len).is_ok());
        Self {
            lanes: vec![T::ZERO; len],
        }
    }

    pub(crate) fn lanes_mut(&mut self) -> &mut [T] {
        &mut self.lanes
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8] {
        self.lanes.as_mut_bytes()
    }
}

impl<T: Lane> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vector<{}x{}>", T::KIND, self.len())?;
        f.debug_list().entries(self.lanes.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_validation() {
        assert!(Vector::<u8>::zeroed(16).is_ok());
        assert!(Vector::<f64>::splat(1.0, 2).is_ok());
        assert!(Vector::<u32>::from_lanes(vec![1, 2, 3]).is_err());
        assert!(Vector::<u64>::zeroed(0).is_err());
    }

    #[test]
    fn test_load_store() {
        let bytes: Vec<u8> = (0..32).collect();
        let vector = Vector::<u16>::load(&bytes).unwrap();
        assert_eq!(vector.len(), 16);
        assert_eq!(vector.get(0), Some(u16::from_ne_bytes([0, 1])));

        let mut out = vec![0u8; 32];
        vector.store(&mut out).unwrap();
        assert_eq!(out, bytes);

        let mut short = vec![0u8; 16];
        assert!(matches!(
            vector.store(&mut short),
            Err(Error::ShapeMismatch { left: 16, right: 8 })
        ));
    }

    #[test]
    fn test_load_rejects_partial_lane() {
        assert!(Vector::<u32>::load(&[0u8; 17]).is_err());
        assert!(Vector::<u32>::load(&[0u8; 8]).is_err());
    }

    #[test]
    fn test_segments_and_concat() {
        let vector = Vector::from_fn(12, |i| i as u32).unwrap();
        let segments: Vec<_> = vector.segments(Width::B128).collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1], &[4, 5, 6, 7]);

        let parts: Vec<_> = segments
            .iter()
            .map(|s| Vector::from_lanes(s.to_vec()).unwrap())
            .collect();
        assert_eq!(Vector::concat(&parts).unwrap(), vector);
    }

    #[test]
    fn test_debug() {
        let vector = Vector::splat(1u32, 4).unwrap();
        assert_eq!(format!("{vector:?}"), "Vector<uint32x4>[1, 1, 1, 1]");
    }
}
