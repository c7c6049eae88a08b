use super::{ElementKind, Lane, Vector, validate_lanes};
use crate::common::Result;
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;
use std::fmt;
use std::marker::PhantomData;

/// A boolean lane vector associated with element kind `T`.
///
/// Masks of different kinds are distinct types; [`Mask::cast`] converts
/// between them explicitly. The lane count obeys the same shape rule as a
/// `Vector<T>` of the same length.
pub struct Mask<T: Lane> {
    bits: FixedBitSet,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Lane> Mask<T> {
    /// `len` lanes, all set to `value`.
    pub fn splat(value: bool, len: usize) -> Result<Self> {
        validate_lanes(T::KIND, len)?;
        let mut bits = FixedBitSet::with_capacity(len);
        if value {
            bits.insert_range(..);
        }
        Ok(Self::from_bitset(bits))
    }

    pub fn from_bools(values: impl IntoIterator<Item = bool>) -> Result<Self> {
        let values: Vec<bool> = values.into_iter().collect();
        Self::from_fn(values.len(), |i| values[i])
    }

    /// Lane `i` is `f(i)`.
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> bool) -> Result<Self> {
        validate_lanes(T::KIND, len)?;
        let mut bits = FixedBitSet::with_capacity(len);
        for i in 0..len {
            bits.set(i, f(i));
        }
        Ok(Self::from_bitset(bits))
    }

    /// A lane is `true` iff its data lane has any bit set.
    pub fn from_vector(vector: &Vector<T>) -> Self {
        let mut bits = FixedBitSet::with_capacity(vector.len());
        for (i, lane) in vector.lanes().iter().enumerate() {
            bits.set(i, lane.to_bits() != 0);
        }
        Self::from_bitset(bits)
    }

    /// Data form: `true` lanes become all-ones, `false` lanes zero.
    pub fn to_vector(&self) -> Vector<T> {
        let mut vector = Vector::from_validated(self.len());
        for (lane, set) in vector.lanes_mut().iter_mut().zip(self.iter()) {
            *lane = if set { T::ONES } else { T::ZERO };
        }
        vector
    }

    /// Reinterpret as a mask of another kind with the same lane count.
    pub fn cast<U: Lane>(&self) -> Result<Mask<U>> {
        validate_lanes(U::KIND, self.len())?;
        Ok(Mask::from_bitset(self.bits.clone()))
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always `false`; a valid shape has at least one lane.
    pub fn is_empty(&self) -> bool {
        self.bits.len() == 0
    }

    pub fn kind(&self) -> ElementKind {
        T::KIND
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len()).then(|| self.bits.contains(index))
    }

    /// Set lane `index`; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: bool) {
        if index < self.len() {
            self.bits.set(index, value);
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.len()).map(|i| self.bits.contains(i))
    }

    /// Check if all lanes are set
    #[inline]
    pub fn all(&self) -> bool {
        self.count() == self.len()
    }

    /// Check if any lane is set
    #[inline]
    pub fn any(&self) -> bool {
        self.count() > 0
    }

    /// Check if no lanes are set
    #[inline]
    pub fn none(&self) -> bool {
        !self.any()
    }

    /// Number of set lanes
    pub fn count(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Pack into one word per segment of `lanes_per_segment` lanes, lowest lane in bit 0.
    pub(crate) fn pack(&self, lanes_per_segment: usize) -> SmallVec<[u64; 8]> {
        debug_assert!(lanes_per_segment > 0 && lanes_per_segment <= 64);
        (0..self.len() / lanes_per_segment)
            .map(|segment| {
                let base = segment * lanes_per_segment;
                (0..lanes_per_segment).fold(0u64, |word, lane| {
                    word | (u64::from(self.bits.contains(base + lane)) << lane)
                })
            })
            .collect()
    }

    /// Inverse of [`Self::pack`] for a mask of `len` lanes.
    pub(crate) fn unpack(words: &[u64], lanes_per_segment: usize, len: usize) -> Self {
        let mut bits = FixedBitSet::with_capacity(len);
        for (segment, word) in words.iter().enumerate() {
            let base = segment * lanes_per_segment;
            for lane in 0..lanes_per_segment {
                bits.set(base + lane, (word >> lane) & 1 == 1);
            }
        }
        Self::from_bitset(bits)
    }

    fn from_bitset(bits: FixedBitSet) -> Self {
        Self {
            bits,
            _kind: PhantomData,
        }
    }
}

impl<T: Lane> Clone for Mask<T> {
    fn clone(&self) -> Self {
        Self::from_bitset(self.bits.clone())
    }
}

impl<T: Lane> PartialEq for Mask<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<T: Lane> Eq for Mask<T> {}

impl<T: Lane> fmt::Debug for Mask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask<{}x{}>[", T::KIND, self.len())?;
        for set in self.iter() {
            f.write_str(if set { "1" } else { "0" })?;
        }
        f.write_str("]")
    }
}
