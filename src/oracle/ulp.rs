//! Unit-in-the-last-place stepping for float tolerance checks.

use crate::lane::{Lane, bits_from_ne_bytes};

/// Step to the adjacent representable value.
pub(crate) trait UlpStep: Lane {
    /// The next representable value after `self` in the direction of `toward`.
    ///
    /// Returns `toward` when the two are equal and NaN when either is NaN.
    fn next_after(self, toward: Self) -> Self;
}

macro_rules! impl_ulp_step {
    ($($ty:ty),*) => {$(
        impl UlpStep for $ty {
            fn next_after(self, toward: Self) -> Self {
                if self.is_nan() || toward.is_nan() {
                    return <$ty>::NAN;
                }
                if self == toward {
                    return toward;
                }
                if self == 0.0 {
                    // Smallest subnormal, signed like `toward`.
                    return <$ty>::from_bits(1).copysign(toward);
                }

                let bits = <$ty>::to_bits(self);
                let away_from_zero = (self < toward) == (self > 0.0);
                <$ty>::from_bits(if away_from_zero { bits + 1 } else { bits - 1 })
            }
        }
    )*};
}

impl_ulp_step!(f32, f64);

/// Whether every lane of `a` reaches the matching lane of `b` within `steps` ULP.
///
/// Lanes with identical bits always match, NaN lanes included.
pub(crate) fn lanes_within<T: UlpStep>(a: &[u8], b: &[u8], steps: u32) -> bool {
    let size = T::KIND.size();
    a.len() == b.len()
        && a.chunks_exact(size).zip(b.chunks_exact(size)).all(|(x, y)| {
            if x == y {
                return true;
            }
            let (mut x, y) = (
                T::from_bits(bits_from_ne_bytes(x)),
                T::from_bits(bits_from_ne_bytes(y)),
            );
            for _ in 0..steps {
                if x == y {
                    break;
                }
                x = x.next_after(y);
            }
            x == y
        })
}
