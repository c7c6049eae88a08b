use super::{BinaryKernel, BinaryOp, OpId, native};
use crate::arch::Isa;
use crate::lane::{ElementKind, Lane};

/// Lane-wise addition, wrapping for integers and IEEE for floats.
///
/// Unlike [`BitAndNot`](super::BitAndNot) the result depends on where lane
/// boundaries fall, so every kind needs a kernel of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

impl BinaryOp for Add {
    const ID: OpId = OpId::Add;
    const NAME: &'static str = "add";
    const WIDTH_OBLIVIOUS: bool = false;

    #[inline]
    fn scalar<T: Lane>(a: T, b: T) -> T {
        a.lane_add(b)
    }

    fn kernel(isa: Isa, kind: ElementKind) -> Option<BinaryKernel> {
        native::add(isa, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        assert_eq!(Add::scalar(200u8, 100), 44);
        assert_eq!(Add::scalar(-1i64, 1), 0);
        assert_eq!(Add::scalar(0.5f32, 0.25), 0.75);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_x86_bindings_cover_every_kind_at_128_bits() {
        for kind in ElementKind::ALL {
            assert!(Add::kernel(Isa::Sse2, kind).is_some(), "{kind}");
        }
        assert!(Add::kernel(Isa::Avx, ElementKind::U8).is_none());
        assert!(Add::kernel(Isa::Avx, ElementKind::F32).is_some());
        assert!(Add::kernel(Isa::Avx2, ElementKind::F32).is_none());
    }
}
