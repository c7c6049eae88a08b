use super::{BinaryKernel, BinaryOp, MaskOp, MaskedKernel, OpId, PackedMaskKernel, native};
use crate::arch::Isa;
use crate::lane::{ElementKind, Lane};

/// Bitwise AND-NOT: `a & !b` on every lane.
///
/// For floats the operation is applied to the raw bit pattern, never to the
/// numeric value. Masks use the boolean form `a && !b`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitAndNot;

impl BinaryOp for BitAndNot {
    const ID: OpId = OpId::BitAndNot;
    const NAME: &'static str = "bit_andnot";
    const WIDTH_OBLIVIOUS: bool = true;

    #[inline]
    fn scalar<T: Lane>(a: T, b: T) -> T {
        T::from_bits(a.to_bits() & !b.to_bits())
    }

    fn kernel(isa: Isa, kind: ElementKind) -> Option<BinaryKernel> {
        native::andnot(isa, kind)
    }
}

impl MaskOp for BitAndNot {
    const MASK_SLOT: usize = 0;

    #[inline]
    fn scalar_mask(a: bool, b: bool) -> bool {
        a && !b
    }

    #[inline]
    fn scalar_masked<T: Lane>(a: T, b: bool) -> T {
        if b { T::ZERO } else { a }
    }

    fn packed_kernel(isa: Isa, kind: ElementKind) -> Option<PackedMaskKernel> {
        native::andnot_packed(isa, kind)
    }

    fn masked_kernel(isa: Isa, kind: ElementKind) -> Option<MaskedKernel> {
        native::andnot_masked(isa, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_integers() {
        assert_eq!(BitAndNot::scalar(0xFFu8, 0x0F), 0xF0);
        assert_eq!(BitAndNot::scalar(-1i16, 0x00FF), -256);
        assert_eq!(BitAndNot::scalar(u64::MAX, u64::MAX), 0);
        assert_eq!(BitAndNot::scalar(0x1234_5678u32, 0), 0x1234_5678);
    }

    #[test]
    fn test_scalar_floats_are_bitwise() {
        // Clearing the sign bit gives the absolute value.
        assert_eq!(BitAndNot::scalar(-2.5f32, -0.0), 2.5);
        assert_eq!(BitAndNot::scalar(-1.0f64, -0.0), 1.0);

        let nan = f32::from_bits(0x7FC0_0001);
        let r = BitAndNot::scalar(nan, 0.0);
        assert_eq!(r.to_bits(), 0x7FC0_0001);
    }

    #[test]
    fn test_scalar_mask_forms() {
        assert!(BitAndNot::scalar_mask(true, false));
        assert!(!BitAndNot::scalar_mask(true, true));
        assert!(!BitAndNot::scalar_mask(false, false));
        assert_eq!(BitAndNot::scalar_masked(7u32, false), 7);
        assert_eq!(BitAndNot::scalar_masked(7u32, true), 0);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_x86_direct_bindings() {
        assert!(BitAndNot::kernel(Isa::Sse2, ElementKind::U8).is_some());
        assert!(BitAndNot::kernel(Isa::Sse2, ElementKind::F32).is_some());
        assert!(BitAndNot::kernel(Isa::Sse2, ElementKind::U16).is_none());
        assert!(BitAndNot::kernel(Isa::Avx, ElementKind::U8).is_none());
        assert!(BitAndNot::kernel(Isa::Avx, ElementKind::F64).is_some());
        assert!(BitAndNot::kernel(Isa::Avx2, ElementKind::U64).is_some());
        assert!(BitAndNot::kernel(Isa::Avx2, ElementKind::I64).is_none());
        assert!(BitAndNot::kernel(Isa::Neon, ElementKind::U8).is_none());
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn test_neon_direct_bindings() {
        assert!(BitAndNot::kernel(Isa::Neon, ElementKind::U8).is_some());
        assert!(BitAndNot::kernel(Isa::Neon, ElementKind::F32).is_none());
        assert!(BitAndNot::kernel(Isa::Sse2, ElementKind::U8).is_none());
    }
}
