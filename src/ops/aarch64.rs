//! aarch64 kernels. NEON is part of the base architecture, so every kernel
//! here is always compiled.

use super::{BinaryKernel, MaskedKernel, PackedMaskKernel};
use crate::arch::Isa;
use crate::lane::ElementKind::{self, *};
use std::arch::aarch64::*;

/// Define a one-register data kernel over lanes of `$lane`.
macro_rules! kernel {
    ($name:ident, $lane:ty, $load:ident, $store:ident, |$va:ident, $vb:ident| $body:expr) => {
        #[target_feature(enable = "neon")]
        #[inline]
        unsafe fn $name(a: &[u8], b: &[u8], out: &mut [u8]) {
            debug_assert!(a.len() >= 16 && b.len() >= 16 && out.len() >= 16);
            unsafe {
                let $va = $load(a.as_ptr() as *const $lane);
                let $vb = $load(b.as_ptr() as *const $lane);
                $store(out.as_mut_ptr() as *mut $lane, $body);
            }
        }
    };
}

// `vbicq` computes `first & !second`, already the AND-NOT operand order.
kernel!(andnot_u8, u8, vld1q_u8, vst1q_u8, |va, vb| vbicq_u8(va, vb));

/// Direct AND-NOT bindings: bytes only, every other kind composes.
pub(super) fn andnot(isa: Isa, kind: ElementKind) -> Option<BinaryKernel> {
    let kernel: BinaryKernel = match (isa, kind) {
        (Isa::Neon, U8) => andnot_u8,
        _ => return None,
    };
    Some(kernel)
}

/// NEON has no packed-bit mask registers.
pub(super) fn andnot_packed(_isa: Isa, _kind: ElementKind) -> Option<PackedMaskKernel> {
    None
}

pub(super) fn andnot_masked(_isa: Isa, _kind: ElementKind) -> Option<MaskedKernel> {
    None
}

kernel!(add_u8, u8, vld1q_u8, vst1q_u8, |va, vb| vaddq_u8(va, vb));
kernel!(add_u16, u16, vld1q_u16, vst1q_u16, |va, vb| vaddq_u16(va, vb));
kernel!(add_u32, u32, vld1q_u32, vst1q_u32, |va, vb| vaddq_u32(va, vb));
kernel!(add_u64, u64, vld1q_u64, vst1q_u64, |va, vb| vaddq_u64(va, vb));
kernel!(add_f32, f32, vld1q_f32, vst1q_f32, |va, vb| vaddq_f32(va, vb));
kernel!(add_f64, f64, vld1q_f64, vst1q_f64, |va, vb| vaddq_f64(va, vb));

/// Direct addition bindings. Signed and unsigned kinds share kernels.
pub(super) fn add(isa: Isa, kind: ElementKind) -> Option<BinaryKernel> {
    let kernel: BinaryKernel = match (isa, kind) {
        (Isa::Neon, U8 | I8) => add_u8,
        (Isa::Neon, U16 | I16) => add_u16,
        (Isa::Neon, U32 | I32) => add_u32,
        (Isa::Neon, U64 | I64) => add_u64,
        (Isa::Neon, F32) => add_f32,
        (Isa::Neon, F64) => add_f64,
        _ => return None,
    };
    Some(kernel)
}
