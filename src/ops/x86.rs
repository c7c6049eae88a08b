//! x86_64 kernels.
//!
//! AVX-512 kernels are compiled only when the build targets AVX-512, since
//! the resolver can only bind families present in
//! [`Capabilities::compiled`](crate::arch::Capabilities::compiled).

use super::{BinaryKernel, MaskedKernel, PackedMaskKernel};
use crate::arch::Isa;
use crate::lane::ElementKind::{self, *};
use std::arch::x86_64::*;

/// Define a one-register data kernel: load `a` and `b` through `$ptr`,
/// combine them with `$body`, store to `out`.
macro_rules! kernel {
    ($name:ident, $feature:literal, $ptr:ty, $load:ident, $store:ident, |$va:ident, $vb:ident| $body:expr) => {
        #[target_feature(enable = $feature)]
        #[inline]
        unsafe fn $name(a: &[u8], b: &[u8], out: &mut [u8]) {
            debug_assert!(a.len() >= out.len() && b.len() >= out.len());
            unsafe {
                let $va = $load(a.as_ptr() as *const $ptr);
                let $vb = $load(b.as_ptr() as *const $ptr);
                $store(out.as_mut_ptr() as *mut $ptr, $body);
            }
        }
    };
}

// === AND-NOT ===
//
// The intrinsics compute `!first & second`, so operands go in swapped.

kernel!(andnot_si128, "sse2", __m128i, _mm_loadu_si128, _mm_storeu_si128, |va, vb| _mm_andnot_si128(vb, va));
kernel!(andnot_ps128, "sse2", f32, _mm_loadu_ps, _mm_storeu_ps, |va, vb| _mm_andnot_ps(vb, va));
kernel!(andnot_pd128, "sse2", f64, _mm_loadu_pd, _mm_storeu_pd, |va, vb| _mm_andnot_pd(vb, va));
kernel!(andnot_ps256, "avx", f32, _mm256_loadu_ps, _mm256_storeu_ps, |va, vb| _mm256_andnot_ps(vb, va));
kernel!(andnot_pd256, "avx", f64, _mm256_loadu_pd, _mm256_storeu_pd, |va, vb| _mm256_andnot_pd(vb, va));
kernel!(andnot_si256, "avx2", __m256i, _mm256_loadu_si256, _mm256_storeu_si256, |va, vb| _mm256_andnot_si256(vb, va));

#[cfg(target_feature = "avx512f")]
kernel!(andnot_epi32_512, "avx512f", i32, _mm512_loadu_epi32, _mm512_storeu_epi32, |va, vb| _mm512_andnot_epi32(vb, va));
#[cfg(target_feature = "avx512f")]
kernel!(andnot_epi64_512, "avx512f", i64, _mm512_loadu_epi64, _mm512_storeu_epi64, |va, vb| _mm512_andnot_epi64(vb, va));

/// Direct AND-NOT bindings.
///
/// SSE2 only binds bytes and the two float kinds; the wider integer kinds
/// reach it through composition. AVX has no integer forms at all.
pub(super) fn andnot(isa: Isa, kind: ElementKind) -> Option<BinaryKernel> {
    let kernel: BinaryKernel = match (isa, kind) {
        (Isa::Sse2, U8) => andnot_si128,
        (Isa::Sse2, F32) => andnot_ps128,
        (Isa::Sse2, F64) => andnot_pd128,
        (Isa::Avx, F32) => andnot_ps256,
        (Isa::Avx, F64) => andnot_pd256,
        (Isa::Avx2, U8 | U16 | U32 | U64) => andnot_si256,
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, U32) => andnot_epi32_512,
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, U64) => andnot_epi64_512,
        _ => return None,
    };
    Some(kernel)
}

// === AND-NOT on packed-bit masks (AVX-512) ===

#[cfg(target_feature = "avx512f")]
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn andnot_kmask(a: u64, b: u64) -> u64 {
    unsafe { _mm512_kandn(b as __mmask16, a as __mmask16) as u64 }
}

#[cfg(target_feature = "avx512f")]
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn andnot_masked_epi32(a: &[u8], b: u64, out: &mut [u8]) {
    unsafe {
        let va = _mm512_loadu_epi32(a.as_ptr() as *const i32);
        let keep = _mm512_knot(b as __mmask16);
        _mm512_storeu_epi32(out.as_mut_ptr() as *mut i32, _mm512_maskz_mov_epi32(keep, va));
    }
}

#[cfg(target_feature = "avx512f")]
#[target_feature(enable = "avx512f")]
#[inline]
unsafe fn andnot_masked_epi64(a: &[u8], b: u64, out: &mut [u8]) {
    unsafe {
        let va = _mm512_loadu_epi64(a.as_ptr() as *const i64);
        let keep = !(b as __mmask8);
        _mm512_storeu_epi64(out.as_mut_ptr() as *mut i64, _mm512_maskz_mov_epi64(keep, va));
    }
}

/// Mask-register AND-NOT exists for the 32- and 64-bit kinds only.
pub(super) fn andnot_packed(isa: Isa, kind: ElementKind) -> Option<PackedMaskKernel> {
    match (isa, kind.size()) {
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, 4 | 8) => Some(andnot_kmask as PackedMaskKernel),
        _ => None,
    }
}

pub(super) fn andnot_masked(isa: Isa, kind: ElementKind) -> Option<MaskedKernel> {
    match (isa, kind.size()) {
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, 4) => Some(andnot_masked_epi32 as MaskedKernel),
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, 8) => Some(andnot_masked_epi64 as MaskedKernel),
        _ => None,
    }
}

// === Addition ===

kernel!(add_epi8_128, "sse2", __m128i, _mm_loadu_si128, _mm_storeu_si128, |va, vb| _mm_add_epi8(va, vb));
kernel!(add_epi16_128, "sse2", __m128i, _mm_loadu_si128, _mm_storeu_si128, |va, vb| _mm_add_epi16(va, vb));
kernel!(add_epi32_128, "sse2", __m128i, _mm_loadu_si128, _mm_storeu_si128, |va, vb| _mm_add_epi32(va, vb));
kernel!(add_epi64_128, "sse2", __m128i, _mm_loadu_si128, _mm_storeu_si128, |va, vb| _mm_add_epi64(va, vb));
kernel!(add_ps128, "sse2", f32, _mm_loadu_ps, _mm_storeu_ps, |va, vb| _mm_add_ps(va, vb));
kernel!(add_pd128, "sse2", f64, _mm_loadu_pd, _mm_storeu_pd, |va, vb| _mm_add_pd(va, vb));

kernel!(add_ps256, "avx", f32, _mm256_loadu_ps, _mm256_storeu_ps, |va, vb| _mm256_add_ps(va, vb));
kernel!(add_pd256, "avx", f64, _mm256_loadu_pd, _mm256_storeu_pd, |va, vb| _mm256_add_pd(va, vb));
kernel!(add_epi8_256, "avx2", __m256i, _mm256_loadu_si256, _mm256_storeu_si256, |va, vb| _mm256_add_epi8(va, vb));
kernel!(add_epi16_256, "avx2", __m256i, _mm256_loadu_si256, _mm256_storeu_si256, |va, vb| _mm256_add_epi16(va, vb));
kernel!(add_epi32_256, "avx2", __m256i, _mm256_loadu_si256, _mm256_storeu_si256, |va, vb| _mm256_add_epi32(va, vb));
kernel!(add_epi64_256, "avx2", __m256i, _mm256_loadu_si256, _mm256_storeu_si256, |va, vb| _mm256_add_epi64(va, vb));

#[cfg(target_feature = "avx512f")]
kernel!(add_epi32_512, "avx512f", i32, _mm512_loadu_epi32, _mm512_storeu_epi32, |va, vb| _mm512_add_epi32(va, vb));
#[cfg(target_feature = "avx512f")]
kernel!(add_epi64_512, "avx512f", i64, _mm512_loadu_epi64, _mm512_storeu_epi64, |va, vb| _mm512_add_epi64(va, vb));
#[cfg(target_feature = "avx512f")]
kernel!(add_ps512, "avx512f", f32, _mm512_loadu_ps, _mm512_storeu_ps, |va, vb| _mm512_add_ps(va, vb));
#[cfg(target_feature = "avx512f")]
kernel!(add_pd512, "avx512f", f64, _mm512_loadu_pd, _mm512_storeu_pd, |va, vb| _mm512_add_pd(va, vb));
#[cfg(all(target_feature = "avx512f", target_feature = "avx512bw"))]
kernel!(add_epi8_512, "avx512f,avx512bw", i32, _mm512_loadu_epi32, _mm512_storeu_epi32, |va, vb| _mm512_add_epi8(va, vb));
#[cfg(all(target_feature = "avx512f", target_feature = "avx512bw"))]
kernel!(add_epi16_512, "avx512f,avx512bw", i32, _mm512_loadu_epi32, _mm512_storeu_epi32, |va, vb| _mm512_add_epi16(va, vb));

/// Direct addition bindings. Signed and unsigned kinds share kernels.
pub(super) fn add(isa: Isa, kind: ElementKind) -> Option<BinaryKernel> {
    let kernel: BinaryKernel = match (isa, kind) {
        (Isa::Sse2, U8 | I8) => add_epi8_128,
        (Isa::Sse2, U16 | I16) => add_epi16_128,
        (Isa::Sse2, U32 | I32) => add_epi32_128,
        (Isa::Sse2, U64 | I64) => add_epi64_128,
        (Isa::Sse2, F32) => add_ps128,
        (Isa::Sse2, F64) => add_pd128,
        (Isa::Avx, F32) => add_ps256,
        (Isa::Avx, F64) => add_pd256,
        (Isa::Avx2, U8 | I8) => add_epi8_256,
        (Isa::Avx2, U16 | I16) => add_epi16_256,
        (Isa::Avx2, U32 | I32) => add_epi32_256,
        (Isa::Avx2, U64 | I64) => add_epi64_256,
        #[cfg(all(target_feature = "avx512f", target_feature = "avx512bw"))]
        (Isa::Avx512bw, U8 | I8) => add_epi8_512,
        #[cfg(all(target_feature = "avx512f", target_feature = "avx512bw"))]
        (Isa::Avx512bw, U16 | I16) => add_epi16_512,
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, U32 | I32) => add_epi32_512,
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, U64 | I64) => add_epi64_512,
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, F32) => add_ps512,
        #[cfg(target_feature = "avx512f")]
        (Isa::Avx512f, F64) => add_pd512,
        _ => return None,
    };
    Some(kernel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of<const N: usize>(fill: impl Fn(usize) -> u8) -> [u8; N] {
        std::array::from_fn(fill)
    }

    #[test]
    fn test_sse2_andnot_si128() {
        if !is_x86_feature_detected!("sse2") {
            return;
        }
        let a = bytes_of::<16>(|_| 0xFF);
        let b = bytes_of::<16>(|i| i as u8);
        let mut out = [0u8; 16];
        unsafe { andnot_si128(&a, &b, &mut out) };
        for (i, byte) in out.iter().enumerate() {
            assert_eq!(*byte, !(i as u8));
        }
    }

    #[test]
    fn test_avx2_andnot_si256() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }
        let a = bytes_of::<32>(|i| (i * 7) as u8);
        let b = bytes_of::<32>(|i| (i * 13) as u8);
        let mut out = [0u8; 32];
        unsafe { andnot_si256(&a, &b, &mut out) };
        for i in 0..32 {
            assert_eq!(out[i], a[i] & !b[i]);
        }
    }

    #[test]
    fn test_sse2_add_epi16_wraps() {
        if !is_x86_feature_detected!("sse2") {
            return;
        }
        let a: Vec<u8> = [u16::MAX; 8].iter().flat_map(|l| l.to_ne_bytes()).collect();
        let b: Vec<u8> = [2u16; 8].iter().flat_map(|l| l.to_ne_bytes()).collect();
        let mut out = [0u8; 16];
        unsafe { add_epi16_128(&a, &b, &mut out) };
        for lane in out.chunks_exact(2) {
            assert_eq!(u16::from_ne_bytes([lane[0], lane[1]]), 1);
        }
    }
}
