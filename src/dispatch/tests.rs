//! Cross-variant tests: every capability level usable on this host must agree
//! with the scalar reference, lane for lane.

use super::*;
use crate::arch::CapabilitySource;
use crate::lane::{MIN_VECTOR_BYTES, Width};
use proptest::prelude::*;

fn same_values<T: Lane>(left: &[T], right: &[T]) -> bool {
    // NaN lanes compare by class, everything else by bit pattern.
    #[allow(clippy::eq_op)]
    let nan = |x: &T| x != x;
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(x, y)| x.to_bits() == y.to_bits() || (nan(x) && nan(y)))
}

fn expected<O: BinaryOp, T: Lane>(a: &Vector<T>, b: &Vector<T>) -> Vec<T> {
    a.lanes()
        .iter()
        .zip(b.lanes())
        .map(|(&x, &y)| O::scalar(x, y))
        .collect()
}

/// Check `O` on `pieces` 16-byte blocks of `bytes`: the whole vector must
/// match the scalar formula, and must equal the concatenation of the
/// results on each block.
fn check_binary<O: BinaryOp, T: Lane>(
    dispatcher: &Dispatcher,
    bytes: &[u8],
    pieces: usize,
) -> std::result::Result<(), TestCaseError> {
    let len = pieces * MIN_VECTOR_BYTES;
    let a = Vector::<T>::load(&bytes[..len]).unwrap();
    let b = Vector::<T>::load(&bytes[len..2 * len]).unwrap();

    let whole = dispatcher.apply::<O, T>(&a, &b).unwrap();
    prop_assert!(
        same_values(whole.lanes(), &expected::<O, T>(&a, &b)),
        "{} on {}x{} under [{}]",
        O::NAME,
        T::KIND,
        a.len(),
        dispatcher.label()
    );

    let per_block = MIN_VECTOR_BYTES / T::KIND.size();
    let parts: Vec<Vector<T>> = a
        .lanes()
        .chunks(per_block)
        .zip(b.lanes().chunks(per_block))
        .map(|(x, y)| {
            let x = Vector::from_lanes(x.to_vec()).unwrap();
            let y = Vector::from_lanes(y.to_vec()).unwrap();
            dispatcher.apply::<O, T>(&x, &y).unwrap()
        })
        .collect();
    prop_assert!(same_values(
        Vector::concat(&parts).unwrap().lanes(),
        whole.lanes()
    ));

    Ok(())
}

fn check_masks<T: Lane>(
    dispatcher: &Dispatcher,
    seed: &[bool],
    bytes: &[u8],
) -> std::result::Result<(), TestCaseError> {
    let len = 64 / T::KIND.size();
    let a = Mask::<T>::from_fn(len, |i| seed[i % seed.len()]).unwrap();
    let b = Mask::<T>::from_fn(len, |i| seed[(i * 7 + 3) % seed.len()]).unwrap();

    let r = dispatcher.mask_andnot(&a, &b).unwrap();
    for i in 0..len {
        prop_assert_eq!(r.get(i), Some(a.get(i) == Some(true) && b.get(i) == Some(false)));
    }

    let data = Vector::<T>::load(&bytes[..64]).unwrap();
    let r = dispatcher.bit_andnot_mask(&data, &b).unwrap();
    for (i, lane) in r.lanes().iter().enumerate() {
        let want = if b.get(i) == Some(true) { 0 } else { data.lanes()[i].to_bits() };
        prop_assert_eq!(lane.to_bits(), want, "lane {} of {} under [{}]", i, T::KIND, dispatcher.label());
    }

    Ok(())
}

macro_rules! each_lane_type {
    ($check:ident $(::<$op:ty>)?, $($arg:expr),*) => {
        $check::<$($op,)? u8>($($arg),*)?;
        $check::<$($op,)? i8>($($arg),*)?;
        $check::<$($op,)? u16>($($arg),*)?;
        $check::<$($op,)? i16>($($arg),*)?;
        $check::<$($op,)? u32>($($arg),*)?;
        $check::<$($op,)? i32>($($arg),*)?;
        $check::<$($op,)? u64>($($arg),*)?;
        $check::<$($op,)? i64>($($arg),*)?;
        $check::<$($op,)? f32>($($arg),*)?;
        $check::<$($op,)? f64>($($arg),*)?;
    };
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_andnot_matches_reference_and_decomposes(
        bytes in prop::collection::vec(any::<u8>(), 256),
        pieces in prop::sample::select(vec![1usize, 2, 3, 4, 8]),
    ) {
        for dispatcher in Dispatcher::variants() {
            each_lane_type!(check_binary::<BitAndNot>, &dispatcher, &bytes, pieces);
        }
    }

    #[test]
    fn prop_add_matches_reference_and_decomposes(
        bytes in prop::collection::vec(any::<u8>(), 256),
        pieces in prop::sample::select(vec![1usize, 2, 3, 4, 8]),
    ) {
        for dispatcher in Dispatcher::variants() {
            each_lane_type!(check_binary::<Add>, &dispatcher, &bytes, pieces);
        }
    }

    #[test]
    fn prop_mask_forms_match_reference(
        seed in prop::collection::vec(any::<bool>(), 1..24usize),
        bytes in prop::collection::vec(any::<u8>(), 64),
    ) {
        for dispatcher in Dispatcher::variants() {
            each_lane_type!(check_masks, &dispatcher, &seed, &bytes);
        }
    }
}

#[test]
fn test_variants_start_with_scalar() {
    let variants = Dispatcher::variants();
    assert_eq!(variants[0].capabilities(), Capabilities::empty());
    assert_eq!(variants[0].label(), "scalar");

    let mut labels: Vec<_> = variants.iter().map(Dispatcher::label).collect();
    labels.dedup();
    assert_eq!(labels.len(), variants.len());
}

#[test]
fn test_variants_cover_every_host_level() {
    let host = Capabilities::host();
    let variants = Dispatcher::variants();
    for &level in Capabilities::ladder() {
        if level.is_empty() || !host.contains(level) {
            continue;
        }
        assert!(
            variants.iter().any(|d| d.capabilities() == level),
            "level [{level}] missing from variants"
        );
    }
}

#[test]
fn test_andnot_edge_values() {
    for dispatcher in Dispatcher::variants() {
        let ones = Vector::splat(u32::MAX, 16).unwrap();
        let zero = Vector::splat(0u32, 16).unwrap();
        let pattern = Vector::from_fn(16, |i| (i as u32).wrapping_mul(0x9E37_79B9)).unwrap();

        assert_eq!(dispatcher.bit_andnot(&ones, &ones).unwrap(), zero);
        assert_eq!(dispatcher.bit_andnot(&pattern, &zero).unwrap(), pattern);
        assert_eq!(dispatcher.bit_andnot(&zero, &pattern).unwrap(), zero);
    }
}

#[test]
fn test_andnot_clears_float_sign_bits() {
    for dispatcher in Dispatcher::variants() {
        let a = Vector::from_fn(16, |i| if i % 2 == 0 { -(i as f32) - 0.5 } else { i as f32 })
            .unwrap();
        let sign = Vector::splat(-0.0f32, 16).unwrap();
        let r = dispatcher.bit_andnot(&a, &sign).unwrap();

        for (lane, source) in r.lanes().iter().zip(a.lanes()) {
            assert_eq!(*lane, source.abs(), "under [{}]", dispatcher.label());
        }
    }
}

#[test]
fn test_andnot_keeps_nan_payload() {
    let payload = f64::from_bits(0x7FF8_0000_0000_BEEF);
    for dispatcher in Dispatcher::variants() {
        let a = Vector::splat(payload, 8).unwrap();
        let b = Vector::splat(0.0f64, 8).unwrap();
        let r = dispatcher.bit_andnot(&a, &b).unwrap();
        assert!(r.lanes().iter().all(|l| l.to_bits() == payload.to_bits()));
    }
}

#[test]
fn test_mask_vector_roundtrip_through_dispatch() {
    for dispatcher in Dispatcher::variants() {
        let a = Mask::<i16>::from_fn(24, |i| i % 5 < 2).unwrap();
        let none = Mask::<i16>::splat(false, 24).unwrap();
        let r = dispatcher.mask_andnot(&a, &none).unwrap();
        assert_eq!(r, a);
        assert_eq!(Mask::from_vector(&r.to_vector()), a);
    }
}

#[test]
fn test_shape_mismatch() {
    let dispatcher = Dispatcher::scalar();
    let a = Vector::splat(1u8, 16).unwrap();
    let b = Vector::splat(1u8, 32).unwrap();
    assert!(matches!(
        dispatcher.bit_andnot(&a, &b),
        Err(Error::ShapeMismatch { left: 16, right: 32 })
    ));

    let m = Mask::<u8>::splat(true, 32).unwrap();
    assert!(matches!(
        dispatcher.bit_andnot_mask(&a, &m),
        Err(Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_scalar_resolution_decomposes_into_blocks() {
    let dispatcher = Dispatcher::scalar();
    let resolution = dispatcher.resolve::<BitAndNot>(ElementKind::U8, 64).unwrap();
    assert_eq!(resolution.backend, Backend::Scalar);
    assert_eq!((resolution.width, resolution.segments), (Width::B128, 4));

    let resolution = dispatcher.resolve_mask::<BitAndNot>(ElementKind::F64, 6).unwrap();
    assert_eq!(resolution.backend, MaskBackend::Scalar);
    assert_eq!(resolution.segments, 3);
}

#[test]
fn test_unsupported_on_host() {
    // No CPU reports both x86 and ARM vector units.
    let err = Dispatcher::new(Capabilities::all()).unwrap_err();
    match err {
        Error::UnsupportedOnHost { requested, missing } => {
            assert_eq!(requested, Capabilities::all());
            assert!(!missing.is_empty());
            assert!(!Capabilities::detect().intersects(missing));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_from_config() {
    let config = DispatchConfig {
        capabilities: CapabilitySource::Scalar,
        disable: Capabilities::empty(),
        parallel_threshold: Some(2),
    };
    let dispatcher = Dispatcher::from_config(&config).unwrap();
    assert_eq!(dispatcher.capabilities(), Capabilities::empty());

    let a = Vector::from_fn(64, |i| i as u16).unwrap();
    let b = Vector::splat(0x00FFu16, 64).unwrap();
    let r = dispatcher.bit_andnot(&a, &b).unwrap();
    assert!(r.lanes().iter().all(|&lane| lane & 0x00FF == 0));
}

#[test]
fn test_parallel_application_matches_sequential() {
    for dispatcher in Dispatcher::variants() {
        let parallel = dispatcher.clone().with_parallel_threshold(Some(1));
        let a = Vector::from_fn(1024, |i| (i * 31) as u8).unwrap();
        let b = Vector::from_fn(1024, |i| (i * 17) as u8).unwrap();

        assert_eq!(
            dispatcher.bit_andnot(&a, &b).unwrap(),
            parallel.bit_andnot(&a, &b).unwrap()
        );
        assert_eq!(dispatcher.add(&a, &b).unwrap(), parallel.add(&a, &b).unwrap());

        let m = Mask::<u8>::from_fn(1024, |i| i % 3 == 0).unwrap();
        assert_eq!(
            dispatcher.bit_andnot_mask(&a, &m).unwrap(),
            parallel.bit_andnot_mask(&a, &m).unwrap()
        );
    }
}

#[cfg(target_arch = "x86_64")]
#[test]
fn test_sse2_u16_runs_through_byte_kernel() {
    if !Capabilities::detect().contains(Capabilities::SSE2) {
        return;
    }
    let dispatcher = Dispatcher::new(Capabilities::SSE2).unwrap();
    let resolution = dispatcher.resolve::<BitAndNot>(ElementKind::U16, 24).unwrap();
    assert_eq!(
        resolution.backend,
        Backend::Composed {
            isa: crate::arch::Isa::Sse2,
            via: ElementKind::U8
        }
    );
    assert_eq!(resolution.segments, 3);

    let a = Vector::splat(0xFFFFu16, 24).unwrap();
    let b = Vector::from_fn(24, |i| 1u16 << (i % 16)).unwrap();
    let r = dispatcher.bit_andnot(&a, &b).unwrap();
    for (i, lane) in r.lanes().iter().enumerate() {
        assert_eq!(*lane, !(1u16 << (i % 16)));
    }
}

/// Packed-word andnot that also sets bits above the segment's lanes.
unsafe fn words_andnot(a: u64, b: u64) -> u64 {
    (a & !b) | !0xF
}

/// Clears every 32-bit lane whose mask bit is set.
unsafe fn lanes_andnot_u32(a: &[u8], b: u64, out: &mut [u8]) {
    for (i, (x, z)) in a.chunks_exact(4).zip(out.chunks_exact_mut(4)).enumerate() {
        if (b >> i) & 1 == 1 {
            z.fill(0);
        } else {
            z.copy_from_slice(x);
        }
    }
}

#[test]
fn test_packed_register_paths_span_segments() {
    let resolution = MaskResolution {
        kind: ElementKind::U32,
        backend: MaskBackend::Direct(crate::arch::Isa::Sse2),
        width: Width::B128,
        segments: 5,
    };
    let a = Mask::<u32>::from_fn(20, |i| i % 2 == 0).unwrap();
    let b = Mask::<u32>::from_fn(20, |i| i % 3 == 0).unwrap();
    let data = Vector::from_fn(20, |i| i as u32 + 100).unwrap();

    let sequential = Dispatcher::scalar();
    let parallel = Dispatcher::scalar().with_parallel_threshold(Some(1));
    for dispatcher in [&sequential, &parallel] {
        // SAFETY: both kernels are plain Rust.
        let r = unsafe { dispatcher.run_packed(words_andnot, &a, &b, &resolution) };
        assert_eq!(r.len(), 20);
        for i in 0..20 {
            assert_eq!(r.get(i), Some(i % 2 == 0 && i % 3 != 0), "lane {i}");
        }

        // SAFETY: as above.
        let r = unsafe { dispatcher.run_masked(lanes_andnot_u32, &data, &b, &resolution) };
        for (i, lane) in r.lanes().iter().enumerate() {
            assert_eq!(*lane, if i % 3 == 0 { 0 } else { i as u32 + 100 }, "lane {i}");
        }
    }
}

#[test]
fn test_mask_table_is_per_operation() {
    let dispatcher = Dispatcher::scalar();
    let resolution = dispatcher
        .mask_table::<BitAndNot>()
        .resolve(ElementKind::I16, 8)
        .unwrap();
    assert_eq!(resolution.backend, MaskBackend::Scalar);
}
