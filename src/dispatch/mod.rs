//! Backend resolution, width decomposition and mask algebra.
//!
//! A [`Dispatcher`] is built once for a capability set. Construction resolves
//! every operation for every element kind and width up front, so
//! configuration problems surface before any vector is processed, and checks
//! the set against the running CPU so hardware kernels only ever run where
//! their instructions exist.

mod backend;
mod decompose;
mod mask;

#[cfg(test)]
mod tests;

pub use backend::{Backend, BackendTable, Resolution};
pub use decompose::{for_each_segment, par_for_each_segment};
pub use mask::{MaskBackend, MaskResolution, MaskTable};

use crate::arch::{Capabilities, DispatchConfig};
use crate::common::{Error, Result};
use crate::lane::{ElementKind, Lane, Mask, Vector};
use crate::ops::{Add, BinaryOp, BitAndNot, MASK_OP_COUNT, MaskOp, MaskedKernel, OpId, PackedMaskKernel};
use mask::MaskBinding;

/// Resolved backends for every operation under one capability set.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    caps: Capabilities,
    tables: [BackendTable; OpId::COUNT],
    mask_tables: [MaskTable; MASK_OP_COUNT],
    parallel_threshold: Option<usize>,
}

impl Dispatcher {
    /// Resolve every operation under `caps`.
    ///
    /// Fails with [`Error::UnsupportedOnHost`] when `caps` names features the
    /// running CPU lacks, and with [`Error::NoBackend`] when `caps` has vector
    /// support but leaves some element kind without a backend.
    pub fn new(caps: Capabilities) -> Result<Self> {
        let missing = caps.difference(Capabilities::detect());
        if !missing.is_empty() {
            return Err(Error::UnsupportedOnHost {
                requested: caps,
                missing,
            });
        }

        let andnot = BackendTable::build::<BitAndNot>(caps)?;
        let add = BackendTable::build::<Add>(caps)?;
        let andnot_mask = MaskTable::build::<BitAndNot>(caps, &andnot);

        log::debug!("Dispatcher ready for [{caps}]");
        Ok(Self {
            caps,
            tables: [andnot, add],
            mask_tables: [andnot_mask],
            parallel_threshold: None,
        })
    }

    /// Scalar reference for everything.
    pub fn scalar() -> Self {
        let andnot = BackendTable::scalar::<BitAndNot>();
        let add = BackendTable::scalar::<Add>();
        let andnot_mask = MaskTable::build::<BitAndNot>(Capabilities::empty(), &andnot);

        Self {
            caps: Capabilities::empty(),
            tables: [andnot, add],
            mask_tables: [andnot_mask],
            parallel_threshold: None,
        }
    }

    /// Everything the running CPU and this build support.
    pub fn host() -> Result<Self> {
        Self::new(Capabilities::host())
    }

    pub fn from_config(config: &DispatchConfig) -> Result<Self> {
        Ok(Self::new(config.capabilities())?.with_parallel_threshold(config.parallel_threshold))
    }

    /// One dispatcher per cumulative feature level usable on this host,
    /// scalar first.
    pub fn variants() -> Vec<Self> {
        let host = Capabilities::host();
        let mut variants = vec![Self::scalar()];

        for &level in Capabilities::ladder() {
            if level.is_empty() || !host.contains(level) {
                continue;
            }
            match Self::new(level) {
                Ok(dispatcher) => variants.push(dispatcher),
                Err(err) => log::warn!("Skipping capability level [{level}]: {err}"),
            }
        }

        variants
    }

    /// Apply segments in parallel once a vector has at least `threshold` segments.
    pub fn with_parallel_threshold(mut self, threshold: Option<usize>) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Human-readable name of the capability set, e.g. `sse2+avx2`.
    pub fn label(&self) -> String {
        self.caps.to_string()
    }

    /// Backends of operation `O`.
    pub fn table<O: BinaryOp>(&self) -> &BackendTable {
        &self.tables[O::ID.index()]
    }

    /// Mask backends of operation `O`.
    pub fn mask_table<O: MaskOp>(&self) -> &MaskTable {
        &self.mask_tables[O::MASK_SLOT]
    }

    /// Resolve `O` for `lanes` lanes of `kind`.
    pub fn resolve<O: BinaryOp>(
        &self,
        kind: ElementKind,
        lanes: usize,
    ) -> Result<Resolution> {
        let resolution = self.table::<O>().resolve(kind, lanes)?;
        log::trace!(
            "{} on {kind}x{lanes}: {} x {} via {}",
            O::NAME,
            resolution.segments,
            resolution.width,
            resolution.backend
        );
        Ok(resolution)
    }

    /// Resolve the mask forms of `O` for `lanes` lanes of `kind`.
    pub fn resolve_mask<O: MaskOp>(
        &self,
        kind: ElementKind,
        lanes: usize,
    ) -> Result<MaskResolution> {
        let resolution = self.mask_table::<O>().resolve(kind, lanes)?;
        log::trace!(
            "{} on mask {kind}x{lanes}: {} x {} via {}",
            O::NAME,
            resolution.segments,
            resolution.width,
            resolution.backend
        );
        Ok(resolution)
    }

    /// Apply `O` lane-wise to two vectors of the same shape.
    pub fn apply<O: BinaryOp, T: Lane>(&self, a: &Vector<T>, b: &Vector<T>) -> Result<Vector<T>> {
        check_shapes(a.len(), b.len())?;
        let resolution = self.resolve::<O>(T::KIND, a.len())?;
        let kernel = self
            .table::<O>()
            .binding(T::KIND, resolution.width)
            .and_then(|binding| binding.kernel);

        let mut out = Vector::<T>::from_validated(a.len());
        match kernel {
            Some(kernel) => {
                let bytes = resolution.width.bytes();
                self.run_segments(
                    resolution.segments,
                    (a.as_bytes(), bytes),
                    (b.as_bytes(), bytes),
                    (out.as_mut_bytes(), bytes),
                    // SAFETY: `new` rejected capability sets the CPU lacks, and
                    // every segment is exactly one register of the kernel's width.
                    |sa, sb, so| unsafe { kernel(sa, sb, so) },
                );
            }
            None => {
                let lanes = resolution.lanes_per_segment();
                self.run_segments(
                    resolution.segments,
                    (a.lanes(), lanes),
                    (b.lanes(), lanes),
                    (out.lanes_mut(), lanes),
                    |sa, sb, so| {
                        for ((x, y), z) in sa.iter().zip(sb).zip(so.iter_mut()) {
                            *z = O::scalar(*x, *y);
                        }
                    },
                );
            }
        }

        Ok(out)
    }

    /// Apply the mask-mask form of `O` to two masks of the same shape.
    pub fn apply_mask<O: MaskOp, T: Lane>(&self, a: &Mask<T>, b: &Mask<T>) -> Result<Mask<T>> {
        check_shapes(a.len(), b.len())?;
        let resolution = self.resolve_mask::<O>(T::KIND, a.len())?;
        let lanes = resolution.lanes_per_segment();

        match self.mask_binding::<O>(&resolution)? {
            MaskBinding::Direct { packed, .. } => {
                // SAFETY: `new` rejected capability sets the CPU lacks.
                Ok(unsafe { self.run_packed(packed, a, b, &resolution) })
            }
            MaskBinding::Converted(_) => {
                let out = self.apply::<O, T>(&a.to_vector(), &b.to_vector())?;
                Ok(Mask::from_vector(&out))
            }
            MaskBinding::Scalar => {
                let (ba, bb): (Vec<bool>, Vec<bool>) = (a.iter().collect(), b.iter().collect());
                let mut out = vec![false; a.len()];
                self.run_segments(
                    resolution.segments,
                    (&ba[..], lanes),
                    (&bb[..], lanes),
                    (&mut out[..], lanes),
                    |sa, sb, so| {
                        for ((x, y), z) in sa.iter().zip(sb).zip(so.iter_mut()) {
                            *z = O::scalar_mask(*x, *y);
                        }
                    },
                );
                Mask::from_bools(out)
            }
        }
    }

    /// Apply the data-mask form of `O`: a data vector against a mask of the same shape.
    pub fn apply_masked<O: MaskOp, T: Lane>(&self, a: &Vector<T>, b: &Mask<T>) -> Result<Vector<T>> {
        check_shapes(a.len(), b.len())?;
        let resolution = self.resolve_mask::<O>(T::KIND, a.len())?;
        let lanes = resolution.lanes_per_segment();

        match self.mask_binding::<O>(&resolution)? {
            MaskBinding::Direct { masked, .. } => {
                // SAFETY: `new` rejected capability sets the CPU lacks.
                Ok(unsafe { self.run_masked(masked, a, b, &resolution) })
            }
            MaskBinding::Converted(_) => self.apply::<O, T>(a, &b.to_vector()),
            MaskBinding::Scalar => {
                let bools: Vec<bool> = b.iter().collect();
                let mut out = Vector::<T>::from_validated(a.len());
                self.run_segments(
                    resolution.segments,
                    (a.lanes(), lanes),
                    (&bools[..], lanes),
                    (out.lanes_mut(), lanes),
                    |sa, sb, so| {
                        for ((x, y), z) in sa.iter().zip(sb).zip(so.iter_mut()) {
                            *z = O::scalar_masked(*x, *y);
                        }
                    },
                );
                Ok(out)
            }
        }
    }

    /// `a & !b` on every lane.
    pub fn bit_andnot<T: Lane>(&self, a: &Vector<T>, b: &Vector<T>) -> Result<Vector<T>> {
        self.apply::<BitAndNot, T>(a, b)
    }

    /// Lane-wise addition.
    pub fn add<T: Lane>(&self, a: &Vector<T>, b: &Vector<T>) -> Result<Vector<T>> {
        self.apply::<Add, T>(a, b)
    }

    /// `a && !b` on every mask lane.
    pub fn mask_andnot<T: Lane>(&self, a: &Mask<T>, b: &Mask<T>) -> Result<Mask<T>> {
        self.apply_mask::<BitAndNot, T>(a, b)
    }

    /// Clear the lanes of `a` whose mask lane in `b` is set.
    pub fn bit_andnot_mask<T: Lane>(&self, a: &Vector<T>, b: &Mask<T>) -> Result<Vector<T>> {
        self.apply_masked::<BitAndNot, T>(a, b)
    }

    fn mask_binding<O: MaskOp>(&self, resolution: &MaskResolution) -> Result<MaskBinding> {
        self.mask_table::<O>()
            .binding(resolution.kind, resolution.width)
            .ok_or(Error::Unresolvable {
                op: O::NAME,
                kind: resolution.kind,
                lanes: resolution.segments * resolution.lanes_per_segment(),
                caps: self.caps,
            })
    }

    /// Mask-mask form on packed-bit words, one word per segment.
    ///
    /// # Safety
    ///
    /// `packed` must be runnable on this CPU. `a` and `b` must have the shape
    /// `resolution` was made for.
    unsafe fn run_packed<T: Lane>(
        &self,
        packed: PackedMaskKernel,
        a: &Mask<T>,
        b: &Mask<T>,
        resolution: &MaskResolution,
    ) -> Mask<T> {
        let lanes = resolution.lanes_per_segment();
        let (wa, wb) = (a.pack(lanes), b.pack(lanes));
        let mut words = vec![0u64; resolution.segments];
        let keep = lane_bits(lanes);
        self.run_segments(
            resolution.segments,
            (&wa[..], 1),
            (&wb[..], 1),
            (&mut words[..], 1),
            // SAFETY: guaranteed by the caller; packed kernels take plain words.
            |sa, sb, so| so[0] = unsafe { packed(sa[0], sb[0]) } & keep,
        );
        Mask::unpack(&words, lanes, a.len())
    }

    /// Data-mask form with the mask packed into one word per segment.
    ///
    /// # Safety
    ///
    /// `masked` must be runnable on this CPU. `a` and `b` must have the shape
    /// `resolution` was made for.
    unsafe fn run_masked<T: Lane>(
        &self,
        masked: MaskedKernel,
        a: &Vector<T>,
        b: &Mask<T>,
        resolution: &MaskResolution,
    ) -> Vector<T> {
        let words = b.pack(resolution.lanes_per_segment());
        let bytes = resolution.width.bytes();
        let mut out = Vector::<T>::from_validated(a.len());
        self.run_segments(
            resolution.segments,
            (a.as_bytes(), bytes),
            (&words[..], 1),
            (out.as_mut_bytes(), bytes),
            // SAFETY: guaranteed by the caller; every segment is one register.
            |sa, sb, so| unsafe { masked(sa, sb[0], so) },
        );
        out
    }

    fn run_segments<A, B, R, F>(
        &self,
        segments: usize,
        a: (&[A], usize),
        b: (&[B], usize),
        out: (&mut [R], usize),
        f: F,
    ) where
        A: Sync,
        B: Sync,
        R: Send,
        F: Fn(&[A], &[B], &mut [R]) + Sync + Send,
    {
        match self.parallel_threshold {
            Some(threshold) if segments >= threshold => {
                par_for_each_segment(a.0, a.1, b.0, b.1, out.0, out.1, f)
            }
            _ => for_each_segment(a.0, a.1, b.0, b.1, out.0, out.1, f),
        }
    }
}

fn check_shapes(left: usize, right: usize) -> Result<()> {
    if left != right {
        return Err(Error::ShapeMismatch { left, right });
    }
    Ok(())
}

/// Word with the low `lanes` bits set.
fn lane_bits(lanes: usize) -> u64 {
    if lanes >= 64 { u64::MAX } else { (1u64 << lanes) - 1 }
}
