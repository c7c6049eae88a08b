use super::backend::{Backend, BackendTable};
use crate::arch::{Capabilities, Isa};
use crate::common::{Error, Result};
use crate::lane::{ElementKind, Width, validate_lanes};
use crate::ops::{MaskOp, MaskedKernel, PackedMaskKernel};
use std::fmt;

/// How a mask operation is carried out for one element kind at one width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskBackend {
    /// Packed-bit mask registers
    Direct(Isa),
    /// Masks are converted to data vectors and back around the data backend
    Converted(Backend),
    /// Boolean reference, one lane at a time
    Scalar,
}

impl fmt::Display for MaskBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskBackend::Direct(isa) => write!(f, "{isa} mask registers"),
            MaskBackend::Converted(backend) => write!(f, "{backend} on data vectors"),
            MaskBackend::Scalar => f.write_str("scalar"),
        }
    }
}

/// The outcome of resolving one mask shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskResolution {
    pub kind: ElementKind,
    pub backend: MaskBackend,
    pub width: Width,
    pub segments: usize,
}

impl MaskResolution {
    pub fn lanes_per_segment(&self) -> usize {
        self.width.lanes(self.kind)
    }
}

#[derive(Clone, Copy)]
pub(crate) enum MaskBinding {
    Direct {
        isa: Isa,
        packed: PackedMaskKernel,
        masked: MaskedKernel,
    },
    Converted(Backend),
    Scalar,
}

impl MaskBinding {
    fn backend(self) -> MaskBackend {
        match self {
            MaskBinding::Direct { isa, .. } => MaskBackend::Direct(isa),
            MaskBinding::Converted(backend) => MaskBackend::Converted(backend),
            MaskBinding::Scalar => MaskBackend::Scalar,
        }
    }
}

impl fmt::Debug for MaskBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MaskBinding").field(&self.backend()).finish()
    }
}

type Entries = [[Option<MaskBinding>; Width::COUNT]; ElementKind::COUNT];

/// Mask backends of one operation, derived from its data backends.
///
/// A width uses packed-bit mask registers when the capability set offers
/// both the mask-mask and the data-mask kernel there. Otherwise masks go
/// through the data backend at the same width, or through the boolean
/// reference when that backend is scalar.
#[derive(Debug, Clone)]
pub struct MaskTable {
    op: &'static str,
    caps: Capabilities,
    entries: Entries,
}

impl MaskTable {
    pub fn build<O: MaskOp>(caps: Capabilities, data: &BackendTable) -> Self {
        let mut entries: Entries = [[None; Width::COUNT]; ElementKind::COUNT];

        for kind in ElementKind::ALL {
            for width in Width::ALL {
                entries[kind.index()][width.index()] = bind::<O>(caps, data, kind, width);
            }
        }

        Self {
            op: O::NAME,
            caps,
            entries,
        }
    }

    pub fn backend(&self, kind: ElementKind, width: Width) -> Option<MaskBackend> {
        self.binding(kind, width).map(MaskBinding::backend)
    }

    /// Resolve a mask of `lanes` lanes of `kind`, widest dividing width first.
    pub fn resolve(&self, kind: ElementKind, lanes: usize) -> Result<MaskResolution> {
        validate_lanes(kind, lanes)?;
        let bytes = lanes * kind.size();

        Width::DESCENDING
            .into_iter()
            .find_map(|width| {
                let binding = self.binding(kind, width)?;
                (bytes % width.bytes() == 0).then(|| MaskResolution {
                    kind,
                    backend: binding.backend(),
                    width,
                    segments: bytes / width.bytes(),
                })
            })
            .ok_or(Error::Unresolvable {
                op: self.op,
                kind,
                lanes,
                caps: self.caps,
            })
    }

    pub(crate) fn binding(&self, kind: ElementKind, width: Width) -> Option<MaskBinding> {
        self.entries[kind.index()][width.index()]
    }
}

fn bind<O: MaskOp>(
    caps: Capabilities,
    data: &BackendTable,
    kind: ElementKind,
    width: Width,
) -> Option<MaskBinding> {
    let direct = Isa::PRIORITY
        .into_iter()
        .filter(|isa| isa.width() == width && isa.available(caps))
        .find_map(|isa| {
            Some(MaskBinding::Direct {
                isa,
                packed: O::packed_kernel(isa, kind)?,
                masked: O::masked_kernel(isa, kind)?,
            })
        });
    if direct.is_some() {
        return direct;
    }

    let binding = data.binding(kind, width)?;
    Some(match binding.kernel {
        Some(_) => MaskBinding::Converted(binding.backend),
        None => MaskBinding::Scalar,
    })
}
