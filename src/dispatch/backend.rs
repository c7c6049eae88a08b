use crate::arch::{Capabilities, Isa};
use crate::common::{Error, Result};
use crate::lane::{ElementKind, Width, validate_lanes};
use crate::ops::{BinaryKernel, BinaryOp};
use std::fmt;

/// How an operation is carried out for one element kind at one width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// A kernel written for this kind
    Hardware(Isa),
    /// The kernel of another kind with the same register width; only for
    /// operations whose results ignore lane boundaries
    Composed { isa: Isa, via: ElementKind },
    /// The scalar reference, one lane at a time
    Scalar,
}

impl Backend {
    pub fn isa(self) -> Option<Isa> {
        match self {
            Backend::Hardware(isa) | Backend::Composed { isa, .. } => Some(isa),
            Backend::Scalar => None,
        }
    }

    pub fn is_scalar(self) -> bool {
        self == Backend::Scalar
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Hardware(isa) => write!(f, "{isa}"),
            Backend::Composed { isa, via } => write!(f, "{isa} via {via}"),
            Backend::Scalar => f.write_str("scalar"),
        }
    }
}

/// The outcome of resolving one vector shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub kind: ElementKind,
    pub backend: Backend,
    /// Width of one segment
    pub width: Width,
    /// Number of segments the vector decomposes into
    pub segments: usize,
}

impl Resolution {
    pub fn lanes_per_segment(&self) -> usize {
        self.width.lanes(self.kind)
    }
}

/// A resolved backend together with the kernel that runs it.
#[derive(Clone, Copy)]
pub(crate) struct Binding {
    pub(crate) backend: Backend,
    pub(crate) kernel: Option<BinaryKernel>,
}

impl Binding {
    const SCALAR: Binding = Binding {
        backend: Backend::Scalar,
        kernel: None,
    };
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&self.backend).finish()
    }
}

type Entries = [[Option<Binding>; Width::COUNT]; ElementKind::COUNT];

/// Backends of one operation for every element kind and width, fixed for
/// one capability set.
///
/// Building the table is pure: it only consults the capability set it is
/// given, never the running CPU.
#[derive(Debug, Clone)]
pub struct BackendTable {
    op: &'static str,
    caps: Capabilities,
    entries: Entries,
}

impl BackendTable {
    /// Resolve every kind and width of `O` under `caps`.
    ///
    /// Per width, a direct kernel wins, taken from the highest-priority
    /// family that has one. Failing that, an operation whose results ignore
    /// lane boundaries borrows a kernel from another kind: same-size kinds
    /// first, then the rest, each in canonical order. A kind left with no
    /// backend at any width falls back to the scalar reference only when
    /// `caps` has no vector support at all; otherwise the configuration is
    /// rejected.
    pub fn build<O: BinaryOp>(caps: Capabilities) -> Result<Self> {
        let mut entries: Entries = [[None; Width::COUNT]; ElementKind::COUNT];

        for kind in ElementKind::ALL {
            let row = &mut entries[kind.index()];
            for width in Width::ALL {
                row[width.index()] = bind::<O>(caps, kind, width);
            }

            if row.iter().all(Option::is_none) {
                if caps.has_vector_support() {
                    return Err(Error::NoBackend {
                        op: O::NAME,
                        kind,
                        caps,
                    });
                }
                row[Width::B128.index()] = Some(Binding::SCALAR);
            }
        }

        let table = Self {
            op: O::NAME,
            caps,
            entries,
        };
        log::debug!("Built `{}` backends for [{caps}]:{}", O::NAME, table.summary());
        Ok(table)
    }

    /// Scalar reference for every kind; never fails.
    pub fn scalar<O: BinaryOp>() -> Self {
        let mut entries: Entries = [[None; Width::COUNT]; ElementKind::COUNT];
        for row in entries.iter_mut() {
            row[Width::B128.index()] = Some(Binding::SCALAR);
        }

        Self {
            op: O::NAME,
            caps: Capabilities::empty(),
            entries,
        }
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Backend chosen for `kind` at `width`, if any.
    pub fn backend(&self, kind: ElementKind, width: Width) -> Option<Backend> {
        self.binding(kind, width).map(|binding| binding.backend)
    }

    /// Resolve a vector of `lanes` lanes of `kind`.
    ///
    /// Picks the widest width that has a backend and evenly divides the
    /// vector's size.
    pub fn resolve(&self, kind: ElementKind, lanes: usize) -> Result<Resolution> {
        validate_lanes(kind, lanes)?;
        let bytes = lanes * kind.size();

        Width::DESCENDING
            .into_iter()
            .find_map(|width| {
                let binding = self.binding(kind, width)?;
                (bytes % width.bytes() == 0).then(|| Resolution {
                    kind,
                    backend: binding.backend,
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

    pub(crate) fn binding(&self, kind: ElementKind, width: Width) -> Option<Binding> {
        self.entries[kind.index()][width.index()]
    }

    fn summary(&self) -> String {
        let mut summary = String::new();
        for kind in ElementKind::ALL {
            summary.push_str(&format!("\n  {kind}:"));
            for width in Width::ALL {
                if let Some(backend) = self.backend(kind, width) {
                    summary.push_str(&format!(" {}={backend}", width.bits()));
                }
            }
        }
        summary
    }
}

fn direct<O: BinaryOp>(
    caps: Capabilities,
    kind: ElementKind,
    width: Width,
) -> Option<(Isa, BinaryKernel)> {
    Isa::PRIORITY
        .into_iter()
        .filter(|isa| isa.width() == width && isa.available(caps))
        .find_map(|isa| O::kernel(isa, kind).map(|kernel| (isa, kernel)))
}

fn bind<O: BinaryOp>(caps: Capabilities, kind: ElementKind, width: Width) -> Option<Binding> {
    if let Some((isa, kernel)) = direct::<O>(caps, kind, width) {
        return Some(Binding {
            backend: Backend::Hardware(isa),
            kernel: Some(kernel),
        });
    }

    if !O::WIDTH_OBLIVIOUS {
        return None;
    }

    let others = ElementKind::ALL
        .into_iter()
        .filter(|other| other.size() != kind.size());

    kind.siblings().chain(others).find_map(|via| {
        direct::<O>(caps, via, width).map(|(isa, kernel)| Binding {
            backend: Backend::Composed { isa, via },
            kernel: Some(kernel),
        })
    })
}
