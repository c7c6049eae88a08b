use super::Capabilities;
use crate::lane::Width;
use std::fmt;

/// An instruction-set family that kernels are written against.
///
/// Declaration order is resolution priority: when two families offer a
/// kernel for the same element kind and width, the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Isa {
    Avx512bw,
    Avx512f,
    Avx2,
    Avx,
    Sse2,
    Neon,
}

impl Isa {
    /// All families in resolution priority order.
    pub const PRIORITY: [Isa; 6] = [
        Isa::Avx512bw,
        Isa::Avx512f,
        Isa::Avx2,
        Isa::Avx,
        Isa::Sse2,
        Isa::Neon,
    ];

    /// Features a capability set must contain to use this family.
    pub const fn required(self) -> Capabilities {
        match self {
            Isa::Avx512bw => Capabilities::AVX512F.union(Capabilities::AVX512BW),
            Isa::Avx512f => Capabilities::AVX512F,
            Isa::Avx2 => Capabilities::AVX2,
            Isa::Avx => Capabilities::AVX,
            Isa::Sse2 => Capabilities::SSE2,
            Isa::Neon => Capabilities::NEON,
        }
    }

    /// Register width of this family's kernels.
    pub const fn width(self) -> Width {
        match self {
            Isa::Avx512bw | Isa::Avx512f => Width::B512,
            Isa::Avx2 | Isa::Avx => Width::B256,
            Isa::Sse2 | Isa::Neon => Width::B128,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Isa::Avx512bw => "avx512bw",
            Isa::Avx512f => "avx512f",
            Isa::Avx2 => "avx2",
            Isa::Avx => "avx",
            Isa::Sse2 => "sse2",
            Isa::Neon => "neon",
        }
    }

    /// Whether `caps` enables this family.
    pub fn available(self, caps: Capabilities) -> bool {
        caps.contains(self.required())
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
