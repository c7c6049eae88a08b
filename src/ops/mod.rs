//! Operation identities, scalar reference formulas and hardware kernels.
//!
//! An operation is a zero-sized type implementing [`BinaryOp`]. It supplies
//! the scalar formula, the only definition of correct results, and a
//! lookup from (instruction-set family, element kind) to a hardware kernel.
//! The lookup answers only for *direct* bindings; composition through other
//! kinds is the resolver's job.
//!
//! Kernels work on raw bytes of exactly one register: `a`, `b` and `out`
//! are each [`Width::bytes`](crate::lane::Width::bytes) long for the kernel's
//! family. Callers must only invoke a kernel on a CPU that supports its
//! family.

mod add;
mod andnot;

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod portable;
#[cfg(target_arch = "x86_64")]
mod x86;

#[cfg(target_arch = "aarch64")]
use self::aarch64 as native;
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
use self::portable as native;
#[cfg(target_arch = "x86_64")]
use self::x86 as native;

pub use add::Add;
pub use andnot::BitAndNot;

use crate::arch::Isa;
use crate::lane::{ElementKind, Lane};
use std::fmt;

/// Data kernel over one register of `a`, `b` into `out`.
pub type BinaryKernel = unsafe fn(a: &[u8], b: &[u8], out: &mut [u8]);

/// Kernel over two packed-bit masks of one register.
pub type PackedMaskKernel = unsafe fn(a: u64, b: u64) -> u64;

/// Kernel over one data register and a packed-bit mask of the same lanes.
pub type MaskedKernel = unsafe fn(a: &[u8], b: u64, out: &mut [u8]);

/// Operation identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpId {
    BitAndNot,
    Add,
}

impl OpId {
    pub const COUNT: usize = 2;
    pub const ALL: [OpId; OpId::COUNT] = [OpId::BitAndNot, OpId::Add];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            OpId::BitAndNot => BitAndNot::NAME,
            OpId::Add => Add::NAME,
        }
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lane-wise binary operation on two vectors of the same shape.
pub trait BinaryOp: Send + Sync + 'static {
    const ID: OpId;
    const NAME: &'static str;

    /// Results depend only on bit patterns, never on lane boundaries, so a
    /// kernel for any kind of the same register width computes them.
    const WIDTH_OBLIVIOUS: bool;

    /// Reference result for one lane.
    fn scalar<T: Lane>(a: T, b: T) -> T;

    /// Direct hardware kernel for `kind` in family `isa`, if one exists.
    fn kernel(isa: Isa, kind: ElementKind) -> Option<BinaryKernel>;
}

/// Number of operations with mask forms.
pub(crate) const MASK_OP_COUNT: usize = 1;

/// A binary operation that also has mask forms.
pub trait MaskOp: BinaryOp {
    /// Position among the operations with mask forms, below [`MASK_OP_COUNT`].
    const MASK_SLOT: usize;

    /// Reference result for two mask lanes.
    fn scalar_mask(a: bool, b: bool) -> bool;

    /// Reference result for a data lane and a mask lane.
    fn scalar_masked<T: Lane>(a: T, b: bool) -> T;

    /// Kernel over packed-bit mask registers.
    fn packed_kernel(isa: Isa, kind: ElementKind) -> Option<PackedMaskKernel>;

    /// Kernel over a data register and a packed-bit mask register.
    fn masked_kernel(isa: Isa, kind: ElementKind) -> Option<MaskedKernel>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_names() {
        assert_eq!(OpId::BitAndNot.to_string(), "bit_andnot");
        assert_eq!(OpId::Add.name(), "add");
        for (i, op) in OpId::ALL.into_iter().enumerate() {
            assert_eq!(op.index(), i);
        }
    }

    #[test]
    fn test_kernels_only_exist_for_compiled_families() {
        use crate::arch::Capabilities;

        let compiled = Capabilities::compiled();
        for isa in Isa::PRIORITY {
            for kind in ElementKind::ALL {
                if BitAndNot::kernel(isa, kind).is_some() || Add::kernel(isa, kind).is_some() {
                    assert!(isa.available(compiled), "{isa} kernel without compiled support");
                }
            }
        }
    }
}
