//! Targets without vector kernels; every operation resolves to the scalar
//! reference.

use super::{BinaryKernel, MaskedKernel, PackedMaskKernel};
use crate::arch::Isa;
use crate::lane::ElementKind;

pub(super) fn andnot(_isa: Isa, _kind: ElementKind) -> Option<BinaryKernel> {
    None
}

pub(super) fn andnot_packed(_isa: Isa, _kind: ElementKind) -> Option<PackedMaskKernel> {
    None
}

pub(super) fn andnot_masked(_isa: Isa, _kind: ElementKind) -> Option<MaskedKernel> {
    None
}

pub(super) fn add(_isa: Isa, _kind: ElementKind) -> Option<BinaryKernel> {
    None
}
