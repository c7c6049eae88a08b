use super::ElementKind;
use std::fmt;

/// A hardware register width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Width {
    B128,
    B256,
    B512,
}

impl Width {
    pub const COUNT: usize = 3;
    /// Narrowest first.
    pub const ALL: [Width; Width::COUNT] = [Width::B128, Width::B256, Width::B512];
    /// Widest first, the order shapes are resolved in.
    pub const DESCENDING: [Width; Width::COUNT] = [Width::B512, Width::B256, Width::B128];

    pub const fn bytes(self) -> usize {
        match self {
            Width::B128 => 16,
            Width::B256 => 32,
            Width::B512 => 64,
        }
    }

    pub const fn bits(self) -> usize {
        self.bytes() * 8
    }

    /// Lanes of `kind` in one register.
    pub const fn lanes(self, kind: ElementKind) -> usize {
        self.bytes() / kind.size()
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Widest width that evenly divides `bytes`.
    pub fn widest_dividing(bytes: usize) -> Option<Width> {
        Self::DESCENDING
            .into_iter()
            .find(|width| bytes > 0 && bytes % width.bytes() == 0)
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}
