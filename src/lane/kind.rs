use serde::{Deserialize, Serialize};
use std::fmt;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// The numeric type of a vector's lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ElementKind {
    pub const COUNT: usize = 10;

    /// All kinds in canonical order.
    pub const ALL: [ElementKind; ElementKind::COUNT] = [
        ElementKind::U8,
        ElementKind::I8,
        ElementKind::U16,
        ElementKind::I16,
        ElementKind::U32,
        ElementKind::I32,
        ElementKind::U64,
        ElementKind::I64,
        ElementKind::F32,
        ElementKind::F64,
    ];

    /// Lane size in bytes.
    pub const fn size(self) -> usize {
        match self {
            ElementKind::U8 | ElementKind::I8 => 1,
            ElementKind::U16 | ElementKind::I16 => 2,
            ElementKind::U32 | ElementKind::I32 | ElementKind::F32 => 4,
            ElementKind::U64 | ElementKind::I64 | ElementKind::F64 => 8,
        }
    }

    pub const fn is_float(self) -> bool {
        matches!(self, ElementKind::F32 | ElementKind::F64)
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            ElementKind::I8 | ElementKind::I16 | ElementKind::I32 | ElementKind::I64
        ) || self.is_float()
    }

    pub const fn name(self) -> &'static str {
        match self {
            ElementKind::U8 => "uint8",
            ElementKind::I8 => "int8",
            ElementKind::U16 => "uint16",
            ElementKind::I16 => "int16",
            ElementKind::U32 => "uint32",
            ElementKind::I32 => "int32",
            ElementKind::U64 => "uint64",
            ElementKind::I64 => "int64",
            ElementKind::F32 => "float32",
            ElementKind::F64 => "float64",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Other kinds with the same lane size, in canonical order.
    pub fn siblings(self) -> impl Iterator<Item = ElementKind> {
        Self::ALL
            .into_iter()
            .filter(move |kind| *kind != self && kind.size() == self.size())
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A primitive lane type.
///
/// Implemented for the ten primitive types matching [`ElementKind`]. Bit
/// patterns travel as `u64` so kernels and formatting can stay untyped.
pub trait Lane:
    sealed::Sealed
    + Copy
    + PartialEq
    + fmt::Debug
    + IntoBytes
    + FromBytes
    + Immutable
    + Send
    + Sync
    + 'static
{
    const KIND: ElementKind;
    const ZERO: Self;
    /// All bits set; the data form of a `true` mask lane.
    const ONES: Self;

    /// Raw bits, zero-extended.
    fn to_bits(self) -> u64;
    /// From raw bits, truncated to the lane width.
    fn from_bits(bits: u64) -> Self;
    /// Lane addition: wrapping for integers, IEEE for floats.
    fn lane_add(self, rhs: Self) -> Self;
    /// Append the decimal rendering of the lane.
    fn push_decimal(self, out: &mut String);
}

macro_rules! impl_int_lane {
    ($($ty:ty => $kind:ident, $unsigned:ty);* $(;)?) => {$(
        impl sealed::Sealed for $ty {}

        impl Lane for $ty {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0;
            const ONES: Self = !0;

            #[inline]
            fn to_bits(self) -> u64 {
                self as $unsigned as u64
            }

            #[inline]
            fn from_bits(bits: u64) -> Self {
                bits as $unsigned as $ty
            }

            #[inline]
            fn lane_add(self, rhs: Self) -> Self {
                self.wrapping_add(rhs)
            }

            fn push_decimal(self, out: &mut String) {
                out.push_str(itoa::Buffer::new().format(self));
            }
        }
    )*};
}

macro_rules! impl_float_lane {
    ($($ty:ty => $kind:ident, $bits:ty);* $(;)?) => {$(
        impl sealed::Sealed for $ty {}

        impl Lane for $ty {
            const KIND: ElementKind = ElementKind::$kind;
            const ZERO: Self = 0.0;
            const ONES: Self = <$ty>::from_bits(!0);

            #[inline]
            fn to_bits(self) -> u64 {
                <$ty>::to_bits(self) as u64
            }

            #[inline]
            fn from_bits(bits: u64) -> Self {
                <$ty>::from_bits(bits as $bits)
            }

            #[inline]
            fn lane_add(self, rhs: Self) -> Self {
                self + rhs
            }

            fn push_decimal(self, out: &mut String) {
                out.push_str(ryu::Buffer::new().format(self));
            }
        }
    )*};
}

impl_int_lane! {
    u8 => U8, u8;
    i8 => I8, u8;
    u16 => U16, u16;
    i16 => I16, u16;
    u32 => U32, u32;
    i32 => I32, u32;
    u64 => U64, u64;
    i64 => I64, u64;
}

impl_float_lane! {
    f32 => F32, u32;
    f64 => F64, u64;
}

/// Read one native-endian lane of 1 to 8 bytes as zero-extended bits.
pub(crate) fn bits_from_ne_bytes(lane: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    let len = lane.len().min(8);
    if cfg!(target_endian = "little") {
        buf[..len].copy_from_slice(&lane[..len]);
        u64::from_le_bytes(buf)
    } else {
        buf[8 - len..].copy_from_slice(&lane[..len]);
        u64::from_be_bytes(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_and_flags() {
        assert_eq!(ElementKind::ALL.len(), ElementKind::COUNT);
        for (i, kind) in ElementKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(ElementKind::I16.size(), 2);
        assert!(ElementKind::F32.is_float());
        assert!(!ElementKind::U64.is_float());
        assert!(ElementKind::I8.is_signed());
        assert!(!ElementKind::U8.is_signed());
    }

    #[test]
    fn test_siblings() {
        let siblings: Vec<_> = ElementKind::U32.siblings().collect();
        assert_eq!(siblings, vec![ElementKind::I32, ElementKind::F32]);

        let siblings: Vec<_> = ElementKind::U16.siblings().collect();
        assert_eq!(siblings, vec![ElementKind::I16]);
    }

    #[test]
    fn test_lane_bits() {
        assert_eq!((-1i8).to_bits(), 0xFF);
        assert_eq!(<i16 as Lane>::from_bits(0xFFFF), -1);
        assert_eq!(<u8 as Lane>::from_bits(0x1FF), 0xFF);
        assert_eq!(<f32 as Lane>::to_bits(1.0), 0x3F80_0000);
        assert_eq!(<f64 as Lane>::ONES.to_bits(), u64::MAX);
        assert_eq!(<i32 as Lane>::ONES, -1);
    }

    #[test]
    fn test_lane_add() {
        assert_eq!(250u8.lane_add(10), 4);
        assert_eq!(i16::MAX.lane_add(1), i16::MIN);
        assert_eq!(1.5f64.lane_add(0.25), 1.75);
    }

    #[test]
    fn test_bits_from_ne_bytes() {
        assert_eq!(bits_from_ne_bytes(&0xABCDu16.to_ne_bytes()), 0xABCD);
        assert_eq!(bits_from_ne_bytes(&7u64.to_ne_bytes()), 7);
        assert_eq!(bits_from_ne_bytes(&[0x80]), 0x80);
    }
}
