use crate::common::{Error, Result};
use crate::lane::{ElementKind, Width};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! type_tags {
    ($($variant:ident = $code:literal, $name:literal, $kind:ident, $lanes:literal;)*) => {
        /// Declared type of a captured snapshot.
        ///
        /// A closed set: a 16-bit packed bitmask plus every 128-, 256- and
        /// 512-bit vector of the ten element kinds. The payload size of a
        /// snapshot follows from its tag alone.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum TypeTag {
            $($variant),*
        }

        impl TypeTag {
            pub const ALL: &'static [TypeTag] = &[$(TypeTag::$variant),*];

            /// Stable numeric code.
            pub const fn code(self) -> u8 {
                match self {
                    $(TypeTag::$variant => $code),*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(TypeTag::$variant => $name),*
                }
            }

            /// Element kind of the lanes; the bitmask reads as one `uint16` lane.
            pub const fn element(self) -> ElementKind {
                match self {
                    $(TypeTag::$variant => ElementKind::$kind),*
                }
            }

            pub const fn lanes(self) -> usize {
                match self {
                    $(TypeTag::$variant => $lanes),*
                }
            }
        }

        impl TryFrom<u8> for TypeTag {
            type Error = Error;

            fn try_from(code: u8) -> Result<Self> {
                match code {
                    $($code => Ok(TypeTag::$variant),)*
                    other => Err(Error::UnknownTypeTag(other)),
                }
            }
        }
    };
}

type_tags! {
    Uint16 = 0, "uint16", U16, 1;

    Uint8x16 = 1, "uint8x16", U8, 16;
    Int8x16 = 2, "int8x16", I8, 16;
    Uint16x8 = 3, "uint16x8", U16, 8;
    Int16x8 = 4, "int16x8", I16, 8;
    Uint32x4 = 5, "uint32x4", U32, 4;
    Int32x4 = 6, "int32x4", I32, 4;
    Uint64x2 = 7, "uint64x2", U64, 2;
    Int64x2 = 8, "int64x2", I64, 2;
    Float32x4 = 9, "float32x4", F32, 4;
    Float64x2 = 10, "float64x2", F64, 2;

    Uint8x32 = 11, "uint8x32", U8, 32;
    Int8x32 = 12, "int8x32", I8, 32;
    Uint16x16 = 13, "uint16x16", U16, 16;
    Int16x16 = 14, "int16x16", I16, 16;
    Uint32x8 = 15, "uint32x8", U32, 8;
    Int32x8 = 16, "int32x8", I32, 8;
    Uint64x4 = 17, "uint64x4", U64, 4;
    Int64x4 = 18, "int64x4", I64, 4;
    Float32x8 = 19, "float32x8", F32, 8;
    Float64x4 = 20, "float64x4", F64, 4;

    Uint8x64 = 21, "uint8x64", U8, 64;
    Int8x64 = 22, "int8x64", I8, 64;
    Uint16x32 = 23, "uint16x32", U16, 32;
    Int16x32 = 24, "int16x32", I16, 32;
    Uint32x16 = 25, "uint32x16", U32, 16;
    Int32x16 = 26, "int32x16", I32, 16;
    Uint64x8 = 27, "uint64x8", U64, 8;
    Int64x8 = 28, "int64x8", I64, 8;
    Float32x16 = 29, "float32x16", F32, 16;
    Float64x8 = 30, "float64x8", F64, 8;
}

impl TypeTag {
    /// Payload size in bytes.
    pub const fn size(self) -> usize {
        self.lanes() * self.element().size()
    }

    pub const fn is_float(self) -> bool {
        self.element().is_float()
    }

    /// Whether this is the packed bitmask tag rather than a vector.
    pub const fn is_bitmask(self) -> bool {
        matches!(self, TypeTag::Uint16)
    }

    /// Tag of one register of `kind` at `width`.
    pub fn vector(kind: ElementKind, width: Width) -> TypeTag {
        // Vector codes run kind-major within each width block.
        let code = 1 + width.index() * ElementKind::COUNT + kind.index();
        TypeTag::ALL[code]
    }

    /// Tag of a vector of `lanes` lanes of `kind`, if one exists.
    pub fn for_shape(kind: ElementKind, lanes: usize) -> Option<TypeTag> {
        Width::ALL
            .into_iter()
            .find(|width| width.lanes(kind) == lanes)
            .map(|width| Self::vector(kind, width))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_dense_and_roundtrip() {
        for (i, tag) in TypeTag::ALL.iter().enumerate() {
            assert_eq!(tag.code() as usize, i);
            assert_eq!(TypeTag::try_from(tag.code()).unwrap(), *tag);
        }
        assert!(matches!(TypeTag::try_from(31), Err(Error::UnknownTypeTag(31))));
    }

    #[test]
    fn test_sizes() {
        assert_eq!(TypeTag::Uint16.size(), 2);
        assert_eq!(TypeTag::Uint8x16.size(), 16);
        assert_eq!(TypeTag::Float64x4.size(), 32);
        assert_eq!(TypeTag::Int16x32.size(), 64);
        for tag in TypeTag::ALL.iter().filter(|t| !t.is_bitmask()) {
            assert!(matches!(tag.size(), 16 | 32 | 64), "{tag}");
        }
    }

    #[test]
    fn test_vector_lookup_matches_table() {
        for kind in ElementKind::ALL {
            for width in Width::ALL {
                let tag = TypeTag::vector(kind, width);
                assert_eq!(tag.element(), kind);
                assert_eq!(tag.size(), width.bytes());
                assert_eq!(TypeTag::for_shape(kind, width.lanes(kind)), Some(tag));
            }
        }
        assert_eq!(TypeTag::for_shape(ElementKind::U8, 48), None);
    }

    #[test]
    fn test_float_tags() {
        assert!(TypeTag::Float32x4.is_float());
        assert!(!TypeTag::Uint16.is_float());
        assert!(TypeTag::Uint16.is_bitmask());
        assert_eq!(TypeTag::Float64x8.to_string(), "float64x8");
    }
}
