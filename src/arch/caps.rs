use super::detect::DETECTED;
use crate::common::{Error, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// A set of hardware vector features.
    ///
    /// The empty set means "no vector support" and resolves every operation
    /// to the scalar reference.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Capabilities: u32 {
        /// 128-bit integer and double lanes (x86)
        const SSE2 = 1 << 0;
        const SSE3 = 1 << 1;
        const SSSE3 = 1 << 2;
        const SSE4_1 = 1 << 3;
        /// 256-bit float lanes
        const AVX = 1 << 4;
        /// 256-bit integer lanes
        const AVX2 = 1 << 5;
        /// 512-bit 32/64-bit lanes and packed-bit mask registers
        const AVX512F = 1 << 6;
        /// 512-bit 8/16-bit lanes
        const AVX512BW = 1 << 7;
        /// 128-bit ARM Advanced SIMD
        const NEON = 1 << 8;
    }
}

const SSE4_LEVEL: Capabilities = Capabilities::SSE2
    .union(Capabilities::SSE3)
    .union(Capabilities::SSSE3)
    .union(Capabilities::SSE4_1);
const AVX_LEVEL: Capabilities = SSE4_LEVEL.union(Capabilities::AVX);
const AVX2_LEVEL: Capabilities = AVX_LEVEL.union(Capabilities::AVX2);
const AVX512F_LEVEL: Capabilities = AVX2_LEVEL.union(Capabilities::AVX512F);
const AVX512BW_LEVEL: Capabilities = AVX512F_LEVEL.union(Capabilities::AVX512BW);

/// Cumulative feature levels, lowest first.
const LADDER: [Capabilities; 8] = [
    Capabilities::empty(),
    Capabilities::SSE2,
    SSE4_LEVEL,
    AVX_LEVEL,
    AVX2_LEVEL,
    AVX512F_LEVEL,
    AVX512BW_LEVEL,
    Capabilities::NEON,
];

impl Capabilities {
    /// Features this build has kernels for.
    ///
    /// AVX-512 kernels are only compiled when the build itself targets
    /// AVX-512, so the flags appear here only in that case.
    pub fn compiled() -> Self {
        #[allow(unused_mut)]
        let mut caps = Self::empty();

        #[cfg(target_arch = "x86_64")]
        {
            caps |= AVX2_LEVEL;
            if cfg!(target_feature = "avx512f") {
                caps |= Self::AVX512F;
            }
            if cfg!(all(target_feature = "avx512f", target_feature = "avx512bw")) {
                caps |= Self::AVX512BW;
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            caps |= Self::NEON;
        }

        caps
    }

    /// Features the running CPU reports, probed once per process.
    pub fn detect() -> Self {
        *DETECTED
    }

    /// Features usable on this host by this build.
    pub fn host() -> Self {
        Self::detect() & Self::compiled()
    }

    /// Whether any feature in the set is one this build can target.
    ///
    /// A set without vector support resolves every kind to the scalar
    /// reference; a set with it must resolve every kind to hardware.
    pub fn has_vector_support(self) -> bool {
        self.intersects(Self::compiled())
    }

    /// Cumulative feature levels from scalar upwards, across architectures.
    pub fn ladder() -> &'static [Capabilities] {
        &LADDER
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("scalar");
        }

        for (i, (name, _)) in self.iter_names().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            f.write_str(&name.to_ascii_lowercase())?;
        }
        Ok(())
    }
}

impl FromStr for Capabilities {
    type Err = Error;

    /// Parse a list such as `"sse2,avx2"` or `"sse4.1+avx"`.
    ///
    /// Names are case-insensitive; `scalar` and `none` add nothing.
    fn from_str(s: &str) -> Result<Self> {
        let mut caps = Self::empty();

        for name in s
            .split([',', '+', '|', ' '])
            .map(str::trim)
            .filter(|name| !name.is_empty())
        {
            if name.eq_ignore_ascii_case("scalar") || name.eq_ignore_ascii_case("none") {
                continue;
            }
            let canonical = name.to_ascii_uppercase().replace('.', "_");
            caps |= Self::from_name(&canonical)
                .ok_or_else(|| Error::UnknownCapability(name.to_string()))?;
        }

        Ok(caps)
    }
}
