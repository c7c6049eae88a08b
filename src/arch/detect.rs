//! Host CPU probe.

use super::Capabilities;
use once_cell::sync::Lazy;

/// Features reported by the running CPU, probed on first use.
pub(super) static DETECTED: Lazy<Capabilities> = Lazy::new(probe);

#[cfg(target_arch = "x86_64")]
fn probe() -> Capabilities {
    let mut caps = Capabilities::empty();

    for (feature, present) in [
        (Capabilities::SSE2, is_x86_feature_detected!("sse2")),
        (Capabilities::SSE3, is_x86_feature_detected!("sse3")),
        (Capabilities::SSSE3, is_x86_feature_detected!("ssse3")),
        (Capabilities::SSE4_1, is_x86_feature_detected!("sse4.1")),
        (Capabilities::AVX, is_x86_feature_detected!("avx")),
        (Capabilities::AVX2, is_x86_feature_detected!("avx2")),
        (Capabilities::AVX512F, is_x86_feature_detected!("avx512f")),
        (Capabilities::AVX512BW, is_x86_feature_detected!("avx512bw")),
    ] {
        caps.set(feature, present);
    }

    log::debug!("Detected host capabilities: {caps}");
    caps
}

#[cfg(target_arch = "aarch64")]
fn probe() -> Capabilities {
    let mut caps = Capabilities::empty();
    caps.set(
        Capabilities::NEON,
        std::arch::is_aarch64_feature_detected!("neon"),
    );

    log::debug!("Detected host capabilities: {caps}");
    caps
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn probe() -> Capabilities {
    log::debug!("No vector probe for this architecture, running scalar");
    Capabilities::empty()
}
