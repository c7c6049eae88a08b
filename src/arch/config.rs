use super::Capabilities;
use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where a dispatcher's capability set comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilitySource {
    /// Everything the host CPU and this build support
    #[default]
    Host,
    /// No vector support; every operation runs the scalar reference
    Scalar,
    /// A fixed feature set
    Explicit(Capabilities),
}

impl CapabilitySource {
    /// Resolve to a concrete feature set.
    pub fn capabilities(self) -> Capabilities {
        match self {
            CapabilitySource::Host => Capabilities::host(),
            CapabilitySource::Scalar => Capabilities::empty(),
            CapabilitySource::Explicit(caps) => caps,
        }
    }
}

impl FromStr for CapabilitySource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("host") {
            Ok(CapabilitySource::Host)
        } else if trimmed.eq_ignore_ascii_case("scalar") || trimmed.eq_ignore_ascii_case("none") {
            Ok(CapabilitySource::Scalar)
        } else {
            trimmed.parse().map(CapabilitySource::Explicit)
        }
    }
}

/// Dispatcher configuration.
///
/// Loaded from YAML or the environment:
///
/// ```yaml
/// capabilities: host
/// disable: AVX512F | AVX512BW
/// parallel_threshold: 64
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Base capability set
    pub capabilities: CapabilitySource,
    /// Features removed from the base set
    pub disable: Capabilities,
    /// Segment count from which segments are applied in parallel
    pub parallel_threshold: Option<usize>,
}

impl DispatchConfig {
    /// Environment variable holding the capability source (`host`, `scalar` or a list)
    pub const ENV_CAPS: &'static str = "LANEKIT_CAPS";
    /// Environment variable holding features to disable
    pub const ENV_DISABLE: &'static str = "LANEKIT_DISABLE";

    /// Parse a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_saphyr::from_str(text).map_err(|e| Error::Yaml(e.to_string()))
    }

    /// Render as a YAML document.
    pub fn to_yaml(&self) -> Result<String> {
        serde_saphyr::to_string(self).map_err(|e| Error::Yaml(e.to_string()))
    }

    /// Read `LANEKIT_CAPS` and `LANEKIT_DISABLE`; unset variables keep defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(Self::ENV_CAPS) {
            config.capabilities = value.parse()?;
        }
        if let Ok(value) = std::env::var(Self::ENV_DISABLE) {
            config.disable = value.parse()?;
        }

        Ok(config)
    }

    /// The effective capability set: the source minus disabled features.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.capabilities().difference(self.disable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_parse() {
        assert_eq!("host".parse::<CapabilitySource>().unwrap(), CapabilitySource::Host);
        assert_eq!(" Scalar ".parse::<CapabilitySource>().unwrap(), CapabilitySource::Scalar);
        assert_eq!(
            "sse2,avx".parse::<CapabilitySource>().unwrap(),
            CapabilitySource::Explicit(Capabilities::SSE2 | Capabilities::AVX)
        );
        assert!("sse9".parse::<CapabilitySource>().is_err());
    }

    #[test]
    fn test_disable_is_subtracted() {
        let config = DispatchConfig {
            capabilities: CapabilitySource::Explicit(Capabilities::SSE2 | Capabilities::AVX2),
            disable: Capabilities::AVX2 | Capabilities::NEON,
            parallel_threshold: None,
        };
        assert_eq!(config.capabilities(), Capabilities::SSE2);
    }

    #[test]
    fn test_default_is_host() {
        let config = DispatchConfig::default();
        assert_eq!(config.capabilities(), Capabilities::host());
        assert_eq!(config.parallel_threshold, None);
    }

    #[test]
    fn test_from_yaml() {
        let config = DispatchConfig::from_yaml(
            "capabilities: scalar\ndisable: AVX512F | AVX512BW\nparallel_threshold: 64\n",
        )
        .unwrap();

        assert_eq!(config.capabilities, CapabilitySource::Scalar);
        assert_eq!(config.disable, Capabilities::AVX512F | Capabilities::AVX512BW);
        assert_eq!(config.parallel_threshold, Some(64));
    }

    #[test]
    fn test_from_yaml_defaults() {
        let config = DispatchConfig::from_yaml("parallel_threshold: 8\n").unwrap();
        assert_eq!(config.capabilities, CapabilitySource::Host);
        assert!(config.disable.is_empty());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = DispatchConfig {
            capabilities: CapabilitySource::Host,
            disable: Capabilities::AVX,
            parallel_threshold: Some(4),
        };
        let text = config.to_yaml().unwrap();
        assert_eq!(DispatchConfig::from_yaml(&text).unwrap(), config);
    }
}
