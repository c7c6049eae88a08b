//! Unified error types for lanekit.
//!
//! Every fallible boundary of the crate (building a dispatcher, resolving a
//! shape, constructing a vector, loading snapshots) reports through this one
//! enum. Most variants describe configuration or caller defects; they are
//! surfaced as values so the caller decides how to stop.
use crate::arch::Capabilities;
use crate::lane::{ElementKind, MIN_VECTOR_BYTES};
use crate::oracle::TypeTag;
use thiserror::Error;

/// Main error type for lanekit operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No backend exists for an element kind under a capability set
    #[error("No backend for `{op}` on {kind} lanes with capabilities [{caps}]")]
    NoBackend {
        op: &'static str,
        kind: ElementKind,
        caps: Capabilities,
    },

    /// Backends exist for the kind, but none whose width divides the vector
    #[error("`{op}` cannot process {lanes} lanes of {kind} with capabilities [{caps}]")]
    Unresolvable {
        op: &'static str,
        kind: ElementKind,
        lanes: usize,
        caps: Capabilities,
    },

    /// Lane count is zero or not a whole number of 128-bit blocks
    #[error("Invalid lane count: {lanes} lanes of {kind} is not a positive multiple of {min} bytes", min = MIN_VECTOR_BYTES)]
    LaneCount { kind: ElementKind, lanes: usize },

    /// Operands describe different logical lane counts
    #[error("Shape mismatch: {left} lanes vs {right} lanes")]
    ShapeMismatch { left: usize, right: usize },

    /// Requested capabilities are not available on the running CPU
    #[error("Capabilities [{missing}] requested but not supported by this CPU (requested [{requested}])")]
    UnsupportedOnHost {
        requested: Capabilities,
        missing: Capabilities,
    },

    /// Capability name not recognized
    #[error("Unknown capability name: {0}")]
    UnknownCapability(String),

    /// Type tag code outside the closed tag set
    #[error("Unknown type tag: {0}")]
    UnknownTypeTag(u8),

    /// Snapshot payload does not have the size its tag mandates
    #[error("Payload size mismatch for {tag}: expected {expected} bytes, got {got}")]
    PayloadSize {
        tag: TypeTag,
        expected: usize,
        got: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(String),
}

/// Result type for lanekit operations.
pub type Result<T> = std::result::Result<T, Error>;
