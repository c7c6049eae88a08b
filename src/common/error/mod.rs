//! Unified error types for lanekit.
//!
//! This module provides the single error type shared by dispatch, the lane
//! model and the differential oracle.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
