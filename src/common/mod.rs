//! Common types and utilities shared across modules.
//!
//! This module provides the unified error type and the lane dump formatting
//! used by oracle diagnostics.

// Submodule declarations
pub mod error;
pub mod fmt;

// Re-exports for convenience
pub use error::{Error, Result};
