//! Lanekit - portable SIMD lane operations for Rust
//!
//! This library runs logical operations on fixed-shape numeric vectors
//! (8/16/32/64-bit integers, single/double floats and boolean lane masks)
//! on the best vector instructions a CPU offers, while staying correct on
//! CPUs with no vector unit at all through a scalar fallback.
//!
//! # Features
//!
//! - **Capability-driven resolution**: each operation is bound, per element kind
//!   and register width, to a hardware kernel, a kernel borrowed from another kind
//!   of the same width (bitwise operations only), or the scalar reference
//! - **Width decomposition**: vectors wider than a register are processed as an
//!   ordered sequence of register-width segments
//! - **Mask algebra**: boolean lane vectors use packed-bit mask registers where
//!   the hardware has them and convert through data vectors where it does not
//! - **Differential oracle**: typed result snapshots captured under different
//!   capability sets are compared with a controlled ULP tolerance
//!
//! # Example - AND-NOT on the best available backend
//!
//! ```
//! use lanekit::{Dispatcher, Vector};
//!
//! # fn main() -> lanekit::Result<()> {
//! let dispatcher = Dispatcher::host()?;
//!
//! let a = Vector::splat(0xFFu8, 64)?;
//! let b = Vector::splat(0x0Fu8, 64)?;
//! let r = dispatcher.bit_andnot(&a, &b)?;
//!
//! assert!(r.lanes().iter().all(|&lane| lane == 0xF0));
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Comparing two capability sets
//!
//! ```
//! use lanekit::oracle::{compare, TestCase};
//! use lanekit::{Dispatcher, Vector};
//!
//! # fn main() -> lanekit::Result<()> {
//! let run = |dispatcher: &Dispatcher| -> lanekit::Result<TestCase> {
//!     let mut case = TestCase::new("andnot", file!());
//!     let a = Vector::from_fn(8, |i| i as u32 * 3)?;
//!     let b = Vector::splat(1u32, 8)?;
//!     case.push_vector(&dispatcher.bit_andnot(&a, &b)?, line!());
//!     Ok(case)
//! };
//!
//! let scalar = Dispatcher::scalar();
//! let host = Dispatcher::host()?;
//!
//! let mut report = String::new();
//! assert!(compare(&run(&scalar)?, &scalar.label(), &run(&host)?, &host.label(), &mut report));
//! assert!(report.is_empty());
//! # Ok(())
//! # }
//! ```

/// Capability model: hardware feature sets, instruction-set families,
/// the host CPU probe and dispatch configuration.
pub mod arch;

/// Shared error type and lane dump formatting.
pub mod common;

/// Backend resolution, width decomposition and mask algebra.
pub mod dispatch;

/// Element kinds, lane types, vectors and masks.
pub mod lane;

/// Operation identities with their scalar formulas and hardware kernels.
pub mod ops;

/// Cross-target differential test oracle.
pub mod oracle;

// Re-export commonly used types for convenience
pub use arch::{Capabilities, DispatchConfig, Isa};
pub use common::{Error, Result};
pub use dispatch::{Backend, BackendTable, Dispatcher, MaskBackend, Resolution};
pub use lane::{ElementKind, Lane, Mask, Vector, Width};
pub use ops::{Add, BinaryOp, BitAndNot, MaskOp};
