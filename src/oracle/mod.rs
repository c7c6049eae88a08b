//! Cross-target differential test oracle.
//!
//! A test body records typed snapshots of the vectors it computes into a
//! [`TestCase`]. Two test cases captured under different capability sets
//! (in one process through [`Harness`], or in separate builds through the
//! YAML persistence on [`TestCase`]) are then checked with [`compare`].
//!
//! Integer and mask snapshots must agree byte for byte. Float snapshots may
//! differ by the number of representable steps recorded with them.

mod case;
mod compare;
mod harness;
mod tag;
mod ulp;

pub use case::{Snapshot, TestCase};
pub use compare::{Report, StructuralMismatch, ValueMismatch, compare, compare_report};
pub use harness::{Harness, HarnessOutcome};
pub use tag::TypeTag;
