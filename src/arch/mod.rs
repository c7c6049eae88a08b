//! Capability model.
//!
//! A [`Capabilities`] value names a set of hardware vector features. The
//! resolver only ever looks at the set it is given; the host probe in
//! [`Capabilities::detect`] is consulted once, when a dispatcher is created,
//! to make sure no kernel runs on a CPU that lacks its instructions.

mod caps;
mod config;
mod detect;
mod isa;

pub use caps::Capabilities;
pub use config::{CapabilitySource, DispatchConfig};
pub use isa::Isa;
