//! Marine cloud brightening emission ancillaries
//!
//! Re-exports the computational core and the standard regions, and adds the
//! job-file layer driving the `mcb-ancil` binary.

pub mod job;

#[cfg(feature = "python")]
pub mod python;

pub use mcb_core;
pub use mcb_regions;
