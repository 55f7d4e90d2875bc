//! Distribution of regional emission targets onto a latitude-longitude grid
//!
//! Each active region is resolved to the grid cells it covers, the ocean area of
//! those cells is measured (earlier regions claim shared cells first), and the
//! region's annual target is converted into a uniform surface flux painted onto
//! its ocean cells. The resulting [`field::EmissionField`] is constant in time and
//! integrates back to the requested global total when regions are disjoint.
//!
//! $$ \text{rate}_r = \frac{E_r \cdot 10^9}{360 \cdot 86400 \cdot A_r} $$
//!
//! where $E_r$ is the target in Tg/yr and $A_r$ the claimed ocean area in m².

pub mod area;
pub mod claims;
pub mod config;
pub mod distribute;
pub mod errors;
pub mod field;
pub mod grid;
pub mod integrate;
pub mod io;
pub mod mask;
pub mod pipeline;
pub mod region;
pub mod report;
pub mod units;

#[cfg(feature = "python")]
pub mod python;

pub use errors::{McbError, McbResult};
