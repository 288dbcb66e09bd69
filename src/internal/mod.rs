//! Internal Implementation Details
//!
//! Types in this module are not part of the public API and may change
//! without notice.
//!
//! - [`register`]: FEC register map and access trait
//! - [`constants`]: frame geometry, defaults and timings
//! - [`phy_regs`]: IEEE 802.3 PHY register definitions
//! - [`dma`]: descriptors, rings and the buffer pool
//! - [`trace`]: logging shims over `defmt` and `log`

pub(crate) mod constants;
pub(crate) mod dma;
pub(crate) mod phy_regs;
pub(crate) mod register;
pub(crate) mod trace;
