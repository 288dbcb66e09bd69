//! Hardware Abstraction Layer
//!
//! - [`mii`]: MII management bus for PHY communication
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod mii;

pub use mii::{FecMdio, MAX_PHY_ADDR, MAX_REG_ADDR, MdioBus};
