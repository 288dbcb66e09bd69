//! PHY Register Definitions
//!
//! Registers reached through MII management frames rather than memory
//! mapping. Only the IEEE 802.3 Clause 22 set is needed by the link
//! sequencer.

pub mod standard;
