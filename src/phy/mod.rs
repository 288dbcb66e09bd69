//! Ethernet PHY link bring-up
//!
//! The PHY is reached only through the [`MdioBus`](crate::hal::MdioBus)
//! trait, so the sequencer runs against the FEC's management interface on
//! target and against a scripted bus in tests. Any IEEE 802.3 clause 22 PHY
//! is supported; no vendor registers are used.
//!
//! # Example
//!
//! ```ignore
//! use ph_mcf_fec::hal::FecMdio;
//! use ph_mcf_fec::phy::LinkSequencer;
//!
//! let mut mdio = FecMdio::new(&regs, delay, config.mii, config.mii_speed());
//! let link = LinkSequencer::from_config(&config).run(&mut mdio)?;
//! ```

pub mod autoneg;

pub use autoneg::{
    LinkBus, LinkSequencer, LinkState, LinkStatus, LinkTiming, decode_link_partner,
};
