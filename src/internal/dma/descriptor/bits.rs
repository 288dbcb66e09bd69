//! Buffer descriptor status bits.
//!
//! Receive and transmit descriptors share the 16-bit status layout; bit 15
//! is `E` (empty) on receive and `R` (ready) on transmit, and in both cases
//! means the descriptor belongs to the DMA engine.

// Error bits are decoded for diagnostics only.
#![allow(dead_code)]

/// Receive descriptor status bits
pub mod rx {
    /// Empty: owned by the DMA engine, waiting for a frame
    pub const E: u16 = 0x8000;
    /// Software ownership bit, ignored by the engine
    pub const RO1: u16 = 0x4000;
    /// Wrap: last descriptor of the ring
    pub const W: u16 = 0x2000;
    /// Software ownership bit, ignored by the engine
    pub const RO2: u16 = 0x1000;
    /// Last buffer of a frame
    pub const L: u16 = 0x0800;
    /// Address matched by miss (promiscuous)
    pub const M: u16 = 0x0100;
    /// Broadcast destination
    pub const BC: u16 = 0x0080;
    /// Multicast destination
    pub const MC: u16 = 0x0040;
    /// Frame length violation
    pub const LG: u16 = 0x0020;
    /// Non-octet aligned frame
    pub const NO: u16 = 0x0010;
    /// CRC error
    pub const CR: u16 = 0x0004;
    /// FIFO overrun
    pub const OV: u16 = 0x0002;
    /// Frame truncated
    pub const TR: u16 = 0x0001;

    /// Error bits valid when `L` is set
    pub const ERRORS: u16 = LG | NO | CR | OV | TR;
}

/// Transmit descriptor status bits
pub mod tx {
    /// Ready: owned by the DMA engine, waiting to be sent
    pub const R: u16 = 0x8000;
    /// Software ownership bit, ignored by the engine
    pub const TO1: u16 = 0x4000;
    /// Wrap: last descriptor of the ring
    pub const W: u16 = 0x2000;
    /// Software ownership bit, ignored by the engine
    pub const TO2: u16 = 0x1000;
    /// Last buffer of a frame
    pub const L: u16 = 0x0800;
    /// Append the CRC after the last byte
    pub const TC: u16 = 0x0400;
    /// Append a bad CRC
    pub const ABC: u16 = 0x0200;
}
