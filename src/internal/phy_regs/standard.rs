//! IEEE 802.3 Clause 22 PHY registers used during link bring-up.
//!
//! | Register | Name | Use |
//! |----------|------|-----|
//! | 0 | BMCR | start autonegotiation |
//! | 1 | BMSR | poll for autonegotiation complete |
//! | 2 | PHYIDR1 | detect that a PHY answers |
//! | 5 | ANLPAR | decode negotiated speed and duplex |

// Bit tables are complete per register, not all bits are consumed.
#![allow(dead_code)]

/// Standard PHY register addresses
pub mod phy_reg {
    /// Basic Mode Control Register
    pub const BMCR: u8 = 0;
    /// Basic Mode Status Register
    pub const BMSR: u8 = 1;
    /// PHY Identifier 1
    pub const PHYIDR1: u8 = 2;
    /// PHY Identifier 2
    pub const PHYIDR2: u8 = 3;
    /// Auto-Negotiation Advertisement Register
    pub const ANAR: u8 = 4;
    /// Auto-Negotiation Link Partner Ability Register
    pub const ANLPAR: u8 = 5;
}

/// BMCR bits
pub mod bmcr {
    /// Soft reset, self-clearing
    pub const RESET: u16 = 1 << 15;
    /// Autonegotiation enable
    pub const AN_ENABLE: u16 = 1 << 12;
    /// Restart autonegotiation, self-clearing
    pub const AN_RESTART: u16 = 1 << 9;
}

/// BMSR bits
pub mod bmsr {
    /// Autonegotiation complete
    pub const AN_COMPLETE: u16 = 1 << 5;
    /// Link up (latched low)
    pub const LINK_STATUS: u16 = 1 << 2;
}

/// ANLPAR bits (what the link partner advertised)
pub mod anlpar {
    /// 100BASE-TX full duplex
    pub const CAN_100_FD: u16 = 1 << 8;
    /// 100BASE-TX half duplex
    pub const CAN_100_HD: u16 = 1 << 7;
    /// 10BASE-T full duplex
    pub const CAN_10_FD: u16 = 1 << 6;
    /// 10BASE-T half duplex
    pub const CAN_10_HD: u16 = 1 << 5;
    /// IEEE 802.3 selector value
    pub const SELECTOR_802_3: u16 = 0x0001;
}
