//! Configuration types for the FEC driver

use super::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    DEFAULT_CPU_CLOCK_HZ, DEFAULT_MAC_ADDR, DEFAULT_PHY_ADDR, LINK_DELAY_MS, MAX_FL_LIMIT,
    MAX_FRAME_SIZE, MII_MAX_POLLS, MII_POLL_DELAY_MS, MIN_FRAME_SIZE, TX_WAIT_MS,
};
use crate::internal::register::mscr;

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    #[default]
    Mbps100,
}

impl Speed {
    /// Speed in megabits per second
    #[must_use]
    pub const fn mbps(self) -> u32 {
        match self {
            Speed::Mbps10 => 10,
            Speed::Mbps100 => 100,
        }
    }
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    #[default]
    Full,
}

/// How many times a bring-up poll loop may retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollLimit {
    /// Retry until the condition holds
    #[default]
    Unbounded,
    /// Give up after this many failed polls
    Attempts(u32),
}

impl PollLimit {
    /// Whether `failed` unsuccessful polls use up the limit
    #[inline]
    #[must_use]
    pub const fn is_exhausted(self, failed: u32) -> bool {
        match self {
            PollLimit::Unbounded => false,
            PollLimit::Attempts(max) => failed >= max,
        }
    }
}

/// MII management frame completion polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MiiTiming {
    /// Completion checks before giving up
    pub max_polls: u32,
    /// Delay between checks in milliseconds
    pub poll_delay_ms: u32,
}

impl Default for MiiTiming {
    fn default() -> Self {
        Self {
            max_polls: MII_MAX_POLLS,
            poll_delay_ms: MII_POLL_DELAY_MS,
        }
    }
}

/// Complete FEC configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FecConfig {
    /// Station MAC address
    pub mac_address: [u8; 6],
    /// PHY address on the management bus (0-31)
    pub phy_address: u8,
    /// System clock, used to derive the MII management clock
    pub cpu_clock_hz: u32,
    /// Receive every frame regardless of destination
    pub promiscuous: bool,
    /// Largest frame the receiver accepts (`RCR.MAX_FL`)
    pub max_frame_len: usize,
    /// Delay before PHY presence and autonegotiation polls
    pub link_delay_ms: u32,
    /// MII completion polling
    pub mii: MiiTiming,
    /// How long a sender waits for the transmit descriptor
    pub tx_wait_ms: u32,
    /// Retry limit while waiting for the PHY to answer
    pub phy_detect_limit: PollLimit,
    /// Retry limit while waiting for autonegotiation
    pub autoneg_limit: PollLimit,
}

impl Default for FecConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl FecConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mac_address: DEFAULT_MAC_ADDR,
            phy_address: DEFAULT_PHY_ADDR,
            cpu_clock_hz: DEFAULT_CPU_CLOCK_HZ,
            promiscuous: false,
            max_frame_len: MAX_FRAME_SIZE,
            link_delay_ms: LINK_DELAY_MS,
            mii: MiiTiming {
                max_polls: MII_MAX_POLLS,
                poll_delay_ms: MII_POLL_DELAY_MS,
            },
            tx_wait_ms: TX_WAIT_MS,
            phy_detect_limit: PollLimit::Unbounded,
            autoneg_limit: PollLimit::Unbounded,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the MAC address
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the PHY address
    #[must_use]
    pub const fn with_phy_address(mut self, addr: u8) -> Self {
        self.phy_address = addr;
        self
    }

    /// Set the system clock frequency
    #[must_use]
    pub const fn with_cpu_clock_hz(mut self, hz: u32) -> Self {
        self.cpu_clock_hz = hz;
        self
    }

    /// Enable or disable promiscuous mode
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Set the largest accepted frame length
    #[must_use]
    pub const fn with_max_frame_len(mut self, len: usize) -> Self {
        self.max_frame_len = len;
        self
    }

    /// Set the delay preceding each link poll
    #[must_use]
    pub const fn with_link_delay_ms(mut self, ms: u32) -> Self {
        self.link_delay_ms = ms;
        self
    }

    /// Set MII completion polling
    #[must_use]
    pub const fn with_mii_timing(mut self, max_polls: u32, poll_delay_ms: u32) -> Self {
        self.mii = MiiTiming {
            max_polls,
            poll_delay_ms,
        };
        self
    }

    /// Set the transmit descriptor wait
    #[must_use]
    pub const fn with_tx_wait_ms(mut self, ms: u32) -> Self {
        self.tx_wait_ms = ms;
        self
    }

    /// Bound the PHY presence poll
    #[must_use]
    pub const fn with_phy_detect_limit(mut self, limit: PollLimit) -> Self {
        self.phy_detect_limit = limit;
        self
    }

    /// Bound the autonegotiation poll
    #[must_use]
    pub const fn with_autoneg_limit(mut self, limit: PollLimit) -> Self {
        self.autoneg_limit = limit;
        self
    }

    // =========================================================================
    // Derived Values
    // =========================================================================

    /// `MSCR` value keeping MDC at or below 2.5 MHz
    #[must_use]
    pub const fn mii_speed(&self) -> u32 {
        mscr::for_cpu_clock(self.cpu_clock_hz)
    }

    /// Check that every field is within what the hardware accepts
    pub fn validate(&self) -> ConfigResult<()> {
        if self.phy_address > 31 {
            return Err(ConfigError::InvalidPhyAddress);
        }
        if self.cpu_clock_hz == 0 || self.mii.max_polls == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        if self.max_frame_len < MIN_FRAME_SIZE || self.max_frame_len > MAX_FL_LIMIT {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

/// FEC driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Held in reset, bring-up not yet run
    #[default]
    Uninitialized,
    /// Link negotiated, receive DMA armed
    Running,
}

// =============================================================================
// Unit Tests
// =============================================================================
