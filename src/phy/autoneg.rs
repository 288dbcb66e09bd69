//! Link bring-up and autonegotiation sequencer
//!
//! Drives the MAC reset, PHY presence check and clause-22 autonegotiation
//! as an explicit state machine over an [`MdioBus`]. Each call to
//! [`LinkSequencer::step`] performs one bus action or delay, so the
//! sequence can be unit tested stage by stage or run to completion with
//! [`LinkSequencer::run`].

use embedded_hal::delay::DelayNs;

use crate::driver::config::{Duplex, FecConfig, PollLimit, Speed};
use crate::driver::error::{IoError, Result};
use crate::hal::mii::{FecMdio, MdioBus};
use crate::internal::constants::{LINK_DELAY_MS, PHY_ABSENT_ID};
use crate::internal::phy_regs::standard::{anlpar, bmcr, bmsr, phy_reg};
use crate::internal::register::FecRegisters;
use crate::internal::trace::{fec_debug, fec_info};

// =============================================================================
// Link Status
// =============================================================================

/// Ethernet link parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    /// Link speed
    pub speed: Speed,
    /// Duplex mode
    pub duplex: Duplex,
    /// Whether the parameters came from a completed autonegotiation
    pub negotiated: bool,
}

impl LinkStatus {
    /// Negotiated link status
    pub const fn new(speed: Speed, duplex: Duplex) -> Self {
        Self {
            speed,
            duplex,
            negotiated: true,
        }
    }

    /// 100 Mbps Full Duplex
    pub const fn fast_full() -> Self {
        Self::new(Speed::Mbps100, Duplex::Full)
    }

    /// 10 Mbps Half Duplex
    pub const fn slow_half() -> Self {
        Self::new(Speed::Mbps10, Duplex::Half)
    }

    /// Whether the MAC must run full duplex
    #[inline]
    pub const fn is_full_duplex(&self) -> bool {
        matches!(self.duplex, Duplex::Full)
    }
}

/// Decode the link partner ability register.
///
/// 100 Mbps if either 100BASE-TX mode is advertised, full duplex if either
/// full-duplex mode is advertised.
pub const fn decode_link_partner(ability: u16) -> LinkStatus {
    let speed = if ability & (anlpar::CAN_100_FD | anlpar::CAN_100_HD) != 0 {
        Speed::Mbps100
    } else {
        Speed::Mbps10
    };
    let duplex = if ability & (anlpar::CAN_100_FD | anlpar::CAN_10_FD) != 0 {
        Duplex::Full
    } else {
        Duplex::Half
    };
    LinkStatus::new(speed, duplex)
}

// =============================================================================
// Link Bus
// =============================================================================

/// Management bus plus the MAC-side hooks the sequencer needs.
pub trait LinkBus: MdioBus {
    /// Pulse the MAC reset and restore the management clock
    fn reset_mac(&mut self);

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<R: FecRegisters, D: DelayNs> LinkBus for FecMdio<'_, R, D> {
    fn reset_mac(&mut self) {
        self.reset_and_clock();
    }

    fn delay_ms(&mut self, ms: u32) {
        self.wait_ms(ms);
    }
}

// =============================================================================
// Sequencer
// =============================================================================

/// Stage of the link bring-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// MAC reset not yet pulsed
    Reset,
    /// Waiting for the PHY clocks to settle
    WaitSettle,
    /// Polling the identifier register until a PHY answers
    PhyPresentCheck,
    /// Restarting autonegotiation
    AutonegStart,
    /// Polling for autonegotiation complete
    AutonegWait,
    /// Reading the link partner abilities
    ResultRead,
    /// Link parameters known
    Configured(LinkStatus),
}

/// Timing and retry limits for a [`LinkSequencer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkTiming {
    /// Delay before the first poll and between polls
    pub link_delay_ms: u32,
    /// Retry limit for the presence check
    pub phy_detect_limit: PollLimit,
    /// Retry limit for autonegotiation
    pub autoneg_limit: PollLimit,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            link_delay_ms: LINK_DELAY_MS,
            phy_detect_limit: PollLimit::Unbounded,
            autoneg_limit: PollLimit::Unbounded,
        }
    }
}

/// Link bring-up state machine
#[derive(Debug)]
pub struct LinkSequencer {
    phy_addr: u8,
    timing: LinkTiming,
    state: LinkState,
    failed_polls: u32,
}

impl LinkSequencer {
    /// Sequencer for the PHY at `phy_addr`
    pub const fn new(phy_addr: u8, timing: LinkTiming) -> Self {
        Self {
            phy_addr,
            timing,
            state: LinkState::Reset,
            failed_polls: 0,
        }
    }

    /// Sequencer configured from a [`FecConfig`]
    pub const fn from_config(config: &FecConfig) -> Self {
        Self::new(
            config.phy_address,
            LinkTiming {
                link_delay_ms: config.link_delay_ms,
                phy_detect_limit: config.phy_detect_limit,
                autoneg_limit: config.autoneg_limit,
            },
        )
    }

    /// Current stage
    pub const fn state(&self) -> LinkState {
        self.state
    }

    /// Failed polls in the current polling stage
    pub const fn failed_polls(&self) -> u32 {
        self.failed_polls
    }

    /// Negotiated link, once configured
    pub const fn link(&self) -> Option<LinkStatus> {
        match self.state {
            LinkState::Configured(link) => Some(link),
            _ => None,
        }
    }

    /// Advance by one action and return the new stage.
    ///
    /// Polling stages stay put until their condition holds. A failed MII
    /// transfer counts as a failed poll, so the restart write and the
    /// partner read are retried too. Errors only occur with a bounded
    /// [`PollLimit`].
    pub fn step<B: LinkBus>(&mut self, bus: &mut B) -> Result<LinkState> {
        match self.state {
            LinkState::Reset => {
                bus.reset_mac();
                self.state = LinkState::WaitSettle;
            }
            LinkState::WaitSettle => {
                bus.delay_ms(self.timing.link_delay_ms);
                self.enter(LinkState::PhyPresentCheck);
            }
            LinkState::PhyPresentCheck => {
                bus.delay_ms(self.timing.link_delay_ms);
                let id = bus
                    .read(self.phy_addr, phy_reg::PHYIDR1)
                    .unwrap_or(PHY_ABSENT_ID);
                if id != PHY_ABSENT_ID {
                    fec_info!("PHY {} answered, id {:#x}", self.phy_addr, id);
                    self.enter(LinkState::AutonegStart);
                } else {
                    self.poll_failed(self.timing.phy_detect_limit, IoError::PhyNotDetected)?;
                }
            }
            LinkState::AutonegStart => {
                let restart = bus.write(
                    self.phy_addr,
                    phy_reg::BMCR,
                    bmcr::AN_RESTART | bmcr::AN_ENABLE,
                );
                if restart.is_ok() {
                    self.enter(LinkState::AutonegWait);
                } else {
                    self.poll_failed(self.timing.autoneg_limit, IoError::AutonegTimeout)?;
                }
            }
            LinkState::AutonegWait => {
                bus.delay_ms(self.timing.link_delay_ms);
                let status = bus.read(self.phy_addr, phy_reg::BMSR).unwrap_or(0);
                if status & bmsr::AN_COMPLETE != 0 {
                    self.enter(LinkState::ResultRead);
                } else {
                    self.poll_failed(self.timing.autoneg_limit, IoError::AutonegTimeout)?;
                }
            }
            LinkState::ResultRead => {
                let Ok(ability) = bus.read(self.phy_addr, phy_reg::ANLPAR) else {
                    self.poll_failed(self.timing.autoneg_limit, IoError::AutonegTimeout)?;
                    return Ok(self.state);
                };
                let link = decode_link_partner(ability);
                fec_info!(
                    "link negotiated: {} Mbps, full duplex {}",
                    link.speed.mbps(),
                    link.is_full_duplex()
                );
                self.enter(LinkState::Configured(link));
            }
            LinkState::Configured(_) => {}
        }
        Ok(self.state)
    }

    /// Step until configured or a bounded poll gives up.
    pub fn run<B: LinkBus>(&mut self, bus: &mut B) -> Result<LinkStatus> {
        loop {
            if let LinkState::Configured(link) = self.step(bus)? {
                return Ok(link);
            }
        }
    }

    fn enter(&mut self, state: LinkState) {
        self.state = state;
        self.failed_polls = 0;
    }

    fn poll_failed(&mut self, limit: PollLimit, error: IoError) -> Result<()> {
        self.failed_polls = self.failed_polls.saturating_add(1);
        if limit.is_exhausted(self.failed_polls) {
            fec_debug!("link poll gave up after {} attempts", self.failed_polls);
            return Err(error.into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::error::Error;
    use crate::testing::MockMdioBus;

    fn timing(ms: u32) -> LinkTiming {
        LinkTiming {
            link_delay_ms: ms,
            ..LinkTiming::default()
        }
    }

    #[test]
    fn decode_full_duplex_100() {
        let link = decode_link_partner(anlpar::CAN_100_FD | anlpar::SELECTOR_802_3);
        assert_eq!(link, LinkStatus::fast_full());
    }

    #[test]
    fn decode_half_duplex_10_only() {
        let link = decode_link_partner(anlpar::CAN_10_HD | anlpar::SELECTOR_802_3);
        assert_eq!(link, LinkStatus::slow_half());
    }

    #[test]
    fn decode_mixed_abilities() {
        let link = decode_link_partner(anlpar::CAN_100_HD | anlpar::CAN_10_FD);
        assert_eq!(link.speed, Speed::Mbps100);
        assert_eq!(link.duplex, Duplex::Full);

        let link = decode_link_partner(anlpar::CAN_100_HD);
        assert_eq!(link.speed, Speed::Mbps100);
        assert_eq!(link.duplex, Duplex::Half);

        let link = decode_link_partner(anlpar::CAN_10_FD);
        assert_eq!(link.speed, Speed::Mbps10);
        assert_eq!(link.duplex, Duplex::Full);
        assert!(link.negotiated);
    }

    #[test]
    fn stages_advance_in_order() {
        let mut bus = MockMdioBus::new()
            .with_absent_reads(0)
            .with_autoneg_after(0)
            .with_partner(anlpar::CAN_100_FD);
        let mut seq = LinkSequencer::new(0, timing(1));

        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::WaitSettle);
        assert_eq!(bus.resets(), 1);
        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::PhyPresentCheck);
        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::AutonegStart);
        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::AutonegWait);
        assert_eq!(
            bus.writes(),
            [(0, phy_reg::BMCR, bmcr::AN_RESTART | bmcr::AN_ENABLE)]
        );
        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::ResultRead);
        assert_eq!(
            seq.step(&mut bus).unwrap(),
            LinkState::Configured(LinkStatus::fast_full())
        );
        assert_eq!(seq.link(), Some(LinkStatus::fast_full()));
    }

    #[test]
    fn presence_check_retries_until_phy_answers() {
        let mut bus = MockMdioBus::new()
            .with_absent_reads(3)
            .with_autoneg_after(2)
            .with_partner(anlpar::CAN_10_HD);
        let mut seq = LinkSequencer::new(0, timing(500));

        let link = seq.run(&mut bus).unwrap();

        assert_eq!(link, LinkStatus::slow_half());
        assert_eq!(bus.id_reads(), 4);
        assert_eq!(bus.status_reads(), 3);
        // Settle, four presence polls and three status polls, all delayed
        assert_eq!(bus.delays(), [500; 8]);
    }

    #[test]
    fn configured_is_terminal() {
        let mut bus = MockMdioBus::new().with_partner(anlpar::CAN_100_FD);
        let mut seq = LinkSequencer::new(0, timing(0));
        seq.run(&mut bus).unwrap();
        let resets = bus.resets();
        let state = seq.step(&mut bus).unwrap();
        assert!(matches!(state, LinkState::Configured(_)));
        assert_eq!(bus.resets(), resets);
    }

    #[test]
    fn failed_presence_read_counts_as_absent() {
        let mut bus = MockMdioBus::new().with_failing_reads(2);
        let mut seq = LinkSequencer::new(0, timing(0));

        seq.step(&mut bus).unwrap();
        seq.step(&mut bus).unwrap();
        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::PhyPresentCheck);
        assert_eq!(seq.failed_polls(), 1);
        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::PhyPresentCheck);
        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::AutonegStart);
    }

    #[test]
    fn bounded_presence_check_reports_missing_phy() {
        let mut bus = MockMdioBus::new().with_absent_reads(u32::MAX);
        let mut seq = LinkSequencer::new(
            0,
            LinkTiming {
                link_delay_ms: 0,
                phy_detect_limit: PollLimit::Attempts(5),
                autoneg_limit: PollLimit::Unbounded,
            },
        );

        assert_eq!(seq.run(&mut bus), Err(Error::Io(IoError::PhyNotDetected)));
        assert_eq!(bus.id_reads(), 5);
    }

    #[test]
    fn bounded_autoneg_reports_timeout() {
        let mut bus = MockMdioBus::new().with_autoneg_after(u32::MAX);
        let mut seq = LinkSequencer::new(
            0,
            LinkTiming {
                link_delay_ms: 0,
                phy_detect_limit: PollLimit::Unbounded,
                autoneg_limit: PollLimit::Attempts(3),
            },
        );

        assert_eq!(seq.run(&mut bus), Err(Error::Io(IoError::AutonegTimeout)));
        assert_eq!(bus.status_reads(), 3);
    }

    #[test]
    fn autoneg_restart_write_timeout_is_retried() {
        let mut bus = MockMdioBus::new()
            .with_failing_writes(2)
            .with_partner(anlpar::CAN_100_FD);
        let mut seq = LinkSequencer::new(0, timing(0));
        seq.step(&mut bus).unwrap();
        seq.step(&mut bus).unwrap();
        seq.step(&mut bus).unwrap();

        assert_eq!(seq.step(&mut bus).unwrap(), LinkState::AutonegStart);
        assert_eq!(seq.failed_polls(), 1);
        assert_eq!(seq.run(&mut bus), Ok(LinkStatus::fast_full()));
        assert_eq!(
            bus.writes(),
            [(0, phy_reg::BMCR, bmcr::AN_RESTART | bmcr::AN_ENABLE)]
        );
    }

    #[test]
    fn partner_read_timeout_is_retried() {
        let mut bus = MockMdioBus::new().with_partner(anlpar::CAN_10_HD);
        let mut seq = LinkSequencer::new(0, timing(0));
        while seq.state() != LinkState::ResultRead {
            seq.step(&mut bus).unwrap();
        }
        bus.fail_next_reads(3);

        for attempt in 1..=3 {
            assert_eq!(seq.step(&mut bus).unwrap(), LinkState::ResultRead);
            assert_eq!(seq.failed_polls(), attempt);
        }
        assert_eq!(
            seq.step(&mut bus).unwrap(),
            LinkState::Configured(LinkStatus::slow_half())
        );
    }

    #[test]
    fn bounded_restart_write_reports_autoneg_timeout() {
        let mut bus = MockMdioBus::new().with_failing_writes(u32::MAX);
        let mut seq = LinkSequencer::new(
            0,
            LinkTiming {
                link_delay_ms: 0,
                phy_detect_limit: PollLimit::Unbounded,
                autoneg_limit: PollLimit::Attempts(4),
            },
        );

        assert_eq!(seq.run(&mut bus), Err(Error::Io(IoError::AutonegTimeout)));
        assert_eq!(seq.state(), LinkState::AutonegStart);
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn from_config_uses_phy_address_and_limits() {
        let config = FecConfig::new()
            .with_phy_address(7)
            .with_link_delay_ms(0)
            .with_phy_detect_limit(PollLimit::Attempts(1));
        let mut bus = MockMdioBus::new().with_phy_address(7);
        let mut seq = LinkSequencer::from_config(&config);
        let link = seq.run(&mut bus).unwrap();
        assert!(link.negotiated);
        assert!(bus.writes().iter().all(|&(phy, _, _)| phy == 7));
    }
}
