//! MII management interface
//!
//! Register-level access to the PHY through the FEC's management frame
//! register. Each transfer masks the MII completion interrupt, issues one
//! frame and polls the completion flag, so it can run before interrupts
//! are wired up and never races the interrupt dispatcher.

use embedded_hal::delay::DelayNs;

use crate::driver::config::MiiTiming;
use crate::driver::error::{ConfigError, IoError, Result};
use crate::internal::register::{FecReg, FecRegisters, eir, mmfr, pulse_reset};
use crate::internal::trace::fec_debug;

/// Maximum valid PHY address (5-bit field)
pub const MAX_PHY_ADDR: u8 = 31;

/// Maximum valid register address (5-bit field)
pub const MAX_REG_ADDR: u8 = 31;

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for PHY register access
///
/// Implemented by [`FecMdio`] on hardware and by mocks in tests, so the link
/// sequencer never touches FEC registers directly.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;
}

// =============================================================================
// FEC MII Controller
// =============================================================================

/// MII controller driving the FEC's `MMFR` register.
///
/// Borrows the register block for the duration of a bring-up; the delay is
/// owned so callers may pass either a delay value or `&mut` one.
pub struct FecMdio<'r, R: FecRegisters, D: DelayNs> {
    regs: &'r R,
    delay: D,
    timing: MiiTiming,
    mii_speed: u32,
}

impl<'r, R: FecRegisters, D: DelayNs> FecMdio<'r, R, D> {
    /// Create a controller with the given completion polling and `MSCR` value
    pub fn new(regs: &'r R, delay: D, timing: MiiTiming, mii_speed: u32) -> Self {
        Self {
            regs,
            delay,
            timing,
            mii_speed,
        }
    }

    /// Program the management clock divider
    pub fn program_clock(&self) {
        self.regs.write(FecReg::Mscr, self.mii_speed);
    }

    /// Pulse the MAC reset, which clears `MSCR`, then reprogram the clock
    pub fn reset_and_clock(&self) {
        pulse_reset(self.regs);
        self.program_clock();
    }

    /// Wait using the controller's delay
    pub fn wait_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Issue one management frame and wait for completion.
    ///
    /// Returns the `MMFR` contents after completion. The interrupt mask is
    /// restored whether or not the frame completed.
    fn transfer(&mut self, frame: u32) -> Result<u32> {
        self.regs.write(FecReg::Eir, eir::MII);
        let saved_mask = self.regs.read(FecReg::Eimr);
        self.regs.write(FecReg::Eimr, saved_mask & !eir::MII);

        self.regs.write(FecReg::Mmfr, frame);

        let mut completed = false;
        for _ in 0..self.timing.max_polls {
            if self.regs.read(FecReg::Eir) & eir::MII != 0 {
                completed = true;
                break;
            }
            self.delay.delay_ms(self.timing.poll_delay_ms);
        }

        let result = self.regs.read(FecReg::Mmfr);
        self.regs.write(FecReg::Eir, eir::MII);
        self.regs.write(FecReg::Eimr, saved_mask);

        if completed {
            Ok(result)
        } else {
            fec_debug!("MII frame {:#x} timed out", frame);
            Err(IoError::Timeout.into())
        }
    }
}

fn check_addresses(phy_addr: u8, reg_addr: u8) -> Result<()> {
    if phy_addr > MAX_PHY_ADDR {
        return Err(ConfigError::InvalidPhyAddress.into());
    }
    if reg_addr > MAX_REG_ADDR {
        return Err(ConfigError::InvalidConfig.into());
    }
    Ok(())
}

impl<R: FecRegisters, D: DelayNs> MdioBus for FecMdio<'_, R, D> {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        check_addresses(phy_addr, reg_addr)?;
        let frame =
            mmfr::ST_01 | mmfr::OP_READ | mmfr::pa(phy_addr) | mmfr::ra(reg_addr) | mmfr::TA_10;
        let value = self.transfer(frame)?;
        Ok((value & 0xFFFF) as u16)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        check_addresses(phy_addr, reg_addr)?;
        let frame = mmfr::ST_01
            | mmfr::OP_WRITE
            | mmfr::pa(phy_addr)
            | mmfr::ra(reg_addr)
            | mmfr::TA_10
            | mmfr::data(value);
        self.transfer(frame).map(|_| ())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
