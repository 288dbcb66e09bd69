//! Testing utilities and mock implementations
//!
//! Simulated register block, PHY, management bus, delay and wake signal for
//! exercising the driver on the host.
//!
//! Only available when running `cargo test`.

#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::driver::error::{IoError, Result};
use crate::hal::mii::MdioBus;
use crate::internal::phy_regs::standard::{anlpar, bmsr, phy_reg};
use crate::internal::register::{FecReg, FecRegisters, ecr, eir, mmfr};
use crate::phy::LinkBus;
use crate::sync::WakeSignal;

// =============================================================================
// Mock PHY
// =============================================================================

/// Clause 22 PHY answering at one address.
///
/// Reads to any other address float high. The identifier reads as all ones
/// for the first `absent_reads` reads, and autonegotiation completes on the
/// status read after `autoneg_after` incomplete ones.
#[derive(Debug, Clone)]
pub struct MockPhy {
    addr: u8,
    id: u16,
    absent_reads: u32,
    autoneg_after: u32,
    partner: u16,
    id_reads: u32,
    status_reads: u32,
    writes: Vec<(u8, u16)>,
}

impl MockPhy {
    pub fn new(addr: u8) -> Self {
        Self {
            addr,
            id: 0x0022,
            absent_reads: 0,
            autoneg_after: 0,
            partner: anlpar::CAN_100_FD
                | anlpar::CAN_100_HD
                | anlpar::CAN_10_FD
                | anlpar::CAN_10_HD
                | anlpar::SELECTOR_802_3,
            id_reads: 0,
            status_reads: 0,
            writes: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: u16) -> Self {
        self.id = id;
        self
    }

    pub fn with_absent_reads(mut self, reads: u32) -> Self {
        self.absent_reads = reads;
        self
    }

    pub fn with_autoneg_after(mut self, reads: u32) -> Self {
        self.autoneg_after = reads;
        self
    }

    pub fn with_partner(mut self, ability: u16) -> Self {
        self.partner = ability;
        self
    }

    pub fn read(&mut self, phy_addr: u8, reg_addr: u8) -> u16 {
        if phy_addr != self.addr {
            return 0xFFFF;
        }
        match reg_addr {
            phy_reg::PHYIDR1 => {
                self.id_reads = self.id_reads.saturating_add(1);
                if self.id_reads <= self.absent_reads {
                    0xFFFF
                } else {
                    self.id
                }
            }
            phy_reg::PHYIDR2 => 0xC0F1,
            phy_reg::BMSR => {
                self.status_reads = self.status_reads.saturating_add(1);
                if self.status_reads > self.autoneg_after {
                    bmsr::AN_COMPLETE | bmsr::LINK_STATUS
                } else {
                    0
                }
            }
            phy_reg::ANLPAR => self.partner,
            _ => 0,
        }
    }

    pub fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) {
        if phy_addr == self.addr {
            self.writes.push((reg_addr, value));
        }
    }

    pub fn id_reads(&self) -> u32 {
        self.id_reads
    }

    pub fn status_reads(&self) -> u32 {
        self.status_reads
    }

    pub fn writes(&self) -> Vec<(u8, u16)> {
        self.writes.clone()
    }
}

// =============================================================================
// Mock Register Block
// =============================================================================

/// Simulated FEC register block.
///
/// `EIR` is write-one-to-clear, `ECR.RESET` clears the registers the MAC
/// loses on reset, and management frames written to `MMFR` are answered by
/// the attached [`MockPhy`] and raise `EIR.MII`.
#[derive(Debug)]
pub struct MockFec {
    registers: RefCell<HashMap<FecReg, u32>>,
    write_log: RefCell<Vec<(FecReg, u32)>>,
    phy: RefCell<MockPhy>,
    mii_responds: Cell<bool>,
    mii_write_failures: Cell<u32>,
    reset_pulses: Cell<u32>,
    rdar_kicks: Cell<u32>,
    tdar_kicks: Cell<u32>,
}

impl MockFec {
    pub fn new() -> Self {
        Self::with_phy(MockPhy::new(0))
    }

    pub fn with_phy(phy: MockPhy) -> Self {
        Self {
            registers: RefCell::new(HashMap::new()),
            write_log: RefCell::new(Vec::new()),
            phy: RefCell::new(phy),
            mii_responds: Cell::new(true),
            mii_write_failures: Cell::new(0),
            reset_pulses: Cell::new(0),
            rdar_kicks: Cell::new(0),
            tdar_kicks: Cell::new(0),
        }
    }

    /// Store a value without logging a write
    pub fn set(&self, reg: FecReg, value: u32) {
        self.registers.borrow_mut().insert(reg, value);
    }

    pub fn get(&self, reg: FecReg) -> u32 {
        self.registers.borrow().get(&reg).copied().unwrap_or(0)
    }

    /// Latch hardware events into `EIR`
    pub fn raise(&self, bits: u32) {
        let current = self.get(FecReg::Eir);
        self.set(FecReg::Eir, current | bits);
    }

    pub fn writes_to(&self, reg: FecReg) -> Vec<u32> {
        self.write_log
            .borrow()
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|&(_, v)| v)
            .collect()
    }

    pub fn last_write(&self, reg: FecReg) -> Option<u32> {
        self.writes_to(reg).last().copied()
    }

    pub fn clear_log(&self) {
        self.write_log.borrow_mut().clear();
    }

    /// Writes that reached the PHY as `(register, value)`
    pub fn phy_writes(&self) -> Vec<(u8, u16)> {
        self.phy.borrow().writes()
    }

    pub fn phy_id_reads(&self) -> u32 {
        self.phy.borrow().id_reads()
    }

    pub fn phy_status_reads(&self) -> u32 {
        self.phy.borrow().status_reads()
    }

    /// When false, management frames never complete
    pub fn set_mii_responds(&self, responds: bool) {
        self.mii_responds.set(responds);
    }

    /// The next `count` management write frames never complete
    pub fn set_mii_write_failures(&self, count: u32) {
        self.mii_write_failures.set(count);
    }

    pub fn reset_pulses(&self) -> u32 {
        self.reset_pulses.get()
    }

    pub fn rdar_kicks(&self) -> u32 {
        self.rdar_kicks.get()
    }

    pub fn tdar_kicks(&self) -> u32 {
        self.tdar_kicks.get()
    }

    fn management_frame(&self, frame: u32) {
        let is_read = frame & mmfr::OP_MASK == mmfr::OP_READ;
        let dropped_write = !is_read && self.mii_write_failures.get() > 0;
        if dropped_write {
            self.mii_write_failures.set(self.mii_write_failures.get() - 1);
        }
        if !self.mii_responds.get() || dropped_write {
            self.set(FecReg::Mmfr, frame);
            return;
        }
        let phy_addr = mmfr::pa_of(frame);
        let reg_addr = mmfr::ra_of(frame);
        let mut phy = self.phy.borrow_mut();
        if is_read {
            let value = phy.read(phy_addr, reg_addr);
            self.set(FecReg::Mmfr, (frame & !0xFFFF) | u32::from(value));
        } else {
            phy.write(phy_addr, reg_addr, (frame & 0xFFFF) as u16);
            self.set(FecReg::Mmfr, frame);
        }
        drop(phy);
        self.raise(eir::MII);
    }
}

impl Default for MockFec {
    fn default() -> Self {
        Self::new()
    }
}

impl FecRegisters for MockFec {
    fn read(&self, reg: FecReg) -> u32 {
        self.get(reg)
    }

    fn write(&self, reg: FecReg, value: u32) {
        self.write_log.borrow_mut().push((reg, value));
        match reg {
            FecReg::Eir => {
                let current = self.get(FecReg::Eir);
                self.set(FecReg::Eir, current & !value);
            }
            FecReg::Ecr if value & ecr::RESET != 0 => {
                self.reset_pulses.set(self.reset_pulses.get() + 1);
                for lost in [
                    FecReg::Ecr,
                    FecReg::Eimr,
                    FecReg::Eir,
                    FecReg::Mscr,
                    FecReg::Rcr,
                    FecReg::Tcr,
                ] {
                    self.set(lost, 0);
                }
            }
            FecReg::Rdar => {
                self.rdar_kicks.set(self.rdar_kicks.get() + 1);
                self.set(reg, value);
            }
            FecReg::Tdar => {
                self.tdar_kicks.set(self.tdar_kicks.get() + 1);
                self.set(reg, value);
            }
            FecReg::Mmfr => self.management_frame(value),
            _ => self.set(reg, value),
        }
    }
}

// =============================================================================
// Mock Management Bus
// =============================================================================

/// Management bus for driving the link sequencer without a register block.
#[derive(Debug)]
pub struct MockMdioBus {
    phy: MockPhy,
    failing_reads: u32,
    failing_writes: u32,
    resets: u32,
    writes: Vec<(u8, u8, u16)>,
    delays: Vec<u32>,
}

impl MockMdioBus {
    pub fn new() -> Self {
        Self {
            phy: MockPhy::new(0),
            failing_reads: 0,
            failing_writes: 0,
            resets: 0,
            writes: Vec::new(),
            delays: Vec::new(),
        }
    }

    pub fn with_phy_address(mut self, addr: u8) -> Self {
        self.phy.addr = addr;
        self
    }

    pub fn with_absent_reads(mut self, reads: u32) -> Self {
        self.phy = self.phy.with_absent_reads(reads);
        self
    }

    pub fn with_autoneg_after(mut self, reads: u32) -> Self {
        self.phy = self.phy.with_autoneg_after(reads);
        self
    }

    pub fn with_partner(mut self, ability: u16) -> Self {
        self.phy = self.phy.with_partner(ability);
        self
    }

    /// The next `count` reads time out
    pub fn with_failing_reads(mut self, count: u32) -> Self {
        self.failing_reads = count;
        self
    }

    /// The next `count` writes time out
    pub fn with_failing_writes(mut self, count: u32) -> Self {
        self.failing_writes = count;
        self
    }

    /// Make the next `count` reads time out from here on
    pub fn fail_next_reads(&mut self, count: u32) {
        self.failing_reads = count;
    }

    pub fn resets(&self) -> u32 {
        self.resets
    }

    /// Writes as `(phy, register, value)`
    pub fn writes(&self) -> Vec<(u8, u8, u16)> {
        self.writes.clone()
    }

    pub fn id_reads(&self) -> u32 {
        self.phy.id_reads()
    }

    pub fn status_reads(&self) -> u32 {
        self.phy.status_reads()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.delays.clone()
    }
}

impl Default for MockMdioBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MdioBus for MockMdioBus {
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(IoError::Timeout.into());
        }
        Ok(self.phy.read(phy_addr, reg_addr))
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        if self.failing_writes > 0 {
            self.failing_writes -= 1;
            return Err(IoError::Timeout.into());
        }
        self.writes.push((phy_addr, reg_addr, value));
        self.phy.write(phy_addr, reg_addr, value);
        Ok(())
    }
}

impl LinkBus for MockMdioBus {
    fn reset_mac(&mut self) {
        self.resets += 1;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Delay that only accumulates the requested time.
///
/// Clones share the same total.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    total_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
    }
}

// =============================================================================
// Mock Signal
// =============================================================================

/// Binary wake signal that records every call.
///
/// `wait` takes the signal if given and never blocks.
#[derive(Debug, Default)]
pub struct MockSignal {
    given: Cell<bool>,
    woken: Cell<bool>,
    signals: Cell<u32>,
    waits: RefCell<Vec<u32>>,
}

impl MockSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn given() -> Self {
        let signal = Self::new();
        signal.given.set(true);
        signal
    }

    /// `signal` reports that a higher priority waiter was woken
    pub fn with_woken(self, woken: bool) -> Self {
        self.woken.set(woken);
        self
    }

    pub fn is_given(&self) -> bool {
        self.given.get()
    }

    pub fn signals(&self) -> u32 {
        self.signals.get()
    }

    pub fn waits(&self) -> Vec<u32> {
        self.waits.borrow().clone()
    }
}

impl WakeSignal for MockSignal {
    fn signal(&self) -> bool {
        self.signals.set(self.signals.get() + 1);
        self.given.set(true);
        self.woken.get()
    }

    fn wait(&self, timeout_ms: u32) -> bool {
        self.waits.borrow_mut().push(timeout_ms);
        self.given.replace(false)
    }
}
