//! Memory-mapped register definitions for the FEC
//!
//! The register block is reached through the [`FecRegisters`] trait so the
//! driver can run against [`MmioRegisters`] on target and a simulated block
//! in host tests. All MMIO access is volatile.

/// FEC register block base on the reference part (IPSBAR + 0x1000)
pub const FEC_BASE: usize = 0x4000_1000;

// =============================================================================
// Register Map
// =============================================================================

/// FEC registers used by the driver, with their offsets from the block base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(usize)]
pub enum FecReg {
    /// Interrupt event register (write 1 to clear)
    Eir = 0x004,
    /// Interrupt mask register
    Eimr = 0x008,
    /// Receive descriptor active register (doorbell)
    Rdar = 0x010,
    /// Transmit descriptor active register (doorbell)
    Tdar = 0x014,
    /// Ethernet control register
    Ecr = 0x024,
    /// MII management frame register
    Mmfr = 0x040,
    /// MII speed control register
    Mscr = 0x044,
    /// Receive control register
    Rcr = 0x084,
    /// Transmit control register
    Tcr = 0x0C4,
    /// Physical address low (bytes 0..4)
    Palr = 0x0E4,
    /// Physical address high (bytes 4..6 in the upper half-word)
    Paur = 0x0E8,
    /// Individual address hash, upper 32 bits
    Iaur = 0x118,
    /// Individual address hash, lower 32 bits
    Ialr = 0x11C,
    /// Group address hash, upper 32 bits
    Gaur = 0x120,
    /// Group address hash, lower 32 bits
    Galr = 0x124,
    /// Receive descriptor ring start
    Erdsr = 0x180,
    /// Transmit descriptor ring start
    Etdsr = 0x184,
    /// Maximum receive buffer size
    Emrbr = 0x188,
}

impl FecReg {
    /// Byte offset from the register block base
    #[inline(always)]
    pub const fn offset(self) -> usize {
        self as usize
    }
}

// =============================================================================
// Bit Definitions
// =============================================================================

/// EIR / EIMR event bits
pub mod eir {
    /// Heartbeat error
    pub const HBERR: u32 = 0x8000_0000;
    /// Babbling receive error
    pub const BABR: u32 = 0x4000_0000;
    /// Babbling transmit error
    pub const BABT: u32 = 0x2000_0000;
    /// Graceful stop complete
    pub const GRA: u32 = 0x1000_0000;
    /// Transmit frame interrupt
    pub const TXF: u32 = 0x0800_0000;
    /// Transmit buffer interrupt
    pub const TXB: u32 = 0x0400_0000;
    /// Receive frame interrupt
    pub const RXF: u32 = 0x0200_0000;
    /// Receive buffer interrupt
    pub const RXB: u32 = 0x0100_0000;
    /// MII management frame complete
    pub const MII: u32 = 0x0080_0000;
    /// Ethernet bus error
    pub const EBERR: u32 = 0x0040_0000;
    /// Late collision
    pub const LC: u32 = 0x0020_0000;
    /// Collision retry limit
    pub const RL: u32 = 0x0010_0000;
    /// Transmit FIFO underrun
    pub const UN: u32 = 0x0008_0000;

    /// Every event bit the block can raise
    pub const ALL: u32 = HBERR | BABR | BABT | GRA | TXF | TXB | RXF | RXB | MII | EBERR | LC | RL | UN;
    /// Conditions that force a full device reset
    pub const FATAL: u32 = UN | RL | LC | EBERR | BABT | BABR | HBERR;
    /// Receive side events
    pub const RX: u32 = RXF | RXB;
    /// Transmit completion events
    pub const TX: u32 = TXF | TXB;
}

/// ECR bits
pub mod ecr {
    /// MAC reset, self-clearing
    pub const RESET: u32 = 0x0000_0001;
    /// MAC enable
    pub const ETHER_EN: u32 = 0x0000_0002;
}

/// RDAR / TDAR doorbell value
pub const DESCRIPTOR_ACTIVE: u32 = 0x0100_0000;

/// MMFR management frame fields
pub mod mmfr {
    /// Start of frame delimiter
    pub const ST_01: u32 = 0x4000_0000;
    /// Read operation
    pub const OP_READ: u32 = 0x2000_0000;
    /// Write operation
    pub const OP_WRITE: u32 = 0x1000_0000;
    /// Turnaround
    pub const TA_10: u32 = 0x0002_0000;
    /// Operation field mask
    pub const OP_MASK: u32 = 0x3000_0000;

    /// PHY address field
    #[inline(always)]
    pub const fn pa(addr: u8) -> u32 {
        ((addr as u32) & 0x1F) << 23
    }

    /// Register address field
    #[inline(always)]
    pub const fn ra(reg: u8) -> u32 {
        ((reg as u32) & 0x1F) << 18
    }

    /// Data field
    #[inline(always)]
    pub const fn data(value: u16) -> u32 {
        value as u32
    }

    /// Decode the PHY address field
    #[inline(always)]
    pub const fn pa_of(frame: u32) -> u8 {
        ((frame >> 23) & 0x1F) as u8
    }

    /// Decode the register address field
    #[inline(always)]
    pub const fn ra_of(frame: u32) -> u8 {
        ((frame >> 18) & 0x1F) as u8
    }
}

/// MSCR fields
pub mod mscr {
    /// MII_SPEED field
    #[inline(always)]
    pub const fn mii_speed(value: u32) -> u32 {
        (value & 0x3F) << 1
    }

    /// MII_SPEED for a system clock, keeping MDC at or below 2.5 MHz
    #[inline(always)]
    pub const fn for_cpu_clock(cpu_clock_hz: u32) -> u32 {
        mii_speed(((cpu_clock_hz / 1_000_000) / 5) + 1)
    }
}

/// RCR bits
pub mod rcr {
    /// Flow control enable
    pub const FCE: u32 = 0x0000_0020;
    /// Promiscuous mode
    pub const PROM: u32 = 0x0000_0008;
    /// MII mode
    pub const MII_MODE: u32 = 0x0000_0004;
    /// Disable receive on transmit (half duplex)
    pub const DRT: u32 = 0x0000_0002;

    /// Maximum frame length field
    #[inline(always)]
    pub const fn max_fl(len: usize) -> u32 {
        ((len as u32) & 0x7FF) << 16
    }
}

/// TCR bits
pub mod tcr {
    /// Full duplex enable
    pub const FDEN: u32 = 0x0000_0004;
}

// =============================================================================
// Register Access
// =============================================================================

/// Access to one FEC register block.
///
/// Methods take `&self` because MMIO is inherently shared; implementations
/// provide their own interior mutability.
pub trait FecRegisters {
    /// Read a register
    fn read(&self, reg: FecReg) -> u32;

    /// Write a register
    fn write(&self, reg: FecReg, value: u32);

    /// Read-modify-write a register
    #[inline(always)]
    fn modify<F>(&self, reg: FecReg, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Set bits in a register
    #[inline(always)]
    fn set_bits(&self, reg: FecReg, bits: u32) {
        self.modify(reg, |v| v | bits);
    }

    /// Clear bits in a register
    #[inline(always)]
    fn clear_bits(&self, reg: FecReg, bits: u32) {
        self.modify(reg, |v| v & !bits);
    }
}

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

/// Volatile access to a memory-mapped FEC register block.
#[derive(Debug)]
pub struct MmioRegisters {
    base: usize,
}

impl MmioRegisters {
    /// Register block at `base`.
    ///
    /// # Safety
    /// `base` must be the address of an FEC register block that nothing else
    /// accesses for the lifetime of the returned value.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Register block of the reference part.
    ///
    /// # Safety
    /// See [`MmioRegisters::new`].
    pub const unsafe fn reference() -> Self {
        Self { base: FEC_BASE }
    }

    /// Base address of the block
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl FecRegisters for MmioRegisters {
    #[inline(always)]
    fn read(&self, reg: FecReg) -> u32 {
        // SAFETY: construction guarantees a valid, exclusively owned block
        unsafe { read_reg(self.base + reg.offset()) }
    }

    #[inline(always)]
    fn write(&self, reg: FecReg, value: u32) {
        // SAFETY: construction guarantees a valid, exclusively owned block
        unsafe { write_reg(self.base + reg.offset(), value) }
    }
}

/// Pulse `ECR.RESET` and hold it for the minimum number of MAC clocks.
///
/// The reset bit self-clears; the MAC is left disabled.
pub fn pulse_reset<R: FecRegisters + ?Sized>(regs: &R) {
    regs.write(FecReg::Ecr, ecr::RESET);
    for _ in 0..crate::internal::constants::RESET_HOLD_SPINS {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_mask_excludes_data_path_events() {
        assert_eq!(eir::FATAL & eir::RX, 0);
        assert_eq!(eir::FATAL & eir::TX, 0);
        assert_eq!(eir::FATAL & eir::MII, 0);
        assert_eq!(eir::ALL, 0xFFF8_0000);
    }

    #[test]
    fn mmfr_fields_round_trip() {
        let frame = mmfr::ST_01 | mmfr::OP_READ | mmfr::pa(17) | mmfr::ra(5) | mmfr::TA_10;
        assert_eq!(mmfr::pa_of(frame), 17);
        assert_eq!(mmfr::ra_of(frame), 5);
        assert_eq!(frame & mmfr::OP_MASK, mmfr::OP_READ);
    }

    #[test]
    fn mmfr_addresses_are_masked() {
        assert_eq!(mmfr::pa(0x3F), mmfr::pa(0x1F));
        assert_eq!(mmfr::ra(0x20), 0);
    }

    #[test]
    fn mscr_divider_for_reference_clock() {
        // 25 MHz: (25 / 5) + 1 = 6, shifted into bits 6:1
        assert_eq!(mscr::for_cpu_clock(25_000_000), 6 << 1);
        // 60 MHz: (60 / 5) + 1 = 13
        assert_eq!(mscr::for_cpu_clock(60_000_000), 13 << 1);
    }

    #[test]
    fn rcr_max_fl_field() {
        assert_eq!(rcr::max_fl(1518), 1518 << 16);
        assert_eq!(rcr::max_fl(0x800), 0);
    }

    #[test]
    fn register_offsets_are_word_aligned() {
        let regs = [
            FecReg::Eir,
            FecReg::Eimr,
            FecReg::Rdar,
            FecReg::Tdar,
            FecReg::Ecr,
            FecReg::Mmfr,
            FecReg::Mscr,
            FecReg::Rcr,
            FecReg::Tcr,
            FecReg::Palr,
            FecReg::Paur,
            FecReg::Iaur,
            FecReg::Ialr,
            FecReg::Gaur,
            FecReg::Galr,
            FecReg::Erdsr,
            FecReg::Etdsr,
            FecReg::Emrbr,
        ];
        for reg in regs {
            assert_eq!(reg.offset() % 4, 0, "{reg:?}");
        }
    }
}
