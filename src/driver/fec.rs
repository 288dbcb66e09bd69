//! FEC device context
//!
//! [`Fec`] owns the register block, both descriptor rings and the buffer
//! pool for one controller. It implements bring-up, the zero-copy receive
//! and transmit path, and whole-device recovery. Interrupt dispatch lives in
//! [`interrupt`](super::interrupt), address filtering in
//! [`filtering`](super::filtering).

use embedded_hal::delay::DelayNs;

use super::config::{FecConfig, State};
use super::error::{ConfigError, DmaError, Result};
use super::filtering::{HashTables, compute_hash, write_station_address};
use crate::hal::mii::FecMdio;
use crate::internal::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_RX_BUFFERS};
use crate::internal::dma::DmaEngine;
use crate::internal::register::{
    DESCRIPTOR_ACTIVE, FecReg, FecRegisters, ecr, eir, pulse_reset, rcr, tcr,
};
use crate::internal::trace::{fec_debug, fec_info, fec_warn};
use crate::phy::{LinkSequencer, LinkStatus};
use crate::sync::WakeSignal;

// =============================================================================
// Frame Tokens
// =============================================================================

/// A received frame waiting in its receive buffer.
///
/// Returned by [`Fec::poll_received_frame`]. Handing it to
/// [`Fec::release_receive_slot`] or [`Fec::submit_transmit`] consumes it, so
/// each frame is released or transmitted at most once. Tokens issued before a
/// device reset are stale.
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxFrame {
    slot: usize,
    len: usize,
    errors: u16,
    epoch: u32,
    seq: u32,
}

impl RxFrame {
    /// Receive slot holding the frame
    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Received length in bytes
    #[inline]
    pub const fn length(&self) -> usize {
        self.len
    }

    /// Receive error bits reported by the DMA engine, zero for a clean frame
    #[inline]
    pub const fn errors(&self) -> u16 {
        self.errors
    }

    /// Reset epoch the token was issued in
    #[inline]
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }
}

/// Execution context of a reset request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecContext {
    /// Task level; the reset runs inside a critical section
    Task,
    /// Interrupt handler; already exclusive
    Isr,
}

/// What happened to a frame handed to the gated transmit path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxDisposition {
    /// Handed to the transmit descriptor
    Queued,
    /// Transmit slot wait timed out; the buffer went back to the receive ring
    Dropped,
}

// =============================================================================
// Device Context
// =============================================================================

/// One Fast Ethernet Controller.
///
/// # Type Parameters
/// * `R` - Register block access
/// * `RX_BUFS` - Receive ring depth, also the size of the buffer pool
/// * `BUF_SIZE` - Size of each buffer in bytes, a multiple of 16
///
/// # Memory Layout
/// The descriptor rings and buffers are embedded in the struct. Place it in
/// DMA-reachable memory and do not move it after bring-up.
pub struct Fec<R: FecRegisters, const RX_BUFS: usize, const BUF_SIZE: usize> {
    /// Register block
    pub(super) regs: R,
    /// Rings and buffer pool
    pub(super) dma: DmaEngine<RX_BUFS, BUF_SIZE>,
    /// Active configuration
    pub(super) config: FecConfig,
    /// Address hash tables as last programmed
    pub(super) hash: HashTables,
    /// Negotiated link, kept across resets
    link: Option<LinkStatus>,
    /// Current state
    state: State,
    /// Bumped by every device reset
    epoch: u32,
    /// Bumped every time the cursor slot is released or lent
    consumed: u32,
    /// Set while a reset is running
    reset_in_progress: bool,
}

impl<R: FecRegisters, const RX_BUFS: usize, const BUF_SIZE: usize> Fec<R, RX_BUFS, BUF_SIZE> {
    /// Create a device context around a register block.
    ///
    /// Const, suitable for static initialization. The device stays
    /// `Uninitialized` until [`bring_up`](Self::bring_up).
    pub const fn new(regs: R) -> Self {
        Self {
            regs,
            dma: DmaEngine::new(),
            config: FecConfig::new(),
            hash: HashTables::new(),
            link: None,
            state: State::Uninitialized,
            epoch: 0,
            consumed: 0,
            reset_in_progress: false,
        }
    }

    // =========================================================================
    // Bring-up
    // =========================================================================

    /// Bring the device from reset to running.
    ///
    /// Lays out the rings, negotiates the link, programs the MAC and
    /// address filter, unmasks every interrupt source and arms receive DMA.
    /// With the default unbounded poll limits this only returns once a PHY
    /// has answered and autonegotiation has completed.
    ///
    /// # Errors
    /// * `ConfigError::AlreadyInitialized` - already running
    /// * `ConfigError::*` - `config` failed validation
    /// * `ConfigError::InvalidConfig` - `max_frame_len` exceeds `BUF_SIZE`
    /// * `IoError::PhyNotDetected` / `IoError::AutonegTimeout` - a bounded
    ///   poll limit ran out
    pub fn bring_up<D: DelayNs>(&mut self, config: FecConfig, delay: D) -> Result<LinkStatus> {
        if self.state != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        config.validate()?;
        if config.max_frame_len > BUF_SIZE {
            return Err(ConfigError::InvalidConfig.into());
        }
        self.dma.init()?;
        self.config = config;

        fec_info!("FEC bring-up, PHY address {}", self.config.phy_address);

        let link = {
            let mut mdio = FecMdio::new(
                &self.regs,
                delay,
                self.config.mii,
                self.config.mii_speed(),
            );
            LinkSequencer::from_config(&self.config).run(&mut mdio)?
        };
        self.link = Some(link);

        self.hash.individual = 1u64 << compute_hash(&self.config.mac_address);
        self.program_mac();

        self.regs.write(FecReg::Eir, eir::ALL);
        self.regs.write(FecReg::Eimr, eir::ALL);
        self.regs.write(FecReg::Ecr, ecr::ETHER_EN);
        self.regs.write(FecReg::Rdar, DESCRIPTOR_ACTIVE);

        self.state = State::Running;
        fec_info!("FEC running, {} receive buffers", RX_BUFS);
        Ok(link)
    }

    /// Program every MAC register the controller loses on `ECR.RESET`.
    fn program_mac(&self) {
        let full_duplex = self.link.is_none_or(|link| link.is_full_duplex());

        self.regs.write(FecReg::Mscr, self.config.mii_speed());
        self.regs
            .write(FecReg::Tcr, if full_duplex { tcr::FDEN } else { 0 });

        let mut rcr = rcr::max_fl(self.config.max_frame_len) | rcr::FCE | rcr::MII_MODE;
        if !full_duplex {
            rcr |= rcr::DRT;
        }
        if self.config.promiscuous {
            rcr |= rcr::PROM;
        }
        self.regs.write(FecReg::Rcr, rcr);

        write_station_address(&self.regs, &self.config.mac_address);
        self.hash.write_to(&self.regs);

        self.regs.write(FecReg::Emrbr, BUF_SIZE as u32);
        self.regs.write(FecReg::Erdsr, self.dma.rx_ring_addr());
        self.regs.write(FecReg::Etdsr, self.dma.tx_ring_addr());
    }

    // =========================================================================
    // Receive
    // =========================================================================

    /// Frame waiting under the receive cursor, if any. Never blocks or copies.
    ///
    /// A frame with non-zero [`errors`](RxFrame::errors) is a damaged,
    /// partial or overlong reception; release it. Its length never exceeds
    /// the buffer.
    pub fn poll_received_frame(&self) -> Option<RxFrame> {
        let peeked = self.dma.rx_peek()?;
        Some(RxFrame {
            slot: peeked.slot,
            len: peeked.len,
            errors: peeked.errors,
            epoch: self.epoch,
            seq: self.consumed,
        })
    }

    /// Received bytes of a frame
    pub fn frame(&self, frame: &RxFrame) -> &[u8] {
        &self.dma.buffer(frame.slot)[..frame.len]
    }

    /// Whole buffer of a frame, for building a reply in place
    pub fn frame_mut(&mut self, frame: &RxFrame) -> &mut [u8] {
        self.dma.buffer_mut(frame.slot)
    }

    /// Give a frame's buffer back to the DMA engine.
    ///
    /// Advances the cursor and rings the receive doorbell. A stale token is
    /// ignored; the reset that made it stale already returned the slot.
    #[allow(clippy::needless_pass_by_value)]
    pub fn release_receive_slot(&mut self, frame: RxFrame) {
        if !self.is_current(&frame) {
            fec_debug!("ignoring stale release of slot {}", frame.slot);
            return;
        }
        self.release_cursor();
    }

    fn release_cursor(&mut self) {
        self.dma.rx_release();
        self.consumed = self.consumed.wrapping_add(1);
        self.regs.write(FecReg::Rdar, DESCRIPTOR_ACTIVE);
    }

    fn is_current(&self, frame: &RxFrame) -> bool {
        frame.epoch == self.epoch
            && frame.seq == self.consumed
            && frame.slot == self.dma.rx_cursor()
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Send `len` bytes of a frame's buffer without copying.
    ///
    /// The buffer stays lent to the transmit descriptor until the transmit
    /// complete interrupt hands it back to the receive ring.
    ///
    /// # Errors
    /// * `DmaError::StaleFrame` - token predates a reset or was already used
    /// * `DmaError::DescriptorBusy` - a transmission is still in flight
    /// * `DmaError::InvalidLength` - `len` is zero or exceeds `BUF_SIZE`
    ///
    /// On `DescriptorBusy` and `InvalidLength` the buffer is returned to the
    /// receive ring.
    #[allow(clippy::needless_pass_by_value)]
    pub fn submit_transmit(&mut self, frame: RxFrame, len: usize) -> Result<()> {
        if !self.is_current(&frame) {
            return Err(DmaError::StaleFrame.into());
        }
        match self.dma.tx_submit(len) {
            Ok(()) => {
                self.consumed = self.consumed.wrapping_add(1);
                self.regs.write(FecReg::Tdar, DESCRIPTOR_ACTIVE);
                Ok(())
            }
            Err(e) => {
                self.release_cursor();
                Err(e.into())
            }
        }
    }

    /// Finish a gated send once the transmit slot wait has returned.
    ///
    /// `granted` is the result of waiting on `tx`. Without the grant the
    /// buffer is dropped back to the receive ring. A busy descriptor after a
    /// grant is unexpected: the device is reset from task context and `tx`
    /// is given again, since no transmit complete will arrive.
    pub fn transmit_after_wait<S: WakeSignal>(
        &mut self,
        frame: RxFrame,
        len: usize,
        granted: bool,
        tx: &S,
    ) -> Result<TxDisposition> {
        if !granted {
            fec_debug!("transmit slot wait timed out, dropping frame");
            self.release_receive_slot(frame);
            return Ok(TxDisposition::Dropped);
        }
        if self.dma.tx_busy() {
            fec_warn!("transmit descriptor busy after grant");
            self.reset_device(ExecContext::Task);
            tx.signal();
            return Err(DmaError::DescriptorBusy.into());
        }
        self.submit_transmit(frame, len)?;
        Ok(TxDisposition::Queued)
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// Reinitialize rings and MAC and resume receiving.
    ///
    /// Link parameters are kept; autonegotiation is not repeated. Frame
    /// tokens issued before the reset become stale. Returns `false` when
    /// nothing was done: the device is not running or a reset is already in
    /// progress.
    pub fn reset_device(&mut self, ctx: ExecContext) -> bool {
        match ctx {
            ExecContext::Task => critical_section::with(|_| self.reset_exclusive()),
            ExecContext::Isr => self.reset_exclusive(),
        }
    }

    fn reset_exclusive(&mut self) -> bool {
        if self.state != State::Running || self.reset_in_progress {
            return false;
        }
        self.reset_in_progress = true;

        let mask = self.regs.read(FecReg::Eimr);
        self.regs.write(FecReg::Eimr, 0);

        self.dma.layout();
        pulse_reset(&self.regs);
        self.program_mac();

        self.regs.write(FecReg::Eir, eir::ALL);
        self.regs.write(FecReg::Eimr, mask);
        self.regs.write(FecReg::Ecr, ecr::ETHER_EN);
        self.regs.write(FecReg::Rdar, DESCRIPTOR_ACTIVE);

        self.epoch = self.epoch.wrapping_add(1);
        self.reset_in_progress = false;
        fec_warn!("FEC reset, epoch {}", self.epoch);
        true
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Current state
    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// Negotiated link, once brought up
    #[inline]
    pub fn link(&self) -> Option<LinkStatus> {
        self.link
    }

    /// Active configuration
    #[inline]
    pub fn config(&self) -> &FecConfig {
        &self.config
    }

    /// Station MAC address
    #[inline]
    pub fn mac_address(&self) -> [u8; 6] {
        self.config.mac_address
    }

    /// Number of device resets so far
    #[inline]
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Register block
    #[inline]
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Index of the next candidate receive slot
    #[inline]
    pub fn rx_cursor(&self) -> usize {
        self.dma.rx_cursor()
    }

    /// Receive slot lent to the transmit descriptor, if any
    #[inline]
    pub fn donated_slot(&self) -> Option<usize> {
        self.dma.donated_slot()
    }

    /// Whether a transmission is in flight
    #[inline]
    pub fn tx_busy(&self) -> bool {
        self.dma.tx_busy()
    }

    /// Receive descriptors currently owned by the DMA engine
    pub fn rx_owned_count(&self) -> usize {
        self.dma.rx_owned_count()
    }

    /// Memory taken by rings and buffers
    pub const fn memory_usage() -> usize {
        DmaEngine::<RX_BUFS, BUF_SIZE>::memory_usage()
    }

    #[cfg(test)]
    pub(crate) fn dma(&self) -> &DmaEngine<RX_BUFS, BUF_SIZE> {
        &self.dma
    }

    #[cfg(test)]
    pub(crate) fn set_reset_in_progress(&mut self, value: bool) {
        self.reset_in_progress = value;
    }
}

/// Default geometry: 4 receive buffers of 1520 bytes
pub type FecDefault<R> = Fec<R, DEFAULT_RX_BUFFERS, DEFAULT_BUFFER_SIZE>;

/// Two receive buffers, for tight RAM budgets
pub type FecSmall<R> = Fec<R, 2, DEFAULT_BUFFER_SIZE>;

// =============================================================================
// Unit Tests
// =============================================================================
