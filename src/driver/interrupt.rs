//! Interrupt event handling for the FEC.
//!
//! [`InterruptEvents`] decodes the event register, and
//! [`Fec::handle_interrupt`] is the dispatcher bound to every FEC vector.

use super::fec::{ExecContext, Fec};
use crate::internal::register::{DESCRIPTOR_ACTIVE, FecReg, FecRegisters, eir};
use crate::sync::WakeSignal;

// =============================================================================
// Interrupt Events
// =============================================================================

/// Event flags parsed from `EIR`.
///
/// # Example
///
/// ```ignore
/// let events = InterruptEvents::from_raw(pending);
/// if events.rx_ready() {
///     // Wake the receive task
/// }
/// if events.is_fatal() {
///     // Reset the device
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptEvents {
    /// Heartbeat error
    pub heartbeat_error: bool,
    /// Babbling receive error
    pub babbling_rx: bool,
    /// Babbling transmit error
    pub babbling_tx: bool,
    /// Graceful stop complete
    pub graceful_stop: bool,
    /// Transmit frame complete
    pub tx_frame: bool,
    /// Transmit buffer complete
    pub tx_buffer: bool,
    /// Receive frame complete
    pub rx_frame: bool,
    /// Receive buffer complete
    pub rx_buffer: bool,
    /// MII management frame complete
    pub mii: bool,
    /// Ethernet bus error
    pub bus_error: bool,
    /// Late collision
    pub late_collision: bool,
    /// Collision retry limit
    pub retry_limit: bool,
    /// Transmit FIFO underrun
    pub underrun: bool,
}

impl InterruptEvents {
    /// Create from a raw `EIR` value
    #[inline]
    pub fn from_raw(events: u32) -> Self {
        Self {
            heartbeat_error: (events & eir::HBERR) != 0,
            babbling_rx: (events & eir::BABR) != 0,
            babbling_tx: (events & eir::BABT) != 0,
            graceful_stop: (events & eir::GRA) != 0,
            tx_frame: (events & eir::TXF) != 0,
            tx_buffer: (events & eir::TXB) != 0,
            rx_frame: (events & eir::RXF) != 0,
            rx_buffer: (events & eir::RXB) != 0,
            mii: (events & eir::MII) != 0,
            bus_error: (events & eir::EBERR) != 0,
            late_collision: (events & eir::LC) != 0,
            retry_limit: (events & eir::RL) != 0,
            underrun: (events & eir::UN) != 0,
        }
    }

    /// Convert back to an `EIR` value (write-1-to-clear)
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let flags = [
            (self.heartbeat_error, eir::HBERR),
            (self.babbling_rx, eir::BABR),
            (self.babbling_tx, eir::BABT),
            (self.graceful_stop, eir::GRA),
            (self.tx_frame, eir::TXF),
            (self.tx_buffer, eir::TXB),
            (self.rx_frame, eir::RXF),
            (self.rx_buffer, eir::RXB),
            (self.mii, eir::MII),
            (self.bus_error, eir::EBERR),
            (self.late_collision, eir::LC),
            (self.retry_limit, eir::RL),
            (self.underrun, eir::UN),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .fold(0, |acc, (_, bit)| acc | bit)
    }

    /// Check if any event occurred
    #[inline]
    pub fn any(&self) -> bool {
        self.to_raw() != 0
    }

    /// A received frame or buffer is waiting
    #[inline]
    pub fn rx_ready(&self) -> bool {
        self.to_raw() & eir::RX != 0
    }

    /// The transmit descriptor completed
    #[inline]
    pub fn tx_done(&self) -> bool {
        self.to_raw() & eir::TX != 0
    }

    /// Any condition that forces a device reset
    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.to_raw() & eir::FATAL != 0
    }
}

/// Result of one interrupt dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IsrOutcome {
    /// Events that were pending and enabled
    pub events: InterruptEvents,
    /// A woken task outranks the interrupted one; switch on exit
    pub switch_required: bool,
    /// A fatal event reset the device
    pub reset: bool,
}

// =============================================================================
// Dispatcher
// =============================================================================

impl<R: FecRegisters, const RX_BUFS: usize, const BUF_SIZE: usize> Fec<R, RX_BUFS, BUF_SIZE> {
    /// Dispatch pending device events. Call from interrupt context only.
    ///
    /// Clears the enabled pending events, then in order:
    /// 1. receive: gives `rx`
    /// 2. fatal error: resets the device and gives `tx`, since the reset
    ///    discarded any transmission in flight
    /// 3. transmit complete: returns the lent buffer to the receive ring,
    ///    rings the receive doorbell and gives `tx`
    pub fn handle_interrupt<S: WakeSignal, T: WakeSignal>(
        &mut self,
        rx: &S,
        tx: &T,
    ) -> IsrOutcome {
        let pending = self.regs.read(FecReg::Eir) & self.regs.read(FecReg::Eimr);
        self.regs.write(FecReg::Eir, pending);

        let events = InterruptEvents::from_raw(pending);
        let mut outcome = IsrOutcome {
            events,
            ..IsrOutcome::default()
        };

        if events.rx_ready() {
            outcome.switch_required |= rx.signal();
        }

        if events.is_fatal() {
            outcome.reset = self.reset_device(ExecContext::Isr);
            if outcome.reset {
                outcome.switch_required |= tx.signal();
            }
        }

        if events.tx_done() {
            self.dma.tx_complete();
            self.regs.write(FecReg::Rdar, DESCRIPTOR_ACTIVE);
            outcome.switch_required |= tx.signal();
        }

        outcome
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
