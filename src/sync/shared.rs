//! ISR-safe FEC wrapper using critical sections.

use super::primitives::CriticalSectionCell;
use super::signal::WakeSignal;
use crate::driver::error::Result;
use crate::driver::fec::{Fec, RxFrame, TxDisposition};
use crate::driver::interrupt::IsrOutcome;
use crate::internal::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_RX_BUFFERS};
use crate::internal::register::FecRegisters;

/// ISR-safe FEC wrapper.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the closure. Signal waits happen outside the critical
/// section so the interrupt handler can give them.
///
/// # Example
///
/// ```ignore
/// static FEC: SharedFecDefault<MmioRegisters> =
///     SharedFec::new(unsafe { MmioRegisters::reference() });
///
/// FEC.with(|fec| fec.bring_up(FecConfig::new(), delay))?;
///
/// fn fec_irq() {
///     let outcome = FEC.on_interrupt(&RX_SIGNAL, &TX_SIGNAL);
///     if outcome.switch_required {
///         // request a context switch
///     }
/// }
/// ```
pub struct SharedFec<R: FecRegisters, const RX_BUFS: usize, const BUF_SIZE: usize> {
    inner: CriticalSectionCell<Fec<R, RX_BUFS, BUF_SIZE>>,
}

impl<R: FecRegisters, const RX_BUFS: usize, const BUF_SIZE: usize>
    SharedFec<R, RX_BUFS, BUF_SIZE>
{
    /// Create a new shared FEC (const, suitable for static initialization).
    pub const fn new(regs: R) -> Self {
        Self {
            inner: CriticalSectionCell::new(Fec::new(regs)),
        }
    }

    /// Execute a closure with exclusive access to the FEC.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut Fec<R, RX_BUFS, BUF_SIZE>) -> T,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut Fec<R, RX_BUFS, BUF_SIZE>) -> T,
    {
        self.inner.try_with(f)
    }

    /// Interrupt entry: dispatch pending events.
    pub fn on_interrupt<S: WakeSignal, T: WakeSignal>(&self, rx: &S, tx: &T) -> IsrOutcome {
        self.inner.with(|fec| fec.handle_interrupt(rx, tx))
    }

    /// Wait for the transmit slot, then send a received buffer.
    ///
    /// Waits on `tx` for the configured transmit wait with interrupts
    /// enabled, then submits under the lock. See
    /// [`Fec::transmit_after_wait`] for the outcomes.
    pub fn send_frame<S: WakeSignal>(
        &self,
        frame: RxFrame,
        len: usize,
        tx: &S,
    ) -> Result<TxDisposition> {
        let timeout = self.inner.with(|fec| fec.config().tx_wait_ms);
        let granted = tx.wait(timeout);
        self.inner
            .with(|fec| fec.transmit_after_wait(frame, len, granted, tx))
    }

    /// Next received frame, waiting on `rx` for up to the link delay.
    pub fn wait_for_frame<S: WakeSignal>(&self, rx: &S) -> Option<RxFrame> {
        if let Some(frame) = self.inner.with(|fec| fec.poll_received_frame()) {
            return Some(frame);
        }
        let timeout = self.inner.with(|fec| fec.config().link_delay_ms);
        if !rx.wait(timeout) {
            return None;
        }
        self.inner.with(|fec| fec.poll_received_frame())
    }

    /// Return a frame's buffer to the receive ring
    pub fn release(&self, frame: RxFrame) {
        self.inner.with(|fec| fec.release_receive_slot(frame));
    }
}

/// Shared FEC with the default geometry
pub type SharedFecDefault<R> = SharedFec<R, DEFAULT_RX_BUFFERS, DEFAULT_BUFFER_SIZE>;

/// Shared FEC with two receive buffers
pub type SharedFecSmall<R> = SharedFec<R, 2, DEFAULT_BUFFER_SIZE>;

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::driver::config::{FecConfig, State};
    use crate::driver::error::{DmaError, Error};
    use crate::internal::register::{FecReg, MmioRegisters, eir};
    use crate::testing::{MockDelay, MockFec, MockPhy, MockSignal};
    use std::boxed::Box;

    type TestShared = SharedFec<MockFec, 4, 64>;

    fn running() -> Box<TestShared> {
        let shared = Box::new(SharedFec::new(MockFec::with_phy(MockPhy::new(0))));
        let config = FecConfig::new()
            .with_link_delay_ms(3)
            .with_tx_wait_ms(7)
            .with_max_frame_len(64);
        shared
            .with(|fec| fec.bring_up(config, MockDelay::new()))
            .unwrap();
        shared
    }

    fn receive(shared: &TestShared) -> RxFrame {
        shared.with(|fec| {
            fec.dma().rx_descriptor(fec.rx_cursor()).simulate_receive(60);
        });
        shared.wait_for_frame(&MockSignal::new()).unwrap()
    }

    #[test]
    fn static_construction() {
        // SAFETY: never accessed, only the wrapper state is read
        static FEC: SharedFecDefault<MmioRegisters> =
            SharedFec::new(unsafe { MmioRegisters::new(0x4000_1000) });

        assert_eq!(FEC.with(|fec| fec.state()), State::Uninitialized);
    }

    #[test]
    fn try_with_inside_with_returns_none() {
        let shared = running();
        let nested = shared.with(|_| shared.try_with(|fec| fec.state()));
        assert_eq!(nested, None);
        assert_eq!(shared.try_with(|fec| fec.state()), Some(State::Running));
    }

    #[test]
    fn wait_for_frame_returns_pending_frame_without_waiting() {
        let shared = running();
        shared.with(|fec| fec.dma().rx_descriptor(0).simulate_receive(42));
        let rx = MockSignal::new();

        let frame = shared.wait_for_frame(&rx).unwrap();

        assert_eq!(frame.length(), 42);
        assert!(rx.waits().is_empty());
    }

    #[test]
    fn wait_for_frame_times_out_with_link_delay() {
        let shared = running();
        let rx = MockSignal::new();
        assert_eq!(shared.wait_for_frame(&rx), None);
        assert_eq!(rx.waits(), [3]);
    }

    #[test]
    fn send_frame_waits_outside_lock_then_queues() {
        let shared = running();
        let frame = receive(&shared);
        let tx = MockSignal::given();

        assert_eq!(
            shared.send_frame(frame, 60, &tx),
            Ok(TxDisposition::Queued)
        );
        assert_eq!(tx.waits(), [7]);
        assert!(shared.with(|fec| fec.tx_busy()));
    }

    #[test]
    fn send_frame_drops_when_slot_never_frees() {
        let shared = running();
        let frame = receive(&shared);
        let tx = MockSignal::new();

        assert_eq!(
            shared.send_frame(frame, 60, &tx),
            Ok(TxDisposition::Dropped)
        );
        assert_eq!(shared.with(|fec| fec.rx_owned_count()), 4);
    }

    #[test]
    fn send_frame_busy_after_grant_resets() {
        let shared = running();
        let first = receive(&shared);
        shared.with(|fec| fec.submit_transmit(first, 60)).unwrap();
        let second = receive(&shared);
        let tx = MockSignal::given();

        assert_eq!(
            shared.send_frame(second, 60, &tx),
            Err(Error::Dma(DmaError::DescriptorBusy))
        );
        assert_eq!(shared.with(|fec| fec.epoch()), 1);
        assert!(tx.is_given());
    }

    #[test]
    fn echo_round_trip() {
        let shared = running();
        let rx = MockSignal::new();
        let tx = MockSignal::given();

        let frame = receive(&shared);
        shared.send_frame(frame, 60, &tx).unwrap();

        shared.with(|fec| fec.dma().tx_descriptor().simulate_transmit_done());
        shared.with(|fec| fec.registers().raise(eir::TXF));
        shared.on_interrupt(&rx, &tx);

        assert!(tx.is_given());
        assert_eq!(shared.with(|fec| fec.rx_owned_count()), 4);
        assert_eq!(shared.with(|fec| fec.registers().get(FecReg::Eir)), 0);
    }

    #[test]
    fn release_advances_cursor() {
        let shared = running();
        let frame = receive(&shared);
        shared.release(frame);
        assert_eq!(shared.with(|fec| fec.rx_cursor()), 1);
    }
}
