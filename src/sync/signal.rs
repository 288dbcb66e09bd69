//! Binary wake-up signals between the interrupt handler and tasks.

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

/// Binary wake-up primitive supplied by the scheduler.
///
/// Given from interrupt context, taken by at most one waiting task. Giving
/// an already-given signal is a no-op, so wake-ups coalesce.
pub trait WakeSignal {
    /// Give the signal without blocking.
    ///
    /// Returns `true` if a task of higher priority than the current one was
    /// woken and a context switch should be requested on interrupt exit.
    fn signal(&self) -> bool;

    /// Take the signal, waiting at most `timeout_ms` for it to be given.
    ///
    /// Returns `false` on timeout.
    fn wait(&self, timeout_ms: u32) -> bool;
}

/// Polling [`WakeSignal`] for bare-metal use without a scheduler.
///
/// Waiting polls the flag once per millisecond using a clone of the stored
/// delay. `signal` never reports a woken task since there is nobody to
/// switch to.
///
/// # Example
///
/// ```ignore
/// static RX_SIGNAL: BinarySignal<SysDelay> = BinarySignal::new(SysDelay);
/// static TX_SIGNAL: BinarySignal<SysDelay> = BinarySignal::new_given(SysDelay);
/// ```
pub struct BinarySignal<D> {
    flag: Mutex<Cell<bool>>,
    delay: D,
}

impl<D: DelayNs + Clone> BinarySignal<D> {
    /// Create a signal that starts out taken
    pub const fn new(delay: D) -> Self {
        Self {
            flag: Mutex::new(Cell::new(false)),
            delay,
        }
    }

    /// Create a signal that starts out given, as a transmit slot signal must
    pub const fn new_given(delay: D) -> Self {
        Self {
            flag: Mutex::new(Cell::new(true)),
            delay,
        }
    }

    /// Take the signal if given, without waiting
    pub fn take(&self) -> bool {
        critical_section::with(|cs| self.flag.borrow(cs).replace(false))
    }

    /// Whether the signal is currently given
    pub fn is_signaled(&self) -> bool {
        critical_section::with(|cs| self.flag.borrow(cs).get())
    }
}

impl<D: DelayNs + Clone> WakeSignal for BinarySignal<D> {
    fn signal(&self) -> bool {
        critical_section::with(|cs| self.flag.borrow(cs).set(true));
        false
    }

    fn wait(&self, timeout_ms: u32) -> bool {
        if self.take() {
            return true;
        }
        let mut delay = self.delay.clone();
        for _ in 0..timeout_ms {
            delay.delay_ms(1);
            if self.take() {
                return true;
            }
        }
        false
    }
}
