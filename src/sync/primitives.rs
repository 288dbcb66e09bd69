//! Synchronization primitives for ISR-safe access.

use core::cell::RefCell;
use critical_section::Mutex;

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for mutable access from
/// both task code and interrupt handlers. `Sync` whenever `T: Send`.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure. Panics if the
    /// cell is already borrowed further up the stack; use
    /// [`try_with`](Self::try_with) where that can happen.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_mutates_and_returns() {
        let cell = CriticalSectionCell::new(20u32);
        let doubled = cell.with(|v| {
            *v += 1;
            *v * 2
        });
        assert_eq!(doubled, 42);
        assert_eq!(cell.with(|v| *v), 21);
    }

    #[test]
    fn try_with_reports_nested_borrow() {
        let cell = CriticalSectionCell::new(0u32);
        let nested = cell.with(|_| cell.try_with(|v| *v));
        assert_eq!(nested, None);
        assert_eq!(cell.try_with(|v| *v), Some(0));
    }

    #[test]
    fn usable_as_static() {
        static CELL: CriticalSectionCell<u32> = CriticalSectionCell::new(0);
        CELL.with(|v| *v = 100);
        assert_eq!(CELL.with(|v| *v), 100);
    }
}
