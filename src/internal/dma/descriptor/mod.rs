//! FEC buffer descriptors.
//!
//! Each descriptor is 8 bytes: a 16-bit status word, a 16-bit length and a
//! 32-bit buffer address. Ownership moves between the CPU and the DMA engine
//! by toggling the top status bit.

pub mod bits;

use bits::{rx, tx};

/// Volatile cell wrapper for descriptor fields
///
/// Ensures all accesses are volatile to prevent compiler optimization
/// from reordering or caching descriptor field accesses.
#[repr(transparent)]
pub(crate) struct VolatileCell<T: Copy> {
    value: core::cell::UnsafeCell<T>,
}

// Safety: fields are only touched through volatile accesses of at most
// 32 bits, which the target performs as single bus cycles.
unsafe impl<T: Copy> Sync for VolatileCell<T> {}

impl<T: Copy> VolatileCell<T> {
    /// Create a new volatile cell with the given initial value
    #[inline(always)]
    pub const fn new(value: T) -> Self {
        Self {
            value: core::cell::UnsafeCell::new(value),
        }
    }

    /// Read the value (volatile read)
    #[inline(always)]
    pub fn get(&self) -> T {
        unsafe { core::ptr::read_volatile(self.value.get()) }
    }

    /// Write a value (volatile write)
    #[inline(always)]
    pub fn set(&self, value: T) {
        unsafe { core::ptr::write_volatile(self.value.get(), value) }
    }

    /// Update the value using a function (read-modify-write)
    #[inline(always)]
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(T) -> T,
    {
        let old = self.get();
        self.set(f(old));
    }
}

/// One FEC buffer descriptor, shared layout for both rings.
#[repr(C)]
pub struct BufferDescriptor {
    /// Status and control bits
    status: VolatileCell<u16>,
    /// Received frame length, or length to transmit
    length: VolatileCell<u16>,
    /// Buffer address as seen by the DMA engine
    data: VolatileCell<u32>,
}

impl BufferDescriptor {
    /// Size of the descriptor in bytes
    pub const SIZE: usize = 8;

    /// Create a new zeroed descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            status: VolatileCell::new(0),
            length: VolatileCell::new(0),
            data: VolatileCell::new(0),
        }
    }

    /// Raw status word
    #[inline(always)]
    pub fn status(&self) -> u16 {
        self.status.get()
    }

    /// Length field
    #[inline(always)]
    pub fn length(&self) -> u16 {
        self.length.get()
    }

    /// Buffer address field
    #[inline(always)]
    pub fn data_addr(&self) -> u32 {
        self.data.get()
    }

    /// Whether the DMA engine owns the descriptor (`E` on receive, `R` on transmit)
    #[inline(always)]
    #[must_use]
    pub fn is_owned(&self) -> bool {
        (self.status.get() & rx::E) != 0
    }

    /// Whether the wrap marker is set
    #[inline(always)]
    #[must_use]
    pub fn is_wrap(&self) -> bool {
        (self.status.get() & rx::W) != 0
    }

    /// Whether the descriptor closes a frame
    #[inline(always)]
    #[must_use]
    pub fn is_last(&self) -> bool {
        (self.status.get() & rx::L) != 0
    }

    // -------------------------------------------------------------------------
    // Receive side
    // -------------------------------------------------------------------------

    /// Bind to a receive buffer and hand to the DMA engine.
    pub fn setup_rx(&self, buffer: *const u8, size: usize, wrap: bool) {
        self.data.set(buffer as u32);
        self.length.set(size as u16);
        let mut status = rx::E;
        if wrap {
            status |= rx::W;
        }
        self.status.set(status);
    }

    /// Return a consumed receive descriptor to the DMA engine.
    #[inline(always)]
    pub fn give_to_dma(&self) {
        self.status.update(|v| v | rx::E);
    }

    /// Receive error bits, if the descriptor closes a frame
    #[inline(always)]
    pub fn rx_errors(&self) -> u16 {
        let status = self.status.get();
        if status & rx::L != 0 {
            status & rx::ERRORS
        } else {
            0
        }
    }

    // -------------------------------------------------------------------------
    // Transmit side
    // -------------------------------------------------------------------------

    /// Reset to an idle transmit descriptor owned by the CPU.
    pub fn setup_tx(&self, wrap: bool) {
        self.data.set(0);
        self.length.set(0);
        let mut status = tx::TC;
        if wrap {
            status |= tx::W;
        }
        self.status.set(status);
    }

    /// Bind a buffer and hand a single-buffer frame to the DMA engine.
    ///
    /// Length and address are written before the ownership bit.
    pub fn submit_tx(&self, buffer: u32, len: usize) {
        self.length.set(len as u16);
        self.data.set(buffer);
        self.status.update(|v| v | tx::R | tx::L);
    }

    /// Act as the DMA engine storing a frame of `len` bytes.
    #[cfg(test)]
    pub(crate) fn simulate_receive(&self, len: u16) {
        self.length.set(len);
        self.status.update(|v| (v & !rx::E) | rx::L);
    }

    /// Act as the DMA engine filling one buffer of a longer frame.
    #[cfg(test)]
    pub(crate) fn simulate_fragment(&self, len: u16) {
        self.length.set(len);
        self.status.update(|v| v & !(rx::E | rx::L));
    }

    /// Act as the DMA engine flagging receive errors.
    #[cfg(test)]
    pub(crate) fn simulate_error(&self, bits: u16) {
        self.status.update(|v| v | bits);
    }

    /// Act as the DMA engine finishing a transmission.
    #[cfg(test)]
    pub(crate) fn simulate_transmit_done(&self) {
        self.status.update(|v| v & !tx::R);
    }
}

impl Default for BufferDescriptor {
    fn default() -> Self {
        Self::new()
    }
}
