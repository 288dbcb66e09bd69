//! DMA engine owning the buffer pool and both descriptor rings.

use super::descriptor::BufferDescriptor;
use super::descriptor::bits::rx;
use super::ring::DescriptorRing;
use crate::driver::error::{DmaError, DmaResult};
use crate::internal::constants::{DMA_ALIGNMENT, TX_RING_DEPTH};

/// A completed receive descriptor under the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxSlot {
    /// Ring index
    pub slot: usize,
    /// Bytes of the slot's buffer holding the frame, at most `BUF_SIZE`
    pub len: usize,
    /// Receive error bits, zero for a clean single-buffer frame
    pub errors: u16,
}

/// One receive buffer, aligned for the DMA engine.
#[repr(C, align(16))]
pub struct DmaBuffer<const N: usize>([u8; N]);

impl<const N: usize> DmaBuffer<N> {
    const fn new() -> Self {
        Self([0u8; N])
    }
}

/// Buffer pool plus receive and transmit rings.
///
/// Every receive buffer is owned by exactly one of: the DMA engine (its
/// descriptor is empty), the software consumer (descriptor under the cursor
/// and not empty), or the transmit descriptor (recorded in `donated`).
///
/// # Type Parameters
/// * `RX_BUFS` - Receive ring depth
/// * `BUF_SIZE` - Size of each buffer in bytes, a multiple of 16
pub struct DmaEngine<const RX_BUFS: usize, const BUF_SIZE: usize> {
    /// Receive descriptor ring, cursor is the next candidate slot
    rx_ring: DescriptorRing<RX_BUFS>,
    /// Transmit ring, a single descriptor
    tx_ring: DescriptorRing<TX_RING_DEPTH>,
    /// Receive buffers, also used as transmit buffers
    rx_buffers: [DmaBuffer<BUF_SIZE>; RX_BUFS],
    /// Receive slot currently lent to the transmit descriptor
    donated: Option<usize>,
}

impl<const RX_BUFS: usize, const BUF_SIZE: usize> DmaEngine<RX_BUFS, BUF_SIZE> {
    const GEOMETRY_OK: () = {
        assert!(RX_BUFS > 0, "receive ring needs at least one descriptor");
        assert!(BUF_SIZE > 0, "buffer size must be non-zero");
        assert!(
            BUF_SIZE % DMA_ALIGNMENT == 0,
            "buffer size must be a multiple of 16"
        );
        assert!(BUF_SIZE <= u16::MAX as usize, "buffer size must fit a descriptor length");
    };

    /// Create an engine with zeroed buffers. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::GEOMETRY_OK;
        Self {
            rx_ring: DescriptorRing::new(),
            tx_ring: DescriptorRing::new(),
            rx_buffers: [const { DmaBuffer::new() }; RX_BUFS],
            donated: None,
        }
    }

    /// Total memory usage in bytes.
    #[must_use]
    pub const fn memory_usage() -> usize {
        (RX_BUFS + TX_RING_DEPTH) * BufferDescriptor::SIZE + RX_BUFS * BUF_SIZE
    }

    /// Check alignment, then lay out both rings.
    pub fn init(&mut self) -> DmaResult<()> {
        self.check_alignment()?;
        self.layout();
        Ok(())
    }

    /// Verify that both rings and the buffer pool start on a DMA boundary.
    pub fn check_alignment(&self) -> DmaResult<()> {
        let rx_base = self.rx_ring.base_ptr() as usize;
        let tx_base = self.tx_ring.base_ptr() as usize;
        let buf_base = self.rx_buffers.as_ptr() as usize;
        if rx_base % DMA_ALIGNMENT != 0
            || tx_base % DMA_ALIGNMENT != 0
            || buf_base % DMA_ALIGNMENT != 0
        {
            return Err(DmaError::Misaligned);
        }
        Ok(())
    }

    /// Lay out both rings.
    ///
    /// Transmit descriptors become CPU-owned and empty, every receive
    /// descriptor is bound to its own buffer and handed to the DMA engine,
    /// the last descriptor of each ring carries the wrap marker and the
    /// receive cursor returns to 0. Calling it again yields the same state.
    pub fn layout(&mut self) {
        let tx_last = self.tx_ring.wrap_index();
        for (i, desc) in self.tx_ring.iter().enumerate() {
            desc.setup_tx(i == tx_last);
        }

        let rx_last = self.rx_ring.wrap_index();
        for (i, desc) in self.rx_ring.iter().enumerate() {
            desc.setup_rx(self.rx_buffers[i].0.as_ptr(), BUF_SIZE, i == rx_last);
        }

        self.rx_ring.reset();
        self.tx_ring.reset();
        self.donated = None;
    }

    /// Receive ring start address for `ERDSR`
    #[inline(always)]
    pub fn rx_ring_addr(&self) -> u32 {
        self.rx_ring.base_addr_u32()
    }

    /// Transmit ring start address for `ETDSR`
    #[inline(always)]
    pub fn tx_ring_addr(&self) -> u32 {
        self.tx_ring.base_addr_u32()
    }

    /// Index of the next candidate receive slot
    #[inline(always)]
    pub fn rx_cursor(&self) -> usize {
        self.rx_ring.current_index()
    }

    /// Receive slot currently lent to the transmit path
    #[inline(always)]
    pub fn donated_slot(&self) -> Option<usize> {
        self.donated
    }

    // -------------------------------------------------------------------------
    // Receive
    // -------------------------------------------------------------------------

    /// Completed descriptor under the cursor, if any.
    ///
    /// Nothing is reported while the DMA engine owns the descriptor, the
    /// length is zero, or the slot is still lent to the transmitter.
    ///
    /// A descriptor without `L` holds only part of a frame and is flagged
    /// `TR`. A length beyond the buffer is clamped to `BUF_SIZE` and flagged
    /// `LG`. Either way the slot must be released, not used.
    pub fn rx_peek(&self) -> Option<RxSlot> {
        let desc = self.rx_ring.current();
        if desc.is_owned() || self.donated == Some(self.rx_ring.current_index()) {
            return None;
        }
        let len = desc.length() as usize;
        if len == 0 {
            return None;
        }

        let mut errors = desc.rx_errors();
        if !desc.is_last() {
            errors |= rx::TR;
        }
        if len > BUF_SIZE {
            errors |= rx::LG;
        }
        Some(RxSlot {
            slot: self.rx_ring.current_index(),
            len: len.min(BUF_SIZE),
            errors,
        })
    }

    /// Hand the cursor slot back to the DMA engine and advance the cursor.
    pub fn rx_release(&mut self) {
        self.rx_ring.current().give_to_dma();
        self.rx_ring.advance();
    }

    /// Buffer of a receive slot
    #[inline(always)]
    pub fn buffer(&self, slot: usize) -> &[u8] {
        &self.rx_buffers[slot % RX_BUFS].0
    }

    /// Mutable buffer of a receive slot
    #[inline(always)]
    pub fn buffer_mut(&mut self, slot: usize) -> &mut [u8] {
        &mut self.rx_buffers[slot % RX_BUFS].0
    }

    // -------------------------------------------------------------------------
    // Transmit
    // -------------------------------------------------------------------------

    /// Whether the transmit descriptor is still owned by the DMA engine
    #[inline(always)]
    pub fn tx_busy(&self) -> bool {
        self.tx_ring.current().is_owned()
    }

    /// Lend the cursor slot to the transmit descriptor.
    ///
    /// The slot's buffer is sent as-is for `len` bytes. The cursor moves past
    /// the slot, which stays out of the receive ring until
    /// [`tx_complete`](Self::tx_complete).
    pub fn tx_submit(&mut self, len: usize) -> DmaResult<()> {
        if self.tx_busy() {
            return Err(DmaError::DescriptorBusy);
        }
        if len == 0 || len > BUF_SIZE {
            return Err(DmaError::InvalidLength);
        }

        let slot = self.rx_ring.current_index();
        let addr = self.rx_ring.current().data_addr();
        self.tx_ring.current().submit_tx(addr, len);
        self.donated = Some(slot);
        self.rx_ring.advance();
        Ok(())
    }

    /// Return the lent slot to the DMA engine after a transmission.
    ///
    /// Returns the slot that was handed back, if one was lent.
    pub fn tx_complete(&mut self) -> Option<usize> {
        let slot = self.donated.take()?;
        self.rx_ring.get(slot).give_to_dma();
        Some(slot)
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Receive descriptor at `index`
    #[inline(always)]
    pub fn rx_descriptor(&self, index: usize) -> &BufferDescriptor {
        self.rx_ring.get(index)
    }

    /// The transmit descriptor
    #[inline(always)]
    pub fn tx_descriptor(&self) -> &BufferDescriptor {
        self.tx_ring.current()
    }

    /// Number of receive descriptors owned by the DMA engine
    pub fn rx_owned_count(&self) -> usize {
        self.rx_ring.iter().filter(|d| d.is_owned()).count()
    }
}

impl<const RX_BUFS: usize, const BUF_SIZE: usize> Default for DmaEngine<RX_BUFS, BUF_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
