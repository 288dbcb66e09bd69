//! Circular descriptor ring with a cursor.

use super::descriptor::BufferDescriptor;

/// Fixed-depth ring of buffer descriptors.
///
/// The descriptor array starts on a 16-byte boundary as the FEC requires for
/// `ERDSR`/`ETDSR`. The cursor only moves forward, modulo `N`.
#[repr(C, align(16))]
pub struct DescriptorRing<const N: usize> {
    /// Descriptor array handed to the DMA engine
    descriptors: [BufferDescriptor; N],
    /// Next slot software will look at
    current: usize,
}

impl<const N: usize> DescriptorRing<N> {
    /// Ring of zeroed, CPU-owned descriptors with the cursor at 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            descriptors: [const { BufferDescriptor::new() }; N],
            current: 0,
        }
    }

    /// Number of descriptors in the ring
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// Index of the only descriptor carrying the wrap marker
    #[inline(always)]
    #[must_use]
    pub const fn wrap_index(&self) -> usize {
        N - 1
    }

    /// Get the current index
    #[inline(always)]
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Advance the current index by one, wrapping around
    #[inline(always)]
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % N;
    }

    /// Reset the current index to 0
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Descriptor under the cursor
    #[inline(always)]
    pub fn current(&self) -> &BufferDescriptor {
        &self.descriptors[self.current]
    }

    /// Descriptor at `index`, wrapped into range
    #[inline(always)]
    pub fn get(&self, index: usize) -> &BufferDescriptor {
        &self.descriptors[index % N]
    }

    /// Base address as programmed into the ring start register
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.descriptors.as_ptr() as u32
    }

    /// Base address as a pointer, for alignment checks
    #[inline(always)]
    pub fn base_ptr(&self) -> *const BufferDescriptor {
        self.descriptors.as_ptr()
    }

    /// Iterate over all descriptors in ring order
    pub fn iter(&self) -> impl Iterator<Item = &BufferDescriptor> {
        self.descriptors.iter()
    }
}

impl<const N: usize> Default for DescriptorRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
