//! Centralized Constants
//!
//! Frame geometry, default ring sizes and the bring-up timings used by the
//! FEC driver. Register bit definitions live in
//! [`register`](super::register) and descriptor bits in the DMA module.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Maximum Ethernet frame length accepted by the receiver (1500 + 14 + 4)
pub const MAX_FRAME_SIZE: usize = 1518;

/// Smallest value accepted for the receive `MAX_FL` field
pub const MIN_FRAME_SIZE: usize = 64;

/// Largest value the 11-bit `MAX_FL` field can hold
pub const MAX_FL_LIMIT: usize = 0x7FF;

/// Standard Ethernet MTU
pub const MTU: usize = 1500;

/// Default receive buffer size; a multiple of the DMA alignment
pub const DEFAULT_BUFFER_SIZE: usize = 1520;

/// DMA alignment required for descriptor rings and buffers
pub const DMA_ALIGNMENT: usize = 16;

/// MAC address length
pub const MAC_ADDR_LEN: usize = 6;

/// Default locally administered MAC address
pub const DEFAULT_MAC_ADDR: [u8; MAC_ADDR_LEN] = [0x02, 0x12, 0x13, 0x10, 0x15, 0x11];

// =============================================================================
// Default Buffer Counts
// =============================================================================

/// Default number of receive descriptors/buffers
pub const DEFAULT_RX_BUFFERS: usize = 4;

/// Transmit ring depth; one frame is in flight at a time
pub const TX_RING_DEPTH: usize = 1;

// =============================================================================
// Timing Constants
// =============================================================================

/// Delay before each PHY presence / autonegotiation poll
pub const LINK_DELAY_MS: u32 = 500;

/// Delay between MII completion polls
pub const MII_POLL_DELAY_MS: u32 = 10;

/// MII completion polls before a management frame times out
pub const MII_MAX_POLLS: u32 = 20;

/// Time a sender waits for the transmit descriptor before dropping the frame
pub const TX_WAIT_MS: u32 = 200;

/// Spin iterations holding `ECR.RESET` (the MAC needs at least 8 clocks)
pub const RESET_HOLD_SPINS: u32 = 10;

// =============================================================================
// Clocks
// =============================================================================

/// Default system clock of the reference board
pub const DEFAULT_CPU_CLOCK_HZ: u32 = 25_000_000;

/// Upper bound for the MII management clock (MDC)
pub const MDC_MAX_FREQ_HZ: u32 = 2_500_000;

// =============================================================================
// PHY
// =============================================================================

/// Default PHY address on the management bus
pub const DEFAULT_PHY_ADDR: u8 = 0;

/// Identifier value read back when no PHY answers
pub const PHY_ABSENT_ID: u16 = 0xFFFF;

// =============================================================================
// Interrupt Vectors
// =============================================================================

/// Interrupt controller vector numbers routed to the FEC (23..=35)
pub const FEC_VECTORS: [u8; 13] = [23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 35];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_buffer_size_is_dma_aligned() {
        assert_eq!(DEFAULT_BUFFER_SIZE % DMA_ALIGNMENT, 0);
        assert!(DEFAULT_BUFFER_SIZE >= MAX_FRAME_SIZE);
    }

    #[test]
    fn max_frame_fits_max_fl_field() {
        assert!(MAX_FRAME_SIZE <= MAX_FL_LIMIT);
        assert!(MIN_FRAME_SIZE < MAX_FRAME_SIZE);
    }

    #[test]
    fn fec_vectors_are_contiguous() {
        for pair in FEC_VECTORS.windows(2) {
            assert_eq!(pair[1], pair[0] + 1);
        }
        assert_eq!(FEC_VECTORS[0], 23);
        assert_eq!(FEC_VECTORS[12], 35);
    }
}
