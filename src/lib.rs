//! ColdFire FEC Driver
//!
//! A `no_std`, `no_alloc` Rust driver for the Fast Ethernet Controller (FEC)
//! found on ColdFire-family microcontrollers.
//!
//! # Architecture
//!
//! The driver is organized into layers:
//!
//! 1. **Device** ([`driver::fec`]): rings, zero-copy receive and transmit,
//!    reset and recovery
//! 2. **Interrupts** ([`driver::interrupt`]): event decoding and dispatch
//! 3. **Filtering** ([`driver::filtering`]): station address and hash tables
//! 4. **PHY** ([`phy`]): link bring-up and autonegotiation
//! 5. **HAL** ([`hal`]): the MII management bus
//! 6. **Sync** ([`sync`]): critical-section wrapper and wake signals
//!
//! ## Buffer Handoff
//!
//! Received buffers are never copied. A frame polled from the receive ring is
//! either released back to the DMA engine or lent, as-is, to the single
//! transmit descriptor, and returns to the receive ring when the transmit
//! complete interrupt fires.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for public types and defmt logging
//! - `log`: Route driver logging through the `log` facade
//!
//! # Example
//!
//! ```ignore
//! use ph_mcf_fec::{FecConfig, SharedFec, SharedFecDefault};
//! use ph_mcf_fec::unsafe_registers::MmioRegisters;
//!
//! static FEC: SharedFecDefault<MmioRegisters> =
//!     SharedFec::new(unsafe { MmioRegisters::reference() });
//!
//! let config = FecConfig::new()
//!     .with_mac_address([0x02, 0x12, 0x13, 0x10, 0x15, 0x11])
//!     .with_cpu_clock_hz(64_000_000);
//!
//! let link = FEC.with(|fec| fec.bring_up(config, delay))?;
//!
//! fn fec_handler() {
//!     FEC.on_interrupt(&RX_SIGNAL, &TX_SIGNAL);
//! }
//! ph_mcf_fec::fec_isr!(fec_handler => vector23, vector24, vector25);
//! ```
//!
//! # Memory Requirements
//!
//! With the default geometry (4 receive buffers of 1520 bytes):
//! - ~6 KB of DMA-reachable RAM, see [`Fec::memory_usage`]

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod phy;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{Duplex, FecConfig, MiiTiming, PollLimit, Speed, State};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::fec::{ExecContext, Fec, FecDefault, FecSmall, RxFrame, TxDisposition};
pub use driver::filtering::compute_hash;
pub use driver::interrupt::{InterruptEvents, IsrOutcome};
pub use hal::mii::{FecMdio, MdioBus};
pub use phy::{LinkSequencer, LinkState, LinkStatus};
pub use sync::{BinarySignal, SharedFec, SharedFecDefault, SharedFecSmall, WakeSignal};

/// Low-level register access for advanced use.
///
/// Most users should prefer the driver APIs instead of touching registers
/// directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Writing `ECR`, the
/// doorbells or the ring base registers behind the driver's back corrupts
/// descriptor ownership.
pub mod unsafe_registers {
    pub use crate::internal::register::{
        DESCRIPTOR_ACTIVE, FEC_BASE, FecReg, FecRegisters, MmioRegisters, ecr, eir, mmfr, mscr,
        rcr, tcr,
    };
}

/// Shared driver constants.
pub mod constants {
    pub use crate::internal::constants::{
        // Frame/buffer sizes
        DEFAULT_BUFFER_SIZE,
        // MAC address
        DEFAULT_MAC_ADDR,
        // Clocks
        DEFAULT_CPU_CLOCK_HZ,
        // PHY
        DEFAULT_PHY_ADDR,
        // Buffer counts
        DEFAULT_RX_BUFFERS,
        DMA_ALIGNMENT,
        // Interrupt controller
        FEC_VECTORS,
        // Timing
        LINK_DELAY_MS,
        MAC_ADDR_LEN,
        MAX_FRAME_SIZE,
        MDC_MAX_FREQ_HZ,
        MII_MAX_POLLS,
        MII_POLL_DELAY_MS,
        MIN_FRAME_SIZE,
        MTU,
        PHY_ABSENT_ID,
        TX_WAIT_MS,
    };
}

// =============================================================================
// Interrupt Binding
// =============================================================================

/// Bind one dispatcher to every listed interrupt vector symbol.
///
/// The FEC raises its events on thirteen separate vectors
/// ([`constants::FEC_VECTORS`]); each listed symbol becomes an
/// `extern "C"` handler that calls `$handler`.
///
/// # Example
///
/// ```ignore
/// fn fec_handler() {
///     let outcome = FEC.on_interrupt(&RX_SIGNAL, &TX_SIGNAL);
///     if outcome.switch_required {
///         request_context_switch();
///     }
/// }
///
/// ph_mcf_fec::fec_isr!(fec_handler => vector23, vector24, vector25);
/// ```
#[macro_export]
macro_rules! fec_isr {
    ($handler:path => $($vector:ident),+ $(,)?) => {
        $(
            #[unsafe(no_mangle)]
            pub extern "C" fn $vector() {
                $handler();
            }
        )+
    };
}
